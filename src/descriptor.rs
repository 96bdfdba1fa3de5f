use alloc::vec::Vec;
use core::{
    fmt::{self, Debug, Formatter},
    iter,
    marker::PhantomData,
};

use crate::{
    any::TypeInfo,
    module::{activate_default, ModuleActivator, ServiceModule},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    /// Can be instantiated, e.g. a struct or an enum.
    Concrete,
    /// Known to the assembly but not instantiable on its own.
    Abstract,
    /// A trait object type such as `dyn Greeter`.
    Interface,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Visibility {
    #[default]
    Exported,
    Internal,
}

/// An interface a type implements, together with the interfaces it extends.
#[derive(Debug, Clone)]
pub struct InterfaceInfo {
    ty: TypeInfo,
    extends: Vec<InterfaceInfo>,
}

impl InterfaceInfo {
    #[inline]
    #[must_use]
    pub fn of<I>() -> Self
    where
        I: ?Sized + 'static,
    {
        Self {
            ty: TypeInfo::of::<I>(),
            extends: Vec::new(),
        }
    }

    /// Declares `base` as a supertrait of this interface.
    /// Implementors of this interface are registered under `base` too.
    #[inline]
    #[must_use]
    pub fn extends(mut self, base: InterfaceInfo) -> Self {
        self.extends.push(base);
        self
    }

    #[inline]
    #[must_use]
    pub fn type_info(&self) -> TypeInfo {
        self.ty
    }

    fn flatten_into(&self, out: &mut Vec<TypeInfo>) {
        if out.contains(&self.ty) {
            return;
        }
        out.push(self.ty);
        for base in &self.extends {
            base.flatten_into(out);
        }
    }
}

/// Metadata of a type contained in an [`crate::Assembly`].
#[derive(Clone)]
pub struct TypeDescriptor {
    ty: TypeInfo,
    kind: TypeKind,
    visibility: Visibility,
    interfaces: Vec<InterfaceInfo>,
    activator: Option<ModuleActivator>,
}

impl TypeDescriptor {
    #[inline]
    #[must_use]
    pub fn new<T>(kind: TypeKind) -> TypeDescriptorBuilder<T>
    where
        T: ?Sized + 'static,
    {
        TypeDescriptorBuilder {
            descriptor: Self {
                ty: TypeInfo::of::<T>(),
                kind,
                visibility: Visibility::Exported,
                interfaces: Vec::new(),
                activator: None,
            },
            _ty: PhantomData,
        }
    }

    #[inline]
    #[must_use]
    pub fn concrete<T: 'static>() -> TypeDescriptorBuilder<T> {
        Self::new::<T>(TypeKind::Concrete)
    }

    #[inline]
    #[must_use]
    pub fn interface<I: ?Sized + 'static>() -> TypeDescriptorBuilder<I> {
        Self::new::<I>(TypeKind::Interface)
    }

    /// Concrete service module built with [`Default`].
    #[inline]
    #[must_use]
    pub fn module<M>() -> TypeDescriptorBuilder<M>
    where
        M: ServiceModule + Default + 'static,
    {
        Self::module_with::<M>(activate_default::<M>)
    }

    /// Concrete service module built by `activator`.
    ///
    /// The type is also declared as an implementor of `dyn ServiceModule`.
    #[inline]
    #[must_use]
    pub fn module_with<M>(activator: ModuleActivator) -> TypeDescriptorBuilder<M>
    where
        M: ServiceModule + 'static,
    {
        let mut builder = Self::concrete::<M>().implements::<dyn ServiceModule>(|module| module);
        builder.descriptor.activator = Some(activator);
        builder
    }

    #[inline]
    #[must_use]
    pub fn type_info(&self) -> TypeInfo {
        self.ty
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.ty.name
    }

    #[inline]
    #[must_use]
    pub fn short_name(&self) -> &'static str {
        self.ty.short_name()
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    #[inline]
    #[must_use]
    pub fn is_concrete(&self) -> bool {
        self.kind == TypeKind::Concrete
    }

    #[inline]
    #[must_use]
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    #[inline]
    #[must_use]
    pub fn is_exported(&self) -> bool {
        self.visibility == Visibility::Exported
    }

    #[inline]
    #[must_use]
    pub fn activator(&self) -> Option<ModuleActivator> {
        self.activator
    }

    /// Interfaces declared by the type, expanded through the interfaces they extend.
    ///
    /// The order is declaration order, depth first, every interface is listed once.
    #[must_use]
    pub fn implemented_interfaces(&self) -> Vec<TypeInfo> {
        let mut out = Vec::with_capacity(self.interfaces.len());
        for interface in &self.interfaces {
            interface.flatten_into(&mut out);
        }
        out
    }
}

impl Debug for TypeDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("ty", &self.ty.name)
            .field("kind", &self.kind)
            .field("visibility", &self.visibility)
            .field("interfaces", &self.interfaces)
            .field("is_module", &self.activator.is_some())
            .finish()
    }
}

/// Builds a [`TypeDescriptor`] of `T`.
///
/// Interfaces are declared with an upcast from `&T`, so only interfaces `T` can be
/// used as are accepted.
///
/// ```compile_fail
/// use assembly_registrar::TypeDescriptor;
///
/// trait Greeter {}
///
/// struct Silent;
///
/// let descriptor = TypeDescriptor::concrete::<Silent>().implements::<dyn Greeter>(|ty| ty);
/// ```
pub struct TypeDescriptorBuilder<T: ?Sized> {
    descriptor: TypeDescriptor,
    _ty: PhantomData<fn(&T)>,
}

impl<T> TypeDescriptorBuilder<T>
where
    T: ?Sized + 'static,
{
    /// Declares `I` as implemented by `T`, usually as `.implements::<dyn Trait>(|ty| ty)`.
    #[inline]
    #[must_use]
    pub fn implements<I>(self, upcast: fn(&T) -> &I) -> Self
    where
        I: ?Sized + 'static,
    {
        self.implements_extending::<I>(upcast, iter::empty())
    }

    /// Declares `I` as implemented by `T` together with the supertraits `I` extends.
    #[must_use]
    pub fn implements_extending<I>(mut self, _upcast: fn(&T) -> &I, extends: impl IntoIterator<Item = InterfaceInfo>) -> Self
    where
        I: ?Sized + 'static,
    {
        let ty = TypeInfo::of::<I>();
        match self.descriptor.interfaces.iter_mut().find(|interface| interface.ty == ty) {
            Some(interface) => interface.extends.extend(extends),
            None => self.descriptor.interfaces.push(InterfaceInfo {
                ty,
                extends: extends.into_iter().collect(),
            }),
        }
        self
    }

    #[inline]
    #[must_use]
    pub fn internal(mut self) -> Self {
        self.descriptor.visibility = Visibility::Internal;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_kind(mut self, kind: TypeKind) -> Self {
        self.descriptor.kind = kind;
        self
    }

    #[inline]
    #[must_use]
    pub fn build(self) -> TypeDescriptor {
        self.descriptor
    }
}

impl<T: ?Sized> From<TypeDescriptorBuilder<T>> for TypeDescriptor {
    #[inline]
    fn from(builder: TypeDescriptorBuilder<T>) -> Self {
        builder.descriptor
    }
}

use alloc::vec::Vec;
use core::slice;

use crate::descriptor::TypeDescriptor;

/// A named bundle of type descriptors scanned as a batch.
#[derive(Debug, Clone)]
pub struct Assembly {
    name: &'static str,
    types: Vec<TypeDescriptor>,
}

impl Assembly {
    #[inline]
    #[must_use]
    pub fn builder(name: &'static str) -> AssemblyBuilder {
        AssemblyBuilder {
            name,
            types: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// All types, exported and internal, in declaration order.
    #[inline]
    pub fn types(&self) -> slice::Iter<'_, TypeDescriptor> {
        self.types.iter()
    }

    /// Exported types in declaration order.
    #[inline]
    pub fn exported_types(&self) -> impl Iterator<Item = &TypeDescriptor> + '_ {
        self.types.iter().filter(|ty| ty.is_exported())
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

pub struct AssemblyBuilder {
    name: &'static str,
    types: Vec<TypeDescriptor>,
}

impl AssemblyBuilder {
    #[inline]
    #[must_use]
    pub fn add(mut self, ty: impl Into<TypeDescriptor>) -> Self {
        self.types.push(ty.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn build(self) -> Assembly {
        Assembly {
            name: self.name,
            types: self.types,
        }
    }
}

/// Builds an [`Assembly`].
///
/// # Syntax
/// ```text
/// assembly!("name" [
///     [internal] concrete(Type) [implements [dyn Trait, ...]],
///     [internal] interface(dyn Trait),
///     [internal] module(ModuleType) [implements [dyn Trait, ...]],
/// ])
/// ```
/// `module` entries must implement [`crate::ServiceModule`] and [`Default`].
/// Every listed interface must be implemented by the entry's type:
/// ```compile_fail
/// use assembly_registrar::assembly;
///
/// trait Greeter {}
///
/// struct Silent;
///
/// let assembly = assembly!("greeters" [concrete(Silent) implements [dyn Greeter]]);
/// ```
///
/// # Examples
/// ```rust
/// use assembly_registrar::{assembly, ServiceModule, Services};
///
/// trait Greeter {}
///
/// struct English;
///
/// impl Greeter for English {}
///
/// #[derive(Default)]
/// struct GreeterModule;
///
/// impl ServiceModule for GreeterModule {
///     fn configure_services(&self, _services: &mut dyn Services) -> anyhow::Result<()> {
///         Ok(())
///     }
/// }
///
/// let assembly = assembly!("greeters" [
///     interface(dyn Greeter),
///     concrete(English) implements [dyn Greeter],
///     internal module(GreeterModule),
/// ]);
///
/// assert_eq!(assembly.len(), 3);
/// assert_eq!(assembly.exported_types().count(), 2);
/// ```
#[macro_export]
macro_rules! assembly {
    ($name:literal [ $($entries:tt)* ]) => {{
        let builder = $crate::Assembly::builder($name);
        $crate::assembly_internal!(@entries builder [ $($entries)* ])
    }};
}

#[macro_export]
#[doc(hidden)]
macro_rules! assembly_internal {
    // === Base case ===
    (@entries $builder:ident []) => {
        $builder.build()
    };

    // === Internal entries ===
    // Example: assembly_internal! { @entries builder [ internal concrete(A), ... ] }
    (@entries $builder:ident [ internal $kind:ident ( $ty:ty ) $(implements [ $($iface:ty),* $(,)? ])? $(, $($rest:tt)*)? ]) => {{
        let $builder = $builder.add(
            $crate::assembly_internal!(@descriptor $kind, $ty $(, [ $($iface),* ])?).internal()
        );
        $crate::assembly_internal!(@entries $builder [ $($($rest)*)? ])
    }};

    // === Exported entries ===
    // Example: assembly_internal! { @entries builder [ concrete(A) implements [dyn X], ... ] }
    (@entries $builder:ident [ $kind:ident ( $ty:ty ) $(implements [ $($iface:ty),* $(,)? ])? $(, $($rest:tt)*)? ]) => {{
        let $builder = $builder.add(
            $crate::assembly_internal!(@descriptor $kind, $ty $(, [ $($iface),* ])?)
        );
        $crate::assembly_internal!(@entries $builder [ $($($rest)*)? ])
    }};

    (@descriptor concrete, $ty:ty $(, [ $($iface:ty),* ])?) => {
        $crate::TypeDescriptor::concrete::<$ty>() $($( .implements::<$iface>(|ty| ty) )*)?
    };

    (@descriptor interface, $ty:ty) => {
        $crate::TypeDescriptor::interface::<$ty>()
    };

    (@descriptor module, $ty:ty $(, [ $($iface:ty),* ])?) => {
        $crate::TypeDescriptor::module::<$ty>() $($( .implements::<$iface>(|ty| ty) )*)?
    };
}

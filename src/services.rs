use alloc::vec::{self, Vec};
use core::slice;
use tracing::debug;

use crate::{any::TypeInfo, descriptor::TypeDescriptor, lifetime::Lifetime};

/// A registration entry: `service` resolves to `implementation` with the given `lifetime`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServiceDescriptor {
    pub service: TypeInfo,
    pub implementation: TypeInfo,
    pub lifetime: Lifetime,
}

impl ServiceDescriptor {
    #[inline]
    #[must_use]
    pub const fn new(service: TypeInfo, implementation: TypeInfo, lifetime: Lifetime) -> Self {
        Self {
            service,
            implementation,
            lifetime,
        }
    }

    /// Entry keyed by the implementation itself.
    #[inline]
    #[must_use]
    pub const fn of_self(implementation: TypeInfo, lifetime: Lifetime) -> Self {
        Self::new(implementation, implementation, lifetime)
    }
}

/// Registry that accepts registration entries.
///
/// Entries are recorded in the order they are added. Nothing is read back by the registrar.
pub trait Services {
    fn add(&mut self, descriptor: ServiceDescriptor);
}

impl<T> Services for &mut T
where
    T: Services + ?Sized,
{
    #[inline]
    fn add(&mut self, descriptor: ServiceDescriptor) {
        (**self).add(descriptor);
    }
}

pub trait ServicesExt: Services {
    #[inline]
    fn add_self<T: 'static>(&mut self, lifetime: Lifetime) -> &mut Self {
        self.add(ServiceDescriptor::of_self(TypeInfo::of::<T>(), lifetime));
        self
    }

    /// Registers `T` under the service key `I`, usually a `dyn Trait` implemented by `T`.
    #[inline]
    fn add_as<I, T>(&mut self, lifetime: Lifetime) -> &mut Self
    where
        I: ?Sized + 'static,
        T: 'static,
    {
        self.add(ServiceDescriptor::new(TypeInfo::of::<I>(), TypeInfo::of::<T>(), lifetime));
        self
    }

    #[inline]
    fn add_singleton<T: 'static>(&mut self) -> &mut Self {
        self.add_self::<T>(Lifetime::Singleton)
    }

    #[inline]
    fn add_scoped<T: 'static>(&mut self) -> &mut Self {
        self.add_self::<T>(Lifetime::Scoped)
    }

    #[inline]
    fn add_transient<T: 'static>(&mut self) -> &mut Self {
        self.add_self::<T>(Lifetime::Transient)
    }

    /// Registers the type under each interface it implements. `None` is a no-op.
    fn add_as_implemented_interfaces(&mut self, ty: Option<&TypeDescriptor>, lifetime: Lifetime) -> &mut Self {
        let Some(ty) = ty else {
            return self;
        };

        let implementation = ty.type_info();
        for service in ty.implemented_interfaces() {
            debug!(%service, %implementation, %lifetime, "Registered as implemented interface");
            self.add(ServiceDescriptor::new(service, implementation, lifetime));
        }
        self
    }
}

impl<S: Services + ?Sized> ServicesExt for S {}

/// Ordered in-memory registry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceCollection {
    descriptors: Vec<ServiceDescriptor>,
}

impl ServiceCollection {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { descriptors: Vec::new() }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> slice::Iter<'_, ServiceDescriptor> {
        self.descriptors.iter()
    }

    #[inline]
    #[must_use]
    pub fn descriptors(&self) -> &[ServiceDescriptor] {
        &self.descriptors
    }

    /// Entries keyed by `T`, in registration order.
    #[inline]
    pub fn for_service<T: ?Sized + 'static>(&self) -> impl Iterator<Item = &ServiceDescriptor> + '_ {
        let service = TypeInfo::of::<T>();
        self.descriptors.iter().filter(move |descriptor| descriptor.service == service)
    }

    /// The entry a last-registration-wins container resolves `T` to.
    #[inline]
    #[must_use]
    pub fn last_for<T: ?Sized + 'static>(&self) -> Option<&ServiceDescriptor> {
        self.for_service::<T>().last()
    }

    #[inline]
    #[must_use]
    pub fn contains<T: ?Sized + 'static>(&self) -> bool {
        self.for_service::<T>().next().is_some()
    }
}

impl Services for ServiceCollection {
    #[inline]
    fn add(&mut self, descriptor: ServiceDescriptor) {
        self.descriptors.push(descriptor);
    }
}

impl Extend<ServiceDescriptor> for ServiceCollection {
    fn extend<I: IntoIterator<Item = ServiceDescriptor>>(&mut self, iter: I) {
        self.descriptors.extend(iter);
    }
}

impl FromIterator<ServiceDescriptor> for ServiceCollection {
    fn from_iter<I: IntoIterator<Item = ServiceDescriptor>>(iter: I) -> Self {
        Self {
            descriptors: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for ServiceCollection {
    type Item = ServiceDescriptor;
    type IntoIter = vec::IntoIter<ServiceDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.descriptors.into_iter()
    }
}

impl<'a> IntoIterator for &'a ServiceCollection {
    type Item = &'a ServiceDescriptor;
    type IntoIter = slice::Iter<'a, ServiceDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.descriptors.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::{ServiceCollection, ServiceDescriptor, Services, ServicesExt as _};
    use crate::{any::TypeInfo, descriptor::TypeDescriptor, lifetime::Lifetime::*};

    trait Greeter {}
    trait Farewell {}

    struct English;
    struct French;

    impl Greeter for English {}
    impl Farewell for English {}

    #[test]
    fn test_add_preserves_order_and_duplicates() {
        let mut services = ServiceCollection::new();
        services
            .add_as::<dyn Greeter, English>(Singleton)
            .add_as::<dyn Greeter, French>(Scoped)
            .add_as::<dyn Greeter, English>(Singleton);

        assert_eq!(services.len(), 3);
        assert_eq!(services.for_service::<dyn Greeter>().count(), 3);
        assert_eq!(
            services.last_for::<dyn Greeter>(),
            Some(&ServiceDescriptor::new(TypeInfo::of::<dyn Greeter>(), TypeInfo::of::<English>(), Singleton))
        );
        assert!(!services.contains::<English>());
    }

    #[test]
    fn test_lifetime_shortcuts() {
        let mut services = ServiceCollection::new();
        services.add_singleton::<English>().add_scoped::<French>().add_transient::<English>();

        let lifetimes = services.iter().map(|descriptor| descriptor.lifetime).collect::<alloc::vec::Vec<_>>();
        assert_eq!(lifetimes, [Singleton, Scoped, Transient]);
        assert!(services.iter().all(|descriptor| descriptor.service == descriptor.implementation));
    }

    #[test]
    fn test_add_as_implemented_interfaces() {
        let ty = TypeDescriptor::concrete::<English>()
            .implements::<dyn Greeter>(|ty| ty)
            .implements::<dyn Farewell>(|ty| ty)
            .build();

        let mut services = ServiceCollection::new();
        services.add_as_implemented_interfaces(Some(&ty), Transient);
        services.add_as_implemented_interfaces(None, Transient);

        assert_eq!(
            services.descriptors(),
            [
                ServiceDescriptor::new(TypeInfo::of::<dyn Greeter>(), TypeInfo::of::<English>(), Transient),
                ServiceDescriptor::new(TypeInfo::of::<dyn Farewell>(), TypeInfo::of::<English>(), Transient),
            ]
        );
    }

    #[test]
    fn test_dyn_services() {
        fn register_english<S: Services>(mut services: S) {
            services.add_self::<English>(Scoped);
        }

        let mut collection = ServiceCollection::new();
        {
            let services: &mut dyn Services = &mut collection;
            services.add_self::<French>(Scoped);
            register_english(services);
        }
        assert_eq!(collection.len(), 2);
    }
}

use alloc::boxed::Box;

use crate::services::Services;

/// A unit that registers its own services.
///
/// Implementors are declared on a [`crate::TypeDescriptor`] with
/// [`crate::TypeDescriptor::module`] and picked up by [`crate::Registrar::register_modules`].
///
/// # Examples
/// ```rust
/// use assembly_registrar::{Lifetime, ServiceModule, Services, ServicesExt as _};
///
/// struct Clock;
///
/// #[derive(Default)]
/// struct ClockModule;
///
/// impl ServiceModule for ClockModule {
///     fn configure_services(&self, services: &mut dyn Services) -> anyhow::Result<()> {
///         services.add_self::<Clock>(Lifetime::Singleton);
///         Ok(())
///     }
/// }
/// ```
pub trait ServiceModule {
    /// # Errors
    /// Errors are reported to the registrar's diagnostic sink, they don't stop other modules.
    fn configure_services(&self, services: &mut dyn Services) -> anyhow::Result<()>;
}

/// Builds a service module. Failures are reported like configuration failures.
pub type ModuleActivator = fn() -> anyhow::Result<Box<dyn ServiceModule>>;

pub(crate) fn activate_default<M>() -> anyhow::Result<Box<dyn ServiceModule>>
where
    M: ServiceModule + Default + 'static,
{
    Ok(Box::new(M::default()))
}

use alloc::{borrow::Cow, boxed::Box};
use tracing::{debug, info_span};

use crate::{
    assembly::Assembly,
    config::Config,
    descriptor::TypeDescriptor,
    diagnostics::{DiagnosticSink, TracingSink},
    discovery::{AssemblySource, LoadedAssemblies},
    errors::ModuleErrorKind,
    lifetime::Lifetime,
    module::ModuleActivator,
    services::{ServiceDescriptor, Services, ServicesExt as _},
};

/// Predicate deciding whether a scanned type is registered.
pub type TypeFilter<'a> = &'a dyn Fn(&TypeDescriptor) -> bool;

/// Scans assemblies and records what they contain into a [`Services`] registry.
///
/// Every operation takes a slice of assemblies. An empty slice means the assemblies of the
/// registrar's [`AssemblySource`], resolved once per call.
///
/// Entries are added in assembly order, then type order, then interface order,
/// and nothing is deduplicated: scanning the same type twice records it twice.
///
/// # Examples
/// ```rust
/// use assembly_registrar::{assembly, Lifetime, Registrar, ServiceCollection};
///
/// trait Greeter {}
///
/// struct English;
///
/// impl Greeter for English {}
///
/// let assemblies = [assembly!("greeters" [concrete(English) implements [dyn Greeter]])];
///
/// let mut services = ServiceCollection::new();
/// Registrar::new().register_as_implemented_interfaces(&mut services, Lifetime::Scoped, None, &assemblies);
///
/// assert!(services.contains::<dyn Greeter>());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Registrar<Src = LoadedAssemblies, Sink = TracingSink> {
    source: Src,
    sink: Sink,
    config: Config,
}

impl Registrar {
    /// Registrar scanning [`LoadedAssemblies`] by default and logging module failures.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            source: LoadedAssemblies,
            sink: TracingSink,
            config: Config::default(),
        }
    }
}

impl<Src, Sink> Registrar<Src, Sink> {
    #[inline]
    #[must_use]
    pub fn with_source<NewSrc>(self, source: NewSrc) -> Registrar<NewSrc, Sink> {
        Registrar {
            source,
            sink: self.sink,
            config: self.config,
        }
    }

    #[inline]
    #[must_use]
    pub fn with_sink<NewSink>(self, sink: NewSink) -> Registrar<Src, NewSink> {
        Registrar {
            source: self.source,
            sink,
            config: self.config,
        }
    }

    #[inline]
    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn source(&self) -> &Src {
        &self.source
    }

    #[inline]
    #[must_use]
    pub fn sink(&self) -> &Sink {
        &self.sink
    }
}

impl<Src, Sink> Registrar<Src, Sink>
where
    Src: AssemblySource,
    Sink: DiagnosticSink,
{
    /// Registers every exported type passing `filter` under its own type.
    pub fn register_own_types<'s, S>(
        &self,
        services: &'s mut S,
        lifetime: Lifetime,
        filter: Option<TypeFilter<'_>>,
        assemblies: &[Assembly],
    ) -> &'s mut S
    where
        S: Services + ?Sized,
    {
        let assemblies = self.resolve(assemblies);
        let span = info_span!("register_own_types", assemblies = assemblies.len(), %lifetime);
        let _guard = span.enter();

        for ty in exported_types(&assemblies, filter) {
            let implementation = ty.type_info();
            debug!(service = %implementation, %implementation, %lifetime, "Registered as own type");
            services.add(ServiceDescriptor::of_self(implementation, lifetime));
        }
        services
    }

    /// Registers every exported type passing `filter` under each interface it implements.
    /// Types without interfaces are skipped.
    pub fn register_as_implemented_interfaces<'s, S>(
        &self,
        services: &'s mut S,
        lifetime: Lifetime,
        filter: Option<TypeFilter<'_>>,
        assemblies: &[Assembly],
    ) -> &'s mut S
    where
        S: Services + ?Sized,
    {
        let assemblies = self.resolve(assemblies);
        let span = info_span!("register_as_implemented_interfaces", assemblies = assemblies.len(), %lifetime);
        let _guard = span.enter();

        for ty in exported_types(&assemblies, filter) {
            services.add_as_implemented_interfaces(Some(ty), lifetime);
        }
        services
    }

    /// Registers a single type under each interface it implements. `None` is a no-op.
    #[inline]
    pub fn register_type_as_implemented_interfaces<'s, S>(
        &self,
        services: &'s mut S,
        ty: Option<&TypeDescriptor>,
        lifetime: Lifetime,
    ) -> &'s mut S
    where
        S: Services + ?Sized,
    {
        services.add_as_implemented_interfaces(ty, lifetime)
    }

    /// Activates every concrete service module of the assemblies, internal ones included,
    /// and lets it configure `services`.
    ///
    /// A module that fails to activate or configure is reported to the sink and skipped,
    /// registrations it made before failing are kept.
    pub fn register_modules<'s, S>(&self, services: &'s mut S, assemblies: &[Assembly]) -> &'s mut S
    where
        S: Services + ?Sized,
    {
        let assemblies = self.resolve(assemblies);
        let span = info_span!("register_modules", assemblies = assemblies.len());
        let _guard = span.enter();

        let modules = assemblies
            .iter()
            .flat_map(|assembly| assembly.types())
            .filter(|ty| ty.is_concrete())
            .filter_map(|ty| ty.activator().map(|activator| (ty.name(), activator)));

        for (module, activator) in modules {
            match self.configure_module(module, activator, &mut &mut *services) {
                Ok(()) => debug!(module, "Service module configured"),
                Err(err) => self.sink.report(err),
            }
        }
        services
    }

    /// Starts a scan with options set one by one.
    #[inline]
    #[must_use]
    pub fn scan(&self) -> Scan<'_, '_, Src, Sink> {
        Scan {
            registrar: self,
            assemblies: &[],
            filter: None,
            lifetime: None,
        }
    }

    #[inline]
    fn resolve<'a>(&'a self, assemblies: &'a [Assembly]) -> Cow<'a, [Assembly]> {
        if assemblies.is_empty() {
            debug!("No assemblies passed, using assembly source");
            self.source.assemblies()
        } else {
            Cow::Borrowed(assemblies)
        }
    }

    fn configure_module(&self, module: &'static str, activator: ModuleActivator, services: &mut dyn Services) -> Result<(), ModuleErrorKind> {
        let mut run = move || -> Result<(), ModuleErrorKind> {
            let instance = activator().map_err(|source| ModuleErrorKind::Activate { module, source })?;
            instance
                .configure_services(services)
                .map_err(|source| ModuleErrorKind::Configure { module, source })
        };

        #[cfg(feature = "std")]
        if self.config.catch_panics {
            return catch_panic(module, run);
        }

        run()
    }
}

#[cfg(feature = "std")]
fn catch_panic(module: &'static str, run: impl FnOnce() -> Result<(), ModuleErrorKind>) -> Result<(), ModuleErrorKind> {
    use alloc::string::{String, ToString as _};
    use std::panic::{catch_unwind, AssertUnwindSafe};

    catch_unwind(AssertUnwindSafe(run)).unwrap_or_else(|payload| {
        let message = if let Some(message) = payload.downcast_ref::<&str>() {
            (*message).to_string()
        } else if let Some(message) = payload.downcast_ref::<String>() {
            message.clone()
        } else {
            "Box<dyn Any>".to_string()
        };
        Err(ModuleErrorKind::Panicked { module, message })
    })
}

fn exported_types<'a>(assemblies: &'a [Assembly], filter: Option<TypeFilter<'a>>) -> impl Iterator<Item = &'a TypeDescriptor> + 'a {
    assemblies
        .iter()
        .flat_map(|assembly| assembly.exported_types())
        .filter(move |ty| filter.map_or(true, |filter| filter(*ty)))
}

/// Builder over the registrar operations with a default lifetime and an optional filter.
///
/// # Examples
/// ```rust
/// use assembly_registrar::{assembly, Lifetime, Registrar, ServiceCollection};
///
/// struct Clock;
/// struct Calendar;
///
/// let assemblies = [assembly!("time" [concrete(Clock), concrete(Calendar)])];
///
/// let mut services = ServiceCollection::new();
/// Registrar::new()
///     .scan()
///     .from(&assemblies)
///     .filter(|ty| ty.short_name().starts_with("Cl"))
///     .as_self(&mut services);
///
/// assert_eq!(services.len(), 1);
/// assert_eq!(services.descriptors()[0].lifetime, Lifetime::Singleton);
/// ```
pub struct Scan<'r, 'a, Src, Sink> {
    registrar: &'r Registrar<Src, Sink>,
    assemblies: &'a [Assembly],
    filter: Option<Box<dyn Fn(&TypeDescriptor) -> bool + 'a>>,
    lifetime: Option<Lifetime>,
}

impl<'r, 'a, Src, Sink> Scan<'r, 'a, Src, Sink>
where
    Src: AssemblySource,
    Sink: DiagnosticSink,
{
    #[inline]
    #[must_use]
    pub fn from<'b>(self, assemblies: &'b [Assembly]) -> Scan<'r, 'b, Src, Sink>
    where
        'a: 'b,
    {
        Scan {
            registrar: self.registrar,
            assemblies,
            filter: self.filter,
            lifetime: self.lifetime,
        }
    }

    #[inline]
    #[must_use]
    pub fn filter(mut self, filter: impl Fn(&TypeDescriptor) -> bool + 'a) -> Self {
        self.filter = Some(Box::new(filter));
        self
    }

    #[inline]
    #[must_use]
    pub fn lifetime(mut self, lifetime: Lifetime) -> Self {
        self.lifetime = Some(lifetime);
        self
    }

    #[inline]
    pub fn as_self<'s, S>(self, services: &'s mut S) -> &'s mut S
    where
        S: Services + ?Sized,
    {
        let lifetime = self.lifetime.unwrap_or(self.registrar.config.default_lifetime);
        self.registrar
            .register_own_types(services, lifetime, self.filter.as_deref(), self.assemblies)
    }

    #[inline]
    pub fn as_implemented_interfaces<'s, S>(self, services: &'s mut S) -> &'s mut S
    where
        S: Services + ?Sized,
    {
        let lifetime = self.lifetime.unwrap_or(self.registrar.config.default_lifetime);
        self.registrar
            .register_as_implemented_interfaces(services, lifetime, self.filter.as_deref(), self.assemblies)
    }

    #[inline]
    pub fn modules<'s, S>(self, services: &'s mut S) -> &'s mut S
    where
        S: Services + ?Sized,
    {
        self.registrar.register_modules(services, self.assemblies)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::Registrar;
    use alloc::{
        format,
        string::{String, ToString as _},
    };
    use crate::{
        any::TypeInfo, lifetime::Lifetime::*, Assembly, CollectingSink, ModuleErrorKind, ServiceCollection, ServiceDescriptor,
        ServiceModule, Services, ServicesExt as _, TypeDescriptor,
    };

    use alloc::{vec, vec::Vec};
    use tracing_test::traced_test;

    trait Greeter {}

    struct English;
    struct Clock;

    impl Greeter for English {}

    #[derive(Default)]
    struct ClockModule;

    impl ServiceModule for ClockModule {
        fn configure_services(&self, services: &mut dyn Services) -> anyhow::Result<()> {
            services.add_self::<Clock>(Singleton);
            Ok(())
        }
    }

    #[derive(Default)]
    struct PanickingModule;

    impl ServiceModule for PanickingModule {
        fn configure_services(&self, _services: &mut dyn Services) -> anyhow::Result<()> {
            panic!("module exploded");
        }
    }

    fn assemblies() -> Vec<Assembly> {
        vec![Assembly::builder("app")
            .add(TypeDescriptor::concrete::<English>().implements::<dyn Greeter>(|ty| ty))
            .add(TypeDescriptor::module::<PanickingModule>())
            .add(TypeDescriptor::module::<ClockModule>().internal())
            .build()]
    }

    #[test]
    #[traced_test]
    fn test_registrations_are_logged() {
        let registrar = Registrar::new().with_source(assemblies());

        let mut services = ServiceCollection::new();
        registrar.register_own_types(&mut services, Scoped, Some(&|ty: &TypeDescriptor| ty.type_info().is::<English>()), &[]);
        registrar.register_as_implemented_interfaces(&mut services, Scoped, Some(&|ty: &TypeDescriptor| ty.type_info().is::<English>()), &[]);

        assert_eq!(
            services.descriptors(),
            [
                ServiceDescriptor::of_self(TypeInfo::of::<English>(), Scoped),
                ServiceDescriptor::new(TypeInfo::of::<dyn Greeter>(), TypeInfo::of::<English>(), Scoped),
            ]
        );
        assert!(logs_contain("No assemblies passed, using assembly source"));
        assert!(logs_contain("Registered as own type"));
        assert!(logs_contain("Registered as implemented interface"));
    }

    #[test]
    #[traced_test]
    fn test_own_type_events_carry_entry_fields() {
        let mut services = ServiceCollection::new();
        Registrar::new().register_own_types(&mut services, Transient, None, &assemblies());

        assert_eq!(services.len(), 2);
        logs_assert(|lines: &[&str]| {
            let events = lines
                .iter()
                .filter(|line| line.contains("Registered as own type"))
                .collect::<Vec<_>>();
            if events.len() != 2 {
                return Err(format!("expected 2 own type events, got {}", events.len()));
            }
            match events
                .iter()
                .find(|line| !(line.contains("service=") && line.contains("implementation=") && line.contains("lifetime=transient")))
            {
                Some(line) => Err(format!("missing entry fields: {line}")),
                None => Ok(()),
            }
        });
    }

    #[test]
    #[traced_test]
    fn test_module_panic_is_logged_and_isolated() {
        let registrar = Registrar::new().with_source(assemblies());

        let mut services = ServiceCollection::new();
        registrar.register_modules(&mut services, &[]);

        assert_eq!(services.descriptors(), [ServiceDescriptor::of_self(TypeInfo::of::<Clock>(), Singleton)]);
        assert!(logs_contain("panicked: module exploded"));
        assert!(logs_contain("Service module configured"));
    }

    #[test]
    fn test_module_panic_is_collected() {
        let sink = CollectingSink::new();
        let registrar = Registrar::new().with_sink(&sink);

        let mut services = ServiceCollection::new();
        registrar.register_modules(&mut services, &assemblies());

        let failures = sink.take();
        assert_eq!(failures.len(), 1);
        assert!(matches!(
            &failures[0],
            ModuleErrorKind::Panicked { module, message } if module.ends_with("PanickingModule") && message == "module exploded"
        ));
        assert_eq!(services.len(), 1);
    }
}

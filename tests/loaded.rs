#![allow(dead_code)]

use assembly_registrar::{
    assembly, discovery::LOADED_ASSEMBLIES, export_assembly, AssemblySource as _, LoadedAssemblies, Registrar, ServiceCollection,
    ServiceModule, Services, ServicesExt as _, TypeInfo,
};

trait Storage {}

struct Disk;
struct Memory;
struct Metrics;

impl Storage for Disk {}
impl Storage for Memory {}

#[derive(Default)]
struct MetricsModule;

impl ServiceModule for MetricsModule {
    fn configure_services(&self, services: &mut dyn Services) -> anyhow::Result<()> {
        services.add_singleton::<Metrics>();
        Ok(())
    }
}

fn storage() -> assembly_registrar::Assembly {
    assembly!("storage" [
        concrete(Memory) implements [dyn Storage],
        concrete(Disk) implements [dyn Storage],
    ])
}

fn metrics() -> assembly_registrar::Assembly {
    assembly!("metrics" [internal module(MetricsModule)])
}

export_assembly!(storage);
export_assembly!(metrics);

#[test]
fn test_exported_assemblies_are_collected() {
    assert_eq!(LOADED_ASSEMBLIES.len(), 2);

    let names = LoadedAssemblies
        .assemblies()
        .iter()
        .map(|assembly| assembly.name())
        .collect::<Vec<_>>();
    assert_eq!(names, ["metrics", "storage"]);
}

#[test]
fn test_empty_assemblies_scan_loaded_ones() {
    let registrar = Registrar::new();

    let mut fallback = ServiceCollection::new();
    registrar.register_as_implemented_interfaces(&mut fallback, assembly_registrar::Lifetime::Scoped, None, &[]);
    registrar.register_modules(&mut fallback, &[]);

    let loaded = LoadedAssemblies.assemblies().into_owned();
    let mut explicit = ServiceCollection::new();
    registrar.register_as_implemented_interfaces(&mut explicit, assembly_registrar::Lifetime::Scoped, None, &loaded);
    registrar.register_modules(&mut explicit, &loaded);

    assert_eq!(fallback, explicit);

    let storages = fallback
        .for_service::<dyn Storage>()
        .map(|descriptor| descriptor.implementation)
        .collect::<Vec<_>>();
    assert_eq!(storages, [TypeInfo::of::<Memory>(), TypeInfo::of::<Disk>()]);
    assert!(fallback.contains::<Metrics>());
}

#![no_std]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub(crate) mod any;
pub(crate) mod assembly;
pub(crate) mod config;
pub(crate) mod descriptor;
pub(crate) mod diagnostics;
pub(crate) mod errors;
pub(crate) mod lifetime;
pub(crate) mod module;
pub(crate) mod registrar;
pub(crate) mod services;

pub mod discovery;

pub use any::TypeInfo;
pub use assembly::{Assembly, AssemblyBuilder};
pub use config::Config;
pub use descriptor::{InterfaceInfo, TypeDescriptor, TypeDescriptorBuilder, TypeKind, Visibility};
pub use diagnostics::{sink_fn, CollectingSink, DiagnosticSink, SinkFn, TracingSink};
pub use discovery::{AssemblySource, LoadedAssemblies};
pub use errors::ModuleErrorKind;
pub use lifetime::Lifetime;
pub use module::{ModuleActivator, ServiceModule};
pub use registrar::{Registrar, Scan, TypeFilter};
pub use services::{ServiceCollection, ServiceDescriptor, Services, ServicesExt};

use alloc::{borrow::Cow, vec::Vec};

use crate::assembly::Assembly;

pub use linkme::{self, distributed_slice};

/// Getters of every assembly exported with [`crate::export_assembly!`] in the final binary.
#[distributed_slice]
pub static LOADED_ASSEMBLIES: [fn() -> Assembly];

/// Assemblies scanned when a registration call doesn't pass any.
pub trait AssemblySource {
    #[must_use]
    fn assemblies(&self) -> Cow<'_, [Assembly]>;
}

/// Assemblies exported with [`crate::export_assembly!`], sorted by name.
///
/// Link order of exported getters isn't stable between builds, sorting keeps registration order reproducible.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadedAssemblies;

impl AssemblySource for LoadedAssemblies {
    fn assemblies(&self) -> Cow<'_, [Assembly]> {
        let mut assemblies = LOADED_ASSEMBLIES.iter().map(|getter| getter()).collect::<Vec<_>>();
        assemblies.sort_by_key(Assembly::name);
        Cow::Owned(assemblies)
    }
}

impl AssemblySource for Vec<Assembly> {
    #[inline]
    fn assemblies(&self) -> Cow<'_, [Assembly]> {
        Cow::Borrowed(self)
    }
}

impl<T> AssemblySource for &T
where
    T: AssemblySource + ?Sized,
{
    #[inline]
    fn assemblies(&self) -> Cow<'_, [Assembly]> {
        (**self).assemblies()
    }
}

/// Adds an assembly getter to [`LOADED_ASSEMBLIES`].
///
/// # Examples
/// ```rust
/// use assembly_registrar::{assembly, export_assembly, Assembly};
///
/// struct Clock;
///
/// fn clock_assembly() -> Assembly {
///     assembly!("clock" [concrete(Clock)])
/// }
///
/// export_assembly!(clock_assembly);
/// # fn main() {}
/// ```
#[macro_export]
macro_rules! export_assembly {
    ($getter:expr) => {
        const _: () = {
            #[$crate::discovery::distributed_slice($crate::discovery::LOADED_ASSEMBLIES)]
            #[linkme(crate = $crate::discovery::linkme)]
            static ASSEMBLY_GETTER: fn() -> $crate::Assembly = $getter;
        };
    };
}

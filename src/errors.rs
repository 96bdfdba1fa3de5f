mod module;

pub use module::ModuleErrorKind;

use alloc::string::String;

#[derive(thiserror::Error, Debug)]
pub enum ModuleErrorKind {
    #[error("Service module {module} can't be activated: {source}")]
    Activate {
        module: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("Service module {module} failed to configure services: {source}")]
    Configure {
        module: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("Service module {module} panicked: {message}")]
    Panicked { module: &'static str, message: String },
}

impl ModuleErrorKind {
    /// Type name of the failed module.
    #[inline]
    #[must_use]
    pub fn module(&self) -> &'static str {
        match self {
            Self::Activate { module, .. } | Self::Configure { module, .. } | Self::Panicked { module, .. } => module,
        }
    }
}

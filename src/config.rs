use crate::Lifetime;

/// Config for a registrar
/// ## Fields
/// - `default_lifetime`:
///   Lifetime used by [`crate::Scan`] when no lifetime is set explicitly.
///
/// - `catch_panics`:
///   If `true`, a panic raised while activating or configuring a service module
///   is caught and reported like any other module failure.
///
///   Only takes effect with the `std` feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub default_lifetime: Lifetime,
    pub catch_panics: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_lifetime: Lifetime::Singleton,
            catch_panics: true,
        }
    }
}

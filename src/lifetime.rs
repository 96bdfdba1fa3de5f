use core::fmt::{self, Display, Formatter};

/// How long an instance built for a registration is reused by the container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Lifetime {
    #[default]
    Singleton,
    Scoped,
    Transient,
}

impl Lifetime {
    #[inline]
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Lifetime::Singleton => "singleton",
            Lifetime::Scoped => "scoped",
            Lifetime::Transient => "transient",
        }
    }

    #[inline]
    #[must_use]
    pub const fn all() -> [Self; 3] {
        use Lifetime::{Scoped, Singleton, Transient};

        [Singleton, Scoped, Transient]
    }
}

impl Display for Lifetime {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether the engine hot-reloads or exits on change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Hot reload, previous artifacts retained, dev socket enabled.
    Development,
    /// Any change after initialisation exits with status 1.
    Production,
}

impl RunMode {
    pub const fn from_production_flag(production: bool) -> Self {
        if production { Self::Production } else { Self::Development }
    }

    #[inline]
    pub const fn is_development(self) -> bool {
        matches!(self, Self::Development)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

//! Compatibility modes.

/// Session-level switches that change operator semantics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mode {
    name: &'static str,
    /// `NULL || 'x'` is NULL instead of `'x'`
    pub null_concat_is_null: bool,
    /// `+` concatenates when both operands resolve to strings
    pub allow_plus_for_string_concat: bool,
    /// Resolve non-temporal arithmetic as DECIMAL regardless of the promoted type
    pub force_decimal_arithmetic: bool,
}

impl Mode {
    const fn preset(name: &'static str) -> Self {
        Self {
            name,
            null_concat_is_null: false,
            allow_plus_for_string_concat: false,
            force_decimal_arithmetic: false,
        }
    }

    /// The default mode
    pub fn regular() -> Self {
        Self {
            null_concat_is_null: true,
            ..Self::preset("REGULAR")
        }
    }

    /// Look up a preset by name (case-insensitive)
    pub fn named(name: &str) -> Option<Self> {
        let mode = match name.to_uppercase().as_str() {
            "REGULAR" => Self::regular(),
            "DB2" => Self::preset("DB2"),
            "DERBY" => Self::preset("Derby"),
            "HSQLDB" => Self {
                null_concat_is_null: true,
                ..Self::preset("HSQLDB")
            },
            "MSSQLSERVER" => Self {
                null_concat_is_null: true,
                allow_plus_for_string_concat: true,
                ..Self::preset("MSSQLServer")
            },
            "MYSQL" => Self::preset("MySQL"),
            "ORACLE" => Self::preset("Oracle"),
            "POSTGRESQL" => Self {
                null_concat_is_null: true,
                ..Self::preset("PostgreSQL")
            },
            _ => return None,
        };
        Some(mode)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn with_null_concat_is_null(mut self, value: bool) -> Self {
        self.null_concat_is_null = value;
        self
    }

    pub fn with_plus_for_string_concat(mut self, value: bool) -> Self {
        self.allow_plus_for_string_concat = value;
        self
    }

    pub fn with_force_decimal_arithmetic(mut self, value: bool) -> Self {
        self.force_decimal_arithmetic = value;
        self
    }
}

impl Default for Mode {
    fn default() -> Self {
        Self::regular()
    }
}

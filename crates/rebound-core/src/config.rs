//! Runtime mode.
//!
//! Development mode turns on store transition logging and lets the injector
//! look for a debugging extension. The mode is read from the environment only
//! through [`Config::from_env`]; everything below that boundary receives a
//! `Config` value explicitly.

/// Environment variable consulted by [`Config::from_env`].
pub const ENV_VAR: &str = "REBOUND_ENV";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    Development,
    #[default]
    Production,
}

impl Mode {
    /// `"development"` and `"dev"` (any case) select development mode.
    pub fn parse(s: &str) -> Mode {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Mode::Development,
            _ => Mode::Production,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Config {
    pub mode: Mode,
}

impl Config {
    pub fn development() -> Self {
        Self {
            mode: Mode::Development,
        }
    }

    pub fn production() -> Self {
        Self {
            mode: Mode::Production,
        }
    }

    pub fn from_env() -> Self {
        let mode = std::env::var(ENV_VAR)
            .map(|v| Mode::parse(&v))
            .unwrap_or_default();
        Self { mode }
    }

    pub fn is_dev(&self) -> bool {
        self.mode == Mode::Development
    }
}

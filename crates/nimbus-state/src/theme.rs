//! Theme modes and resolution against the ambient color scheme.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Auto,
    Light,
    Dark,
}

impl ThemeMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// auto -> light -> dark -> auto
    pub fn next(self) -> Self {
        match self {
            Self::Auto => Self::Light,
            Self::Light => Self::Dark,
            Self::Dark => Self::Auto,
        }
    }

    /// Button glyph for the mode.
    pub fn icon(self) -> &'static str {
        match self {
            Self::Auto => "🌓",
            Self::Light => "☀️",
            Self::Dark => "🌙",
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "auto" => Ok(Self::Auto),
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(format!("unknown theme: {other}")),
        }
    }
}

/// A resolved scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    Light,
    Dark,
}

impl ColorScheme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

/// The host's current light/dark preference. Queried on every resolve.
pub trait ColorSchemeSource: Send + Sync {
    fn current(&self) -> ColorScheme;
}

impl<F> ColorSchemeSource for F
where
    F: Fn() -> ColorScheme + Send + Sync,
{
    fn current(&self) -> ColorScheme {
        self()
    }
}

/// Reads the terminal's scheme from the environment.
///
/// `NIMBUS_COLOR_SCHEME=dark|light` wins; otherwise the background slot of
/// `COLORFGBG` ("15;0") decides; otherwise light.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalColorScheme;

impl TerminalColorScheme {
    fn from_vars(explicit: Option<&str>, colorfgbg: Option<&str>) -> ColorScheme {
        match explicit.map(str::trim) {
            Some("dark") => return ColorScheme::Dark,
            Some("light") => return ColorScheme::Light,
            _ => {}
        }

        let background = colorfgbg
            .and_then(|v| v.rsplit(';').next())
            .and_then(|bg| bg.trim().parse::<u8>().ok());

        match background {
            Some(0..=6 | 8) => ColorScheme::Dark,
            _ => ColorScheme::Light,
        }
    }
}

impl ColorSchemeSource for TerminalColorScheme {
    fn current(&self) -> ColorScheme {
        let explicit = std::env::var("NIMBUS_COLOR_SCHEME").ok();
        let colorfgbg = std::env::var("COLORFGBG").ok();
        Self::from_vars(explicit.as_deref(), colorfgbg.as_deref())
    }
}

/// Explicit modes win; `Auto` asks `source` at call time.
pub fn resolve_theme(mode: ThemeMode, source: &dyn ColorSchemeSource) -> ColorScheme {
    match mode {
        ThemeMode::Light => ColorScheme::Light,
        ThemeMode::Dark => ColorScheme::Dark,
        ThemeMode::Auto => source.current(),
    }
}

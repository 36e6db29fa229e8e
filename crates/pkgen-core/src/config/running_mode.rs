//! How pkgen was invoked.

use std::fmt;

/// Set by `go generate` for every directive it runs.
pub const GO_GENERATE_ENV: &str = "GOFILE";

/// Invocation mode, threaded into config resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunningMode {
    /// Run directly by a user or a script.
    #[default]
    Standalone,
    /// Run from a `//go:generate` directive; only the current package is queried.
    GoGenerate,
}

impl RunningMode {
    /// Detect the mode from the process environment.
    pub fn detect() -> Self {
        Self::from_env_marker(std::env::var_os(GO_GENERATE_ENV).is_some())
    }

    /// The marker's mere presence selects [`RunningMode::GoGenerate`].
    pub fn from_env_marker(present: bool) -> Self {
        if present {
            Self::GoGenerate
        } else {
            Self::Standalone
        }
    }

    pub fn is_go_generate(self) -> bool {
        matches!(self, Self::GoGenerate)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standalone => "standalone",
            Self::GoGenerate => "go-generate",
        }
    }
}

impl fmt::Display for RunningMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

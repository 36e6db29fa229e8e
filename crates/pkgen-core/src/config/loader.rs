//! Reading config sources from disk and resolving them.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{PartialConfig, ResolvedConfig, RunningMode, IMPLICIT_CONFIG_FILE};
use crate::error::{PkgenError, Result};

/// What the command line contributed to config resolution.
#[derive(Debug, Clone, Default)]
pub struct ConfigRequest {
    /// Values given as flags.
    pub cli: PartialConfig,
    /// `-config <path>`; relative paths are taken from the working directory.
    pub config_file: Option<PathBuf>,
}

/// Resolve the run configuration from the command line, an optional explicit
/// config file, and the implicit config file in `working_dir`.
pub fn resolve_config(
    request: ConfigRequest,
    working_dir: &Path,
    mode: RunningMode,
) -> Result<ResolvedConfig> {
    let mut sources = vec![request.cli];

    if let Some(explicit) = &request.config_file {
        sources.push(load_explicit(&working_dir.join(explicit))?);
    }

    if let Some(implicit) = load_implicit(&working_dir.join(IMPLICIT_CONFIG_FILE))? {
        sources.push(implicit);
    }

    Ok(ResolvedConfig::resolve(sources, mode, request.config_file))
}

/// Load a config file that must exist.
pub fn load_explicit(path: &Path) -> Result<PartialConfig> {
    debug!(path = %path.display(), "loading config file");
    let contents = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => PkgenError::ConfigNotFound {
            path: path.to_path_buf(),
            source: e,
        },
        _ => PkgenError::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        },
    })?;
    parse(path, &contents)
}

/// Load a config file that may be absent. Any other failure is an error.
pub fn load_implicit(path: &Path) -> Result<Option<PartialConfig>> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "no implicit config file");
            return Ok(None);
        }
        Err(e) => {
            return Err(PkgenError::ConfigRead {
                path: path.to_path_buf(),
                source: e,
            })
        }
    };
    debug!(path = %path.display(), "loading implicit config file");
    parse(path, &contents).map(Some)
}

fn parse(path: &Path, contents: &str) -> Result<PartialConfig> {
    // An empty document is a valid, empty source.
    if contents.trim().is_empty() {
        return Ok(PartialConfig::default());
    }
    serde_yaml::from_str(contents).map_err(|e| PkgenError::ConfigParse {
        path: path.to_path_buf(),
        source: e,
    })
}

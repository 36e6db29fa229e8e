use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use pkgen_core::config::{resolve_config, ConfigRequest, ResolvedConfig, RunningMode};
use pkgen_core::package::GoListLoader;
use pkgen_core::pipeline::{GenerationReport, Pipeline};

use crate::output;

/// Resolve the run configuration. The returned error carries the full cause
/// chain (e.g. the YAML error behind a config parse failure).
pub fn load_config(
    request: ConfigRequest,
    working_dir: &Path,
    mode: RunningMode,
) -> Result<ResolvedConfig> {
    resolve_config(request, working_dir, mode).context("error while resolving config")
}

/// Discover the configured packages and generate every template into them.
///
/// Interrupting with Ctrl-C drops the in-flight `go list` child and stops
/// before any further file is written.
pub async fn run(config: &ResolvedConfig, mode: RunningMode) -> Result<GenerationReport> {
    debug!(%mode, config_file = ?config.config_file(), "starting");

    let loader = GoListLoader::new()?;
    debug!(go = %loader.binary().display(), "using go toolchain");

    let pipeline = Pipeline::new(loader);
    let report = tokio::select! {
        report = pipeline.run(config) => report?,
        _ = tokio::signal::ctrl_c() => anyhow::bail!("interrupted"),
    };

    output::print_success(&format!(
        "generated {} file(s), skipped {}",
        report.written.len(),
        report.skipped
    ));
    if config.verbose() {
        for path in &report.written {
            output::print_key_value("wrote", &path.display().to_string());
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pkgen_core::config::IMPLICIT_CONFIG_FILE;
    use std::path::PathBuf;

    #[test]
    fn test_config_error_shows_cause() {
        let cwd = tempfile::tempdir().unwrap();
        std::fs::write(
            cwd.path().join(IMPLICIT_CONFIG_FILE),
            "packages_query:\n  patern: [x]\n",
        )
        .unwrap();

        let err = load_config(ConfigRequest::default(), cwd.path(), RunningMode::Standalone)
            .unwrap_err();
        let message = format!("{err:#}");
        assert!(message.starts_with("error while resolving config: failed to parse config at"));
        assert!(message.contains("unknown field `patern`"), "{message}");
    }

    #[test]
    fn test_missing_explicit_config_shows_io_cause() {
        let cwd = tempfile::tempdir().unwrap();
        let request = ConfigRequest {
            config_file: Some(PathBuf::from("cfg.yml")),
            ..Default::default()
        };

        let err = load_config(request, cwd.path(), RunningMode::Standalone).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("config file not found at"), "{message}");
        assert_eq!(err.chain().count(), 3, "{message}");
    }

    #[test]
    fn test_malformed_templates_in_config_shows_cause() {
        let cwd = tempfile::tempdir().unwrap();
        std::fs::write(cwd.path().join(IMPLICIT_CONFIG_FILE), "templates: 42\n").unwrap();

        let err = load_config(ConfigRequest::default(), cwd.path(), RunningMode::Standalone)
            .unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("malformed template configs"), "{message}");
    }
}

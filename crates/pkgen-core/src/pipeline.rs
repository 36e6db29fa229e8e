//! The generation pipeline.
//!
//! Drives every (package, template) pair through render → name → write, in
//! package order then template order, and stops at the first error.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use crate::config::{FileMode, GenerationOptions, ResolvedConfig};
use crate::error::{PkgenError, Result};
use crate::naming::OutputNamer;
use crate::package::{DiscoveredPackage, PackageLoader};
use crate::templates::{LoadedTemplate, TemplateResolver};

/// What a generation run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReport {
    /// Files written, in generation order.
    pub written: Vec<PathBuf>,
    /// (package, template) pairs skipped because the package has no sources.
    pub skipped: usize,
}

/// Generate one template into one package.
///
/// Returns the written path, or `None` when the package has no source files.
pub fn generate_in_package(
    package: &DiscoveredPackage,
    template: &LoadedTemplate,
    namer: &OutputNamer,
    mode: FileMode,
) -> Result<Option<PathBuf>> {
    if !package.has_sources() {
        return Ok(None);
    }

    let rendered = template.render(package)?;
    let file_name = namer.file_name(template.name())?;
    let path = package.dir.join(file_name);

    write_output(&path, rendered.as_bytes(), mode)?;
    Ok(Some(path))
}

/// Generate every template into every package.
pub fn generate(
    packages: &[DiscoveredPackage],
    templates: &[LoadedTemplate],
    options: &GenerationOptions,
) -> Result<GenerationReport> {
    debug!(
        packages = packages.len(),
        templates = templates.len(),
        "generating"
    );

    let namer = OutputNamer::new(&options.output_name_template)?;
    let mut report = GenerationReport::default();

    for package in packages {
        for template in templates {
            debug!(
                package = %package.name,
                dir = %package.dir.display(),
                template = template.name(),
                "generating"
            );
            match generate_in_package(package, template, &namer, options.file_mode) {
                Ok(Some(path)) => report.written.push(path),
                Ok(None) => report.skipped += 1,
                Err(e) => {
                    error!(
                        package = %package.name,
                        dir = %package.dir.display(),
                        template = template.name(),
                        "error while rendering file"
                    );
                    return Err(e);
                }
            }
        }
    }

    Ok(report)
}

/// Create or truncate `path` and write `contents`. `mode` applies on creation.
fn write_output(path: &Path, contents: &[u8], mode: FileMode) -> Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(mode.bits());
    }
    #[cfg(not(unix))]
    let _ = mode;

    let wrap = |source: std::io::Error| PkgenError::WriteOutput {
        path: path.to_path_buf(),
        source,
    };
    let mut file = options.open(path).map_err(wrap)?;
    file.write_all(contents).map_err(wrap)?;
    Ok(())
}

/// A full run: discover packages, load templates, generate.
pub struct Pipeline<L> {
    loader: L,
    resolver: TemplateResolver,
}

impl<L: PackageLoader> Pipeline<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            resolver: TemplateResolver::new(),
        }
    }

    pub async fn run(&self, config: &ResolvedConfig) -> Result<GenerationReport> {
        debug!(?config, "config");

        let packages = self.loader.load(config.query()).await.map_err(|e| {
            error!(err = %e, "error while querying packages");
            e
        })?;
        for package in &packages {
            debug!(?package, "queried package");
        }

        let templates = self
            .resolver
            .resolve_all(config.templates())
            .map_err(|e| {
                error!(err = %e, "error while processing templates");
                e
            })?;
        if templates.is_empty() {
            warn!("no templates configured; nothing to generate");
        }

        let report = generate(&packages, &templates, config.generate()).map_err(|e| {
            error!(err = %e, "error while generating files");
            e
        })?;

        info!(
            packages = packages.len(),
            templates = templates.len(),
            written = report.written.len(),
            skipped = report.skipped,
            "generation complete"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_OUTPUT_NAME_TEMPLATE;

    fn template(name: &str, source: &str) -> LoadedTemplate {
        LoadedTemplate::compile(name, source).unwrap()
    }

    #[test]
    fn test_generate_in_package_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let pkg = DiscoveredPackage::new("foo", dir.path(), &["a.go", "b.go"]);
        let namer = OutputNamer::new(DEFAULT_OUTPUT_NAME_TEMPLATE).unwrap();

        let path = generate_in_package(
            &pkg,
            &template("pkgpath", "package {{name}}\n"),
            &namer,
            FileMode::new(0o644),
        )
        .unwrap()
        .unwrap();

        assert_eq!(path, dir.path().join("zz_generated.pkgpath.go"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "package foo\n");
    }

    #[test]
    fn test_no_sources_no_write() {
        let dir = tempfile::tempdir().unwrap();
        let pkg = DiscoveredPackage::new("empty", dir.path(), &[]);
        let templates = vec![template("a", "x"), template("b", "y"), template("c", "z")];

        let report = generate(&[pkg], &templates, &GenerationOptions::default()).unwrap();
        assert!(report.written.is_empty());
        assert_eq!(report.skipped, 3);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_order_is_packages_then_templates() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        let pkgs = vec![
            DiscoveredPackage::new("a", a.path(), &["a.go"]),
            DiscoveredPackage::new("b", b.path(), &["b.go"]),
        ];
        let templates = vec![template("one", "1"), template("two", "2")];

        let report = generate(&pkgs, &templates, &GenerationOptions::default()).unwrap();
        assert_eq!(
            report.written,
            vec![
                a.path().join("zz_generated.one.go"),
                a.path().join("zz_generated.two.go"),
                b.path().join("zz_generated.one.go"),
                b.path().join("zz_generated.two.go"),
            ]
        );
    }

    #[test]
    fn test_fail_fast() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        let pkgs = vec![
            DiscoveredPackage::new("a", a.path(), &["a.go"]),
            DiscoveredPackage::new("b", b.path(), &["b.go"]),
        ];
        let templates = vec![template("ok", "fine"), template("bad", "{{nope}}")];

        let err = generate(&pkgs, &templates, &GenerationOptions::default()).unwrap_err();
        assert!(matches!(err, PkgenError::TemplateRender { ref template, .. } if template == "bad"));
        assert!(a.path().join("zz_generated.ok.go").exists());
        assert!(!b.path().join("zz_generated.ok.go").exists());
    }

    #[test]
    fn test_truncates_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("zz_generated.t.go");
        std::fs::write(&target, "a much longer previous content").unwrap();

        let pkg = DiscoveredPackage::new("p", dir.path(), &["p.go"]);
        generate(&[pkg], &[template("t", "new")], &GenerationOptions::default()).unwrap();
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "new");
    }

    #[test]
    fn test_write_failure() {
        let dir = tempfile::tempdir().unwrap();
        let pkg = DiscoveredPackage::new("p", dir.path().join("does-not-exist"), &["p.go"]);
        let err = generate(&[pkg], &[template("t", "x")], &GenerationOptions::default())
            .unwrap_err();
        assert!(matches!(err, PkgenError::WriteOutput { .. }));
    }

    #[test]
    fn test_bad_name_template_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let pkg = DiscoveredPackage::new("p", dir.path(), &["p.go"]);
        let options = GenerationOptions {
            output_name_template: "{{#each}}".into(),
            ..Default::default()
        };
        let err = generate(&[pkg], &[template("t", "x")], &options).unwrap_err();
        assert!(matches!(err, PkgenError::OutputName(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_file_mode_applied() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let pkg = DiscoveredPackage::new("p", dir.path(), &["p.go"]);
        let options = GenerationOptions {
            file_mode: FileMode::new(0o600),
            ..Default::default()
        };
        let report = generate(&[pkg], &[template("t", "x")], &options).unwrap();
        let mode = std::fs::metadata(&report.written[0]).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}

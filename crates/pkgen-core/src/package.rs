//! Package discovery.
//!
//! [`PackageLoader`] is the seam between the pipeline and whatever knows how to
//! find packages. [`GoListLoader`] drives `go list -json`, which reports the
//! same name/dir/files metadata the Go tooling uses.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::config::QueryConfig;
use crate::error::{PkgenError, Result};

/// Fields requested from `go list`.
const GO_LIST_FIELDS: &str = "Name,ImportPath,Dir,GoFiles,CgoFiles,OtherFiles,Module,Error";

/// The module a package belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoModule {
    #[serde(rename(deserialize = "Path"))]
    pub path: String,
    #[serde(rename(deserialize = "Dir"), default)]
    pub dir: Option<PathBuf>,
    #[serde(rename(deserialize = "GoVersion"), default)]
    pub go_version: Option<String>,
}

/// A package found by discovery. This is the root value templates render with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveredPackage {
    pub name: String,
    pub import_path: String,
    pub dir: PathBuf,
    /// Absolute paths of the package's source files.
    pub go_files: Vec<PathBuf>,
    /// Absolute paths of non-Go files in the package directory.
    pub other_files: Vec<PathBuf>,
    pub module: Option<GoModule>,
    /// Loader error for this package, if any.
    pub error: Option<String>,
}

impl DiscoveredPackage {
    /// A package with just a name, directory and file names relative to `dir`.
    pub fn new(name: impl Into<String>, dir: impl Into<PathBuf>, go_files: &[&str]) -> Self {
        let dir = dir.into();
        Self {
            name: name.into(),
            import_path: String::new(),
            go_files: go_files.iter().map(|f| dir.join(f)).collect(),
            dir,
            other_files: Vec::new(),
            module: None,
            error: None,
        }
    }

    pub fn with_import_path(mut self, import_path: impl Into<String>) -> Self {
        self.import_path = import_path.into();
        self
    }

    pub fn has_sources(&self) -> bool {
        !self.go_files.is_empty()
    }
}

/// Finds the packages a query matches.
#[async_trait]
pub trait PackageLoader: Send + Sync {
    /// Zero matching packages is not an error.
    async fn load(&self, query: &QueryConfig) -> Result<Vec<DiscoveredPackage>>;
}

/// Discovery through the `go list` command.
///
/// The child process is killed if the returned future is dropped, so callers
/// cancel discovery by dropping it (e.g. when racing Ctrl-C).
#[derive(Debug, Clone)]
pub struct GoListLoader {
    binary: PathBuf,
}

impl GoListLoader {
    /// Locate `go` on `PATH`.
    pub fn new() -> Result<Self> {
        let binary = which::which("go").map_err(|_| PkgenError::MissingTool {
            name: "go".into(),
            install: "https://go.dev/doc/install".into(),
        })?;
        Ok(Self { binary })
    }

    /// Use a specific `go` binary.
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }
}

#[async_trait]
impl PackageLoader for GoListLoader {
    async fn load(&self, query: &QueryConfig) -> Result<Vec<DiscoveredPackage>> {
        let env = parse_env_overrides(&query.env)?;
        let args = go_list_args(query);
        debug!(binary = %self.binary.display(), ?args, "running go list");

        let mut cmd = Command::new(&self.binary);
        cmd.args(&args)
            .envs(env)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        if let Some(dir) = &query.dir {
            cmd.current_dir(dir);
        }

        let output = cmd
            .output()
            .await
            .map_err(|e| PkgenError::Discovery(format!("failed to run go list: {e}")))?;

        if !output.status.success() {
            return Err(PkgenError::Discovery(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            warn!("go list: {}", stderr.trim());
        }

        parse_go_list(&output.stdout)
    }
}

/// Arguments for `go list`, patterns last.
pub fn go_list_args(query: &QueryConfig) -> Vec<String> {
    let mut args = vec![
        "list".to_string(),
        "-e".to_string(),
        format!("-json={GO_LIST_FIELDS}"),
    ];
    if query.include_tests {
        args.push("-test".to_string());
    }
    args.extend(query.build_flags.iter().cloned());
    args.push("--".to_string());
    args.extend(query.patterns.iter().cloned());
    args
}

/// Split `K=V` overrides. An entry without `=` or with an empty key is an error.
pub fn parse_env_overrides(env: &[String]) -> Result<Vec<(String, String)>> {
    env.iter()
        .map(|entry| match entry.split_once('=') {
            Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
            _ => Err(PkgenError::Discovery(format!(
                "invalid env override '{entry}' (expected KEY=VALUE)"
            ))),
        })
        .collect()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GoListPackage {
    #[serde(default)]
    name: String,
    #[serde(default)]
    import_path: String,
    #[serde(default)]
    dir: PathBuf,
    #[serde(default)]
    go_files: Vec<String>,
    #[serde(default)]
    cgo_files: Vec<String>,
    #[serde(default)]
    other_files: Vec<String>,
    #[serde(default)]
    module: Option<GoModule>,
    #[serde(default)]
    error: Option<GoListError>,
}

#[derive(Debug, Deserialize)]
struct GoListError {
    #[serde(rename = "Err", default)]
    err: String,
}

/// Decode the concatenated JSON objects `go list -json` prints.
///
/// With `-test`, `go list` also reports test variants (`p [p.test]`) and
/// external test packages (`p_test [p.test]`) in the directory of `p`. A
/// directory yields at most one package: external test packages are dropped,
/// and a variant only replaces an earlier entry for its directory when that
/// entry has no sources. Variant import paths lose their ` [...]` suffix.
pub fn parse_go_list(stdout: &[u8]) -> Result<Vec<DiscoveredPackage>> {
    let mut packages: Vec<DiscoveredPackage> = Vec::new();

    for item in serde_json::Deserializer::from_slice(stdout).into_iter::<GoListPackage>() {
        let raw =
            item.map_err(|e| PkgenError::Discovery(format!("invalid go list output: {e}")))?;

        // Synthesized test mains live in the build cache, not in a package dir.
        if raw.import_path.ends_with(".test") {
            debug!(package = %raw.import_path, "skipping test main package");
            continue;
        }

        if raw.name.ends_with("_test") {
            debug!(package = %raw.import_path, "skipping external test package");
            continue;
        }

        let error = raw.error.map(|e| e.err);
        if let Some(err) = &error {
            warn!(package = %raw.import_path, error = %err, "package loaded with errors");
        }

        let dir = raw.dir;
        let go_files = raw
            .go_files
            .iter()
            .chain(raw.cgo_files.iter())
            .map(|f| dir.join(f))
            .collect();
        let other_files = raw.other_files.iter().map(|f| dir.join(f)).collect();

        let import_path = match raw.import_path.split_once(" [") {
            Some((base, _)) => base.to_string(),
            None => raw.import_path,
        };
        let package = DiscoveredPackage {
            name: raw.name,
            import_path,
            dir,
            go_files,
            other_files,
            module: raw.module,
            error,
        };

        match packages.iter_mut().find(|p| p.dir == package.dir) {
            Some(existing) if !existing.has_sources() && package.has_sources() => {
                *existing = package;
            }
            Some(existing) => {
                debug!(
                    package = %existing.import_path,
                    dir = %existing.dir.display(),
                    "skipping test variant of an already listed package"
                );
            }
            None => packages.push(package),
        }
    }

    Ok(packages)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_go_list_args_default() {
        let args = go_list_args(&QueryConfig::default());
        assert_eq!(args[0], "list");
        assert_eq!(args[1], "-e");
        assert!(args[2].starts_with("-json="));
        assert_eq!(&args[3..], &["--", "./..."]);
    }

    #[test]
    fn test_go_list_args_full() {
        let query = QueryConfig {
            include_tests: true,
            env: vec![],
            build_flags: vec!["-tags=debug".into(), "-race".into()],
            dir: None,
            patterns: vec!["./cmd/...".into(), "./internal/...".into()],
        };
        let args = go_list_args(&query);
        assert_eq!(
            &args[3..],
            &["-test", "-tags=debug", "-race", "--", "./cmd/...", "./internal/..."]
        );
    }

    #[test]
    fn test_parse_env_overrides() {
        let env = vec!["GOOS=linux".to_string(), "GOFLAGS=-mod=vendor".to_string()];
        let parsed = parse_env_overrides(&env).unwrap();
        assert_eq!(
            parsed,
            vec![
                ("GOOS".to_string(), "linux".to_string()),
                ("GOFLAGS".to_string(), "-mod=vendor".to_string()),
            ]
        );

        assert!(parse_env_overrides(&["GOOS".to_string()]).is_err());
        assert!(parse_env_overrides(&["=linux".to_string()]).is_err());
    }

    #[test]
    fn test_parse_go_list_stream() {
        let out = br#"{
	"Dir": "/src/app/foo",
	"ImportPath": "example.com/app/foo",
	"Name": "foo",
	"Module": {"Path": "example.com/app", "Dir": "/src/app", "GoVersion": "1.22"},
	"GoFiles": ["a.go", "b.go"]
}
{
	"Dir": "/src/app/empty",
	"ImportPath": "example.com/app/empty",
	"Name": "empty"
}
{
	"ImportPath": "example.com/app/foo.test",
	"Name": "main",
	"Dir": "/src/app/foo",
	"GoFiles": ["/cache/_testmain.go"]
}
{
	"Dir": "/src/app/missing",
	"ImportPath": "example.com/app/missing",
	"Error": {"Err": "no Go files in /src/app/missing"}
}
"#;
        let pkgs = parse_go_list(out).unwrap();
        assert_eq!(pkgs.len(), 3);

        assert_eq!(pkgs[0].name, "foo");
        assert_eq!(
            pkgs[0].go_files,
            vec![PathBuf::from("/src/app/foo/a.go"), PathBuf::from("/src/app/foo/b.go")]
        );
        assert_eq!(pkgs[0].module.as_ref().unwrap().path, "example.com/app");
        assert!(pkgs[0].has_sources());

        assert!(!pkgs[1].has_sources());

        assert_eq!(
            pkgs[2].error.as_deref(),
            Some("no Go files in /src/app/missing")
        );
    }

    #[test]
    fn test_parse_go_list_test_variants() {
        let out = br#"
{"Dir": "/src/p", "ImportPath": "example.com/p", "Name": "p", "GoFiles": ["p.go"]}
{"Dir": "/src/p", "ImportPath": "example.com/p [example.com/p.test]", "Name": "p", "GoFiles": ["p.go", "p_internal_test.go"]}
{"Dir": "/src/p", "ImportPath": "example.com/p_test [example.com/p.test]", "Name": "p_test", "GoFiles": ["p_test.go"]}
{"Dir": "/src/p", "ImportPath": "example.com/p.test", "Name": "main", "GoFiles": ["/cache/_testmain.go"]}
"#;
        let pkgs = parse_go_list(out).unwrap();
        assert_eq!(pkgs.len(), 1);
        assert_eq!(pkgs[0].name, "p");
        assert_eq!(pkgs[0].import_path, "example.com/p");
        assert_eq!(pkgs[0].go_files, vec![PathBuf::from("/src/p/p.go")]);
    }

    #[test]
    fn test_parse_go_list_tests_only_package() {
        let out = br#"
{"Dir": "/src/t", "ImportPath": "example.com/t", "Name": "t", "Error": {"Err": "no non-test Go files"}}
{"Dir": "/src/t", "ImportPath": "example.com/t [example.com/t.test]", "Name": "t", "GoFiles": ["t_test.go"]}
{"Dir": "/src/t", "ImportPath": "example.com/t_test [example.com/t.test]", "Name": "t_test", "GoFiles": ["x_test.go"]}
"#;
        let pkgs = parse_go_list(out).unwrap();
        assert_eq!(pkgs.len(), 1);
        assert_eq!(pkgs[0].name, "t");
        assert_eq!(pkgs[0].import_path, "example.com/t");
        assert!(pkgs[0].has_sources());
    }

    #[test]
    fn test_parse_go_list_empty() {
        assert!(parse_go_list(b"").unwrap().is_empty());
    }

    #[test]
    fn test_parse_go_list_garbage() {
        let err = parse_go_list(b"{ not json").unwrap_err();
        assert!(matches!(err, PkgenError::Discovery(_)));
    }

    #[tokio::test]
    async fn test_missing_binary_is_discovery_error() {
        let loader = GoListLoader::with_binary("/nonexistent/pkgen-test/go");
        let err = loader.load(&QueryConfig::default()).await.unwrap_err();
        assert!(matches!(err, PkgenError::Discovery(_)));
    }

    #[tokio::test]
    async fn test_bad_env_fails_before_spawn() {
        let loader = GoListLoader::with_binary("/nonexistent/pkgen-test/go");
        let query = QueryConfig {
            env: vec!["NOEQUALS".into()],
            ..Default::default()
        };
        let err = loader.load(&query).await.unwrap_err();
        assert!(err.to_string().contains("NOEQUALS"));
    }
}

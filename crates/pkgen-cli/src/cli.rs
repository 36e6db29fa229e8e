//! Command-line flags.
//!
//! Every long flag is accepted with one or two dashes (`-template x` and
//! `--template x`), the way `go generate` directives are usually written.
//! clap only knows the double-dash form, so [`normalize_args`] rewrites known
//! single-dash long flags before parsing.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser};

use pkgen_core::config::{ConfigRequest, FileMode, PartialConfig, PartialGenerate, PartialQuery};
use pkgen_core::templates::{TemplateReference, TemplateReferences};

#[derive(Parser, Debug)]
#[command(
    name = "pkgen",
    about = "Generate files into Go packages from built-in or custom templates",
    version
)]
pub struct Cli {
    /// Config file to use (default: ./.pkgen.yml when present)
    #[arg(short = 'c', long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Built-in template to generate (repeatable)
    #[arg(long = "template", value_name = "NAME")]
    pub template: Vec<String>,

    /// Custom template file to generate (repeatable)
    #[arg(long = "template-file", value_name = "PATH")]
    pub template_file: Vec<PathBuf>,

    /// Include test packages in the query
    #[arg(long = "include_tests")]
    pub include_tests: bool,

    /// Environment override for the package query (repeatable)
    #[arg(long = "env", value_name = "K=V")]
    pub env: Vec<String>,

    /// Build flag for the package query (repeatable)
    #[arg(long = "build_flag", value_name = "FLAG", allow_hyphen_values = true)]
    pub build_flag: Vec<String>,

    /// Working directory of the package query
    #[arg(long = "dir", value_name = "PATH")]
    pub dir: Option<PathBuf>,

    /// Package pattern to query (repeatable, default: ./...)
    #[arg(long = "pattern", value_name = "PATTERN")]
    pub pattern: Vec<String>,

    /// Output file name template (default: zz_generated.{{template_name}}.go)
    #[arg(long = "output", value_name = "NAME_TEMPLATE")]
    pub output: Option<String>,

    /// Permission of generated files, octal: 0o644, 0O644 or 644
    #[arg(long = "mod", value_name = "PERM", value_parser = parse_file_mode)]
    pub mode: Option<FileMode>,

    /// Enable debug logging
    #[arg(long = "verbose")]
    pub verbose: bool,
}

/// Parsed flags plus the template references in the order they were given.
#[derive(Debug)]
pub struct Invocation {
    pub cli: Cli,
    pub templates: TemplateReferences,
}

impl Invocation {
    /// The command line's contribution to config resolution.
    pub fn config_request(&self) -> ConfigRequest {
        let cli = &self.cli;
        ConfigRequest {
            cli: PartialConfig {
                packages_query: PartialQuery {
                    include_tests: cli.include_tests,
                    env: cli.env.clone(),
                    build_flags: cli.build_flag.clone(),
                    dir: cli.dir.clone(),
                    patterns: cli.pattern.clone(),
                },
                templates: self.templates.clone(),
                generate: PartialGenerate {
                    output: cli.output.clone(),
                    mode: cli.mode,
                },
                verbose: cli.verbose,
            },
            config_file: cli.config.clone(),
        }
    }
}

/// Parse `args` (program name first).
pub fn parse_from<I, T>(args: I) -> Result<Invocation, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let matches = Cli::command().try_get_matches_from(normalize_args(args))?;
    let cli = Cli::from_arg_matches(&matches)?;
    let templates = template_references(&matches);
    Ok(Invocation { cli, templates })
}

/// `-template` and `-template-file` occurrences, interleaved in argv order.
fn template_references(matches: &ArgMatches) -> TemplateReferences {
    let mut ordered: Vec<(usize, TemplateReference)> = Vec::new();

    if let (Some(indices), Some(values)) = (
        matches.indices_of("template"),
        matches.get_many::<String>("template"),
    ) {
        ordered.extend(indices.zip(values).map(|(i, v)| (i, TemplateReference::named(v))));
    }
    if let (Some(indices), Some(values)) = (
        matches.indices_of("template_file"),
        matches.get_many::<PathBuf>("template_file"),
    ) {
        ordered.extend(indices.zip(values).map(|(i, v)| (i, TemplateReference::file(v))));
    }

    ordered.sort_by_key(|(i, _)| *i);
    ordered.into_iter().map(|(_, r)| r).collect()
}

fn parse_file_mode(s: &str) -> Result<FileMode, String> {
    s.parse().map_err(|e: pkgen_core::error::PkgenError| e.to_string())
}

/// Rewrite single-dash long flags (`-include_tests`, `-mod=600`) to their
/// double-dash form. Values of value-taking flags and everything after `--`
/// pass through untouched.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let cmd = Cli::command();
    let mut longs: Vec<(String, bool)> = vec![("help".into(), false), ("version".into(), false)];
    let mut shorts: Vec<(char, bool)> = vec![('h', false), ('V', false)];
    for arg in cmd.get_arguments() {
        let takes_value = arg.get_action().takes_values();
        if let Some(long) = arg.get_long() {
            longs.push((long.to_string(), takes_value));
        }
        if let Some(short) = arg.get_short() {
            shorts.push((short, takes_value));
        }
    }
    let long_takes_value = |name: &str| longs.iter().find(|(l, _)| l == name).map(|(_, v)| *v);

    let mut args = args.into_iter().map(Into::into);
    let mut out: Vec<OsString> = args.next().into_iter().collect();
    let mut expect_value = false;
    let mut passthrough = false;

    for arg in args {
        if passthrough || expect_value {
            expect_value = false;
            out.push(arg);
            continue;
        }
        let Some(s) = arg.to_str() else {
            out.push(arg);
            continue;
        };

        if s == "--" {
            passthrough = true;
        } else if let Some(rest) = s.strip_prefix("--") {
            let (name, inline_value) = split_flag(rest);
            expect_value = long_takes_value(name).unwrap_or(false) && !inline_value;
        } else if let Some(rest) = s.strip_prefix('-') {
            let (name, inline_value) = split_flag(rest);
            if name.chars().count() > 1 {
                if let Some(takes_value) = long_takes_value(name) {
                    expect_value = takes_value && !inline_value;
                    out.push(OsString::from(format!("-{s}")));
                    continue;
                }
            } else if let Some(c) = name.chars().next() {
                expect_value = shorts
                    .iter()
                    .any(|(short, takes_value)| *short == c && *takes_value)
                    && !inline_value;
            }
        }
        out.push(arg);
    }

    out
}

fn split_flag(flag: &str) -> (&str, bool) {
    match flag.split_once('=') {
        Some((name, _)) => (name, true),
        None => (flag, false),
    }
}

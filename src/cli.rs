//! `rttimeta` command line: hash canonical names and audit them for id
//! collisions before they ship in a hierarchy.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::config::{CollisionPolicy, RttiConfig};
use crate::error::{Result, RttiError};
use crate::hash::{fnv1a_32, RttiId};
use crate::logging::init_logging;

/// Exit status when collisions are found in strict mode
pub const EXIT_COLLISIONS: i32 = 2;

#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Files with one canonical name per line; `-` reads stdin
    pub files: Vec<PathBuf>,
    /// Names given with `--name`
    pub names: Vec<String>,
    pub json: bool,
    pub strict: bool,
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    pub fn from_args<I>(args: I) -> std::result::Result<Self, String>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let prog = args.next().unwrap_or_else(|| "rttimeta".to_string());
        let mut config = Self::default();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--help" | "-h" => return Err(usage(&prog)),
                "--json" => config.json = true,
                "--strict" => config.strict = true,
                "--name" => match args.next() {
                    Some(name) => config.names.push(name),
                    None => return Err(format!("--name needs a value\n\n{}", usage(&prog))),
                },
                "--config" => match args.next() {
                    Some(path) => config.config_path = Some(PathBuf::from(path)),
                    None => return Err(format!("--config needs a value\n\n{}", usage(&prog))),
                },
                "-" => config.files.push(PathBuf::from("-")),
                opt if opt.starts_with("--") => {
                    return Err(format!("Unknown option: {}\n\n{}", opt, usage(&prog)))
                }
                path => config.files.push(PathBuf::from(path)),
            }
        }

        if config.files.is_empty() && config.names.is_empty() {
            return Err(format!("No names given\n\n{}", usage(&prog)));
        }
        Ok(config)
    }
}

fn usage(prog: &str) -> String {
    format!(
        "rttimeta - canonical name hashing and collision audit\n\n\
        USAGE:\n    {} [OPTIONS] [FILES...]\n\n\
        OPTIONS:\n    \
        -h, --help         Print help information\n    \
        --name <NAME>      Hash a single canonical name (repeatable)\n    \
        --json             Print the report as JSON\n    \
        --strict           Exit with status 2 if any ids collide\n    \
        --config <FILE>    Read settings from a TOML file\n\n\
        FILES hold one name per line; blank lines and '#' comments are skipped.\n\
        Use '-' to read names from stdin.",
        prog
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameEntry {
    pub name: String,
    pub id: RttiId,
    pub hex: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollisionGroup {
    pub id: RttiId,
    pub names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    pub entries: Vec<NameEntry>,
    pub collisions: Vec<CollisionGroup>,
}

impl AuditReport {
    /// Hash every distinct name and group the ones sharing an id
    pub fn build<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut by_id: BTreeMap<RttiId, Vec<String>> = BTreeMap::new();
        let mut entries = Vec::new();

        for name in names {
            let id = fnv1a_32(name);
            let group = by_id.entry(id).or_default();
            if group.iter().any(|n| n == name) {
                continue;
            }
            group.push(name.to_string());
            entries.push(NameEntry {
                name: name.to_string(),
                id,
                hex: format!("{:#010x}", id),
            });
        }

        let collisions = by_id
            .into_iter()
            .filter(|(_, names)| names.len() > 1)
            .map(|(id, names)| CollisionGroup { id, names })
            .collect();

        Self { entries, collisions }
    }

    pub fn has_collisions(&self) -> bool {
        !self.collisions.is_empty()
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            out.push_str(&format!("{}  {}\n", entry.hex, entry.name));
        }
        if self.collisions.is_empty() {
            out.push_str(&format!("{} names, no collisions\n", self.entries.len()));
        } else {
            for group in &self.collisions {
                out.push_str(&format!(
                    "collision {:#010x}: {}\n",
                    group.id,
                    group.names.join(", ")
                ));
            }
        }
        out
    }
}

/// Strip comments and blanks from a name list
pub fn parse_names(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|line| line.split('#').next().unwrap_or("").trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

pub struct Cli {
    config: CliConfig,
}

impl Cli {
    pub fn new(config: CliConfig) -> Self {
        Self { config }
    }

    /// Run the audit and return the process exit status
    pub fn run(&self) -> Result<i32> {
        let settings = RttiConfig::load(self.config.config_path.as_deref())?;
        let _guard = init_logging(settings.log.to_log_config());

        let strict =
            self.config.strict || settings.registry.collision_policy == CollisionPolicy::Reject;

        let names = self.collect_names()?;
        info!(names = names.len(), strict, "auditing canonical names");

        let report = AuditReport::build(names.iter().map(String::as_str));
        if self.config.json {
            let json = serde_json::to_string_pretty(&report)
                .map_err(|e| RttiError::config(None, e.to_string()))?;
            println!("{}", json);
        } else {
            print!("{}", report.render_text());
        }

        if report.has_collisions() {
            warn!(groups = report.collisions.len(), "id collisions found");
            if strict {
                return Ok(EXIT_COLLISIONS);
            }
        }
        Ok(0)
    }

    fn collect_names(&self) -> Result<Vec<String>> {
        let mut names = self.config.names.clone();
        for path in &self.config.files {
            let content = if path.as_os_str() == "-" {
                let mut buf = String::new();
                io::stdin().read_to_string(&mut buf)?;
                buf
            } else {
                fs::read_to_string(path)?
            };
            let parsed = parse_names(&content);
            debug!(file = %path.display(), count = parsed.len(), "names loaded");
            names.extend(parsed);
        }
        Ok(names)
    }
}

/// Entry point used by the `rttimeta` binary
pub fn cli_main() -> Result<i32> {
    let config = match CliConfig::from_args(std::env::args()) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("{}", message);
            return Ok(1);
        }
    };
    Cli::new(config).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("rttimeta")
            .chain(list.iter().copied())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_parse_args() {
        let config =
            CliConfig::from_args(args(&["--json", "--name", "zoo::Penguin", "names.txt"])).unwrap();
        assert!(config.json);
        assert!(!config.strict);
        assert_eq!(config.names, vec!["zoo::Penguin"]);
        assert_eq!(config.files, vec![PathBuf::from("names.txt")]);
    }

    #[test]
    fn test_parse_args_errors() {
        assert!(CliConfig::from_args(args(&[])).is_err());
        assert!(CliConfig::from_args(args(&["--name"])).is_err());
        assert!(CliConfig::from_args(args(&["--bogus", "x"])).is_err());
        assert!(CliConfig::from_args(args(&["--help"])).is_err());
    }

    #[test]
    fn test_parse_names() {
        let names = parse_names("zoo::A\n\n# header\nzoo::B  # trailing\n   \n");
        assert_eq!(names, vec!["zoo::A", "zoo::B"]);
    }

    #[test]
    fn test_report_dedupes_and_groups() {
        let report = AuditReport::build(["zoo::A", "zoo::B", "zoo::A"]);
        assert_eq!(report.entries.len(), 2);
        assert!(!report.has_collisions());
        assert_eq!(report.entries[0].id, fnv1a_32("zoo::A"));
        assert!(report.render_text().ends_with("2 names, no collisions\n"));
    }

    #[test]
    fn test_report_finds_collision() {
        // Classic 32-bit FNV-1a collision pair
        let report = AuditReport::build(["costarring", "liquid"]);
        assert_eq!(fnv1a_32("costarring"), fnv1a_32("liquid"));
        assert!(report.has_collisions());
        assert_eq!(report.collisions[0].names, vec!["costarring", "liquid"]);
        assert!(report.render_text().contains("collision"));
    }

    #[test]
    fn test_report_json() {
        let report = AuditReport::build(["zoo::A"]);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["entries"][0]["name"], "zoo::A");
        assert_eq!(json["collisions"].as_array().map(Vec::len), Some(0));
    }

    #[test]
    fn test_run_reads_files() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "zoo::A\nzoo::B").unwrap();

        let cli = Cli::new(CliConfig {
            files: vec![file.path().to_path_buf()],
            ..CliConfig::default()
        });
        assert_eq!(cli.collect_names().unwrap(), vec!["zoo::A", "zoo::B"]);
        assert_eq!(cli.run().unwrap(), 0);
    }

    #[test]
    fn test_run_missing_config_fails() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli::new(CliConfig {
            names: vec!["zoo::A".to_string()],
            config_path: Some(dir.path().join("missing.toml")),
            ..CliConfig::default()
        });
        assert!(matches!(cli.run(), Err(RttiError::Config { .. })));
    }

    #[test]
    fn test_run_strict_collision_status() {
        let cli = Cli::new(CliConfig {
            names: vec!["costarring".to_string(), "liquid".to_string()],
            strict: true,
            ..CliConfig::default()
        });
        assert_eq!(cli.run().unwrap(), EXIT_COLLISIONS);
    }
}

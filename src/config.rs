//! Configuration management for mdtabs.
//!
//! Handles:
//! - Command-line argument parsing
//! - Project configuration (`.mdtabs.toml`, searched upward)
//! - User configuration (`<config dir>/mdtabs/config.toml`)
//!
//! Priority: command line > project > user > built-in defaults.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::view::ViewKind;

/// File name of the project configuration
pub const PROJECT_CONFIG_FILE: &str = ".mdtabs.toml";

/// Command-line arguments for mdtabs
#[derive(Debug, Parser)]
#[command(name = "mdtabs")]
#[command(about = "Convert table dialects and render markdown views headlessly")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Do not escape math delimiters before rendering
    #[arg(long, global = true)]
    pub no_math: bool,

    /// Keep raw HTML found in the markdown source
    #[arg(long, global = true)]
    pub allow_raw_html: bool,

    /// External math typesetter, reads HTML on stdin and writes it on stdout
    #[arg(long, global = true, help = "Typesetter command (e.g. 'katex-filter --inline')")]
    pub typeset_cmd: Option<String>,

    /// Give up on typesetting after this many milliseconds
    #[arg(long, global = true)]
    pub typeset_timeout_ms: Option<u64>,

    /// Explicit configuration file, replaces the project config lookup
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level
    #[arg(
        long,
        global = true,
        default_value = "info",
        help = "Log level (trace, debug, info, warn, error)"
    )]
    pub log_level: String,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the source with custom table headers converted
    Convert {
        /// Input file (stdin when omitted)
        file: Option<PathBuf>,
    },
    /// Render the source through the view machine and print the visible view
    Render {
        /// Input file (stdin when omitted)
        file: Option<PathBuf>,

        /// View to show after startup
        #[arg(long, value_enum)]
        view: Option<ViewKind>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Html)]
        format: OutputFormat,
    },
    /// Re-render whenever the input file changes
    Watch {
        /// Input file
        file: PathBuf,

        /// Write rendered HTML here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Content of the visible view
    Html,
    /// View states plus content as JSON
    Json,
}

/// Settings read from a TOML configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub math: Option<bool>,
    pub initial_view: Option<ViewKind>,
    pub allow_raw_html: Option<bool>,
    pub typeset_command: Option<String>,
    pub typeset_timeout_ms: Option<u64>,
    pub views: Option<Vec<ViewKind>>,
}

impl FileConfig {
    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

/// Combined configuration from all sources
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Escape math delimiters before markdown rendering
    pub math: bool,
    /// View shown at startup (markdown when unset and registered)
    pub initial_view: Option<ViewKind>,
    /// Keep raw HTML in rendered markdown
    pub allow_raw_html: bool,
    /// External typesetter command line
    pub typeset_command: Option<String>,
    /// Typesetting timeout
    pub typeset_timeout: Option<Duration>,
    /// Registered views, in order
    pub views: Vec<ViewKind>,
    /// Log level
    pub log_level: String,
    /// Project config that was applied, if any
    pub project_config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            math: true,
            initial_view: None,
            allow_raw_html: false,
            typeset_command: None,
            typeset_timeout: None,
            views: ViewKind::ALL.to_vec(),
            log_level: "info".to_string(),
            project_config_path: None,
        }
    }
}

impl Config {
    /// Create configuration from explicit arguments, looking for config
    /// files relative to the current directory
    pub fn from_args(args: &Args) -> Result<Self> {
        let cwd = std::env::current_dir()?;
        let user_config = dirs::config_dir().map(|dir| dir.join("mdtabs").join("config.toml"));
        Self::resolve(args, &cwd, user_config.as_deref())
    }

    /// Resolve configuration layers.
    ///
    /// Useful for testing: the project search starts at `cwd` and the user
    /// config path is passed in.
    pub fn resolve(args: &Args, cwd: &Path, user_config: Option<&Path>) -> Result<Self> {
        let mut config = Config::default();

        if let Some(path) = user_config.filter(|p| p.is_file()) {
            log::debug!("Loading user config from {}", path.display());
            config.merge(FileConfig::load(path)?);
        }

        let project_path = match &args.config {
            Some(explicit) => Some(explicit.clone()),
            None => find_project_config(cwd),
        };
        if let Some(path) = project_path {
            log::debug!("Loading project config from {}", path.display());
            config.merge(FileConfig::load(&path)?);
            config.project_config_path = Some(path);
        }

        config.apply_args(args);
        Ok(config)
    }

    /// Overlay values present in a config file
    pub fn merge(&mut self, file: FileConfig) {
        if let Some(math) = file.math {
            self.math = math;
        }
        if let Some(initial_view) = file.initial_view {
            self.initial_view = Some(initial_view);
        }
        if let Some(allow_raw_html) = file.allow_raw_html {
            self.allow_raw_html = allow_raw_html;
        }
        if let Some(command) = file.typeset_command {
            self.typeset_command = Some(command);
        }
        if let Some(ms) = file.typeset_timeout_ms {
            self.typeset_timeout = Some(Duration::from_millis(ms));
        }
        if let Some(views) = file.views {
            self.views = views;
        }
    }

    fn apply_args(&mut self, args: &Args) {
        if args.no_math {
            self.math = false;
        }
        if args.allow_raw_html {
            self.allow_raw_html = true;
        }
        if let Some(command) = &args.typeset_cmd {
            self.typeset_command = Some(command.clone());
        }
        if let Some(ms) = args.typeset_timeout_ms {
            self.typeset_timeout = Some(Duration::from_millis(ms));
        }
        self.log_level = args.log_level.clone();
    }

    pub fn has_project_config(&self) -> bool {
        self.project_config_path.is_some()
    }
}

/// Find `.mdtabs.toml` in `start` or any of its ancestors
pub fn find_project_config(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(PROJECT_CONFIG_FILE))
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_file_config() {
        let file = FileConfig::parse(
            r#"
math = false
initial_view = "plain"
views = ["raw", "plain"]
typeset_timeout_ms = 250
"#,
        )
        .unwrap();
        assert_eq!(file.math, Some(false));
        assert_eq!(file.initial_view, Some(ViewKind::Plain));
        assert_eq!(file.views, Some(vec![ViewKind::Raw, ViewKind::Plain]));
        assert_eq!(file.typeset_timeout_ms, Some(250));
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(FileConfig::parse("colour = \"red\"").is_err());
    }

    #[test]
    fn test_merge_keeps_unset_values() {
        let mut config = Config::default();
        config.merge(FileConfig {
            allow_raw_html: Some(true),
            ..Default::default()
        });
        assert!(config.allow_raw_html);
        assert!(config.math);
        assert_eq!(config.views, ViewKind::ALL.to_vec());
    }

    #[test]
    fn test_args_override_files() {
        let args = Args::parse_from([
            "mdtabs",
            "--no-math",
            "--typeset-cmd",
            "cat",
            "convert",
        ]);
        let mut config = Config::default();
        config.merge(FileConfig {
            math: Some(true),
            typeset_command: Some("katex".to_string()),
            ..Default::default()
        });
        config.apply_args(&args);
        assert!(!config.math);
        assert_eq!(config.typeset_command.as_deref(), Some("cat"));
    }
}

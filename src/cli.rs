use crate::config::{CliOverrides, Config};
use crate::error::{ExtractorError, Result};
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "dashres")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Extract the shared resource package from an Xbox xam container")]
#[command(
    long_about = "DashRes runs xextool against a xam/xex container and publishes the \
                  extracted shared resource as shrdres.xzp in the output directory."
)]
#[command(after_help = "EXAMPLES:\n  \
    dashres xam.xex\n  \
    dashres xam.xex ExtractDir\n  \
    dashres xam.xex out --tool /opt/xextool/xextool --timeout 60 --strict")]
pub struct Cli {
    /// Path to the xam/xex container
    pub input: Option<PathBuf>,

    /// Output directory (defaults to ExtractDirectory next to the program)
    pub output_dir: Option<PathBuf>,

    /// Path to the extraction tool
    #[arg(long, env = "DASHRES_TOOL", help = "Path to xextool (defaults to the program directory)")]
    pub tool: Option<PathBuf>,

    /// Extraction timeout in seconds
    #[arg(long, help = "Maximum time to wait for the extraction tool (seconds)")]
    pub timeout: Option<u64>,

    /// Treat a nonzero tool exit code as failure
    #[arg(long, help = "Fail when the extraction tool exits with a nonzero code")]
    pub strict: bool,

    /// Wait for a key press before exiting
    #[arg(long, help = "Wait for a key press before exiting")]
    pub pause: bool,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Dry run (show what would be done without executing)
    #[arg(long, help = "Validate inputs and show the extraction plan without running the tool")]
    pub dry_run: bool,

    /// Generate sample configuration file
    #[arg(long, help = "Generate a sample configuration file")]
    pub generate_config: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        config.merge_with_cli_args(&self.create_cli_overrides());
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_tool_path(self.tool.clone())
            .with_timeout(self.timeout)
            .with_require_success(self.strict)
            .with_output_dir(self.output_dir.clone())
            .with_pause(self.pause)
    }

    /// The input path, or a usage error when it was not supplied.
    pub fn require_input(&self) -> Result<&Path> {
        self.input.as_deref().ok_or_else(|| ExtractorError::Usage {
            usage: usage_text(),
        })
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}

pub fn usage_text() -> String {
    format!(
        "Usage:\n  \
         dashres <XAM_FILE>\n  \
         dashres <XAM_FILE> <OUTPUT_DIR>\n\n\
         Example:\n  \
         dashres xam.xex {}\n\n\
         Run 'dashres --help' for all options.",
        crate::config::DEFAULT_OUTPUT_DIR_NAME
    )
}

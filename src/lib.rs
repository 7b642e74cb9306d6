pub mod cli;
pub mod config;
pub mod error;
pub mod runner;
pub mod ui;
pub mod workspace;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{CliOverrides, Config, OutputConfig, ToolConfig};
pub use error::{ExtractorError, Result, UserFriendlyError};

// Core functionality re-exports
pub use runner::{ToolOutcome, ToolRunner};
pub use ui::{GracefulShutdown, OutputFormatter, OutputMode, ProgressManager};
pub use workspace::{
    ArtifactPublisher, ExtractionReport, PublishedArtifact, ScratchDirectory, ARTIFACT_NAME,
    PUBLISHED_NAME,
};

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Resolved inputs of one extraction run.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionPlan {
    pub input: PathBuf,
    pub tool: PathBuf,
    pub output_dir: PathBuf,
    pub destination: PathBuf,
    pub timeout_secs: u64,
    pub require_success: bool,
}

/// Main library interface: runs xextool and publishes `shrdres.xzp`.
pub struct ResourceExtractor {
    config: Config,
    program_dir: PathBuf,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
    shutdown: GracefulShutdown,
}

impl ResourceExtractor {
    /// Create a new ResourceExtractor rooted at the running executable's directory
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Result<Self> {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(!quiet && output_mode == OutputMode::Human);
        let shutdown = GracefulShutdown::new()?;

        Ok(Self {
            config,
            program_dir: program_directory()?,
            output_formatter,
            progress_manager,
            shutdown,
        })
    }

    /// Create a ResourceExtractor for testing (no signal handler conflicts)
    #[cfg(test)]
    pub fn new_for_test(config: Config, program_dir: PathBuf) -> Self {
        Self {
            config,
            program_dir,
            output_formatter: OutputFormatter::new(OutputMode::Plain, 0, true),
            progress_manager: ProgressManager::new(false),
            shutdown: GracefulShutdown::new_for_test(),
        }
    }

    /// Create ResourceExtractor instance from CLI arguments
    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        Self::new(
            config,
            output_mode_for(&cli_args.output_format),
            cli_args.verbosity_level(),
            cli_args.quiet,
        )
    }

    /// Validate the input and the tool, and resolve every path the run needs.
    /// Performs no filesystem mutation.
    pub fn plan(&self, input: &Path) -> Result<ExtractionPlan> {
        if !input.is_file() {
            return Err(ExtractorError::InputNotFound {
                path: input.to_path_buf(),
            });
        }

        let tool = std::path::absolute(self.config.resolve_tool_path(&self.program_dir))?;
        ToolRunner::new(&tool).locate()?;

        let output_dir =
            std::path::absolute(self.config.resolve_output_directory(&self.program_dir))?;

        Ok(ExtractionPlan {
            input: std::path::absolute(input)?,
            tool,
            destination: output_dir.join(PUBLISHED_NAME),
            output_dir,
            timeout_secs: self.config.tool.timeout,
            require_success: self.config.tool.require_success,
        })
    }

    /// Run the full pipeline for `input`.
    pub fn extract(&self, input: &Path) -> Result<ExtractionReport> {
        let start_time = Instant::now();
        self.shutdown.check_shutdown()?;

        self.output_formatter.start_operation("Extraction started");

        let plan = self.plan(input)?;
        self.output_formatter
            .debug(&format!("Using extraction tool {}", plan.tool.display()));

        let scratch = self.prepare_directories(&plan)?;

        // Every early return below drops `scratch`, removing the temporary directory.
        let outcome = self.run_tool(&plan, scratch.path())?;
        self.shutdown.check_shutdown()?;

        let mut warnings = Vec::new();
        if !outcome.success() {
            if plan.require_success {
                return Err(ExtractorError::ToolFailed {
                    status: outcome.describe_status(),
                });
            }
            let message = format!(
                "Extraction tool exited with {}; checking for {} anyway",
                outcome.describe_status(),
                ARTIFACT_NAME
            );
            self.output_formatter.warning(&message);
            warnings.push(message);
        }

        let publisher = ArtifactPublisher::new(&plan.output_dir);
        let artifact = publisher.locate_artifact(scratch.path())?;
        let published = publisher.publish(&artifact)?;
        self.output_formatter
            .info(&format!("Published {}", published.path.display()));

        if let Err(e) = scratch.close() {
            let message = format!("Failed to remove temporary directory: {}", e);
            self.output_formatter.warning(&message);
            warnings.push(message);
        }

        let report = ExtractionReport {
            input: plan.input,
            artifact: published.path,
            artifact_size: published.size,
            tool: plan.tool,
            tool_exit_code: outcome.exit_code(),
            tool_duration: outcome.elapsed,
            total_duration: start_time.elapsed(),
            completed_at: chrono::Utc::now(),
            warnings,
        };
        self.output_formatter.debug(&report.display_summary());

        Ok(report)
    }

    /// Ensure the output directory exists and create this run's scratch directory
    fn prepare_directories(&self, plan: &ExtractionPlan) -> Result<ScratchDirectory> {
        workspace::ensure_directory(&plan.output_dir)?;
        let scratch = ScratchDirectory::create()?;

        self.output_formatter.debug(&format!(
            "Output directory: {}\nTemporary directory: {}",
            plan.output_dir.display(),
            scratch.path().display()
        ));

        Ok(scratch)
    }

    /// Run the extraction tool with a spinner while it works
    fn run_tool(&self, plan: &ExtractionPlan, scratch_dir: &Path) -> Result<ToolOutcome> {
        let timeout = self.config.tool_timeout_duration();
        let spinner = self.progress_manager.create_spinner("Running extraction tool");
        let progress_callback = {
            let pb = spinner.clone();
            move |elapsed: std::time::Duration| ui::progress::update_tool_progress(&pb, elapsed, timeout)
        };

        let runner = ToolRunner::new(&plan.tool)
            .with_working_dir(&self.program_dir)
            .with_timeout(timeout)
            .with_show_output(self.output_formatter.verbose_level() >= 2)
            .with_cancel_flag(self.shutdown.flag())
            .with_progress(progress_callback);

        let result = runner.run(scratch_dir, &plan.input);
        match result {
            Ok(ref outcome) => ui::progress::finish_progress_with_summary(
                &spinner,
                "Extraction tool finished",
                outcome.elapsed,
            ),
            Err(_) => spinner.finish_and_clear(),
        }

        result
    }

    /// Generate sample configuration file
    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        Config::default().save_to_file(output_path)
    }

    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    /// Handle error with user-friendly output
    pub fn handle_error(&self, error: &ExtractorError) {
        self.output_formatter.print_user_friendly_error(error);
    }

    pub fn pause_if_requested(&self) {
        if self.config.output.pause {
            self.output_formatter.wait_for_key();
        }
    }
}

pub fn output_mode_for(format: &OutputFormat) -> OutputMode {
    match format {
        OutputFormat::Human => OutputMode::Human,
        OutputFormat::Json => OutputMode::Json,
        OutputFormat::Plain => OutputMode::Plain,
    }
}

/// Directory containing the running executable.
pub fn program_directory() -> Result<PathBuf> {
    let exe = std::env::current_exe()?;
    Ok(exe
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(".")))
}

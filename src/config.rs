use crate::error::{ExtractorError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the extraction tool expected next to the program binary.
pub const DEFAULT_TOOL_NAME: &str = if cfg!(windows) { "xextool.exe" } else { "xextool" };

/// Output subdirectory used when none is given, relative to the program directory.
pub const DEFAULT_OUTPUT_DIR_NAME: &str = "ExtractDirectory";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub tool: ToolConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ToolConfig {
    pub executable: String,
    pub path: Option<PathBuf>,
    pub timeout: u64,
    pub require_success: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: Option<PathBuf>,
    pub pause: bool,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            executable: DEFAULT_TOOL_NAME.to_string(),
            path: None,    // Resolved next to the program binary
            timeout: 300, // 5 minutes
            require_success: false,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ExtractorError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| ExtractorError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ExtractorError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["dashres.toml", ".dashres.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref tool_path) = cli_args.tool_path {
            self.tool.path = Some(tool_path.clone());
        }

        if let Some(timeout) = cli_args.timeout {
            self.tool.timeout = timeout;
        }

        if cli_args.require_success {
            self.tool.require_success = true;
        }

        if let Some(ref output_dir) = cli_args.output_dir {
            self.output.directory = Some(output_dir.clone());
        }

        if cli_args.pause {
            self.output.pause = true;
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| ExtractorError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        std::fs::write(path, content).map_err(|e| ExtractorError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.tool.executable.trim().is_empty() {
            return Err(ExtractorError::Config {
                message: "Tool executable name must not be empty".to_string(),
            });
        }

        if self.tool.timeout == 0 {
            return Err(ExtractorError::Config {
                message: "Tool timeout must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    pub fn tool_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.tool.timeout)
    }

    /// Location of the extraction tool: the configured path, or the executable
    /// name inside `program_dir`.
    pub fn resolve_tool_path(&self, program_dir: &Path) -> PathBuf {
        match self.tool.path {
            Some(ref path) => path.clone(),
            None => program_dir.join(&self.tool.executable),
        }
    }

    pub fn resolve_output_directory(&self, program_dir: &Path) -> PathBuf {
        match self.output.directory {
            Some(ref dir) => dir.clone(),
            None => program_dir.join(DEFAULT_OUTPUT_DIR_NAME),
        }
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub tool_path: Option<PathBuf>,
    pub timeout: Option<u64>,
    pub require_success: bool,
    pub output_dir: Option<PathBuf>,
    pub pause: bool,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tool_path(mut self, tool_path: Option<PathBuf>) -> Self {
        self.tool_path = tool_path;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<u64>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_require_success(mut self, require_success: bool) -> Self {
        self.require_success = require_success;
        self
    }

    pub fn with_output_dir(mut self, output_dir: Option<PathBuf>) -> Self {
        self.output_dir = output_dir;
        self
    }

    pub fn with_pause(mut self, pause: bool) -> Self {
        self.pause = pause;
        self
    }
}

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractorError {
    #[error("Missing required argument: input file path")]
    Usage { usage: String },

    #[error("Input file does not exist: {path}")]
    InputNotFound { path: PathBuf },

    #[error("Extraction tool not found: {path}")]
    ToolMissing { path: PathBuf },

    #[error("Failed to initialize directories")]
    DirectoryInit { path: PathBuf },

    #[error("Failed to start extraction tool: {path}")]
    ProcessLaunch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to extract file")]
    ExtractionFailed { artifact: String },

    #[error("Extraction tool exited with {status}")]
    ToolFailed { status: String },

    #[error("Extraction tool timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    #[error("Operation was cancelled by user")]
    Cancelled,

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtractorError {
    /// Process exit code reported for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            ExtractorError::Usage { .. } => 2,
            ExtractorError::InputNotFound { .. } => 3,
            ExtractorError::ToolMissing { .. } => 4,
            ExtractorError::DirectoryInit { .. } => 5,
            ExtractorError::ProcessLaunch { .. } => 6,
            ExtractorError::ExtractionFailed { .. } => 7,
            ExtractorError::ToolFailed { .. } => 8,
            ExtractorError::Timeout { .. } => 9,
            ExtractorError::Cancelled => 130, // Interrupted (SIGINT)
            ExtractorError::Config { .. } | ExtractorError::Io(_) => 1,
        }
    }
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for ExtractorError {
    fn user_message(&self) -> String {
        match self {
            ExtractorError::Usage { usage } => usage.clone(),
            ExtractorError::InputNotFound { path } => {
                format!("The input file '{}' does not exist.", path.display())
            }
            ExtractorError::ToolMissing { path } => {
                format!("xextool does not exist at {}", path.display())
            }
            ExtractorError::DirectoryInit { path } => {
                format!("Failed to initialize directories ({})", path.display())
            }
            ExtractorError::ProcessLaunch { path, source } => {
                format!("Failed to extract xam file: could not start {} ({})", path.display(), source)
            }
            ExtractorError::ExtractionFailed { artifact } => {
                format!("Failed to extract file: '{}' was not produced", artifact)
            }
            ExtractorError::ToolFailed { status } => {
                format!("Extraction tool reported failure ({})", status)
            }
            ExtractorError::Timeout { seconds } => {
                format!("Extraction tool did not finish within {} seconds", seconds)
            }
            ExtractorError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            ExtractorError::InputNotFound { .. } => Some(
                "Check the path to the xam/xex file. Relative paths are resolved from the current directory.".to_string()
            ),
            ExtractorError::ToolMissing { .. } => Some(
                "Place xextool next to the dashres executable, or point to it with --tool or the DASHRES_TOOL environment variable.".to_string()
            ),
            ExtractorError::DirectoryInit { .. } => Some(
                "Ensure you have write permissions for the output directory and the system temporary directory.".to_string()
            ),
            ExtractorError::ProcessLaunch { .. } => Some(
                "Make sure the extraction tool is executable on this platform.".to_string()
            ),
            ExtractorError::ExtractionFailed { .. } => Some(
                "The input may not be a xam container, or it may be corrupt. Run with -vv to see the tool's output.".to_string()
            ),
            ExtractorError::ToolFailed { .. } => Some(
                "Run with -vv to see the tool's output, or drop --strict to rely on the extracted file alone.".to_string()
            ),
            ExtractorError::Timeout { .. } => Some(
                "Increase the timeout with --timeout if the input is large.".to_string()
            ),
            ExtractorError::Config { .. } => Some(
                "Check your configuration file syntax and ensure all values are valid.".to_string()
            ),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for ExtractorError {
    fn from(error: toml::de::Error) -> Self {
        ExtractorError::Config {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ExtractorError>;

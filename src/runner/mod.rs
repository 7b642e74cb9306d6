pub mod tool_runner;

pub use tool_runner::{ToolOutcome, ToolRunner};

use crate::error::{ExtractorError, Result};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

#[derive(Debug, Clone, Copy)]
pub struct ToolOutcome {
    pub status: ExitStatus,
    pub elapsed: Duration,
}

impl ToolOutcome {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    pub fn exit_code(&self) -> Option<i32> {
        self.status.code()
    }

    pub fn describe_status(&self) -> String {
        match self.status.code() {
            Some(code) => format!("exit code {}", code),
            None => "termination by signal".to_string(),
        }
    }
}

/// Runs the external extraction tool as `<tool> -d <output_dir> <input>` and
/// waits for it with a deadline.
pub struct ToolRunner {
    tool_path: PathBuf,
    working_dir: Option<PathBuf>,
    timeout: Duration,
    poll_interval: Duration,
    show_output: bool,
    progress_callback: Option<Box<dyn Fn(Duration)>>,
    running: Arc<AtomicBool>,
}

impl ToolRunner {
    pub fn new<P: Into<PathBuf>>(tool_path: P) -> Self {
        Self {
            tool_path: tool_path.into(),
            working_dir: None,
            timeout: Duration::from_secs(300), // 5 minutes default
            poll_interval: Duration::from_millis(50),
            show_output: false,
            progress_callback: None,
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_working_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn with_show_output(mut self, show: bool) -> Self {
        self.show_output = show;
        self
    }

    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(Duration) + 'static,
    {
        self.progress_callback = Some(Box::new(callback));
        self
    }

    /// Share a cancellation flag; clearing it kills the running tool.
    pub fn with_cancel_flag(mut self, running: Arc<AtomicBool>) -> Self {
        self.running = running;
        self
    }

    /// Fails with `ToolMissing` unless the tool path names an existing file.
    pub fn locate(&self) -> Result<()> {
        if self.tool_path.is_file() {
            Ok(())
        } else {
            Err(ExtractorError::ToolMissing {
                path: self.tool_path.clone(),
            })
        }
    }

    pub fn build_command(&self, output_dir: &Path, input: &Path) -> Command {
        let mut command = Command::new(&self.tool_path);
        command.arg("-d").arg(output_dir).arg(input);

        let working_dir = self
            .working_dir
            .as_deref()
            .or_else(|| self.tool_path.parent().filter(|p| !p.as_os_str().is_empty()));
        if let Some(dir) = working_dir {
            command.current_dir(dir);
        }

        command.stdin(Stdio::null());
        if !self.show_output {
            command.stdout(Stdio::null()).stderr(Stdio::null());
        }

        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            command.creation_flags(CREATE_NO_WINDOW);
        }

        command
    }

    pub fn run(&self, output_dir: &Path, input: &Path) -> Result<ToolOutcome> {
        if !self.is_running() {
            return Err(ExtractorError::Cancelled);
        }

        let start_time = Instant::now();
        let mut child = self
            .build_command(output_dir, input)
            .spawn()
            .map_err(|source| ExtractorError::ProcessLaunch {
                path: self.tool_path.clone(),
                source,
            })?;

        let result = self.wait_for_exit(&mut child, start_time);
        if result.is_err() {
            terminate(&mut child);
        }
        result
    }

    fn wait_for_exit(&self, child: &mut Child, start_time: Instant) -> Result<ToolOutcome> {
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(ToolOutcome {
                    status,
                    elapsed: start_time.elapsed(),
                });
            }

            if !self.is_running() {
                return Err(ExtractorError::Cancelled);
            }

            let elapsed = start_time.elapsed();
            if elapsed >= self.timeout {
                return Err(ExtractorError::Timeout {
                    seconds: self.timeout.as_secs(),
                });
            }

            if let Some(ref callback) = self.progress_callback {
                callback(elapsed);
            }

            thread::sleep(self.poll_interval.min(self.timeout - elapsed));
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

// Kill errors are ignored: the child may already have exited.
fn terminate(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_locate_missing_tool() {
        let temp_dir = TempDir::new().unwrap();
        let runner = ToolRunner::new(temp_dir.path().join("xextool"));

        let err = runner.locate().unwrap_err();
        assert!(matches!(err, ExtractorError::ToolMissing { .. }));
    }

    #[test]
    fn test_locate_rejects_directory() {
        let temp_dir = TempDir::new().unwrap();
        let runner = ToolRunner::new(temp_dir.path());
        assert!(runner.locate().is_err());
    }

    #[test]
    fn test_command_arguments() {
        let runner = ToolRunner::new("/opt/tools/xextool");
        let command = runner.build_command(Path::new("/tmp/scratch"), Path::new("/data/xam.xex"));

        let args: Vec<_> = command.get_args().collect();
        assert_eq!(args, ["-d", "/tmp/scratch", "/data/xam.xex"]);
        assert_eq!(command.get_program(), "/opt/tools/xextool");
        assert_eq!(command.get_current_dir(), Some(Path::new("/opt/tools")));
    }

    #[test]
    fn test_explicit_working_dir() {
        let runner = ToolRunner::new("/opt/tools/xextool").with_working_dir("/srv/dashres");
        let command = runner.build_command(Path::new("out"), Path::new("in"));
        assert_eq!(command.get_current_dir(), Some(Path::new("/srv/dashres")));
    }

    #[test]
    fn test_launch_failure() {
        let temp_dir = TempDir::new().unwrap();
        let runner = ToolRunner::new(temp_dir.path().join("does-not-exist"));

        let err = runner
            .run(temp_dir.path(), Path::new("input.xex"))
            .unwrap_err();
        assert!(matches!(err, ExtractorError::ProcessLaunch { .. }));
    }

    #[test]
    fn test_cancelled_before_launch() {
        let runner = ToolRunner::new("/bin/true").with_cancel_flag(Arc::new(AtomicBool::new(false)));
        assert!(!runner.is_running());

        let err = runner.run(Path::new("/tmp"), Path::new("in")).unwrap_err();
        assert!(matches!(err, ExtractorError::Cancelled));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_exit_status_is_reported() {
        let temp_dir = TempDir::new().unwrap();

        let outcome = ToolRunner::new("/bin/true")
            .run(temp_dir.path(), Path::new("in"))
            .unwrap();
        assert!(outcome.success());
        assert_eq!(outcome.exit_code(), Some(0));

        let outcome = ToolRunner::new("/bin/false")
            .run(temp_dir.path(), Path::new("in"))
            .unwrap();
        assert!(!outcome.success());
        assert_eq!(outcome.describe_status(), "exit code 1");
    }

    #[test]
    fn test_timeout_configuration() {
        let timeout = Duration::from_secs(12);
        let runner = ToolRunner::new("xextool").with_timeout(timeout);
        assert_eq!(runner.timeout, timeout);
    }
}

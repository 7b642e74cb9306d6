//! Stub extraction tools shared by the integration tests.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tempfile::TempDir;

/// Stub tools, written once before any test spawns a process so that no
/// script is still open for writing when another test forks.
pub struct StubTools {
    dir: TempDir,
}

impl StubTools {
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

pub fn stubs() -> &'static StubTools {
    static STUBS: OnceLock<StubTools> = OnceLock::new();
    STUBS.get_or_init(|| {
        let dir = TempDir::new().expect("failed to create stub dir");
        #[cfg(unix)]
        {
            // Invoked as: <tool> -d <dir> <input>
            write_script(dir.path(), "copy_tool", "cp \"$3\" \"$2/shrdres\"\n");
            write_script(dir.path(), "silent_tool", "exit 0\n");
            write_script(dir.path(), "failing_tool", "cp \"$3\" \"$2/shrdres\"\nexit 3\n");
            write_script(dir.path(), "hanging_tool", "exec sleep 30\n");
            write_script(dir.path(), "pwd_tool", "pwd -P > \"$2/shrdres\"\n");
        }
        StubTools { dir }
    })
}

#[cfg(unix)]
fn write_script(dir: &Path, name: &str, body: &str) {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{}", body)).expect("failed to write stub");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("failed to chmod stub");
}

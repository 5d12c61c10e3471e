use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("Search Folder path is empty.")]
    ConfigMissing,
    #[error("{}: {detail}", path.display())]
    NotFound { path: PathBuf, detail: String },
    #[error("failed to execute {}: {source}", path.display())]
    StartFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Starts a resolved executable. Implementations must not wait on the child.
pub trait Spawner {
    fn spawn(&mut self, path: &Path) -> io::Result<()>;
}

/// Starts the program with no arguments and null stdio, detached from the
/// launcher so it outlives it.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedSpawner;

impl Spawner for DetachedSpawner {
    fn spawn(&mut self, path: &Path) -> io::Result<()> {
        let mut command = Command::new(path);
        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }

        #[cfg(target_os = "windows")]
        {
            use std::os::windows::process::CommandExt;
            const DETACHED_PROCESS: u32 = 0x0000_0008;
            const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;
            command.creation_flags(DETACHED_PROCESS | CREATE_NEW_PROCESS_GROUP);
        }

        command.spawn().map(drop)
    }
}

pub fn is_executable(path: &Path) -> bool {
    let Ok(metadata) = path.metadata() else {
        return false;
    };
    if metadata.is_dir() {
        return false;
    }

    #[cfg(target_os = "windows")]
    {
        path.extension()
            .and_then(|s| s.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                ["exe", "com", "bat", "cmd"].contains(&ext.as_str())
            })
            .unwrap_or(false)
    }

    #[cfg(not(target_os = "windows"))]
    {
        use std::os::unix::fs::PermissionsExt;
        metadata.permissions().mode() & 0o111 != 0
    }
}

/// Joins `file_name` onto the configured directory and checks that the
/// result is something the OS can execute.
pub fn resolve_executable(dir: &Path, file_name: &str) -> Result<PathBuf, LaunchError> {
    let path = dir.join(file_name);
    let detail = match path.metadata() {
        Err(err) => err.to_string(),
        Ok(metadata) if metadata.is_dir() => "is a directory".to_string(),
        Ok(_) if !is_executable(&path) => "file is not executable".to_string(),
        Ok(_) => return Ok(path),
    };
    Err(LaunchError::NotFound { path, detail })
}

/// Resolves and starts `file_name` from the configured directory. Nothing is
/// spawned unless resolution succeeds.
pub fn launch(
    configured: Option<&Path>,
    file_name: &str,
    spawner: &mut dyn Spawner,
) -> Result<PathBuf, LaunchError> {
    let dir = configured.ok_or(LaunchError::ConfigMissing)?;
    let path = resolve_executable(dir, file_name)?;
    spawner
        .spawn(&path)
        .map_err(|source| LaunchError::StartFailed {
            path: path.clone(),
            source,
        })?;
    tracing::info!(path = %path.display(), "launched");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[derive(Default)]
    struct RecordingSpawner {
        spawned: Vec<PathBuf>,
        fail_with: Option<io::ErrorKind>,
    }

    impl Spawner for RecordingSpawner {
        fn spawn(&mut self, path: &Path) -> io::Result<()> {
            if let Some(kind) = self.fail_with {
                return Err(io::Error::new(kind, "spawn refused"));
            }
            self.spawned.push(path.to_path_buf());
            Ok(())
        }
    }

    fn test_root(name: &str) -> PathBuf {
        let nonce = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        std::env::temp_dir().join(format!("runbox-actions-{name}-{nonce}"))
    }

    #[cfg(unix)]
    fn write_executable(path: &Path) {
        use std::os::unix::fs::PermissionsExt;

        fs::write(path, "#!/bin/sh\nexit 0\n").expect("write script");
        let mut perms = fs::metadata(path).expect("metadata").permissions();
        perms.set_mode(0o755);
        fs::set_permissions(path, perms).expect("set permissions");
    }

    #[test]
    fn unset_directory_fails_without_spawning() {
        let mut spawner = RecordingSpawner::default();
        let err = launch(None, "run_me.sh", &mut spawner).expect_err("must fail");
        assert!(matches!(err, LaunchError::ConfigMissing));
        assert_eq!(err.to_string(), "Search Folder path is empty.");
        assert!(spawner.spawned.is_empty());
    }

    #[test]
    fn missing_file_is_not_found() {
        let root = test_root("missing");
        fs::create_dir_all(&root).expect("create root");
        let mut spawner = RecordingSpawner::default();

        let err = launch(Some(root.as_path()), "ghost", &mut spawner).expect_err("must fail");
        assert!(matches!(err, LaunchError::NotFound { .. }));
        assert!(spawner.spawned.is_empty());
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn directory_is_not_executable() {
        let root = test_root("dir");
        fs::create_dir_all(root.join("bin")).expect("create bin");
        let mut spawner = RecordingSpawner::default();

        let err = launch(Some(root.as_path()), "bin", &mut spawner).expect_err("must fail");
        assert!(err.to_string().contains("is a directory"));
        assert!(spawner.spawned.is_empty());
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    #[cfg(unix)]
    fn plain_file_is_not_executable() {
        let root = test_root("plain");
        fs::create_dir_all(&root).expect("create root");
        fs::write(root.join("notes.txt"), "x").expect("write notes");
        let mut spawner = RecordingSpawner::default();

        let err = launch(Some(root.as_path()), "notes.txt", &mut spawner).expect_err("must fail");
        assert!(matches!(err, LaunchError::NotFound { .. }));
        assert!(err.to_string().contains("not executable"));
        assert!(spawner.spawned.is_empty());
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    #[cfg(unix)]
    fn executable_is_spawned_once() {
        let root = test_root("exec");
        fs::create_dir_all(&root).expect("create root");
        let script = root.join("run_me.sh");
        write_executable(&script);
        let mut spawner = RecordingSpawner::default();

        let path = launch(Some(root.as_path()), "run_me.sh", &mut spawner).expect("launch");
        assert_eq!(path, script);
        assert_eq!(spawner.spawned, vec![script]);
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    #[cfg(unix)]
    fn spawn_failure_is_start_failed() {
        let root = test_root("spawn-fail");
        fs::create_dir_all(&root).expect("create root");
        write_executable(&root.join("run_me.sh"));
        let mut spawner = RecordingSpawner {
            fail_with: Some(io::ErrorKind::PermissionDenied),
            ..Default::default()
        };

        let err = launch(Some(root.as_path()), "run_me.sh", &mut spawner).expect_err("must fail");
        assert!(matches!(err, LaunchError::StartFailed { .. }));
        assert!(err.to_string().contains("spawn refused"));
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    #[cfg(target_os = "windows")]
    fn windows_executable_extension_is_accepted() {
        let root = test_root("winext");
        fs::create_dir_all(&root).expect("create root");
        let exe = root.join("tool.exe");
        fs::write(&exe, "bin").expect("write exe");
        assert!(is_executable(&exe));
        assert!(!is_executable(&root.join("missing.exe")));
        let _ = fs::remove_dir_all(&root);
    }
}

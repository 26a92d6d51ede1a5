//! Host-side state shared with agent CLIs running inside the sandbox.
//!
//! JS-family invocations routinely launch external AI/agent CLIs (`npx
//! claude`, `bun x gemini`, ...). Those tools keep per-user configuration and
//! credentials under the host home directory; without them every sandboxed
//! run would start logged-out. A fixed allowlist of config directories and
//! one credential file is bind-mounted into the sandbox user's home.
//!
//! A missing host path is created first (directories and the credential file
//! both get owner-only permissions); existing content is never touched.

use std::fs::{self, OpenOptions};
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::error::InvocationError;

/// Per-user configuration directories shared with the sandbox.
pub const AGENT_CONFIG_DIRS: &[&str] = &[".claude", ".codex", ".gemini"];

/// Per-user credential file shared with the sandbox.
pub const AGENT_CREDENTIAL_FILE: &str = ".claude.json";

/// Home directory of the sandbox user the agent paths are mounted under.
pub const SANDBOX_HOME: &str = "/root";

/// One host→sandbox bind-mount pair for agent state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentMount {
    /// Absolute path on the host.
    pub source: PathBuf,
    /// Absolute path inside the sandbox.
    pub target: PathBuf,
}

/// Prepares the agent config paths under `home` and returns their mounts.
///
/// # Errors
///
/// Returns [`InvocationError::HostPath`] when a missing directory or the
/// credential file cannot be created.
pub fn agent_mounts(home: &Path) -> Result<Vec<AgentMount>, InvocationError> {
    let mut mounts = Vec::with_capacity(AGENT_CONFIG_DIRS.len() + 1);

    for name in AGENT_CONFIG_DIRS {
        let source = home.join(name);
        ensure_dir(&source)?;
        mounts.push(AgentMount {
            source,
            target: Path::new(SANDBOX_HOME).join(name),
        });
    }

    let credential = home.join(AGENT_CREDENTIAL_FILE);
    ensure_file(&credential)?;
    mounts.push(AgentMount {
        source: credential,
        target: Path::new(SANDBOX_HOME).join(AGENT_CREDENTIAL_FILE),
    });

    Ok(mounts)
}

/// Creates `path` as an owner-only directory if it does not exist yet.
fn ensure_dir(path: &Path) -> Result<(), InvocationError> {
    if path.exists() {
        trace!(path = %path.display(), "Agent config dir already present");
        return Ok(());
    }

    debug!(path = %path.display(), "Creating agent config dir");
    fs::create_dir_all(path).map_err(|e| host_path_error(path, &e))?;
    let mut perms = fs::metadata(path)
        .map_err(|e| host_path_error(path, &e))?
        .permissions();
    perms.set_mode(0o700);
    fs::set_permissions(path, perms).map_err(|e| host_path_error(path, &e))
}

/// Creates `path` as an empty owner-only file if it does not exist yet.
///
/// Uses `create_new` so an existing file is never truncated.
fn ensure_file(path: &Path) -> Result<(), InvocationError> {
    match OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(0o600)
        .open(path)
    {
        Ok(_) => {
            debug!(path = %path.display(), "Created empty agent credential file");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            trace!(path = %path.display(), "Agent credential file already present");
            Ok(())
        }
        Err(e) => Err(host_path_error(path, &e)),
    }
}

fn host_path_error(path: &Path, e: &std::io::Error) -> InvocationError {
    InvocationError::HostPath {
        path: path.display().to_string(),
        details: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    #[test]
    fn test_creates_missing_dirs_and_file() {
        let home = TempDir::new().expect("failed to create temp dir");

        let mounts = agent_mounts(home.path()).expect("agent_mounts failed");
        assert_eq!(mounts.len(), AGENT_CONFIG_DIRS.len() + 1);

        for name in AGENT_CONFIG_DIRS {
            let dir = home.path().join(name);
            assert!(dir.is_dir(), "{name} should have been created");
            let mode = fs::metadata(&dir).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o700, "{name} should be owner-only");
        }

        let cred = home.path().join(AGENT_CREDENTIAL_FILE);
        assert!(cred.is_file());
        let mode = fs::metadata(&cred).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_existing_credential_file_is_not_truncated() {
        let home = TempDir::new().expect("failed to create temp dir");
        let cred = home.path().join(AGENT_CREDENTIAL_FILE);
        fs::write(&cred, "{\"token\":\"secret\"}").expect("failed to write credential");

        agent_mounts(home.path()).expect("agent_mounts failed");

        let content = fs::read_to_string(&cred).expect("failed to read credential");
        assert_eq!(content, "{\"token\":\"secret\"}");
    }

    #[test]
    fn test_mount_targets_live_under_sandbox_home() {
        let home = TempDir::new().expect("failed to create temp dir");
        let mounts = agent_mounts(home.path()).expect("agent_mounts failed");

        for mount in &mounts {
            assert!(mount.target.starts_with(SANDBOX_HOME));
            assert_eq!(
                mount.target.file_name(),
                mount.source.file_name(),
                "source and target should share the final component"
            );
        }
    }
}

//! Container runtime detection and reachability checks.

use std::path::PathBuf;
use std::process::Command;

use tracing::{debug, trace};

use crate::error::PreflightError;

/// Environment variable overriding runtime auto-detection.
pub const RUNTIME_ENV_VAR: &str = "PKGBOX_RUNTIME";

/// Runtimes probed on PATH, in preference order.
pub const RUNTIME_CANDIDATES: &[&str] = &["docker", "podman"];

/// Which runtime flavor a resolved backend is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Docker,
    Podman,
    /// A compatible binary supplied via [`RUNTIME_ENV_VAR`].
    Custom,
}

/// A resolved container runtime binary.
#[derive(Debug, Clone)]
pub struct ContainerBackend {
    /// Path to the runtime binary.
    pub program: PathBuf,
    /// Runtime flavor.
    pub kind: BackendKind,
}

impl ContainerBackend {
    /// Short name used in log lines and error messages.
    #[must_use]
    pub fn name(&self) -> String {
        self.program
            .file_name()
            .map_or_else(|| self.program.display().to_string(), |n| n.to_string_lossy().into_owned())
    }
}

/// Results of all host pre-flight checks.
#[derive(Debug, Clone)]
pub struct RuntimeRequirements {
    /// The resolved backend.
    pub backend: ContainerBackend,
    /// First line of the runtime's `version` output.
    pub version: String,
}

/// Runs all host pre-flight checks.
///
/// # Errors
///
/// Returns the first failing check: no runtime binary found, or the daemon
/// behind the resolved binary not answering.
pub fn check_all() -> Result<RuntimeRequirements, PreflightError> {
    let backend = detect_backend()?;
    let version = check_daemon(&backend)?;
    Ok(RuntimeRequirements { backend, version })
}

/// Resolves the container runtime binary.
///
/// [`RUNTIME_ENV_VAR`] wins when set; otherwise the first of
/// [`RUNTIME_CANDIDATES`] found on PATH is used.
///
/// # Errors
///
/// Returns [`PreflightError::RuntimeNotFound`] when nothing resolves.
pub fn detect_backend() -> Result<ContainerBackend, PreflightError> {
    if let Ok(raw) = std::env::var(RUNTIME_ENV_VAR) {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            debug!(runtime = %trimmed, "Using container runtime from {}", RUNTIME_ENV_VAR);
            return backend_from_name(trimmed);
        }
    }

    for name in RUNTIME_CANDIDATES {
        if let Ok(program) = which::which(name) {
            trace!(program = %program.display(), "Found container runtime on PATH");
            return Ok(ContainerBackend {
                program,
                kind: classify(name),
            });
        }
    }

    Err(PreflightError::RuntimeNotFound {
        candidates: RUNTIME_CANDIDATES.join(", "),
    })
}

/// Resolves an explicitly named runtime binary (name on PATH or a path).
fn backend_from_name(name: &str) -> Result<ContainerBackend, PreflightError> {
    let program = if name.contains('/') {
        PathBuf::from(name)
    } else {
        which::which(name).unwrap_or_else(|_| PathBuf::from(name))
    };

    if !program.exists() {
        return Err(PreflightError::RuntimeNotFound {
            candidates: name.to_string(),
        });
    }

    let kind = program
        .file_stem()
        .and_then(|s| s.to_str())
        .map_or(BackendKind::Custom, classify);
    Ok(ContainerBackend { program, kind })
}

fn classify(name: &str) -> BackendKind {
    match name {
        "docker" => BackendKind::Docker,
        "podman" => BackendKind::Podman,
        _ => BackendKind::Custom,
    }
}

/// Checks that the runtime daemon answers.
///
/// Runs `<runtime> version` with captured output; a short, bounded call on
/// both docker and podman.
///
/// # Errors
///
/// Returns [`PreflightError::RuntimeUnreachable`] when the command cannot be
/// spawned or exits non-zero.
pub fn check_daemon(backend: &ContainerBackend) -> Result<String, PreflightError> {
    let output = Command::new(&backend.program)
        .arg("version")
        .output()
        .map_err(|e| PreflightError::RuntimeUnreachable {
            runtime: backend.name(),
            details: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(PreflightError::RuntimeUnreachable {
            runtime: backend.name(),
            details: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let version = stdout.lines().next().unwrap_or_default().trim().to_string();
    debug!(runtime = %backend.name(), version = %version, "Container runtime is reachable");
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_runtimes() {
        assert_eq!(classify("docker"), BackendKind::Docker);
        assert_eq!(classify("podman"), BackendKind::Podman);
        assert_eq!(classify("nerdctl"), BackendKind::Custom);
    }

    #[test]
    fn test_backend_from_name_resolves_path_binaries() {
        let backend = backend_from_name("/bin/sh").expect("should resolve /bin/sh");
        assert_eq!(backend.program, PathBuf::from("/bin/sh"));
        assert_eq!(backend.kind, BackendKind::Custom);
        assert_eq!(backend.name(), "sh");
    }

    #[test]
    fn test_backend_from_name_rejects_missing_binary() {
        let result = backend_from_name("/no/such/runtime");
        assert!(matches!(
            result,
            Err(PreflightError::RuntimeNotFound { .. })
        ));
    }

    #[test]
    fn test_check_daemon_reports_spawn_failure() {
        let backend = ContainerBackend {
            program: PathBuf::from("/no/such/runtime"),
            kind: BackendKind::Custom,
        };
        let result = check_daemon(&backend);
        assert!(matches!(
            result,
            Err(PreflightError::RuntimeUnreachable { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_check_daemon_accepts_zero_exit() {
        // `sh version` is not a thing, but `true` ignores its argument.
        let backend = ContainerBackend {
            program: PathBuf::from("/bin/true"),
            kind: BackendKind::Custom,
        };
        let version = check_daemon(&backend).expect("true(1) should succeed");
        assert!(version.is_empty());
    }
}

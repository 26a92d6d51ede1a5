//! Discovery of filesystem paths referenced by tool arguments.
//!
//! The working directory is mounted into the sandbox, but arguments can also
//! name paths outside it (`npx tool /etc/certs/ca.pem`, `pip install
//! ../shared/pkg`). Those paths must be bind-mounted too, or the tool fails
//! inside the container with a confusing "not found".
//!
//! Detection is a deliberate heuristic: a token counts as a path reference
//! only when it starts with a path separator or with `..`. A bare relative
//! name that happens to resolve outside the working directory is not
//! detected and has to be exposed through the mount policy explicitly.

use std::path::{Component, Path, PathBuf};

use tracing::{debug, trace};

/// Scans `args` for external path references relative to `working_dir`.
///
/// Returned paths are absolute, exist on the host, are distinct, and keep
/// first-seen order. The working directory itself is never returned; its
/// mount is handled separately, and a second bind mount of the same source
/// would conflict with it.
///
/// Tokens naming paths that do not exist are skipped silently: the path may
/// be optional or a typo, and the tool inside the sandbox reports its own
/// error if it actually needed the file.
#[must_use]
pub fn referenced_paths(args: &[String], working_dir: &Path) -> Vec<PathBuf> {
    let working_dir_key = canonical_or(working_dir);

    let mut seen: Vec<PathBuf> = Vec::new();
    let mut found: Vec<PathBuf> = Vec::new();

    for arg in args {
        let Some(resolved) = resolve_candidate(arg, working_dir) else {
            continue;
        };

        if !resolved.exists() {
            trace!(arg = %arg, "Referenced path does not exist, skipping");
            continue;
        }

        let key = canonical_or(&resolved);
        if key == working_dir_key {
            trace!(arg = %arg, "Referenced path is the working directory, skipping");
            continue;
        }
        if seen.contains(&key) {
            continue;
        }

        debug!(path = %resolved.display(), "Found referenced external path");
        seen.push(key);
        found.push(resolved);
    }

    found
}

/// Classifies one token and resolves it to an absolute path.
///
/// Absolute tokens pass through unchanged; `..`-prefixed tokens resolve
/// against the working directory. Anything else is not a candidate.
fn resolve_candidate(arg: &str, working_dir: &Path) -> Option<PathBuf> {
    let path = Path::new(arg);
    if path.is_absolute() {
        return Some(path.to_path_buf());
    }
    if matches!(path.components().next(), Some(Component::ParentDir)) {
        return Some(normalize(&working_dir.join(path)));
    }
    None
}

/// Canonicalizes where possible, falling back to the input path.
///
/// Used for comparisons only, so symlinked spellings of the same location
/// dedup correctly; non-existent paths keep their literal form.
fn canonical_or(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

/// Lexically removes `.` and `..` components.
///
/// The resolved form is what ends up in the mount spec, where the runtime
/// expects a clean absolute path rather than `/home/u/proj/../data`.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component.as_os_str());
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

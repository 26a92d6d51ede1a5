//! Host pre-flight checks.
//!
//! This module resolves the container runtime binary and verifies the
//! daemon behind it answers before any invocation is attempted.

mod requirements;

pub use requirements::{
    BackendKind, ContainerBackend, RUNTIME_CANDIDATES, RUNTIME_ENV_VAR, RuntimeRequirements,
    check_all, check_daemon, detect_backend,
};

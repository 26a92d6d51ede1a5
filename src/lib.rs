//! pkgbox - run package-manager and build tools inside container sandboxes.
//!
//! This crate plans and drives single, synchronous container runs so that
//! invoking a tool like `npm`, `cargo` or `gem` feels local: the working
//! directory is visible inside the container, per-ecosystem caches persist
//! across runs in named volumes, network access is policy-controlled, and
//! the tool's output and exit code come back untouched.
//!
//! # Example
//!
//! ```no_run
//! use pkgbox::sandbox::{CommandRunner, SandboxConfig, ToolKind};
//!
//! let config = SandboxConfig::for_tool(ToolKind::Cargo)
//!     .with_working_dir("/home/u/proj")
//!     .with_args(&["build".to_string()]);
//!
//! let runner = CommandRunner::detect()?;
//! let outcome = runner.execute(&config)?;
//! # Ok::<(), pkgbox::Error>(())
//! ```

pub mod error;
pub mod sandbox;
pub mod system;

// Re-export commonly used types
pub use error::{Error, Result};
pub use sandbox::{CommandRunner, NetworkMode, RunOutcome, SandboxConfig, ToolKind};

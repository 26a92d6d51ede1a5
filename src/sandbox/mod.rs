//! Sandboxed execution planning and invocation.
//!
//! A tool invocation flows through this module in four steps: the
//! [`ToolKind`] registry resolves the base image and rewrites the raw
//! arguments, [`SandboxConfig`] collects the plan from ordered options,
//! the invocation assembler turns the plan into the runtime's argument
//! vector, and [`CommandRunner`] executes it and relays the outcome.
//!
//! # Example
//!
//! ```no_run
//! use pkgbox::sandbox::{CommandRunner, NetworkMode, SandboxConfig, ToolKind};
//!
//! let config = SandboxConfig::for_tool(ToolKind::Npm)
//!     .with_working_dir("/home/u/proj")
//!     .with_args(&["ci".to_string()])
//!     .with_network(NetworkMode::Host);
//!
//! let runner = CommandRunner::detect().unwrap();
//! let outcome = runner.execute(&config).unwrap();
//! assert!(outcome.success());
//! ```

mod agent;
mod config;
mod invocation;
mod paths;
mod runner;
mod tool;

pub use agent::{AGENT_CONFIG_DIRS, AGENT_CREDENTIAL_FILE, SANDBOX_HOME, AgentMount, agent_mounts};
pub use config::{NetworkMode, SandboxConfig};
pub use invocation::{CACHE_VOLUMES, assemble, assemble_with_home};
pub use paths::referenced_paths;
pub use runner::{CommandRunner, RunOutcome};
pub use tool::ToolKind;

pub mod commands;
pub mod config;
pub mod context;
pub mod directory;
pub mod engine;
pub mod error;
pub mod help;
pub mod invocation;
pub mod io;
pub mod message;
pub mod messaging;
pub mod params;
pub mod paths;
pub mod provision;
pub mod registry;
pub mod setter;
pub mod summary;
pub mod task;
pub mod task_list;
pub mod task_runner;

pub use error::{ChatOpsError, ErrorKind, Result};

// Cluster backup/restore orchestration for etcd-backed control planes
pub mod cli;
pub mod context;
pub mod engine;
pub mod error;
pub mod interrupt;
pub mod logging;

pub use error::{Error, Result};

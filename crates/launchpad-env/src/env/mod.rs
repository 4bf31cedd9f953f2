//! Isolated runtime environment: creation (`builder`) and dependency
//! installation (`install`).
//!
//! Both stages take the environment explicitly and spawn through a
//! [`ProcessRunner`](crate::runner::ProcessRunner); neither touches this
//! process's own environment variables.

pub mod builder;
pub mod install;

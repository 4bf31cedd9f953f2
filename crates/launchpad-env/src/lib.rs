pub mod env;
pub mod error;
pub mod launch;
pub mod log;
pub mod runner;
pub mod runtime;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

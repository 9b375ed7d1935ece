//! # vole-core
//!
//! Shared foundation types for the Vole workspace:
//! - [`Error`] / [`Result`] — the single error type every crate propagates
//! - [`bail!`] — early return with a formatted message
//! - [`Param`] / [`StateDict`] — named parameter tensors for persistence

pub mod error;
pub mod state;

pub use error::{Error, Result};
pub use state::{find_param, Param, StateDict};

//! Error types for parameter validation.
//!
//! The engine itself never fails; these errors only come out of the
//! opt-in checks callers run before simulating.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid parameter: {what}")]
    InvalidParameter { what: &'static str },

    #[error("Core error: {0}")]
    Core(#[from] cf_core::CfError),
}

pub type SimResult<T> = Result<T, SimError>;

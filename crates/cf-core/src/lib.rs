//! cf-core: shared foundation for carbflow.
//!
//! Contains:
//! - units (uom SI types + constructors used for reporting)
//! - numeric (Real + finite checks + rounding)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod units;

pub use error::{CfError, CfResult};
pub use numeric::*;
pub use units::*;

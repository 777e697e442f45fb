//! Value objects representing immutable domain concepts.

pub mod reports;
pub mod send_code_result;

pub use reports::{RevocationReport, SweepReport};
pub use send_code_result::SendCodeResult;

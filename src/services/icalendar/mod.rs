//! RFC 5545 (.ics) document reading.

pub mod import;
pub(crate) mod utils;

// Module exports for models

pub mod calendar_source;
pub mod event;
pub mod occurrence;

// Service module exports

pub mod agenda;
pub mod calendar_sync;
pub mod event;
pub mod icalendar;

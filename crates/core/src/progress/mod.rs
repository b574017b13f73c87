//! Progress aggregation: the engine and its collaborator components.

pub mod calendar;
pub mod classifier;
pub mod exclusion;
pub mod ports;
pub mod service;

//! harvest-types: domain model and ports for the marketplace checkout core.

pub mod domain;
pub mod ports;

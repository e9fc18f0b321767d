//! harvest-hex: marketplace checkout core (application services + inbound HTTP)

pub mod config;
pub mod errors;

pub mod application;

pub use harvest_types::{domain, ports};

pub mod inbound; // HTTP adapter (server + handlers)

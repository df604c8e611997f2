//! Library crate for port-probe exposing the port source, probe strategy,
//! and scan scheduler.
pub mod ports;
pub mod probe;
pub mod scanner;
pub mod types;

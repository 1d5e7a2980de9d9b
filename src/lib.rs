//! EchoSense firmware library.
//!
//! Ultrasonic ranging and acoustic detection fused into one serial status
//! stream, with a local audible alert.  Exposes the pure-logic modules for
//! integration testing; all ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod alert;
pub mod app;
pub mod config;
pub mod error;
pub mod pins;
pub mod reporter;
pub mod scheduler;

pub mod adapters;
pub mod drivers;
pub mod sensors;

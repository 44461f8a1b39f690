//! # Core Runtime Module
//!
//! Foundational runtime infrastructure for the streaming playback pipeline:
//! - Logging and tracing initialization
//! - Runtime error types
//!
//! ## Overview
//!
//! This crate establishes the logging conventions used throughout the
//! system. The pipeline workers emit structured `tracing` events; hosts call
//! [`logging::init_logging`] once at startup to install the subscriber.

pub mod error;
pub mod logging;

pub use error::{Error, Result};

//! tbtools - batch tools for a Toon Boom Harmony animation pipeline
//!
//! This library crate exposes the host, configuration and tools for
//! integration testing.

pub mod config;
pub mod host;
pub mod tools;

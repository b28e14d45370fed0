//! Notation Engine WASM API
//!
//! This module provides the JavaScript-facing API of the engine: compiling
//! tuning configs, resolving notes, moving notes and cleaning up bars.
//!
//! # Module Structure
//!
//! - `helpers`: Console logging, serialization and config loading
//! - `types`: Inputs and results shaped for the host
//! - `core`: The exported operations and the engine state they share

pub mod helpers;
pub mod types;
pub mod core;

pub use core::*;
pub use types::{BarInput, ResolvedNote};

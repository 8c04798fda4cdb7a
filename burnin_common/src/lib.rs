//! Burnin Common Library
//!
//! This crate provides the shared wire contract and configuration loading
//! utilities for all burnin workspace crates: the versioned shared-memory
//! layout the plugin and the test harness agree on, the status/severity
//! enumerations that form the protocol vocabulary, and the bounded-string
//! codec used for every display field.
//!
//! # Module Structure
//!
//! - [`shm`] - Segment layout constants, byte offsets and string codec
//! - [`plugin`] - Protocol enumerations and notification flags
//! - [`config`] - Configuration loading traits and types
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! Add to your `Cargo.toml` with alias for shorter imports:
//! ```toml
//! [dependencies]
//! burnin = { package = "burnin_common", path = "../burnin_common" }
//! ```
//!
//! Then import:
//! ```rust
//! use burnin_common::shm::consts::*;
//! use burnin_common::config::{ConfigLoader, SharedConfig};
//! ```

pub mod config;
pub mod plugin;
pub mod prelude;
pub mod shm;

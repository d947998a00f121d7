//! services/api/src/lib.rs
//!
//! The LucidCare report API: configuration, adapters, application services and
//! the axum web layer. The binaries in `src/bin` wire these together.

pub mod adapters;
pub mod config;
pub mod error;
pub mod services;
pub mod web;

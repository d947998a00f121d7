//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use crate::services::TokenSigner;
use lucidcare_core::ports::{
    ComparisonService, DatabaseService, DocumentTextExtractor, ReportAnalysisService,
};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
///
/// Everything in here is immutable; per-request data (such as the authenticated
/// user) travels in request extensions instead.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub config: Arc<Config>,
    pub tokens: TokenSigner,
    pub extractor: Arc<dyn DocumentTextExtractor>,
    pub analyzer: Arc<dyn ReportAnalysisService>,
    pub comparator: Arc<dyn ComparisonService>,
}

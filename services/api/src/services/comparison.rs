//! services/api/src/services/comparison.rs
//!
//! Comparative analysis of two or more of a user's own summaries.

use lucidcare_core::{
    comparison::{order_for_comparison, requested_ids},
    domain::ComparisonResult,
};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult};
use crate::web::state::AppState;

/// Compares the given summaries, which must all belong to `user_id`.
///
/// The downstream analysis always sees them oldest first, whatever order the
/// client listed them in.
pub async fn compare(
    state: &AppState,
    user_id: Uuid,
    summary_ids: &[i64],
) -> ServiceResult<ComparisonResult> {
    let requested = requested_ids(summary_ids)?;

    let found = state
        .db
        .get_user_summaries_by_ids(user_id, &requested)
        .await?;
    let entries = order_for_comparison(&requested, found).map_err(|e| {
        warn!(%user_id, "Comparison rejected: {}", e);
        ServiceError::from(e)
    })?;

    info!(
        %user_id,
        summaries = entries.len(),
        "Requesting comparative analysis"
    );

    state
        .comparator
        .compare_summaries(&entries)
        .await
        .map_err(|e| {
            error!("Comparative analysis failed: {:?}", e);
            match ServiceError::from(e) {
                // Nothing the client sent can be wrong at this point.
                ServiceError::Validation(m) | ServiceError::NotFound(m) => ServiceError::Analysis(m),
                other => other,
            }
        })
}

//! services/api/src/services/history.rs
//!
//! Lists a user's stored summaries, flat or grouped by recency.

use chrono::{DateTime, Utc};
use lucidcare_core::{
    domain::Summary,
    history::{group_by_recency, SummaryGroup},
};
use uuid::Uuid;

use crate::error::ServiceResult;
use crate::web::state::AppState;

/// Newest first. Only ever returns rows owned by `user_id`.
pub async fn list_summaries(state: &AppState, user_id: Uuid) -> ServiceResult<Vec<Summary>> {
    let mut summaries = state.db.get_summaries_by_user(user_id).await?;
    // Never hand out another user's rows, whatever the adapter returned.
    summaries.retain(|s| s.user_id == user_id);
    summaries.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then(b.summary_id.cmp(&a.summary_id))
    });
    Ok(summaries)
}

pub async fn grouped_history(
    state: &AppState,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> ServiceResult<Vec<SummaryGroup>> {
    let summaries = list_summaries(state, user_id).await?;
    Ok(group_by_recency(summaries, now))
}

//! Upvote join entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use pulsestage_core::types::id::{QuestionId, TenantId, UserId};

/// Records that a user upvoted a question. `(user_id, question_id)` is unique.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Upvote {
    pub tenant_id: TenantId,
    pub user_id: UserId,
    pub question_id: QuestionId,
    pub created_at: DateTime<Utc>,
}

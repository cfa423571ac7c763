//! Question entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use pulsestage_core::types::id::{QuestionId, TeamId, TenantId, UserId};

use super::status::QuestionStatus;

/// Maximum accepted question body length, in characters.
pub const MAX_BODY_CHARS: usize = 2_000;

/// A question submitted to a team (or to the tenant at large).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Question {
    /// Unique question identifier.
    pub id: QuestionId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Team the question is addressed to; `None` for tenant-wide questions.
    pub team_id: Option<TeamId>,
    /// Author; `None` for anonymous submissions.
    pub author_id: Option<UserId>,
    /// Question text.
    pub body: String,
    /// Lifecycle status.
    pub status: QuestionStatus,
    /// Upvote counter; always equals the number of upvote rows.
    pub upvotes: i32,
    /// Moderator response.
    pub response_text: Option<String>,
    /// When the response was posted.
    pub responded_at: Option<DateTime<Utc>>,
    /// Moderator who reviewed/answered the question.
    pub reviewed_by: Option<UserId>,
    /// When the question was reviewed.
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Pinned questions sort first.
    pub is_pinned: bool,
    pub pinned_by: Option<UserId>,
    pub pinned_at: Option<DateTime<Utc>>,
    /// Frozen questions reject new upvotes and responses.
    pub is_frozen: bool,
    pub frozen_by: Option<UserId>,
    pub frozen_at: Option<DateTime<Utc>>,
    /// Reasons recorded by content moderation, if any.
    pub moderation_reasons: Vec<String>,
    /// Confidence reported by content moderation.
    pub moderation_confidence: Option<f64>,
    /// Providers that contributed to the moderation result.
    pub moderation_providers: Vec<String>,
    /// When the question was submitted.
    pub created_at: DateTime<Utc>,
    /// When the question was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Question {
    /// Build a new, unanswered question row.
    pub fn new(tenant_id: TenantId, input: CreateQuestion, status: QuestionStatus) -> Self {
        let now = Utc::now();
        Self {
            id: QuestionId::new(),
            tenant_id,
            team_id: input.team_id,
            author_id: input.author_id,
            body: input.body,
            status,
            upvotes: 0,
            response_text: None,
            responded_at: None,
            reviewed_by: None,
            reviewed_at: None,
            is_pinned: false,
            pinned_by: None,
            pinned_at: None,
            is_frozen: false,
            frozen_by: None,
            frozen_at: None,
            moderation_reasons: Vec::new(),
            moderation_confidence: None,
            moderation_providers: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Check whether `user` wrote this question.
    pub fn is_authored_by(&self, user: UserId) -> bool {
        self.author_id == Some(user)
    }
}

/// Data required to submit a question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateQuestion {
    /// Target team, if any.
    pub team_id: Option<TeamId>,
    /// Author, or `None` when submitted anonymously.
    pub author_id: Option<UserId>,
    /// Question text.
    pub body: String,
}

//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use pulsestage_auth::rbac::BulkOp;
use pulsestage_core::AppError;
use pulsestage_core::types::id::{QuestionId, TagId, TeamId, UserId};
use pulsestage_database::store::QuestionOrder;
use pulsestage_entity::question::QuestionStatus;
use pulsestage_entity::team::TeamRole;

use crate::error::ApiError;

/// Run `validator` rules and map failures to a 400.
pub fn validated<T: Validate>(req: T) -> Result<T, ApiError> {
    req.validate().map_err(|e| ApiError(validation_error(&e)))?;
    Ok(req)
}

fn validation_error(errors: &ValidationErrors) -> AppError {
    let fields: Vec<String> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| match errs.first().and_then(|e| e.message.as_ref()) {
            Some(msg) => format!("{field}: {msg}"),
            None => format!("{field}: invalid value"),
        })
        .collect();
    AppError::validation(format!("Invalid request: {}", fields.join(", ")))
}

// ── Session ──────────────────────────────────────────────────

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
}

// ── Questions ────────────────────────────────────────────────

/// Question submission body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitQuestionBody {
    #[validate(length(min = 1, max = 2000, message = "Question must be 1-2000 characters"))]
    pub body: String,
    #[serde(default)]
    pub team_id: Option<TeamId>,
    #[serde(default)]
    pub anonymous: bool,
}

/// Query parameters for `GET /api/questions`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListQuestionsParams {
    pub team_id: Option<TeamId>,
    pub status: Option<QuestionStatus>,
    pub search: Option<String>,
    pub tag_id: Option<TagId>,
    /// `top` (default), `newest` or `oldest`.
    pub sort: Option<String>,
}

impl ListQuestionsParams {
    /// Parse the sort parameter.
    pub fn order(&self) -> Result<QuestionOrder, ApiError> {
        match self.sort.as_deref().map(str::to_ascii_lowercase).as_deref() {
            None | Some("top") => Ok(QuestionOrder::Top),
            Some("newest") => Ok(QuestionOrder::Newest),
            Some("oldest") => Ok(QuestionOrder::Oldest),
            Some(other) => Err(ApiError(AppError::validation(format!(
                "Unknown sort '{other}'. Expected one of: top, newest, oldest"
            )))),
        }
    }
}

/// Query parameters for `GET /api/questions/search`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchParams {
    pub q: String,
    pub team_id: Option<TeamId>,
}

/// Moderator answer.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RespondRequest {
    #[validate(length(min = 1, max = 10000, message = "Response must be 1-10000 characters"))]
    pub response: String,
}

/// Attach a tag to a question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagQuestionRequest {
    pub tag_id: TagId,
}

// ── Moderation ───────────────────────────────────────────────

/// Query parameters for the moderation queue.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueueParams {
    pub team_id: Option<TeamId>,
    #[serde(default)]
    pub under_review_only: bool,
}

/// Query parameters for moderation stats.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatsParams {
    pub team_id: Option<TeamId>,
}

/// Tag many questions at once.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BulkTagRequest {
    #[validate(length(min = 1, max = 100, message = "Between 1 and 100 questions per batch"))]
    pub question_ids: Vec<QuestionId>,
    pub tag_id: TagId,
}

/// Apply one moderation operation to many questions.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BulkActionRequest {
    #[validate(length(min = 1, max = 100, message = "Between 1 and 100 questions per batch"))]
    pub question_ids: Vec<QuestionId>,
    pub action: BulkOp,
}

// ── Teams ────────────────────────────────────────────────────

/// Query parameters for `GET /api/teams`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListTeamsParams {
    #[serde(default)]
    pub include_inactive: bool,
}

/// Create team body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateTeamBody {
    #[validate(length(min = 2, max = 50, message = "Slug must be 2-50 characters"))]
    pub slug: String,
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

/// Replace a settings object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateSettingsRequest {
    pub settings: serde_json::Value,
}

/// Add a member by user ID or email.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AddMemberBody {
    pub user_id: Option<UserId>,
    #[validate(email(message = "A valid email is required"))]
    pub email: Option<String>,
    pub role: String,
}

impl AddMemberBody {
    pub fn role(&self) -> Result<TeamRole, ApiError> {
        self.role.parse().map_err(ApiError)
    }
}

/// Change a member's role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeRoleRequest {
    pub role: String,
}

impl ChangeRoleRequest {
    pub fn role(&self) -> Result<TeamRole, ApiError> {
        self.role.parse().map_err(ApiError)
    }
}

// ── Tags ─────────────────────────────────────────────────────

/// Create tag body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateTagBody {
    #[validate(length(min = 1, max = 50, message = "Tag name must be 1-50 characters"))]
    pub name: String,
    pub color: Option<String>,
}

// ── Audit ────────────────────────────────────────────────────

/// Audit log filters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditQueryParams {
    pub action: Option<String>,
    pub actor_id: Option<UserId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulsestage_core::error::codes::INVALID_ROLE;

    #[test]
    fn test_bad_role_is_invalid_role() {
        let req = ChangeRoleRequest {
            role: "superuser".to_string(),
        };
        let err = req.role().unwrap_err();
        assert_eq!(err.0.code, Some(INVALID_ROLE));
    }

    #[test]
    fn test_bulk_batch_limits() {
        let empty = BulkActionRequest {
            question_ids: Vec::new(),
            action: BulkOp::Pin,
        };
        assert!(validated(empty).is_err());

        let full = BulkActionRequest {
            question_ids: (0..101).map(|_| QuestionId::new()).collect(),
            action: BulkOp::Pin,
        };
        assert!(validated(full).is_err());
    }

    #[test]
    fn test_sort_parsing() {
        let params = ListQuestionsParams {
            sort: Some("Newest".to_string()),
            ..ListQuestionsParams::default()
        };
        assert_eq!(params.order().unwrap(), QuestionOrder::Newest);

        let params = ListQuestionsParams {
            sort: Some("random".to_string()),
            ..ListQuestionsParams::default()
        };
        assert!(params.order().is_err());
    }
}

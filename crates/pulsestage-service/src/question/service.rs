//! Public question operations.
//!
//! Reads here are tenant-wide: any visitor of a tenant sees its open and
//! answered questions. Held questions (`UNDER_REVIEW`) are only reachable
//! through the moderation service.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use pulsestage_core::AppError;
use pulsestage_core::result::AppResult;
use pulsestage_core::types::id::{QuestionId, TagId, TeamId};
use pulsestage_core::types::pagination::{PageRequest, PageResponse};
use pulsestage_core::types::predicate::QueryPredicate;
use pulsestage_database::store::{
    QuestionFilter, QuestionOrder, QuestionStore, TeamStore, TenantStore, UpvoteWrite,
};
use pulsestage_entity::question::{CreateQuestion, MAX_BODY_CHARS, Question, QuestionStatus};
use pulsestage_entity::tag::Tag;

use crate::context::RequestContext;

/// Statuses visible outside the moderation queue.
const PUBLIC_STATUSES: [QuestionStatus; 2] = [QuestionStatus::Open, QuestionStatus::Answered];

/// Request to submit a question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitQuestionRequest {
    /// Question text.
    pub body: String,
    /// Team to address, if any.
    #[serde(default)]
    pub team_id: Option<TeamId>,
    /// Hide the author.
    #[serde(default)]
    pub anonymous: bool,
}

/// Filters for public listings.
#[derive(Debug, Clone, Default)]
pub struct ListQuestionsQuery {
    pub team_id: Option<TeamId>,
    pub status: Option<QuestionStatus>,
    pub search: Option<String>,
    pub tag_id: Option<TagId>,
    pub order: QuestionOrder,
}

/// A question with its tags.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionDetail {
    #[serde(flatten)]
    pub question: Question,
    pub tags: Vec<Tag>,
}

/// Result of an upvote request.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct UpvoteOutcome {
    pub question_id: QuestionId,
    pub upvotes: i32,
    pub already_upvoted: bool,
}

/// Question operations open to every member of a tenant.
#[derive(Debug, Clone)]
pub struct QuestionService {
    questions: Arc<dyn QuestionStore>,
    tenants: Arc<dyn TenantStore>,
    teams: Arc<dyn TeamStore>,
}

impl QuestionService {
    pub fn new(
        questions: Arc<dyn QuestionStore>,
        tenants: Arc<dyn TenantStore>,
        teams: Arc<dyn TeamStore>,
    ) -> Self {
        Self {
            questions,
            tenants,
            teams,
        }
    }

    /// Submit a question as the signed-in user.
    pub async fn submit(
        &self,
        ctx: &RequestContext,
        req: SubmitQuestionRequest,
    ) -> AppResult<Question> {
        let user = ctx.require_user()?;
        let body = req.body.trim();
        if body.is_empty() {
            return Err(AppError::validation("Question body cannot be empty"));
        }
        if body.chars().count() > MAX_BODY_CHARS {
            return Err(AppError::validation(format!(
                "Question body cannot exceed {MAX_BODY_CHARS} characters"
            )));
        }

        if let Some(team_id) = req.team_id {
            let team = self
                .teams
                .find_by_id(&ctx.tenant, team_id)
                .await?
                .ok_or_else(|| AppError::not_found("Team not found"))?;
            if !team.is_active {
                return Err(AppError::validation("Team is not accepting questions"));
            }
        }

        let tenant = self.tenants.get(&ctx.tenant).await?;
        let status = if tenant.requires_review() {
            QuestionStatus::UnderReview
        } else {
            QuestionStatus::Open
        };

        let input = CreateQuestion {
            team_id: req.team_id,
            author_id: (!req.anonymous).then_some(user),
            body: body.to_string(),
        };
        let question = self
            .questions
            .insert(&ctx.tenant, &Question::new(ctx.tenant_id(), input, status))
            .await?;

        info!(
            tenant_id = %ctx.tenant_id(),
            question_id = %question.id,
            team_id = ?question.team_id,
            status = %question.status,
            "Question submitted"
        );
        Ok(question)
    }

    /// List open and answered questions.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        query: ListQuestionsQuery,
        page: PageRequest,
    ) -> AppResult<PageResponse<Question>> {
        let statuses = match query.status {
            None => PUBLIC_STATUSES.to_vec(),
            Some(status) if PUBLIC_STATUSES.contains(&status) => vec![status],
            Some(status) => {
                return Err(AppError::validation(format!(
                    "Questions in status {status} are only listed in the moderation queue"
                )));
            }
        };

        let mut predicate = QueryPredicate::tenant_only(ctx.tenant);
        if let Some(team_id) = query.team_id {
            predicate = predicate.restrict_to_team(team_id);
        }
        let filter = QuestionFilter {
            statuses,
            search: query.search,
            tag: query.tag_id,
            order: query.order,
        };
        self.questions.list(&predicate, &filter, &page).await
    }

    /// Full-text search over open and answered questions.
    pub async fn search(
        &self,
        ctx: &RequestContext,
        terms: &str,
        team_id: Option<TeamId>,
        page: PageRequest,
    ) -> AppResult<PageResponse<Question>> {
        let terms = terms.trim();
        if terms.is_empty() {
            return Err(AppError::validation("Search query cannot be empty"));
        }
        let query = ListQuestionsQuery {
            team_id,
            search: Some(terms.to_string()),
            order: QuestionOrder::Top,
            ..ListQuestionsQuery::default()
        };
        self.list(ctx, query, page).await
    }

    /// Fetch one visible question with its tags.
    pub async fn get(&self, ctx: &RequestContext, id: QuestionId) -> AppResult<QuestionDetail> {
        let question = self.find_visible(ctx, id).await?;
        let tags = self.questions.tags_for(&ctx.tenant, id).await?;
        Ok(QuestionDetail { question, tags })
    }

    /// Upvote a question. Repeating an upvote is not an error.
    pub async fn upvote(&self, ctx: &RequestContext, id: QuestionId) -> AppResult<UpvoteOutcome> {
        let user = ctx.require_user()?;
        let question = self.find_visible(ctx, id).await?;
        if question.is_authored_by(user) {
            return Err(AppError::validation("You cannot upvote your own question"));
        }

        // The store re-checks visibility under its lock.
        let write = self
            .questions
            .upvote(&ctx.tenant, id, user)
            .await?
            .ok_or_else(|| AppError::not_found("Question not found"))?;

        let (upvotes, already_upvoted) = match write {
            UpvoteWrite::Recorded { upvotes } => (upvotes, false),
            UpvoteWrite::AlreadyUpvoted { upvotes } => (upvotes, true),
        };
        Ok(UpvoteOutcome {
            question_id: id,
            upvotes,
            already_upvoted,
        })
    }

    async fn find_visible(&self, ctx: &RequestContext, id: QuestionId) -> AppResult<Question> {
        self.questions
            .find_by_id(&QueryPredicate::tenant_only(ctx.tenant), id)
            .await?
            .filter(|q| q.status.is_public())
            .ok_or_else(|| AppError::not_found("Question not found"))
    }
}

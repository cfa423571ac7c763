//! Single-question moderation, the moderation queue and stats.
//!
//! Every operation asks the gate first and then hands the resulting
//! predicate to the store, so the row is re-checked against the allowed
//! scope in the same statement that changes it.

use std::sync::Arc;

use serde_json::json;
use tracing::info;

use pulsestage_auth::rbac::{Action, AuthorizationGate, Scope, ScopedQueryBuilder, Target};
use pulsestage_core::AppError;
use pulsestage_core::result::AppResult;
use pulsestage_core::types::id::{QuestionId, TagId, TeamId};
use pulsestage_core::types::pagination::{PageRequest, PageResponse};
use pulsestage_core::types::predicate::QueryPredicate;
use pulsestage_database::store::{
    QuestionFilter, QuestionMutation, QuestionOrder, QuestionStore, StatusCounts, TagStore,
};
use pulsestage_entity::question::{Question, QuestionStatus};

use crate::audit::{AuditEvent, AuditRecorder};
use crate::context::RequestContext;

/// Filters for the moderation queue.
#[derive(Debug, Clone, Default)]
pub struct ModerationQueueQuery {
    /// Narrow to one team; never widens the caller's scope.
    pub team_id: Option<TeamId>,
    /// Only held questions.
    pub under_review_only: bool,
}

/// Moderation of questions within the caller's teams.
#[derive(Debug, Clone)]
pub struct ModerationService {
    pub(crate) questions: Arc<dyn QuestionStore>,
    pub(crate) tags: Arc<dyn TagStore>,
    pub(crate) gate: AuthorizationGate,
    pub(crate) recorder: AuditRecorder,
}

impl ModerationService {
    pub fn new(
        questions: Arc<dyn QuestionStore>,
        tags: Arc<dyn TagStore>,
        gate: AuthorizationGate,
        recorder: AuditRecorder,
    ) -> Self {
        Self {
            questions,
            tags,
            gate,
            recorder,
        }
    }

    /// Post or replace the answer to a question.
    pub async fn respond(
        &self,
        ctx: &RequestContext,
        id: QuestionId,
        text: &str,
    ) -> AppResult<Question> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::validation("Response cannot be empty"));
        }
        let mutation = QuestionMutation::Respond {
            text: text.to_string(),
            by: ctx.user_id(),
        };
        self.mutate(ctx, Action::RespondToQuestion, id, mutation).await
    }

    /// Release a held question into the open list.
    pub async fn approve(&self, ctx: &RequestContext, id: QuestionId) -> AppResult<Question> {
        let mutation = QuestionMutation::Approve { by: ctx.user_id() };
        self.mutate(ctx, Action::ApproveQuestion, id, mutation).await
    }

    pub async fn set_pinned(
        &self,
        ctx: &RequestContext,
        id: QuestionId,
        pinned: bool,
    ) -> AppResult<Question> {
        let mutation = QuestionMutation::SetPinned {
            pinned,
            by: ctx.user_id(),
        };
        self.mutate(ctx, Action::PinQuestion, id, mutation).await
    }

    pub async fn set_frozen(
        &self,
        ctx: &RequestContext,
        id: QuestionId,
        frozen: bool,
    ) -> AppResult<Question> {
        let mutation = QuestionMutation::SetFrozen {
            frozen,
            by: ctx.user_id(),
        };
        self.mutate(ctx, Action::FreezeQuestion, id, mutation).await
    }

    /// Attach a tag. Returns whether it was newly attached.
    pub async fn add_tag(&self, ctx: &RequestContext, id: QuestionId, tag: TagId) -> AppResult<bool> {
        self.require_tag(ctx, tag).await?;
        let predicate = self.authorize_question(ctx, Action::TagQuestion, id).await?;
        let added = self
            .questions
            .add_tag(&predicate, id, tag)
            .await?
            .ok_or_else(|| AppError::not_found("Question not found"))?;
        if added {
            self.audit(ctx, "question.tag", id, json!({ "tag_id": tag }));
        }
        Ok(added)
    }

    /// Detach a tag. Returns whether it was attached.
    pub async fn remove_tag(
        &self,
        ctx: &RequestContext,
        id: QuestionId,
        tag: TagId,
    ) -> AppResult<bool> {
        let predicate = self.authorize_question(ctx, Action::TagQuestion, id).await?;
        let removed = self
            .questions
            .remove_tag(&predicate, id, tag)
            .await?
            .ok_or_else(|| AppError::not_found("Question not found"))?;
        if removed {
            self.audit(ctx, "question.untag", id, json!({ "tag_id": tag }));
        }
        Ok(removed)
    }

    /// Open and held questions in every team the caller moderates, oldest
    /// first.
    pub async fn queue(
        &self,
        ctx: &RequestContext,
        query: ModerationQueueQuery,
        page: PageRequest,
    ) -> AppResult<PageResponse<Question>> {
        let predicate = self
            .list_predicate(ctx, Action::ViewModerationQueue, query.team_id)
            .await?;
        if predicate.is_unsatisfiable() {
            return Ok(PageResponse::empty(&page));
        }
        let statuses: &[QuestionStatus] = if query.under_review_only {
            &[QuestionStatus::UnderReview]
        } else {
            &[QuestionStatus::UnderReview, QuestionStatus::Open]
        };
        let filter = QuestionFilter {
            order: QuestionOrder::Oldest,
            ..QuestionFilter::with_statuses(statuses)
        };
        self.questions.list(&predicate, &filter, &page).await
    }

    /// Per-status totals over every team the caller moderates.
    pub async fn stats(
        &self,
        ctx: &RequestContext,
        team_id: Option<TeamId>,
    ) -> AppResult<StatusCounts> {
        let predicate = self
            .list_predicate(ctx, Action::ViewModerationStats, team_id)
            .await?;
        if predicate.is_unsatisfiable() {
            return Ok(StatusCounts::default());
        }
        self.questions.status_counts(&predicate).await
    }

    /// Authorize `action` on the question's own team and return the
    /// predicate the write must satisfy.
    pub(crate) async fn authorize_question(
        &self,
        ctx: &RequestContext,
        action: Action,
        id: QuestionId,
    ) -> AppResult<QueryPredicate> {
        let question = self
            .questions
            .find_by_id(&QueryPredicate::tenant_only(ctx.tenant), id)
            .await?
            .ok_or_else(|| AppError::not_found("Question not found"))?;
        let scope = self
            .gate
            .require(ctx.principal(), action, &Target::question(ctx.tenant_id(), question.team_id))
            .await?;
        Ok(self.build_filter(ctx, &scope))
    }

    pub(crate) fn build_filter(&self, ctx: &RequestContext, scope: &Scope) -> QueryPredicate {
        ScopedQueryBuilder::new(ctx.tenant).build_filter(scope)
    }

    pub(crate) async fn require_tag(&self, ctx: &RequestContext, tag: TagId) -> AppResult<()> {
        self.tags
            .find_by_id(&ctx.tenant, tag)
            .await?
            .map(|_| ())
            .ok_or_else(|| AppError::not_found("Tag not found"))
    }

    pub(crate) fn audit(
        &self,
        ctx: &RequestContext,
        action: &str,
        id: QuestionId,
        metadata: serde_json::Value,
    ) {
        let event = AuditEvent::new(action, "question", Some(id.into_uuid())).with_metadata(metadata);
        self.recorder.record(ctx, event);
    }

    async fn list_predicate(
        &self,
        ctx: &RequestContext,
        action: Action,
        team_id: Option<TeamId>,
    ) -> AppResult<QueryPredicate> {
        let scope = self
            .gate
            .require(ctx.principal(), action, &Target::all_teams(ctx.tenant_id()))
            .await?;
        let predicate = self.build_filter(ctx, &scope);
        Ok(match team_id {
            Some(team) => predicate.restrict_to_team(team),
            None => predicate,
        })
    }

    async fn mutate(
        &self,
        ctx: &RequestContext,
        action: Action,
        id: QuestionId,
        mutation: QuestionMutation,
    ) -> AppResult<Question> {
        let predicate = self.authorize_question(ctx, action, id).await?;
        let question = self
            .questions
            .apply(&predicate, id, &mutation)
            .await?
            .ok_or_else(|| AppError::not_found("Question not found"))?;

        info!(
            tenant_id = %ctx.tenant_id(),
            actor = ?ctx.principal(),
            question_id = %id,
            change = mutation.name(),
            "Question moderated"
        );
        self.audit(ctx, &format!("question.{}", mutation.name()), id, json!({}));
        Ok(question)
    }
}

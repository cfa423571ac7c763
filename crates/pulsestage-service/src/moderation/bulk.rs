//! Bulk tagging and bulk moderation.
//!
//! Each ID is authorized and applied on its own. An ID that is missing, in
//! another tenant, or outside the caller's teams fails alone; the rest of the
//! batch still goes through and nothing is rolled back.

use serde::Serialize;
use serde_json::json;
use tracing::info;

use pulsestage_auth::rbac::{Action, BulkOp, Target};
use pulsestage_core::AppError;
use pulsestage_core::result::AppResult;
use pulsestage_core::types::id::{QuestionId, TagId};
use pulsestage_database::store::QuestionMutation;

use super::service::ModerationService;
use crate::context::RequestContext;

/// Upper bound on IDs per bulk request.
pub const MAX_BULK_ITEMS: usize = 100;

/// Outcome for one ID of a batch.
#[derive(Debug, Clone, Serialize)]
pub struct BulkItemResult {
    pub id: QuestionId,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
}

/// Accumulated outcome of a batch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BulkResult {
    pub success_count: usize,
    pub error_count: usize,
    pub total: usize,
    pub results: Vec<BulkItemResult>,
}

impl BulkResult {
    fn push(&mut self, id: QuestionId, outcome: AppResult<()>) {
        self.total += 1;
        let item = match outcome {
            Ok(()) => {
                self.success_count += 1;
                BulkItemResult {
                    id,
                    success: true,
                    error: None,
                    code: None,
                }
            }
            Err(e) => {
                self.error_count += 1;
                BulkItemResult {
                    id,
                    success: false,
                    error: Some(e.message),
                    code: e.code,
                }
            }
        };
        self.results.push(item);
    }
}

fn check_batch(ids: &[QuestionId]) -> AppResult<()> {
    if ids.is_empty() {
        return Err(AppError::validation("At least one question ID is required"));
    }
    if ids.len() > MAX_BULK_ITEMS {
        return Err(AppError::validation(format!(
            "At most {MAX_BULK_ITEMS} questions can be processed at once"
        )));
    }
    Ok(())
}

impl ModerationService {
    /// Attach `tag` to every question in `ids` the caller may tag.
    pub async fn bulk_tag(
        &self,
        ctx: &RequestContext,
        ids: &[QuestionId],
        tag: TagId,
    ) -> AppResult<BulkResult> {
        check_batch(ids)?;
        self.require_tag(ctx, tag).await?;
        // Callers with no qualifying team at all are rejected as a whole.
        self.gate
            .require(ctx.principal(), Action::BulkTag, &Target::all_teams(ctx.tenant_id()))
            .await?;

        let mut result = BulkResult::default();
        for &id in ids {
            let outcome = self.tag_one(ctx, id, tag).await;
            result.push(id, outcome);
        }

        info!(
            tenant_id = %ctx.tenant_id(),
            tag_id = %tag,
            success = result.success_count,
            errors = result.error_count,
            "Bulk tag finished"
        );
        Ok(result)
    }

    /// Apply `op` to every question in `ids` the caller may act on.
    pub async fn bulk_action(
        &self,
        ctx: &RequestContext,
        ids: &[QuestionId],
        op: BulkOp,
    ) -> AppResult<BulkResult> {
        check_batch(ids)?;
        let action = Action::BulkAction(op);
        self.gate
            .require(ctx.principal(), action, &Target::all_teams(ctx.tenant_id()))
            .await?;

        let mut result = BulkResult::default();
        for &id in ids {
            let outcome = self.act_on_one(ctx, id, op).await;
            result.push(id, outcome);
        }

        info!(
            tenant_id = %ctx.tenant_id(),
            op = op.as_str(),
            success = result.success_count,
            errors = result.error_count,
            "Bulk action finished"
        );
        Ok(result)
    }

    async fn tag_one(&self, ctx: &RequestContext, id: QuestionId, tag: TagId) -> AppResult<()> {
        let predicate = self.authorize_question(ctx, Action::BulkTag, id).await?;
        let added = self
            .questions
            .add_tag(&predicate, id, tag)
            .await?
            .ok_or_else(|| AppError::not_found("Question not found"))?;
        if added {
            self.audit(ctx, "question.tag", id, json!({ "tag_id": tag, "bulk": true }));
        }
        Ok(())
    }

    async fn act_on_one(&self, ctx: &RequestContext, id: QuestionId, op: BulkOp) -> AppResult<()> {
        let predicate = self
            .authorize_question(ctx, Action::BulkAction(op), id)
            .await?;
        let by = ctx.user_id();
        let mutation = match op {
            BulkOp::Pin => QuestionMutation::SetPinned { pinned: true, by },
            BulkOp::Unpin => QuestionMutation::SetPinned { pinned: false, by },
            BulkOp::Freeze => QuestionMutation::SetFrozen { frozen: true, by },
            BulkOp::Unfreeze => QuestionMutation::SetFrozen { frozen: false, by },
            BulkOp::Delete => {
                if !self.questions.delete(&predicate, id).await? {
                    return Err(AppError::not_found("Question not found"));
                }
                self.audit(ctx, "question.delete", id, json!({ "bulk": true }));
                return Ok(());
            }
        };
        self.questions
            .apply(&predicate, id, &mutation)
            .await?
            .ok_or_else(|| AppError::not_found("Question not found"))?;
        self.audit(ctx, &format!("question.{}", mutation.name()), id, json!({ "bulk": true }));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulsestage_auth::principal::Principal;
    use pulsestage_auth::rbac::AuthorizationGate;
    use pulsestage_core::types::predicate::QueryPredicate;
    use pulsestage_core::types::tenant_scope::TenantScope;
    use pulsestage_database::MemoryStore;
    use pulsestage_database::store::Stores;
    use pulsestage_entity::question::{CreateQuestion, Question, QuestionStatus};
    use pulsestage_entity::tag::CreateTag;
    use pulsestage_entity::team::{CreateTeam, TeamRole};
    use pulsestage_entity::user::CreateUser;

    use crate::audit::AuditRecorder;

    struct Harness {
        stores: Stores,
        service: ModerationService,
        scope: TenantScope,
    }

    async fn harness() -> Harness {
        let store = MemoryStore::new();
        let tenant = store.insert_tenant("acme", "Acme").await;
        let stores = store.stores();
        let service = ModerationService::new(
            stores.questions.clone(),
            stores.tags.clone(),
            AuthorizationGate::new(stores.memberships.clone()),
            AuditRecorder::new(stores.audit.clone()),
        );
        Harness {
            stores,
            service,
            scope: TenantScope::new(tenant.id),
        }
    }

    impl Harness {
        async fn moderator_of(&self, slug: &str) -> (RequestContext, pulsestage_core::types::id::TeamId) {
            let founder = self
                .stores
                .users
                .create(
                    &self.scope,
                    &CreateUser {
                        email: format!("owner@{slug}.test"),
                        name: "Owner".to_string(),
                        sso_id: None,
                        primary_team_id: None,
                    },
                )
                .await
                .unwrap();
            let team = self
                .stores
                .teams
                .create(
                    &self.scope,
                    &CreateTeam {
                        slug: slug.to_string(),
                        name: slug.to_string(),
                        description: None,
                    },
                    Some(founder.id),
                )
                .await
                .unwrap();
            let user = self
                .stores
                .users
                .create(
                    &self.scope,
                    &CreateUser {
                        email: format!("mod@{slug}.test"),
                        name: "Mod".to_string(),
                        sso_id: None,
                        primary_team_id: Some(team.id),
                    },
                )
                .await
                .unwrap();
            self.stores
                .memberships
                .add(&self.scope, team.id, user.id, TeamRole::Moderator)
                .await
                .unwrap();
            let principal = Principal::Member {
                user: user.id,
                tenant: self.scope.tenant_id(),
            };
            (RequestContext::new(self.scope, Some(principal), None), team.id)
        }

        async fn question(&self, team: Option<pulsestage_core::types::id::TeamId>) -> QuestionId {
            let q = Question::new(
                self.scope.tenant_id(),
                CreateQuestion {
                    team_id: team,
                    author_id: None,
                    body: "What ships next quarter?".to_string(),
                },
                QuestionStatus::Open,
            );
            self.stores.questions.insert(&self.scope, &q).await.unwrap().id
        }

        async fn tag(&self, name: &str) -> TagId {
            self.stores
                .tags
                .create(
                    &self.scope,
                    &CreateTag {
                        name: name.to_string(),
                        color: None,
                    },
                )
                .await
                .unwrap()
                .id
        }
    }

    #[tokio::test]
    async fn test_bulk_tag_reports_partial_failure() {
        let h = harness().await;
        let (ctx, team) = h.moderator_of("eng").await;
        let valid = h.question(Some(team)).await;
        let missing = QuestionId::new();
        let tag = h.tag("roadmap").await;

        let result = h.service.bulk_tag(&ctx, &[valid, missing], tag).await.unwrap();
        assert_eq!((result.success_count, result.error_count, result.total), (1, 1, 2));
        assert!(result.results[0].success);
        assert!(!result.results[1].success);

        let tags = h.stores.questions.tags_for(&h.scope, valid).await.unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].id, tag);
    }

    #[tokio::test]
    async fn test_bulk_action_skips_other_teams() {
        let h = harness().await;
        let (ctx, eng) = h.moderator_of("eng").await;
        let (_, sales) = h.moderator_of("sales").await;
        let mine = h.question(Some(eng)).await;
        let theirs = h.question(Some(sales)).await;

        let result = h
            .service
            .bulk_action(&ctx, &[mine, theirs], BulkOp::Pin)
            .await
            .unwrap();
        assert_eq!((result.success_count, result.error_count), (1, 1));
        assert_eq!(result.results[1].code, Some("NOT_A_MEMBER"));

        let all = QueryPredicate::tenant_only(h.scope);
        let theirs = h.stores.questions.find_by_id(&all, theirs).await.unwrap().unwrap();
        assert!(!theirs.is_pinned);
        let mine = h.stores.questions.find_by_id(&all, mine).await.unwrap().unwrap();
        assert!(mine.is_pinned);
    }

    #[tokio::test]
    async fn test_bulk_delete_requires_admin() {
        let h = harness().await;
        let (ctx, eng) = h.moderator_of("eng").await;
        let id = h.question(Some(eng)).await;
        let err = h
            .service
            .bulk_action(&ctx, &[id], BulkOp::Delete)
            .await
            .unwrap_err();
        assert_eq!(err.code, Some("INSUFFICIENT_ROLE"));
    }

    #[tokio::test]
    async fn test_empty_batch_is_rejected() {
        let h = harness().await;
        let (ctx, _) = h.moderator_of("eng").await;
        assert!(h.service.bulk_action(&ctx, &[], BulkOp::Pin).await.is_err());
    }
}

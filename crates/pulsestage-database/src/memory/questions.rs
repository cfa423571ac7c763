//! Questions, upvotes and question tags.

use async_trait::async_trait;
use chrono::Utc;

use pulsestage_core::AppError;
use pulsestage_core::error::codes::QUESTION_FROZEN;
use pulsestage_core::result::AppResult;
use pulsestage_core::types::id::{QuestionId, TagId, UserId};
use pulsestage_core::types::pagination::{PageRequest, PageResponse};
use pulsestage_core::types::predicate::QueryPredicate;
use pulsestage_core::types::tenant_scope::TenantScope;
use pulsestage_entity::question::Question;
use pulsestage_entity::tag::Tag;

use super::{MemoryState, MemoryStore};
use crate::store::{
    QuestionFilter, QuestionMutation, QuestionOrder, QuestionStore, StatusCounts, UpvoteWrite,
};

fn in_scope(state: &MemoryState, predicate: &QueryPredicate, id: QuestionId) -> bool {
    state
        .questions
        .get(&id)
        .is_some_and(|q| predicate.matches(q.tenant_id, q.team_id))
}

fn sort(questions: &mut [Question], order: QuestionOrder) {
    match order {
        QuestionOrder::Top => questions.sort_by(|a, b| {
            b.is_pinned
                .cmp(&a.is_pinned)
                .then_with(|| b.upvotes.cmp(&a.upvotes))
                .then_with(|| b.created_at.cmp(&a.created_at))
        }),
        QuestionOrder::Newest => questions.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        QuestionOrder::Oldest => questions.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
    }
}

#[async_trait]
impl QuestionStore for MemoryStore {
    async fn insert(&self, scope: &TenantScope, question: &Question) -> AppResult<Question> {
        if !scope.contains(question.tenant_id) {
            return Err(AppError::internal("Question tenant does not match scope"));
        }
        let mut state = self.state.write().await;
        state.questions.insert(question.id, question.clone());
        Ok(question.clone())
    }

    async fn find_by_id(
        &self,
        predicate: &QueryPredicate,
        id: QuestionId,
    ) -> AppResult<Option<Question>> {
        let state = self.state.read().await;
        Ok(state
            .questions
            .get(&id)
            .filter(|q| predicate.matches(q.tenant_id, q.team_id))
            .cloned())
    }

    async fn list(
        &self,
        predicate: &QueryPredicate,
        filter: &QuestionFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Question>> {
        let state = self.state.read().await;
        let mut matching: Vec<Question> = state
            .questions
            .values()
            .filter(|q| predicate.matches(q.tenant_id, q.team_id))
            .filter(|q| filter.matches(q, &state.tag_ids_for(q.id)))
            .cloned()
            .collect();
        sort(&mut matching, filter.order);

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok(PageResponse::new(items, page, total))
    }

    async fn status_counts(&self, predicate: &QueryPredicate) -> AppResult<StatusCounts> {
        let state = self.state.read().await;
        let mut counts = StatusCounts::default();
        state
            .questions
            .values()
            .filter(|q| predicate.matches(q.tenant_id, q.team_id))
            .for_each(|q| counts.record(q));
        Ok(counts)
    }

    async fn apply(
        &self,
        predicate: &QueryPredicate,
        id: QuestionId,
        mutation: &QuestionMutation,
    ) -> AppResult<Option<Question>> {
        let mut state = self.state.write().await;
        let Some(question) = state
            .questions
            .get_mut(&id)
            .filter(|q| predicate.matches(q.tenant_id, q.team_id))
        else {
            return Ok(None);
        };
        let mut updated = question.clone();
        mutation.apply(&mut updated, Utc::now())?;
        *question = updated.clone();
        Ok(Some(updated))
    }

    async fn delete(&self, predicate: &QueryPredicate, id: QuestionId) -> AppResult<bool> {
        let mut state = self.state.write().await;
        if !in_scope(&state, predicate, id) {
            return Ok(false);
        }
        state.questions.remove(&id);
        state.upvotes.retain(|(_, q)| *q != id);
        state.question_tags.retain(|(q, _)| *q != id);
        Ok(true)
    }

    async fn upvote(
        &self,
        scope: &TenantScope,
        id: QuestionId,
        user: UserId,
    ) -> AppResult<Option<UpvoteWrite>> {
        let mut guard = self.state.write().await;
        let state = &mut *guard;
        let Some(question) = state
            .questions
            .get_mut(&id)
            .filter(|q| scope.contains(q.tenant_id) && q.status.is_public())
        else {
            return Ok(None);
        };
        if state.upvotes.contains(&(user, id)) {
            return Ok(Some(UpvoteWrite::AlreadyUpvoted {
                upvotes: question.upvotes,
            }));
        }
        if question.is_frozen {
            return Err(AppError::conflict("Question is frozen and cannot be upvoted")
                .with_code(QUESTION_FROZEN));
        }
        state.upvotes.insert((user, id));
        question.upvotes += 1;
        Ok(Some(UpvoteWrite::Recorded {
            upvotes: question.upvotes,
        }))
    }

    async fn add_tag(
        &self,
        predicate: &QueryPredicate,
        id: QuestionId,
        tag: TagId,
    ) -> AppResult<Option<bool>> {
        let mut state = self.state.write().await;
        if !in_scope(&state, predicate, id) {
            return Ok(None);
        }
        let tag_ok = state
            .tags
            .get(&tag)
            .is_some_and(|t| predicate.tenant().contains(t.tenant_id));
        if !tag_ok {
            return Ok(Some(false));
        }
        Ok(Some(state.question_tags.insert((id, tag))))
    }

    async fn remove_tag(
        &self,
        predicate: &QueryPredicate,
        id: QuestionId,
        tag: TagId,
    ) -> AppResult<Option<bool>> {
        let mut state = self.state.write().await;
        if !in_scope(&state, predicate, id) {
            return Ok(None);
        }
        Ok(Some(state.question_tags.remove(&(id, tag))))
    }

    async fn tags_for(&self, scope: &TenantScope, id: QuestionId) -> AppResult<Vec<Tag>> {
        let state = self.state.read().await;
        let mut tags: Vec<Tag> = state
            .tag_ids_for(id)
            .into_iter()
            .filter_map(|t| state.tags.get(&t))
            .filter(|t| scope.contains(t.tenant_id))
            .cloned()
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulsestage_entity::question::{CreateQuestion, QuestionStatus};

    async fn setup(status: QuestionStatus) -> (MemoryStore, TenantScope, QuestionId) {
        let store = MemoryStore::new();
        let tenant = store.insert_tenant("acme", "Acme").await;
        let scope = TenantScope::new(tenant.id);
        let question = Question::new(
            tenant.id,
            CreateQuestion {
                team_id: None,
                author_id: None,
                body: "Is the cafeteria open on Fridays?".into(),
            },
            status,
        );
        let id = store.insert(&scope, &question).await.unwrap().id;
        (store, scope, id)
    }

    #[tokio::test]
    async fn test_repeat_upvote_on_frozen_question_is_already_upvoted() {
        let (store, scope, id) = setup(QuestionStatus::Open).await;
        let user = UserId::new();

        let first = store.upvote(&scope, id, user).await.unwrap();
        assert_eq!(first, Some(UpvoteWrite::Recorded { upvotes: 1 }));

        store
            .apply(
                &QueryPredicate::tenant_only(scope),
                id,
                &QuestionMutation::SetFrozen {
                    frozen: true,
                    by: None,
                },
            )
            .await
            .unwrap();

        let repeat = store.upvote(&scope, id, user).await.unwrap();
        assert_eq!(repeat, Some(UpvoteWrite::AlreadyUpvoted { upvotes: 1 }));

        let err = store.upvote(&scope, id, UserId::new()).await.unwrap_err();
        assert_eq!(err.code, Some(QUESTION_FROZEN));
    }

    #[tokio::test]
    async fn test_question_under_review_cannot_be_upvoted() {
        let (store, scope, id) = setup(QuestionStatus::UnderReview).await;

        let write = store.upvote(&scope, id, UserId::new()).await.unwrap();

        assert_eq!(write, None);
        let question = store
            .find_by_id(&QueryPredicate::tenant_only(scope), id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(question.upvotes, 0);
    }
}

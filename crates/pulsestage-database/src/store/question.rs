//! Question persistence contract and the mutation rules shared by every
//! backend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use pulsestage_core::error::codes::QUESTION_FROZEN;
use pulsestage_core::result::AppResult;
use pulsestage_core::types::id::{QuestionId, TagId, UserId};
use pulsestage_core::types::pagination::{PageRequest, PageResponse};
use pulsestage_core::types::predicate::QueryPredicate;
use pulsestage_core::types::tenant_scope::TenantScope;
use pulsestage_core::AppError;
use pulsestage_entity::question::{Question, QuestionStatus};
use pulsestage_entity::tag::Tag;

/// Sort order for question listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QuestionOrder {
    /// Pinned first, then most upvoted, then newest.
    #[default]
    Top,
    /// Newest first.
    Newest,
    /// Oldest first; used by the moderation queue.
    Oldest,
}

/// Row filters layered on top of a [`QueryPredicate`].
#[derive(Debug, Clone, Default)]
pub struct QuestionFilter {
    /// Allowed statuses; empty means any.
    pub statuses: Vec<QuestionStatus>,
    /// Full-text search terms.
    pub search: Option<String>,
    /// Only questions carrying this tag.
    pub tag: Option<TagId>,
    /// Sort order.
    pub order: QuestionOrder,
}

impl QuestionFilter {
    /// Filter on a set of statuses.
    pub fn with_statuses(statuses: &[QuestionStatus]) -> Self {
        Self {
            statuses: statuses.to_vec(),
            ..Self::default()
        }
    }

    /// Check a question against the status, search and tag clauses.
    ///
    /// `tags` are the question's attached tag IDs.
    pub fn matches(&self, question: &Question, tags: &[TagId]) -> bool {
        if !self.statuses.is_empty() && !self.statuses.contains(&question.status) {
            return false;
        }
        if let Some(tag) = self.tag {
            if !tags.contains(&tag) {
                return false;
            }
        }
        match self.search.as_deref().map(str::trim) {
            Some(terms) if !terms.is_empty() => {
                let body = question.body.to_lowercase();
                terms
                    .split_whitespace()
                    .all(|term| body.contains(&term.to_lowercase()))
            }
            _ => true,
        }
    }
}

/// Per-status totals for the moderation dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub open: u64,
    pub answered: u64,
    pub under_review: u64,
    pub pinned: u64,
    pub frozen: u64,
    pub total: u64,
}

impl StatusCounts {
    /// Add one question to the totals.
    pub fn record(&mut self, question: &Question) {
        match question.status {
            QuestionStatus::Open => self.open += 1,
            QuestionStatus::Answered => self.answered += 1,
            QuestionStatus::UnderReview => self.under_review += 1,
        }
        if question.is_pinned {
            self.pinned += 1;
        }
        if question.is_frozen {
            self.frozen += 1;
        }
        self.total += 1;
    }
}

/// A moderation change to a single question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionMutation {
    /// Post (or replace) the answer.
    Respond {
        text: String,
        by: Option<UserId>,
    },
    /// Pin or unpin.
    SetPinned { pinned: bool, by: Option<UserId> },
    /// Freeze or unfreeze.
    SetFrozen { frozen: bool, by: Option<UserId> },
    /// Release a held question into the open list.
    Approve { by: Option<UserId> },
}

impl QuestionMutation {
    /// Short name used in logs and audit entries.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Respond { .. } => "respond",
            Self::SetPinned { pinned: true, .. } => "pin",
            Self::SetPinned { pinned: false, .. } => "unpin",
            Self::SetFrozen { frozen: true, .. } => "freeze",
            Self::SetFrozen { frozen: false, .. } => "unfreeze",
            Self::Approve { .. } => "approve",
        }
    }

    /// Apply the change to a loaded row.
    ///
    /// Backends call this on a row they hold locked, so the frozen check and
    /// the write cannot interleave with a concurrent freeze.
    pub fn apply(&self, question: &mut Question, now: DateTime<Utc>) -> AppResult<()> {
        match self {
            Self::Respond { text, by } => {
                if question.is_frozen {
                    return Err(AppError::conflict("Question is frozen and cannot be answered")
                        .with_code(QUESTION_FROZEN));
                }
                if !question.status.can_transition_to(QuestionStatus::Answered) {
                    return Err(AppError::validation(format!(
                        "Question in status {} cannot be answered",
                        question.status
                    )));
                }
                question.status = QuestionStatus::Answered;
                question.response_text = Some(text.clone());
                question.responded_at = Some(now);
                question.reviewed_by = *by;
                question.reviewed_at = Some(now);
            }
            Self::SetPinned { pinned, by } => {
                question.is_pinned = *pinned;
                question.pinned_by = if *pinned { *by } else { None };
                question.pinned_at = pinned.then_some(now);
            }
            Self::SetFrozen { frozen, by } => {
                question.is_frozen = *frozen;
                question.frozen_by = if *frozen { *by } else { None };
                question.frozen_at = frozen.then_some(now);
            }
            Self::Approve { by } => {
                if question.status != QuestionStatus::UnderReview {
                    return Err(AppError::validation(format!(
                        "Question in status {} is not awaiting review",
                        question.status
                    )));
                }
                question.status = QuestionStatus::Open;
                question.reviewed_by = *by;
                question.reviewed_at = Some(now);
            }
        }
        question.updated_at = now;
        Ok(())
    }
}

/// Result of an upvote write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum UpvoteWrite {
    /// A new upvote row was written and the counter incremented.
    Recorded { upvotes: i32 },
    /// The user had already upvoted; nothing changed.
    AlreadyUpvoted { upvotes: i32 },
}

/// Questions, upvotes and question tags.
#[async_trait]
pub trait QuestionStore: Send + Sync + std::fmt::Debug + 'static {
    /// Persist a newly built question.
    async fn insert(&self, scope: &TenantScope, question: &Question) -> AppResult<Question>;

    /// Find a question matching the predicate.
    async fn find_by_id(
        &self,
        predicate: &QueryPredicate,
        id: QuestionId,
    ) -> AppResult<Option<Question>>;

    /// List questions matching the predicate and filter.
    async fn list(
        &self,
        predicate: &QueryPredicate,
        filter: &QuestionFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Question>>;

    /// Totals per status over the predicate.
    async fn status_counts(&self, predicate: &QueryPredicate) -> AppResult<StatusCounts>;

    /// Apply a mutation to the question if it matches the predicate.
    /// Returns `None` when no such question is in scope.
    async fn apply(
        &self,
        predicate: &QueryPredicate,
        id: QuestionId,
        mutation: &QuestionMutation,
    ) -> AppResult<Option<Question>>;

    /// Delete the question if it matches the predicate.
    async fn delete(&self, predicate: &QueryPredicate, id: QuestionId) -> AppResult<bool>;

    /// Record an upvote, at most once per (user, question).
    ///
    /// Returns `None` when the question does not exist in the tenant or is
    /// not public. A repeat upvote reports `AlreadyUpvoted` even if the
    /// question has since been frozen; a new upvote on a frozen question
    /// fails with `QUESTION_FROZEN`. All checks run under the write lock.
    async fn upvote(
        &self,
        scope: &TenantScope,
        id: QuestionId,
        user: UserId,
    ) -> AppResult<Option<UpvoteWrite>>;

    /// Attach a tag. `Some(true)` if newly attached, `Some(false)` if it
    /// already was, `None` if the question is out of scope.
    async fn add_tag(
        &self,
        predicate: &QueryPredicate,
        id: QuestionId,
        tag: TagId,
    ) -> AppResult<Option<bool>>;

    /// Detach a tag. Same return convention as [`QuestionStore::add_tag`].
    async fn remove_tag(
        &self,
        predicate: &QueryPredicate,
        id: QuestionId,
        tag: TagId,
    ) -> AppResult<Option<bool>>;

    /// Tags attached to a question.
    async fn tags_for(&self, scope: &TenantScope, id: QuestionId) -> AppResult<Vec<Tag>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulsestage_core::types::id::TenantId;
    use pulsestage_entity::question::CreateQuestion;

    fn question(body: &str) -> Question {
        Question::new(
            TenantId::new(),
            CreateQuestion {
                team_id: None,
                author_id: None,
                body: body.to_string(),
            },
            QuestionStatus::Open,
        )
    }

    #[test]
    fn test_respond_rejects_frozen_question() {
        let mut q = question("When is the offsite?");
        QuestionMutation::SetFrozen {
            frozen: true,
            by: None,
        }
        .apply(&mut q, Utc::now())
        .unwrap();

        let err = QuestionMutation::Respond {
            text: "Soon".into(),
            by: None,
        }
        .apply(&mut q, Utc::now())
        .unwrap_err();
        assert_eq!(err.code, Some(QUESTION_FROZEN));
        assert_eq!(q.status, QuestionStatus::Open);
    }

    #[test]
    fn test_unpin_clears_pinner() {
        let mut q = question("Roadmap?");
        let by = Some(UserId::new());
        QuestionMutation::SetPinned { pinned: true, by }
            .apply(&mut q, Utc::now())
            .unwrap();
        assert_eq!(q.pinned_by, by);
        QuestionMutation::SetPinned { pinned: false, by }
            .apply(&mut q, Utc::now())
            .unwrap();
        assert!(!q.is_pinned);
        assert_eq!(q.pinned_by, None);
        assert_eq!(q.pinned_at, None);
    }

    #[test]
    fn test_approve_only_from_review() {
        let mut held = question("Why the reorg?");
        held.status = QuestionStatus::UnderReview;
        QuestionMutation::Approve { by: None }
            .apply(&mut held, Utc::now())
            .unwrap();
        assert_eq!(held.status, QuestionStatus::Open);
        assert!(
            QuestionMutation::Approve { by: None }
                .apply(&mut held, Utc::now())
                .is_err()
        );
    }

    #[test]
    fn test_search_matches_every_term() {
        let q = question("What is the Q3 hiring plan?");
        let mut filter = QuestionFilter::default();
        filter.search = Some("hiring q3".into());
        assert!(filter.matches(&q, &[]));
        filter.search = Some("hiring budget".into());
        assert!(!filter.matches(&q, &[]));
    }
}

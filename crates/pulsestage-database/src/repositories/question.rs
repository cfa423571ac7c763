//! Question repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder};

use pulsestage_core::error::codes::QUESTION_FROZEN;
use pulsestage_core::error::{AppError, ErrorKind};
use pulsestage_core::result::AppResult;
use pulsestage_core::types::id::{QuestionId, TagId, UserId};
use pulsestage_core::types::pagination::{PageRequest, PageResponse};
use pulsestage_core::types::predicate::QueryPredicate;
use pulsestage_core::types::tenant_scope::TenantScope;
use pulsestage_entity::question::{Question, QuestionStatus};
use pulsestage_entity::tag::Tag;

use super::predicate::push_predicate;
use crate::store::{
    QuestionFilter, QuestionMutation, QuestionOrder, QuestionStore, StatusCounts, UpvoteWrite,
};

/// Repository for questions, upvotes and question tags.
#[derive(Debug, Clone)]
pub struct QuestionRepository {
    pool: PgPool,
}

impl QuestionRepository {
    /// Create a new question repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Append the status, search and tag clauses of `filter`.
fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &QuestionFilter) {
    if !filter.statuses.is_empty() {
        qb.push(" AND q.status = ANY(")
            .push_bind(filter.statuses.clone())
            .push(")");
    }
    if let Some(terms) = filter.search.as_deref().map(str::trim) {
        if !terms.is_empty() {
            qb.push(" AND to_tsvector('english', q.body) @@ plainto_tsquery('english', ")
                .push_bind(terms.to_string())
                .push(")");
        }
    }
    if let Some(tag) = filter.tag {
        qb.push(
            " AND EXISTS (SELECT 1 FROM question_tags qt WHERE qt.question_id = q.id AND qt.tag_id = ",
        )
        .push_bind(tag)
        .push(")");
    }
}

fn order_clause(order: QuestionOrder) -> &'static str {
    match order {
        QuestionOrder::Top => " ORDER BY q.is_pinned DESC, q.upvotes DESC, q.created_at DESC",
        QuestionOrder::Newest => " ORDER BY q.created_at DESC",
        QuestionOrder::Oldest => " ORDER BY q.created_at ASC",
    }
}

#[async_trait]
impl QuestionStore for QuestionRepository {
    async fn insert(&self, scope: &TenantScope, question: &Question) -> AppResult<Question> {
        if !scope.contains(question.tenant_id) {
            return Err(AppError::internal("Question tenant does not match scope"));
        }
        sqlx::query_as::<_, Question>(
            "INSERT INTO questions (id, tenant_id, team_id, author_id, body, status, \
             moderation_reasons, moderation_confidence, moderation_providers, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) RETURNING *",
        )
        .bind(question.id)
        .bind(scope.tenant_id())
        .bind(question.team_id)
        .bind(question.author_id)
        .bind(&question.body)
        .bind(question.status)
        .bind(&question.moderation_reasons)
        .bind(question.moderation_confidence)
        .bind(&question.moderation_providers)
        .bind(question.created_at)
        .bind(question.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create question", e))
    }

    async fn find_by_id(
        &self,
        predicate: &QueryPredicate,
        id: QuestionId,
    ) -> AppResult<Option<Question>> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT q.* FROM questions q WHERE ");
        push_predicate(&mut qb, predicate, "q");
        qb.push(" AND q.id = ").push_bind(id);

        qb.build_query_as::<Question>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find question", e))
    }

    async fn list(
        &self,
        predicate: &QueryPredicate,
        filter: &QuestionFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Question>> {
        if predicate.is_unsatisfiable() {
            return Ok(PageResponse::empty(page));
        }

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM questions q WHERE ");
        push_predicate(&mut count, predicate, "q");
        push_filter(&mut count, filter);

        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count questions", e)
            })?;

        let mut select = QueryBuilder::<Postgres>::new("SELECT q.* FROM questions q WHERE ");
        push_predicate(&mut select, predicate, "q");
        push_filter(&mut select, filter);
        select.push(order_clause(filter.order));
        select
            .push(" LIMIT ")
            .push_bind(page.limit() as i64)
            .push(" OFFSET ")
            .push_bind(page.offset() as i64);

        let items = select
            .build_query_as::<Question>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list questions", e))?;

        Ok(PageResponse::new(items, page, total as u64))
    }

    async fn status_counts(&self, predicate: &QueryPredicate) -> AppResult<StatusCounts> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT \
             COUNT(*) FILTER (WHERE q.status = 'OPEN'), \
             COUNT(*) FILTER (WHERE q.status = 'ANSWERED'), \
             COUNT(*) FILTER (WHERE q.status = 'UNDER_REVIEW'), \
             COUNT(*) FILTER (WHERE q.is_pinned), \
             COUNT(*) FILTER (WHERE q.is_frozen), \
             COUNT(*) \
             FROM questions q WHERE ",
        );
        push_predicate(&mut qb, predicate, "q");

        let (open, answered, under_review, pinned, frozen, total): (i64, i64, i64, i64, i64, i64) =
            qb.build_query_as()
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to count question statuses", e)
                })?;

        Ok(StatusCounts {
            open: open as u64,
            answered: answered as u64,
            under_review: under_review as u64,
            pinned: pinned as u64,
            frozen: frozen as u64,
            total: total as u64,
        })
    }

    async fn apply(
        &self,
        predicate: &QueryPredicate,
        id: QuestionId,
        mutation: &QuestionMutation,
    ) -> AppResult<Option<Question>> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let mut qb = QueryBuilder::<Postgres>::new("SELECT q.* FROM questions q WHERE ");
        push_predicate(&mut qb, predicate, "q");
        qb.push(" AND q.id = ").push_bind(id).push(" FOR UPDATE");

        let Some(mut question) = qb
            .build_query_as::<Question>()
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to lock question", e))?
        else {
            return Ok(None);
        };

        mutation.apply(&mut question, Utc::now())?;

        let updated = sqlx::query_as::<_, Question>(
            "UPDATE questions SET status = $3, response_text = $4, responded_at = $5, \
             reviewed_by = $6, reviewed_at = $7, is_pinned = $8, pinned_by = $9, pinned_at = $10, \
             is_frozen = $11, frozen_by = $12, frozen_at = $13, updated_at = $14 \
             WHERE tenant_id = $1 AND id = $2 RETURNING *",
        )
        .bind(predicate.tenant_id())
        .bind(id)
        .bind(question.status)
        .bind(&question.response_text)
        .bind(question.responded_at)
        .bind(question.reviewed_by)
        .bind(question.reviewed_at)
        .bind(question.is_pinned)
        .bind(question.pinned_by)
        .bind(question.pinned_at)
        .bind(question.is_frozen)
        .bind(question.frozen_by)
        .bind(question.frozen_at)
        .bind(question.updated_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update question", e))?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit question update", e)
        })?;
        Ok(Some(updated))
    }

    async fn delete(&self, predicate: &QueryPredicate, id: QuestionId) -> AppResult<bool> {
        let mut qb = QueryBuilder::<Postgres>::new("DELETE FROM questions q WHERE ");
        push_predicate(&mut qb, predicate, "q");
        qb.push(" AND q.id = ").push_bind(id);

        let result = qb.build().execute(&self.pool).await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to delete question", e)
        })?;
        Ok(result.rows_affected() > 0)
    }

    async fn upvote(
        &self,
        scope: &TenantScope,
        id: QuestionId,
        user: UserId,
    ) -> AppResult<Option<UpvoteWrite>> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let row: Option<(i32, bool, QuestionStatus)> = sqlx::query_as(
            "SELECT upvotes, is_frozen, status FROM questions \
             WHERE tenant_id = $1 AND id = $2 FOR UPDATE",
        )
        .bind(scope.tenant_id())
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to lock question", e))?;

        let Some((upvotes, is_frozen, status)) = row else {
            return Ok(None);
        };
        if !status.is_public() {
            return Ok(None);
        }

        let existing: Option<i32> = sqlx::query_scalar(
            "SELECT 1 FROM upvotes WHERE tenant_id = $1 AND user_id = $2 AND question_id = $3",
        )
        .bind(scope.tenant_id())
        .bind(user)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to check upvote", e))?;
        if existing.is_some() {
            return Ok(Some(UpvoteWrite::AlreadyUpvoted { upvotes }));
        }
        if is_frozen {
            return Err(AppError::conflict("Question is frozen and cannot be upvoted")
                .with_code(QUESTION_FROZEN));
        }

        let inserted = sqlx::query(
            "INSERT INTO upvotes (tenant_id, user_id, question_id) VALUES ($1, $2, $3) \
             ON CONFLICT (user_id, question_id) DO NOTHING",
        )
        .bind(scope.tenant_id())
        .bind(user)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to record upvote", e))?
        .rows_affected();

        let outcome = if inserted == 0 {
            UpvoteWrite::AlreadyUpvoted { upvotes }
        } else {
            let upvotes: i32 = sqlx::query_scalar(
                "UPDATE questions SET upvotes = upvotes + 1 \
                 WHERE tenant_id = $1 AND id = $2 RETURNING upvotes",
            )
            .bind(scope.tenant_id())
            .bind(id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to increment upvotes", e)
            })?;
            UpvoteWrite::Recorded { upvotes }
        };

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit upvote", e)
        })?;
        Ok(Some(outcome))
    }

    async fn add_tag(
        &self,
        predicate: &QueryPredicate,
        id: QuestionId,
        tag: TagId,
    ) -> AppResult<Option<bool>> {
        if self.find_by_id(predicate, id).await?.is_none() {
            return Ok(None);
        }
        let result = sqlx::query(
            "INSERT INTO question_tags (tenant_id, question_id, tag_id) \
             SELECT $1, $2, t.id FROM tags t WHERE t.tenant_id = $1 AND t.id = $3 \
             ON CONFLICT (question_id, tag_id) DO NOTHING",
        )
        .bind(predicate.tenant_id())
        .bind(id)
        .bind(tag)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to tag question", e))?;
        Ok(Some(result.rows_affected() > 0))
    }

    async fn remove_tag(
        &self,
        predicate: &QueryPredicate,
        id: QuestionId,
        tag: TagId,
    ) -> AppResult<Option<bool>> {
        if self.find_by_id(predicate, id).await?.is_none() {
            return Ok(None);
        }
        let result = sqlx::query(
            "DELETE FROM question_tags WHERE tenant_id = $1 AND question_id = $2 AND tag_id = $3",
        )
        .bind(predicate.tenant_id())
        .bind(id)
        .bind(tag)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to untag question", e))?;
        Ok(Some(result.rows_affected() > 0))
    }

    async fn tags_for(&self, scope: &TenantScope, id: QuestionId) -> AppResult<Vec<Tag>> {
        sqlx::query_as::<_, Tag>(
            "SELECT t.* FROM tags t \
             JOIN question_tags qt ON qt.tag_id = t.id AND qt.tenant_id = t.tenant_id \
             WHERE t.tenant_id = $1 AND qt.question_id = $2 ORDER BY t.name ASC",
        )
        .bind(scope.tenant_id())
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load question tags", e))
    }
}

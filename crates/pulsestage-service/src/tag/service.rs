//! Tag listing and creation.

use std::sync::Arc;

use serde_json::json;

use pulsestage_auth::rbac::{Action, AuthorizationGate, Target};
use pulsestage_core::AppError;
use pulsestage_core::result::AppResult;
use pulsestage_database::store::TagStore;
use pulsestage_entity::tag::{CreateTag, Tag};

use crate::audit::{AuditEvent, AuditRecorder};
use crate::context::RequestContext;

const MAX_TAG_NAME_CHARS: usize = 50;

/// Tenant-wide tag catalogue.
#[derive(Debug, Clone)]
pub struct TagService {
    tags: Arc<dyn TagStore>,
    gate: AuthorizationGate,
    recorder: AuditRecorder,
}

impl TagService {
    pub fn new(tags: Arc<dyn TagStore>, gate: AuthorizationGate, recorder: AuditRecorder) -> Self {
        Self {
            tags,
            gate,
            recorder,
        }
    }

    pub async fn list(&self, ctx: &RequestContext) -> AppResult<Vec<Tag>> {
        self.tags.list(&ctx.tenant).await
    }

    /// Create a tag. Any moderator in the tenant may do so.
    pub async fn create(&self, ctx: &RequestContext, req: CreateTag) -> AppResult<Tag> {
        self.gate
            .require(ctx.principal(), Action::CreateTag, &Target::all_teams(ctx.tenant_id()))
            .await?;

        let name = req.name.trim();
        if name.is_empty() || name.chars().count() > MAX_TAG_NAME_CHARS {
            return Err(AppError::validation(format!(
                "Tag name must be 1 to {MAX_TAG_NAME_CHARS} characters"
            )));
        }
        if let Some(color) = req.color.as_deref() {
            if !is_hex_color(color) {
                return Err(AppError::validation("Tag color must look like #RRGGBB"));
            }
        }

        let data = CreateTag {
            name: name.to_string(),
            color: req.color,
        };
        let tag = self.tags.create(&ctx.tenant, &data).await?;
        self.recorder.record(
            ctx,
            AuditEvent::new("tag.create", "tag", Some(tag.id.into_uuid()))
                .with_metadata(json!({ "name": tag.name })),
        );
        Ok(tag)
    }
}

fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::is_hex_color;

    #[test]
    fn test_hex_color() {
        assert!(is_hex_color("#1a2B3c"));
        assert!(!is_hex_color("1a2b3c"));
        assert!(!is_hex_color("#12345"));
        assert!(!is_hex_color("#12345g"));
    }
}

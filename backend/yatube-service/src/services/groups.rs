use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use crate::db::ContentStore;
use crate::error::{AppError, Result};
use crate::models::{Group, NewGroup};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GroupForm {
    #[validate(
        length(max = 200),
        custom(function = "crate::validators::validate_not_blank")
    )]
    pub title: String,
    #[validate(custom(function = "crate::validators::validate_slug"))]
    pub slug: String,
    #[serde(default)]
    pub description: String,
}

/// Group administration. Groups are not created or removed by end users.
#[derive(Clone)]
pub struct GroupService {
    store: Arc<dyn ContentStore>,
}

impl GroupService {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, form: GroupForm) -> Result<Group> {
        form.validate()?;
        let group = self
            .store
            .create_group(&NewGroup {
                title: form.title,
                slug: form.slug,
                description: form.description,
            })
            .await?;

        info!(group_id = group.id, slug = %group.slug, "group created");
        Ok(group)
    }

    /// Posts of the group survive without a group.
    pub async fn delete(&self, slug: &str) -> Result<()> {
        let group = self
            .store
            .find_group_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("group '{}'", slug)))?;

        self.store.delete_group(group.id).await?;
        info!(group_id = group.id, slug, "group deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryContentStore;

    fn form(slug: &str) -> GroupForm {
        GroupForm {
            title: "Cats".into(),
            slug: slug.into(),
            description: "All about cats".into(),
        }
    }

    #[tokio::test]
    async fn test_slug_must_be_unique_and_well_formed() {
        let service = GroupService::new(Arc::new(MemoryContentStore::new()));
        service.create(form("cats")).await.unwrap();

        let err = service.create(form("cats")).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(ref f) if f.contains_key("slug")));

        let err = service.create(form("big cats")).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(ref f) if f.contains_key("slug")));
    }

    #[tokio::test]
    async fn test_delete_unknown_group() {
        let service = GroupService::new(Arc::new(MemoryContentStore::new()));
        assert!(matches!(
            service.delete("nope").await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }
}

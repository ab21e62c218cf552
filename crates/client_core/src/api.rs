//! Remote tracker capability consumed by the orchestration core.

use async_trait::async_trait;
use shared::domain::{
    ContentId, Item, ItemId, Project, ProjectId, Repository, RepositoryId, UserNodeId, Viewer,
};
use shared::error::RemoteError;

/// Named operations against the remote project tracker. Transport,
/// payload construction, and response mapping live behind this seam.
///
/// The retry executor may re-run any of these after a transient failure;
/// implementations are expected to be idempotent per call or accept
/// at-most-effectively-once semantics for mutations.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    /// Authenticated account plus its organizations. Failing this call at
    /// startup is the only fatal error in the system.
    async fn viewer(&self) -> Result<Viewer, RemoteError>;

    async fn list_projects(&self, owner: &str, is_user: bool)
        -> Result<Vec<Project>, RemoteError>;

    async fn list_items(&self, project_id: &ProjectId) -> Result<Vec<Item>, RemoteError>;

    async fn create_draft_item(
        &self,
        project_id: &ProjectId,
        title: &str,
        body: &str,
    ) -> Result<Item, RemoteError>;

    async fn update_draft_item(
        &self,
        content_id: &ContentId,
        title: &str,
        body: &str,
        assignee_ids: &[UserNodeId],
    ) -> Result<Item, RemoteError>;

    async fn delete_item(&self, project_id: &ProjectId, item_id: &ItemId)
        -> Result<(), RemoteError>;

    async fn convert_draft_to_issue(
        &self,
        item_id: &ItemId,
        repository_id: &RepositoryId,
    ) -> Result<Item, RemoteError>;

    async fn list_repositories(
        &self,
        owner: &str,
        is_user: bool,
    ) -> Result<Vec<Repository>, RemoteError>;

    async fn search_users(&self, query: &str, limit: usize) -> Result<Vec<String>, RemoteError>;

    async fn search_org_members(
        &self,
        org: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<String>, RemoteError>;

    /// Opaque node id for a user or organization login.
    async fn owner_node_id(&self, login: &str, is_user: bool) -> Result<String, RemoteError>;

    async fn create_project(
        &self,
        owner_id: &str,
        title: &str,
        description: &str,
        public: bool,
    ) -> Result<Project, RemoteError>;
}

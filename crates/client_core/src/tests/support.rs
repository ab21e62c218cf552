//! Shared fixtures for the core's tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use shared::domain::{
    ContentId, Item, ItemId, ItemKind, Project, ProjectId, Repository, RepositoryId, UserNodeId,
    Viewer,
};
use shared::error::RemoteError;

use crate::api::RemoteApi;

pub fn project(id: &str, title: &str) -> Project {
    Project {
        id: ProjectId::new(id),
        number: 1,
        title: title.to_string(),
        short_description: String::new(),
        public: false,
        closed: false,
        url: format!("https://tracker.example/projects/{id}"),
        updated_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        item_count: 0,
    }
}

pub fn draft_item(id: &str, title: &str) -> Item {
    Item {
        id: ItemId::new(id),
        content_id: Some(ContentId::new(format!("content-{id}"))),
        kind: ItemKind::DraftIssue,
        title: title.to_string(),
        body: String::new(),
        number: None,
        state: None,
        url: None,
        updated_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
    }
}

pub fn repository(id: &str, name: &str) -> Repository {
    Repository {
        id: RepositoryId::new(id),
        name: name.to_string(),
        owner: "acme".to_string(),
        description: String::new(),
    }
}

/// Configurable in-memory remote. Every call is counted; failures can be
/// injected per operation.
#[derive(Default)]
pub struct MockRemote {
    pub viewer: Option<Viewer>,
    pub projects: Vec<Project>,
    pub items: Vec<Item>,
    pub repositories: Vec<Repository>,
    pub fail_viewer: Option<RemoteError>,
    pub fail_list_projects: Option<RemoteError>,
    pub fail_update_draft: Option<RemoteError>,
    pub calls: Mutex<Vec<&'static str>>,
}

impl MockRemote {
    pub fn with_viewer(username: &str, orgs: &[&str]) -> Self {
        Self {
            viewer: Some(Viewer {
                username: username.to_string(),
                orgs: orgs.iter().map(|o| o.to_string()).collect(),
            }),
            ..Self::default()
        }
    }

    pub fn into_arc(self) -> Arc<dyn RemoteApi> {
        Arc::new(self)
    }

    pub fn call_count(&self, name: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| **c == name)
            .count()
    }

    fn record(&self, name: &'static str) {
        self.calls.lock().unwrap().push(name);
    }
}

#[async_trait]
impl RemoteApi for MockRemote {
    async fn viewer(&self) -> Result<Viewer, RemoteError> {
        self.record("viewer");
        if let Some(err) = &self.fail_viewer {
            return Err(err.clone());
        }
        self.viewer
            .clone()
            .ok_or_else(|| RemoteError::new("no viewer configured"))
    }

    async fn list_projects(
        &self,
        _owner: &str,
        _is_user: bool,
    ) -> Result<Vec<Project>, RemoteError> {
        self.record("list_projects");
        if let Some(err) = &self.fail_list_projects {
            return Err(err.clone());
        }
        Ok(self.projects.clone())
    }

    async fn list_items(&self, _project_id: &ProjectId) -> Result<Vec<Item>, RemoteError> {
        self.record("list_items");
        Ok(self.items.clone())
    }

    async fn create_draft_item(
        &self,
        _project_id: &ProjectId,
        title: &str,
        body: &str,
    ) -> Result<Item, RemoteError> {
        self.record("create_draft_item");
        let mut item = draft_item("created", title);
        item.body = body.to_string();
        Ok(item)
    }

    async fn update_draft_item(
        &self,
        _content_id: &ContentId,
        title: &str,
        _body: &str,
        _assignee_ids: &[UserNodeId],
    ) -> Result<Item, RemoteError> {
        self.record("update_draft_item");
        if let Some(err) = &self.fail_update_draft {
            return Err(err.clone());
        }
        Ok(draft_item("updated", title))
    }

    async fn delete_item(
        &self,
        _project_id: &ProjectId,
        _item_id: &ItemId,
    ) -> Result<(), RemoteError> {
        self.record("delete_item");
        Ok(())
    }

    async fn convert_draft_to_issue(
        &self,
        _item_id: &ItemId,
        _repository_id: &RepositoryId,
    ) -> Result<Item, RemoteError> {
        self.record("convert_draft_to_issue");
        Ok(draft_item("converted", "converted"))
    }

    async fn list_repositories(
        &self,
        _owner: &str,
        _is_user: bool,
    ) -> Result<Vec<Repository>, RemoteError> {
        self.record("list_repositories");
        Ok(self.repositories.clone())
    }

    async fn search_users(&self, _query: &str, _limit: usize) -> Result<Vec<String>, RemoteError> {
        self.record("search_users");
        Ok(vec!["alice".to_string(), "alan".to_string()])
    }

    async fn search_org_members(
        &self,
        _org: &str,
        _query: &str,
        _limit: usize,
    ) -> Result<Vec<String>, RemoteError> {
        self.record("search_org_members");
        Ok(vec!["bob".to_string()])
    }

    async fn owner_node_id(&self, login: &str, _is_user: bool) -> Result<String, RemoteError> {
        self.record("owner_node_id");
        Ok(format!("node-{login}"))
    }

    async fn create_project(
        &self,
        _owner_id: &str,
        title: &str,
        _description: &str,
        _public: bool,
    ) -> Result<Project, RemoteError> {
        self.record("create_project");
        Ok(project("created-project", title))
    }
}

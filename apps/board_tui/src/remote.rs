//! Seeded in-memory backend, stands in for the real tracker API so the
//! client can be exercised without network access or credentials.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use client_core::RemoteApi;
use shared::domain::{
    ContentId, Item, ItemId, ItemKind, Project, ProjectId, Repository, RepositoryId, UserNodeId,
    Viewer,
};
use shared::error::RemoteError;

pub struct SandboxRemote {
    viewer: Viewer,
    inner: Mutex<Inner>,
}

struct Inner {
    projects: Vec<Project>,
    items: HashMap<ProjectId, Vec<Item>>,
    repositories: Vec<Repository>,
    users: Vec<String>,
    next_id: u64,
}

impl Inner {
    fn mint(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }
}

fn project(id: &str, number: i32, title: &str, description: &str) -> Project {
    Project {
        id: ProjectId::new(id),
        number,
        title: title.to_string(),
        short_description: description.to_string(),
        public: false,
        closed: false,
        url: format!("sandbox://projects/{id}"),
        updated_at: Utc::now(),
        item_count: 0,
    }
}

fn draft(id: &str, title: &str, body: &str) -> Item {
    Item {
        id: ItemId::new(id),
        content_id: Some(ContentId::new(format!("content-{id}"))),
        kind: ItemKind::DraftIssue,
        title: title.to_string(),
        body: body.to_string(),
        number: None,
        state: None,
        url: None,
        updated_at: Utc::now(),
    }
}

impl SandboxRemote {
    pub fn seeded(username: &str, orgs: &[String]) -> Self {
        let roadmap = project("p-roadmap", 1, "Roadmap", "Quarterly planning board");
        let bugs = project("p-bugs", 2, "Bug triage", "Incoming bug reports");

        let mut items = HashMap::new();
        items.insert(
            roadmap.id.clone(),
            vec![
                draft("i-1", "Ship the new editor", "Replace the modal flow."),
                draft("i-2", "Write migration guide", ""),
            ],
        );
        items.insert(bugs.id.clone(), Vec::new());

        Self {
            viewer: Viewer {
                username: username.to_string(),
                orgs: orgs.to_vec(),
            },
            inner: Mutex::new(Inner {
                projects: vec![roadmap, bugs],
                items,
                repositories: vec![
                    Repository {
                        id: RepositoryId::new("r-frontend"),
                        name: "frontend".to_string(),
                        owner: username.to_string(),
                        description: "Web client".to_string(),
                    },
                    Repository {
                        id: RepositoryId::new("r-backend"),
                        name: "backend".to_string(),
                        owner: username.to_string(),
                        description: "API server".to_string(),
                    },
                ],
                users: vec![
                    "alice".to_string(),
                    "alan".to_string(),
                    "bob".to_string(),
                    "carol".to_string(),
                ],
                next_id: 0,
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // Sandbox state is never poisoned: no panics while holding the lock.
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl RemoteApi for SandboxRemote {
    async fn viewer(&self) -> Result<Viewer, RemoteError> {
        Ok(self.viewer.clone())
    }

    async fn list_projects(
        &self,
        _owner: &str,
        _is_user: bool,
    ) -> Result<Vec<Project>, RemoteError> {
        Ok(self.lock().projects.clone())
    }

    async fn list_items(&self, project_id: &ProjectId) -> Result<Vec<Item>, RemoteError> {
        Ok(self
            .lock()
            .items
            .get(project_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn create_draft_item(
        &self,
        project_id: &ProjectId,
        title: &str,
        body: &str,
    ) -> Result<Item, RemoteError> {
        let mut inner = self.lock();
        let id = inner.mint("i");
        let item = draft(&id, title, body);
        inner
            .items
            .entry(project_id.clone())
            .or_default()
            .push(item.clone());
        Ok(item)
    }

    async fn update_draft_item(
        &self,
        content_id: &ContentId,
        title: &str,
        body: &str,
        _assignee_ids: &[UserNodeId],
    ) -> Result<Item, RemoteError> {
        let mut inner = self.lock();
        for items in inner.items.values_mut() {
            for item in items.iter_mut() {
                if item.content_id.as_ref() == Some(content_id) {
                    item.title = title.to_string();
                    item.body = body.to_string();
                    item.updated_at = Utc::now();
                    return Ok(item.clone());
                }
            }
        }
        Err(RemoteError::new(format!(
            "draft content {content_id} not found"
        )))
    }

    async fn delete_item(
        &self,
        project_id: &ProjectId,
        item_id: &ItemId,
    ) -> Result<(), RemoteError> {
        let mut inner = self.lock();
        let Some(items) = inner.items.get_mut(project_id) else {
            return Err(RemoteError::new(format!("project {project_id} not found")));
        };
        let before = items.len();
        items.retain(|item| &item.id != item_id);
        if items.len() == before {
            return Err(RemoteError::new(format!("item {item_id} not found")));
        }
        Ok(())
    }

    async fn convert_draft_to_issue(
        &self,
        item_id: &ItemId,
        repository_id: &RepositoryId,
    ) -> Result<Item, RemoteError> {
        let mut inner = self.lock();
        let Some(repository) = inner
            .repositories
            .iter()
            .find(|r| &r.id == repository_id)
            .cloned()
        else {
            return Err(RemoteError::new(format!(
                "repository {repository_id} not found"
            )));
        };
        let number = (inner.next_id + 1) as i32;
        inner.next_id += 1;
        for items in inner.items.values_mut() {
            for item in items.iter_mut() {
                if &item.id == item_id {
                    item.kind = ItemKind::Issue;
                    item.number = Some(number);
                    item.state = Some("OPEN".to_string());
                    item.url = Some(format!("sandbox://{}/issues/{number}", repository.name));
                    item.updated_at = Utc::now();
                    return Ok(item.clone());
                }
            }
        }
        Err(RemoteError::new(format!("item {item_id} not found")))
    }

    async fn list_repositories(
        &self,
        _owner: &str,
        _is_user: bool,
    ) -> Result<Vec<Repository>, RemoteError> {
        Ok(self.lock().repositories.clone())
    }

    async fn search_users(&self, query: &str, limit: usize) -> Result<Vec<String>, RemoteError> {
        let query = query.to_ascii_lowercase();
        Ok(self
            .lock()
            .users
            .iter()
            .filter(|user| user.to_ascii_lowercase().contains(&query))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn search_org_members(
        &self,
        _org: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<String>, RemoteError> {
        self.search_users(query, limit).await
    }

    async fn owner_node_id(&self, login: &str, _is_user: bool) -> Result<String, RemoteError> {
        let known = login == self.viewer.username
            || self.viewer.orgs.iter().any(|org| org == login)
            || self.lock().users.iter().any(|user| user == login);
        if known {
            Ok(format!("node-{login}"))
        } else {
            Err(RemoteError::new(format!("user '{login}' was not found")))
        }
    }

    async fn create_project(
        &self,
        _owner_id: &str,
        title: &str,
        description: &str,
        public: bool,
    ) -> Result<Project, RemoteError> {
        let mut inner = self.lock();
        let id = inner.mint("p");
        let number = inner.projects.len() as i32 + 1;
        let mut created = project(&id, number, title, description);
        created.public = public;
        inner.projects.push(created.clone());
        inner.items.insert(created.id.clone(), Vec::new());
        Ok(created)
    }
}

//! Operation descriptions and their execution against the remote capability.
//!
//! The reducer emits `OpSpec` values (pure data); the session turns each one
//! into a dispatched async call via [`run`]. Keeping the description separate
//! from the execution is what keeps the reducer free of side effects.

use std::sync::Arc;

use shared::domain::{Item, Project, Repository, Viewer};
use shared::error::RemoteError;

use crate::api::RemoteApi;
use crate::classifier::classify;
use crate::dispatch::Slot;
use crate::outcome::Outcome;

const USER_SEARCH_LIMIT: usize = 5;

/// A remote operation the state machine wants executed off the loop.
#[derive(Debug, Clone, PartialEq)]
pub enum OpSpec {
    /// Viewer identity and organization list, fetched once at startup.
    Startup,
    ListProjects {
        owner: String,
        is_user: bool,
    },
    ListItems {
        project: Project,
    },
    /// Create or update a draft item. Creation with an assignee is a
    /// two-step write: the draft is created first, then the assignee is
    /// applied; a failure in the second step is a partial success.
    SaveItem {
        project: Project,
        existing: Option<Item>,
        title: String,
        body: String,
        assignee: Option<String>,
    },
    DeleteItem {
        project: Project,
        item: Item,
    },
    ListRepositories {
        owner: String,
        is_user: bool,
        project: Project,
        item: Item,
    },
    ConvertDraft {
        project: Project,
        item: Item,
        repository: Repository,
    },
    CreateProject {
        owner: String,
        is_user: bool,
        title: String,
        description: String,
        public: bool,
    },
    SearchUsers {
        query: String,
        org: Option<String>,
    },
}

impl OpSpec {
    /// Logical slot this operation races in; a newer dispatch in the same
    /// slot makes this one's result stale.
    pub fn slot(&self) -> Slot {
        match self {
            OpSpec::Startup => Slot::Startup,
            OpSpec::ListProjects { .. } => Slot::Projects,
            OpSpec::ListItems { .. } => Slot::Items,
            OpSpec::ListRepositories { .. } => Slot::Repositories,
            OpSpec::SaveItem { .. }
            | OpSpec::DeleteItem { .. }
            | OpSpec::ConvertDraft { .. }
            | OpSpec::CreateProject { .. } => Slot::Mutation,
            OpSpec::SearchUsers { .. } => Slot::UserSearch,
        }
    }

    /// Status line shown while the operation is in flight. Suggestion
    /// lookups run silently behind the editor.
    pub fn loading_message(&self) -> Option<String> {
        match self {
            OpSpec::Startup => Some("Initializing...".to_string()),
            OpSpec::ListProjects { owner, .. } => Some(format!("Loading projects for {owner}...")),
            OpSpec::ListItems { .. } => Some("Loading project items...".to_string()),
            OpSpec::SaveItem { .. } => Some("Saving item...".to_string()),
            OpSpec::DeleteItem { .. } => Some("Deleting item...".to_string()),
            OpSpec::ListRepositories { .. } => Some("Loading repositories...".to_string()),
            OpSpec::ConvertDraft { repository, .. } => {
                Some(format!("Converting to issue in {}...", repository.name))
            }
            OpSpec::CreateProject { .. } => Some("Creating project...".to_string()),
            OpSpec::SearchUsers { .. } => None,
        }
    }
}

/// Success payload of a completed operation.
#[derive(Debug, Clone, PartialEq)]
pub enum OpOutput {
    Session(Viewer),
    Projects(Vec<Project>),
    Items {
        project: Project,
        items: Vec<Item>,
    },
    /// The write went through; `warning` carries a partial-success outcome
    /// when a secondary step (assignee) failed after the primary commit.
    ItemSaved {
        project: Project,
        warning: Option<Outcome>,
    },
    ItemDeleted {
        project: Project,
    },
    Repositories {
        project: Project,
        item: Item,
        repositories: Vec<Repository>,
    },
    DraftConverted {
        project: Project,
    },
    ProjectCreated,
    UserSuggestions(Vec<String>),
}

/// Execute one operation against the remote capability. Invoked by the
/// dispatcher under the retry executor, so it may run more than once.
pub async fn run(api: Arc<dyn RemoteApi>, spec: OpSpec) -> Result<OpOutput, RemoteError> {
    match spec {
        OpSpec::Startup => api.viewer().await.map(OpOutput::Session),
        OpSpec::ListProjects { owner, is_user } => api
            .list_projects(&owner, is_user)
            .await
            .map(OpOutput::Projects),
        OpSpec::ListItems { project } => {
            let items = api.list_items(&project.id).await?;
            Ok(OpOutput::Items { project, items })
        }
        OpSpec::SaveItem {
            project,
            existing,
            title,
            body,
            assignee,
        } => save_item(api, project, existing, title, body, assignee).await,
        OpSpec::DeleteItem { project, item } => {
            api.delete_item(&project.id, &item.id).await?;
            Ok(OpOutput::ItemDeleted { project })
        }
        OpSpec::ListRepositories {
            owner,
            is_user,
            project,
            item,
        } => {
            let repositories = api.list_repositories(&owner, is_user).await?;
            Ok(OpOutput::Repositories {
                project,
                item,
                repositories,
            })
        }
        OpSpec::ConvertDraft {
            project,
            item,
            repository,
        } => {
            api.convert_draft_to_issue(&item.id, &repository.id).await?;
            Ok(OpOutput::DraftConverted { project })
        }
        OpSpec::CreateProject {
            owner,
            is_user,
            title,
            description,
            public,
        } => {
            let owner_id = api.owner_node_id(&owner, is_user).await?;
            api.create_project(&owner_id, &title, &description, public)
                .await?;
            Ok(OpOutput::ProjectCreated)
        }
        OpSpec::SearchUsers { query, org } => {
            let result = match &org {
                Some(org) => api.search_org_members(org, &query, USER_SEARCH_LIMIT).await,
                None => api.search_users(&query, USER_SEARCH_LIMIT).await,
            };
            // Suggestion lookups never interrupt typing; failures collapse
            // to an empty list.
            Ok(OpOutput::UserSuggestions(result.unwrap_or_default()))
        }
    }
}

async fn save_item(
    api: Arc<dyn RemoteApi>,
    project: Project,
    existing: Option<Item>,
    title: String,
    body: String,
    assignee: Option<String>,
) -> Result<OpOutput, RemoteError> {
    let assignee_ids = match assignee.as_deref().filter(|a| !a.is_empty()) {
        Some(login) => {
            let node_id = api.owner_node_id(login, true).await.map_err(|err| {
                RemoteError {
                    message: format!("failed to resolve user {login}: {}", err.message),
                    status: err.status,
                }
            })?;
            vec![shared::domain::UserNodeId::new(node_id)]
        }
        None => Vec::new(),
    };

    match existing {
        None => {
            let item = api.create_draft_item(&project.id, &title, &body).await?;
            if !assignee_ids.is_empty() {
                let content_id = item.content_id_or_item_id();
                if let Err(err) = api
                    .update_draft_item(&content_id, &title, &body, &assignee_ids)
                    .await
                {
                    // The draft is already committed; surface a warning but
                    // let the success path (refresh) run.
                    let warning = Outcome::partial_success(format!(
                        "Draft created, but failed to assign user: {}",
                        classify(&err).user_message()
                    ));
                    return Ok(OpOutput::ItemSaved {
                        project,
                        warning: Some(warning),
                    });
                }
            }
            Ok(OpOutput::ItemSaved {
                project,
                warning: None,
            })
        }
        Some(item) => {
            let content_id = item.content_id_or_item_id();
            api.update_draft_item(&content_id, &title, &body, &assignee_ids)
                .await?;
            Ok(OpOutput::ItemSaved {
                project,
                warning: None,
            })
        }
    }
}

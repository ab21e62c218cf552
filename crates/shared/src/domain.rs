use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

// Remote node identifiers are opaque strings minted by the tracker backend.
id_newtype!(ProjectId);
id_newtype!(ItemId);
id_newtype!(ContentId);
id_newtype!(RepositoryId);
id_newtype!(UserNodeId);

/// A project owner: a user account or an organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub login: String,
    pub is_user: bool,
}

impl Owner {
    pub fn user(login: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            is_user: true,
        }
    }

    pub fn organization(login: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            is_user: false,
        }
    }
}

/// The authenticated account plus the organizations it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewer {
    pub username: String,
    pub orgs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub number: i32,
    pub title: String,
    pub short_description: String,
    pub public: bool,
    pub closed: bool,
    pub url: String,
    pub updated_at: DateTime<Utc>,
    pub item_count: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    DraftIssue,
    Issue,
    PullRequest,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    /// Id of the underlying content (draft issue or issue); mutations on a
    /// draft's title/body go through this id, not the board item id.
    pub content_id: Option<ContentId>,
    pub kind: ItemKind,
    pub title: String,
    pub body: String,
    pub number: Option<i32>,
    pub state: Option<String>,
    pub url: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    pub fn is_draft(&self) -> bool {
        self.kind == ItemKind::DraftIssue
    }

    /// Content id to mutate, falling back to the board item id for rows
    /// where the backend did not report one.
    pub fn content_id_or_item_id(&self) -> ContentId {
        match &self.content_id {
            Some(id) => id.clone(),
            None => ContentId::new(self.id.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub id: RepositoryId,
    pub name: String,
    pub owner: String,
    pub description: String,
}

impl Repository {
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

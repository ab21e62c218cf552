//! The single state aggregate owned by the interactive loop.

use std::collections::HashMap;

use shared::domain::{Item, Owner, Project, Repository};

use crate::defaults::ProjectDefaults;
use crate::dispatch::{RequestId, Slot};
use crate::outcome::Outcome;

/// Active screen. Exactly one at a time; the error overlay is orthogonal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Loading,
    OwnerSelection,
    ProjectList,
    ProjectDetail,
    ItemDetail,
    ItemEditor,
    ProjectCreator,
    RepositorySelector,
    Help,
}

/// Error overlay shown over any screen until dismissed. Warnings come from
/// partial successes and survive the refresh they ride along with.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub outcome: Outcome,
}

impl Overlay {
    pub fn is_warning(&self) -> bool {
        self.outcome.is_warning()
    }
}

/// Latest request id issued per slot. A result message whose id does not
/// match the latest for its slot is stale and must be discarded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingRequests {
    latest: HashMap<Slot, RequestId>,
}

impl PendingRequests {
    pub fn track(&mut self, slot: Slot, id: RequestId) {
        self.latest.insert(slot, id);
    }

    pub fn is_latest(&self, slot: Slot, id: RequestId) -> bool {
        self.latest.get(&slot) == Some(&id)
    }

    pub fn clear(&mut self, slot: Slot) {
        self.latest.remove(&slot);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorField {
    Title,
    Body,
    Assignee,
}

impl EditorField {
    pub fn next(self) -> Self {
        match self {
            EditorField::Title => EditorField::Body,
            EditorField::Body => EditorField::Assignee,
            EditorField::Assignee => EditorField::Title,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            EditorField::Title => EditorField::Assignee,
            EditorField::Body => EditorField::Title,
            EditorField::Assignee => EditorField::Body,
        }
    }
}

/// Draft item editor. `existing` is `None` when creating a new item.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorState {
    pub project: Project,
    pub existing: Option<Item>,
    pub title: String,
    pub body: String,
    pub assignee: String,
    pub focus: EditorField,
    pub suggestions: Vec<String>,
    pub suggestion_cursor: usize,
    pub show_suggestions: bool,
}

impl EditorState {
    pub fn create(project: Project) -> Self {
        Self {
            project,
            existing: None,
            title: String::new(),
            body: String::new(),
            assignee: String::new(),
            focus: EditorField::Title,
            suggestions: Vec::new(),
            suggestion_cursor: 0,
            show_suggestions: false,
        }
    }

    pub fn edit(project: Project, item: Item) -> Self {
        Self {
            title: item.title.clone(),
            body: item.body.clone(),
            existing: Some(item),
            ..Self::create(project)
        }
    }

    pub fn is_new(&self) -> bool {
        self.existing.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreatorField {
    Title,
    Description,
    Public,
}

impl CreatorField {
    pub fn next(self) -> Self {
        match self {
            CreatorField::Title => CreatorField::Description,
            CreatorField::Description => CreatorField::Public,
            CreatorField::Public => CreatorField::Title,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            CreatorField::Title => CreatorField::Public,
            CreatorField::Description => CreatorField::Title,
            CreatorField::Public => CreatorField::Description,
        }
    }
}

/// New-project form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatorState {
    pub title: String,
    pub description: String,
    pub public: bool,
    pub focus: CreatorField,
}

impl Default for CreatorState {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            public: false,
            focus: CreatorField::Title,
        }
    }
}

/// Repository disambiguation screen for draft conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorState {
    pub project: Project,
    pub item: Item,
    pub repositories: Vec<Repository>,
    pub filter: String,
    pub cursor: usize,
    pub save_as_default: bool,
}

impl SelectorState {
    pub fn new(project: Project, item: Item, repositories: Vec<Repository>) -> Self {
        Self {
            project,
            item,
            repositories,
            filter: String::new(),
            cursor: 0,
            save_as_default: false,
        }
    }

    /// Repositories matching the typed filter on name, owner, description,
    /// or `owner/name`.
    pub fn filtered(&self) -> Vec<&Repository> {
        let filter = self.filter.to_ascii_lowercase();
        if filter.is_empty() {
            return self.repositories.iter().collect();
        }
        self.repositories
            .iter()
            .filter(|repo| {
                repo.name.to_ascii_lowercase().contains(&filter)
                    || repo.owner.to_ascii_lowercase().contains(&filter)
                    || repo.description.to_ascii_lowercase().contains(&filter)
                    || repo.full_name().to_ascii_lowercase().contains(&filter)
            })
            .collect()
    }
}

/// The one mutable aggregate. Replaced wholesale on each reducer step;
/// background workers never touch it.
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub view: ViewState,
    pub username: String,
    pub orgs: Vec<String>,
    pub owner: Option<Owner>,
    pub owner_cursor: usize,
    pub projects: Vec<Project>,
    pub project_cursor: usize,
    pub current_project: Option<Project>,
    pub items: Vec<Item>,
    pub item_cursor: usize,
    pub current_item: Option<Item>,
    pub editor: Option<EditorState>,
    pub creator: Option<CreatorState>,
    pub selector: Option<SelectorState>,
    pub overlay: Option<Overlay>,
    pub loading_message: Option<String>,
    pub defaults: ProjectDefaults,
    pub pending: PendingRequests,
    pub width: u16,
    pub height: u16,
    pub should_quit: bool,
    /// Set only when the startup fetch itself fails; the session exits.
    pub fatal: Option<Outcome>,
}

impl AppState {
    pub fn new(defaults: ProjectDefaults) -> Self {
        Self {
            view: ViewState::Loading,
            username: String::new(),
            orgs: Vec::new(),
            owner: None,
            owner_cursor: 0,
            projects: Vec::new(),
            project_cursor: 0,
            current_project: None,
            items: Vec::new(),
            item_cursor: 0,
            current_item: None,
            editor: None,
            creator: None,
            selector: None,
            overlay: None,
            loading_message: None,
            defaults,
            pending: PendingRequests::default(),
            width: 0,
            height: 0,
            should_quit: false,
            fatal: None,
        }
    }

    /// Screen reported to the renderer: Loading whenever an operation with a
    /// status line is in flight, otherwise the logical view.
    pub fn active_state(&self) -> ViewState {
        if self.loading_message.is_some() {
            ViewState::Loading
        } else {
            self.view
        }
    }

    /// Owner-selection entries: the viewer first, then each organization.
    pub fn owner_choices(&self) -> Vec<Owner> {
        let mut choices = vec![Owner::user(self.username.clone())];
        choices.extend(self.orgs.iter().map(|org| Owner::organization(org.clone())));
        choices
    }

    pub fn selected_project(&self) -> Option<&Project> {
        self.projects.get(self.project_cursor)
    }

    pub fn selected_item(&self) -> Option<&Item> {
        self.items.get(self.item_cursor)
    }
}

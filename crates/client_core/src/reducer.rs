//! Pure transition function: `(state, event) -> (state, effects)`.
//!
//! All mutation of the aggregate happens here, on the loop's thread. Remote
//! work is requested through `Effect::Dispatch` and comes back later as a
//! `TerminalMessage`, fed through the same function.

use shared::domain::Owner;

use crate::defaults::ProjectDefaults;
use crate::dispatch::{Slot, TerminalMessage};
use crate::input::InputEvent;
use crate::ops::{OpOutput, OpSpec};
use crate::state::{
    AppState, CreatorField, CreatorState, EditorField, EditorState, Overlay, SelectorState,
    ViewState,
};

/// Queries dispatch only once at least this many characters are typed.
const SUGGESTION_MIN_QUERY: usize = 2;

#[derive(Debug)]
pub enum Event {
    Input(InputEvent),
    Message(TerminalMessage),
}

/// Side effects requested by a transition, executed by the session loop.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Dispatch(OpSpec),
    PersistDefaults(ProjectDefaults),
    Quit,
}

pub fn reduce(mut state: AppState, event: Event) -> (AppState, Vec<Effect>) {
    let mut effects = Vec::new();
    match event {
        Event::Input(InputEvent::Resize { width, height }) => {
            state.width = width;
            state.height = height;
        }
        Event::Input(InputEvent::Key(key)) => on_key(&mut state, &mut effects, &key),
        Event::Message(message) => on_message(&mut state, &mut effects, message),
    }
    (state, effects)
}

/// Record the loading status line and request the dispatch.
fn dispatch(state: &mut AppState, effects: &mut Vec<Effect>, spec: OpSpec) {
    if let Some(message) = spec.loading_message() {
        state.loading_message = Some(message);
    }
    effects.push(Effect::Dispatch(spec));
}

fn on_key(state: &mut AppState, effects: &mut Vec<Effect>, key: &str) {
    // Dismissing the overlay always wins over navigation.
    if state.overlay.is_some() && key == "esc" {
        state.overlay = None;
        return;
    }

    match key {
        // Quitting is only accepted where nothing editable can be lost;
        // everywhere else these keys navigate back or type text.
        "q" | "ctrl+c"
            if matches!(
                state.view,
                ViewState::Loading | ViewState::OwnerSelection | ViewState::ProjectList
            ) =>
        {
            state.should_quit = true;
            effects.push(Effect::Quit);
            return;
        }
        "esc" => {
            navigate_back(state);
            return;
        }
        "?" if !is_text_entry(state.view) => {
            state.view = if state.view == ViewState::Help {
                ViewState::ProjectList
            } else {
                ViewState::Help
            };
            return;
        }
        _ => {}
    }

    match state.view {
        ViewState::OwnerSelection => owner_selection_key(state, effects, key),
        ViewState::ProjectList => project_list_key(state, effects, key),
        ViewState::ProjectDetail => project_detail_key(state, effects, key),
        ViewState::ItemDetail => item_detail_key(state, effects, key),
        ViewState::ItemEditor => editor_key(state, effects, key),
        ViewState::ProjectCreator => creator_key(state, effects, key),
        ViewState::RepositorySelector => selector_key(state, effects, key),
        ViewState::Loading | ViewState::Help => {}
    }
}

fn is_text_entry(view: ViewState) -> bool {
    matches!(
        view,
        ViewState::ItemEditor | ViewState::ProjectCreator | ViewState::RepositorySelector
    )
}

fn navigate_back(state: &mut AppState) {
    match state.view {
        ViewState::ProjectList => {
            if !state.orgs.is_empty() {
                state.view = ViewState::OwnerSelection;
            }
        }
        ViewState::ProjectDetail => state.view = ViewState::ProjectList,
        ViewState::ItemDetail => state.view = ViewState::ProjectDetail,
        ViewState::ItemEditor => {
            // Editing an existing item returns to its detail screen;
            // abandoning a new item returns to the board.
            let editing_existing = state.editor.as_ref().is_some_and(|e| !e.is_new());
            state.editor = None;
            state.view = if editing_existing {
                ViewState::ItemDetail
            } else {
                ViewState::ProjectDetail
            };
        }
        ViewState::ProjectCreator => {
            state.creator = None;
            state.view = ViewState::ProjectList;
        }
        ViewState::RepositorySelector => {
            state.selector = None;
            state.view = ViewState::ItemDetail;
        }
        ViewState::Help => state.view = ViewState::ProjectList,
        ViewState::Loading | ViewState::OwnerSelection => {}
    }
}

fn cycle(cursor: usize, len: usize, forward: bool) -> usize {
    if len == 0 {
        return 0;
    }
    if forward {
        (cursor + 1) % len
    } else {
        (cursor + len - 1) % len
    }
}

fn owner_selection_key(state: &mut AppState, effects: &mut Vec<Effect>, key: &str) {
    let len = state.owner_choices().len();
    match key {
        "down" | "j" => state.owner_cursor = cycle(state.owner_cursor, len, true),
        "up" | "k" => state.owner_cursor = cycle(state.owner_cursor, len, false),
        "enter" => {
            if let Some(owner) = state.owner_choices().get(state.owner_cursor).cloned() {
                state.owner = Some(owner.clone());
                dispatch(
                    state,
                    effects,
                    OpSpec::ListProjects {
                        owner: owner.login,
                        is_user: owner.is_user,
                    },
                );
            }
        }
        _ => {}
    }
}

fn project_list_key(state: &mut AppState, effects: &mut Vec<Effect>, key: &str) {
    match key {
        "down" | "j" => state.project_cursor = cycle(state.project_cursor, state.projects.len(), true),
        "up" | "k" => state.project_cursor = cycle(state.project_cursor, state.projects.len(), false),
        "enter" => {
            if let Some(project) = state.selected_project().cloned() {
                dispatch(state, effects, OpSpec::ListItems { project });
            }
        }
        "n" => {
            state.creator = Some(CreatorState::default());
            state.view = ViewState::ProjectCreator;
        }
        _ => {}
    }
}

fn project_detail_key(state: &mut AppState, effects: &mut Vec<Effect>, key: &str) {
    let Some(project) = state.current_project.clone() else {
        return;
    };
    match key {
        "down" | "j" => state.item_cursor = cycle(state.item_cursor, state.items.len(), true),
        "up" | "k" => state.item_cursor = cycle(state.item_cursor, state.items.len(), false),
        "n" => {
            state.editor = Some(EditorState::create(project));
            state.view = ViewState::ItemEditor;
        }
        "e" => {
            if let Some(item) = state.selected_item().cloned() {
                state.editor = Some(EditorState::edit(project, item));
                state.view = ViewState::ItemEditor;
            }
        }
        "d" => {
            if let Some(item) = state.selected_item().cloned() {
                dispatch(state, effects, OpSpec::DeleteItem { project, item });
            }
        }
        "enter" => {
            if let Some(item) = state.selected_item().cloned() {
                state.current_item = Some(item);
                state.view = ViewState::ItemDetail;
            }
        }
        _ => {}
    }
}

fn item_detail_key(state: &mut AppState, effects: &mut Vec<Effect>, key: &str) {
    let (Some(project), Some(item)) = (state.current_project.clone(), state.current_item.clone())
    else {
        return;
    };
    match key {
        "e" => {
            state.editor = Some(EditorState::edit(project, item));
            state.view = ViewState::ItemEditor;
        }
        "c" => {
            // Only drafts can be converted to issues.
            if item.is_draft() {
                if let Some(owner) = state.owner.clone() {
                    dispatch(
                        state,
                        effects,
                        OpSpec::ListRepositories {
                            owner: owner.login,
                            is_user: owner.is_user,
                            project,
                            item,
                        },
                    );
                }
            }
        }
        "d" => dispatch(state, effects, OpSpec::DeleteItem { project, item }),
        _ => {}
    }
}

fn editor_key(state: &mut AppState, effects: &mut Vec<Effect>, key: &str) {
    let Some(mut editor) = state.editor.take() else {
        return;
    };

    // Suggestion navigation takes over while the assignee dropdown is open.
    if editor.focus == EditorField::Assignee
        && editor.show_suggestions
        && !editor.suggestions.is_empty()
    {
        match key {
            "down" | "ctrl+n" => {
                editor.suggestion_cursor =
                    cycle(editor.suggestion_cursor, editor.suggestions.len(), true);
                state.editor = Some(editor);
                return;
            }
            "up" | "ctrl+p" => {
                editor.suggestion_cursor =
                    cycle(editor.suggestion_cursor, editor.suggestions.len(), false);
                state.editor = Some(editor);
                return;
            }
            "enter" => {
                if let Some(pick) = editor.suggestions.get(editor.suggestion_cursor) {
                    editor.assignee = pick.clone();
                }
                editor.show_suggestions = false;
                state.editor = Some(editor);
                return;
            }
            _ => {}
        }
    }

    match key {
        "ctrl+s" => {
            let assignee = Some(editor.assignee.trim().to_string()).filter(|a| !a.is_empty());
            let spec = OpSpec::SaveItem {
                project: editor.project.clone(),
                existing: editor.existing.clone(),
                title: editor.title.clone(),
                body: editor.body.clone(),
                assignee,
            };
            state.editor = Some(editor);
            dispatch(state, effects, spec);
        }
        "tab" => {
            editor.focus = editor.focus.next();
            editor.show_suggestions = false;
            state.editor = Some(editor);
        }
        "shift+tab" => {
            editor.focus = editor.focus.prev();
            editor.show_suggestions = false;
            state.editor = Some(editor);
        }
        "backspace" => {
            field_mut(&mut editor).pop();
            let changed_assignee = editor.focus == EditorField::Assignee;
            maybe_search(state, effects, &mut editor, changed_assignee);
            state.editor = Some(editor);
        }
        _ => {
            if let Some(ch) = single_char(key) {
                field_mut(&mut editor).push(ch);
                let changed_assignee = editor.focus == EditorField::Assignee;
                maybe_search(state, effects, &mut editor, changed_assignee);
            }
            state.editor = Some(editor);
        }
    }
}

fn field_mut(editor: &mut EditorState) -> &mut String {
    match editor.focus {
        EditorField::Title => &mut editor.title,
        EditorField::Body => &mut editor.body,
        EditorField::Assignee => &mut editor.assignee,
    }
}

/// Kick off a user search when the assignee text changed and is long enough.
fn maybe_search(
    state: &mut AppState,
    effects: &mut Vec<Effect>,
    editor: &mut EditorState,
    changed_assignee: bool,
) {
    if !changed_assignee {
        return;
    }
    let query = editor.assignee.clone();
    if query.chars().count() >= SUGGESTION_MIN_QUERY {
        let org = state
            .owner
            .as_ref()
            .filter(|owner| !owner.is_user)
            .map(|owner| owner.login.clone());
        effects.push(Effect::Dispatch(OpSpec::SearchUsers { query, org }));
    } else {
        editor.suggestions.clear();
        editor.show_suggestions = false;
        // A search for the longer query may still be in flight; drop its
        // claim on the slot so the late result cannot reopen the dropdown.
        state.pending.clear(Slot::UserSearch);
    }
}

fn creator_key(state: &mut AppState, effects: &mut Vec<Effect>, key: &str) {
    let Some(mut creator) = state.creator.take() else {
        return;
    };
    match key {
        "ctrl+s" => {
            if let Some(owner) = state.owner.clone() {
                let spec = OpSpec::CreateProject {
                    owner: owner.login,
                    is_user: owner.is_user,
                    title: creator.title.clone(),
                    description: creator.description.clone(),
                    public: creator.public,
                };
                state.creator = Some(creator);
                dispatch(state, effects, spec);
            } else {
                state.creator = Some(creator);
            }
        }
        "tab" => {
            creator.focus = creator.focus.next();
            state.creator = Some(creator);
        }
        "shift+tab" => {
            creator.focus = creator.focus.prev();
            state.creator = Some(creator);
        }
        " " if creator.focus == CreatorField::Public => {
            creator.public = !creator.public;
            state.creator = Some(creator);
        }
        "backspace" => {
            match creator.focus {
                CreatorField::Title => {
                    creator.title.pop();
                }
                CreatorField::Description => {
                    creator.description.pop();
                }
                CreatorField::Public => {}
            }
            state.creator = Some(creator);
        }
        _ => {
            if let Some(ch) = single_char(key) {
                match creator.focus {
                    CreatorField::Title => creator.title.push(ch),
                    CreatorField::Description => creator.description.push(ch),
                    CreatorField::Public => {}
                }
            }
            state.creator = Some(creator);
        }
    }
}

fn selector_key(state: &mut AppState, effects: &mut Vec<Effect>, key: &str) {
    let Some(mut selector) = state.selector.take() else {
        return;
    };
    match key {
        "down" | "ctrl+n" => {
            selector.cursor = cycle(selector.cursor, selector.filtered().len(), true);
            state.selector = Some(selector);
        }
        "up" | "ctrl+p" => {
            selector.cursor = cycle(selector.cursor, selector.filtered().len(), false);
            state.selector = Some(selector);
        }
        "ctrl+d" => {
            selector.save_as_default = !selector.save_as_default;
            state.selector = Some(selector);
        }
        "enter" => {
            let Some(repository) = selector.filtered().get(selector.cursor).cloned().cloned()
            else {
                state.selector = Some(selector);
                return;
            };
            if selector.save_as_default {
                state
                    .defaults
                    .set(selector.project.id.clone(), repository.id.clone());
                effects.push(Effect::PersistDefaults(state.defaults.clone()));
            }
            let spec = OpSpec::ConvertDraft {
                project: selector.project.clone(),
                item: selector.item.clone(),
                repository,
            };
            // Kept while the conversion runs so a failure leaves the list,
            // filter, and cursor in place; the item refresh clears it.
            state.selector = Some(selector);
            dispatch(state, effects, spec);
        }
        "backspace" => {
            selector.filter.pop();
            selector.cursor = 0;
            state.selector = Some(selector);
        }
        _ => {
            if let Some(ch) = single_char(key) {
                selector.filter.push(ch);
                selector.cursor = 0;
            }
            state.selector = Some(selector);
        }
    }
}

fn single_char(key: &str) -> Option<char> {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Some(ch),
        _ => None,
    }
}

fn on_message(state: &mut AppState, effects: &mut Vec<Effect>, message: TerminalMessage) {
    if !state.pending.is_latest(message.slot, message.request_id) {
        tracing::debug!(
            slot = ?message.slot,
            id = message.request_id.0,
            "discarding stale result"
        );
        return;
    }
    state.pending.clear(message.slot);

    let output = match message.payload {
        Ok(output) => output,
        Err(outcome) => {
            state.loading_message = None;
            if message.slot == Slot::Startup {
                // No session: nothing to fall back to.
                state.fatal = Some(outcome);
                return;
            }
            // The screen stays as it was so the user can retry in place.
            state.overlay = Some(Overlay { outcome });
            return;
        }
    };

    match output {
        OpOutput::Session(viewer) => {
            state.username = viewer.username;
            state.orgs = viewer.orgs;
            state.loading_message = None;
            if state.orgs.is_empty() {
                let owner = Owner::user(state.username.clone());
                state.owner = Some(owner.clone());
                dispatch(
                    state,
                    effects,
                    OpSpec::ListProjects {
                        owner: owner.login,
                        is_user: true,
                    },
                );
            } else {
                state.owner_cursor = 0;
                state.view = ViewState::OwnerSelection;
            }
        }
        OpOutput::Projects(projects) => {
            state.projects = projects;
            state.project_cursor = 0;
            state.creator = None;
            state.view = ViewState::ProjectList;
            state.loading_message = None;
        }
        OpOutput::Items { project, items } => {
            state.item_cursor = if items.is_empty() {
                0
            } else {
                state.item_cursor.min(items.len() - 1)
            };
            state.current_project = Some(project);
            state.items = items;
            state.current_item = None;
            state.editor = None;
            state.selector = None;
            state.view = ViewState::ProjectDetail;
            state.loading_message = None;
        }
        OpOutput::ItemSaved { project, warning } => {
            if let Some(outcome) = warning {
                state.overlay = Some(Overlay { outcome });
            }
            dispatch(state, effects, OpSpec::ListItems { project });
        }
        OpOutput::ItemDeleted { project } | OpOutput::DraftConverted { project } => {
            dispatch(state, effects, OpSpec::ListItems { project });
        }
        OpOutput::Repositories {
            project,
            item,
            repositories,
        } => on_repositories(state, effects, project, item, repositories),
        OpOutput::ProjectCreated => {
            state.creator = None;
            if let Some(owner) = state.owner.clone() {
                dispatch(
                    state,
                    effects,
                    OpSpec::ListProjects {
                        owner: owner.login,
                        is_user: owner.is_user,
                    },
                );
            }
        }
        OpOutput::UserSuggestions(users) => {
            if let Some(editor) = state.editor.as_mut() {
                editor.show_suggestions = !users.is_empty();
                editor.suggestions = users;
                editor.suggestion_cursor = 0;
            }
        }
    }
}

fn on_repositories(
    state: &mut AppState,
    effects: &mut Vec<Effect>,
    project: shared::domain::Project,
    item: shared::domain::Item,
    repositories: Vec<shared::domain::Repository>,
) {
    // A remembered default that still exists skips the selector entirely.
    if let Some(default_id) = state.defaults.get(&project.id).cloned() {
        if let Some(repository) = repositories.iter().find(|r| r.id == default_id).cloned() {
            let spec = OpSpec::ConvertDraft {
                project,
                item,
                repository,
            };
            dispatch(state, effects, spec);
            return;
        }
        // The remembered repository is gone; forget it and ask normally.
        state.defaults.clear(&project.id);
        effects.push(Effect::PersistDefaults(state.defaults.clone()));
    }

    if repositories.len() == 1 {
        if let Some(repository) = repositories.into_iter().next() {
            let spec = OpSpec::ConvertDraft {
                project,
                item,
                repository,
            };
            dispatch(state, effects, spec);
        }
        return;
    }

    state.selector = Some(SelectorState::new(project, item, repositories));
    state.view = ViewState::RepositorySelector;
    state.loading_message = None;
}

#[cfg(test)]
#[path = "tests/reducer_tests.rs"]
mod tests;

//! Plain line-oriented renderer. One textual frame per state change; a
//! richer terminal layer would replace this without touching the core.

use client_core::{Renderer, Snapshot, ViewState};
use shared::domain::ItemKind;

pub struct LineRenderer;

impl LineRenderer {
    pub fn new() -> Self {
        Self
    }
}

fn cursor(selected: bool) -> &'static str {
    if selected {
        "> "
    } else {
        "  "
    }
}

impl Renderer for LineRenderer {
    fn render(&mut self, snapshot: &Snapshot<'_>) {
        let state = snapshot.state;
        println!();

        match snapshot.active_state {
            ViewState::Loading => {
                let message = snapshot.loading_message.unwrap_or("Loading...");
                println!("{message}");
            }
            ViewState::OwnerSelection => {
                println!("Select an owner:");
                for (i, owner) in state.owner_choices().iter().enumerate() {
                    let label = if owner.is_user { "user" } else { "org" };
                    println!("{}{} ({label})", cursor(i == state.owner_cursor), owner.login);
                }
            }
            ViewState::ProjectList => {
                println!("Projects  [enter: open, n: new, q: quit]");
                if state.projects.is_empty() {
                    println!("  (no projects)");
                }
                for (i, project) in state.projects.iter().enumerate() {
                    println!(
                        "{}#{} {}",
                        cursor(i == state.project_cursor),
                        project.number,
                        project.title
                    );
                }
            }
            ViewState::ProjectDetail => {
                let title = state
                    .current_project
                    .as_ref()
                    .map(|p| p.title.as_str())
                    .unwrap_or("?");
                println!("{title}  [enter: view, n: new, e: edit, d: delete]");
                if state.items.is_empty() {
                    println!("  (no items)");
                }
                for (i, item) in state.items.iter().enumerate() {
                    let kind = match item.kind {
                        ItemKind::DraftIssue => "draft",
                        ItemKind::Issue => "issue",
                        ItemKind::PullRequest => "pr",
                    };
                    println!("{}[{kind}] {}", cursor(i == state.item_cursor), item.title);
                }
            }
            ViewState::ItemDetail => {
                if let Some(item) = &state.current_item {
                    println!("{}  [e: edit, c: convert, d: delete]", item.title);
                    if !item.body.is_empty() {
                        println!("{}", item.body);
                    }
                    if let (Some(number), Some(item_state)) = (item.number, &item.state) {
                        println!("#{number} {item_state}");
                    }
                }
            }
            ViewState::ItemEditor => {
                if let Some(editor) = &state.editor {
                    let verb = if editor.is_new() { "New" } else { "Edit" };
                    println!("{verb} item  [tab: next field, ctrl+s: save, esc: cancel]");
                    println!("  title:    {}", editor.title);
                    println!("  body:     {}", editor.body);
                    println!("  assignee: {}", editor.assignee);
                    if editor.show_suggestions {
                        for (i, suggestion) in editor.suggestions.iter().enumerate() {
                            println!("    {}{suggestion}", cursor(i == editor.suggestion_cursor));
                        }
                    }
                }
            }
            ViewState::ProjectCreator => {
                if let Some(creator) = &state.creator {
                    println!("New project  [tab: next field, ctrl+s: create, esc: cancel]");
                    println!("  title:       {}", creator.title);
                    println!("  description: {}", creator.description);
                    println!("  public:      {}", creator.public);
                }
            }
            ViewState::RepositorySelector => {
                if let Some(selector) = &state.selector {
                    println!(
                        "Convert to issue in...  [enter: pick, ctrl+d: remember ({})]",
                        if selector.save_as_default { "on" } else { "off" }
                    );
                    if !selector.filter.is_empty() {
                        println!("  filter: {}", selector.filter);
                    }
                    for (i, repository) in selector.filtered().iter().enumerate() {
                        println!(
                            "{}{}",
                            cursor(i == selector.cursor),
                            repository.full_name()
                        );
                    }
                }
            }
            ViewState::Help => {
                println!("Keys:");
                println!("  up/down or j/k  move");
                println!("  enter           open / confirm");
                println!("  n               new item or project");
                println!("  e               edit selected item");
                println!("  d               delete selected item");
                println!("  c               convert draft to issue");
                println!("  esc             back / dismiss error");
                println!("  q, ctrl+c       quit");
            }
        }

        if let Some(overlay) = snapshot.overlay {
            let label = if overlay.is_warning() { "warning" } else { "error" };
            println!("[{label}] {}  (esc to dismiss)", overlay.outcome.user_message());
        }
    }
}

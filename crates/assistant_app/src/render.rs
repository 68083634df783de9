//! Plain-text rendering of the popup and the whitelist panel.

use std::fmt::Write as _;

use assistant_core::{AppViewModel, GroupPosition, MenuColumn, WhitelistCandidate};

fn group_marker(group: GroupPosition) -> &'static str {
    match group {
        GroupPosition::Single => "-",
        GroupPosition::Start => "┌",
        GroupPosition::Middle => "│",
        GroupPosition::End => "└",
    }
}

fn render_column(out: &mut String, title: &str, column: &MenuColumn) {
    let _ = writeln!(out, "{title}:");
    if column.visible_items().next().is_none() {
        let _ = writeln!(out, "  (empty)");
        return;
    }
    for (index, item) in column.items.iter().enumerate() {
        if item.hidden {
            continue;
        }
        let _ = writeln!(
            out,
            "  [{index}] {} {} ({}, {})",
            group_marker(item.group),
            item.entry.label,
            item.entry.set_name,
            item.entry.scope.as_str()
        );
    }
}

fn render_candidates(out: &mut String, title: &str, candidates: &[WhitelistCandidate]) {
    let _ = writeln!(out, "{title}:");
    if candidates.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for candidate in candidates {
        let _ = writeln!(
            out,
            "  {} {} [{}]",
            candidate.identity,
            candidate.display_name,
            candidate.scope.as_str()
        );
    }
}

/// Popup columns; indices are the ones `click` expects.
pub fn render_menu(view: &AppViewModel) -> String {
    let mut out = String::new();
    if !view.enabled {
        out.push_str("assistant disabled, popup shows everything\n");
    }
    render_column(&mut out, "Scripts", &view.menu.scripts);
    render_column(&mut out, "Quick replies", &view.menu.standard);
    out
}

pub fn render_panel(view: &AppViewModel) -> String {
    let mut out = String::new();
    render_candidates(&mut out, "Available", &view.panel.available);
    render_candidates(&mut out, "Whitelisted (kept in the bar)", &view.panel.whitelisted);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use assistant_core::{update, AppState, Entry, EntryBuckets, Msg, Scope};

    fn view() -> AppViewModel {
        let entries = EntryBuckets {
            scripts: vec![],
            standard: vec![
                Entry::native("Foo", "Hi", "hi", Scope::Global),
                Entry::native("Foo", "Bye", "bye", Scope::Global),
            ],
        };
        let (state, _) = update(AppState::new(), Msg::EntriesFetched(entries));
        state.view()
    }

    #[test]
    fn menu_lists_indices_and_group_markers() {
        let text = render_menu(&view());
        assert!(text.contains("Scripts:\n  (empty)"));
        assert!(text.contains("[0] ┌ Hi (Foo, global)"));
        assert!(text.contains("[1] └ Bye (Foo, global)"));
    }

    #[test]
    fn panel_lists_identities() {
        let text = render_panel(&view());
        assert!(text.contains("QRV2::Foo Foo [global]"));
        assert!(text.contains("Whitelisted (kept in the bar):\n  (none)"));
    }
}

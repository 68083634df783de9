use assistant_core::{
    build_menu, filter_menu_items, whitelist_panel, Entry, EntryBuckets, GroupPosition, Scope,
    Settings, SourceIdentity, SourceKind,
};
use pretty_assertions::assert_eq;

fn buckets() -> EntryBuckets {
    EntryBuckets {
        scripts: vec![
            Entry::script("abc", "Tools", "Summarize", None, Scope::Global),
            Entry::task("Greet", "Alice", Scope::Character, true),
            Entry::task("Wave", "Alice", Scope::Character, true),
            Entry::task("Daily", "Daily", Scope::Preset, false),
            Entry::raw_element("helper", "Helper"),
        ],
        standard: vec![
            Entry::native("Foo", "Hi", "hi", Scope::Global),
            Entry::native("Foo", "Bye", "bye", Scope::Global),
            Entry::native("Foo", "Later", "later", Scope::Global),
            Entry::native("Bar", "Solo", "solo", Scope::Global),
        ],
    }
}

#[test]
fn consecutive_items_of_a_set_get_group_markers() {
    let view = build_menu(&buckets(), &Settings::default());
    let groups: Vec<_> = view.standard.items.iter().map(|i| i.group).collect();
    assert_eq!(
        groups,
        vec![
            GroupPosition::Start,
            GroupPosition::Middle,
            GroupPosition::End,
            GroupPosition::Single,
        ]
    );
}

#[test]
fn whitelisted_items_are_hidden_only_while_enabled() {
    let mut settings = Settings::default();
    settings.toggle_whitelist(SourceIdentity::native_set("Foo"));
    settings.toggle_whitelist(SourceIdentity::character_tasks());

    let mut view = build_menu(&buckets(), &settings);
    let visible: Vec<_> = view
        .standard
        .visible_items()
        .map(|i| i.entry.label.as_str())
        .collect();
    assert_eq!(visible, vec!["Solo"]);
    assert_eq!(view.scripts.visible_items().count(), 3);

    filter_menu_items(&mut view, &settings.whitelist, false);
    assert_eq!(view.standard.visible_items().count(), 4);
    assert_eq!(view.scripts.visible_items().count(), 5);
}

#[test]
fn empty_buckets_are_a_valid_empty_menu() {
    let view = build_menu(&EntryBuckets::default(), &Settings::default());
    assert!(view.scripts.is_empty());
    assert!(view.standard.is_empty());
}

#[test]
fn panel_lists_each_identity_once_and_partitions_by_whitelist() {
    let whitelist = vec![SourceIdentity::script("abc")];
    let panel = whitelist_panel(&buckets(), &whitelist);

    assert_eq!(panel.whitelisted.len(), 1);
    assert_eq!(panel.whitelisted[0].display_name, "Tools");
    assert_eq!(panel.whitelisted[0].kind, SourceKind::ScriptRunner);

    let names: Vec<_> = panel
        .available
        .iter()
        .map(|c| (c.identity.as_str(), c.display_name.as_str(), c.scope))
        .collect();
    assert_eq!(
        names,
        vec![
            ("LWB::Character_Set", "XB-Alice", Scope::Character),
            ("LWB::preset::Daily", "XB-Daily", Scope::Preset),
            ("QRV2::Foo", "Foo", Scope::Global),
            ("QRV2::Bar", "Bar", Scope::Global),
        ]
    );
}

use crate::{resolve_identity, Entry, EntryBuckets, Settings, SourceIdentity};

/// Position of an item within a run of consecutive items from the same set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupPosition {
    Single,
    Start,
    Middle,
    End,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub entry: Entry,
    pub identity: Option<SourceIdentity>,
    pub group: GroupPosition,
    /// Whitelisted items stay in the native bar and are hidden here.
    pub hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MenuColumn {
    pub items: Vec<MenuItem>,
}

impl MenuColumn {
    fn from_entries(entries: &[Entry]) -> Self {
        let items = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| MenuItem {
                entry: entry.clone(),
                identity: resolve_identity(entry),
                group: group_position(entries, index),
                hidden: false,
            })
            .collect();
        Self { items }
    }

    pub fn visible_items(&self) -> impl Iterator<Item = &MenuItem> {
        self.items.iter().filter(|item| !item.hidden)
    }

    /// True when the column should show its "nothing here" placeholder.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MenuView {
    pub scripts: MenuColumn,
    pub standard: MenuColumn,
}

impl MenuView {
    pub fn items_mut(&mut self) -> impl Iterator<Item = &mut MenuItem> {
        self.scripts.items.iter_mut().chain(self.standard.items.iter_mut())
    }
}

fn group_position(entries: &[Entry], index: usize) -> GroupPosition {
    let current = &entries[index].set_name;
    let prev_same = index
        .checked_sub(1)
        .and_then(|i| entries.get(i))
        .is_some_and(|prev| prev.set_name == *current);
    let next_same = entries
        .get(index + 1)
        .is_some_and(|next| next.set_name == *current);
    match (prev_same, next_same) {
        (false, true) => GroupPosition::Start,
        (true, true) => GroupPosition::Middle,
        (true, false) => GroupPosition::End,
        (false, false) => GroupPosition::Single,
    }
}

/// Builds the popup model and applies the whitelist filter to it.
pub fn build_menu(buckets: &EntryBuckets, settings: &Settings) -> MenuView {
    let mut view = MenuView {
        scripts: MenuColumn::from_entries(&buckets.scripts),
        standard: MenuColumn::from_entries(&buckets.standard),
    };
    filter_menu_items(&mut view, &settings.whitelist, settings.enabled);
    view
}

/// Hides items whose container is whitelisted. Re-run whenever the popup is
/// re-rendered; independent of the DOM reconciliation pass.
pub fn filter_menu_items(view: &mut MenuView, whitelist: &[SourceIdentity], enabled: bool) {
    for item in view.items_mut() {
        item.hidden = enabled
            && item
                .identity
                .as_ref()
                .is_some_and(|identity| whitelist.contains(identity));
    }
}

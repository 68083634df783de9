use crate::{MenuView, WhitelistPanel};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub enabled: bool,
    pub menu_open: bool,
    pub menu: MenuView,
    pub panel: WhitelistPanel,
    pub first_time_setup_pending: bool,
    pub show_whitelist_help: bool,
    pub heal_pending: bool,
    pub dirty: bool,
}

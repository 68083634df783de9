use serde::{Deserialize, Serialize};

use crate::SourceIdentity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IconType {
    #[default]
    Rocket,
    Comment,
    Star,
    Bolt,
    Fan,
    Pencil,
    Book,
    Mug,
    Crown,
    Gem,
    Headphones,
    FontAwesome,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UiTheme {
    #[default]
    #[serde(rename = "light")]
    Light,
    #[serde(rename = "system")]
    System,
    #[serde(rename = "theme-paper")]
    Paper,
    #[serde(rename = "theme-aurora")]
    Aurora,
    #[serde(rename = "theme-smoked")]
    Smoked,
    #[serde(rename = "theme-ceramic")]
    Ceramic,
    #[serde(rename = "theme-lavender")]
    Lavender,
    #[serde(rename = "theme-forest")]
    Forest,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomIcon {
    pub name: String,
    pub url: String,
}

/// Persisted plugin settings. Missing keys fall back to [`Settings::default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub enabled: bool,
    pub whitelist: Vec<SourceIdentity>,
    pub icon_type: IconType,
    pub custom_icon_url: String,
    pub saved_custom_icons: Vec<CustomIcon>,
    pub ui_theme: UiTheme,
    pub auto_shrink_enabled: bool,
    pub enable_backdrop: bool,
    pub first_time_setup_pending: bool,
    pub hide_whitelist_help: bool,
    /// When false, every label is surfaced even if an earlier source used it.
    pub label_dedup: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: true,
            whitelist: Vec::new(),
            icon_type: IconType::Rocket,
            custom_icon_url: String::new(),
            saved_custom_icons: Vec::new(),
            ui_theme: UiTheme::Light,
            auto_shrink_enabled: false,
            enable_backdrop: false,
            first_time_setup_pending: true,
            hide_whitelist_help: false,
            label_dedup: true,
        }
    }
}

impl Settings {
    pub fn is_whitelisted(&self, identity: &SourceIdentity) -> bool {
        self.whitelist.contains(identity)
    }

    /// Adds or removes `identity`; returns whether it is whitelisted afterwards.
    pub fn toggle_whitelist(&mut self, identity: SourceIdentity) -> bool {
        if let Some(pos) = self.whitelist.iter().position(|w| *w == identity) {
            self.whitelist.remove(pos);
            false
        } else {
            self.whitelist.push(identity);
            true
        }
    }

    pub fn save_custom_icon(&mut self, icon: CustomIcon) {
        self.custom_icon_url = icon.url.clone();
        self.icon_type = IconType::Custom;
        self.saved_custom_icons.push(icon);
    }

    /// Removes a saved icon. If it was the active one, the first remaining icon
    /// takes over, or the default icon when none are left.
    pub fn remove_custom_icon(&mut self, index: usize) -> Option<CustomIcon> {
        if index >= self.saved_custom_icons.len() {
            return None;
        }
        let removed = self.saved_custom_icons.remove(index);
        if removed.url == self.custom_icon_url {
            match self.saved_custom_icons.first() {
                Some(next) => self.custom_icon_url = next.url.clone(),
                None => {
                    self.custom_icon_url.clear();
                    if self.icon_type == IconType::Custom {
                        self.icon_type = IconType::Rocket;
                    }
                }
            }
        }
        Some(removed)
    }
}

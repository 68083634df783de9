use std::time::Duration;

use assistant_core::DEFAULT_QUIET_PERIOD;

pub const DEFAULT_BAR_ID: &str = "qr--bar";
pub const DEFAULT_WATCH_ROOT_ID: &str = "send_form";
pub const DEFAULT_RAW_ELEMENT_ID: &str = "qr-assistant-raw-button";
pub const BUILTIN_ALLOWLIST: [&str; 2] = ["input_helper_toolbar", "custom_buttons_container"];

/// Which descendants keep an otherwise hidden container visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MixedContentPolicy {
    /// Whitelisted containers and protected host elements at any depth.
    #[default]
    DescendantScan,
    /// Only whitelisted or protected containers; protected leaf buttons are ignored.
    ContainersOnly,
}

/// Host layout and timing the engine works against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Element whose subtree is observed for child-list changes.
    pub watch_root_id: String,
    /// The action bar holding every quick-reply container.
    pub bar_id: String,
    /// Element ids that are never hidden.
    pub builtin_allowlist: Vec<String>,
    /// Raw host element surfaced in the popup and hidden from the bar.
    pub raw_element_id: Option<String>,
    pub quiet_period: Duration,
    pub mixed_content: MixedContentPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            watch_root_id: DEFAULT_WATCH_ROOT_ID.to_string(),
            bar_id: DEFAULT_BAR_ID.to_string(),
            builtin_allowlist: BUILTIN_ALLOWLIST.iter().map(|s| s.to_string()).collect(),
            raw_element_id: Some(DEFAULT_RAW_ELEMENT_ID.to_string()),
            quiet_period: DEFAULT_QUIET_PERIOD,
            mixed_content: MixedContentPolicy::default(),
        }
    }
}

impl EngineConfig {
    pub fn is_builtin_allowed(&self, id: &str) -> bool {
        self.builtin_allowlist.iter().any(|allowed| allowed == id)
    }
}

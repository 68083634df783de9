use assistant_core::{NativeItemRecord, NativeLevel, NativeSetRecord};
use assistant_logging::{qra_debug, qra_info, LogCategory};
use async_trait::async_trait;
use serde::Deserialize;

use crate::sources::ProviderError;
use crate::{NodeHandle, TriggerError};

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuickReply {
    pub label: String,
    pub message: String,
    pub is_hidden: bool,
}

/// Stands in for a set the provider left unnamed.
pub const UNKNOWN_SET_NAME: &str = "Unknown Set";

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuickReplySet {
    pub name: String,
    pub qr_list: Vec<QuickReply>,
    /// The container the provider rendered this set into, if any.
    #[serde(skip)]
    pub dom: Option<NodeHandle>,
}

impl QuickReplySet {
    /// Name used for both the popup entries and the container join.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            UNKNOWN_SET_NAME
        } else {
            &self.name
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SetLink {
    pub is_visible: bool,
    pub set: Option<QuickReplySet>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NativeConfig {
    pub set_list: Vec<SetLink>,
    pub is_combined: bool,
}

/// Live settings tree of the native quick-reply extension.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NativeReplySettings {
    pub is_enabled: Option<bool>,
    pub chat_config: Option<NativeConfig>,
    pub char_config: Option<NativeConfig>,
    pub config: Option<NativeConfig>,
}

impl NativeReplySettings {
    pub fn is_enabled(&self) -> bool {
        self.is_enabled != Some(false)
    }

    fn levels(&self) -> [(NativeLevel, Option<&NativeConfig>); 3] {
        [
            (NativeLevel::Chat, self.chat_config.as_ref()),
            (NativeLevel::Character, self.char_config.as_ref()),
            (NativeLevel::Global, self.config.as_ref()),
        ]
    }
}

#[async_trait]
pub trait NativeReplyProvider: Send + Sync {
    fn settings(&self) -> Result<NativeReplySettings, ProviderError>;

    async fn execute(&self, set_name: &str, label: &str) -> Result<(), TriggerError>;
}

/// Visible sets with their visible, non-empty items, per level.
pub fn read_native_sets(
    provider: &dyn NativeReplyProvider,
) -> Result<Vec<NativeSetRecord>, ProviderError> {
    let settings = provider.settings()?;
    if !settings.is_enabled() {
        qra_info!(LogCategory::Api; "native quick replies are disabled");
        return Ok(Vec::new());
    }

    let mut records = Vec::new();
    for (level, config) in settings.levels() {
        let Some(config) = config else {
            continue;
        };
        for link in &config.set_list {
            let Some(set) = link.set.as_ref().filter(|_| link.is_visible) else {
                continue;
            };
            let items = set
                .qr_list
                .iter()
                .filter(|qr| !qr.is_hidden)
                .filter_map(|qr| {
                    let label = qr.label.trim();
                    if label.is_empty() {
                        return None;
                    }
                    let message = if qr.message.is_empty() {
                        format!("(quick reply: {label})")
                    } else {
                        qr.message.clone()
                    };
                    Some(NativeItemRecord {
                        label: label.to_string(),
                        message,
                    })
                })
                .collect();
            let name = set.display_name().to_string();
            records.push(NativeSetRecord { level, name, items });
        }
    }
    qra_debug!(LogCategory::Api; "native adapter read {} sets", records.len());
    Ok(records)
}

/// `(set name, container)` back-references across every level, visible or not.
pub fn native_set_containers(settings: &NativeReplySettings) -> Vec<(String, NodeHandle)> {
    settings
        .levels()
        .into_iter()
        .filter_map(|(_, config)| config)
        .flat_map(|config| config.set_list.iter())
        .filter_map(|link| link.set.as_ref())
        .filter_map(|set| set.dom.map(|node| (set.display_name().to_string(), node)))
        .collect()
}

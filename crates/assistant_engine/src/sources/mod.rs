//! Provider capability contracts and the adapters that read them.
//!
//! Every provider is optional. Adapters report problems as [`ProviderError`];
//! [`crate::fetch_entries`] turns those into warnings and an empty list for
//! that source only.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::TriggerError;

mod native;
mod raw_element;
mod script_runner;
mod snapshot;
mod task_plugin;

pub use native::{
    native_set_containers, read_native_sets, NativeConfig, NativeReplyProvider,
    NativeReplySettings, QuickReply, QuickReplySet, SetLink, UNKNOWN_SET_NAME,
};
pub use raw_element::read_raw_element;
pub use script_runner::{
    read_script_buttons, ApiButton, Script, ScriptButton, ScriptFolder, ScriptNode,
    ScriptRunnerProvider, ScriptRunnerSettings, ScriptSection,
};
pub use snapshot::{HostSnapshot, StaticHost};
pub use task_plugin::{read_tasks, Task, TaskList, TaskPluginProvider, TaskSnapshot};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("{0} is not available")]
    Missing(&'static str),
    #[error("{provider} returned malformed data: {message}")]
    Malformed {
        provider: &'static str,
        message: String,
    },
}

impl ProviderError {
    pub(crate) fn malformed(provider: &'static str, err: impl ToString) -> Self {
        ProviderError::Malformed {
            provider,
            message: err.to_string(),
        }
    }
}

/// The character currently open in the host, as far as adapters care.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CharacterInfo {
    pub name: String,
    pub avatar: String,
    /// Script-runner scripts stored on the character card; shape not guaranteed.
    pub script_runner_scripts: Option<serde_json::Value>,
}

/// Host-level services: current character, event bus, element clicks.
#[async_trait]
pub trait HostContext: Send + Sync {
    fn current_character(&self) -> Option<CharacterInfo>;

    async fn emit(&self, event: &str) -> Result<(), TriggerError>;

    async fn click_element(&self, dom_id: &str) -> Result<(), TriggerError>;
}

/// Injected collaborators. Any of them may be absent.
#[derive(Clone, Default)]
pub struct Providers {
    pub native: Option<Arc<dyn NativeReplyProvider>>,
    pub script_runner: Option<Arc<dyn ScriptRunnerProvider>>,
    pub tasks: Option<Arc<dyn TaskPluginProvider>>,
    pub host: Option<Arc<dyn HostContext>>,
}

impl Providers {
    pub fn current_character(&self) -> Option<CharacterInfo> {
        self.host.as_ref()?.current_character()
    }
}

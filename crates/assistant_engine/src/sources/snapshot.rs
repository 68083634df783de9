//! A host that answers from a recorded JSON snapshot.
//!
//! Used by the simulator binary and by tests. Trigger calls are recorded as
//! `kind:target` strings instead of being executed.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use serde::Deserialize;

use crate::sources::{
    ApiButton, CharacterInfo, HostContext, NativeReplyProvider, NativeReplySettings,
    ProviderError, Providers, ScriptRunnerProvider, ScriptRunnerSettings, TaskPluginProvider,
};
use crate::{Dom, TriggerError};

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HostSnapshot {
    pub native: Option<NativeReplySettings>,
    /// Native set name to the element id of the container it renders into.
    pub native_containers: BTreeMap<String, String>,
    pub script_runner: Option<ScriptRunnerSettings>,
    pub script_buttons: Option<Vec<ApiButton>>,
    pub tasks: Option<serde_json::Value>,
    pub character: Option<CharacterInfo>,
    /// Recorded calls that should report failure.
    pub failing: Vec<String>,
}

impl HostSnapshot {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

#[derive(Debug, Default)]
pub struct StaticHost {
    snapshot: HostSnapshot,
    calls: Mutex<Vec<String>>,
}

impl StaticHost {
    pub fn new(snapshot: HostSnapshot) -> Self {
        Self {
            snapshot,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Points native sets at their rendered containers in `dom`.
    pub fn bind_dom(&mut self, dom: &Dom) {
        let containers = &self.snapshot.native_containers;
        let Some(native) = self.snapshot.native.as_mut() else {
            return;
        };
        for config in [
            native.chat_config.as_mut(),
            native.char_config.as_mut(),
            native.config.as_mut(),
        ]
        .into_iter()
        .flatten()
        {
            for set in config.set_list.iter_mut().filter_map(|l| l.set.as_mut()) {
                set.dom = containers
                    .get(&set.name)
                    .and_then(|id| dom.get_element_by_id(id));
            }
        }
    }

    /// Providers backed by this host; sources absent from the snapshot stay absent.
    pub fn providers(self: &Arc<Self>) -> Providers {
        let snapshot = &self.snapshot;
        Providers {
            native: snapshot
                .native
                .is_some()
                .then(|| Arc::clone(self) as Arc<dyn NativeReplyProvider>),
            script_runner: snapshot
                .script_runner
                .is_some()
                .then(|| Arc::clone(self) as Arc<dyn ScriptRunnerProvider>),
            tasks: snapshot
                .tasks
                .is_some()
                .then(|| Arc::clone(self) as Arc<dyn TaskPluginProvider>),
            host: Some(Arc::clone(self) as Arc<dyn HostContext>),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, call: String) -> Result<(), TriggerError> {
        let failing = self.snapshot.failing.contains(&call);
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call.clone());
        if failing {
            return Err(TriggerError::Failed(call));
        }
        Ok(())
    }
}

#[async_trait]
impl NativeReplyProvider for StaticHost {
    fn settings(&self) -> Result<NativeReplySettings, ProviderError> {
        self.snapshot
            .native
            .clone()
            .ok_or(ProviderError::Missing("native quick replies"))
    }

    async fn execute(&self, set_name: &str, label: &str) -> Result<(), TriggerError> {
        self.record(format!("native:{set_name}:{label}"))
    }
}

#[async_trait]
impl ScriptRunnerProvider for StaticHost {
    fn settings(&self) -> Result<ScriptRunnerSettings, ProviderError> {
        self.snapshot
            .script_runner
            .clone()
            .ok_or(ProviderError::Missing("script runner"))
    }

    fn enabled_buttons(&self) -> Option<Vec<ApiButton>> {
        self.snapshot.script_buttons.clone()
    }

    async fn click_button(&self, script_id: &str, button_id: &str) -> Result<(), TriggerError> {
        self.record(format!("button:{script_id}:{button_id}"))
    }
}

#[async_trait]
impl TaskPluginProvider for StaticHost {
    fn dump_tasks(&self) -> Result<serde_json::Value, ProviderError> {
        self.snapshot
            .tasks
            .clone()
            .ok_or(ProviderError::Missing("task plugin"))
    }

    async fn execute_task(&self, name: &str) -> Result<(), TriggerError> {
        self.record(format!("task:{name}"))
    }
}

#[async_trait]
impl HostContext for StaticHost {
    fn current_character(&self) -> Option<CharacterInfo> {
        self.snapshot.character.clone()
    }

    async fn emit(&self, event: &str) -> Result<(), TriggerError> {
        self.record(format!("event:{event}"))
    }

    async fn click_element(&self, dom_id: &str) -> Result<(), TriggerError> {
        self.record(format!("click:{dom_id}"))
    }
}

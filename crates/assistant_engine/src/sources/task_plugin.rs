use std::collections::BTreeMap;

use assistant_core::{Scope, TaskRecord};
use assistant_logging::{qra_debug, qra_warn, LogCategory};
use async_trait::async_trait;
use serde::Deserialize;

use crate::sources::{CharacterInfo, ProviderError};
use crate::TriggerError;

const PROVIDER: &str = "task plugin";

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Task {
    pub name: String,
    pub disabled: bool,
    pub button_activated: bool,
    pub commands: String,
}

impl Task {
    fn shows_button(&self) -> bool {
        self.button_activated && !self.disabled
    }
}

/// Task collections have shipped both as arrays and as name-keyed maps.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TaskList {
    List(Vec<Task>),
    Map(BTreeMap<String, Task>),
}

impl Default for TaskList {
    fn default() -> Self {
        TaskList::List(Vec::new())
    }
}

impl TaskList {
    /// Tasks in collection order; map entries take their key when unnamed.
    pub fn into_tasks(self) -> Vec<Task> {
        match self {
            TaskList::List(tasks) => tasks,
            TaskList::Map(map) => map
                .into_iter()
                .map(|(key, mut task)| {
                    if task.name.trim().is_empty() {
                        task.name = key;
                    }
                    task
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskSnapshot {
    pub global_tasks: Option<TaskList>,
    pub character_tasks: Option<TaskList>,
    pub preset_tasks: Option<TaskList>,
}

#[async_trait]
pub trait TaskPluginProvider: Send + Sync {
    /// Collections read through live getters, when the plugin exposes them.
    fn live_tasks(&self) -> Option<TaskSnapshot> {
        None
    }

    /// Synchronous dump of every collection.
    fn dump_tasks(&self) -> Result<serde_json::Value, ProviderError>;

    async fn execute_task(&self, name: &str) -> Result<(), TriggerError>;
}

fn snapshot(provider: &dyn TaskPluginProvider) -> Result<TaskSnapshot, ProviderError> {
    if let Some(live) = provider.live_tasks() {
        return Ok(live);
    }
    let dump = provider.dump_tasks()?;
    serde_json::from_value(dump).map_err(|err| ProviderError::malformed(PROVIDER, err))
}

/// Button-activated, non-disabled tasks. Character tasks carry the current
/// character's name so they group under it.
pub fn read_tasks(
    provider: &dyn TaskPluginProvider,
    character: Option<&CharacterInfo>,
) -> Result<Vec<TaskRecord>, ProviderError> {
    let snapshot = snapshot(provider)?;
    let character_name = character
        .map(|c| c.name.trim())
        .filter(|name| !name.is_empty())
        .unwrap_or("Character")
        .to_string();

    let collections = [
        (snapshot.global_tasks, Scope::Global),
        (snapshot.character_tasks, Scope::Character),
        (snapshot.preset_tasks, Scope::Preset),
    ];
    let mut records = Vec::new();
    for (list, scope) in collections {
        let Some(list) = list else {
            continue;
        };
        for task in list.into_tasks() {
            if !task.shows_button() {
                continue;
            }
            if task.name.trim().is_empty() {
                qra_warn!(LogCategory::Api; "{PROVIDER}: skipping unnamed {} task", scope.as_str());
                continue;
            }
            records.push(TaskRecord {
                name: task.name,
                scope,
                character_name: (scope == Scope::Character).then(|| character_name.clone()),
            });
        }
    }
    qra_debug!(LogCategory::Api; "{PROVIDER} adapter read {} tasks", records.len());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_shaped_list_names_tasks_by_key() {
        let list: TaskList = serde_json::from_str(
            r#"{ "wave": { "buttonActivated": true }, "nod": { "name": "Nod" } }"#,
        )
        .unwrap();
        let names: Vec<_> = list.into_tasks().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["Nod", "wave"]);
    }

    #[test]
    fn disabled_tasks_show_no_button() {
        let task = Task {
            name: "x".into(),
            disabled: true,
            button_activated: true,
            commands: String::new(),
        };
        assert!(!task.shows_button());
    }
}

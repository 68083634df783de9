use std::collections::HashMap;

use assistant_core::{Scope, ScriptButtonRecord};
use assistant_logging::{qra_debug, qra_info, qra_warn, LogCategory};
use async_trait::async_trait;
use serde::Deserialize;

use crate::sources::{CharacterInfo, ProviderError};
use crate::TriggerError;

const PROVIDER: &str = "script runner";

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct ScriptButton {
    pub name: String,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Script {
    pub id: String,
    pub name: String,
    pub enabled: bool,
    pub buttons: Vec<ScriptButton>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScriptFolder {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub enabled: Option<bool>,
    pub scripts: Vec<ScriptNode>,
}

/// Script repositories nest scripts inside folders of arbitrary depth.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ScriptNode {
    Folder(ScriptFolder),
    Script(Script),
}

/// The `script` section of the runner's settings. Collections are kept raw so
/// a malformed one only loses itself.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct ScriptSection {
    pub global_script_enabled: Option<bool>,
    #[serde(rename = "scriptsRepository")]
    pub scripts_repository: Option<serde_json::Value>,
    pub preset_script_enabled: Option<bool>,
    #[serde(rename = "presetScripts")]
    pub preset_scripts: Option<serde_json::Value>,
    pub characters_with_scripts_enabled: Option<bool>,
    pub characters_with_scripts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct ScriptRunnerSettings {
    pub enabled_extension: Option<bool>,
    pub script: ScriptSection,
}

impl ScriptRunnerSettings {
    pub fn is_enabled(&self) -> bool {
        self.enabled_extension != Some(false)
    }
}

/// A button as reported by the runner's own query API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiButton {
    pub script_id: String,
    pub button_id: String,
    pub button_name: String,
}

#[async_trait]
pub trait ScriptRunnerProvider: Send + Sync {
    fn settings(&self) -> Result<ScriptRunnerSettings, ProviderError>;

    /// Enabled buttons from the runner's query API; `None` when the API is absent.
    fn enabled_buttons(&self) -> Option<Vec<ApiButton>> {
        None
    }

    async fn click_button(&self, script_id: &str, button_id: &str) -> Result<(), TriggerError>;
}

fn parse_collection(raw: Option<&serde_json::Value>, collection: &str) -> Vec<ScriptNode> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    match serde_json::from_value::<Vec<ScriptNode>>(raw.clone()) {
        Ok(nodes) => nodes,
        Err(err) => {
            qra_warn!(LogCategory::Api; "{collection} scripts are malformed, skipping: {err}");
            Vec::new()
        }
    }
}

fn flatten(nodes: Vec<ScriptNode>, scope: Scope, out: &mut Vec<(Script, Scope)>) {
    for node in nodes {
        match node {
            ScriptNode::Script(script) => out.push((script, scope)),
            ScriptNode::Folder(folder) => {
                if folder.enabled == Some(false) {
                    qra_debug!(LogCategory::Api; "skipping disabled script folder {}", folder.name);
                    continue;
                }
                flatten(folder.scripts, scope, out);
            }
        }
    }
}

fn collect_scripts(
    settings: &ScriptRunnerSettings,
    character: Option<&CharacterInfo>,
) -> Vec<(Script, Scope)> {
    let section = &settings.script;
    let mut scripts = Vec::new();

    if section.global_script_enabled != Some(false) {
        let nodes = parse_collection(section.scripts_repository.as_ref(), "global");
        flatten(nodes, Scope::Global, &mut scripts);
    }
    if section.preset_script_enabled != Some(false) {
        let nodes = parse_collection(section.preset_scripts.as_ref(), "preset");
        flatten(nodes, Scope::Global, &mut scripts);
    }
    if section.characters_with_scripts_enabled != Some(false) {
        if let Some(character) = character {
            if section.characters_with_scripts.contains(&character.avatar) {
                let nodes =
                    parse_collection(character.script_runner_scripts.as_ref(), "character");
                flatten(nodes, Scope::Character, &mut scripts);
            }
        }
    }
    scripts
}

/// Buttons of enabled scripts. Prefers the runner's query API and falls back
/// to walking the settings trees.
pub fn read_script_buttons(
    provider: &dyn ScriptRunnerProvider,
    character: Option<&CharacterInfo>,
) -> Result<Vec<ScriptButtonRecord>, ProviderError> {
    let settings = provider.settings()?;
    if !settings.is_enabled() {
        qra_info!(LogCategory::Api; "{PROVIDER} is disabled");
        return Ok(Vec::new());
    }
    let scripts = collect_scripts(&settings, character);

    let records = match provider.enabled_buttons() {
        Some(buttons) => {
            let names: HashMap<&str, (&str, Scope)> = scripts
                .iter()
                .map(|(script, scope)| (script.id.as_str(), (script.name.as_str(), *scope)))
                .collect();
            buttons
                .into_iter()
                .map(|button| {
                    let (name, scope) = names
                        .get(button.script_id.as_str())
                        .copied()
                        .unwrap_or(("Script", Scope::Global));
                    ScriptButtonRecord {
                        script_name: name.to_string(),
                        label: button.button_name,
                        button_id: Some(button.button_id),
                        script_id: button.script_id,
                        scope,
                    }
                })
                .collect()
        }
        None => scripts
            .iter()
            .filter(|(script, _)| script.enabled && !script.id.is_empty())
            .flat_map(|(script, scope)| {
                script
                    .buttons
                    .iter()
                    .filter(|b| b.visible)
                    .map(move |b| ScriptButtonRecord {
                        script_id: script.id.clone(),
                        script_name: script.name.clone(),
                        label: b.name.clone(),
                        button_id: None,
                        scope: *scope,
                    })
            })
            .collect::<Vec<_>>(),
    };
    qra_debug!(LogCategory::Api; "{PROVIDER} adapter read {} buttons", records.len());
    Ok(records)
}

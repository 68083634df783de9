//! Canonical `{tag}::{discriminator}` keys joining entries, DOM containers and
//! the persisted whitelist.
//!
//! Both the entry side ([`resolve_identity`]) and the DOM side
//! ([`SourceIdentity::from_script_container_id`], [`SourceIdentity::native_set`])
//! go through the constructors here, so one physical container always maps to
//! the same string.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Entry, EntrySource, Scope};

/// Element id prefix the script runner gives each of its button containers.
pub const SCRIPT_CONTAINER_PREFIX: &str = "script_container_";

/// Discriminator shared by all character-scoped tasks.
pub const CHARACTER_TASK_SET: &str = "Character_Set";

const SEPARATOR: &str = "::";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceTag {
    NativeReply,
    ScriptRunner,
    TaskPlugin,
}

impl SourceTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceTag::NativeReply => "QRV2",
            SourceTag::ScriptRunner => "JSR",
            SourceTag::TaskPlugin => "LWB",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "QRV2" => Some(SourceTag::NativeReply),
            "JSR" => Some(SourceTag::ScriptRunner),
            "LWB" => Some(SourceTag::TaskPlugin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceIdentity(String);

impl SourceIdentity {
    /// Wraps an already-formatted key, e.g. one read back from settings.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn native_set(set_name: &str) -> Self {
        Self::tagged(SourceTag::NativeReply, set_name)
    }

    pub fn script(script_id: &str) -> Self {
        Self::tagged(SourceTag::ScriptRunner, script_id)
    }

    pub fn task(scope: Scope, task_name: &str) -> Self {
        Self(format!(
            "{}{SEPARATOR}{}{SEPARATOR}{task_name}",
            SourceTag::TaskPlugin.as_str(),
            scope.as_str()
        ))
    }

    pub fn character_tasks() -> Self {
        Self::tagged(SourceTag::TaskPlugin, CHARACTER_TASK_SET)
    }

    /// DOM side of the script-runner join: `script_container_abc` -> `JSR::abc`.
    pub fn from_script_container_id(element_id: &str) -> Option<Self> {
        element_id
            .strip_prefix(SCRIPT_CONTAINER_PREFIX)
            .filter(|script_id| !script_id.is_empty())
            .map(Self::script)
    }

    fn tagged(tag: SourceTag, discriminator: &str) -> Self {
        Self(format!("{}{SEPARATOR}{discriminator}", tag.as_str()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn tag(&self) -> Option<SourceTag> {
        let (tag, _) = self.0.split_once(SEPARATOR)?;
        SourceTag::parse(tag)
    }

    /// Everything after the tag.
    pub fn discriminator(&self) -> Option<&str> {
        self.0.split_once(SEPARATOR).map(|(_, rest)| rest)
    }

    pub fn script_id(&self) -> Option<&str> {
        match self.tag()? {
            SourceTag::ScriptRunner => self.discriminator(),
            _ => None,
        }
    }

    pub fn script_container_id(&self) -> Option<String> {
        self.script_id()
            .map(|script_id| format!("{SCRIPT_CONTAINER_PREFIX}{script_id}"))
    }

    /// Scope encoded in task identities; character set ids imply character scope.
    pub fn task_scope(&self) -> Option<Scope> {
        if self.tag()? != SourceTag::TaskPlugin {
            return None;
        }
        let rest = self.discriminator()?;
        if rest == CHARACTER_TASK_SET {
            return Some(Scope::Character);
        }
        let (scope, _) = rest.split_once(SEPARATOR)?;
        Scope::parse(scope)
    }
}

impl fmt::Display for SourceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SourceIdentity {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// Identity of the container an entry is rendered in, if it has one.
pub fn resolve_identity(entry: &Entry) -> Option<SourceIdentity> {
    match &entry.source {
        EntrySource::NativeReply { .. } => Some(SourceIdentity::native_set(&entry.set_name)),
        EntrySource::ScriptRunner { script_id, .. } => Some(SourceIdentity::script(script_id)),
        EntrySource::TaskPlugin {
            task_name,
            task_scope,
            character_set,
        } => {
            if *character_set {
                Some(SourceIdentity::character_tasks())
            } else {
                Some(SourceIdentity::task(*task_scope, task_name))
            }
        }
        EntrySource::RawElement { .. } => None,
    }
}

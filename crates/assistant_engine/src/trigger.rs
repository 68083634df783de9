//! Firing the action behind a popup entry.
//!
//! Failures are logged and reported as [`TriggerOutcome::Failed`]; nothing
//! propagates to the caller.

use assistant_core::{Entry, TriggerRequest};
use assistant_logging::{qra_error, qra_info, LogCategory};
use thiserror::Error;

use crate::{Dom, Providers};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TriggerError {
    #[error("{0} is not available")]
    ProviderMissing(&'static str),
    #[error("{0} is disabled")]
    Disabled(&'static str),
    #[error("element #{0} is not on the page")]
    ElementMissing(String),
    #[error("{0}")]
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    Completed,
    Failed,
}

fn settle(what: &str, result: Result<(), TriggerError>) -> TriggerOutcome {
    match result {
        Ok(()) => {
            qra_info!(LogCategory::Core; "triggered {what}");
            TriggerOutcome::Completed
        }
        Err(err) => {
            qra_error!(LogCategory::Core; "failed to trigger {what}: {err}");
            TriggerOutcome::Failed
        }
    }
}

pub async fn trigger_native(providers: &Providers, set_name: &str, label: &str) -> TriggerOutcome {
    let result = async {
        let provider = providers
            .native
            .as_ref()
            .ok_or(TriggerError::ProviderMissing("native quick replies"))?;
        if provider.settings().is_ok_and(|s| !s.is_enabled()) {
            return Err(TriggerError::Disabled("native quick replies"));
        }
        provider.execute(set_name, label).await
    }
    .await;
    settle(&format!("native reply {set_name}/{label}"), result)
}

/// Clicks the button by id when one is known, otherwise emits the
/// `{script_id}_{label}` event the runner listens for.
pub async fn trigger_script_runner(
    providers: &Providers,
    script_id: &str,
    label: &str,
    button_id: Option<&str>,
) -> TriggerOutcome {
    let result = async {
        let provider = providers
            .script_runner
            .as_ref()
            .ok_or(TriggerError::ProviderMissing("script runner"))?;
        if provider.settings().is_ok_and(|s| !s.is_enabled()) {
            return Err(TriggerError::Disabled("script runner"));
        }
        match button_id {
            Some(button_id) => provider.click_button(script_id, button_id).await,
            None => {
                let host = providers
                    .host
                    .as_ref()
                    .ok_or(TriggerError::ProviderMissing("host event bus"))?;
                host.emit(&format!("{script_id}_{label}")).await
            }
        }
    }
    .await;
    settle(&format!("script button {script_id}/{label}"), result)
}

pub async fn trigger_task_plugin(providers: &Providers, task_name: &str) -> TriggerOutcome {
    let result = async {
        let provider = providers
            .tasks
            .as_ref()
            .ok_or(TriggerError::ProviderMissing("task plugin"))?;
        provider.execute_task(task_name).await
    }
    .await;
    settle(&format!("task {task_name}"), result)
}

pub async fn trigger_raw_element(providers: &Providers, dom: &Dom, dom_id: &str) -> TriggerOutcome {
    let result = async {
        if dom.get_element_by_id(dom_id).is_none() {
            return Err(TriggerError::ElementMissing(dom_id.to_string()));
        }
        let host = providers
            .host
            .as_ref()
            .ok_or(TriggerError::ProviderMissing("host"))?;
        host.click_element(dom_id).await
    }
    .await;
    settle(&format!("element #{dom_id}"), result)
}

pub async fn fire(providers: &Providers, dom: &Dom, request: &TriggerRequest) -> TriggerOutcome {
    match request {
        TriggerRequest::Native { set_name, label } => {
            trigger_native(providers, set_name, label).await
        }
        TriggerRequest::ScriptRunner {
            script_id,
            label,
            button_id,
        } => trigger_script_runner(providers, script_id, label, button_id.as_deref()).await,
        TriggerRequest::TaskPlugin { task_name } => trigger_task_plugin(providers, task_name).await,
        TriggerRequest::RawElement { dom_id } => trigger_raw_element(providers, dom, dom_id).await,
    }
}

/// Fires whatever action backs a popup entry.
pub async fn trigger_entry(providers: &Providers, dom: &Dom, entry: &Entry) -> TriggerOutcome {
    fire(providers, dom, &TriggerRequest::for_entry(entry)).await
}

use std::sync::{Arc, Once};

use assistant_core::{Entry, Scope, TriggerRequest};
use assistant_engine::sources::{HostSnapshot, StaticHost};
use assistant_engine::{
    fire, trigger_entry, trigger_native, trigger_raw_element, trigger_script_runner,
    trigger_task_plugin, Dom, Providers, TriggerOutcome,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(assistant_logging::initialize_for_tests);
}

fn host(failing: &[&str]) -> Arc<StaticHost> {
    let mut snapshot: HostSnapshot = serde_json::from_value(json!({
        "native": { "config": { "setList": [] } },
        "scriptRunner": {},
        "tasks": { "globalTasks": [] }
    }))
    .unwrap();
    snapshot.failing = failing.iter().map(|s| s.to_string()).collect();
    Arc::new(StaticHost::new(snapshot))
}

#[tokio::test]
async fn native_entry_executes_by_set_and_label() {
    init_logging();
    let host = host(&[]);
    let outcome = trigger_native(&host.providers(), "Foo", "Hi").await;
    assert_eq!(outcome, TriggerOutcome::Completed);
    assert_eq!(host.calls(), vec!["native:Foo:Hi"]);
}

#[tokio::test]
async fn script_entry_prefers_its_button_id() {
    init_logging();
    let host = host(&[]);
    let providers = host.providers();

    trigger_script_runner(&providers, "abc", "Summarize", Some("btn-1")).await;
    trigger_script_runner(&providers, "abc", "Summarize", None).await;

    assert_eq!(
        host.calls(),
        vec!["button:abc:btn-1", "event:abc_Summarize"]
    );
}

#[tokio::test]
async fn disabled_script_runner_is_not_invoked() {
    init_logging();
    let snapshot: HostSnapshot =
        serde_json::from_value(json!({ "scriptRunner": { "enabled_extension": false } })).unwrap();
    let host = Arc::new(StaticHost::new(snapshot));

    let outcome = trigger_script_runner(&host.providers(), "abc", "Go", Some("b")).await;

    assert_eq!(outcome, TriggerOutcome::Failed);
    assert!(host.calls().is_empty());
}

#[tokio::test]
async fn task_entry_runs_the_named_task() {
    init_logging();
    let host = host(&[]);
    let outcome = trigger_task_plugin(&host.providers(), "Daily").await;
    assert_eq!(outcome, TriggerOutcome::Completed);
    assert_eq!(host.calls(), vec!["task:Daily"]);
}

#[tokio::test]
async fn raw_element_is_clicked_only_when_present() {
    init_logging();
    let host = host(&[]);
    let providers = host.providers();
    let dom = Dom::parse_html(r#"<button id="helper">Help</button>"#);

    assert_eq!(
        trigger_raw_element(&providers, &dom, "helper").await,
        TriggerOutcome::Completed
    );
    assert_eq!(
        trigger_raw_element(&providers, &dom, "gone").await,
        TriggerOutcome::Failed
    );
    assert_eq!(host.calls(), vec!["click:helper"]);
}

#[tokio::test]
async fn provider_failure_is_reported_not_raised() {
    init_logging();
    let host = host(&["task:Daily"]);
    let outcome = fire(
        &host.providers(),
        &Dom::new(),
        &TriggerRequest::TaskPlugin {
            task_name: "Daily".to_string(),
        },
    )
    .await;
    assert_eq!(outcome, TriggerOutcome::Failed);
}

#[tokio::test]
async fn missing_provider_fails_cleanly() {
    init_logging();
    let outcome = fire(
        &Providers::default(),
        &Dom::new(),
        &TriggerRequest::Native {
            set_name: "Foo".to_string(),
            label: "Hi".to_string(),
        },
    )
    .await;
    assert_eq!(outcome, TriggerOutcome::Failed);
}

#[tokio::test]
async fn entries_dispatch_to_their_own_source() {
    init_logging();
    let host = host(&[]);
    let providers = host.providers();
    let dom = Dom::new();

    let entries = [
        Entry::native("Foo", "Hi", "/echo hi", Scope::Global),
        Entry::script("abc", "Tools", "Summarize", None, Scope::Character),
        Entry::task("Daily", "Alice", Scope::Character, true),
    ];
    for entry in &entries {
        assert_eq!(
            trigger_entry(&providers, &dom, entry).await,
            TriggerOutcome::Completed
        );
    }

    assert_eq!(
        host.calls(),
        vec!["native:Foo:Hi", "event:abc_Summarize", "task:Daily"]
    );
}

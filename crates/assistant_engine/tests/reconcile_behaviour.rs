use std::sync::Once;

use assistant_core::SourceIdentity;
use assistant_engine::{
    reconcile, Dom, EngineConfig, MixedContentPolicy, NodeHandle, CLASS_BODY_DISABLED,
    CLASS_BODY_ENABLED, CLASS_HIDDEN, CLASS_MIXED_VISIBLE, CLASS_WHITELISTED,
    CLASS_WRAPPER_VISIBLE,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(assistant_logging::initialize_for_tests);
}

const BAR: &str = r#"
<div id="send_form">
  <div id="qr--bar">
    <div class="qr--buttons">
      <div id="qr--set-Foo" class="qr--buttons"><div class="qr--button">Hi</div></div>
      <div id="script_container_abc" class="qr--buttons"><div class="qr--button">Summarize</div></div>
      <div id="script_container_def" class="qr--buttons"><div class="qr--button">Go</div></div>
    </div>
    <div id="input_helper_toolbar"></div>
  </div>
  <div id="qr-assistant-raw-button">Raw</div>
</div>
"#;

fn node(dom: &Dom, id: &str) -> NodeHandle {
    dom.get_element_by_id(id)
        .unwrap_or_else(|| panic!("#{id} missing"))
}

fn native_refs(dom: &Dom) -> Vec<(String, NodeHandle)> {
    vec![("Foo".to_string(), node(dom, "qr--set-Foo"))]
}

#[test]
fn only_whitelisted_script_container_stays_visible() {
    init_logging();
    let mut dom = Dom::parse_html(BAR);
    let config = EngineConfig::default();
    let refs = native_refs(&dom);

    let report = reconcile(
        &mut dom,
        &config,
        &refs,
        &[SourceIdentity::script("abc")],
        true,
    );

    let abc = node(&dom, "script_container_abc");
    let def = node(&dom, "script_container_def");
    let foo = node(&dom, "qr--set-Foo");
    assert!(dom.has_class(abc, CLASS_WHITELISTED));
    assert!(!dom.has_class(abc, CLASS_HIDDEN));
    assert!(dom.has_class(def, CLASS_HIDDEN));
    assert!(dom.has_class(foo, CLASS_HIDDEN));
    assert_eq!(report.whitelisted, vec![abc]);
    assert_eq!(report.hidden, vec![foo, def]);

    let wrapper = report.wrapper.expect("wrapper detected");
    assert!(report.wrapper_visible);
    assert!(dom.has_class(wrapper, CLASS_WRAPPER_VISIBLE));
    assert!(dom.has_class(dom.document(), CLASS_BODY_ENABLED));
}

#[test]
fn native_set_is_whitelisted_through_its_provider_reference() {
    init_logging();
    let mut dom = Dom::parse_html(BAR);
    let refs = native_refs(&dom);

    let report = reconcile(
        &mut dom,
        &EngineConfig::default(),
        &refs,
        &[SourceIdentity::native_set("Foo")],
        true,
    );

    assert_eq!(report.whitelisted, vec![node(&dom, "qr--set-Foo")]);
    assert_eq!(report.hidden.len(), 2);
}

#[test]
fn builtin_toolbar_and_raw_element_are_handled_apart() {
    init_logging();
    let mut dom = Dom::parse_html(BAR);
    let refs = native_refs(&dom);

    let report = reconcile(&mut dom, &EngineConfig::default(), &refs, &[], true);

    let toolbar = node(&dom, "input_helper_toolbar");
    let raw = node(&dom, "qr-assistant-raw-button");
    assert!(!dom.has_class(toolbar, CLASS_HIDDEN));
    assert_eq!(report.protected, vec![toolbar]);
    assert!(dom.has_class(raw, CLASS_HIDDEN));
    assert_eq!(report.raw_hidden, vec![raw]);
    assert!(!report.wrapper_visible);
    assert!(dom.has_class(report.wrapper.unwrap(), CLASS_HIDDEN));
}

#[test]
fn every_duplicate_raw_element_is_hidden() {
    init_logging();
    let mut dom = Dom::parse_html(
        r#"<div id="qr--bar"></div><span id="qr-assistant-raw-button">A</span><span id="qr-assistant-raw-button">B</span>"#,
    );

    let report = reconcile(&mut dom, &EngineConfig::default(), &[], &[], true);

    assert_eq!(report.raw_hidden.len(), 2);
    for raw in report.raw_hidden {
        assert!(dom.has_class(raw, CLASS_HIDDEN));
    }
}

#[test]
fn disabling_strips_every_state_class() {
    init_logging();
    let mut dom = Dom::parse_html(BAR);
    let config = EngineConfig::default();
    let refs = native_refs(&dom);
    let whitelist = [SourceIdentity::script("abc")];
    reconcile(&mut dom, &config, &refs, &whitelist, true);

    let report = reconcile(&mut dom, &config, &refs, &whitelist, false);

    assert!(!report.enabled);
    assert!(dom.has_class(dom.document(), CLASS_BODY_DISABLED));
    assert!(!dom.has_class(dom.document(), CLASS_BODY_ENABLED));
    let marked: Vec<_> = dom
        .descendants(dom.document())
        .into_iter()
        .filter(|&n| {
            [CLASS_HIDDEN, CLASS_WHITELISTED, CLASS_WRAPPER_VISIBLE, CLASS_MIXED_VISIBLE]
                .iter()
                .any(|class| dom.has_class(n, class))
        })
        .collect();
    assert!(marked.is_empty(), "still marked: {marked:?}");
}

#[test]
fn reconciling_twice_changes_nothing() {
    init_logging();
    let mut dom = Dom::parse_html(BAR);
    let config = EngineConfig::default();
    let refs = native_refs(&dom);
    let whitelist = [SourceIdentity::script("def")];

    let first_report = reconcile(&mut dom, &config, &refs, &whitelist, true);
    let first = dom.class_snapshot(dom.document());
    let second_report = reconcile(&mut dom, &config, &refs, &whitelist, true);

    assert_eq!(dom.class_snapshot(dom.document()), first);
    assert_eq!(second_report, first_report);
}

#[test]
fn ancestor_of_whitelisted_container_is_never_hidden() {
    init_logging();
    let mut dom = Dom::parse_html(
        r#"<div id="qr--bar">
             <div id="outer" class="qr--buttons">
               <div id="middle" class="qr--buttons">
                 <div id="script_container_abc" class="qr--buttons"></div>
               </div>
             </div>
             <div id="lonely" class="qr--buttons"></div>
           </div>"#,
    );

    let report = reconcile(
        &mut dom,
        &EngineConfig::default(),
        &[],
        &[SourceIdentity::script("abc")],
        true,
    );

    let outer = node(&dom, "outer");
    let middle = node(&dom, "middle");
    assert_eq!(report.wrapper, None);
    assert_eq!(report.mixed, vec![outer, middle]);
    assert!(dom.has_class(outer, CLASS_MIXED_VISIBLE));
    assert!(!dom.has_class(middle, CLASS_HIDDEN));
    assert_eq!(report.hidden, vec![node(&dom, "lonely")]);
}

#[test]
fn builtin_container_keeps_parent_visible_under_both_policies() {
    init_logging();
    let markup = r#"<div id="qr--bar">
        <div id="holder" class="qr--buttons"><div id="input_helper_toolbar"></div></div>
    </div>"#;

    for policy in [
        MixedContentPolicy::DescendantScan,
        MixedContentPolicy::ContainersOnly,
    ] {
        let mut dom = Dom::parse_html(markup);
        let config = EngineConfig {
            mixed_content: policy,
            ..EngineConfig::default()
        };
        let report = reconcile(&mut dom, &config, &[], &[], true);
        let holder = node(&dom, "holder");
        assert_eq!(report.mixed, vec![holder], "{policy:?}");
        assert!(!dom.has_class(holder, CLASS_HIDDEN), "{policy:?}");
    }
}

const HELPER_IN_WRAPPER: &str = r#"<div id="qr--bar">
    <div class="qr--buttons">
        <div id="qr--set-Foo" class="qr--buttons"><div class="qr--button">Hi</div></div>
        <div id="input_send_helper" class="qr--button">Helper</div>
    </div>
</div>"#;

#[test]
fn input_helper_button_keeps_the_wrapper_visible() {
    init_logging();
    let mut dom = Dom::parse_html(HELPER_IN_WRAPPER);
    let refs = native_refs(&dom);

    let report = reconcile(&mut dom, &EngineConfig::default(), &refs, &[], true);

    let wrapper = report.wrapper.expect("wrapper detected");
    let helper = node(&dom, "input_send_helper");
    assert!(report.wrapper_visible);
    assert!(dom.has_class(wrapper, CLASS_WRAPPER_VISIBLE));
    assert!(!dom.has_class(wrapper, CLASS_HIDDEN));
    assert_eq!(report.protected, vec![helper]);
    assert!(!dom.has_class(helper, CLASS_HIDDEN));
    assert_eq!(report.hidden, vec![node(&dom, "qr--set-Foo")]);
}

#[test]
fn input_helper_button_outside_the_wrapper_is_not_protected() {
    init_logging();
    let markup = r#"<div id="qr--bar">
        <div id="qr--set-Foo" class="qr--buttons">
            <div id="input_send_helper" class="qr--button">Helper</div>
        </div>
    </div>"#;
    let mut dom = Dom::parse_html(markup);
    let refs = native_refs(&dom);

    let report = reconcile(&mut dom, &EngineConfig::default(), &refs, &[], true);

    assert!(report.protected.is_empty());
    assert_eq!(report.hidden, vec![node(&dom, "qr--set-Foo")]);
}

#[test]
fn input_helper_button_only_lifts_sets_under_descendant_scan() {
    init_logging();
    let markup = r#"<div id="qr--bar">
        <div class="qr--buttons">
            <div id="holder" class="qr--buttons">
                <div class="qr--buttons">
                    <div id="input_send_helper" class="qr--button">Helper</div>
                </div>
            </div>
        </div>
    </div>"#;

    let mut dom = Dom::parse_html(markup);
    let report = reconcile(&mut dom, &EngineConfig::default(), &[], &[], true);
    assert!(report.mixed.contains(&node(&dom, "holder")));

    let mut dom = Dom::parse_html(markup);
    let config = EngineConfig {
        mixed_content: MixedContentPolicy::ContainersOnly,
        ..EngineConfig::default()
    };
    let report = reconcile(&mut dom, &config, &[], &[], true);
    assert!(report.hidden.contains(&node(&dom, "holder")));
}

#[test]
fn stale_provider_reference_never_matches() {
    init_logging();
    let mut dom = Dom::parse_html(BAR);
    let old = node(&dom, "qr--set-Foo");
    let refs = vec![("Foo".to_string(), old)];
    dom.remove(old).unwrap();

    let report = reconcile(
        &mut dom,
        &EngineConfig::default(),
        &refs,
        &[SourceIdentity::native_set("Foo")],
        true,
    );

    assert!(report.whitelisted.is_empty());
    assert!(!dom.has_class(old, CLASS_WHITELISTED));
}

#[test]
fn missing_bar_is_a_no_op() {
    init_logging();
    let mut dom = Dom::parse_html(r#"<div id="send_form"></div>"#);
    let report = reconcile(&mut dom, &EngineConfig::default(), &[], &[], true);
    assert_eq!(report.visible_count(), 0);
    assert!(report.hidden.is_empty());
}

use framering::{
    ComponentDef, ErrorSeverity, Framering, FrameringError, MemoryMetaStore, MetaStore, Placement,
    Position, Severity,
};
use framering_config::FrameringConfig;
use framering_fields::{FieldDef, FieldOption};
use framering_forms::ValidationKind;
use framering_rules::{ConditionNode, StaticContext};
use serde_json::json;
use std::io::Write;
use tempfile::NamedTempFile;
use test_log::test;

fn headline_app() -> Framering {
    let mut app = Framering::new(FrameringConfig::default()).unwrap();
    app.register_component(
        ComponentDef::new("Hero", ConditionNode::leaf("post_type", "page")).with_field(
            FieldDef::new("text")
                .with_name("headline")
                .with_title("Headline")
                .required(),
        ),
    )
    .unwrap();
    app.initialize();
    app
}

#[test]
fn page_context_processes_headline() {
    let mut app = headline_app();
    let store = MemoryMetaStore::new();
    let boxes = app
        .setup_editor(&StaticContext::editing("page"), &store, Some(3))
        .unwrap();
    assert_eq!(boxes.len(), 1);

    let form = app
        .components_mut()
        .get_mut("hero")
        .unwrap()
        .form_mut()
        .unwrap();
    let result = form.process(Some(&json!({"headline": "Hello"}))).unwrap();
    assert_eq!(result, json!({"headline": "Hello"}));
}

#[test]
fn post_context_builds_no_form_and_persists_nothing() {
    let mut app = headline_app();
    let mut store = MemoryMetaStore::new();

    let boxes = app
        .setup_editor(&StaticContext::editing("post"), &store, Some(3))
        .unwrap();
    assert!(boxes.is_empty());
    assert!(app.components().get("hero").unwrap().form().is_none());

    let staged = app
        .before_persist(&json!({"framering": {"hero": {"headline": "Hello"}}}))
        .unwrap();
    assert_eq!(staged, 0);
    assert_eq!(app.after_persist(&mut store, 3).unwrap(), 0);
    assert!(store.is_empty());
}

#[test]
fn form_from_an_earlier_page_is_dropped_on_a_non_matching_one() {
    let mut app = headline_app();
    let mut store = MemoryMetaStore::new();

    let boxes = app
        .setup_editor(&StaticContext::editing("page"), &store, Some(3))
        .unwrap();
    assert_eq!(boxes.len(), 1);

    let boxes = app
        .setup_editor(&StaticContext::editing("post"), &store, Some(4))
        .unwrap();
    assert!(boxes.is_empty());
    assert!(app.components().get("hero").unwrap().form().is_none());

    let staged = app
        .before_persist(&json!({"framering": {"hero": {"headline": "Hello"}}}))
        .unwrap();
    assert_eq!(staged, 0);
    assert_eq!(app.after_persist(&mut store, 4).unwrap(), 0);
    assert!(store.is_empty());
}

#[test]
fn stored_values_do_not_carry_over_to_another_entity() {
    let mut app = headline_app();
    let mut store = MemoryMetaStore::new();
    app.setup_editor(&StaticContext::editing("page"), &store, Some(1))
        .unwrap();
    app.before_persist(&json!({"framering": {"hero": {"headline": "Entity one"}}}))
        .unwrap();
    app.after_persist(&mut store, 1).unwrap();

    let boxes = app
        .setup_editor(&StaticContext::editing("page"), &store, Some(1))
        .unwrap();
    assert_eq!(
        boxes[0].fields[0].attribute("value"),
        Some(&json!("Entity one"))
    );

    let boxes = app
        .setup_editor(&StaticContext::editing("page"), &store, Some(2))
        .unwrap();
    assert_ne!(
        boxes[0].fields[0].attribute("value"),
        Some(&json!("Entity one"))
    );
    assert!(!boxes[0].to_html().contains("Entity one"));
}

#[test]
fn required_empty_headline_rejects_the_whole_submission() {
    let mut app = headline_app();
    let mut store = MemoryMetaStore::new();
    app.setup_editor(&StaticContext::editing("page"), &store, Some(3))
        .unwrap();

    let err = app
        .before_persist(&json!({"framering": {"hero": {"headline": "   "}}}))
        .unwrap_err();
    let rejection = err.as_validation().unwrap();
    assert_eq!(rejection.kind, ValidationKind::EmptyField);
    assert_eq!(err.severity(), ErrorSeverity::Warning);
    assert!(app.staged().is_empty());
    assert_eq!(app.after_persist(&mut store, 3).unwrap(), 0);
}

#[test]
fn multiple_select_with_unknown_value_is_rejected() {
    let mut app = Framering::new(FrameringConfig::default()).unwrap();
    app.register_component(
        ComponentDef::new("Sizes", ConditionNode::leaf("post_type", "page")).with_field(
            FieldDef::new("select")
                .with_name("sizes")
                .multiple()
                .with_options(vec![FieldOption::plain("a"), FieldOption::plain("b")]),
        ),
    )
    .unwrap();
    app.initialize();
    let store = MemoryMetaStore::new();
    app.setup_editor(&StaticContext::editing("page"), &store, None)
        .unwrap();

    let err = app
        .before_persist(&json!({"framering": {"sizes": {"sizes": ["a", "c"]}}}))
        .unwrap_err();
    assert!(matches!(err, FrameringError::Validation(ref v) if v.kind == ValidationKind::InvalidField));
}

#[test]
fn saved_values_come_back_on_the_next_edit() {
    let mut app = headline_app();
    let mut store = MemoryMetaStore::new();
    app.setup_editor(&StaticContext::editing("page"), &store, Some(11))
        .unwrap();
    app.before_persist(&json!({"framering": {"hero": {"headline": "Saved <b>once</b>"}}}))
        .unwrap();
    app.after_persist(&mut store, 11).unwrap();

    let mut next_request = headline_app();
    let boxes = next_request
        .setup_editor(&StaticContext::editing("page"), &store, Some(11))
        .unwrap();
    assert_eq!(
        boxes[0].fields[0].attribute("value"),
        Some(&json!("Saved once"))
    );
    assert!(boxes[0].to_html().contains("value=\"Saved once\""));
}

#[test]
fn components_load_from_yaml_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
- title: Hero Banner
  rules:
    any:
      - is_homepage: true
      - post_type: page
  style:
    position: lateral
  fields:
    - name: headline
      type: text
      required: true
    - name: accent
      type: color
- title: Post Extras
  id: extras
  rules:
    - post_type: post
  fields:
    - name: subtitle
"#
    )
    .unwrap();

    let mut app = Framering::new(FrameringConfig::default()).unwrap();
    assert_eq!(app.load_components_file(file.path()).unwrap(), 2);
    app.initialize();

    let hero = app.components().get("hero-banner").unwrap();
    assert_eq!(hero.placement(), Placement::Secondary);
    assert_eq!(hero.fields().len(), 2);

    let store = MemoryMetaStore::new();
    let boxes = app
        .setup_editor(&StaticContext::homepage(), &store, None)
        .unwrap();
    let ids: Vec<_> = boxes.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, vec!["hero-banner"]);
}

#[test]
fn component_without_title_aborts_loading() {
    let mut app = Framering::new(FrameringConfig::default()).unwrap();
    let err = app
        .load_components("- rules:\n    post_type: page\n")
        .unwrap_err();
    assert!(matches!(err, FrameringError::Configuration { .. }));
    assert_eq!(err.severity(), ErrorSeverity::Critical);
}

#[test]
fn tab_indexes_run_across_meta_boxes() {
    let mut app = Framering::new(FrameringConfig::default()).unwrap();
    for (title, position) in [("Main", Position::Normal), ("Side", Position::Lateral)] {
        app.register_component(
            ComponentDef::new(title, ConditionNode::leaf("post_type", "page"))
                .with_position(position)
                .with_field(FieldDef::new("text").with_name("a"))
                .with_field(FieldDef::new("text").with_name("b")),
        )
        .unwrap();
    }
    app.initialize();
    let store = MemoryMetaStore::new();
    let boxes = app
        .setup_editor(&StaticContext::editing("page"), &store, None)
        .unwrap();
    let tabindexes: Vec<_> = boxes
        .iter()
        .flat_map(|b| b.fields.iter().map(|d| d.attribute("tabindex").cloned()))
        .collect();
    assert_eq!(
        tabindexes,
        vec![Some(json!(1)), Some(json!(2)), Some(json!(3)), Some(json!(4))]
    );
    assert_eq!(boxes[1].placement, Placement::Secondary);
}

#[test]
fn failing_store_surfaces_as_store_error() {
    struct Offline;
    impl MetaStore for Offline {
        fn get_meta(&self, _: u64, _: &str) -> Result<Option<String>, framering::StoreError> {
            Err(framering::StoreError::new("connection refused"))
        }
        fn set_meta(&mut self, _: u64, _: &str, _: &str) -> Result<(), framering::StoreError> {
            Err(framering::StoreError::new("connection refused"))
        }
        fn delete_meta(&mut self, _: u64, _: &str) -> Result<(), framering::StoreError> {
            Err(framering::StoreError::new("connection refused"))
        }
    }

    let mut app = headline_app();
    let err = app
        .setup_editor(&StaticContext::editing("page"), &Offline, Some(1))
        .unwrap_err();
    assert!(matches!(err, FrameringError::Store(_)));
    assert_eq!(err.severity(), ErrorSeverity::Error);
}

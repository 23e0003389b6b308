mod common;

use assert2::{check, let_assert};
use common::{FIXTURE_CORPUS, keyword_state};
use ember_docs_mcp::tools::api_reference::{ApiReferenceRequest, handle_api_reference};
use ember_docs_mcp::{ApiLookup, Corpus, DocState};
use rstest::rstest;
use std::sync::Arc;

#[test]
fn test_parse_is_idempotent() {
    let first = Corpus::parse(FIXTURE_CORPUS);
    let second = Corpus::parse(FIXTURE_CORPUS);
    check!(first == second);
    check!(first.section_count() == 3);
}

#[test]
fn test_empty_input_has_no_sections() {
    check!(Corpus::parse("").section_count() == 0);
    check!(Corpus::parse("text without any section header\n---\n").section_count() == 0);
}

#[rstest]
#[tokio::test]
async fn test_malformed_record_is_skipped(keyword_state: Arc<DocState>) {
    let index = keyword_state.index().await.unwrap();
    check!(index.api().len() == 2);
    check!(index.api().keys().any(|key| key == "ember.component"));
    check!(index.api().get("Broken.Record").is_none());
}

#[rstest]
#[case("Ember.Component")]
#[case("EMBER.COMPONENT")]
#[case("Component")]
#[case("component")]
#[tokio::test]
async fn test_dotted_name_lookup(keyword_state: Arc<DocState>, #[case] name: &str) {
    let index = keyword_state.index().await.unwrap();
    let_assert!(ApiLookup::Found { entry, deprecation } = index.api_reference(name, None));
    check!(entry.name == "Ember.Component");
    let_assert!(Some(deprecation) = deprecation);
    check!(deprecation.since.as_deref() == Some("5.0"));
    check!(deprecation.replacement.as_deref() == Some("@glimmer/component"));
}

#[rstest]
#[tokio::test]
async fn test_api_tool_renders_entry(keyword_state: Arc<DocState>) {
    let request = ApiReferenceRequest {
        name: "Component".to_string(),
        kind: Some("class".to_string()),
    };
    let text = handle_api_reference(&keyword_state, request).await.unwrap();
    check!(text.starts_with("# Ember.Component (class)"));
    check!(text.contains("Module: @ember/component"));
    check!(text.contains("Extends: Ember.CoreView"));
    check!(text.contains("Source: packages/@ember/component/index.ts:12"));
    check!(text.contains("Deprecated since 5.0, use @glimmer/component instead"));
    check!(text.contains("### didInsertElement()"));
}

#[rstest]
#[tokio::test]
async fn test_api_tool_renders_method_signature(keyword_state: Arc<DocState>) {
    let request = ApiReferenceRequest {
        name: "routerservice".to_string(),
        kind: None,
    };
    let text = handle_api_reference(&keyword_state, request).await.unwrap();
    check!(text.contains("### transitionTo(routeName) → Transition"));
    check!(text.contains("- `routeName` (String)"));
}

#[rstest]
#[tokio::test]
async fn test_api_tool_suggests_near_misses(keyword_state: Arc<DocState>) {
    let request = ApiReferenceRequest {
        name: "RouterServise".to_string(),
        kind: None,
    };
    let text = handle_api_reference(&keyword_state, request).await.unwrap();
    check!(text.starts_with("No API entry found for 'RouterServise'."));
    check!(text.contains("• `routerservice`"));
}

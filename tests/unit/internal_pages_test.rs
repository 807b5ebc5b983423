//! Unit tests for internal page routing, templating and escaping.

use std::collections::HashMap;

use rstest::rstest;
use serde_json::json;

use seabrowser::services::internal_pages::{
    escape_html, escape_json_string, is_internal_url, is_safe_resource_path, json_for_script, not_found_page,
    render_template, InternalPage, InternalScheme, PageRenderer,
};
use seabrowser::types::errors::PageError;

#[rstest]
#[case("sea://newtab", Some(InternalPage::NewTab))]
#[case("tsunami://settings", Some(InternalPage::Settings))]
#[case("sea://settings/#privacy", Some(InternalPage::Settings))]
#[case("SEA://History?q=rust", Some(InternalPage::History))]
#[case("sea://bookmarks/", Some(InternalPage::Bookmarks))]
#[case("tsunami://setup", Some(InternalPage::Setup))]
#[case("sea://nowhere", None)]
#[case("https://newtab", None)]
fn test_page_from_url(#[case] url: &str, #[case] expected: Option<InternalPage>) {
    assert_eq!(InternalPage::from_url(url), expected);
}

/// A scheme owns its own URLs, including the `.localhost` form, and nothing else.
#[rstest]
#[case(InternalScheme::Sea, "sea://settings", true)]
#[case(InternalScheme::Sea, "SEA://history?q=x", true)]
#[case(InternalScheme::Sea, "http://sea.localhost/newtab", true)]
#[case(InternalScheme::Sea, "https://sea.localhost", true)]
#[case(InternalScheme::Sea, "tsunami://settings", false)]
#[case(InternalScheme::Sea, "https://sea.localhost.evil.example/", false)]
#[case(InternalScheme::Sea, "https://example.com/sea://settings", false)]
#[case(InternalScheme::Tsunami, "tsunami://newtab", true)]
#[case(InternalScheme::Tsunami, "sea://newtab", false)]
fn test_scheme_owns_url(#[case] scheme: InternalScheme, #[case] url: &str, #[case] expected: bool) {
    assert_eq!(scheme.owns_url(url), expected);
}

#[test]
fn test_every_page_url_parses_back() {
    for scheme in InternalScheme::ALL {
        for page in InternalPage::ALL {
            assert_eq!(InternalPage::from_url(&scheme.url(page)), Some(page));
        }
    }
}

#[rstest]
#[case("sea://history", true)]
#[case("  Tsunami://x", true)]
#[case("https://sea.example", false)]
#[case("seashell://x", false)]
fn test_is_internal_url(#[case] url: &str, #[case] expected: bool) {
    assert_eq!(is_internal_url(url), expected);
}

#[test]
fn test_scheme_parse_and_names() {
    assert_eq!(InternalScheme::parse(" Tsunami "), Some(InternalScheme::Tsunami));
    assert_eq!(InternalScheme::parse("ftp"), None);
    assert_eq!(InternalScheme::Sea.product_name(), "Sea Browser");
    assert_eq!(InternalScheme::Tsunami.url(InternalPage::Downloads), "tsunami://downloads");
}

#[rstest]
#[case("pages/extra.css", true)]
#[case("../secret", false)]
#[case("/etc/passwd", false)]
#[case("\\windows", false)]
#[case("C:/boot.ini", false)]
#[case("", false)]
fn test_safe_resource_path(#[case] name: &str, #[case] expected: bool) {
    assert_eq!(is_safe_resource_path(name), expected);
}

/// Known placeholders are replaced, unknown ones and stray braces survive.
#[test]
fn test_render_template_placeholders() {
    let mut vars = HashMap::new();
    vars.insert("THEME", "dark".to_string());
    vars.insert("APP_NAME", "Tsunami".to_string());

    let out = render_template(
        "<html data-theme=\"{{THEME}}\"><title>{{ APP_NAME }}</title>{{UNSET}} {{THEME}} {{oops",
        &vars,
    );
    assert_eq!(
        out,
        "<html data-theme=\"dark\"><title>Tsunami</title>{{UNSET}} dark {{oops"
    );
}

#[test]
fn test_escape_html() {
    assert_eq!(
        escape_html("<a href=\"x\">Tom & Jerry's</a>"),
        "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;"
    );
}

#[test]
fn test_escape_json_string() {
    assert_eq!(escape_json_string("a\"b\\c\nd\u{1}"), "a\\\"b\\\\c\\nd\\u0001");
}

/// Embedded JSON cannot close the surrounding script element.
#[test]
fn test_json_for_script_neutralizes_script_close() {
    let out = json_for_script(&json!({"title": "</script><script>alert(1)</script>"}));
    assert!(!out.contains("</script>"));
    assert!(out.contains("<\\/script>"));
}

#[test]
fn test_not_found_page_escapes_url() {
    let page = not_found_page("sea://<bad>", "Sea Browser");
    assert!(page.contains("404"));
    assert!(page.contains("sea://&lt;bad&gt;"));
    assert!(!page.contains("<bad>"));
}

/// Every embedded template uses the theme and the bridge script.
#[test]
fn test_embedded_templates_have_common_placeholders() {
    let renderer = PageRenderer::new(None);
    for page in InternalPage::ALL {
        let template = renderer.template(page).expect("template missing");
        assert!(template.contains("{{THEME}}"), "{:?} lacks THEME", page);
        assert!(template.contains("{{BRIDGE_SCRIPT}}"), "{:?} lacks BRIDGE_SCRIPT", page);
    }
}

/// A file in the override directory replaces the embedded template.
#[test]
fn test_override_directory_wins() {
    let dir = tempfile::tempdir().expect("tempdir failed");
    std::fs::write(dir.path().join("newtab.html"), "<p>custom {{APP_NAME}}</p>").expect("write failed");

    let renderer = PageRenderer::new(Some(dir.path().to_path_buf()));
    let mut vars = HashMap::new();
    vars.insert("APP_NAME", "Sea Browser".to_string());

    assert_eq!(
        renderer.render(InternalPage::NewTab, &vars).expect("render failed"),
        "<p>custom Sea Browser</p>"
    );
    // Pages without an override still come from the binary.
    assert!(renderer.template(InternalPage::History).expect("template missing").contains("{{HISTORY_DATA}}"));
}

#[test]
fn test_render_url_unknown_page_is_404() {
    let renderer = PageRenderer::new(None);
    let html = renderer.render_url("sea://missing", "Sea Browser", &HashMap::new());
    assert!(html.contains("404"));
}

#[test]
fn test_resource_rejects_traversal() {
    let dir = tempfile::tempdir().expect("tempdir failed");
    let renderer = PageRenderer::new(Some(dir.path().to_path_buf()));
    assert!(matches!(renderer.resource("../etc/passwd"), Err(PageError::UnsafePath(_))));
    assert!(matches!(renderer.resource("absent.css"), Err(PageError::TemplateMissing(_))));

    std::fs::write(dir.path().join("extra.css"), "body{}").expect("write failed");
    assert_eq!(renderer.resource("extra.css").expect("resource failed"), "body{}");
}

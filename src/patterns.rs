//! The pattern catalog: one compiled regex per MVC framework call shape.
//!
//! Every pattern tolerates both quote characters and arbitrary horizontal
//! whitespace inside the call syntax, and captures identifiers through named
//! groups (`name`, `path`, `action`, `controller`, `area`). Patterns are
//! process-wide and stateless; `captures_iter` gives each scan an independent
//! cursor.
//!
//! Catalog order is a load-bearing invariant. The `regex` crate has no
//! lookaround, so forms that are syntactic subsets of one another (the
//! area-route redirect forms vs. the generic controller+params form, full
//! virtual paths vs. short names) are kept disjoint by listing the more
//! specific pattern first and letting the extractor suppress any later match
//! that overlaps an already-claimed call span.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

/// Which pattern subset applies to a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    /// C# controller sources: code-call patterns.
    CSharp,
    /// Razor templates: markup-tag patterns plus template-expression patterns.
    Razor,
}

impl DocumentKind {
    pub fn from_path(path: &Path) -> Option<DocumentKind> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("cs") => Some(DocumentKind::CSharp),
            Some("cshtml") | Some("razor") => Some(DocumentKind::Razor),
            _ => None,
        }
    }
}

/// One framework call shape. Names describe the call site, not the handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternKind {
    ViewFullPath,
    PartialFullPath,
    ViewByName,
    ViewParameterless,
    ViewWithModel,
    PartialByName,
    PartialParameterless,
    PartialWithModel,
    RedirectToActionArea,
    RedirectToActionAreaNoController,
    RedirectToAction,
    RedirectToActionWithController,
    RedirectToActionRouteValues,
    UrlAction,
    UrlActionWithController,
    UrlActionRouteValues,
    ViewComponentCall,
    HtmlPartialAsyncFullPath,
    HtmlPartialAsync,
    HtmlPartialFullPath,
    HtmlPartial,
    HtmlActionLinkWithController,
    HtmlActionLinkRouteValues,
    HtmlActionLink,
    HtmlBeginFormWithController,
    HtmlBeginFormRouteValues,
    HtmlBeginForm,
    ComponentInvoke,
    ComponentTag,
    AnchorTag,
    FormTag,
    PartialTagFullPath,
    PartialTag,
}

pub struct Pattern {
    pub kind: PatternKind,
    pub regex: Regex,
}

fn pattern(kind: PatternKind, re: &str) -> Pattern {
    Pattern {
        kind,
        regex: Regex::new(re).expect("catalog regex must compile"),
    }
}

// Quoted identifiers are always `["']...["']` with a capture class that
// excludes both quote characters, so an extracted identifier can never
// contain an unbalanced quote.

/// Code-call patterns for C# sources, in precedence order.
static CODE_CATALOG: Lazy<Vec<Pattern>> = Lazy::new(|| {
    vec![
        // Full virtual paths bind before short names.
        pattern(
            PatternKind::ViewFullPath,
            r#"\bView\s*\(\s*["'](?<path>(?:~/|/)[^"']+\.(?:cshtml|razor))["']\s*(?:,\s*[^)]*)?\)"#,
        ),
        pattern(
            PatternKind::PartialFullPath,
            r#"\bPartialView\s*\(\s*["'](?<path>(?:~/|/)[^"']+\.(?:cshtml|razor))["']\s*(?:,\s*[^)]*)?\)"#,
        ),
        pattern(
            PatternKind::PartialByName,
            r#"\bPartialView\s*\(\s*["'](?<name>[^"']+)["']\s*(?:,\s*[^)]*)?\)"#,
        ),
        pattern(PatternKind::PartialParameterless, r"\bPartialView\s*\(\s*\)"),
        pattern(
            PatternKind::PartialWithModel,
            r#"\bPartialView\s*\(\s*[^"'\s)][^)]*\)"#,
        ),
        pattern(
            PatternKind::ViewByName,
            r#"\bView\s*\(\s*["'](?<name>[^"']+)["']\s*(?:,\s*[^)]*)?\)"#,
        ),
        pattern(PatternKind::ViewParameterless, r"\bView\s*\(\s*\)"),
        pattern(PatternKind::ViewWithModel, r#"\bView\s*\(\s*[^"'\s)][^)]*\)"#),
        // Area-route forms are strict syntactic subsets of the generic forms
        // below them; they must claim their spans first.
        pattern(
            PatternKind::RedirectToActionArea,
            r#"\bRedirectToAction\s*\(\s*["'](?<action>[^"']+)["']\s*,\s*["'](?<controller>[^"']+)["']\s*,\s*new\s*\{[^}]*\barea\s*=\s*["'](?<area>[^"']*)["'][^}]*\}\s*\)"#,
        ),
        pattern(
            PatternKind::RedirectToActionAreaNoController,
            r#"\bRedirectToAction\s*\(\s*["'](?<action>[^"']+)["']\s*,\s*new\s*\{[^}]*\barea\s*=\s*["'](?<area>[^"']*)["'][^}]*\}\s*\)"#,
        ),
        pattern(
            PatternKind::RedirectToActionWithController,
            r#"\bRedirectToAction\s*\(\s*["'](?<action>[^"']+)["']\s*,\s*["'](?<controller>[^"']+)["']\s*(?:,\s*[^)]*)?\)"#,
        ),
        pattern(
            PatternKind::RedirectToActionRouteValues,
            r#"\bRedirectToAction\s*\(\s*["'](?<action>[^"']+)["']\s*,\s*(?:new\s*\{[^}]*\}|[A-Za-z_][A-Za-z0-9_]*)\s*\)"#,
        ),
        pattern(
            PatternKind::RedirectToAction,
            r#"\bRedirectToAction\s*\(\s*["'](?<action>[^"']+)["']\s*\)"#,
        ),
        pattern(
            PatternKind::UrlActionWithController,
            r#"\bUrl\.Action\s*\(\s*["'](?<action>[^"']+)["']\s*,\s*["'](?<controller>[^"']+)["']\s*(?:,\s*[^)]*)?\)"#,
        ),
        pattern(
            PatternKind::UrlActionRouteValues,
            r#"\bUrl\.Action\s*\(\s*["'](?<action>[^"']+)["']\s*,\s*(?:new\s*\{[^}]*\}|[A-Za-z_][A-Za-z0-9_]*)\s*\)"#,
        ),
        pattern(
            PatternKind::UrlAction,
            r#"\bUrl\.Action\s*\(\s*["'](?<action>[^"']+)["']\s*\)"#,
        ),
        pattern(
            PatternKind::ViewComponentCall,
            r#"\bViewComponent\s*\(\s*["'](?<name>[^"']+)["']\s*(?:,\s*[^)]*)?\)"#,
        ),
    ]
});

/// Markup-tag and template-expression patterns for Razor files, in
/// precedence order.
static TEMPLATE_CATALOG: Lazy<Vec<Pattern>> = Lazy::new(|| {
    vec![
        pattern(
            PatternKind::PartialTagFullPath,
            r#"<partial[^>]*\bname\s*=\s*["'](?<path>(?:~/|/)[^"']+\.(?:cshtml|razor))["'][^>]*/?>"#,
        ),
        pattern(
            PatternKind::PartialTag,
            r#"<partial[^>]*\bname\s*=\s*["'](?<name>[^"']+)["'][^>]*/?>"#,
        ),
        pattern(
            PatternKind::AnchorTag,
            r#"<a[^>]*\basp-action\s*=\s*["'](?<action>[^"']+)["'][^>]*>"#,
        ),
        pattern(
            PatternKind::FormTag,
            r#"<form[^>]*\basp-action\s*=\s*["'](?<action>[^"']+)["'][^>]*>"#,
        ),
        pattern(
            PatternKind::ComponentTag,
            r"<vc:(?<name>[A-Za-z][A-Za-z0-9-]*)[^>]*/?>",
        ),
        pattern(
            PatternKind::HtmlPartialAsyncFullPath,
            r#"@?await\s+Html\.PartialAsync\s*\(\s*["'](?<path>(?:~/|/)[^"']+\.(?:cshtml|razor))["']\s*(?:,\s*[^)]*)?\)"#,
        ),
        pattern(
            PatternKind::HtmlPartialAsync,
            r#"@?await\s+Html\.PartialAsync\s*\(\s*["'](?<name>[^"']+)["']\s*(?:,\s*[^)]*)?\)"#,
        ),
        pattern(
            PatternKind::HtmlPartialFullPath,
            r#"@?\bHtml\.Partial\s*\(\s*["'](?<path>(?:~/|/)[^"']+\.(?:cshtml|razor))["']\s*(?:,\s*[^)]*)?\)"#,
        ),
        pattern(
            PatternKind::HtmlPartial,
            r#"@?\bHtml\.Partial\s*\(\s*["'](?<name>[^"']+)["']\s*(?:,\s*[^)]*)?\)"#,
        ),
        pattern(
            PatternKind::ComponentInvoke,
            r#"@?await\s+Component\.InvokeAsync\s*\(\s*["'](?<name>[^"']+)["']\s*(?:,\s*[^)]*)?\)"#,
        ),
        pattern(
            PatternKind::HtmlActionLinkWithController,
            r#"@?\bHtml\.ActionLink\s*\(\s*["'][^"']*["']\s*,\s*["'](?<action>[^"']+)["']\s*,\s*["'](?<controller>[^"']+)["']\s*(?:,\s*[^)]*)?\)"#,
        ),
        pattern(
            PatternKind::HtmlActionLinkRouteValues,
            r#"@?\bHtml\.ActionLink\s*\(\s*["'][^"']*["']\s*,\s*["'](?<action>[^"']+)["']\s*,\s*(?:new\s*\{[^}]*\}|[A-Za-z_][A-Za-z0-9_]*)\s*\)"#,
        ),
        pattern(
            PatternKind::HtmlActionLink,
            r#"@?\bHtml\.ActionLink\s*\(\s*["'][^"']*["']\s*,\s*["'](?<action>[^"']+)["']\s*\)"#,
        ),
        pattern(
            PatternKind::HtmlBeginFormWithController,
            r#"@?\bHtml\.BeginForm\s*\(\s*["'](?<action>[^"']+)["']\s*,\s*["'](?<controller>[^"']+)["']\s*(?:,\s*[^)]*)?\)"#,
        ),
        pattern(
            PatternKind::HtmlBeginFormRouteValues,
            r#"@?\bHtml\.BeginForm\s*\(\s*["'](?<action>[^"']+)["']\s*,\s*(?:new\s*\{[^}]*\}|[A-Za-z_][A-Za-z0-9_]*)\s*\)"#,
        ),
        pattern(
            PatternKind::HtmlBeginForm,
            r#"@?\bHtml\.BeginForm\s*\(\s*["'](?<action>[^"']+)["']\s*\)"#,
        ),
        pattern(
            PatternKind::UrlActionWithController,
            r#"@?\bUrl\.Action\s*\(\s*["'](?<action>[^"']+)["']\s*,\s*["'](?<controller>[^"']+)["']\s*(?:,\s*[^)]*)?\)"#,
        ),
        pattern(
            PatternKind::UrlActionRouteValues,
            r#"@?\bUrl\.Action\s*\(\s*["'](?<action>[^"']+)["']\s*,\s*(?:new\s*\{[^}]*\}|[A-Za-z_][A-Za-z0-9_]*)\s*\)"#,
        ),
        pattern(
            PatternKind::UrlAction,
            r#"@?\bUrl\.Action\s*\(\s*["'](?<action>[^"']+)["']\s*\)"#,
        ),
    ]
});

/// The ordered catalog for a document kind.
pub fn catalog(kind: DocumentKind) -> &'static [Pattern] {
    match kind {
        DocumentKind::CSharp => &CODE_CATALOG,
        DocumentKind::Razor => &TEMPLATE_CATALOG,
    }
}

/// Whether captured text is a genuine virtual path: it must start with a
/// root marker (`~/` or `/`) and still contain a separator after the marker.
/// A short name that merely starts with a slash never routes as a path.
pub fn is_virtual_path(text: &str) -> bool {
    let rest = match text.strip_prefix("~/") {
        Some(rest) => rest,
        None => match text.strip_prefix('/') {
            Some(rest) => rest,
            None => return false,
        },
    };
    rest.contains('/')
}

/// Convert a `<vc:...>` kebab-case element name to the Pascal-case view
/// component name (`product-list` -> `ProductList`).
pub fn kebab_to_pascal(name: &str) -> String {
    name.split('-')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

//! The reference extractor: scans document text against the pattern catalog
//! and yields semantic references with precise identifier spans.
//!
//! Matching is a single ordered pass over the catalog. Each successful match
//! claims its call span; a later (lower-priority) pattern whose match overlaps
//! a claimed span is dropped. That is what keeps the area-route redirect form
//! from also surfacing as a generic controller+params match, and full virtual
//! paths from also surfacing as short names.

use std::ops::Range;

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::patterns::{catalog, is_virtual_path, kebab_to_pascal, DocumentKind, PatternKind};

/// Byte range into the scanned document text.
pub type Span = Range<usize>;

/// The captured identifier plus where it sits in the document.
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct ReferenceData {
    /// The identifier text (view/partial/action/controller/component name or
    /// virtual path). For implied names this is inferred, not captured.
    pub name: String,
    /// Sub-span of the identifier itself; this is what gets visually marked.
    pub span: Span,
    /// Span of the whole matched call or tag.
    pub call_span: Span,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ActionData {
    pub data: ReferenceData,
    /// Explicit controller from the call site; None means "the referencing
    /// file's own controller".
    pub controller: Option<String>,
    /// Explicit area from the call site. Empty attribute values normalize to
    /// None before this is built.
    pub area: Option<String>,
    /// Uppercased HTTP verb for form-shaped call sites.
    pub verb: Option<String>,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ControllerData {
    pub data: ReferenceData,
    pub area: Option<String>,
}

/// A reference to an MVC artifact found in document text.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Reference {
    View(ReferenceData),
    Partial(ReferenceData),
    VirtualPath(ReferenceData),
    Action(ActionData),
    Controller(ControllerData),
    Component(ReferenceData),
}

impl Reference {
    pub fn data(&self) -> &ReferenceData {
        match self {
            Reference::View(data)
            | Reference::Partial(data)
            | Reference::VirtualPath(data)
            | Reference::Component(data) => data,
            Reference::Action(action) => &action.data,
            Reference::Controller(controller) => &controller.data,
        }
    }
}

/// Scan `text` with the catalog for `kind` and return every reference, in
/// catalog-then-document order. Pure function of its input.
pub fn extract(text: &str, kind: DocumentKind) -> Vec<Reference> {
    let mut claimed: Vec<Span> = Vec::new();
    let mut references = Vec::new();

    for pattern in catalog(kind) {
        for caps in pattern.regex.captures_iter(text) {
            let full = match caps.get(0) {
                Some(full) => full,
                None => continue,
            };
            if claimed.iter().any(|span| overlaps(span, &full.range())) {
                continue;
            }
            // A pattern that cannot produce its expected captures skips this
            // single match; the scan continues.
            if let Some(built) = build_references(pattern.kind, &caps, text) {
                claimed.push(full.range());
                references.extend(built);
            }
        }
    }

    references
}

fn overlaps(a: &Span, b: &Span) -> bool {
    a.start < b.end && b.start < a.end
}

fn capture_data(caps: &Captures, group: &str) -> Option<ReferenceData> {
    let m = caps.name(group)?;
    let full = caps.get(0)?;
    Some(ReferenceData {
        name: m.as_str().to_string(),
        span: m.range(),
        call_span: full.range(),
    })
}

/// Empty attribute values mean "no area", same as an absent attribute.
fn normalize_area(area: Option<String>) -> Option<String> {
    area.filter(|a| !a.is_empty())
}

fn build_references(kind: PatternKind, caps: &Captures, text: &str) -> Option<Vec<Reference>> {
    use PatternKind::*;

    match kind {
        ViewByName => Some(vec![Reference::View(capture_data(caps, "name")?)]),
        PartialByName | HtmlPartial | HtmlPartialAsync | PartialTag => {
            Some(vec![Reference::Partial(capture_data(caps, "name")?)])
        }
        ViewFullPath | PartialFullPath | HtmlPartialFullPath | HtmlPartialAsyncFullPath
        | PartialTagFullPath => {
            let data = capture_data(caps, "path")?;
            // Guard: a short name starting with a slash is not a path.
            if !is_virtual_path(&data.name) {
                return None;
            }
            Some(vec![Reference::VirtualPath(data)])
        }
        ViewParameterless | ViewWithModel => Some(implied_reference(caps, text, Reference::View)),
        PartialParameterless | PartialWithModel => {
            Some(implied_reference(caps, text, Reference::Partial))
        }
        RedirectToActionArea | RedirectToActionAreaNoController => {
            let area = normalize_area(caps.name("area").map(|m| m.as_str().to_string()));
            Some(action_references(caps, area, None))
        }
        RedirectToAction
        | RedirectToActionWithController
        | RedirectToActionRouteValues
        | UrlAction
        | UrlActionWithController
        | UrlActionRouteValues
        | HtmlActionLink
        | HtmlActionLinkWithController
        | HtmlActionLinkRouteValues => Some(action_references(caps, None, None)),
        HtmlBeginForm | HtmlBeginFormWithController | HtmlBeginFormRouteValues => {
            let verb = form_verb(caps.get(0)?.as_str());
            Some(action_references(caps, None, Some(verb)))
        }
        AnchorTag => Some(tag_references(caps, None)),
        FormTag => {
            let verb = form_verb(caps.get(0)?.as_str());
            Some(tag_references(caps, Some(verb)))
        }
        ViewComponentCall | ComponentInvoke => {
            Some(vec![Reference::Component(capture_data(caps, "name")?)])
        }
        ComponentTag => {
            let mut data = capture_data(caps, "name")?;
            data.name = kebab_to_pascal(&data.name);
            Some(vec![Reference::Component(data)])
        }
    }
}

/// Zero-argument and model-only calls take the enclosing action method's name
/// as the implied identifier. No enclosing method means no reference, which is
/// not an error; the occurrence is simply not actionable.
fn implied_reference(
    caps: &Captures,
    text: &str,
    construct: fn(ReferenceData) -> Reference,
) -> Vec<Reference> {
    let full = match caps.get(0) {
        Some(full) => full,
        None => return Vec::new(),
    };
    match infer_enclosing_action_name(text, full.start()) {
        Some(name) => vec![construct(ReferenceData {
            name,
            span: full.range(),
            call_span: full.range(),
        })],
        None => Vec::new(),
    }
}

/// Build the action reference, plus a controller reference when the call
/// names one. The explicit area attaches to both.
fn action_references(
    caps: &Captures,
    area: Option<String>,
    verb: Option<String>,
) -> Vec<Reference> {
    let mut references = Vec::new();

    let controller = caps.name("controller").map(|m| m.as_str().to_string());
    if let Some(data) = capture_data(caps, "action") {
        references.push(Reference::Action(ActionData {
            data,
            controller: controller.clone(),
            area: area.clone(),
            verb,
        }));
    }
    if let Some(data) = capture_data(caps, "controller") {
        references.push(Reference::Controller(ControllerData { data, area }));
    }

    references
}

static CONTROLLER_ATTR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\basp-controller\s*=\s*["']([^"']+)["']"#).unwrap());
static AREA_ATTR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\basp-area\s*=\s*["']([^"']*)["']"#).unwrap());

/// Anchor and form tag helpers: the match is keyed on `asp-action`, with
/// `asp-controller` and `asp-area` parsed as sibling attributes of the same
/// tag, in any order.
fn tag_references(caps: &Captures, verb: Option<String>) -> Vec<Reference> {
    let full = match caps.get(0) {
        Some(full) => full,
        None => return Vec::new(),
    };
    let tag = full.as_str();
    let tag_start = full.start();

    let area = normalize_area(
        AREA_ATTR_RE
            .captures(tag)
            .and_then(|attr| attr.get(1))
            .map(|m| m.as_str().to_string()),
    );
    let controller_match = CONTROLLER_ATTR_RE.captures(tag).and_then(|attr| attr.get(1));

    let mut references = Vec::new();
    if let Some(action) = caps.name("action") {
        references.push(Reference::Action(ActionData {
            data: ReferenceData {
                name: action.as_str().to_string(),
                span: action.range(),
                call_span: full.range(),
            },
            controller: controller_match.map(|m| m.as_str().to_string()),
            area: area.clone(),
            verb,
        }));
    }
    if let Some(controller) = controller_match {
        references.push(Reference::Controller(ControllerData {
            data: ReferenceData {
                name: controller.as_str().to_string(),
                span: tag_start + controller.start()..tag_start + controller.end(),
                call_span: full.range(),
            },
            area,
        }));
    }

    references
}

static METHOD_ATTR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\bmethod\s*=\s*["']([^"']+)["']"#).unwrap());
static FORM_METHOD_POST_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"FormMethod\.Post").unwrap());
static FORM_METHOD_GET_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"FormMethod\.Get").unwrap());

/// The HTTP verb a form will submit with. Forms without an explicit method
/// post by default.
fn form_verb(call_text: &str) -> String {
    if let Some(m) = METHOD_ATTR_RE.captures(call_text).and_then(|c| c.get(1)) {
        return m.as_str().to_ascii_uppercase();
    }
    if FORM_METHOD_POST_RE.is_match(call_text) {
        return "POST".to_string();
    }
    if FORM_METHOD_GET_RE.is_match(call_text) {
        return "GET".to_string();
    }
    "POST".to_string()
}

static METHOD_DECL_TAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:public|private|protected|internal)?\s*(?:async\s+)?(?:Task<)?(?:IActionResult|ActionResult)(?:<[^>]+>)?>?\s+(?<name>\w+)\s*\([^)]*\)\s*\{[^}]*$",
    )
    .unwrap()
});

/// Best-effort search backward from `offset` for the enclosing action
/// method's name: the nearest preceding declaration with an action-result
/// return shape whose body brace is still open at the call site. Approximate
/// by construction; callers treat None as "not actionable".
pub fn infer_enclosing_action_name(text: &str, offset: usize) -> Option<String> {
    let head = &text[..offset];
    let lines = head.lines().collect_vec();

    for end in (0..lines.len()).rev() {
        let start = end.saturating_sub(5);
        let window = lines[start..=end].join("\n");
        if let Some(caps) = METHOD_DECL_TAIL_RE.captures(&window) {
            return Some(caps["name"].to_string());
        }
    }

    None
}

//! Builds navigation links for a document: extract references, resolve each
//! against the project layout, and attach display ranges and tooltips.
//!
//! This is a pure function of the document text, its path, and the workspace
//! root; unresolvable references simply produce no link.

use std::path::{Path, PathBuf};

use ropey::Rope;
use tower_lsp::lsp_types::Position;

use crate::extract::{extract, ActionData, ControllerData, Reference, ReferenceData, Span};
use crate::patterns::DocumentKind;
use crate::project::{
    controller_name_from_path, controller_name_from_view_path, detect_area, detect_area_for_view,
    find_project_roots,
};
use crate::resolve::{
    locate_action_line, locate_action_line_with_verb, locate_class_line, resolve_component_class,
    resolve_component_view, resolve_controller, resolve_controller_in_area, resolve_full_path,
    resolve_partial, resolve_view,
};

/// Where a link jumps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    File(PathBuf),
    /// File plus a 1-based line to position the cursor at.
    FileLine(PathBuf, u32),
}

impl LinkTarget {
    pub fn path(&self) -> &Path {
        match self {
            LinkTarget::File(path) | LinkTarget::FileLine(path, _) => path,
        }
    }

    pub fn line(&self) -> Option<u32> {
        match self {
            LinkTarget::File(_) => None,
            LinkTarget::FileLine(_, line) => Some(*line),
        }
    }
}

/// One clickable region of the document.
#[derive(Debug, Clone, PartialEq)]
pub struct NavLink {
    pub range: tower_lsp::lsp_types::Range,
    pub target: LinkTarget,
    pub tooltip: String,
}

impl NavLink {
    pub fn contains(&self, position: Position) -> bool {
        (self.range.start.line < position.line
            || (self.range.start.line == position.line
                && self.range.start.character <= position.character))
            && (self.range.end.line > position.line
                || (self.range.end.line == position.line
                    && self.range.end.character >= position.character))
    }
}

/// The referencing file's own place in the project, used to resolve
/// references that do not name a controller or area themselves.
struct FileContext {
    controller: Option<String>,
    area: Option<String>,
}

impl FileContext {
    fn for_document(kind: DocumentKind, path: &Path) -> FileContext {
        match kind {
            DocumentKind::CSharp => FileContext {
                controller: controller_name_from_path(path),
                area: detect_area(path),
            },
            DocumentKind::Razor => FileContext {
                controller: controller_name_from_view_path(path),
                area: detect_area_for_view(path),
            },
        }
    }
}

/// Compute every navigation link in a document. Files that are neither C#
/// sources nor Razor templates yield nothing.
pub fn document_links(text: &str, file_path: &Path, workspace_root: &Path) -> Vec<NavLink> {
    let Some(kind) = DocumentKind::from_path(file_path) else {
        return Vec::new();
    };

    let references = extract(text, kind);
    if references.is_empty() {
        return Vec::new();
    }

    let rope = Rope::from_str(text);
    let roots = find_project_roots(workspace_root, file_path);
    let context = FileContext::for_document(kind, file_path);

    references
        .into_iter()
        .filter_map(|reference| {
            resolve_reference(&reference, kind, file_path, workspace_root, &roots, &context)
                .map(|(target, tooltip)| NavLink {
                    range: byte_span_to_range(&rope, &reference.data().span),
                    target,
                    tooltip,
                })
        })
        .collect()
}

/// The first link whose range contains `position`.
pub fn link_at<'a>(links: &'a [NavLink], position: Position) -> Option<&'a NavLink> {
    links.iter().find(|link| link.contains(position))
}

fn resolve_reference(
    reference: &Reference,
    kind: DocumentKind,
    file_path: &Path,
    workspace_root: &Path,
    roots: &[PathBuf],
    context: &FileContext,
) -> Option<(LinkTarget, String)> {
    match reference {
        Reference::View(data) => {
            let controller = context.controller.as_deref()?;
            let path = resolve_view(roots, controller, &data.name, context.area.as_deref())?;
            let tooltip = format!("Navigate to {}", display_path(&path, workspace_root));
            Some((LinkTarget::File(path), tooltip))
        }
        Reference::Partial(data) => {
            let controller = context.controller.as_deref()?;
            let path = resolve_partial(roots, controller, &data.name, context.area.as_deref())?;
            let tooltip = format!("Navigate to {}", display_path(&path, workspace_root));
            Some((LinkTarget::File(path), tooltip))
        }
        Reference::VirtualPath(data) => {
            let path = resolve_full_path(roots, &data.name)?;
            let tooltip = format!("Navigate to {}", display_path(&path, workspace_root));
            Some((LinkTarget::File(path), tooltip))
        }
        Reference::Action(action) => resolve_action(action, kind, file_path, roots, context),
        Reference::Controller(controller) => resolve_controller_reference(controller, roots),
        Reference::Component(data) => resolve_component(data, roots, context),
    }
}

fn resolve_action(
    action: &ActionData,
    kind: DocumentKind,
    file_path: &Path,
    roots: &[PathBuf],
    context: &FileContext,
) -> Option<(LinkTarget, String)> {
    let (controller_name, controller_path) = match &action.controller {
        Some(name) => {
            // An explicit area scopes the controller search, with a graceful
            // fall back to the general search when the area lookup misses.
            let path = match &action.area {
                Some(area) => resolve_controller_in_area(roots, name, area)
                    .or_else(|| resolve_controller(roots, name))?,
                None => resolve_controller(roots, name)?,
            };
            (name.clone(), path)
        }
        None => {
            let name = context.controller.clone()?;
            match (&action.area, kind) {
                // Explicit area, implicit controller: the referencing file's
                // own controller name, looked up inside that area.
                (Some(area), _) => {
                    let path = resolve_controller_in_area(roots, &name, area)
                        .or_else(|| match kind {
                            DocumentKind::CSharp => Some(file_path.to_path_buf()),
                            DocumentKind::Razor => resolve_controller(roots, &name),
                        })?;
                    (name, path)
                }
                // A bare action reference inside a controller targets that
                // same controller file.
                (None, DocumentKind::CSharp) => (name, file_path.to_path_buf()),
                (None, DocumentKind::Razor) => {
                    let path = resolve_controller(roots, &name)?;
                    (name, path)
                }
            }
        }
    };

    let line = match &action.verb {
        Some(verb) => locate_action_line_with_verb(&controller_path, &action.data.name, verb)?,
        None => locate_action_line(&controller_path, &action.data.name)?,
    };

    let tooltip = format!(
        "Navigate to {} action in {}Controller (line {})",
        action.data.name, controller_name, line
    );
    Some((LinkTarget::FileLine(controller_path, line), tooltip))
}

fn resolve_controller_reference(
    controller: &ControllerData,
    roots: &[PathBuf],
) -> Option<(LinkTarget, String)> {
    let path = match &controller.area {
        Some(area) => resolve_controller_in_area(roots, &controller.data.name, area)?,
        None => resolve_controller(roots, &controller.data.name)?,
    };

    let class_name = format!("{}Controller", controller.data.name);
    let target = match locate_class_line(&path, &class_name) {
        Some(line) => LinkTarget::FileLine(path, line),
        None => LinkTarget::File(path),
    };
    let tooltip = format!("Navigate to {class_name}");
    Some((target, tooltip))
}

fn resolve_component(
    data: &ReferenceData,
    roots: &[PathBuf],
    context: &FileContext,
) -> Option<(LinkTarget, String)> {
    if let Some(view) = resolve_component_view(roots, &data.name, context.area.as_deref()) {
        let tooltip = format!("Navigate to {} view component", data.name);
        return Some((LinkTarget::File(view), tooltip));
    }

    let class_path = resolve_component_class(roots, &data.name)?;
    let class_name = format!("{}ViewComponent", data.name);
    let target = match locate_class_line(&class_path, &class_name) {
        Some(line) => LinkTarget::FileLine(class_path, line),
        None => LinkTarget::File(class_path),
    };
    Some((target, format!("Navigate to {class_name}")))
}

fn display_path(path: &Path, workspace_root: &Path) -> String {
    pathdiff::diff_paths(path, workspace_root)
        .unwrap_or_else(|| path.to_path_buf())
        .display()
        .to_string()
}

/// Convert a byte span into an LSP range through the rope, counting in
/// characters the way the protocol expects.
fn byte_span_to_range(rope: &Rope, span: &Span) -> tower_lsp::lsp_types::Range {
    tower_lsp::lsp_types::Range {
        start: byte_to_position(rope, span.start),
        end: byte_to_position(rope, span.end),
    }
}

fn byte_to_position(rope: &Rope, byte: usize) -> Position {
    let char_idx = rope.byte_to_char(byte);
    let line = rope.char_to_line(char_idx);
    let character = char_idx - rope.line_to_char(line);
    Position {
        line: line as u32,
        character: character as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{standard_project_fixture, touch, write_file, HOME_CONTROLLER_SOURCE};

    #[test]
    fn named_view_call_links_to_the_controller_view() {
        let fixture = standard_project_fixture();
        let controller = fixture.path("Controllers/HomeController.cs");

        let links = document_links(HOME_CONTROLLER_SOURCE, &controller, fixture.root());

        let about = links
            .iter()
            .find(|l| l.target.path() == fixture.path("Views/Home/About.cshtml"))
            .expect("About view link");
        assert_eq!(about.target.line(), None);
        assert!(about.tooltip.contains("About.cshtml"));
    }

    #[test]
    fn parameterless_view_in_area_controller_prefers_area_view() {
        let fixture = standard_project_fixture();
        // Decoy at the project root that must lose to the area view.
        touch(&fixture.path("Views/Users/Index.cshtml"));
        let controller = fixture.path("Areas/Admin/Controllers/UsersController.cs");
        let text = std::fs::read_to_string(&controller).unwrap();

        let links = document_links(&text, &controller, fixture.root());

        assert_eq!(links.len(), 1);
        assert_eq!(
            links[0].target,
            LinkTarget::File(fixture.path("Areas/Admin/Views/Users/Index.cshtml"))
        );
    }

    #[test]
    fn redirect_resolves_controller_file_and_action_line() {
        let fixture = standard_project_fixture();
        let source = r#"using Microsoft.AspNetCore.Mvc;

public class CheckoutController : Controller
{
    public IActionResult Done()
    {
        return RedirectToAction("Index", "Home");
    }
}
"#;
        let controller = fixture.path("Controllers/CheckoutController.cs");
        write_file(&controller, source);

        let links = document_links(source, &controller, fixture.root());
        let home = fixture.path("Controllers/HomeController.cs");

        let action = links
            .iter()
            .find(|l| l.tooltip.contains("Index action"))
            .expect("action link");
        assert_eq!(action.target.path(), home);
        let line = action.target.line().expect("positioned at the declaration");
        let decl = std::fs::read_to_string(&home).unwrap();
        assert!(decl
            .lines()
            .nth(line as usize - 1)
            .unwrap()
            .contains("IActionResult Index"));

        let controller_link = links
            .iter()
            .find(|l| l.tooltip.contains("HomeController"))
            .expect("controller link");
        assert_eq!(controller_link.target.path(), home);
    }

    #[test]
    fn bare_redirect_targets_the_same_controller() {
        let fixture = standard_project_fixture();
        let controller = fixture.path("Controllers/HomeController.cs");

        let links = document_links(HOME_CONTROLLER_SOURCE, &controller, fixture.root());

        let redirect = links
            .iter()
            .find(|l| l.tooltip.contains("Index action"))
            .expect("bare redirect link");
        assert_eq!(redirect.target.path(), controller);
    }

    #[test]
    fn anchor_tag_in_view_links_action_and_controller() {
        let fixture = standard_project_fixture();
        let view = fixture.path("Views/Home/Index.cshtml");
        let text = r#"<a asp-controller="Home" asp-action="About">About us</a>"#;
        write_file(&view, text);

        let links = document_links(text, &view, fixture.root());
        assert_eq!(links.len(), 2);
        assert!(links
            .iter()
            .all(|l| l.target.path() == fixture.path("Controllers/HomeController.cs")));
    }

    #[test]
    fn area_tag_prefers_area_scoped_controller() {
        let fixture = standard_project_fixture();
        // Same-named controller at the root; the explicit area must win.
        write_file(
            &fixture.path("Controllers/UsersController.cs"),
            "public class UsersController : Controller\n{\n    public IActionResult Index()\n    {\n        return View();\n    }\n}\n",
        );
        let view = fixture.path("Views/Home/Index.cshtml");
        let text = r#"<a asp-area="Admin" asp-controller="Users" asp-action="Index">Users</a>"#;
        write_file(&view, text);

        let links = document_links(text, &view, fixture.root());
        assert!(links
            .iter()
            .all(|l| l.target.path() == fixture.path("Areas/Admin/Controllers/UsersController.cs")));
    }

    #[test]
    fn form_tag_prefers_the_post_overload() {
        let fixture = standard_project_fixture();
        let view = fixture.path("Views/Home/Index.cshtml");
        let text = r#"<form asp-controller="Home" asp-action="Create"></form>"#;
        write_file(&view, text);

        let links = document_links(text, &view, fixture.root());
        let action = links
            .iter()
            .find(|l| l.tooltip.contains("Create action"))
            .expect("form action link");

        let home = std::fs::read_to_string(fixture.path("Controllers/HomeController.cs")).unwrap();
        let line = action.target.line().unwrap();
        assert!(home
            .lines()
            .nth(line as usize - 1)
            .unwrap()
            .contains("Create(ProductForm"));
    }

    #[test]
    fn partial_tag_links_to_shared_partial() {
        let fixture = standard_project_fixture();
        let view = fixture.path("Views/Home/Index.cshtml");
        let text = r#"<partial name="_ProductCard" model="Model.Product" />"#;
        write_file(&view, text);

        let links = document_links(text, &view, fixture.root());
        assert_eq!(
            links[0].target,
            LinkTarget::File(fixture.path("Views/Shared/_ProductCard.cshtml"))
        );
    }

    #[test]
    fn component_tag_links_to_default_view() {
        let fixture = standard_project_fixture();
        let view = fixture.path("Views/Home/Index.cshtml");
        let text = "<vc:navigation-menu></vc:navigation-menu>";
        write_file(&view, text);

        let links = document_links(text, &view, fixture.root());
        assert_eq!(
            links[0].target,
            LinkTarget::File(
                fixture.path("Views/Shared/Components/NavigationMenu/Default.cshtml")
            )
        );
    }

    #[test]
    fn unresolvable_references_yield_no_links() {
        let fixture = standard_project_fixture();
        let controller = fixture.path("Controllers/HomeController.cs");
        let text = r#"public class HomeController : Controller
{
    public IActionResult Broken()
    {
        return View("NoSuchView");
    }
}
"#;

        let links = document_links(text, &controller, fixture.root());
        assert!(links.is_empty());
    }

    #[test]
    fn link_ranges_cover_the_identifier_text() {
        let fixture = standard_project_fixture();
        let controller = fixture.path("Controllers/HomeController.cs");
        let text = "public class HomeController : Controller\n{\n    public IActionResult A()\n    {\n        return View(\"About\");\n    }\n}\n";
        write_file(&controller, HOME_CONTROLLER_SOURCE);

        let links = document_links(text, &controller, fixture.root());
        assert_eq!(links.len(), 1);
        let range = links[0].range;
        assert_eq!(range.start.line, 4);
        // `        return View("About");` -- the span covers About only.
        assert_eq!(range.end.character - range.start.character, "About".len() as u32);
        assert!(links[0].contains(Position {
            line: 4,
            character: range.start.character + 2,
        }));
    }
}

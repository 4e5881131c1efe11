//! The artifact resolver: maps extracted identifiers to files on disk by
//! probing the framework's conventional layout in priority order.
//!
//! Resolution is deterministic for a given (identifier, roots, area) input:
//! candidates are generated in a fixed order, both view extensions are tried
//! at every tier before the next tier, and the wildcard `Areas/*` enumeration
//! is sorted lexicographically. All probing is read-only; "not found" is a
//! normal None, and I/O failures during enumeration count as "candidate does
//! not exist".

use std::path::{Path, PathBuf};

use itertools::Itertools;
use regex::Regex;
use walkdir::WalkDir;

use crate::project::{AREAS_DIR, CONTROLLERS_DIR, SHARED_DIR, VIEWS_DIR};

/// Recognized view-file extensions, same-priority at every candidate tier.
pub const VIEW_EXTENSIONS: [&str; 2] = ["cshtml", "razor"];

/// Extension of controller and view-component sources.
pub const SOURCE_EXTENSION: &str = "cs";

/// Last-resort alternate layout prefixes probed after the standard tiers.
const ALT_LAYOUT_DIRS: [&str; 3] = ["wwwroot", "src", "Web"];

fn first_existing(candidates: impl IntoIterator<Item = PathBuf>) -> Option<PathBuf> {
    candidates.into_iter().find(|path| path.is_file())
}

/// Both extension variants of `<dir>/<name>.<ext>`.
fn view_candidates(dir: PathBuf, name: &str) -> impl Iterator<Item = PathBuf> + '_ {
    VIEW_EXTENSIONS
        .into_iter()
        .map(move |ext| dir.join(format!("{name}.{ext}")))
}

/// Subdirectories of `<root>/Areas`, lexicographically sorted so wildcard
/// fallbacks are stable. Enumeration failures yield an empty list.
fn area_dirs(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root.join(AREAS_DIR))
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .flatten()
        .filter(|entry| entry.file_type().is_dir())
        .map(|entry| entry.path().to_path_buf())
        .collect_vec()
}

/// Resolve a view name against each project root, nearest root first.
pub fn resolve_view(
    roots: &[PathBuf],
    controller: &str,
    name: &str,
    area: Option<&str>,
) -> Option<PathBuf> {
    roots
        .iter()
        .find_map(|root| search_view_in_root(root, controller, name, area))
}

fn search_view_in_root(
    root: &Path,
    controller: &str,
    name: &str,
    area: Option<&str>,
) -> Option<PathBuf> {
    let views = |dir: PathBuf| view_candidates(dir, name);

    if let Some(area) = area {
        let area_views = root.join(AREAS_DIR).join(area).join(VIEWS_DIR);
        return first_existing(
            views(area_views.join(controller))
                .chain(views(area_views.join(SHARED_DIR)))
                .chain(views(root.join(VIEWS_DIR).join(SHARED_DIR))),
        );
    }

    let in_areas = area_dirs(root);
    first_existing(
        views(root.join(VIEWS_DIR).join(controller))
            .chain(views(root.join(VIEWS_DIR).join(SHARED_DIR)))
            .chain(
                in_areas
                    .iter()
                    .flat_map(|area| views(area.join(VIEWS_DIR).join(controller))),
            )
            .chain(
                in_areas
                    .iter()
                    .flat_map(|area| views(area.join(VIEWS_DIR).join(SHARED_DIR))),
            )
            .chain(ALT_LAYOUT_DIRS.into_iter().flat_map(|alt| {
                views(root.join(alt).join(VIEWS_DIR).join(controller))
            })),
    )
}

/// Resolve a partial-view name. Same tiering as views, except shared folders
/// outrank the owning controller's folder once an area context is involved:
/// partials are more often shared than full views.
pub fn resolve_partial(
    roots: &[PathBuf],
    controller: &str,
    name: &str,
    area: Option<&str>,
) -> Option<PathBuf> {
    roots
        .iter()
        .find_map(|root| search_partial_in_root(root, controller, name, area))
}

fn search_partial_in_root(
    root: &Path,
    controller: &str,
    name: &str,
    area: Option<&str>,
) -> Option<PathBuf> {
    let views = |dir: PathBuf| view_candidates(dir, name);

    if let Some(area) = area {
        let area_views = root.join(AREAS_DIR).join(area).join(VIEWS_DIR);
        return first_existing(
            views(area_views.join(controller))
                .chain(views(area_views.join(SHARED_DIR)))
                .chain(views(root.join(VIEWS_DIR).join(SHARED_DIR)))
                .chain(views(root.join(VIEWS_DIR).join(controller))),
        );
    }

    let in_areas = area_dirs(root);
    first_existing(
        views(root.join(VIEWS_DIR).join(controller))
            .chain(views(root.join(VIEWS_DIR).join(SHARED_DIR)))
            .chain(
                in_areas
                    .iter()
                    .flat_map(|area| views(area.join(VIEWS_DIR).join(controller))),
            )
            .chain(
                in_areas
                    .iter()
                    .flat_map(|area| views(area.join(VIEWS_DIR).join(SHARED_DIR))),
            )
            .chain(ALT_LAYOUT_DIRS.into_iter().flat_map(|alt| {
                let base = root.join(alt).join(VIEWS_DIR);
                views(base.join(controller)).chain(views(base.join(SHARED_DIR)))
            })),
    )
}

/// Resolve a `~/...` or `/...` virtual path by joining it under each project
/// root, probing both the as-given and host-OS separator conventions.
pub fn resolve_full_path(roots: &[PathBuf], virtual_path: &str) -> Option<PathBuf> {
    let relative = virtual_path
        .strip_prefix("~/")
        .or_else(|| virtual_path.strip_prefix('/'))
        .unwrap_or(virtual_path);

    roots.iter().find_map(|root| {
        let direct = root.join(relative);
        if direct.is_file() {
            return Some(direct);
        }
        let native: PathBuf = root.join(
            relative
                .split('/')
                .collect::<PathBuf>(),
        );
        native.is_file().then_some(native)
    })
}

fn controller_file(dir: PathBuf, name: &str) -> PathBuf {
    dir.join(format!("{name}Controller.{SOURCE_EXTENSION}"))
}

/// Resolve a controller name inside one specific area, nothing else.
pub fn resolve_controller_in_area(
    roots: &[PathBuf],
    name: &str,
    area: &str,
) -> Option<PathBuf> {
    first_existing(roots.iter().map(|root| {
        controller_file(root.join(AREAS_DIR).join(area).join(CONTROLLERS_DIR), name)
    }))
}

/// Resolve a controller name: the plain `Controllers` directory of each root,
/// the alternate layouts, then every area as a wildcard fallback.
pub fn resolve_controller(roots: &[PathBuf], name: &str) -> Option<PathBuf> {
    roots.iter().find_map(|root| {
        first_existing(
            std::iter::once(controller_file(root.join(CONTROLLERS_DIR), name))
                .chain(
                    ALT_LAYOUT_DIRS[1..]
                        .iter()
                        .map(|alt| controller_file(root.join(alt).join(CONTROLLERS_DIR), name)),
                )
                .chain(
                    area_dirs(root)
                        .into_iter()
                        .map(|area| controller_file(area.join(CONTROLLERS_DIR), name)),
                ),
        )
    })
}

/// Resolve a view component's default view:
/// `Views/Shared/Components/<Name>/Default.<ext>`, area-scoped first when an
/// area context applies.
pub fn resolve_component_view(
    roots: &[PathBuf],
    name: &str,
    area: Option<&str>,
) -> Option<PathBuf> {
    let component_dir = |views: PathBuf| views.join(SHARED_DIR).join("Components").join(name);

    roots.iter().find_map(|root| {
        let area_tier = area.map(|area| {
            component_dir(root.join(AREAS_DIR).join(area).join(VIEWS_DIR))
        });
        first_existing(
            area_tier
                .into_iter()
                .flat_map(|dir| view_candidates(dir, "Default"))
                .chain(view_candidates(
                    component_dir(root.join(VIEWS_DIR)),
                    "Default",
                ))
                .chain(area_dirs(root).into_iter().flat_map(|area| {
                    view_candidates(component_dir(area.join(VIEWS_DIR)), "Default")
                })),
        )
    })
}

/// Resolve a view component's class file by the `ViewComponents` convention.
pub fn resolve_component_class(roots: &[PathBuf], name: &str) -> Option<PathBuf> {
    first_existing(roots.iter().map(|root| {
        root.join("ViewComponents")
            .join(format!("{name}ViewComponent.{SOURCE_EXTENSION}"))
    }))
}

fn action_decl_regex(action: &str) -> Option<Regex> {
    Regex::new(&format!(
        r"(?i)(?:public|private|protected|internal)?\s*(?:async\s+)?(?:Task<)?(?:IActionResult|ActionResult)(?:<[^>]+>)?>?\s+{}\s*\([^)]*\)",
        regex::escape(action)
    ))
    .ok()
}

/// Locate the 1-based line of an action method declaration: a method with an
/// action-result-shaped return (tolerating access modifiers, `async`, and a
/// generic wrapper) named `action`, with a parameter list.
pub fn locate_action_line(controller_path: &Path, action: &str) -> Option<u32> {
    let content = std::fs::read_to_string(controller_path).ok()?;
    let decl = action_decl_regex(action)?;

    content
        .lines()
        .position(|line| decl.is_match(line))
        .map(|i| i as u32 + 1)
}

/// How many lines above a declaration a verb attribute may sit.
const VERB_ATTRIBUTE_WINDOW: usize = 5;

/// Like [`locate_action_line`], but when an overload set repeats the action
/// name for different HTTP verbs, prefer the declaration carrying an
/// `Http<verb>` attribute within a few lines above it; fall back to the first
/// unqualified match when no candidate carries the marker.
pub fn locate_action_line_with_verb(
    controller_path: &Path,
    action: &str,
    verb: &str,
) -> Option<u32> {
    let content = std::fs::read_to_string(controller_path).ok()?;
    let decl = action_decl_regex(action)?;
    let marker = Regex::new(&format!(r"(?i)Http{}", regex::escape(verb))).ok()?;

    let lines: Vec<&str> = content.lines().collect();
    let mut fallback = None;

    for (i, line) in lines.iter().enumerate() {
        if !decl.is_match(line) {
            continue;
        }
        let window_start = i.saturating_sub(VERB_ATTRIBUTE_WINDOW);
        if lines[window_start..i].iter().any(|above| marker.is_match(above)) {
            return Some(i as u32 + 1);
        }
        if fallback.is_none() {
            fallback = Some(i as u32 + 1);
        }
    }

    fallback
}

/// Locate the 1-based line declaring `class <type_name>`.
pub fn locate_class_line(path: &Path, type_name: &str) -> Option<u32> {
    let content = std::fs::read_to_string(path).ok()?;
    let decl = Regex::new(&format!(r"\bclass\s+{}\b", regex::escape(type_name))).ok()?;

    content
        .lines()
        .position(|line| decl.is_match(line))
        .map(|i| i as u32 + 1)
}

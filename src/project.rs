//! Project topology: where the MVC project roots are, and which area a file
//! belongs to.
//!
//! Roots are recomputed per referencing file; the walk is a handful of
//! directory probes and needs no persistent state.

use std::path::{Component, Path, PathBuf};

use itertools::Itertools;
use walkdir::WalkDir;

/// Directories the framework resolves against by convention.
pub const VIEWS_DIR: &str = "Views";
pub const CONTROLLERS_DIR: &str = "Controllers";
pub const AREAS_DIR: &str = "Areas";
pub const SHARED_DIR: &str = "Shared";

/// Walk upward from the referencing file's directory and collect every MVC
/// project root, nearest first, testing the workspace root itself last. A
/// workspace with no recognizable root degrades to the workspace root rather
/// than failing.
pub fn find_project_roots(workspace_root: &Path, referencing_file: &Path) -> Vec<PathBuf> {
    let mut roots = Vec::new();

    let mut current = referencing_file.parent();
    while let Some(dir) = current {
        if dir == workspace_root {
            break;
        }
        if is_project_root(dir) {
            roots.push(dir.to_path_buf());
        }
        current = dir.parent();
    }

    if is_project_root(workspace_root) {
        roots.push(workspace_root.to_path_buf());
    }

    if roots.is_empty() {
        roots.push(workspace_root.to_path_buf());
    }

    roots
}

/// A directory is an MVC project root when it has a views or controllers
/// directory and at least one other project marker: a `*.csproj` manifest,
/// `Program.cs`, `Startup.cs`, or a `wwwroot` static-assets directory.
pub fn is_project_root(dir: &Path) -> bool {
    let has_views = dir.join(VIEWS_DIR).is_dir();
    let has_controllers = dir.join(CONTROLLERS_DIR).is_dir();
    if !has_views && !has_controllers {
        return false;
    }

    let has_manifest = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .flatten()
        .any(|entry| {
            entry
                .path()
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("csproj"))
        });

    has_manifest
        || dir.join("Program.cs").is_file()
        || dir.join("Startup.cs").is_file()
        || dir.join("wwwroot").is_dir()
}

fn path_segments(path: &Path) -> Vec<&str> {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(seg) => seg.to_str(),
            _ => None,
        })
        .collect_vec()
}

/// The area a controller file belongs to: the segment between `Areas` and
/// `Controllers` in `.../Areas/<Name>/Controllers/...`. Only the first such
/// occurrence (closest to the filesystem root) counts.
pub fn detect_area(controller_path: &Path) -> Option<String> {
    let segments = path_segments(controller_path);
    segments.windows(3).find_map(|window| match window {
        [areas, name, controllers]
            if areas.eq_ignore_ascii_case(AREAS_DIR)
                && controllers.eq_ignore_ascii_case(CONTROLLERS_DIR) =>
        {
            Some((*name).to_string())
        }
        _ => None,
    })
}

/// The area a view file belongs to: `.../Areas/<Name>/Views/...`.
pub fn detect_area_for_view(view_path: &Path) -> Option<String> {
    let segments = path_segments(view_path);
    segments.windows(3).find_map(|window| match window {
        [areas, name, views]
            if areas.eq_ignore_ascii_case(AREAS_DIR) && views.eq_ignore_ascii_case(VIEWS_DIR) =>
        {
            Some((*name).to_string())
        }
        _ => None,
    })
}

/// The controller a C# file declares, by file-name convention:
/// `HomeController.cs` -> `Home`.
pub fn controller_name_from_path(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    Some(stem.strip_suffix("Controller").unwrap_or(stem).to_string())
}

/// The controller a view belongs to: the folder segment directly after the
/// innermost `Views`.
pub fn controller_name_from_view_path(view_path: &Path) -> Option<String> {
    let segments = path_segments(view_path);
    segments.windows(2).rev().find_map(|window| match window {
        [views, owner] if views.eq_ignore_ascii_case(VIEWS_DIR) => Some((*owner).to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{touch, ProjectFixture};

    #[test]
    fn detect_area_finds_controller_area() {
        let path = Path::new("/ws/app/Areas/Admin/Controllers/UsersController.cs");
        assert_eq!(detect_area(path).as_deref(), Some("Admin"));
    }

    #[test]
    fn detect_area_ignores_non_area_controllers() {
        let path = Path::new("/ws/app/Controllers/HomeController.cs");
        assert_eq!(detect_area(path), None);
    }

    #[test]
    fn detect_area_uses_first_occurrence_when_nested() {
        let path =
            Path::new("/ws/Areas/Outer/Controllers/Areas/Inner/Controllers/XController.cs");
        assert_eq!(detect_area(path).as_deref(), Some("Outer"));
    }

    #[test]
    fn detect_area_for_view_reads_the_views_shape() {
        let path = Path::new("/ws/app/Areas/Catalog/Views/Products/Index.cshtml");
        assert_eq!(detect_area_for_view(path).as_deref(), Some("Catalog"));
        assert_eq!(detect_area(path), None);
    }

    #[test]
    fn controller_name_strips_suffix() {
        assert_eq!(
            controller_name_from_path(Path::new("/x/Controllers/HomeController.cs")).as_deref(),
            Some("Home")
        );
        assert_eq!(
            controller_name_from_path(Path::new("/x/Helpers.cs")).as_deref(),
            Some("Helpers")
        );
    }

    #[test]
    fn controller_name_from_view_path_reads_owner_folder() {
        assert_eq!(
            controller_name_from_view_path(Path::new("/ws/Views/Home/About.cshtml")).as_deref(),
            Some("Home")
        );
        assert_eq!(
            controller_name_from_view_path(Path::new(
                "/ws/Areas/Admin/Views/Users/Index.cshtml"
            ))
            .as_deref(),
            Some("Users")
        );
    }

    #[test]
    fn project_root_requires_views_or_controllers_plus_marker() {
        let fixture = ProjectFixture::new();
        let root = fixture.root();

        std::fs::create_dir_all(root.join("Views")).unwrap();
        assert!(!is_project_root(root), "views alone is not enough");

        touch(&root.join("Program.cs"));
        assert!(is_project_root(root));
    }

    #[test]
    fn csproj_manifest_counts_as_marker() {
        let fixture = ProjectFixture::new();
        let root = fixture.root();
        std::fs::create_dir_all(root.join("Controllers")).unwrap();
        touch(&root.join("App.csproj"));
        assert!(is_project_root(root));
    }

    #[test]
    fn roots_come_back_nearest_first() {
        let fixture = ProjectFixture::new();
        let workspace = fixture.root();

        // Workspace root is itself a project, and so is a nested project.
        std::fs::create_dir_all(workspace.join("Views")).unwrap();
        touch(&workspace.join("Outer.csproj"));

        let nested = workspace.join("Project1");
        std::fs::create_dir_all(nested.join("Controllers")).unwrap();
        touch(&nested.join("Inner.csproj"));

        let referencing = nested.join("Controllers/HomeController.cs");
        touch(&referencing);

        let roots = find_project_roots(workspace, &referencing);
        assert_eq!(roots, vec![nested, workspace.to_path_buf()]);
    }

    #[test]
    fn falls_back_to_workspace_root_when_nothing_matches() {
        let fixture = ProjectFixture::new();
        let workspace = fixture.root();
        let referencing = workspace.join("src/deep/File.cs");
        std::fs::create_dir_all(referencing.parent().unwrap()).unwrap();
        touch(&referencing);

        let roots = find_project_roots(workspace, &referencing);
        assert_eq!(roots, vec![workspace.to_path_buf()]);
    }
}

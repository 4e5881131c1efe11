//! Shared test utilities.
//!
//! Fixture builders that lay miniature MVC project trees out under a
//! temporary directory. Only compiled for test builds.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A temporary workspace directory for resolution tests.
///
/// Keep the fixture alive for the duration of the test; dropping it removes
/// the tree.
pub struct ProjectFixture {
    _temp: TempDir,
    root: PathBuf,
}

impl ProjectFixture {
    /// An empty workspace (non-hidden subdirectory of a TempDir, so path
    /// walks behave the same as in a real checkout).
    pub fn new() -> ProjectFixture {
        let temp = TempDir::new().expect("failed to create temp directory");
        let root = temp.path().join("workspace");
        fs::create_dir(&root).expect("failed to create workspace subdirectory");
        ProjectFixture { _temp: temp, root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Join a workspace-relative path.
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }
}

/// Create an empty file, creating parent directories as needed.
pub fn touch(path: &Path) {
    write_file(path, "");
}

/// Write a file, creating parent directories as needed.
pub fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("failed to create fixture directories");
    }
    fs::write(path, content).expect("failed to write fixture file");
}

/// Source of the fixture `HomeController`, shaped like the real thing:
/// parameterless and named `View` calls, an async action with a generic
/// action-result wrapper, and a `Create` overload pair split across GET and
/// POST.
pub const HOME_CONTROLLER_SOURCE: &str = r#"using Microsoft.AspNetCore.Mvc;

namespace SampleApp.Controllers
{
    public class HomeController : Controller
    {
        public IActionResult Index()
        {
            return View();
        }

        public IActionResult About()
        {
            return View("About");
        }

        public async Task<ActionResult<ProductDto>> Details(int id)
        {
            var model = await LoadProduct(id);
            return View(model);
        }

        [HttpGet]
        public IActionResult Create()
        {
            return View();
        }

        [HttpPost]
        public IActionResult Create(ProductForm form)
        {
            return RedirectToAction("Index");
        }
    }
}
"#;

/// Source of the fixture area controller.
pub const USERS_CONTROLLER_SOURCE: &str = r#"using Microsoft.AspNetCore.Mvc;

namespace SampleApp.Areas.Admin.Controllers
{
    [Area("Admin")]
    public class UsersController : Controller
    {
        public IActionResult Index()
        {
            return View();
        }
    }
}
"#;

/// Build the standard fixture project: one root project with controllers,
/// views, a shared folder, an Admin area, and a view component.
///
/// ```text
/// workspace/
/// ├── App.csproj
/// ├── Program.cs
/// ├── Controllers/
/// │   ├── HomeController.cs
/// │   └── ProductsController.cs
/// ├── Views/
/// │   ├── Home/{Index,About}.cshtml
/// │   ├── Products/Details.razor
/// │   └── Shared/{_Layout,_ProductCard,Error}.cshtml
/// │       └── Components/NavigationMenu/Default.cshtml
/// ├── Areas/Admin/
/// │   ├── Controllers/UsersController.cs
/// │   └── Views/{Users/Index,Shared/_AdminPanel}.cshtml
/// └── ViewComponents/NavigationMenuViewComponent.cs
/// ```
pub fn standard_project_fixture() -> ProjectFixture {
    let fixture = ProjectFixture::new();
    let root = fixture.root();

    touch(&root.join("App.csproj"));
    touch(&root.join("Program.cs"));

    write_file(
        &root.join("Controllers/HomeController.cs"),
        HOME_CONTROLLER_SOURCE,
    );
    write_file(
        &root.join("Controllers/ProductsController.cs"),
        "using Microsoft.AspNetCore.Mvc;\n\npublic class ProductsController : Controller\n{\n    public IActionResult Details(int id)\n    {\n        return View();\n    }\n}\n",
    );

    touch(&root.join("Views/Home/Index.cshtml"));
    touch(&root.join("Views/Home/About.cshtml"));
    touch(&root.join("Views/Products/Details.razor"));
    touch(&root.join("Views/Shared/_Layout.cshtml"));
    touch(&root.join("Views/Shared/_ProductCard.cshtml"));
    touch(&root.join("Views/Shared/Error.cshtml"));
    touch(&root.join("Views/Shared/Components/NavigationMenu/Default.cshtml"));

    write_file(
        &root.join("Areas/Admin/Controllers/UsersController.cs"),
        USERS_CONTROLLER_SOURCE,
    );
    touch(&root.join("Areas/Admin/Views/Users/Index.cshtml"));
    touch(&root.join("Areas/Admin/Views/Shared/_AdminPanel.cshtml"));

    touch(&root.join("ViewComponents/NavigationMenuViewComponent.cs"));

    fixture
}

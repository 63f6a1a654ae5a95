use std::fmt;

use crate::loading::Readiness;

/// Every view the application can show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    About,
    Projects,
    Skills,
    Experience,
    Education,
    Certifications,
    Contact,
    AdminLogin,
    AdminDashboard,
    /// Catch-all; keeps the requested path.
    NotFound(String),
}

impl Route {
    /// Resolves a path. Query strings, fragments and a trailing slash are ignored.
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => Route::Home,
            "/about" => Route::About,
            "/projects" => Route::Projects,
            "/skills" => Route::Skills,
            "/experience" => Route::Experience,
            "/education" => Route::Education,
            "/certifications" => Route::Certifications,
            "/contact" => Route::Contact,
            "/admin/login" => Route::AdminLogin,
            "/admin/dashboard" => Route::AdminDashboard,
            _ => Route::NotFound(path.to_string()),
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Route::Home => "/",
            Route::About => "/about",
            Route::Projects => "/projects",
            Route::Skills => "/skills",
            Route::Experience => "/experience",
            Route::Education => "/education",
            Route::Certifications => "/certifications",
            Route::Contact => "/contact",
            Route::AdminLogin => "/admin/login",
            Route::AdminDashboard => "/admin/dashboard",
            Route::NotFound(path) => path,
        }
    }

    /// Requires an authenticated admin.
    pub fn is_protected(&self) -> bool {
        matches!(self, Route::AdminDashboard)
    }

    /// Views that fetch content before they are worth showing.
    pub fn readiness(&self) -> Readiness {
        match self {
            Route::Home
            | Route::About
            | Route::Projects
            | Route::Skills
            | Route::Experience
            | Route::Education
            | Route::Certifications
            | Route::AdminDashboard => Readiness::Tracked,
            Route::Contact | Route::AdminLogin | Route::NotFound(_) => Readiness::Untracked,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

// Navigation Service
// Sidebar entries and route resolution for the blog front end

use serde::Serialize;

use crate::models::CategoryDto;

pub const LOGIN_PATH: &str = "/console/login";
pub const DASHBOARD_PATH: &str = "/console/dashboard";
const CONSULTING_LABEL: &str = "咨询空间";
const UNNAMED_CATEGORY: &str = "未命名分类";

/// Categories with fixed top-level routes (`/<slug>` and `/<slug>/<post>`)
const FIXED_CATEGORY_ROUTES: &[&str] = &["blog", "my-shares", "creations"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NavSection {
    Main,
    Console,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavItem {
    pub label: String,
    pub to: String,
    pub section: NavSection,
    pub active: bool,
}

impl NavItem {
    fn new(label: &str, to: String, section: NavSection, current_path: &str) -> Self {
        let active = to == current_path;
        Self {
            label: label.to_string(),
            to,
            section,
            active,
        }
    }
}

/// Build the sidebar: Home, one entry per usable category, the consulting
/// page, and the console links when logged in on a console route.
pub fn sidebar_items(categories: &[CategoryDto], logged_in: bool, current_path: &str) -> Vec<NavItem> {
    let mut items = vec![NavItem::new("Home", "/".to_string(), NavSection::Main, current_path)];

    items.extend(
        categories
            .iter()
            .filter(|category| category.is_navigable())
            .map(|category| {
                NavItem::new(
                    &category.name,
                    category_path(&category.slug),
                    NavSection::Main,
                    current_path,
                )
            }),
    );

    items.push(NavItem::new(
        CONSULTING_LABEL,
        "/consulting".to_string(),
        NavSection::Main,
        current_path,
    ));

    if logged_in && current_path.contains("/console") {
        items.push(NavItem::new("Login", LOGIN_PATH.to_string(), NavSection::Console, current_path));
        items.push(NavItem::new(
            "Dashboard",
            DASHBOARD_PATH.to_string(),
            NavSection::Console,
            current_path,
        ));
    }

    items
}

pub fn category_path(slug: &str) -> String {
    format!("/category/{}", urlencoding::encode(slug))
}

/// Heading for a category list page
pub fn category_title(slug: &str) -> String {
    if is_placeholder_slug(slug) {
        return UNNAMED_CATEGORY.to_string();
    }
    decode_segment(slug)
}

fn is_placeholder_slug(slug: &str) -> bool {
    slug.is_empty() || slug == "null" || slug == "undefined"
}

fn decode_segment(segment: &str) -> String {
    urlencoding::decode(segment)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Route {
    Home,
    /// `slug` is None for placeholder slugs, which render an empty list
    CategoryList { slug: Option<String> },
    PostDetail { category: String, slug: String },
    Page { slug: String },
    Consulting,
    Login,
    Dashboard,
    Redirect { to: String },
    NotFound,
}

/// Map a path to the page it renders. The dashboard is guarded by login.
pub fn resolve_route(path: &str, logged_in: bool) -> Route {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    match segments.as_slice() {
        [] => Route::Home,
        ["consulting"] => Route::Consulting,
        ["console", "login"] => Route::Login,
        ["console", "dashboard"] => {
            if logged_in {
                Route::Dashboard
            } else {
                Route::Redirect {
                    to: LOGIN_PATH.to_string(),
                }
            }
        }
        ["category", slug] => Route::CategoryList {
            slug: category_slug(slug),
        },
        ["page", slug] => Route::Page {
            slug: decode_segment(slug),
        },
        [category] if FIXED_CATEGORY_ROUTES.contains(category) => Route::CategoryList {
            slug: Some(category.to_string()),
        },
        [category, slug] if FIXED_CATEGORY_ROUTES.contains(category) => Route::PostDetail {
            category: category.to_string(),
            slug: decode_segment(slug),
        },
        _ => Route::NotFound,
    }
}

fn category_slug(raw: &str) -> Option<String> {
    if is_placeholder_slug(raw) {
        None
    } else {
        Some(decode_segment(raw))
    }
}

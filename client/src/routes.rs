//! Named client routes and path matching.
//!
//! SYSTEM CONTEXT
//! ==============
//! The navigation guard needs to know, for any requested path, which named
//! route it is and whether that route requires a session. Unknown paths fall
//! back to the prompt list.

#[cfg(test)]
#[path = "routes_test.rs"]
mod routes_test;

pub const LOGIN_ROUTE: &str = "login";
pub const LOGIN_PATH: &str = "/login";
pub const FALLBACK_PATH: &str = "/";
pub const REDIRECT_QUERY_KEY: &str = "redirect";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Route {
    pub name: &'static str,
    /// Pattern with `:param` segments.
    pub path: &'static str,
    pub title: &'static str,
    pub requires_auth: bool,
}

const fn protected(name: &'static str, path: &'static str, title: &'static str) -> Route {
    Route { name, path, title, requires_auth: true }
}

pub static ROUTES: &[Route] = &[
    protected("prompt-management", "/", "Prompts"),
    protected("prompt-detail", "/prompts/:id", "Prompt detail"),
    protected("prompt-version-compare", "/prompts/:id/versions/compare", "Compare versions"),
    protected("prompt-version-create", "/prompts/:id/versions/new", "New version"),
    protected("prompt-test-create", "/prompts/:id/tests/new", "New test"),
    protected("quick-test", "/tests/quick", "Quick test"),
    protected("test-job-management", "/tests/jobs", "Test jobs"),
    protected("test-job-create", "/tests/jobs/new", "New test job"),
    protected("prompt-test-task-create", "/tests/tasks/new", "New test task"),
    protected("prompt-test-task-result", "/tests/tasks/:taskId/result", "Test task result"),
    protected("prompt-test-unit-result", "/tests/tasks/:taskId/units/:unitId", "Test unit detail"),
    protected("test-job-result", "/tests/jobs/:id", "Test result"),
    protected("class-management", "/classes", "Classes"),
    protected("tag-management", "/tags", "Tags"),
    protected("llm-management", "/llms", "LLMs"),
    protected("usage-management", "/usage", "Usage"),
    protected("user-management", "/users", "Users"),
    Route { name: LOGIN_ROUTE, path: LOGIN_PATH, title: "Sign in", requires_auth: false },
];

/// A requested location resolved against [`ROUTES`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteMatch {
    pub route: &'static Route,
    pub params: Vec<(&'static str, String)>,
    /// Path plus query/fragment exactly as requested.
    pub full_path: String,
}

impl RouteMatch {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.iter().find(|(key, _)| *key == name).map(|(_, value)| value.as_str())
    }
}

/// The path part of a location, without query or fragment.
pub fn path_of(full_path: &str) -> &str {
    let end = full_path.find(['?', '#']).unwrap_or(full_path.len());
    &full_path[..end]
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|segment| !segment.is_empty()).collect()
}

fn match_pattern(pattern: &'static str, path: &str) -> Option<Vec<(&'static str, String)>> {
    let wanted = segments(pattern);
    let given = segments(path);
    if wanted.len() != given.len() {
        return None;
    }
    let mut params = Vec::new();
    for (want, got) in wanted.into_iter().zip(given) {
        if let Some(name) = want.strip_prefix(':') {
            params.push((name, got.to_owned()));
        } else if want != got {
            return None;
        }
    }
    Some(params)
}

/// Resolve `full_path` to a named route. `None` for unknown paths.
pub fn resolve(full_path: &str) -> Option<RouteMatch> {
    let path = path_of(full_path);
    ROUTES.iter().find_map(|route| {
        match_pattern(route.path, path).map(|params| RouteMatch { route, params, full_path: full_path.to_owned() })
    })
}

pub fn by_name(name: &str) -> Option<&'static Route> {
    ROUTES.iter().find(|route| route.name == name)
}

/// `/login?redirect=<full_path>`.
pub fn login_location(redirect_to: &str) -> String {
    format!("{LOGIN_PATH}?{REDIRECT_QUERY_KEY}={}", urlencoding::encode(redirect_to))
}

/// The `redirect` query value of a login location, decoded.
pub fn redirect_target(full_path: &str) -> Option<String> {
    let query = full_path.split_once('?')?.1;
    let query = query.split('#').next().unwrap_or(query);
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == REDIRECT_QUERY_KEY)
        .and_then(|(_, value)| urlencoding::decode(value).ok())
        .map(|value| value.into_owned())
}

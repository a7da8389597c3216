//! Path resolution under the route guard

use serde::Serialize;

use haoc_session::Session;

use crate::guard::{evaluate, Decision};
use crate::route::{Params, RouteTable};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Navigation {
    /// Show the page for `route` (its pattern)
    Render { route: String, params: Params },
    Redirect(String),
    /// Session still settling; show a spinner and re-evaluate
    Loading,
    NotFound,
}

#[derive(Debug, Clone)]
pub struct Navigator {
    routes: RouteTable,
}

impl Navigator {
    pub fn new(routes: RouteTable) -> Self {
        Self { routes }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn navigate(&self, path: &str, session: &Session) -> Navigation {
        let (route, params) = match self.routes.resolve(path) {
            Ok(Some(found)) => found,
            Ok(None) => return Navigation::NotFound,
            Err(e) => {
                tracing::debug!(path, error = %e, "Unroutable path");
                return Navigation::NotFound;
            }
        };

        let decision = match route.access().guard() {
            Some(required) => evaluate(session, required),
            None => Decision::Allow,
        };

        match decision {
            Decision::Allow => Navigation::Render {
                route: route.pattern().to_string(),
                params,
            },
            Decision::ShowLoading => Navigation::Loading,
            Decision::RedirectToLogin | Decision::RedirectToUnauthorized => {
                let target = decision.redirect_path().unwrap_or("/");
                tracing::debug!(path, target, "Guard redirect");
                Navigation::Redirect(target.to_string())
            }
        }
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(RouteTable::marketplace())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use haoc_session::User;
    use serde_json::json;

    fn session_for(role: &str) -> Session {
        let user: User = serde_json::from_value(json!({ "_id": "u-1", "role": role })).unwrap();
        Session {
            user: Some(user),
            access_token: Some("token".to_string()),
            is_authenticated: true,
            ..Session::default()
        }
    }

    fn render(route: &str, params: &[(&str, &str)]) -> Navigation {
        Navigation::Render {
            route: route.to_string(),
            params: params
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_public_pages_ignore_session() {
        let navigator = Navigator::default();
        let loading = Session {
            loading: true,
            ..Session::default()
        };

        assert_eq!(navigator.navigate("/", &Session::default()), render("/", &[]));
        assert_eq!(
            navigator.navigate("/blogs/9", &loading),
            render("/blogs/:id", &[("id", "9")])
        );
    }

    #[test]
    fn test_signed_in_pages() {
        let navigator = Navigator::default();

        assert_eq!(
            navigator.navigate("/user/dashboard", &Session::default()),
            Navigation::Redirect("/login".to_string())
        );
        assert_eq!(
            navigator.navigate("/booking/b-1", &session_for("Agent")),
            render("/booking/:id", &[("id", "b-1")])
        );
    }

    #[test]
    fn test_role_pages() {
        let navigator = Navigator::default();

        assert_eq!(
            navigator.navigate("/admin/users", &session_for("User")),
            Navigation::Redirect("/unauthorized".to_string())
        );
        assert_eq!(
            navigator.navigate("/agent/dashboard", &session_for("Admin")),
            Navigation::Redirect("/unauthorized".to_string())
        );
        assert_eq!(
            navigator.navigate("/admin/properties/view/p-3", &session_for("Admin")),
            render("/admin/properties/view/:id", &[("id", "p-3")])
        );
    }

    #[test]
    fn test_loading_and_not_found() {
        let navigator = Navigator::default();
        let mut session = session_for("Admin");
        session.loading = true;

        assert_eq!(navigator.navigate("/admin/settings", &session), Navigation::Loading);
        assert_eq!(navigator.navigate("/nope", &session), Navigation::NotFound);
        assert_eq!(navigator.navigate("relative", &session), Navigation::NotFound);
    }
}

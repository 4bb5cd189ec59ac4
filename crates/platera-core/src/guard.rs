//! Route access decisions for protected screens.

use platera_types::Role;
use url::form_urlencoded;

use crate::session::AuthState;

pub const STAFF_LOGIN: &str = "/staff-login";
pub const MANAGER_LOGIN: &str = "/manager-login";
pub const STAFF_DASHBOARD: &str = "/staff/dashboard";
pub const ADMIN_DASHBOARD: &str = "/admin/dashboard";
pub const HOME: &str = "/";

/// Path and query string of the screen being opened.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    pub path: String,
    /// Query string including the leading `?`, or empty
    pub search: String,
}

impl Location {
    pub fn new(path: impl Into<String>, search: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            search: search.into(),
        }
    }

    /// Splits `"/admin/orders?status=OPEN"` into path and search.
    pub fn parse(target: &str) -> Self {
        match target.find('?') {
            Some(index) => Self::new(&target[..index], &target[index..]),
            None => Self::new(target, ""),
        }
    }

    fn is_login_screen(&self) -> bool {
        self.path == STAFF_LOGIN || self.path == MANAGER_LOGIN
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session still loading; show a placeholder.
    Wait,
    Redirect {
        to: String,
    },
    Render,
}

/// Screen a signed-in user lands on when a route is not for their role.
pub fn landing_path(role: Role) -> &'static str {
    match role {
        Role::Staff => STAFF_DASHBOARD,
        Role::Admin | Role::Manager => ADMIN_DASHBOARD,
        Role::Customer | Role::Unknown => HOME,
    }
}

/// Login screen for `location`, with a `redirect` back to it.
pub fn login_path(location: &Location) -> String {
    let screen = if location.path.starts_with("/staff") {
        STAFF_LOGIN
    } else {
        MANAGER_LOGIN
    };
    if location.is_login_screen() {
        return screen.to_string();
    }
    let target = format!("{}{}", location.path, location.search);
    format!("{screen}?redirect={}", encode_component(&target))
}

/// Percent-encodes like `encodeURIComponent`: unreserved marks `-_.!~*'()`
/// stay literal, spaces become `%20`.
fn encode_component(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
        .replace("%21", "!")
        .replace("%27", "'")
        .replace("%28", "(")
        .replace("%29", ")")
        .replace("%7E", "~")
}

/// Decides whether `location` may render for `state`.
///
/// An empty `required` list admits any signed-in user.
pub fn guard(required: &[Role], state: &AuthState, location: &Location) -> GuardDecision {
    if state.loading {
        return GuardDecision::Wait;
    }
    if !state.is_authenticated {
        tracing::debug!(path = %location.path, "not authenticated, redirecting to login");
        return GuardDecision::Redirect {
            to: login_path(location),
        };
    }
    if !required.is_empty() && !required.contains(&state.role) {
        tracing::debug!(
            path = %location.path,
            role = %state.role,
            "role not permitted, redirecting to landing screen"
        );
        return GuardDecision::Redirect {
            to: landing_path(state.role).to_string(),
        };
    }
    GuardDecision::Render
}

#[cfg(test)]
mod tests {
    use platera_types::UserProfile;

    use super::*;

    fn state(role: Option<Role>, loading: bool) -> AuthState {
        let user = role.map(|role| UserProfile {
            id: 1,
            username: "u".into(),
            email: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            role,
            is_staff: None,
            is_superuser: None,
            phone_number: None,
            staff_id: None,
        });
        let role = role.unwrap_or_default();
        AuthState {
            is_authenticated: user.is_some(),
            is_manager: role.is_manager(),
            is_admin: role.is_admin(),
            role,
            loading,
            user,
        }
    }

    #[test]
    fn test_loading_waits() {
        let decision = guard(&[], &state(None, true), &Location::parse("/admin/menu"));
        assert_eq!(decision, GuardDecision::Wait);
    }

    #[test]
    fn test_unauthenticated_staff_path_goes_to_staff_login() {
        let decision = guard(
            &[Role::Staff],
            &state(None, false),
            &Location::parse("/staff/orders?table=4"),
        );
        assert_eq!(
            decision,
            GuardDecision::Redirect {
                to: "/staff-login?redirect=%2Fstaff%2Forders%3Ftable%3D4".into()
            }
        );
    }

    #[test]
    fn test_redirect_keeps_unreserved_marks() {
        assert_eq!(
            login_path(&Location::parse("/staff/notes/a~b(1)!?q=it's here")),
            "/staff-login?redirect=%2Fstaff%2Fnotes%2Fa~b(1)!%3Fq%3Dit's%20here"
        );
        assert_eq!(
            encode_component("menu+specials/caf\u{e9}"),
            "menu%2Bspecials%2Fcaf%C3%A9"
        );
    }

    #[test]
    fn test_unauthenticated_admin_path_goes_to_manager_login() {
        let decision = guard(&[], &state(None, false), &Location::parse("/admin/reports"));
        assert_eq!(
            decision,
            GuardDecision::Redirect {
                to: "/manager-login?redirect=%2Fadmin%2Freports".into()
            }
        );
    }

    #[test]
    fn test_login_screens_get_no_redirect_param() {
        let unauth = state(None, false);
        assert_eq!(
            guard(&[], &unauth, &Location::parse("/staff-login")),
            GuardDecision::Redirect {
                to: STAFF_LOGIN.into()
            }
        );
        assert_eq!(
            guard(&[], &unauth, &Location::parse("/manager-login?x=1")),
            GuardDecision::Redirect {
                to: MANAGER_LOGIN.into()
            }
        );
    }

    #[test]
    fn test_wrong_role_lands_on_role_dashboard() {
        let loc = Location::parse("/admin/settings");
        assert_eq!(
            guard(&[Role::Admin], &state(Some(Role::Staff), false), &loc),
            GuardDecision::Redirect {
                to: STAFF_DASHBOARD.into()
            }
        );
        assert_eq!(
            guard(&[Role::Admin], &state(Some(Role::Manager), false), &loc),
            GuardDecision::Redirect {
                to: ADMIN_DASHBOARD.into()
            }
        );
        assert_eq!(
            guard(&[Role::Staff], &state(Some(Role::Customer), false), &loc),
            GuardDecision::Redirect { to: HOME.into() }
        );
    }

    #[test]
    fn test_permitted_role_renders() {
        let loc = Location::parse("/admin/menu");
        let admin = state(Some(Role::Admin), false);
        assert_eq!(guard(&[], &admin, &loc), GuardDecision::Render);
        assert_eq!(
            guard(&[Role::Admin, Role::Manager], &admin, &loc),
            GuardDecision::Render
        );
    }

    #[test]
    fn test_encode_component_matches_uri_encoding() {
        assert_eq!(encode_component("/a b+c"), "%2Fa%20b%2Bc");
    }
}

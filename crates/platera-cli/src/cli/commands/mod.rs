//! CLI command handlers.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use platera_core::config::Config;
use platera_core::guard::{self, GuardDecision, Location};
use platera_core::{ApiClient, AuthState, FileStore, Session};
use platera_types::Role;

pub mod auth;
pub mod config;
pub mod menu;
pub mod orders;
pub mod staff;
pub mod tables;

/// Connected client state shared by the API-backed commands.
pub struct App {
    pub session: Session,
    pub store_path: PathBuf,
}

impl App {
    /// Opens the session file under `PLATERA_HOME` and builds the client.
    pub fn connect(config: &Config) -> Result<Self> {
        let store = Arc::new(FileStore::open_default());
        let store_path = store.path().to_path_buf();
        let client = ApiClient::from_config(config, store).context("build API client")?;
        tracing::debug!(base_url = %client.base_url(), "connected");
        Ok(Self {
            session: Session::new(client),
            store_path,
        })
    }

    pub fn client(&self) -> &ApiClient {
        self.session.client()
    }

    /// Restores the stored session and checks it may use `route`.
    ///
    /// `route` is the dashboard screen the command stands in for; an empty
    /// `required` list admits any signed-in account.
    pub async fn authorize(&self, required: &[Role], route: &str) -> Result<AuthState> {
        let state = self.session.hydrate().await;
        match guard::guard(required, &state, &Location::parse(route)) {
            GuardDecision::Render => Ok(state),
            GuardDecision::Redirect { to } if !state.is_authenticated => {
                let hint = if to.starts_with(guard::STAFF_LOGIN) {
                    "platera login --staff <EMPLOYEE_ID>"
                } else {
                    "platera login --manager"
                };
                anyhow::bail!("Not logged in. Run `{hint}` first.")
            }
            GuardDecision::Redirect { .. } => {
                let allowed: Vec<&str> = required.iter().map(Role::label).collect();
                anyhow::bail!(
                    "This command requires one of: {} (signed in as {}).",
                    allowed.join(", "),
                    state.role.label()
                )
            }
            GuardDecision::Wait => anyhow::bail!("Session is still loading"),
        }
    }
}

/// Matches `input` against the wire ids of `choices`, ignoring case.
pub(crate) fn parse_choice<T: Copy>(
    input: &str,
    choices: &[T],
    id: impl Fn(&T) -> &'static str,
    what: &str,
) -> Result<T> {
    let input = input.trim();
    choices
        .iter()
        .find(|choice| id(*choice).eq_ignore_ascii_case(input))
        .copied()
        .ok_or_else(|| {
            let expected: Vec<String> = choices
                .iter()
                .map(|choice| id(choice).to_ascii_lowercase())
                .collect();
            anyhow::anyhow!(
                "Unknown {what} '{input}' (expected one of: {})",
                expected.join(", ")
            )
        })
}

#[cfg(test)]
mod tests {
    use platera_types::TableStatus;

    use super::*;

    const STATUSES: &[TableStatus] = &[TableStatus::Available, TableStatus::Occupied];

    #[test]
    fn test_parse_choice_ignores_case() {
        let status = parse_choice(" occupied ", STATUSES, TableStatus::id, "table status").unwrap();
        assert_eq!(status, TableStatus::Occupied);
    }

    #[test]
    fn test_parse_choice_lists_expected_values() {
        let err = parse_choice("dirty", STATUSES, TableStatus::id, "table status").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unknown table status 'dirty' (expected one of: available, occupied)"
        );
    }
}

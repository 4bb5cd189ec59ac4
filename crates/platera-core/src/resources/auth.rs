//! Sign-in endpoints and token bookkeeping.

use platera_types::{LoginResponse, Role, UserProfile};
use reqwest::Method;
use serde_json::{Value, json};

use crate::error::{ApiError, ApiResult};
use crate::http::{ApiClient, RequestBody, RequestOptions};
use crate::store::{self, keys};

pub struct AuthApi<'a> {
    pub(crate) client: &'a ApiClient,
}

impl AuthApi<'_> {
    /// Admin sign-in. Tokens and profile are persisted on success.
    pub async fn admin_login(&self, username: &str, password: &str) -> ApiResult<LoginResponse> {
        let login = self
            .login_request(
                "auth/admin/login/",
                json!({ "username": username, "password": password }),
            )
            .await?;
        self.persist(&login, Some(Role::Admin));
        Ok(login)
    }

    /// Manager sign-in (admins may use it too).
    pub async fn manager_login(
        &self,
        username: &str,
        password: &str,
    ) -> ApiResult<LoginResponse> {
        let login = self
            .login_request(
                "auth/manager/login/",
                json!({ "username": username, "password": password }),
            )
            .await?;
        self.persist(&login, Some(Role::Manager));
        Ok(login)
    }

    /// Staff sign-in by employee ID.
    ///
    /// When the response carries no profile, it is fetched from `auth/me/`;
    /// failure to fetch it does not fail the login.
    pub async fn staff_login(&self, employee_id: &str) -> ApiResult<LoginResponse> {
        let employee_id = employee_id.trim();
        if employee_id.is_empty() {
            return Err(ApiError::invalid_request("Staff ID is required"));
        }

        let mut login = self
            .login_request(
                "auth/staff/login/",
                json!({ "employee_id": employee_id }),
            )
            .await?;
        self.persist(&login, None);

        if login.user.is_none() {
            match self.current_user().await {
                Ok(user) => {
                    store::store_user(self.client.store(), &user);
                    login.user = Some(user);
                }
                Err(err) => tracing::warn!(error = %err, "could not fetch user after staff login"),
            }
        }
        Ok(login)
    }

    async fn login_request(&self, path: &str, body: Value) -> ApiResult<LoginResponse> {
        let login: LoginResponse = self
            .client
            .request(
                Method::POST,
                path,
                RequestBody::Json(body),
                RequestOptions::new().without_refresh(),
            )
            .await?
            .json()?;
        if login.access.is_empty() {
            return Err(ApiError::decode(
                "Invalid response from server: no access token",
            ));
        }
        tracing::info!(path, "login succeeded");
        Ok(login)
    }

    fn persist(&self, login: &LoginResponse, fallback_role: Option<Role>) {
        self.client.begin_session(&login.access, &login.refresh);
        let store = self.client.store();
        let known_role = match &login.user {
            Some(user) => {
                store::store_user(store, user);
                user.role != Role::Unknown
            }
            None => false,
        };
        if !known_role && let Some(role) = fallback_role {
            store.set(keys::USER_TYPE, &role.id().to_ascii_lowercase());
        }
    }

    /// Creates an account.
    pub async fn register(&self, user: Value) -> ApiResult<Value> {
        Ok(self.client.post("auth/register/", user).await?.value())
    }

    /// Profile of the signed-in account.
    pub async fn current_user(&self) -> ApiResult<UserProfile> {
        self.client.get_json("auth/me/").await
    }

    /// Asks the server whether `token` is still valid.
    pub async fn verify_token(&self, token: &str) -> ApiResult<bool> {
        let result = self
            .client
            .request(
                Method::POST,
                "auth/token/verify/",
                RequestBody::Json(json!({ "token": token })),
                RequestOptions::new().without_refresh(),
            )
            .await;
        match result {
            Ok(_) => Ok(true),
            Err(err) if matches!(err.status, Some(400 | 401)) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Local sign-out: clears stored tokens and profile.
    pub fn logout(&self) {
        self.client.end_session();
    }
}

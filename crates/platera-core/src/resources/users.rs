//! User accounts (any role).

use platera_types::UserProfile;
use serde_json::{Value, json};

use super::item_path;
use crate::error::ApiResult;
use crate::http::{ApiClient, RequestOptions};
use crate::store;

pub struct UsersApi<'a> {
    pub(crate) client: &'a ApiClient,
}

impl UsersApi<'_> {
    pub async fn me(&self) -> ApiResult<UserProfile> {
        self.client.get_json("users/me/").await
    }

    /// Updates the signed-in profile and refreshes the cached copy.
    pub async fn update_me(&self, changes: Value) -> ApiResult<UserProfile> {
        let profile: UserProfile = self.client.patch("users/me/", changes).await?.json()?;
        store::store_user(self.client.store(), &profile);
        Ok(profile)
    }

    pub async fn change_password(&self, old_password: &str, new_password: &str) -> ApiResult<()> {
        self.client
            .post(
                "users/me/password/",
                json!({ "old_password": old_password, "new_password": new_password }),
            )
            .await?;
        Ok(())
    }

    /// Lists accounts; filters (`user_type`, `is_active`) go in `options`.
    pub async fn list(&self, options: RequestOptions) -> ApiResult<Vec<UserProfile>> {
        self.client.get_list("users/", options).await
    }

    pub async fn get(&self, id: u64) -> ApiResult<UserProfile> {
        self.client.get_json(&item_path("users", id)).await
    }
}

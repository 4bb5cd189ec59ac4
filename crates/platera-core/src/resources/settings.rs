//! Restaurant-wide settings.

use serde_json::{Value, json};

use super::item_path;
use crate::error::ApiResult;
use crate::http::ApiClient;

pub struct SettingsApi<'a> {
    pub(crate) client: &'a ApiClient,
}

impl SettingsApi<'_> {
    pub async fn get_all(&self) -> ApiResult<Value> {
        Ok(self.client.get("settings/").await?.value())
    }

    /// Partially updates settings; keys absent from `changes` are untouched.
    pub async fn update(&self, changes: Value) -> ApiResult<Value> {
        Ok(self.client.patch("settings/", changes).await?.value())
    }

    pub async fn get(&self, key: &str) -> ApiResult<Value> {
        Ok(self.client.get(&item_path("settings", key)).await?.value())
    }

    pub async fn set(&self, key: &str, value: Value) -> ApiResult<Value> {
        Ok(self
            .client
            .patch(&item_path("settings", key), json!({ "value": value }))
            .await?
            .value())
    }

    pub async fn reset_defaults(&self) -> ApiResult<Value> {
        Ok(self.client.post_empty("settings/reset/").await?.value())
    }

    pub async fn business_hours(&self) -> ApiResult<Value> {
        Ok(self.client.get("settings/business-hours/").await?.value())
    }

    pub async fn update_business_hours(&self, hours: Value) -> ApiResult<Value> {
        Ok(self
            .client
            .patch("settings/business-hours/", json!({ "hours": hours }))
            .await?
            .value())
    }
}

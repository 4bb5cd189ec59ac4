//! In-app notifications and delivery preferences.

use platera_types::Notification;
use serde_json::{Value, json};

use super::item_path;
use crate::error::ApiResult;
use crate::http::{ApiClient, RequestOptions};

const NOTIFICATIONS: &str = "notifications";

pub struct NotificationsApi<'a> {
    pub(crate) client: &'a ApiClient,
}

impl NotificationsApi<'_> {
    /// Lists notifications; `type`, `priority`, `start_date`/`end_date` go
    /// in `options`.
    pub async fn list(&self, options: RequestOptions) -> ApiResult<Vec<Notification>> {
        self.client
            .get_list(&format!("{NOTIFICATIONS}/"), options)
            .await
    }

    pub async fn get(&self, id: u64) -> ApiResult<Notification> {
        self.client.get_json(&item_path(NOTIFICATIONS, id)).await
    }

    pub async fn unread(&self) -> ApiResult<Vec<Notification>> {
        self.client
            .get_list(&format!("{NOTIFICATIONS}/unread/"), RequestOptions::new())
            .await
    }

    /// Number of unread notifications; 0 when the body has no `count`.
    pub async fn unread_count(&self) -> ApiResult<u64> {
        let body = self
            .client
            .get(&format!("{NOTIFICATIONS}/unread/count/"))
            .await?
            .value();
        Ok(body.get("count").and_then(Value::as_u64).unwrap_or(0))
    }

    pub async fn search(&self, query: &str) -> ApiResult<Vec<Notification>> {
        self.client
            .get_list(
                &format!("{NOTIFICATIONS}/search/"),
                RequestOptions::new().query("q", query),
            )
            .await
    }

    pub async fn mark_read(&self, id: u64) -> ApiResult<()> {
        self.patch_action(id, "mark-as-read").await
    }

    pub async fn mark_unread(&self, id: u64) -> ApiResult<()> {
        self.patch_action(id, "mark-as-unread").await
    }

    pub async fn archive(&self, id: u64) -> ApiResult<()> {
        self.patch_action(id, "archive").await
    }

    pub async fn unarchive(&self, id: u64) -> ApiResult<()> {
        self.patch_action(id, "unarchive").await
    }

    pub async fn mark_all_read(&self) -> ApiResult<()> {
        self.client
            .post_empty(&format!("{NOTIFICATIONS}/mark-all-as-read/"))
            .await?;
        Ok(())
    }

    pub async fn mark_many_read(&self, ids: &[u64]) -> ApiResult<()> {
        self.client
            .post(
                &format!("{NOTIFICATIONS}/mark-multiple-as-read/"),
                json!({ "ids": ids }),
            )
            .await?;
        Ok(())
    }

    pub async fn delete(&self, id: u64) -> ApiResult<()> {
        self.client.delete(&item_path(NOTIFICATIONS, id)).await?;
        Ok(())
    }

    pub async fn delete_many(&self, ids: &[u64]) -> ApiResult<()> {
        self.client
            .post(
                &format!("{NOTIFICATIONS}/delete-multiple/"),
                json!({ "ids": ids }),
            )
            .await?;
        Ok(())
    }

    pub async fn clear_all(&self) -> ApiResult<()> {
        self.client
            .post_empty(&format!("{NOTIFICATIONS}/clear-all/"))
            .await?;
        Ok(())
    }

    pub async fn preferences(&self) -> ApiResult<Value> {
        Ok(self
            .client
            .get(&format!("{NOTIFICATIONS}/preferences/"))
            .await?
            .value())
    }

    pub async fn update_preferences(&self, preferences: Value) -> ApiResult<Value> {
        Ok(self
            .client
            .patch(&format!("{NOTIFICATIONS}/preferences/"), preferences)
            .await?
            .value())
    }

    async fn patch_action(&self, id: u64, action: &str) -> ApiResult<()> {
        self.client
            .patch(&format!("{NOTIFICATIONS}/{id}/{action}/"), json!({}))
            .await?;
        Ok(())
    }
}

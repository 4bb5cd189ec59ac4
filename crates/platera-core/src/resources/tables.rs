//! Dining tables.

use chrono::{DateTime, Utc};
use platera_types::{Table, TableStatus};
use serde_json::{Value, json};

use super::item_path;
use crate::error::ApiResult;
use crate::http::{ApiClient, RequestOptions};

const TABLES: &str = "tables";

pub struct TablesApi<'a> {
    pub(crate) client: &'a ApiClient,
}

impl TablesApi<'_> {
    pub async fn list(&self, options: RequestOptions) -> ApiResult<Vec<Table>> {
        self.client.get_list(&format!("{TABLES}/"), options).await
    }

    pub async fn get(&self, id: u64) -> ApiResult<Table> {
        self.client.get_json(&item_path(TABLES, id)).await
    }

    pub async fn create(&self, table: Value) -> ApiResult<Table> {
        self.client.post(&format!("{TABLES}/"), table).await?.json()
    }

    pub async fn update(&self, id: u64, changes: Value) -> ApiResult<Table> {
        self.client
            .patch(&item_path(TABLES, id), changes)
            .await?
            .json()
    }

    pub async fn delete(&self, id: u64) -> ApiResult<()> {
        self.client.delete(&item_path(TABLES, id)).await?;
        Ok(())
    }

    /// Sets the table status, optionally linking the order now seated there.
    pub async fn update_status(
        &self,
        id: u64,
        status: TableStatus,
        order_id: Option<u64>,
    ) -> ApiResult<Value> {
        let mut body = json!({ "status": status.id() });
        if let Some(order_id) = order_id {
            body["order_id"] = json!(order_id);
        }
        Ok(self
            .client
            .patch(&format!("{TABLES}/{id}/status/"), body)
            .await?
            .value())
    }

    pub async fn by_status(&self, status: TableStatus) -> ApiResult<Vec<Table>> {
        self.list(RequestOptions::new().query("status", status.id()))
            .await
    }

    /// Tables that can seat `party_size` between `start` and `end`.
    pub async fn available(
        &self,
        party_size: u32,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ApiResult<Vec<Table>> {
        self.client
            .get_list(
                &format!("{TABLES}/available/"),
                RequestOptions::new()
                    .query("party_size", party_size)
                    .query("start_time", start.to_rfc3339())
                    .query("end_time", end.to_rfc3339()),
            )
            .await
    }

    pub async fn assign(&self, id: u64, staff_id: u64) -> ApiResult<Value> {
        Ok(self
            .client
            .patch(
                &format!("{TABLES}/{id}/assign/"),
                json!({ "staff": staff_id }),
            )
            .await?
            .value())
    }

    pub async fn clear(&self, id: u64) -> ApiResult<Value> {
        Ok(self
            .client
            .post_empty(&format!("{TABLES}/{id}/clear/"))
            .await?
            .value())
    }

    /// The open order at a table; `None` when the table has none.
    pub async fn current_order(&self, id: u64) -> ApiResult<Option<Value>> {
        let value = self
            .client
            .get(&format!("{TABLES}/{id}/current-order/"))
            .await?
            .value();
        Ok((!value.is_null()).then_some(value))
    }
}

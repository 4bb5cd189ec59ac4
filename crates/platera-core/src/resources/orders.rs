//! Orders, order items, payments and fulfilment.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use platera_types::{Order, OrderStatus};
use serde_json::{Value, json};

use super::item_path;
use crate::error::ApiResult;
use crate::form::{FilePart, FormData};
use crate::http::{ApiClient, RequestOptions};

const ORDERS: &str = "orders";

pub struct OrdersApi<'a> {
    pub(crate) client: &'a ApiClient,
}

impl OrdersApi<'_> {
    /// Lists orders; filters (`status`, `table`, `page`) go in `options`.
    pub async fn list(&self, options: RequestOptions) -> ApiResult<Vec<Order>> {
        self.client.get_list(&format!("{ORDERS}/"), options).await
    }

    pub async fn get(&self, id: u64) -> ApiResult<Order> {
        self.client.get_json(&item_path(ORDERS, id)).await
    }

    pub async fn create(&self, order: Value) -> ApiResult<Order> {
        self.client.post(&format!("{ORDERS}/"), order).await?.json()
    }

    pub async fn update(&self, id: u64, changes: Value) -> ApiResult<Order> {
        self.client
            .patch(&item_path(ORDERS, id), changes)
            .await?
            .json()
    }

    pub async fn delete(&self, id: u64) -> ApiResult<()> {
        self.client.delete(&item_path(ORDERS, id)).await?;
        Ok(())
    }

    pub async fn add_item(&self, order_id: u64, item: Value) -> ApiResult<Value> {
        Ok(self
            .client
            .post(&format!("{ORDERS}/{order_id}/items/"), item)
            .await?
            .value())
    }

    pub async fn update_item(&self, order_id: u64, item_id: u64, changes: Value) -> ApiResult<Value> {
        Ok(self
            .client
            .patch(&format!("{ORDERS}/{order_id}/items/{item_id}/"), changes)
            .await?
            .value())
    }

    pub async fn remove_item(&self, order_id: u64, item_id: u64) -> ApiResult<()> {
        self.client
            .delete(&format!("{ORDERS}/{order_id}/items/{item_id}/"))
            .await?;
        Ok(())
    }

    pub async fn update_status(
        &self,
        order_id: u64,
        status: OrderStatus,
        notes: &str,
    ) -> ApiResult<Value> {
        Ok(self
            .client
            .post(
                &format!("{ORDERS}/{order_id}/status/"),
                json!({ "status": status.id(), "notes": notes }),
            )
            .await?
            .value())
    }

    pub async fn status_history(&self, order_id: u64) -> ApiResult<Vec<Value>> {
        self.client
            .get_list(
                &format!("{ORDERS}/{order_id}/status/history/"),
                RequestOptions::new(),
            )
            .await
    }

    pub async fn process_payment(&self, order_id: u64, payment: Value) -> ApiResult<Value> {
        Ok(self
            .client
            .post(&format!("{ORDERS}/{order_id}/payments/"), payment)
            .await?
            .value())
    }

    pub async fn payments(&self, order_id: u64) -> ApiResult<Vec<Value>> {
        self.client
            .get_list(
                &format!("{ORDERS}/{order_id}/payments/"),
                RequestOptions::new(),
            )
            .await
    }

    pub async fn mark_ready(
        &self,
        order_id: u64,
        ready_time: Option<DateTime<Utc>>,
    ) -> ApiResult<Value> {
        Ok(self
            .client
            .post(
                &format!("{ORDERS}/{order_id}/fulfillment/ready/"),
                json!({ "ready_time": ready_time }),
            )
            .await?
            .value())
    }

    pub async fn complete(&self, order_id: u64) -> ApiResult<Value> {
        Ok(self
            .client
            .post_empty(&format!("{ORDERS}/{order_id}/fulfillment/complete/"))
            .await?
            .value())
    }

    pub async fn cancel(&self, order_id: u64, reason: &str) -> ApiResult<Value> {
        Ok(self
            .client
            .post(
                &format!("{ORDERS}/{order_id}/fulfillment/cancel/"),
                json!({ "reason": reason }),
            )
            .await?
            .value())
    }

    pub async fn add_note(&self, order_id: u64, note: &str, is_internal: bool) -> ApiResult<Value> {
        Ok(self
            .client
            .post(
                &format!("{ORDERS}/{order_id}/notes/"),
                json!({ "note": note, "is_internal": is_internal }),
            )
            .await?
            .value())
    }

    /// Notes on an order; `is_internal` narrows to internal or public notes.
    pub async fn notes(&self, order_id: u64, is_internal: Option<bool>) -> ApiResult<Vec<Value>> {
        self.client
            .get_list(
                &format!("{ORDERS}/{order_id}/notes/"),
                RequestOptions::new().query_opt("is_internal", is_internal),
            )
            .await
    }

    pub async fn upload_attachment(
        &self,
        order_id: u64,
        file: FilePart,
        description: &str,
    ) -> ApiResult<Value> {
        let form = FormData::new()
            .file("file", file)
            .text("description", description);
        Ok(self
            .client
            .post_form(&format!("{ORDERS}/{order_id}/attachments/"), form)
            .await?
            .value())
    }

    pub async fn stats(&self, options: RequestOptions) -> ApiResult<Value> {
        Ok(self
            .client
            .get_query(&format!("{ORDERS}/stats/"), options)
            .await?
            .value())
    }

    /// Downloads an export (`format` such as `csv`) as raw bytes.
    pub async fn export(&self, format: &str, options: RequestOptions) -> ApiResult<Bytes> {
        let response = self
            .client
            .get_query(&format!("{ORDERS}/export/"), options.query("format", format))
            .await?;
        Ok(response.bytes().clone())
    }
}

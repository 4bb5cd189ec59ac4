//! Stock items, movements and suppliers.

use platera_types::{InventoryItem, StockMovement, Supplier};
use serde_json::{Value, json};

use super::item_path;
use crate::error::ApiResult;
use crate::form::{FilePart, FormData};
use crate::http::{ApiClient, RequestOptions};

const ITEMS: &str = "inventory/items";
const SUPPLIERS: &str = "inventory/suppliers";

pub struct InventoryApi<'a> {
    pub(crate) client: &'a ApiClient,
}

impl InventoryApi<'_> {
    pub async fn items(&self, options: RequestOptions) -> ApiResult<Vec<InventoryItem>> {
        self.client.get_list(&format!("{ITEMS}/"), options).await
    }

    pub async fn item(&self, id: u64) -> ApiResult<InventoryItem> {
        self.client.get_json(&item_path(ITEMS, id)).await
    }

    pub async fn create_item(
        &self,
        fields: &Value,
        image: Option<FilePart>,
    ) -> ApiResult<InventoryItem> {
        let mut form = FormData::from_value(fields);
        if let Some(image) = image {
            form = form.file("image", image);
        }
        self.client
            .post_form(&format!("{ITEMS}/"), form)
            .await?
            .json()
    }

    pub async fn update_item(
        &self,
        id: u64,
        changes: &Value,
        image: Option<FilePart>,
    ) -> ApiResult<InventoryItem> {
        let mut form = FormData::from_value(changes);
        if let Some(image) = image {
            form = form.file("image", image);
        }
        self.client
            .patch_form(&item_path(ITEMS, id), form)
            .await?
            .json()
    }

    pub async fn delete_item(&self, id: u64) -> ApiResult<()> {
        self.client.delete(&item_path(ITEMS, id)).await?;
        Ok(())
    }

    /// Items at or under their alert level; `threshold` overrides it.
    pub async fn low_stock(&self, threshold: Option<f64>) -> ApiResult<Vec<InventoryItem>> {
        self.client
            .get_list(
                &format!("{ITEMS}/low-stock/"),
                RequestOptions::new().query_opt("threshold", threshold),
            )
            .await
    }

    pub async fn search(&self, query: &str) -> ApiResult<Vec<InventoryItem>> {
        self.client
            .get_list(
                &format!("{ITEMS}/search/"),
                RequestOptions::new().query("q", query),
            )
            .await
    }

    pub async fn add_stock(
        &self,
        item_id: u64,
        quantity: f64,
        notes: &str,
        unit_cost: Option<f64>,
    ) -> ApiResult<StockMovement> {
        let mut body = json!({
            "quantity": quantity,
            "notes": notes,
            "movement_type": "addition",
        });
        if let Some(unit_cost) = unit_cost {
            body["unit_cost"] = json!(unit_cost);
        }
        self.client
            .post(&format!("{ITEMS}/{item_id}/movements/"), body)
            .await?
            .json()
    }

    pub async fn remove_stock(
        &self,
        item_id: u64,
        quantity: f64,
        notes: &str,
    ) -> ApiResult<StockMovement> {
        self.client
            .post(
                &format!("{ITEMS}/{item_id}/movements/"),
                json!({
                    "quantity": quantity,
                    "notes": notes,
                    "movement_type": "subtraction",
                }),
            )
            .await?
            .json()
    }

    /// Sets the on-hand quantity outright.
    pub async fn adjust_stock(&self, item_id: u64, new_quantity: f64, notes: &str) -> ApiResult<Value> {
        Ok(self
            .client
            .post(
                &format!("{ITEMS}/{item_id}/adjust/"),
                json!({ "new_quantity": new_quantity, "notes": notes }),
            )
            .await?
            .value())
    }

    /// Movements for one item, or across all items.
    pub async fn movements(&self, item_id: Option<u64>) -> ApiResult<Vec<StockMovement>> {
        let path = match item_id {
            Some(id) => format!("{ITEMS}/{id}/movements/"),
            None => "inventory/movements/".to_string(),
        };
        self.client.get_list(&path, RequestOptions::new()).await
    }

    pub async fn suppliers(&self) -> ApiResult<Vec<Supplier>> {
        self.client
            .get_list(&format!("{SUPPLIERS}/"), RequestOptions::new())
            .await
    }

    pub async fn create_supplier(&self, supplier: Value) -> ApiResult<Supplier> {
        self.client
            .post(&format!("{SUPPLIERS}/"), supplier)
            .await?
            .json()
    }

    pub async fn delete_supplier(&self, id: u64) -> ApiResult<()> {
        self.client.delete(&item_path(SUPPLIERS, id)).await?;
        Ok(())
    }
}

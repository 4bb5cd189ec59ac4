//! Menu categories and items.

use platera_types::{MenuCategory, MenuItem};
use serde_json::{Value, json};

use super::{item_path, with_image};
use crate::error::ApiResult;
use crate::form::FilePart;
use crate::http::{ApiClient, RequestOptions};

const CATEGORIES: &str = "menu/categories";
const ITEMS: &str = "menu/items";

pub struct MenuApi<'a> {
    pub(crate) client: &'a ApiClient,
}

impl MenuApi<'_> {
    pub async fn categories(&self) -> ApiResult<Vec<MenuCategory>> {
        self.client
            .get_list(&format!("{CATEGORIES}/"), RequestOptions::new())
            .await
    }

    pub async fn category(&self, id: u64) -> ApiResult<MenuCategory> {
        self.client.get_json(&item_path(CATEGORIES, id)).await
    }

    pub async fn create_category(
        &self,
        fields: &Value,
        image: Option<FilePart>,
    ) -> ApiResult<MenuCategory> {
        self.client
            .post_form(&format!("{CATEGORIES}/"), with_image(fields, image))
            .await?
            .json()
    }

    pub async fn update_category(
        &self,
        id: u64,
        changes: &Value,
        image: Option<FilePart>,
    ) -> ApiResult<MenuCategory> {
        self.client
            .patch_form(&item_path(CATEGORIES, id), with_image(changes, image))
            .await?
            .json()
    }

    pub async fn delete_category(&self, id: u64) -> ApiResult<()> {
        self.client.delete(&item_path(CATEGORIES, id)).await?;
        Ok(())
    }

    /// Items in one category.
    pub async fn category_items(
        &self,
        category_id: u64,
        options: RequestOptions,
    ) -> ApiResult<Vec<MenuItem>> {
        self.client
            .get_list(&format!("{CATEGORIES}/{category_id}/items/"), options)
            .await
    }

    /// Lists menu items; filters (`category`, `is_available`, `page`) go in
    /// `options`.
    pub async fn items(&self, options: RequestOptions) -> ApiResult<Vec<MenuItem>> {
        self.client.get_list(&format!("{ITEMS}/"), options).await
    }

    pub async fn item(&self, id: u64) -> ApiResult<MenuItem> {
        self.client.get_json(&item_path(ITEMS, id)).await
    }

    pub async fn create_item(&self, fields: &Value, image: Option<FilePart>) -> ApiResult<MenuItem> {
        self.client
            .post_form(&format!("{ITEMS}/"), with_image(fields, image))
            .await?
            .json()
    }

    pub async fn update_item(
        &self,
        id: u64,
        changes: &Value,
        image: Option<FilePart>,
    ) -> ApiResult<MenuItem> {
        self.client
            .patch_form(&item_path(ITEMS, id), with_image(changes, image))
            .await?
            .json()
    }

    pub async fn delete_item(&self, id: u64) -> ApiResult<()> {
        self.client.delete(&item_path(ITEMS, id)).await?;
        Ok(())
    }

    pub async fn search(&self, query: &str) -> ApiResult<Vec<MenuItem>> {
        self.client
            .get_list(
                &format!("{ITEMS}/search/"),
                RequestOptions::new().query("q", query),
            )
            .await
    }

    pub async fn set_availability(&self, id: u64, is_available: bool) -> ApiResult<Value> {
        Ok(self
            .client
            .patch(
                &format!("{ITEMS}/{id}/availability/"),
                json!({ "is_available": is_available }),
            )
            .await?
            .value())
    }

    pub async fn featured(&self) -> ApiResult<Vec<MenuItem>> {
        self.client
            .get_list("menu/featured/", RequestOptions::new())
            .await
    }

    pub async fn popular(&self, limit: u32) -> ApiResult<Vec<MenuItem>> {
        self.client
            .get_list("menu/popular/", RequestOptions::new().query("limit", limit))
            .await
    }
}

//! Retail products.

use platera_types::Product;
use serde_json::{Value, json};

use super::{item_path, with_image};
use crate::error::ApiResult;
use crate::form::FilePart;
use crate::http::{ApiClient, RequestOptions};

const PRODUCTS: &str = "products";

pub struct ProductsApi<'a> {
    pub(crate) client: &'a ApiClient,
}

impl ProductsApi<'_> {
    pub async fn list(&self, options: RequestOptions) -> ApiResult<Vec<Product>> {
        self.client.get_list(&format!("{PRODUCTS}/"), options).await
    }

    pub async fn get(&self, id: u64) -> ApiResult<Product> {
        self.client.get_json(&item_path(PRODUCTS, id)).await
    }

    pub async fn create(&self, fields: &Value, image: Option<FilePart>) -> ApiResult<Product> {
        self.client
            .post_form(&format!("{PRODUCTS}/"), with_image(fields, image))
            .await?
            .json()
    }

    /// Multipart PATCH; an absent `image` keeps the current one.
    pub async fn update(
        &self,
        id: u64,
        changes: &Value,
        image: Option<FilePart>,
    ) -> ApiResult<Product> {
        self.client
            .patch_form(&item_path(PRODUCTS, id), with_image(changes, image))
            .await?
            .json()
    }

    pub async fn delete(&self, id: u64) -> ApiResult<()> {
        self.client.delete(&item_path(PRODUCTS, id)).await?;
        Ok(())
    }

    pub async fn set_availability(&self, id: u64, is_available: bool) -> ApiResult<Product> {
        self.client
            .patch(
                &item_path(PRODUCTS, id),
                json!({ "is_available": is_available }),
            )
            .await?
            .json()
    }
}

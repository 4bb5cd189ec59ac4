//! Kitchen recipes with their ingredients and preparation steps.
//!
//! Ingredient and step bodies differ between kitchens and are passed through
//! as JSON values.

use platera_types::Recipe;
use serde_json::{Value, json};

use super::{item_path, with_image};
use crate::error::ApiResult;
use crate::form::FilePart;
use crate::http::{ApiClient, RequestOptions};

const RECIPES: &str = "recipes";

pub struct RecipesApi<'a> {
    pub(crate) client: &'a ApiClient,
}

impl RecipesApi<'_> {
    /// Lists recipes; `category` and `tag` filters go in `options`.
    pub async fn list(&self, options: RequestOptions) -> ApiResult<Vec<Recipe>> {
        self.client.get_list(&format!("{RECIPES}/"), options).await
    }

    pub async fn get(&self, id: u64) -> ApiResult<Recipe> {
        self.client.get_json(&item_path(RECIPES, id)).await
    }

    pub async fn create(&self, fields: &Value, image: Option<FilePart>) -> ApiResult<Recipe> {
        self.client
            .post_form(&format!("{RECIPES}/"), with_image(fields, image))
            .await?
            .json()
    }

    pub async fn update(
        &self,
        id: u64,
        changes: &Value,
        image: Option<FilePart>,
    ) -> ApiResult<Recipe> {
        self.client
            .patch_form(&item_path(RECIPES, id), with_image(changes, image))
            .await?
            .json()
    }

    /// Soft delete on the server.
    pub async fn delete(&self, id: u64) -> ApiResult<()> {
        self.client.delete(&item_path(RECIPES, id)).await?;
        Ok(())
    }

    pub async fn search(&self, query: &str) -> ApiResult<Vec<Recipe>> {
        self.client
            .get_list(
                &format!("{RECIPES}/search/"),
                RequestOptions::new().query("q", query),
            )
            .await
    }

    pub async fn popular(&self, limit: u32) -> ApiResult<Vec<Recipe>> {
        self.client
            .get_list(
                &format!("{RECIPES}/popular/"),
                RequestOptions::new().query("limit", limit),
            )
            .await
    }

    pub async fn ingredients(&self, recipe_id: u64) -> ApiResult<Vec<Value>> {
        self.client
            .get_list(
                &format!("{RECIPES}/{recipe_id}/ingredients/"),
                RequestOptions::new(),
            )
            .await
    }

    pub async fn add_ingredient(&self, recipe_id: u64, ingredient: Value) -> ApiResult<Value> {
        Ok(self
            .client
            .post(&format!("{RECIPES}/{recipe_id}/ingredients/"), ingredient)
            .await?
            .value())
    }

    pub async fn update_ingredient(
        &self,
        recipe_id: u64,
        ingredient_id: u64,
        changes: Value,
    ) -> ApiResult<Value> {
        Ok(self
            .client
            .patch(
                &format!("{RECIPES}/{recipe_id}/ingredients/{ingredient_id}/"),
                changes,
            )
            .await?
            .value())
    }

    pub async fn remove_ingredient(&self, recipe_id: u64, ingredient_id: u64) -> ApiResult<()> {
        self.client
            .delete(&format!(
                "{RECIPES}/{recipe_id}/ingredients/{ingredient_id}/"
            ))
            .await?;
        Ok(())
    }

    /// Replaces the whole ingredient list in one call.
    pub async fn replace_ingredients(
        &self,
        recipe_id: u64,
        ingredients: Vec<Value>,
    ) -> ApiResult<Value> {
        Ok(self
            .client
            .put(
                &format!("{RECIPES}/{recipe_id}/ingredients/bulk-update/"),
                json!({ "ingredients": ingredients }),
            )
            .await?
            .value())
    }

    pub async fn steps(&self, recipe_id: u64) -> ApiResult<Vec<Value>> {
        self.client
            .get_list(
                &format!("{RECIPES}/{recipe_id}/steps/"),
                RequestOptions::new(),
            )
            .await
    }

    pub async fn add_step(&self, recipe_id: u64, step: Value) -> ApiResult<Value> {
        Ok(self
            .client
            .post(&format!("{RECIPES}/{recipe_id}/steps/"), step)
            .await?
            .value())
    }

    pub async fn update_step(&self, recipe_id: u64, step_id: u64, changes: Value) -> ApiResult<Value> {
        Ok(self
            .client
            .patch(&format!("{RECIPES}/{recipe_id}/steps/{step_id}/"), changes)
            .await?
            .value())
    }

    /// `order` lists step ids in their new sequence.
    pub async fn reorder_steps(&self, recipe_id: u64, order: &[u64]) -> ApiResult<()> {
        self.client
            .post(
                &format!("{RECIPES}/{recipe_id}/steps/reorder/"),
                json!({ "order": order }),
            )
            .await?;
        Ok(())
    }

    pub async fn delete_step(&self, recipe_id: u64, step_id: u64) -> ApiResult<()> {
        self.client
            .delete(&format!("{RECIPES}/{recipe_id}/steps/{step_id}/"))
            .await?;
        Ok(())
    }

    /// Ingredient quantities multiplied by `factor`.
    pub async fn scale(&self, recipe_id: u64, factor: f64) -> ApiResult<Value> {
        Ok(self
            .client
            .get_query(
                &format!("{RECIPES}/{recipe_id}/scale/"),
                RequestOptions::new().query("scale", factor),
            )
            .await?
            .value())
    }

    pub async fn cost(&self, recipe_id: u64) -> ApiResult<Value> {
        Ok(self
            .client
            .get(&format!("{RECIPES}/{recipe_id}/cost/"))
            .await?
            .value())
    }
}

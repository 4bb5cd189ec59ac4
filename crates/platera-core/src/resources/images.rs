//! Hosted image uploads (`cloudinary/` endpoints).

use reqwest::Method;
use serde_json::{Value, json};

use crate::error::ApiResult;
use crate::form::{FilePart, FormData};
use crate::http::{ApiClient, RequestBody, RequestOptions};

/// Upload folder used when the caller has no preference.
pub const DEFAULT_FOLDER: &str = "platera";

pub struct ImagesApi<'a> {
    pub(crate) client: &'a ApiClient,
}

impl ImagesApi<'_> {
    /// Uploads `file` into `folder` (or [`DEFAULT_FOLDER`]).
    ///
    /// The response carries the hosted URL and the public id needed by
    /// [`ImagesApi::delete`].
    pub async fn upload(&self, file: FilePart, folder: Option<&str>) -> ApiResult<Value> {
        let form = FormData::new()
            .file("file", file)
            .text("folder", folder.unwrap_or(DEFAULT_FOLDER));
        Ok(self
            .client
            .post_form("cloudinary/upload", form)
            .await?
            .value())
    }

    /// Deletes a hosted image; the id travels in a JSON body.
    pub async fn delete(&self, public_id: &str) -> ApiResult<()> {
        self.client
            .request(
                Method::DELETE,
                "cloudinary/delete",
                RequestBody::Json(json!({ "publicId": public_id })),
                RequestOptions::default(),
            )
            .await?;
        Ok(())
    }
}

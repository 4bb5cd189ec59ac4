//! Typed wrappers over backend resources.
//!
//! Each wrapper borrows the [`ApiClient`] and maps one backend resource to
//! methods; list endpoints normalize through the list envelope parser.

pub mod auth;
pub mod images;
pub mod inventory;
pub mod menu;
pub mod notifications;
pub mod orders;
pub mod products;
pub mod recipes;
pub mod reports;
pub mod reservations;
pub mod settings;
pub mod staff;
pub mod tables;
pub mod users;

pub use auth::AuthApi;
pub use images::ImagesApi;
pub use inventory::InventoryApi;
pub use menu::MenuApi;
pub use notifications::NotificationsApi;
pub use orders::OrdersApi;
pub use products::ProductsApi;
pub use recipes::RecipesApi;
pub use reports::{DateRange, ReportsApi};
pub use reservations::ReservationsApi;
pub use settings::SettingsApi;
pub use staff::StaffApi;
pub use tables::TablesApi;
pub use users::UsersApi;

use serde_json::Value;

use crate::form::{FilePart, FormData};
use crate::http::ApiClient;

impl ApiClient {
    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi { client: self }
    }

    pub fn staff(&self) -> StaffApi<'_> {
        StaffApi { client: self }
    }

    pub fn menu(&self) -> MenuApi<'_> {
        MenuApi { client: self }
    }

    pub fn orders(&self) -> OrdersApi<'_> {
        OrdersApi { client: self }
    }

    pub fn tables(&self) -> TablesApi<'_> {
        TablesApi { client: self }
    }

    pub fn reservations(&self) -> ReservationsApi<'_> {
        ReservationsApi { client: self }
    }

    pub fn inventory(&self) -> InventoryApi<'_> {
        InventoryApi { client: self }
    }

    pub fn reports(&self) -> ReportsApi<'_> {
        ReportsApi { client: self }
    }

    pub fn settings(&self) -> SettingsApi<'_> {
        SettingsApi { client: self }
    }

    pub fn users(&self) -> UsersApi<'_> {
        UsersApi { client: self }
    }

    pub fn images(&self) -> ImagesApi<'_> {
        ImagesApi { client: self }
    }

    pub fn products(&self) -> ProductsApi<'_> {
        ProductsApi { client: self }
    }

    pub fn recipes(&self) -> RecipesApi<'_> {
        RecipesApi { client: self }
    }

    pub fn notifications(&self) -> NotificationsApi<'_> {
        NotificationsApi { client: self }
    }
}

/// Builds `"{collection}/{id}/"` (collection given without slashes).
fn item_path(collection: &str, id: impl std::fmt::Display) -> String {
    format!("{collection}/{id}/")
}

/// Multipart body from `fields`, with `image` attached when present.
fn with_image(fields: &Value, image: Option<FilePart>) -> FormData {
    let form = FormData::from_value(fields);
    match image {
        Some(image) => form.file("image", image),
        None => form,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::form::FormValue;

    #[test]
    fn test_item_path() {
        assert_eq!(item_path("users", 4), "users/4/");
        assert_eq!(item_path("settings", "currency"), "settings/currency/");
    }

    #[test]
    fn test_with_image_appends_file_part() {
        let form = with_image(
            &json!({"name": "Jollof", "price": "45.00"}),
            Some(FilePart::new("jollof.jpg", vec![1, 2, 3]).with_mime("image/jpeg")),
        );
        assert_eq!(form.get_text("name"), Some("Jollof"));
        assert!(
            form.fields()
                .iter()
                .any(|(k, v)| k == "image" && matches!(v, FormValue::File(_)))
        );

        let without = with_image(&json!({"name": "Jollof"}), None);
        assert_eq!(without.fields().len(), 1);
    }
}

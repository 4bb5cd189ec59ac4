//! Staff accounts and shifts.

use platera_types::{Shift, StaffMember};
use serde_json::{Value, json};

use super::item_path;
use crate::error::ApiResult;
use crate::form::{FilePart, FormData};
use crate::http::{ApiClient, RequestOptions};
use crate::store::keys;

/// Position filter value that matches every member.
pub const ALL_ROLES: &str = "All";

pub struct StaffApi<'a> {
    pub(crate) client: &'a ApiClient,
}

impl StaffApi<'_> {
    /// Lists staff accounts and refreshes the local `staff_list` cache.
    pub async fn list(&self) -> ApiResult<Vec<StaffMember>> {
        let members: Vec<StaffMember> = self
            .client
            .get_list(
                "users/",
                RequestOptions::new().query("user_type", "STAFF"),
            )
            .await?;

        match serde_json::to_string(&members) {
            Ok(json) => self.client.store().set(keys::STAFF_LIST, &json),
            Err(err) => tracing::warn!(error = %err, "failed to cache staff list"),
        }
        Ok(members)
    }

    /// Last list fetched by [`StaffApi::list`]; empty when absent or unreadable.
    pub fn cached(&self) -> Vec<StaffMember> {
        let Some(raw) = self.client.store().get(keys::STAFF_LIST) else {
            return Vec::new();
        };
        serde_json::from_str(&raw).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "ignoring unreadable staff cache");
            Vec::new()
        })
    }

    pub async fn get(&self, id: u64) -> ApiResult<StaffMember> {
        self.client.get_json(&item_path("users", id)).await
    }

    /// Registers a staff account. `user_type` and `is_staff` are forced.
    pub async fn create(&self, staff: &Value, picture: Option<FilePart>) -> ApiResult<Value> {
        let mut form = FormData::from_value(staff);
        form.set_text("user_type", "STAFF");
        form.set_text("is_staff", "true");
        if let Some(picture) = picture {
            form = form.file("profile_picture", picture);
        }
        Ok(self.client.post_form("auth/register/", form).await?.value())
    }

    pub async fn update(
        &self,
        id: u64,
        changes: &Value,
        picture: Option<FilePart>,
    ) -> ApiResult<Value> {
        let mut form = FormData::from_value(changes);
        if let Some(picture) = picture {
            form = form.file("profile_picture", picture);
        }
        Ok(self
            .client
            .patch_form(&item_path("users", id), form)
            .await?
            .value())
    }

    pub async fn delete(&self, id: u64) -> ApiResult<()> {
        self.client.delete(&item_path("users", id)).await?;
        Ok(())
    }

    pub async fn set_active(&self, id: u64, is_active: bool) -> ApiResult<Value> {
        Ok(self
            .client
            .patch(&item_path("users", id), json!({ "is_active": is_active }))
            .await?
            .value())
    }

    /// Shifts for one staff member, or all shifts.
    pub async fn shifts(&self, staff_id: Option<u64>) -> ApiResult<Vec<Shift>> {
        let path = match staff_id {
            Some(id) => format!("users/{id}/shifts/"),
            None => "shifts/".to_string(),
        };
        self.client.get_list(&path, RequestOptions::new()).await
    }

    pub async fn create_shift(&self, shift: Value) -> ApiResult<Shift> {
        self.client.post("shifts/", shift).await?.json()
    }

    pub async fn update_shift(&self, id: u64, changes: Value) -> ApiResult<Shift> {
        self.client
            .patch(&item_path("shifts", id), changes)
            .await?
            .json()
    }

    pub async fn delete_shift(&self, id: u64) -> ApiResult<()> {
        self.client.delete(&item_path("shifts", id)).await?;
        Ok(())
    }
}

/// Members whose position matches `role`, ignoring case.
///
/// An empty filter or [`ALL_ROLES`] returns every member; members without a
/// position never match a specific role.
pub fn filter_by_role<'m>(members: &'m [StaffMember], role: &str) -> Vec<&'m StaffMember> {
    let role = role.trim();
    if role.is_empty() || role == ALL_ROLES {
        return members.iter().collect();
    }
    members
        .iter()
        .filter(|member| {
            member
                .role
                .as_deref()
                .is_some_and(|position| position.eq_ignore_ascii_case(role))
        })
        .collect()
}

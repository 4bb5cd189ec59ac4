//! Table reservations.

use chrono::NaiveDate;
use platera_types::{Reservation, ReservationStatus};
use serde_json::{Value, json};

use super::item_path;
use crate::error::ApiResult;
use crate::http::{ApiClient, RequestOptions};

const RESERVATIONS: &str = "reservations";

pub struct ReservationsApi<'a> {
    pub(crate) client: &'a ApiClient,
}

impl ReservationsApi<'_> {
    pub async fn list(&self, options: RequestOptions) -> ApiResult<Vec<Reservation>> {
        self.client
            .get_list(&format!("{RESERVATIONS}/"), options)
            .await
    }

    pub async fn get(&self, id: u64) -> ApiResult<Reservation> {
        self.client.get_json(&item_path(RESERVATIONS, id)).await
    }

    pub async fn create(&self, reservation: Value) -> ApiResult<Reservation> {
        self.client
            .post(&format!("{RESERVATIONS}/"), reservation)
            .await?
            .json()
    }

    pub async fn update(&self, id: u64, changes: Value) -> ApiResult<Reservation> {
        self.client
            .patch(&item_path(RESERVATIONS, id), changes)
            .await?
            .json()
    }

    pub async fn delete(&self, id: u64) -> ApiResult<()> {
        self.client.delete(&item_path(RESERVATIONS, id)).await?;
        Ok(())
    }

    pub async fn update_status(
        &self,
        id: u64,
        status: ReservationStatus,
        notes: &str,
    ) -> ApiResult<Value> {
        Ok(self
            .client
            .patch(
                &format!("{RESERVATIONS}/{id}/status/"),
                json!({ "status": status.id(), "notes": notes }),
            )
            .await?
            .value())
    }

    pub async fn today(&self) -> ApiResult<Vec<Reservation>> {
        self.client
            .get_list(&format!("{RESERVATIONS}/today/"), RequestOptions::new())
            .await
    }

    pub async fn upcoming(&self) -> ApiResult<Vec<Reservation>> {
        self.client
            .get_list(&format!("{RESERVATIONS}/upcoming/"), RequestOptions::new())
            .await
    }

    /// Reservations between two dates, inclusive.
    pub async fn by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ApiResult<Vec<Reservation>> {
        self.list(
            RequestOptions::new()
                .query("start_date", start)
                .query("end_date", end),
        )
        .await
    }
}

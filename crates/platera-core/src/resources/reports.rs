//! Sales, staff and inventory reports.
//!
//! Report bodies vary per endpoint and are returned as JSON values.

use std::fmt;

use chrono::{Days, NaiveDate};
use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::http::{ApiClient, RequestOptions};

/// Inclusive date range for report queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> ApiResult<Self> {
        if start > end {
            return Err(ApiError::invalid_request(format!(
                "Report range starts after it ends ({start} > {end})"
            )));
        }
        Ok(Self { start, end })
    }

    /// The `days` days ending on `end` (inclusive).
    pub fn ending(end: NaiveDate, days: u64) -> Self {
        let start = end
            .checked_sub_days(Days::new(days.saturating_sub(1)))
            .unwrap_or(NaiveDate::MIN);
        Self { start, end }
    }

    fn options(self) -> RequestOptions {
        RequestOptions::new()
            .query("start_date", self.start)
            .query("end_date", self.end)
    }
}

/// Bucket size for summary reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupBy {
    #[default]
    Day,
    Week,
    Month,
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GroupBy::Day => "day",
            GroupBy::Week => "week",
            GroupBy::Month => "month",
        })
    }
}

pub struct ReportsApi<'a> {
    pub(crate) client: &'a ApiClient,
}

impl ReportsApi<'_> {
    async fn fetch(&self, path: &str, options: RequestOptions) -> ApiResult<Value> {
        Ok(self.client.get_query(path, options).await?.value())
    }

    pub async fn sales(&self, range: DateRange) -> ApiResult<Value> {
        self.fetch("reports/sales/", range.options()).await
    }

    pub async fn sales_summary(&self, range: DateRange, group_by: GroupBy) -> ApiResult<Value> {
        self.fetch(
            "reports/sales/summary/",
            range.options().query("group_by", group_by),
        )
        .await
    }

    pub async fn sales_by_category(&self, range: DateRange) -> ApiResult<Value> {
        self.fetch("reports/sales/by-category/", range.options())
            .await
    }

    pub async fn sales_by_menu_item(&self, range: DateRange) -> ApiResult<Value> {
        self.fetch("reports/sales/by-menu-item/", range.options())
            .await
    }

    /// `metrics` are sent comma-joined; empty means the server default set.
    pub async fn staff_productivity(&self, range: DateRange, metrics: &[&str]) -> ApiResult<Value> {
        self.fetch(
            "reports/staff/productivity/",
            range.options().query("metrics", metrics.join(",")),
        )
        .await
    }

    pub async fn inventory_valuation(&self, as_of: Option<NaiveDate>) -> ApiResult<Value> {
        self.fetch(
            "reports/inventory/valuation/",
            RequestOptions::new().query_opt("as_of_date", as_of),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_range_rejects_reversed_dates() {
        assert!(DateRange::new(date(2024, 5, 2), date(2024, 5, 1)).is_err());
        assert!(DateRange::new(date(2024, 5, 1), date(2024, 5, 1)).is_ok());
    }

    #[test]
    fn test_range_ending_is_inclusive() {
        let range = DateRange::ending(date(2024, 3, 7), 7);
        assert_eq!(range.start, date(2024, 3, 1));
        assert_eq!(DateRange::ending(date(2024, 3, 7), 1).start, date(2024, 3, 7));
    }

    #[test]
    fn test_range_query_uses_iso_dates() {
        let range = DateRange::new(date(2024, 1, 1), date(2024, 1, 31)).unwrap();
        let query = range.options().query("group_by", GroupBy::Week).query;
        assert_eq!(
            query,
            vec![
                ("start_date".to_string(), "2024-01-01".to_string()),
                ("end_date".to_string(), "2024-01-31".to_string()),
                ("group_by".to_string(), "week".to_string()),
            ]
        );
    }
}

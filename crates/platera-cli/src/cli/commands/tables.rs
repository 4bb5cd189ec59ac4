//! Table command handlers.

use anyhow::{Context, Result};
use platera_core::RequestOptions;
use platera_types::TableStatus;

use super::{App, parse_choice};

const STATUSES: &[TableStatus] = &[
    TableStatus::Available,
    TableStatus::Occupied,
    TableStatus::Reserved,
    TableStatus::Cleaning,
];

pub async fn list(app: &App, status: Option<&str>) -> Result<()> {
    let status = status
        .map(|s| parse_choice(s, STATUSES, TableStatus::id, "table status"))
        .transpose()?;
    app.authorize(&[], "/staff/tables").await?;

    let tables = app.client().tables();
    let tables = match status {
        Some(status) => tables.by_status(status).await,
        None => tables.list(RequestOptions::new()).await,
    }
    .context("list tables")?;

    if tables.is_empty() {
        println!("No tables found.");
        return Ok(());
    }

    for table in tables {
        println!(
            "{:<8} {:>3} seats  {:<10} {}",
            table.table_number,
            table.capacity,
            table.status.id(),
            table.location.as_deref().unwrap_or("")
        );
    }
    Ok(())
}

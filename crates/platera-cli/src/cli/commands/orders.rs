//! Order command handlers.

use anyhow::{Context, Result};
use platera_core::RequestOptions;
use platera_types::OrderStatus;

use super::{App, parse_choice};

const STATUSES: &[OrderStatus] = &[
    OrderStatus::Pending,
    OrderStatus::Confirmed,
    OrderStatus::Preparing,
    OrderStatus::Ready,
    OrderStatus::Served,
    OrderStatus::Completed,
    OrderStatus::Cancelled,
];

pub async fn list(app: &App, status: Option<&str>) -> Result<()> {
    let status = status
        .map(|s| parse_choice(s, STATUSES, OrderStatus::id, "order status"))
        .transpose()?;
    app.authorize(&[], "/staff/orders").await?;

    let orders = app
        .client()
        .orders()
        .list(RequestOptions::new().query_opt("status", status.map(|s| s.id())))
        .await
        .context("list orders")?;

    if orders.is_empty() {
        println!("No orders found.");
        return Ok(());
    }

    for order in orders {
        let reference = if order.order_id.is_empty() {
            format!("#{}", order.id)
        } else {
            order.order_id.clone()
        };
        let table = order
            .table
            .map_or_else(|| "-".to_string(), |table| format!("table {table}"));
        let total = if order.grand_total.is_empty() {
            &order.total_amount
        } else {
            &order.grand_total
        };
        println!(
            "{reference:<14} {:<10} {table:<10} {total:>9}",
            order.status.id()
        );
    }
    Ok(())
}

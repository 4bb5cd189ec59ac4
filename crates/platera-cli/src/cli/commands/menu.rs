//! Menu command handlers.

use anyhow::{Context, Result};
use platera_core::RequestOptions;

use super::App;

pub async fn items(app: &App, search: Option<&str>, category: Option<u64>) -> Result<()> {
    app.authorize(&[], "/admin/menu").await?;

    let menu = app.client().menu();
    let items = match search.map(str::trim).filter(|q| !q.is_empty()) {
        Some(query) => menu.search(query).await,
        None => {
            menu.items(RequestOptions::new().query_opt("category", category))
                .await
        }
    }
    .context("list menu items")?;

    if items.is_empty() {
        println!("No menu items found.");
        return Ok(());
    }

    for item in items {
        let flag = if item.is_available { "" } else { "  (unavailable)" };
        println!("{:>5}  {:<32} {:>8}{flag}", item.id, item.name, item.price);
    }
    Ok(())
}

//! Staff command handlers.

use anyhow::{Context, Result};
use platera_core::resources::staff::{ALL_ROLES, filter_by_role};
use platera_types::Role;

use super::App;

pub async fn list(app: &App, role: Option<&str>) -> Result<()> {
    app.authorize(&[Role::Admin, Role::Manager], "/admin/staff")
        .await?;

    let members = app
        .client()
        .staff()
        .list()
        .await
        .context("list staff")?;
    let shown = filter_by_role(&members, role.unwrap_or(ALL_ROLES));
    if shown.is_empty() {
        println!("No staff found.");
        return Ok(());
    }

    for member in shown {
        let name = member.full_name();
        let name = if name.is_empty() { &member.username } else { &name };
        println!(
            "{:>5}  {:<24} {:<12} {}",
            member.id,
            name,
            member.role.as_deref().unwrap_or("-"),
            if member.is_active { "active" } else { "inactive" }
        );
    }
    Ok(())
}

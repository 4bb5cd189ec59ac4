//! Sign-in command handlers.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use platera_core::store;

use super::App;

/// Which login endpoint to use.
pub enum LoginKind {
    Manager,
    Admin,
    Staff(String),
}

pub async fn login(
    app: &App,
    kind: LoginKind,
    username: Option<String>,
    password: Option<String>,
) -> Result<()> {
    let auth = app.client().auth();
    let admin = matches!(kind, LoginKind::Admin);
    let login = match kind {
        LoginKind::Staff(employee_id) => auth
            .staff_login(&employee_id)
            .await
            .context("staff login failed")?,
        LoginKind::Manager | LoginKind::Admin => {
            let username = match username {
                Some(username) => username,
                None => prompt("Username")?,
            };
            let password = match password {
                Some(password) => password,
                None => prompt("Password")?,
            };
            if admin {
                auth.admin_login(&username, &password)
                    .await
                    .context("admin login failed")?
            } else {
                auth.manager_login(&username, &password)
                    .await
                    .context("manager login failed")?
            }
        }
    };

    match login.user {
        Some(user) => {
            let state = app.session.login(user);
            let name = state
                .user
                .as_ref()
                .map(|user| user.display_name())
                .unwrap_or_default();
            println!("✓ Logged in as {name} ({})", state.role.label());
        }
        None => println!("✓ Logged in"),
    }
    println!("  Session stored in: {}", app.store_path.display());
    Ok(())
}

pub fn logout(app: &App) -> Result<()> {
    if store::access_token(app.client().store()).is_none() {
        println!("Not logged in (no stored session).");
        return Ok(());
    }

    app.session.logout();
    println!("✓ Logged out");
    println!("  Credentials removed from: {}", app.store_path.display());
    Ok(())
}

pub async fn whoami(app: &App) -> Result<()> {
    let state = app.authorize(&[], "/").await?;
    let Some(user) = state.user else {
        anyhow::bail!("Signed in, but no profile is available");
    };

    println!("{}", user.display_name());
    println!("  Username: {}", user.username);
    println!("  Role:     {}", user.role.label());
    if !user.email.is_empty() {
        println!("  Email:    {}", user.email);
    }
    if let Some(staff_id) = &user.staff_id {
        println!("  Staff ID: {staff_id}");
    }
    println!("  Server:   {}", app.client().base_url());
    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    eprint!("{label}: ");
    io::stderr().flush().context("flush prompt")?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .with_context(|| format!("read {}", label.to_lowercase()))?;
    let value = line.trim().to_string();
    if value.is_empty() {
        anyhow::bail!("{label} is required");
    }
    Ok(value)
}

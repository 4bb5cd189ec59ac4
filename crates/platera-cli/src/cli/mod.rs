//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use platera_core::config;
use tracing_subscriber::EnvFilter;

mod commands;

/// Environment variable holding a tracing filter (e.g. `platera_core=debug`).
const LOG_ENV: &str = "PLATERA_LOG";

#[derive(Parser)]
#[command(name = "platera")]
#[command(version)]
#[command(about = "Platera restaurant POS command-line client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Sign in and store the session
    Login {
        /// Sign in with a manager account
        #[arg(long)]
        manager: bool,
        /// Sign in with an admin account
        #[arg(long)]
        admin: bool,
        /// Sign in as staff with an employee ID
        #[arg(long, value_name = "EMPLOYEE_ID")]
        staff: Option<String>,
        /// Account username (prompted when omitted)
        #[arg(short, long)]
        username: Option<String>,
        /// Account password (prompted when omitted)
        #[arg(long, env = "PLATERA_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Sign out and remove stored credentials
    Logout,

    /// Show the signed-in account
    Whoami,

    /// Staff accounts (managers and admins only)
    Staff {
        #[command(subcommand)]
        command: StaffCommands,
    },

    /// Menu catalogue
    Menu {
        #[command(subcommand)]
        command: MenuCommands,
    },

    /// Dining tables
    Tables {
        #[command(subcommand)]
        command: TableCommands,
    },

    /// Orders
    Orders {
        #[command(subcommand)]
        command: OrderCommands,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum StaffCommands {
    /// Lists staff accounts
    List {
        /// Only show this position (e.g. WAITER, CHEF)
        #[arg(long)]
        role: Option<String>,
    },
}

#[derive(clap::Subcommand)]
enum MenuCommands {
    /// Lists menu items
    Items {
        /// Free-text search
        #[arg(short, long)]
        search: Option<String>,
        /// Only items in this category
        #[arg(long, value_name = "ID")]
        category: Option<u64>,
    },
}

#[derive(clap::Subcommand)]
enum TableCommands {
    /// Lists tables
    List {
        /// Only tables with this status (available, occupied, reserved, cleaning)
        #[arg(long)]
        status: Option<String>,
    },
}

#[derive(clap::Subcommand)]
enum OrderCommands {
    /// Lists orders
    List {
        /// Only orders with this status (pending, preparing, ...)
        #[arg(long)]
        status: Option<String>,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the config and session file paths
    Path,
    /// Print the effective API settings
    Show,
    /// Initialize a default config file (if not present)
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = config::Config::load().context("load config")?;
    init_logging(&config.log_level);

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli, config).await })
}

fn init_logging(default_filter: &str) {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_filter));
    // stdout carries command output, so logs go to stderr
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

async fn dispatch(cli: Cli, config: config::Config) -> Result<()> {
    match cli.command {
        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
            ConfigCommands::Show => commands::config::show(&config),
        },

        Commands::Login {
            manager,
            admin,
            staff,
            username,
            password,
        } => {
            let kind = match (manager, admin, staff) {
                (true, false, None) => commands::auth::LoginKind::Manager,
                (false, true, None) => commands::auth::LoginKind::Admin,
                (false, false, Some(id)) => commands::auth::LoginKind::Staff(id),
                _ => anyhow::bail!(
                    "Please specify one account type: --manager, --admin, or --staff <EMPLOYEE_ID>"
                ),
            };
            let app = commands::App::connect(&config)?;
            commands::auth::login(&app, kind, username, password).await
        }

        Commands::Logout => commands::auth::logout(&commands::App::connect(&config)?),

        Commands::Whoami => commands::auth::whoami(&commands::App::connect(&config)?).await,

        Commands::Staff { command } => {
            let app = commands::App::connect(&config)?;
            match command {
                StaffCommands::List { role } => commands::staff::list(&app, role.as_deref()).await,
            }
        }

        Commands::Menu { command } => {
            let app = commands::App::connect(&config)?;
            match command {
                MenuCommands::Items { search, category } => {
                    commands::menu::items(&app, search.as_deref(), category).await
                }
            }
        }

        Commands::Tables { command } => {
            let app = commands::App::connect(&config)?;
            match command {
                TableCommands::List { status } => {
                    commands::tables::list(&app, status.as_deref()).await
                }
            }
        }

        Commands::Orders { command } => {
            let app = commands::App::connect(&config)?;
            match command {
                OrderCommands::List { status } => {
                    commands::orders::list(&app, status.as_deref()).await
                }
            }
        }
    }
}

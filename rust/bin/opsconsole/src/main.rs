//! `opsconsole`: the ops console from a terminal.
//!
//! Drives the same engine the web front-end uses. Session, sidebar state,
//! locale and the current page persist in the redb file between runs.

mod commands;
mod config;

use clap::{Parser, Subcommand};
use console::Console;

/// Ops console CLI.
#[derive(Parser, Debug)]
#[command(name = "opsconsole", about = "Ops console CLI client")]
struct Cli {
    /// Path to config file (default: ~/.opsconsole/config.toml).
    #[arg(long = "config", global = true)]
    config: Option<String>,

    /// Directory for local state (overrides the config file).
    #[arg(long = "data-dir", global = true)]
    data_dir: Option<String>,

    /// Remote API base URL. Turns off the built-in mock.
    #[arg(long = "api", global = true)]
    api: Option<String>,

    /// Initial UI locale, used until `locale` saves a choice.
    #[arg(long = "locale", global = true)]
    locale: Option<String>,

    /// Output format: table or json.
    #[arg(long = "output", short = 'o', global = true, default_value = "table")]
    output: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sign in.
    Login {
        /// Username.
        #[arg(long)]
        name: String,
        /// Role (admin, operator, viewer, auditor or a display label).
        #[arg(long, default_value = "admin")]
        role: String,
        /// Explicit permission list, comma separated.
        #[arg(long, value_delimiter = ',')]
        permissions: Option<Vec<String>>,
    },

    /// Sign out and clear loaded data.
    Logout,

    /// Show the signed-in user and effective permissions.
    Whoami,

    /// Show the sidebar.
    Menu,

    /// Open or close a sidebar category.
    Toggle {
        /// Category key (e.g. hostCategory).
        key: String,
    },

    /// Navigate to a page.
    Open {
        /// Route path (e.g. /hosts).
        path: String,
    },

    /// Load and print a resource.
    List {
        /// Resource name (e.g. hosts, logs, log-rules).
        resource: String,
        /// Log search keyword.
        #[arg(long, default_value = "")]
        keyword: String,
        /// Page to print (1-based).
        #[arg(long, default_value_t = 1)]
        page: usize,
    },

    /// Export a resource list to a file.
    Export {
        /// Resource name.
        resource: String,
        /// csv or json.
        #[arg(long, default_value = "csv")]
        format: String,
        /// Target directory.
        #[arg(long, default_value = ".")]
        dir: String,
    },

    /// Switch the UI language.
    Locale {
        /// Locale code (zh-CN or en-US).
        code: String,
    },

    /// Switch the role of the signed-in user (development aid).
    Role {
        role: String,
    },

    /// Show version.
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config_path = cli
        .config
        .map(std::path::PathBuf::from)
        .unwrap_or_else(config::default_path);
    let json_output = cli.output == "json";
    let overrides = config::Overrides {
        data_dir: cli.data_dir,
        api: cli.api,
        locale: cli.locale,
    };

    match cli.command {
        Commands::Version => {
            println!("opsconsole cli v{}", env!("CARGO_PKG_VERSION"));
        }
        command => {
            let config = config::load(&config_path, overrides)?;
            let console = commands::open(config).await?;
            run(command, &console, json_output).await?;
        }
    }

    Ok(())
}

async fn run(command: Commands, console: &Console, json_output: bool) -> anyhow::Result<()> {
    match command {
        Commands::Login {
            name,
            role,
            permissions,
        } => {
            commands::session::login(console, &name, &role, permissions).await?;
        }

        Commands::Logout => {
            commands::session::logout(console).await?;
        }

        Commands::Whoami => {
            commands::session::whoami(console, json_output)?;
        }

        Commands::Role { role } => {
            commands::session::switch_role(console, &role).await?;
        }

        Commands::Locale { code } => {
            commands::session::locale(console, &code).await?;
        }

        Commands::Menu => {
            commands::nav::menu(console, json_output)?;
        }

        Commands::Toggle { key } => {
            commands::nav::toggle(console, &key, json_output).await?;
        }

        Commands::Open { path } => {
            commands::nav::open(console, &path, json_output).await?;
        }

        Commands::List {
            resource,
            keyword,
            page,
        } => {
            commands::resource::list(console, &resource, &keyword, page, json_output).await?;
        }

        Commands::Export {
            resource,
            format,
            dir,
        } => {
            commands::resource::export(console, &resource, &format, &dir).await?;
        }

        Commands::Version => {}
    }

    Ok(())
}

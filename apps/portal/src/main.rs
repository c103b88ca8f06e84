use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use client_core::SessionClient;
use shared::domain::Role;
use storage::CredentialStore;
use url::Url;

mod config;

#[derive(Parser, Debug)]
#[command(name = "portal", about = "Developer portal command-line client")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and persist the session token.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account and sign in as it.
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long, value_enum, default_value_t = RoleArg::Developer)]
        role: RoleArg,
    },
    /// Show the currently signed-in identity.
    Whoami,
    /// Invalidate the session locally and (best-effort) on the server.
    Logout,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RoleArg {
    Admin,
    ContentManager,
    Developer,
}

impl From<RoleArg> for Role {
    fn from(value: RoleArg) -> Self {
        match value {
            RoleArg::Admin => Role::Admin,
            RoleArg::ContentManager => Role::ContentManager,
            RoleArg::Developer => Role::Developer,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();

    let settings = config::load_settings();
    tracing::debug!(
        api_base_url = %settings.api_base_url,
        database_url = %settings.database_url,
        "loaded settings"
    );

    let base_url = Url::parse(&settings.api_base_url)
        .with_context(|| format!("invalid api base url '{}'", settings.api_base_url))?;
    let store = CredentialStore::new(&settings.database_url)
        .await
        .context("failed to open credential store")?;

    let client = SessionClient::new(base_url, Arc::new(store));
    client.restore().await;

    match args.command {
        Command::Login { email, password } => {
            let user = client.login(&email, &password).await?;
            println!("signed in as {} ({:?})", user.username, user.role);
        }
        Command::Register {
            username,
            email,
            password,
            role,
        } => {
            let user = client
                .register(&username, &email, &password, role.into())
                .await?;
            println!("registered and signed in as {} ({:?})", user.username, user.role);
        }
        Command::Whoami => match client.snapshot().user {
            Some(user) => println!("{}", serde_json::to_string_pretty(&user)?),
            None => println!("not signed in"),
        },
        Command::Logout => {
            client.logout().await;
            println!("signed out");
        }
    }

    Ok(())
}

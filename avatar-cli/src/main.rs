use anyhow::{Context, Result};
use avatar_store::{factory, AvatarClient, AvatarService};
use clap::Parser;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

mod cli;
mod session_store;

use cli::{AvatarCommand, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = avatar_store::config::read_config().context("Failed to load configuration")?;

    match cli.command {
        Commands::Login { email, password } => {
            let client = factory::supabase_client(&settings.supabase, None)
                .context("Invalid Supabase settings")?;
            let session = client
                .sign_in_with_password(&email, &password)
                .await
                .context("Sign-in failed")?;
            session_store::save_session(&session)?;
            println!(
                "Signed in as {}",
                session.user.email.as_deref().unwrap_or(&email)
            );
        }
        Commands::Logout => {
            session_store::clear_session()?;
            println!("Signed out");
        }
        Commands::Avatar(command) => {
            let session = session_store::load_session()?;
            tracing::debug!(signed_in = session.is_some(), "loaded local session");
            let access_token = session.as_ref().map(|s| s.access_token.as_str());
            let client = factory::avatar_client(&settings, access_token)
                .context("Failed to set up avatar client")?;

            let output = execute(&client, command).await;
            println!("{}", serde_json::to_string(&output)?);
        }
    }

    Ok(())
}

/// Runs one avatar command and returns what the lenient client returned,
/// so failures print as `null`, `[]` or `false`.
async fn execute<S: AvatarService + ?Sized>(
    client: &AvatarClient<S>,
    command: AvatarCommand,
) -> Value {
    match command {
        AvatarCommand::Create { avatar_url, name } => {
            serde_json::json!(client.create(&avatar_url, name.as_deref()).await)
        }
        AvatarCommand::Active => serde_json::json!(client.get_active().await),
        AvatarCommand::List => serde_json::json!(client.list_all().await),
        AvatarCommand::Activate { avatar_id } => Value::Bool(client.activate(&avatar_id).await),
        AvatarCommand::Cached => serde_json::json!(client.cached_avatar_url()),
        AvatarCommand::Shared { avatar_url: None } => serde_json::json!(client.shared_avatar_url()),
        AvatarCommand::Shared {
            avatar_url: Some(url),
        } => {
            client.set_shared_avatar_url(&url);
            Value::String(url)
        }
    }
}

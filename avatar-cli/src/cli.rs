use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "avatar-cli")]
#[command(about = "Manage the signed-in user's avatars")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Sign in with email and password and keep the session locally
    Login {
        #[arg(long, env = "SUPABASE_EMAIL")]
        email: String,
        #[arg(long, env = "SUPABASE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the local session
    Logout,
    #[command(flatten)]
    Avatar(AvatarCommand),
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum AvatarCommand {
    /// Store a new avatar and make it the active one
    Create {
        avatar_url: String,
        /// Display label, "My Avatar" when omitted
        #[arg(long)]
        name: Option<String>,
    },
    /// Print the active avatar
    Active,
    /// Print all avatars, newest first
    List,
    /// Make the given avatar the only active one
    Activate { avatar_id: String },
    /// Print the locally cached active avatar URL
    Cached,
    /// Print the shared avatar URL, or set it when a URL is given
    Shared { avatar_url: Option<String> },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_avatar_subcommands() {
        let cli = Cli::try_parse_from(["avatar-cli", "create", "https://cdn/a.png", "--name", "Red"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Avatar(AvatarCommand::Create { ref avatar_url, ref name })
                if avatar_url == "https://cdn/a.png" && name.as_deref() == Some("Red")
        ));

        let cli = Cli::try_parse_from(["avatar-cli", "shared"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Avatar(AvatarCommand::Shared { avatar_url: None })
        ));
    }

    #[test]
    fn login_requires_credentials() {
        let cli = Cli::try_parse_from([
            "avatar-cli",
            "login",
            "--email",
            "a@example.com",
            "--password",
            "hunter2",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Login { .. }));
    }

    #[test]
    fn credential_env_vars_stay_out_of_settings_prefix() {
        use clap::CommandFactory;

        let command = Cli::command();
        let login = command.find_subcommand("login").unwrap();
        let env_names = login
            .get_arguments()
            .filter_map(|arg| arg.get_env())
            .map(|name| name.to_string_lossy().into_owned())
            .collect::<Vec<_>>();

        assert_eq!(env_names, vec!["SUPABASE_EMAIL", "SUPABASE_PASSWORD"]);
        assert!(env_names.iter().all(|name| !name.starts_with("AVATAR_")));
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}

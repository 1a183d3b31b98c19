use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::adapters::outbound::{supabase::DEFAULT_AVATAR_TABLE, FileLocalStore};

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub supabase: SupabaseSettings,
    #[serde(default)]
    pub avatars: AvatarSettings,
    #[serde(default)]
    pub cache: CacheSettings,
}

#[derive(Deserialize, Clone)]
pub struct SupabaseSettings {
    pub url: String,
    pub anon_key: String,
}

impl std::fmt::Debug for SupabaseSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseSettings")
            .field("url", &self.url)
            .field("anon_key", &"<redacted>")
            .finish()
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct AvatarSettings {
    #[serde(default = "default_table")]
    pub table: String,
    /// Database function performing activation in one statement.
    #[serde(default)]
    pub activate_rpc: Option<String>,
}

impl Default for AvatarSettings {
    fn default() -> Self {
        Self {
            table: default_table(),
            activate_rpc: None,
        }
    }
}

fn default_table() -> String {
    DEFAULT_AVATAR_TABLE.to_string()
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct CacheSettings {
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl CacheSettings {
    pub fn resolved_path(&self) -> Option<PathBuf> {
        self.path.clone().or_else(FileLocalStore::default_path)
    }
}

/// Unprefixed variables used when nothing else sets the project. The
/// `VITE_`-prefixed names of a web front end sharing the `.env` are accepted too.
#[derive(Debug, Clone, Default)]
pub struct FallbackEnv {
    pub url: Option<String>,
    pub anon_key: Option<String>,
}

impl FallbackEnv {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let first_of = |names: [&str; 2]| names.into_iter().find_map(&lookup);
        Self {
            url: first_of(["SUPABASE_URL", "VITE_SUPABASE_URL"]),
            anon_key: first_of(["SUPABASE_ANON_KEY", "VITE_SUPABASE_ANON_KEY"]),
        }
    }
}

/// Reads `.env.local`/`.env`, then `config/base.yaml`, `config/<APP_ENVIRONMENT>.yaml`
/// and `AVATAR_`-prefixed variables, later sources winning.
pub fn read_config() -> Result<Settings, config::ConfigError> {
    dotenvy::from_filename(".env.local").ok();
    dotenvy::dotenv().ok();

    let base_path = std::env::current_dir()
        .map_err(|e| config::ConfigError::Message(format!("no current directory: {e}")))?;
    let environment = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "local".into());

    load_settings(
        &base_path.join("config"),
        &environment,
        FallbackEnv::from_env(),
    )
}

pub fn load_settings(
    config_directory: &Path,
    environment: &str,
    fallback: FallbackEnv,
) -> Result<Settings, config::ConfigError> {
    let environment_filename = format!("{}.yaml", environment.to_lowercase());

    let mut builder = config::Config::builder();
    if let Some(url) = fallback.url {
        builder = builder.set_default("supabase.url", url)?;
    }
    if let Some(anon_key) = fallback.anon_key {
        builder = builder.set_default("supabase.anon_key", anon_key)?;
    }

    let settings = builder
        .add_source(config::File::from(config_directory.join("base.yaml")).required(false))
        .add_source(
            config::File::from(config_directory.join(environment_filename)).required(false),
        )
        .add_source(
            config::Environment::with_prefix("AVATAR")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, content: &str) {
        std::fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn environment_file_overrides_base() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "base.yaml",
            "supabase:\n  url: https://base.supabase.co\n  anon_key: base-key\n",
        );
        write(
            dir.path(),
            "production.yaml",
            "supabase:\n  url: https://prod.supabase.co\navatars:\n  activate_rpc: activate_avatar\n",
        );

        let settings = load_settings(dir.path(), "Production", FallbackEnv::default()).unwrap();
        assert_eq!(settings.supabase.url, "https://prod.supabase.co");
        assert_eq!(settings.supabase.anon_key, "base-key");
        assert_eq!(settings.avatars.table, "avatars");
        assert_eq!(settings.avatars.activate_rpc.as_deref(), Some("activate_avatar"));
        assert_eq!(settings.cache.path, None);
    }

    #[test]
    fn fallback_env_fills_missing_project() {
        let dir = tempfile::tempdir().unwrap();

        let settings = load_settings(
            dir.path(),
            "local",
            FallbackEnv {
                url: Some("https://env.supabase.co".into()),
                anon_key: Some("env-key".into()),
            },
        )
        .unwrap();
        assert_eq!(settings.supabase.url, "https://env.supabase.co");
        assert_eq!(settings.supabase.anon_key, "env-key");
    }

    #[test]
    fn fallback_accepts_vite_names() {
        let vars = std::collections::HashMap::from([
            ("VITE_SUPABASE_URL", "https://vite.supabase.co"),
            ("VITE_SUPABASE_ANON_KEY", "vite-key"),
            ("SUPABASE_ANON_KEY", "plain-key"),
        ]);

        let fallback = FallbackEnv::from_lookup(|name| vars.get(name).map(|v| v.to_string()));
        assert_eq!(fallback.url.as_deref(), Some("https://vite.supabase.co"));
        assert_eq!(fallback.anon_key.as_deref(), Some("plain-key"));
    }

    #[test]
    fn files_win_over_fallback_env() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "local.yaml",
            "supabase:\n  url: https://file.supabase.co\n  anon_key: file-key\ncache:\n  path: /tmp/avatars.json\n",
        );

        let settings = load_settings(
            dir.path(),
            "local",
            FallbackEnv {
                url: Some("https://env.supabase.co".into()),
                anon_key: None,
            },
        )
        .unwrap();
        assert_eq!(settings.supabase.url, "https://file.supabase.co");
        assert_eq!(
            settings.cache.resolved_path(),
            Some(PathBuf::from("/tmp/avatars.json"))
        );
    }

    #[test]
    fn missing_project_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_settings(dir.path(), "local", FallbackEnv::default()).is_err());
    }

    #[test]
    fn debug_output_hides_key() {
        let settings = SupabaseSettings {
            url: "https://abc.supabase.co".into(),
            anon_key: "secret".into(),
        };
        assert!(!format!("{settings:?}").contains("secret"));
    }
}

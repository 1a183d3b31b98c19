use anyhow::{Context, Result};
use avatar_store::adapters::outbound::write_private_file;
use std::path::{Path, PathBuf};
use supabase::Session;

fn root_path() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .context("Cannot determine config directory")?
        .join("avatar-cli"))
}

pub fn session_path() -> Result<PathBuf> {
    Ok(root_path()?.join("session.json"))
}

/// Load the saved session. Returns None if not logged in.
pub fn load_session() -> Result<Option<Session>> {
    load_session_from(&session_path()?)
}

pub fn save_session(session: &Session) -> Result<()> {
    save_session_to(&session_path()?, session)
}

pub fn clear_session() -> Result<()> {
    clear_session_at(&session_path()?)
}

fn load_session_from(path: &Path) -> Result<Option<Session>> {
    if !path.exists() {
        return Ok(None);
    }

    let raw = std::fs::read_to_string(path).context("Failed to read session file")?;
    if raw.trim().is_empty() {
        return Ok(None);
    }
    let session = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse session at {}", path.display()))?;
    Ok(Some(session))
}

fn save_session_to(path: &Path, session: &Session) -> Result<()> {
    let raw = serde_json::to_string_pretty(session)?;
    write_private_file(path, &raw)
        .with_context(|| format!("Failed to write session to {}", path.display()))
}

fn clear_session_at(path: &Path) -> Result<()> {
    if path.exists() {
        std::fs::remove_file(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use supabase::AuthUser;

    fn session() -> Session {
        Session {
            access_token: "jwt".into(),
            refresh_token: "refresh".into(),
            expires_in: Some(3600),
            user: AuthUser {
                id: "u-1".into(),
                email: Some("a@example.com".into()),
            },
        }
    }

    #[test]
    fn save_load_clear() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("avatar-cli").join("session.json");

        assert!(load_session_from(&path).unwrap().is_none());

        save_session_to(&path, &session()).unwrap();
        let loaded = load_session_from(&path).unwrap().unwrap();
        assert_eq!(loaded.access_token, "jwt");
        assert_eq!(loaded.user.id, "u-1");

        clear_session_at(&path).unwrap();
        assert!(load_session_from(&path).unwrap().is_none());
        clear_session_at(&path).unwrap();
    }

    #[test]
    fn empty_file_means_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "  \n").unwrap();

        assert!(load_session_from(&path).unwrap().is_none());
    }
}

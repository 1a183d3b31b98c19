//! In-memory adapters for tests and offline runs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use time::{Duration, OffsetDateTime};

use crate::domain::{
    models::{Avatar, AvatarId, NewAvatar, UserId, UserIdentity},
    ports::outbound::{AvatarRepository, LocalStore, SessionProvider},
    AvatarError, LocalStoreError,
};

#[derive(Default)]
struct Table {
    rows: Vec<Avatar>,
    next_id: u64,
    last_timestamp: Option<OffsetDateTime>,
}

impl Table {
    /// Strictly increasing, so rows created back to back still order.
    fn next_timestamp(&mut self) -> OffsetDateTime {
        let now = OffsetDateTime::now_utc();
        let ts = match self.last_timestamp {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_timestamp = Some(ts);
        ts
    }
}

/// Avatar table held in a `Vec`, with every write applied under one lock.
#[derive(Default)]
pub struct InMemoryAvatarRepository {
    table: RwLock<Table>,
    calls: AtomicUsize,
    failing: AtomicBool,
}

#[allow(dead_code)]
impl InMemoryAvatarRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed rows as-is, e.g. to reproduce inconsistent active flags.
    pub fn with_rows(self, rows: Vec<Avatar>) -> Self {
        {
            let mut table = self.table.write().unwrap();
            table.rows.extend(rows);
        }
        self
    }

    /// Make every subsequent call fail with a storage error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of repository calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// All rows in insertion order (for test assertions).
    pub fn all_rows(&self) -> Vec<Avatar> {
        self.table.read().unwrap().rows.clone()
    }

    pub fn set_avatar_url_for_all(&self, url: &str) {
        let mut table = self.table.write().unwrap();
        for row in table.rows.iter_mut() {
            row.avatar_url = url.to_string();
        }
    }

    fn enter(&self) -> Result<(), AvatarError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(AvatarError::storage("in-memory repository set to fail"));
        }
        Ok(())
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Table>, AvatarError> {
        self.table
            .read()
            .map_err(|_| AvatarError::storage("avatar table lock poisoned"))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Table>, AvatarError> {
        self.table
            .write()
            .map_err(|_| AvatarError::storage("avatar table lock poisoned"))
    }
}

#[async_trait]
impl AvatarRepository for InMemoryAvatarRepository {
    async fn insert(&self, user_id: &UserId, avatar: &NewAvatar) -> Result<Avatar, AvatarError> {
        self.enter()?;
        let mut table = self.write()?;

        table.next_id += 1;
        let id = AvatarId::new(format!("avatar-{}", table.next_id));
        let now = table.next_timestamp();
        let row = Avatar {
            id,
            user_id: user_id.clone(),
            avatar_url: avatar.avatar_url.clone(),
            name: avatar.name.clone(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        table.rows.push(row.clone());

        Ok(row)
    }

    async fn find_active(&self, user_id: &UserId) -> Result<Option<Avatar>, AvatarError> {
        self.enter()?;
        let table = self.read()?;

        Ok(table
            .rows
            .iter()
            .filter(|a| &a.user_id == user_id && a.is_active)
            .max_by_key(|a| a.created_at)
            .cloned())
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Avatar>, AvatarError> {
        self.enter()?;
        let table = self.read()?;

        let mut rows = table
            .rows
            .iter()
            .filter(|a| &a.user_id == user_id)
            .cloned()
            .collect::<Vec<_>>();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(rows)
    }

    async fn activate(
        &self,
        user_id: &UserId,
        avatar_id: &AvatarId,
    ) -> Result<Option<Avatar>, AvatarError> {
        self.enter()?;
        let mut table = self.write()?;

        let owned = table
            .rows
            .iter()
            .any(|a| &a.user_id == user_id && &a.id == avatar_id);
        if !owned {
            return Ok(None);
        }

        let now = table.next_timestamp();
        let mut activated = None;
        for row in table.rows.iter_mut().filter(|a| &a.user_id == user_id) {
            let is_target = &row.id == avatar_id;
            if row.is_active != is_target {
                row.is_active = is_target;
                row.updated_at = now;
            }
            if is_target {
                activated = Some(row.clone());
            }
        }

        Ok(activated)
    }
}

/// A session that is whatever the test says it is.
#[derive(Default)]
pub struct StaticSessionProvider {
    user: RwLock<Option<UserIdentity>>,
}

#[allow(dead_code)]
impl StaticSessionProvider {
    pub fn signed_in(user: UserIdentity) -> Self {
        Self {
            user: RwLock::new(Some(user)),
        }
    }

    pub fn signed_out() -> Self {
        Self::default()
    }

    pub fn sign_in(&self, user: UserIdentity) {
        *self.user.write().unwrap() = Some(user);
    }

    pub fn sign_out(&self) {
        *self.user.write().unwrap() = None;
    }
}

#[async_trait]
impl SessionProvider for StaticSessionProvider {
    async fn current_user(&self) -> Option<UserIdentity> {
        self.user.read().ok().and_then(|user| user.clone())
    }
}

/// Local store kept in process memory.
#[derive(Default)]
pub struct MemoryLocalStore {
    values: RwLock<HashMap<String, String>>,
    failing: bool,
}

impl MemoryLocalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every read and write fails.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }
}

impl LocalStore for MemoryLocalStore {
    fn get(&self, key: &str) -> Result<Option<String>, LocalStoreError> {
        if self.failing {
            return Err(LocalStoreError::Poisoned);
        }
        let values = self.values.read().map_err(|_| LocalStoreError::Poisoned)?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), LocalStoreError> {
        if self.failing {
            return Err(LocalStoreError::Poisoned);
        }
        let mut values = self.values.write().map_err(|_| LocalStoreError::Poisoned)?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

//! Accounts, saved progress and the leaderboard, kept in a JSON document on disk
//! (XDG config or ~/.config/matchtui).

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const APP_DIR: &str = "matchtui";
const STORE_FILENAME: &str = "store.json";
const TOKEN_FILENAME: &str = "session";

/// Leaderboard size shown by the front end.
pub const LEADERBOARD_SIZE: usize = 10;

/// Saved progress for one player. Also a leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub username: String,
    pub level: u32,
    pub total_score: u32,
}

impl Progress {
    /// Level 1, nothing banked.
    pub fn fresh(username: &str) -> Self {
        Self {
            username: username.to_string(),
            level: 1,
            total_score: 0,
        }
    }
}

/// A logged-in identity. The token allows re-entry without a password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub username: String,
    pub token: String,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("corrupt store: {0}")]
    Json(#[from] serde_json::Error),
    #[error("username and password must not be empty")]
    EmptyCredentials,
    #[error("username {0:?} is already taken")]
    UsernameTaken(String),
    /// Wrong password and unknown user are deliberately the same error.
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("session expired, please log in again")]
    UnknownToken,
}

/// Read/write player progress and rank players.
pub trait ProgressStore {
    /// Missing records read as level 1 with no score.
    fn load_progress(&self, username: &str) -> Result<Progress, StoreError>;
    /// Upsert by username; last write wins.
    fn save_progress(&mut self, progress: &Progress) -> Result<(), StoreError>;
    /// Top `limit` players by level, then total score.
    fn leaderboard(&self, limit: usize) -> Result<Vec<Progress>, StoreError>;
}

/// Register and authenticate players.
pub trait AccountStore {
    fn register(&mut self, username: &str, password: &str) -> Result<Session, StoreError>;
    fn login(&mut self, username: &str, password: &str) -> Result<Session, StoreError>;
    /// Trusted re-entry: no password check.
    fn resume(&self, token: &str) -> Result<Session, StoreError>;
    fn logout(&mut self, token: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct UserRecord {
    username: String,
    salt: String,
    password_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Document {
    #[serde(default)]
    users: Vec<UserRecord>,
    #[serde(default)]
    progress: Vec<Progress>,
}

fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn random_hex(rng: &mut impl Rng) -> String {
    format!("{:016x}{:016x}", rng.random::<u64>(), rng.random::<u64>())
}

/// In-process store. Also the engine behind [`FileStore`].
#[derive(Debug, Clone)]
pub struct MemoryStore {
    doc: Document,
    rng: StdRng,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            doc: Document::default(),
            rng: StdRng::from_os_rng(),
        }
    }

    /// Deterministic salts and tokens.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            doc: Document::default(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn user_mut(&mut self, username: &str) -> Option<&mut UserRecord> {
        self.doc.users.iter_mut().find(|u| u.username == username)
    }

    fn issue_token(&mut self, username: &str) -> Result<Session, StoreError> {
        let token = random_hex(&mut self.rng);
        let user = self.user_mut(username).ok_or(StoreError::InvalidCredentials)?;
        user.token = Some(token.clone());
        Ok(Session {
            username: username.to_string(),
            token,
        })
    }
}

impl ProgressStore for MemoryStore {
    fn load_progress(&self, username: &str) -> Result<Progress, StoreError> {
        Ok(self
            .doc
            .progress
            .iter()
            .find(|p| p.username == username)
            .cloned()
            .unwrap_or_else(|| Progress::fresh(username)))
    }

    fn save_progress(&mut self, progress: &Progress) -> Result<(), StoreError> {
        match self
            .doc
            .progress
            .iter_mut()
            .find(|p| p.username == progress.username)
        {
            Some(row) => *row = progress.clone(),
            None => self.doc.progress.push(progress.clone()),
        }
        Ok(())
    }

    fn leaderboard(&self, limit: usize) -> Result<Vec<Progress>, StoreError> {
        let mut rows = self.doc.progress.clone();
        rows.sort_by(|a, b| {
            b.level
                .cmp(&a.level)
                .then(b.total_score.cmp(&a.total_score))
                .then_with(|| a.username.cmp(&b.username))
        });
        rows.truncate(limit);
        Ok(rows)
    }
}

impl AccountStore for MemoryStore {
    fn register(&mut self, username: &str, password: &str) -> Result<Session, StoreError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(StoreError::EmptyCredentials);
        }
        if self.doc.users.iter().any(|u| u.username == username) {
            return Err(StoreError::UsernameTaken(username.to_string()));
        }
        let salt = random_hex(&mut self.rng);
        let password_hash = hash_password(&salt, password);
        self.doc.users.push(UserRecord {
            username: username.to_string(),
            salt,
            password_hash,
            token: None,
        });
        self.save_progress(&Progress::fresh(username))?;
        self.issue_token(username)
    }

    fn login(&mut self, username: &str, password: &str) -> Result<Session, StoreError> {
        let username = username.trim();
        let ok = self
            .doc
            .users
            .iter()
            .find(|u| u.username == username)
            .is_some_and(|u| hash_password(&u.salt, password) == u.password_hash);
        if !ok {
            return Err(StoreError::InvalidCredentials);
        }
        self.issue_token(username)
    }

    fn resume(&self, token: &str) -> Result<Session, StoreError> {
        self.doc
            .users
            .iter()
            .find(|u| u.token.as_deref() == Some(token))
            .map(|u| Session {
                username: u.username.clone(),
                token: token.to_string(),
            })
            .ok_or(StoreError::UnknownToken)
    }

    fn logout(&mut self, token: &str) -> Result<(), StoreError> {
        for user in &mut self.doc.users {
            if user.token.as_deref() == Some(token) {
                user.token = None;
            }
        }
        Ok(())
    }
}

/// [`MemoryStore`] persisted to a JSON file after every write.
///
/// Each write reloads the file first, so records saved through another handle survive.
/// The cached copy only changes once the new document is on disk.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    inner: MemoryStore,
}

/// Document at `path`, empty when the file does not exist yet.
fn read_document(path: &Path) -> Result<Document, StoreError> {
    match fs::read(path) {
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Document::default()),
        Err(e) => Err(e.into()),
    }
}

/// Write to a sibling temp file, then rename over the old document.
fn write_document(path: &Path, doc: &Document) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, serde_json::to_vec_pretty(doc)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

impl FileStore {
    /// Open `path`, starting empty when the file does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let mut inner = MemoryStore::new();
        inner.doc = read_document(&path)?;
        Ok(Self { path, inner })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `change` to the current file contents and persist the result.
    fn update<T>(
        &mut self,
        change: impl FnOnce(&mut MemoryStore) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut next = self.inner.clone();
        next.doc = read_document(&self.path)?;
        let out = change(&mut next)?;
        write_document(&self.path, &next.doc)?;
        self.inner = next;
        Ok(out)
    }
}

impl ProgressStore for FileStore {
    fn load_progress(&self, username: &str) -> Result<Progress, StoreError> {
        self.inner.load_progress(username)
    }

    fn save_progress(&mut self, progress: &Progress) -> Result<(), StoreError> {
        self.update(|store| store.save_progress(progress))
    }

    fn leaderboard(&self, limit: usize) -> Result<Vec<Progress>, StoreError> {
        self.inner.leaderboard(limit)
    }
}

impl AccountStore for FileStore {
    fn register(&mut self, username: &str, password: &str) -> Result<Session, StoreError> {
        self.update(|store| store.register(username, password))
    }

    fn login(&mut self, username: &str, password: &str) -> Result<Session, StoreError> {
        self.update(|store| store.login(username, password))
    }

    fn resume(&self, token: &str) -> Result<Session, StoreError> {
        self.inner.resume(token)
    }

    fn logout(&mut self, token: &str) -> Result<(), StoreError> {
        self.update(|store| store.logout(token))
    }
}

/// Config directory: $XDG_CONFIG_HOME/matchtui, else ~/.config/matchtui, else ./matchtui.
pub fn config_dir() -> PathBuf {
    let base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
        _ => std::env::var("HOME")
            .map(|h| PathBuf::from(h).join(".config"))
            .unwrap_or_else(|_| PathBuf::from(".")),
    };
    base.join(APP_DIR)
}

pub fn default_store_path() -> PathBuf {
    config_dir().join(STORE_FILENAME)
}

/// Remembered re-entry token, if any.
pub fn load_saved_token(dir: &Path) -> Option<String> {
    let token = fs::read_to_string(dir.join(TOKEN_FILENAME)).ok()?;
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

pub fn save_token(dir: &Path, token: &str) -> Result<(), StoreError> {
    fs::create_dir_all(dir)?;
    fs::write(dir.join(TOKEN_FILENAME), format!("{}\n", token))?;
    Ok(())
}

pub fn clear_saved_token(dir: &Path) -> Result<(), StoreError> {
    match fs::remove_file(dir.join(TOKEN_FILENAME)) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("matchtui-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_missing_progress_is_fresh() {
        let store = MemoryStore::with_seed(1);
        assert_eq!(store.load_progress("nobody").unwrap(), Progress::fresh("nobody"));
    }

    #[test]
    fn test_register_creates_progress_and_rejects_duplicates() {
        let mut store = MemoryStore::with_seed(1);
        let s = store.register("ada", "hunter2").unwrap();
        assert_eq!(s.username, "ada");
        assert_eq!(store.leaderboard(10).unwrap(), vec![Progress::fresh("ada")]);
        assert!(matches!(
            store.register("ada", "x"),
            Err(StoreError::UsernameTaken(_))
        ));
        assert!(matches!(
            store.register("", "x"),
            Err(StoreError::EmptyCredentials)
        ));
        assert!(matches!(
            store.register("bob", ""),
            Err(StoreError::EmptyCredentials)
        ));
    }

    #[test]
    fn test_login_failures_are_indistinguishable() {
        let mut store = MemoryStore::with_seed(2);
        store.register("ada", "hunter2").unwrap();
        let wrong = store.login("ada", "nope").unwrap_err();
        let unknown = store.login("zed", "hunter2").unwrap_err();
        assert_eq!(wrong.to_string(), unknown.to_string());
        assert!(matches!(wrong, StoreError::InvalidCredentials));
        assert!(store.login("ada", "hunter2").is_ok());
    }

    #[test]
    fn test_token_resume_and_logout() {
        let mut store = MemoryStore::with_seed(3);
        let first = store.register("ada", "pw").unwrap();
        assert_eq!(store.resume(&first.token).unwrap().username, "ada");
        // A fresh login rotates the token.
        let second = store.login("ada", "pw").unwrap();
        assert_ne!(first.token, second.token);
        assert!(matches!(
            store.resume(&first.token),
            Err(StoreError::UnknownToken)
        ));
        store.logout(&second.token).unwrap();
        assert!(store.resume(&second.token).is_err());
    }

    #[test]
    fn test_passwords_are_not_stored_in_clear() {
        let mut store = MemoryStore::with_seed(4);
        store.register("ada", "hunter2").unwrap();
        let json = serde_json::to_string(&store.doc).unwrap();
        assert!(!json.contains("hunter2"));
    }

    #[test]
    fn test_leaderboard_order_and_upsert() {
        let mut store = MemoryStore::with_seed(5);
        let rows = [("a", 3, 900), ("b", 5, 100), ("c", 3, 1200), ("d", 1, 5000)];
        for (name, level, total_score) in rows {
            store
                .save_progress(&Progress {
                    username: name.into(),
                    level,
                    total_score,
                })
                .unwrap();
        }
        store
            .save_progress(&Progress {
                username: "a".into(),
                level: 6,
                total_score: 50,
            })
            .unwrap();
        let names: Vec<_> = store
            .leaderboard(3)
            .unwrap()
            .into_iter()
            .map(|p| p.username)
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(store.load_progress("a").unwrap().level, 6);
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = temp_dir("roundtrip");
        let path = dir.join("store.json");
        {
            let mut store = FileStore::open(&path).unwrap();
            store.register("ada", "pw").unwrap();
            store
                .save_progress(&Progress {
                    username: "ada".into(),
                    level: 4,
                    total_score: 2300,
                })
                .unwrap();
        }
        let mut reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.load_progress("ada").unwrap().total_score, 2300);
        assert!(reopened.login("ada", "pw").is_ok());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_two_handles_keep_each_others_records() {
        let dir = temp_dir("handles");
        let path = dir.join("store.json");
        let mut first = FileStore::open(&path).unwrap();
        let mut second = FileStore::open(&path).unwrap();
        first
            .save_progress(&Progress {
                username: "ada".into(),
                level: 5,
                total_score: 2_000,
            })
            .unwrap();
        second
            .save_progress(&Progress {
                username: "bob".into(),
                level: 2,
                total_score: 300,
            })
            .unwrap();
        assert_eq!(second.load_progress("ada").unwrap().level, 5);

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.load_progress("ada").unwrap().level, 5);
        assert_eq!(reopened.load_progress("bob").unwrap().level, 2);
        assert_eq!(reopened.leaderboard(10).unwrap().len(), 2);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_failed_write_leaves_cached_accounts_alone() {
        let dir = temp_dir("failed-write");
        let path = dir.join("store.json");
        let mut store = FileStore::open(&path).unwrap();
        // A directory in the temp file's place makes the write fail.
        let blocker = path.with_extension("json.tmp");
        fs::create_dir_all(&blocker).unwrap();

        assert!(matches!(
            store.register("ada", "pw"),
            Err(StoreError::Io(_))
        ));
        assert!(matches!(
            store.login("ada", "pw"),
            Err(StoreError::InvalidCredentials)
        ));
        assert_eq!(store.leaderboard(10).unwrap(), Vec::new());

        fs::remove_dir_all(&blocker).unwrap();
        let session = store.register("ada", "pw").unwrap();
        assert_eq!(store.resume(&session.token).unwrap().username, "ada");
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_corrupt_file_is_reported() {
        let dir = temp_dir("corrupt");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("store.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(FileStore::open(&path), Err(StoreError::Json(_))));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_saved_token_file() {
        let dir = temp_dir("token");
        assert_eq!(load_saved_token(&dir), None);
        save_token(&dir, "abc123").unwrap();
        assert_eq!(load_saved_token(&dir).as_deref(), Some("abc123"));
        clear_saved_token(&dir).unwrap();
        clear_saved_token(&dir).unwrap();
        assert_eq!(load_saved_token(&dir), None);
        let _ = fs::remove_dir_all(&dir);
    }
}

//! Client-side session storage and the mock sign-in/sign-up flow.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

pub const CRATE_NAME: &str = "wevent-session";

pub const AUTH_TOKEN_KEY: &str = "authToken";
pub const USER_KEY: &str = "user";
pub const FALLBACK_TOKEN: &str = "mock-token";

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex compiles"));

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session store io at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("session store at {path} is not a JSON object: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("stored user profile is unreadable: {0}")]
    Profile(#[from] serde_json::Error),
    #[error("session entry could not be encoded: {0}")]
    Encode(#[source] serde_json::Error),
}

fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String, SessionError> {
    serde_json::to_string(value).map_err(SessionError::Encode)
}

/// Key-value capability standing in for browser local storage.
pub trait SessionStore {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), SessionError>;
    fn clear(&mut self, key: &str) -> Result<(), SessionError>;
}

#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    entries: HashMap<String, String>,
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SessionError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear(&mut self, key: &str) -> Result<(), SessionError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Session entries kept as one JSON object on disk. Every write replaces the
/// file through a temp file and an atomic rename.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, SessionError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(SessionError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        serde_json::from_str(&text).map_err(|source| SessionError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), SessionError> {
        let io_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source: std::io::Error| SessionError::Io { path, source }
        };
        let parent = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent).map_err(io_err(parent))?;

        let temp_path = parent.join(format!(".{}.session.tmp", Uuid::new_v4()));
        let body = encode(entries)?;
        fs::write(&temp_path, body).map_err(io_err(&temp_path))?;
        if let Err(source) = fs::rename(&temp_path, &self.path) {
            let _ = fs::remove_file(&temp_path);
            return Err(SessionError::Io {
                path: self.path.clone(),
                source,
            });
        }
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SessionError> {
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)
    }

    fn clear(&mut self, key: &str) -> Result<(), SessionError> {
        let mut entries = self.read_all()?;
        if entries.remove(key).is_some() {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl UserProfile {
    pub fn demo() -> Self {
        Self {
            name: "Иван Петров".to_string(),
            email: "ivan@example.com".to_string(),
            token: Some("mock-token-12345".to_string()),
        }
    }
}

#[derive(Debug)]
pub struct AuthSession<S> {
    store: S,
    user: Option<UserProfile>,
}

impl<S: SessionStore> AuthSession<S> {
    pub fn new(store: S) -> Self {
        Self { store, user: None }
    }

    /// Pick up a session left by a previous run. Both the token and the
    /// profile must be present.
    pub fn restore(&mut self) -> Result<Option<&UserProfile>, SessionError> {
        let token = self.store.get(AUTH_TOKEN_KEY)?;
        let saved_user = self.store.get(USER_KEY)?;
        self.user = match (token, saved_user) {
            (Some(_), Some(user)) => Some(serde_json::from_str(&user)?),
            _ => None,
        };
        Ok(self.user.as_ref())
    }

    pub fn login(&mut self, profile: UserProfile) -> Result<(), SessionError> {
        let token = profile.token.as_deref().unwrap_or(FALLBACK_TOKEN);
        self.store.set(AUTH_TOKEN_KEY, token)?;
        self.store.set(USER_KEY, &encode(&profile)?)?;
        info!(email = %profile.email, "signed in");
        self.user = Some(profile);
        Ok(())
    }

    pub fn logout(&mut self) -> Result<(), SessionError> {
        self.store.clear(AUTH_TOKEN_KEY)?;
        self.store.clear(USER_KEY)?;
        if let Some(user) = self.user.take() {
            info!(email = %user.email, "signed out");
        }
        Ok(())
    }

    pub fn current_user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Error)]
#[error("invalid fields: {}", .0.keys().copied().collect::<Vec<_>>().join(", "))]
pub struct ValidationErrors(pub BTreeMap<&'static str, &'static str>);

impl ValidationErrors {
    pub fn get(&self, field: &str) -> Option<&'static str> {
        self.0.get(field).copied()
    }

    fn into_result(self) -> Result<(), ValidationErrors> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

fn check_email(email: &str, errors: &mut ValidationErrors) {
    if email.trim().is_empty() {
        errors.0.insert("email", "Введите email");
    } else if !EMAIL_RE.is_match(email) {
        errors.0.insert("email", "Введите корректный email");
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
}

impl SignInRequest {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        check_email(&self.email, &mut errors);
        if self.password.is_empty() {
            errors.0.insert("password", "Введите пароль");
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    #[serde(default)]
    pub agree_terms: bool,
}

impl SignUpRequest {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();

        if self.first_name.trim().is_empty() {
            errors.0.insert("firstName", "Введите имя");
        } else if self.first_name.chars().count() < 2 {
            errors.0.insert("firstName", "Имя должно быть не менее 2 символов");
        }

        if self.last_name.trim().is_empty() {
            errors.0.insert("lastName", "Введите фамилию");
        } else if self.last_name.chars().count() < 2 {
            errors.0.insert("lastName", "Фамилия должна быть не менее 2 символов");
        }

        check_email(&self.email, &mut errors);

        if self.password.is_empty() {
            errors.0.insert("password", "Введите пароль");
        } else if self.password.chars().count() < 6 {
            errors.0.insert("password", "Пароль должен быть не менее 6 символов");
        }

        if self.confirm_password.is_empty() {
            errors.0.insert("confirmPassword", "Подтвердите пароль");
        } else if self.password != self.confirm_password {
            errors.0.insert("confirmPassword", "Пароли не совпадают");
        }

        if !self.agree_terms {
            errors.0.insert("agreeTerms", "Необходимо согласиться с условиями");
        }

        errors.into_result()
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Invalid(#[from] ValidationErrors),
    #[error("Неверный email или пароль. Попробуйте снова.")]
    Rejected,
}

#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn sign_in(&self, request: &SignInRequest) -> Result<UserProfile, AuthError>;
    async fn sign_up(&self, request: &SignUpRequest) -> Result<UserProfile, AuthError>;
}

/// Accepts any well-formed credentials after a simulated round trip, unless
/// built with [`MockAuthenticator::rejecting`].
#[derive(Debug, Clone)]
pub struct MockAuthenticator {
    delay: Duration,
    profile: Option<UserProfile>,
}

impl MockAuthenticator {
    pub fn new(delay: Duration, profile: UserProfile) -> Self {
        Self {
            delay,
            profile: Some(profile),
        }
    }

    pub fn demo(delay: Duration) -> Self {
        Self::new(delay, UserProfile::demo())
    }

    pub fn rejecting(delay: Duration) -> Self {
        Self { delay, profile: None }
    }
}

#[async_trait]
impl Authenticator for MockAuthenticator {
    async fn sign_in(&self, request: &SignInRequest) -> Result<UserProfile, AuthError> {
        request.validate()?;
        debug!(email = %request.email, delay_ms = self.delay.as_millis() as u64, "mock sign-in");
        tokio::time::sleep(self.delay).await;
        self.profile.clone().ok_or(AuthError::Rejected)
    }

    async fn sign_up(&self, request: &SignUpRequest) -> Result<UserProfile, AuthError> {
        request.validate()?;
        debug!(email = %request.email, "mock sign-up");
        let Some(profile) = &self.profile else {
            return Err(AuthError::Rejected);
        };
        Ok(UserProfile {
            name: format!("{} {}", request.first_name.trim(), request.last_name.trim()),
            email: request.email.clone(),
            token: profile.token.clone(),
        })
    }
}

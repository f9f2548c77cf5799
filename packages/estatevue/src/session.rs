//! Authenticated-user session and the Authentication Provider collaborator.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::AuthError;
use crate::machine::Machine;

/// Opaque user record handed over by the Authentication Provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub user_id: String,
    #[serde(default)]
    pub profile: serde_json::Value,
}

impl AuthUser {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            profile: serde_json::Value::Null,
        }
    }

    pub fn with_profile(mut self, profile: serde_json::Value) -> Self {
        self.profile = profile;
        self
    }

    /// Best-effort display name from the profile, falling back to the id.
    pub fn display_name(&self) -> &str {
        ["name", "displayName", "email"]
            .iter()
            .find_map(|key| self.profile.get(key).and_then(|v| v.as_str()))
            .unwrap_or(&self.user_id)
    }
}

/// Outcome of one login/logout lifecycle event.
pub type AuthOutcome = Result<Option<AuthUser>, AuthError>;

/// Callback the provider invokes once per login/logout event.
pub type AuthCallback = Arc<dyn Fn(AuthOutcome) + Send + Sync>;

/// Settings handed to the provider at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthConfig {
    pub project_id: Option<String>,
    pub public_key: Option<String>,
}

/// External authentication capability: authenticate, yield a user or none,
/// support logout.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Start the provider. Results arrive through `on_result`.
    async fn initialize(&self, config: &AuthConfig, on_result: AuthCallback)
        -> Result<(), AuthError>;

    async fn logout(&self) -> Result<(), AuthError>;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub is_authenticated: bool,
    pub user: Option<AuthUser>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    AuthResolved(AuthOutcome),
    LogoutRequested,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Logout,
}

/// Session store. Written only through [`Machine::decide`].
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    state: SessionState,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated
    }

    fn set_user(&mut self, user: Option<AuthUser>) {
        self.state = SessionState {
            is_authenticated: user.is_some(),
            user,
        };
    }
}

impl Machine for SessionStore {
    type Event = SessionEvent;
    type Command = SessionCommand;

    fn decide(&mut self, event: SessionEvent) -> Option<SessionCommand> {
        match event {
            SessionEvent::AuthResolved(Ok(Some(user))) => {
                info!(user = %user.user_id, "signed in");
                self.set_user(Some(user));
                None
            }
            SessionEvent::AuthResolved(Ok(None)) => {
                if self.state.is_authenticated {
                    info!("signed out by provider");
                }
                self.set_user(None);
                None
            }
            SessionEvent::AuthResolved(Err(err)) => {
                warn!(error = %err, "authentication failed");
                self.set_user(None);
                None
            }
            SessionEvent::LogoutRequested => {
                if !self.state.is_authenticated {
                    return None;
                }
                self.set_user(None);
                Some(SessionCommand::Logout)
            }
        }
    }
}

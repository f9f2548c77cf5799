//! Bearer-token authentication against the listings API.

use std::sync::Mutex;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use estatevue::{AppConfig, AuthCallback, AuthConfig, AuthError, AuthProvider, AuthUser};

use crate::client::{ClientError, GraphQLClient};
use crate::queries::VIEWER;

#[derive(Debug, Deserialize)]
struct ViewerData {
    viewer: Option<ViewerNode>,
}

#[derive(Debug, Deserialize)]
struct ViewerNode {
    id: String,
    #[serde(flatten)]
    profile: serde_json::Map<String, serde_json::Value>,
}

impl From<ViewerNode> for AuthUser {
    fn from(node: ViewerNode) -> Self {
        AuthUser::new(node.id).with_profile(serde_json::Value::Object(node.profile))
    }
}

/// Resolves the signed-in user by asking the API who owns the configured
/// token. No token means nobody is signed in.
pub struct TokenAuthProvider {
    client: GraphQLClient,
    callback: Mutex<Option<AuthCallback>>,
}

impl TokenAuthProvider {
    pub fn new(client: GraphQLClient) -> Self {
        Self {
            client,
            callback: Mutex::new(None),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let mut client = GraphQLClient::new(&config.api_url);
        if let Some(token) = &config.api_token {
            client = client.with_token(token);
        }
        Self::new(client)
    }

    async fn resolve(&self) -> Result<Option<AuthUser>, AuthError> {
        if !self.client.has_token() {
            debug!("no API token configured, signed out");
            return Ok(None);
        }

        let data: ViewerData = self
            .client
            .query(VIEWER, None::<()>)
            .await
            .map_err(|err| match err {
                ClientError::Network(err) => AuthError::NotConfigured(err.to_string()),
                other => AuthError::Failed(other.to_string()),
            })?;

        Ok(data.viewer.map(AuthUser::from))
    }

    fn stored_callback(&self) -> Option<AuthCallback> {
        self.callback
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl AuthProvider for TokenAuthProvider {
    async fn initialize(
        &self,
        config: &AuthConfig,
        on_result: AuthCallback,
    ) -> Result<(), AuthError> {
        debug!(project = ?config.project_id, "initializing token auth");
        *self.callback.lock().unwrap_or_else(|e| e.into_inner()) = Some(on_result.clone());

        let outcome = self.resolve().await;
        if let Ok(Some(user)) = &outcome {
            info!(user = %user.user_id, "token accepted");
        }
        on_result(outcome);
        Ok(())
    }

    /// Forget the session locally. The token itself stays valid on the server.
    async fn logout(&self) -> Result<(), AuthError> {
        if let Some(on_result) = self.stored_callback() {
            on_result(Ok(None));
        }
        Ok(())
    }
}

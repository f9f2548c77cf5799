use std::sync::Mutex;

use async_trait::async_trait;
use tracing::debug;

use estatevue::{AuthCallback, AuthConfig, AuthError, AuthProvider, AuthUser};

/// Signs in a fixed demo agent without talking to any backend.
pub struct DemoAuthProvider {
    user: AuthUser,
    callback: Mutex<Option<AuthCallback>>,
}

impl DemoAuthProvider {
    pub fn new() -> Self {
        Self {
            user: AuthUser::new("demo-agent").with_profile(serde_json::json!({
                "name": "Demo Agent",
                "email": "demo@estatevue.local"
            })),
            callback: Mutex::new(None),
        }
    }
}

#[async_trait]
impl AuthProvider for DemoAuthProvider {
    async fn initialize(
        &self,
        _config: &AuthConfig,
        on_result: AuthCallback,
    ) -> Result<(), AuthError> {
        debug!(user = %self.user.user_id, "demo sign-in");
        on_result(Ok(Some(self.user.clone())));
        *self.callback.lock().unwrap_or_else(|e| e.into_inner()) = Some(on_result);
        Ok(())
    }

    async fn logout(&self) -> Result<(), AuthError> {
        let callback = self
            .callback
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        if let Some(on_result) = callback {
            on_result(Ok(None));
        }
        Ok(())
    }
}

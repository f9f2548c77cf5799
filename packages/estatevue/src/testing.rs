//! Test doubles for the external collaborators.
//!
//! Enabled for this crate's own tests and, for downstream crates, through
//! the `testing` feature.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{AuthError, RepositoryError};
use crate::notify::{Notification, NotificationLevel, NotificationSink};
use crate::repository::{FetchQuery, InMemoryPropertyRepository, PropertyRepository};
use crate::session::{AuthCallback, AuthConfig, AuthProvider, AuthUser};
use crate::types::{ListingId, ListingPatch, NewListing, PropertyListing};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

// =============================================================================
// Notifications
// =============================================================================

/// Records every notification for later assertions.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        lock(&self.notifications).clone()
    }

    pub fn of_level(&self, level: NotificationLevel) -> Vec<String> {
        lock(&self.notifications)
            .iter()
            .filter(|n| n.level == level)
            .map(|n| n.message.clone())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.notifications).is_empty()
    }
}

impl NotificationSink for RecordingNotifier {
    fn notify(&self, level: NotificationLevel, message: &str) {
        lock(&self.notifications).push(Notification::new(level, message));
    }
}

// =============================================================================
// Authentication
// =============================================================================

/// Auth provider that resolves immediately with a fixed outcome.
#[derive(Default)]
pub struct StubAuthProvider {
    outcome: Option<Result<AuthUser, AuthError>>,
    init_error: Option<AuthError>,
    callback: Mutex<Option<AuthCallback>>,
    logouts: Mutex<usize>,
}

impl StubAuthProvider {
    pub fn signed_in(user: AuthUser) -> Self {
        Self {
            outcome: Some(Ok(user)),
            ..Default::default()
        }
    }

    pub fn signed_out() -> Self {
        Self::default()
    }

    /// The login attempt reports an error through the callback.
    pub fn rejecting(error: AuthError) -> Self {
        Self {
            outcome: Some(Err(error)),
            ..Default::default()
        }
    }

    /// `initialize` itself fails.
    pub fn broken(error: AuthError) -> Self {
        Self {
            init_error: Some(error),
            ..Default::default()
        }
    }

    pub fn logout_count(&self) -> usize {
        *lock(&self.logouts)
    }
}

#[async_trait]
impl AuthProvider for StubAuthProvider {
    async fn initialize(
        &self,
        _config: &AuthConfig,
        on_result: AuthCallback,
    ) -> Result<(), AuthError> {
        if let Some(err) = &self.init_error {
            return Err(err.clone());
        }
        let outcome = match &self.outcome {
            Some(Ok(user)) => Ok(Some(user.clone())),
            Some(Err(err)) => Err(err.clone()),
            None => Ok(None),
        };
        on_result(outcome);
        *lock(&self.callback) = Some(on_result);
        Ok(())
    }

    async fn logout(&self) -> Result<(), AuthError> {
        *lock(&self.logouts) += 1;
        let callback = lock(&self.callback).clone();
        if let Some(on_result) = callback {
            on_result(Ok(None));
        }
        Ok(())
    }
}

// =============================================================================
// Repository
// =============================================================================

/// In-memory repository with scripted failures, delays and call recording.
#[derive(Debug, Default)]
pub struct ScriptedRepository {
    inner: InMemoryPropertyRepository,
    fetch_failures: Mutex<VecDeque<RepositoryError>>,
    fetch_delays: Mutex<VecDeque<Duration>>,
    create_failures: Mutex<VecDeque<RepositoryError>>,
    update_failures: Mutex<VecDeque<RepositoryError>>,
    fetch_calls: Mutex<Vec<FetchQuery>>,
    update_calls: Mutex<Vec<(ListingId, ListingPatch)>>,
    create_calls: Mutex<Vec<NewListing>>,
}

impl ScriptedRepository {
    pub fn with_listings(listings: Vec<PropertyListing>) -> Self {
        Self {
            inner: InMemoryPropertyRepository::with_listings(listings),
            ..Default::default()
        }
    }

    pub fn fail_next_fetch(&self, error: RepositoryError) -> &Self {
        lock(&self.fetch_failures).push_back(error);
        self
    }

    /// Delay for the next fetch calls, consumed in order.
    pub fn delay_next_fetch(&self, delay: Duration) -> &Self {
        lock(&self.fetch_delays).push_back(delay);
        self
    }

    pub fn fail_next_create(&self, error: RepositoryError) -> &Self {
        lock(&self.create_failures).push_back(error);
        self
    }

    pub fn fail_next_update(&self, error: RepositoryError) -> &Self {
        lock(&self.update_failures).push_back(error);
        self
    }

    pub fn fetch_calls(&self) -> Vec<FetchQuery> {
        lock(&self.fetch_calls).clone()
    }

    pub fn update_calls(&self) -> Vec<(ListingId, ListingPatch)> {
        lock(&self.update_calls).clone()
    }

    pub fn create_calls(&self) -> Vec<NewListing> {
        lock(&self.create_calls).clone()
    }

    pub fn snapshot(&self) -> Vec<PropertyListing> {
        self.inner.snapshot()
    }
}

#[async_trait]
impl PropertyRepository for ScriptedRepository {
    async fn fetch(&self, query: &FetchQuery) -> Result<Vec<PropertyListing>, RepositoryError> {
        lock(&self.fetch_calls).push(query.clone());
        let delay = lock(&self.fetch_delays).pop_front();
        let failure = lock(&self.fetch_failures).pop_front();

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match failure {
            Some(err) => Err(err),
            None => self.inner.fetch(query).await,
        }
    }

    async fn get_by_id(&self, id: ListingId) -> Result<Option<PropertyListing>, RepositoryError> {
        self.inner.get_by_id(id).await
    }

    async fn update(
        &self,
        id: ListingId,
        patch: &ListingPatch,
    ) -> Result<PropertyListing, RepositoryError> {
        lock(&self.update_calls).push((id, patch.clone()));
        let failure = lock(&self.update_failures).pop_front();
        match failure {
            Some(err) => Err(err),
            None => self.inner.update(id, patch).await,
        }
    }

    async fn create(&self, listing: &NewListing) -> Result<PropertyListing, RepositoryError> {
        lock(&self.create_calls).push(listing.clone());
        let failure = lock(&self.create_failures).pop_front();
        match failure {
            Some(err) => Err(err),
            None => self.inner.create(listing).await,
        }
    }
}

//! Application root: composes the stores and runs their effects.
//!
//! ```text
//! AppHandle::dispatch() ──► queue (FIFO) ──► App::process()
//!                              ▲                  │
//!                              │                  ├─► SessionStore.decide()
//!                              │                  ├─► CatalogStore.decide()
//!                              │                  └─► ListingWizard.decide()
//!                              │                          │ command
//!                              │                          ▼
//!                              └──── event ◄──── effect (spawned)
//! ```
//!
//! Machines run to completion on the event loop. Effects are the only
//! suspension points; their results re-enter through the same queue.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender, WeakUnboundedSender};
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, warn};

use crate::catalog::{CatalogCommand, CatalogEvent, CatalogState, CatalogStore};
use crate::config::AppConfig;
use crate::effects;
use crate::machine::Machine;
use crate::notify::{Notification, NotificationLevel, NotificationSink};
use crate::repository::PropertyRepository;
use crate::session::{AuthCallback, AuthConfig, AuthProvider, SessionCommand, SessionEvent, SessionState, SessionStore};
use crate::wizard::{ListingWizard, WizardCommand, WizardEvent};

pub const LISTING_CREATED: &str = "Property listed successfully!";

/// External collaborators, injected at the root.
#[derive(Clone)]
pub struct AppDeps {
    pub repository: Arc<dyn PropertyRepository>,
    pub auth: Arc<dyn AuthProvider>,
    pub notifier: Arc<dyn NotificationSink>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    Session(SessionEvent),
    Catalog(CatalogEvent),
    Wizard(WizardEvent),
}

impl From<SessionEvent> for AppEvent {
    fn from(event: SessionEvent) -> Self {
        AppEvent::Session(event)
    }
}

impl From<CatalogEvent> for AppEvent {
    fn from(event: CatalogEvent) -> Self {
        AppEvent::Catalog(event)
    }
}

impl From<WizardEvent> for AppEvent {
    fn from(event: WizardEvent) -> Self {
        AppEvent::Wizard(event)
    }
}

/// Cloneable dispatcher into the app's event queue.
#[derive(Clone, Debug)]
pub struct AppHandle {
    tx: UnboundedSender<AppEvent>,
}

impl AppHandle {
    /// Queue an event. Returns `false` if the app has shut down.
    pub fn dispatch(&self, event: impl Into<AppEvent>) -> bool {
        let event = event.into();
        match self.tx.send(event) {
            Ok(()) => true,
            Err(mpsc::error::SendError(event)) => {
                debug!(?event, "app stopped, dropping event");
                false
            }
        }
    }
}

pub struct App {
    session: SessionStore,
    catalog: CatalogStore,
    wizard: ListingWizard,
    deps: AppDeps,
    auth_config: AuthConfig,
    reset_delay: Duration,
    // Weak so the queue closes once every handle and effect is gone.
    tx: WeakUnboundedSender<AppEvent>,
    rx: UnboundedReceiver<AppEvent>,
    effects: JoinSet<()>,
}

impl App {
    pub fn new(deps: AppDeps, config: &AppConfig) -> (Self, AppHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let app = Self {
            session: SessionStore::new(),
            catalog: CatalogStore::new(config.page_size),
            wizard: ListingWizard::new(),
            deps,
            auth_config: config.auth_config(),
            reset_delay: config.reset_delay,
            tx: tx.downgrade(),
            rx,
            effects: JoinSet::new(),
        };
        (app, AppHandle { tx })
    }

    pub fn session(&self) -> &SessionState {
        self.session.state()
    }

    pub fn catalog(&self) -> &CatalogState {
        self.catalog.state()
    }

    pub fn catalog_store(&self) -> &CatalogStore {
        &self.catalog
    }

    pub fn wizard(&self) -> &ListingWizard {
        &self.wizard
    }

    /// Initialize the auth provider and route its results to the session.
    ///
    /// A provider failure is not fatal: it is logged and the session stays
    /// signed out.
    pub async fn start(&mut self) {
        let tx = self.tx.clone();
        let on_result: AuthCallback = Arc::new(move |outcome| match tx.upgrade() {
            Some(tx) => {
                let _ = tx.send(AppEvent::Session(SessionEvent::AuthResolved(outcome)));
            }
            None => debug!("app stopped, dropping auth result"),
        });

        if let Err(err) = self.deps.auth.initialize(&self.auth_config, on_result).await {
            warn!(error = %err, "auth provider failed to initialize");
            self.process(SessionEvent::AuthResolved(Err(err)).into());
        }
    }

    /// Apply one event and start whatever command it produces.
    pub fn process(&mut self, event: AppEvent) {
        match event {
            AppEvent::Session(event) => {
                let was_authenticated = self.session.is_authenticated();
                let command = self.session.decide(event);
                let authenticated = self.session.is_authenticated();

                if authenticated != was_authenticated {
                    let command = self
                        .catalog
                        .decide(CatalogEvent::SessionChanged { authenticated });
                    self.execute_catalog(command);
                }
                if let Some(SessionCommand::Logout) = command {
                    let auth = self.deps.auth.clone();
                    self.spawn_effect("logout", async move {
                        effects::logout(auth).await;
                        None
                    });
                }
            }
            AppEvent::Catalog(event) => {
                let command = self.catalog.decide(event);
                self.execute_catalog(command);
            }
            AppEvent::Wizard(event) => {
                let command = self.wizard.decide(event);
                self.execute_wizard(command);
            }
        }
    }

    /// Process queued events until nothing is queued and no effect is in
    /// flight. Timers (the wizard reset) are not waited for.
    pub async fn settle(&mut self) {
        loop {
            let mut progressed = false;
            while let Ok(event) = self.rx.try_recv() {
                self.process(event);
                progressed = true;
            }

            match self.effects.join_next().await {
                Some(result) => reap(result),
                None if !progressed => break,
                None => {}
            }
        }
    }

    /// Run until every [`AppHandle`] is dropped and all effects have finished.
    pub async fn run(mut self) {
        info!("app event loop started");
        loop {
            tokio::select! {
                event = self.rx.recv() => match event {
                    Some(event) => self.process(event),
                    None => break,
                },
                Some(result) = self.effects.join_next(), if !self.effects.is_empty() => reap(result),
            }
        }
        while let Some(result) = self.effects.join_next().await {
            reap(result);
        }
        info!("app event loop stopped");
    }

    fn notify(&self, notification: Notification) {
        self.deps
            .notifier
            .notify(notification.level, &notification.message);
    }

    fn execute_catalog(&mut self, command: Option<CatalogCommand>) {
        match command {
            None => {}
            Some(CatalogCommand::Notify(notification)) => self.notify(notification),
            Some(CatalogCommand::Fetch { request, query }) => {
                let repository = self.deps.repository.clone();
                self.spawn_effect("fetch_properties", async move {
                    Some(effects::fetch_properties(repository, request, query).await.into())
                });
            }
            Some(CatalogCommand::SaveFavorite { id, is_favorite }) => {
                let repository = self.deps.repository.clone();
                let notifier = self.deps.notifier.clone();
                self.spawn_effect("save_favorite", async move {
                    Some(
                        effects::save_favorite(repository, notifier, id, is_favorite)
                            .await
                            .into(),
                    )
                });
            }
        }
    }

    fn execute_wizard(&mut self, command: Option<WizardCommand>) {
        match command {
            None => {}
            Some(WizardCommand::Notify(notification)) => self.notify(notification),
            Some(WizardCommand::CreateListing { ticket, listing }) => {
                let repository = self.deps.repository.clone();
                self.spawn_effect("create_listing", async move {
                    Some(effects::create_listing(repository, ticket, listing).await.into())
                });
            }
            Some(WizardCommand::ListingCreated { ticket, .. }) => {
                self.deps
                    .notifier
                    .notify(NotificationLevel::Success, LISTING_CREATED);

                let Some(tx) = self.tx.upgrade() else {
                    return;
                };
                let delay = self.reset_delay;
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let _ = tx.send(WizardEvent::ResetElapsed { ticket }.into());
                });
            }
        }
    }

    fn spawn_effect<F>(&mut self, name: &'static str, effect: F)
    where
        F: Future<Output = Option<AppEvent>> + Send + 'static,
    {
        let Some(tx) = self.tx.upgrade() else {
            debug!(effect = name, "app stopped, effect not started");
            return;
        };
        self.effects.spawn(async move {
            if let Some(event) = effect.await {
                if tx.send(event).is_err() {
                    debug!(effect = name, "app stopped, dropping effect result");
                }
            }
        });
    }
}

fn reap(result: Result<(), JoinError>) {
    if let Err(err) = result {
        error!(error = %err, "effect task failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{sample_listings, InMemoryPropertyRepository};
    use crate::session::AuthUser;
    use crate::testing::{RecordingNotifier, StubAuthProvider};
    use crate::types::PropertyFilter;

    fn app_with(repository: Arc<dyn PropertyRepository>) -> (App, AppHandle, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::new());
        let deps = AppDeps {
            repository,
            auth: Arc::new(StubAuthProvider::signed_in(AuthUser::new("agent-1"))),
            notifier: notifier.clone(),
        };
        let (app, handle) = App::new(deps, &AppConfig::default());
        (app, handle, notifier)
    }

    #[tokio::test]
    async fn test_start_signs_in_and_mount_loads_catalog() {
        let repo = Arc::new(InMemoryPropertyRepository::with_listings(sample_listings()));
        let (mut app, handle, _) = app_with(repo);

        app.start().await;
        handle.dispatch(CatalogEvent::Mounted);
        app.settle().await;

        assert!(app.session().is_authenticated);
        assert_eq!(app.catalog().properties.len(), 6);
        assert!(!app.catalog().loading);
    }

    #[tokio::test]
    async fn test_filter_change_refetches_server_side() {
        let repo = Arc::new(InMemoryPropertyRepository::with_listings(sample_listings()));
        let (mut app, handle, _) = app_with(repo);
        app.start().await;
        handle.dispatch(CatalogEvent::Mounted);
        app.settle().await;

        handle.dispatch(CatalogEvent::FilterChanged(PropertyFilter::Condo));
        app.settle().await;

        let ids: Vec<_> = app.catalog().properties.iter().map(|l| l.id.0).collect();
        assert_eq!(ids, vec![4]);
    }

    #[tokio::test]
    async fn test_logout_clears_session() {
        let repo = Arc::new(InMemoryPropertyRepository::new());
        let (mut app, handle, _) = app_with(repo);
        app.start().await;
        app.settle().await;

        handle.dispatch(SessionEvent::LogoutRequested);
        app.settle().await;

        assert!(!app.session().is_authenticated);
        assert!(!app.catalog_store().is_authenticated());
    }

    #[tokio::test]
    async fn test_run_stops_when_handles_drop() {
        let repo = Arc::new(InMemoryPropertyRepository::with_listings(sample_listings()));
        let (app, handle, _) = app_with(repo);

        let task = tokio::spawn(app.run());
        handle.dispatch(CatalogEvent::Mounted);
        drop(handle);

        tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .expect("loop should stop")
            .expect("loop should not panic");
    }
}

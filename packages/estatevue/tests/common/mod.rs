// Common test utilities
#![allow(dead_code)]

use std::sync::Arc;

use estatevue::testing::{RecordingNotifier, ScriptedRepository, StubAuthProvider};
use estatevue::{
    sample_listings, App, AppConfig, AppDeps, AppHandle, AuthUser, DraftEdit, PropertyType,
    WizardEvent,
};

/// A fully wired app over scripted collaborators.
pub struct TestApp {
    pub app: App,
    pub handle: AppHandle,
    pub repository: Arc<ScriptedRepository>,
    pub auth: Arc<StubAuthProvider>,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestApp {
    pub fn new(auth: StubAuthProvider) -> Self {
        Self::with_repository(auth, ScriptedRepository::with_listings(sample_listings()))
    }

    pub fn signed_in() -> Self {
        Self::new(StubAuthProvider::signed_in(AuthUser::new("agent-1")))
    }

    pub fn signed_out() -> Self {
        Self::new(StubAuthProvider::signed_out())
    }

    pub fn with_repository(auth: StubAuthProvider, repository: ScriptedRepository) -> Self {
        // Run tests with: RUST_LOG=debug cargo test -- --nocapture
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let repository = Arc::new(repository);
        let auth = Arc::new(auth);
        let notifier = Arc::new(RecordingNotifier::new());
        let deps = AppDeps {
            repository: repository.clone(),
            auth: auth.clone(),
            notifier: notifier.clone(),
        };
        let (app, handle) = App::new(deps, &AppConfig::default());

        Self {
            app,
            handle,
            repository,
            auth,
            notifier,
        }
    }

    /// Start auth and mount the catalog, then wait for the first load.
    pub async fn mounted(mut self) -> Self {
        self.app.start().await;
        self.handle.dispatch(estatevue::CatalogEvent::Mounted);
        self.app.settle().await;
        self
    }

    pub async fn dispatch(&mut self, event: impl Into<estatevue::AppEvent>) {
        self.handle.dispatch(event);
        self.app.settle().await;
    }
}

/// Events that walk a fresh wizard to the images step with a valid draft.
pub fn complete_draft_events() -> Vec<WizardEvent> {
    let edits = [
        DraftEdit::Title("Lakeside Cottage".into()),
        DraftEdit::Description("Two bedrooms on the water".into()),
        DraftEdit::Price("425000".into()),
        DraftEdit::PropertyType(PropertyType::House),
        DraftEdit::Address("12 Shore Rd".into()),
        DraftEdit::City("Madison".into()),
        DraftEdit::State("WI".into()),
        DraftEdit::Zip("53703".into()),
        DraftEdit::Bedrooms("2".into()),
        DraftEdit::Bathrooms("1.5".into()),
        DraftEdit::SquareFeet("1100".into()),
    ];

    let mut events: Vec<WizardEvent> = edits.into_iter().map(WizardEvent::FieldEdited).collect();
    events.push(WizardEvent::FeatureToggled("Dock".into()));
    events.extend([WizardEvent::Advanced, WizardEvent::Advanced, WizardEvent::Advanced]);
    events
}

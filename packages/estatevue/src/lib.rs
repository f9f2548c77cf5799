//! # EstateVue
//!
//! Client-side state for a real-estate listing browser: a property catalog
//! that fetches, filters and favorites listings, a multi-step wizard for
//! creating a listing, and the signed-in session.
//!
//! ## Architecture
//!
//! Each store is a [`Machine`]: a synchronous, side-effect-free decision
//! function over its own state. IO happens only in effects, whose results are
//! dispatched back as events.
//!
//! ```text
//! user intent ─► AppHandle ─► App ─► Machine.decide() ─► Command
//!                   ▲                                      │
//!                   └───────── event ◄──── effect (IO) ◄───┘
//! ```
//!
//! - [`CatalogStore`]: listings, loading/error, filter and search; drops
//!   stale fetch responses by request generation
//! - [`ListingWizard`]: draft, current step, field errors, submission
//! - [`SessionStore`]: who is signed in
//!
//! The backend ([`PropertyRepository`]), the login widget ([`AuthProvider`])
//! and toasts ([`NotificationSink`]) are collaborators injected through
//! [`AppDeps`].
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use estatevue::{App, AppConfig, AppDeps, CatalogEvent, InMemoryPropertyRepository, TracingNotifier};
//!
//! let deps = AppDeps {
//!     repository: Arc::new(InMemoryPropertyRepository::with_listings(estatevue::sample_listings())),
//!     auth: my_auth_provider,
//!     notifier: Arc::new(TracingNotifier),
//! };
//! let (mut app, handle) = App::new(deps, &AppConfig::from_env()?);
//! app.start().await;
//! handle.dispatch(CatalogEvent::Mounted);
//! app.settle().await;
//! for listing in app.catalog().visible() {
//!     println!("{}", listing.title);
//! }
//! ```

mod app;
mod catalog;
mod config;
mod draft;
mod effects;
mod error;
mod machine;
mod notify;
mod preferences;
mod repository;
mod session;
mod types;
mod validation;
mod wizard;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use app::{App, AppDeps, AppEvent, AppHandle, LISTING_CREATED};
pub use catalog::{
    CatalogAction, CatalogCommand, CatalogEvent, CatalogState, CatalogStore, RequestId,
    SIGN_IN_TO_FAVORITE,
};
pub use config::{AppConfig, DEFAULT_RESET_DELAY};
pub use draft::{Draft, DraftEdit};
pub use effects::{FAVORITE_ADDED, FAVORITE_REMOVED};
pub use error::{AuthError, PreferenceError, RepositoryError};
pub use machine::Machine;
pub use notify::{Notification, NotificationLevel, NotificationSink, TracingNotifier};
pub use preferences::{
    JsonFilePreferenceStore, MemoryPreferenceStore, PreferenceStore, ThemePreference,
    DARK_MODE_KEY,
};
pub use repository::{
    sample_listings, FetchQuery, InMemoryPropertyRepository, PropertyRepository,
    DEFAULT_PAGE_SIZE,
};
pub use session::{
    AuthCallback, AuthConfig, AuthOutcome, AuthProvider, AuthUser, SessionCommand, SessionEvent,
    SessionState, SessionStore,
};
pub use types::{
    format_price, Address, ImageRef, ListingId, ListingPatch, NewListing, PropertyFilter,
    PropertyListing, PropertyType,
};
pub use validation::{first_invalid_step, validate_step, Field, FieldErrors, WizardStep};
pub use wizard::{
    ListingWizard, SubmissionStatus, SubmissionTicket, WizardCommand, WizardEvent,
};

// Re-export commonly used external types
pub use async_trait::async_trait;
pub use rust_decimal::Decimal;

//! Effects: command handlers that perform IO and return events.
//!
//! Effects are stateless. Commands carry all needed data, and the outcome
//! (success or failure) comes back as an event for the issuing machine.
//! Repository errors stop here: machines only ever see the message.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::catalog::{CatalogEvent, RequestId};
use crate::error::RepositoryError;
use crate::notify::{NotificationLevel, NotificationSink};
use crate::repository::{FetchQuery, PropertyRepository};
use crate::session::AuthProvider;
use crate::types::{ListingId, ListingPatch, NewListing};
use crate::wizard::{SubmissionTicket, WizardEvent};

pub const FAVORITE_ADDED: &str = "Property added to favorites!";
pub const FAVORITE_REMOVED: &str = "Property removed from favorites";

pub async fn fetch_properties(
    repository: Arc<dyn PropertyRepository>,
    request: RequestId,
    query: FetchQuery,
) -> CatalogEvent {
    match repository.fetch(&query).await {
        Ok(properties) => CatalogEvent::FetchSucceeded {
            request,
            properties,
        },
        Err(err) => {
            warn!(request = %request, error = %err, "error fetching properties");
            CatalogEvent::FetchFailed {
                request,
                message: err.to_string(),
            }
        }
    }
}

/// Read-then-write so a missing record fails before any write is attempted.
async fn set_favorite(
    repository: &dyn PropertyRepository,
    id: ListingId,
    is_favorite: bool,
) -> Result<(), RepositoryError> {
    repository
        .get_by_id(id)
        .await?
        .ok_or(RepositoryError::NotFound(id))?;
    repository
        .update(id, &ListingPatch::favorite(is_favorite))
        .await?;
    Ok(())
}

pub async fn save_favorite(
    repository: Arc<dyn PropertyRepository>,
    notifier: Arc<dyn NotificationSink>,
    id: ListingId,
    is_favorite: bool,
) -> CatalogEvent {
    match set_favorite(repository.as_ref(), id, is_favorite).await {
        Ok(()) => {
            let message = if is_favorite {
                FAVORITE_ADDED
            } else {
                FAVORITE_REMOVED
            };
            notifier.notify(NotificationLevel::Success, message);
            CatalogEvent::FavoriteSaved { id }
        }
        Err(err) => {
            warn!(property = %id, error = %err, "error toggling favorite");
            CatalogEvent::FavoriteFailed {
                id,
                message: err.to_string(),
            }
        }
    }
}

pub async fn create_listing(
    repository: Arc<dyn PropertyRepository>,
    ticket: SubmissionTicket,
    listing: NewListing,
) -> WizardEvent {
    match repository.create(&listing).await {
        Ok(listing) => WizardEvent::SubmitSucceeded { ticket, listing },
        Err(err) => {
            warn!(ticket = %ticket, error = %err, "error creating property");
            WizardEvent::SubmitFailed {
                ticket,
                message: err.to_string(),
            }
        }
    }
}

/// The provider reports the sign-out through its callback; a failure here is
/// only logged because the local session is already cleared.
pub async fn logout(auth: Arc<dyn AuthProvider>) {
    match auth.logout().await {
        Ok(()) => debug!("provider logout complete"),
        Err(err) => warn!(error = %err, "provider logout failed"),
    }
}

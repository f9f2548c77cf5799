//! Property catalog: the fetched, filterable collection of listings.
//!
//! [`CatalogState::apply`] is the pure reducer. [`CatalogStore`] wraps it in a
//! [`Machine`] that decides when to fetch and drops stale responses.
//!
//! # Request generations
//!
//! Every fetch is tagged with a [`RequestId`]. Only the response carrying the
//! latest id is applied; anything older (a slow fetch overtaken by a filter
//! change, or a response arriving after unmount or logout) is ignored.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::machine::Machine;
use crate::notify::Notification;
use crate::repository::{FetchQuery, DEFAULT_PAGE_SIZE};
use crate::types::{ListingId, PropertyFilter, PropertyListing};

// =============================================================================
// Reducer
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum CatalogAction {
    SetProperties(Vec<PropertyListing>),
    SetLoading(bool),
    SetError(Option<String>),
    SetFilter(PropertyFilter),
    SetSearchQuery(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogState {
    /// Listings from the last successful fetch, in source order.
    pub properties: Vec<PropertyListing>,
    pub loading: bool,
    pub error: Option<String>,
    pub active_filter: PropertyFilter,
    pub search_query: String,
}

impl CatalogState {
    /// Apply one action. Total: every action is valid in every state.
    pub fn apply(mut self, action: CatalogAction) -> Self {
        match action {
            CatalogAction::SetProperties(properties) => {
                self.properties = properties;
                self.loading = false;
                self.error = None;
            }
            // Existing properties stay visible while reloading.
            CatalogAction::SetLoading(loading) => self.loading = loading,
            CatalogAction::SetError(error) => {
                self.error = error;
                self.loading = false;
            }
            CatalogAction::SetFilter(filter) => self.active_filter = filter,
            CatalogAction::SetSearchQuery(query) => self.search_query = query,
        }
        self
    }

    /// Client-side filter over the fetched list: search text against title
    /// or location, active filter against type.
    pub fn visible(&self) -> Vec<&PropertyListing> {
        self.properties
            .iter()
            .filter(|listing| listing.matches_search(&self.search_query))
            .filter(|listing| self.active_filter.matches(listing.property_type))
            .collect()
    }

    /// Query the repository would be asked for given the current filters.
    pub fn query(&self, page_size: u32) -> FetchQuery {
        FetchQuery::new(self.search_query.clone(), self.active_filter).with_limit(page_size)
    }

    pub fn find(&self, id: ListingId) -> Option<&PropertyListing> {
        self.properties.iter().find(|listing| listing.id == id)
    }
}

// =============================================================================
// Store
// =============================================================================

/// Generation tag of one catalog fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CatalogEvent {
    Mounted,
    Unmounted,
    SessionChanged { authenticated: bool },
    FilterChanged(PropertyFilter),
    SearchChanged(String),
    RetryRequested,
    FetchSucceeded {
        request: RequestId,
        properties: Vec<PropertyListing>,
    },
    FetchFailed {
        request: RequestId,
        message: String,
    },
    FavoriteToggled { id: ListingId, is_favorite: bool },
    FavoriteSaved { id: ListingId },
    FavoriteFailed { id: ListingId, message: String },
    ContactRequested { id: ListingId },
}

#[derive(Debug, Clone, PartialEq)]
pub enum CatalogCommand {
    Fetch { request: RequestId, query: FetchQuery },
    SaveFavorite { id: ListingId, is_favorite: bool },
    Notify(Notification),
}

pub const SIGN_IN_TO_FAVORITE: &str = "Please sign in to save favorites";

#[derive(Debug, Clone)]
pub struct CatalogStore {
    state: CatalogState,
    authenticated: bool,
    mounted: bool,
    latest_request: RequestId,
    page_size: u32,
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl CatalogStore {
    pub fn new(page_size: u32) -> Self {
        Self {
            state: CatalogState::default(),
            authenticated: false,
            mounted: false,
            latest_request: RequestId::default(),
            page_size,
        }
    }

    pub fn state(&self) -> &CatalogState {
        &self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn latest_request(&self) -> RequestId {
        self.latest_request
    }

    fn reduce(&mut self, action: CatalogAction) {
        self.state = std::mem::take(&mut self.state).apply(action);
    }

    fn is_active(&self) -> bool {
        self.authenticated && self.mounted
    }

    /// Orphan whatever fetch is in flight.
    fn invalidate(&mut self) {
        self.latest_request = RequestId(self.latest_request.0 + 1);
        if self.state.loading {
            self.reduce(CatalogAction::SetLoading(false));
        }
    }

    fn issue_fetch(&mut self) -> Option<CatalogCommand> {
        if !self.is_active() {
            debug!(
                authenticated = self.authenticated,
                mounted = self.mounted,
                "catalog fetch skipped"
            );
            return None;
        }

        self.latest_request = RequestId(self.latest_request.0 + 1);
        self.reduce(CatalogAction::SetLoading(true));

        let query = self.state.query(self.page_size);
        debug!(request = %self.latest_request, search = %query.search_query, property_type = %query.property_type, "catalog fetch issued");
        Some(CatalogCommand::Fetch {
            request: self.latest_request,
            query,
        })
    }

    fn is_current(&self, request: RequestId) -> bool {
        if request == self.latest_request && self.mounted {
            return true;
        }
        debug!(
            request = %request,
            latest = %self.latest_request,
            mounted = self.mounted,
            "dropping stale catalog response"
        );
        false
    }
}

impl Machine for CatalogStore {
    type Event = CatalogEvent;
    type Command = CatalogCommand;

    fn decide(&mut self, event: CatalogEvent) -> Option<CatalogCommand> {
        match event {
            CatalogEvent::Mounted => {
                self.mounted = true;
                self.issue_fetch()
            }
            CatalogEvent::Unmounted => {
                self.mounted = false;
                self.invalidate();
                None
            }
            CatalogEvent::SessionChanged { authenticated } => {
                if authenticated == self.authenticated {
                    return None;
                }
                self.authenticated = authenticated;
                if authenticated {
                    self.issue_fetch()
                } else {
                    self.invalidate();
                    None
                }
            }
            CatalogEvent::FilterChanged(filter) => {
                if filter == self.state.active_filter {
                    return None;
                }
                self.reduce(CatalogAction::SetFilter(filter));
                self.issue_fetch()
            }
            CatalogEvent::SearchChanged(query) => {
                if query == self.state.search_query {
                    return None;
                }
                self.reduce(CatalogAction::SetSearchQuery(query));
                self.issue_fetch()
            }
            CatalogEvent::RetryRequested => self.issue_fetch(),
            CatalogEvent::FetchSucceeded {
                request,
                properties,
            } => {
                if self.is_current(request) {
                    info!(request = %request, count = properties.len(), "catalog loaded");
                    self.reduce(CatalogAction::SetProperties(properties));
                }
                None
            }
            CatalogEvent::FetchFailed { request, message } => {
                if !self.is_current(request) {
                    return None;
                }
                self.reduce(CatalogAction::SetError(Some(message.clone())));
                Some(CatalogCommand::Notify(Notification::error(format!(
                    "Failed to load properties: {}",
                    message
                ))))
            }
            CatalogEvent::FavoriteToggled { id, is_favorite } => {
                if !self.authenticated {
                    return Some(CatalogCommand::Notify(Notification::warning(
                        SIGN_IN_TO_FAVORITE,
                    )));
                }
                Some(CatalogCommand::SaveFavorite { id, is_favorite })
            }
            // The refetch is the source of truth for the favorite flag.
            CatalogEvent::FavoriteSaved { id } => {
                debug!(property = %id, "favorite saved, resynchronizing");
                self.issue_fetch()
            }
            CatalogEvent::FavoriteFailed { id, message } => {
                Some(CatalogCommand::Notify(Notification::error(format!(
                    "Could not update favorite for property {}: {}",
                    id, message
                ))))
            }
            CatalogEvent::ContactRequested { id } => {
                let notification = match self.state.find(id) {
                    Some(listing) => {
                        Notification::info(format!("Contact the agent about {}", listing.title))
                    }
                    None => {
                        Notification::warning(format!("Property {} is not in the catalog", id))
                    }
                };
                Some(CatalogCommand::Notify(notification))
            }
        }
    }
}

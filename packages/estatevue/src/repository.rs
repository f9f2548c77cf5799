//! Property Repository collaborator and an in-memory implementation.

use std::collections::BTreeSet;
use std::str::FromStr;
use std::sync::Mutex;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RepositoryError;
use crate::types::{
    Address, ListingId, ListingPatch, NewListing, PropertyFilter, PropertyListing, PropertyType,
};

/// Default page size for catalog fetches.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Parameters of one catalog fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchQuery {
    pub search_query: String,
    /// Empty string means "any type".
    pub property_type: String,
    pub limit: u32,
    pub offset: u32,
}

impl FetchQuery {
    pub fn new(search_query: impl Into<String>, filter: PropertyFilter) -> Self {
        Self {
            search_query: search_query.into(),
            property_type: filter.as_query_param().to_string(),
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    /// Whether `listing` satisfies this query's search and type filters.
    pub fn matches(&self, listing: &PropertyListing) -> bool {
        let type_matches = self.property_type.is_empty()
            || self.property_type.eq_ignore_ascii_case(listing.property_type.as_str());
        let search_matches = self.search_query.is_empty() || listing.matches_search(&self.search_query);
        type_matches && search_matches
    }
}

impl Default for FetchQuery {
    fn default() -> Self {
        Self::new("", PropertyFilter::All)
    }
}

/// CRUD-style access to persisted listings.
#[async_trait]
pub trait PropertyRepository: Send + Sync {
    /// Listings matching `query`, in source order.
    async fn fetch(&self, query: &FetchQuery) -> Result<Vec<PropertyListing>, RepositoryError>;

    async fn get_by_id(&self, id: ListingId) -> Result<Option<PropertyListing>, RepositoryError>;

    /// Apply `patch` to an existing listing.
    async fn update(
        &self,
        id: ListingId,
        patch: &ListingPatch,
    ) -> Result<PropertyListing, RepositoryError>;

    async fn create(&self, listing: &NewListing) -> Result<PropertyListing, RepositoryError>;
}

/// Repository backed by a `Vec`, used for demo mode and tests.
///
/// Filtering mirrors the remote service: case-insensitive "contains" on
/// title or location, exact match on type, then offset/limit paging.
#[derive(Debug, Default)]
pub struct InMemoryPropertyRepository {
    listings: Mutex<Vec<PropertyListing>>,
}

impl InMemoryPropertyRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_listings(listings: Vec<PropertyListing>) -> Self {
        Self {
            listings: Mutex::new(listings),
        }
    }

    pub fn snapshot(&self) -> Vec<PropertyListing> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<PropertyListing>> {
        // A poisoned lock only means another caller panicked mid-read.
        self.listings.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl PropertyRepository for InMemoryPropertyRepository {
    async fn fetch(&self, query: &FetchQuery) -> Result<Vec<PropertyListing>, RepositoryError> {
        let listings = self.lock();
        let page: Vec<PropertyListing> = listings
            .iter()
            .filter(|listing| query.matches(listing))
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .cloned()
            .collect();
        debug!(
            search = %query.search_query,
            property_type = %query.property_type,
            count = page.len(),
            "in-memory fetch"
        );
        Ok(page)
    }

    async fn get_by_id(&self, id: ListingId) -> Result<Option<PropertyListing>, RepositoryError> {
        Ok(self.lock().iter().find(|listing| listing.id == id).cloned())
    }

    async fn update(
        &self,
        id: ListingId,
        patch: &ListingPatch,
    ) -> Result<PropertyListing, RepositoryError> {
        let mut listings = self.lock();
        let listing = listings
            .iter_mut()
            .find(|listing| listing.id == id)
            .ok_or(RepositoryError::NotFound(id))?;
        patch.apply_to(listing);
        Ok(listing.clone())
    }

    async fn create(&self, listing: &NewListing) -> Result<PropertyListing, RepositoryError> {
        let mut listings = self.lock();
        let next_id = listings.iter().map(|l| l.id.0).max().unwrap_or(0) + 1;
        let created = listing.clone().into_listing(ListingId(next_id));
        listings.push(created.clone());
        Ok(created)
    }
}

/// The six demo listings shown on the home page.
pub fn sample_listings() -> Vec<PropertyListing> {
    let rows: [(i64, &str, &str, &str, &str, i64, u32, &str, u32, PropertyType); 6] = [
        (1, "Modern Waterfront Villa", "1 Bayshore Dr", "Miami", "FL", 1_250_000, 4, "3", 2800, PropertyType::House),
        (2, "Downtown Luxury Apartment", "350 W 42nd St", "New York", "NY", 850_000, 2, "2", 1200, PropertyType::Apartment),
        (3, "Suburban Family Home", "78 Oak Hollow Ln", "Austin", "TX", 550_000, 3, "2.5", 2100, PropertyType::House),
        (4, "Oceanview Condo", "9 Harbor Way", "San Diego", "CA", 690_000, 2, "2", 1350, PropertyType::Condo),
        (5, "Cityview Penthouse", "1 N Wacker Dr", "Chicago", "IL", 1_750_000, 3, "3.5", 2900, PropertyType::Apartment),
        (6, "Rustic Mountain Retreat", "400 Aspen Ridge Rd", "Denver", "CO", 920_000, 4, "3", 2600, PropertyType::House),
    ];

    rows.into_iter()
        .map(
            |(id, title, street, city, state, price, bedrooms, bathrooms, square_feet, property_type)| {
                PropertyListing {
                    id: ListingId(id),
                    title: title.to_string(),
                    description: format!("{} in {}, {}", property_type.label(), city, state),
                    price: Decimal::from(price),
                    address: Address {
                        street: street.to_string(),
                        city: city.to_string(),
                        state: state.to_string(),
                        zip: String::new(),
                    },
                    property_type,
                    bedrooms,
                    bathrooms: Decimal::from_str(bathrooms).unwrap_or(Decimal::ONE),
                    square_feet,
                    features: BTreeSet::new(),
                    images: Vec::new(),
                    is_favorite: false,
                }
            },
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_matches_title_or_location_case_insensitively() {
        let repo = InMemoryPropertyRepository::with_listings(sample_listings());

        let results = repo
            .fetch(&FetchQuery::new("miami", PropertyFilter::All))
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert!(results
            .iter()
            .all(|l| l.title.to_lowercase().contains("miami") || l.location().to_lowercase().contains("miami")));

        let results = repo
            .fetch(&FetchQuery::new("CONDO", PropertyFilter::All))
            .await
            .unwrap();
        assert_eq!(results.iter().map(|l| l.id).collect::<Vec<_>>(), vec![ListingId(4)]);
    }

    #[tokio::test]
    async fn test_fetch_filters_by_type_and_preserves_order() {
        let repo = InMemoryPropertyRepository::with_listings(sample_listings());

        let houses = repo
            .fetch(&FetchQuery::new("", PropertyFilter::House))
            .await
            .unwrap();

        assert_eq!(
            houses.iter().map(|l| l.id.0).collect::<Vec<_>>(),
            vec![1, 3, 6]
        );
    }

    #[tokio::test]
    async fn test_fetch_pages_with_limit_and_offset() {
        let repo = InMemoryPropertyRepository::with_listings(sample_listings());

        let page = repo
            .fetch(&FetchQuery::default().with_limit(2).with_offset(2))
            .await
            .unwrap();

        assert_eq!(page.iter().map(|l| l.id.0).collect::<Vec<_>>(), vec![3, 4]);
    }

    #[tokio::test]
    async fn test_update_missing_listing_is_not_found() {
        let repo = InMemoryPropertyRepository::new();

        let err = repo
            .update(ListingId(9), &ListingPatch::favorite(true))
            .await
            .unwrap_err();

        assert_eq!(err, RepositoryError::NotFound(ListingId(9)));
    }

    #[tokio::test]
    async fn test_create_assigns_next_id() {
        let repo = InMemoryPropertyRepository::with_listings(sample_listings());
        let template = sample_listings().remove(0);

        let created = repo
            .create(&NewListing {
                title: "Lakeside Cabin".into(),
                description: template.description,
                price: template.price,
                address: template.address,
                property_type: PropertyType::House,
                bedrooms: 2,
                bathrooms: Decimal::ONE,
                square_feet: 900,
                features: BTreeSet::new(),
                images: Vec::new(),
            })
            .await
            .unwrap();

        assert_eq!(created.id, ListingId(7));
        assert!(!created.is_favorite);
        assert_eq!(repo.snapshot().len(), 7);
    }
}

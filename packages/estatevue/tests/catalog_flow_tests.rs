//! Integration tests for the property catalog driven through the app root.
//!
//! Covers:
//! - Server-side search and type filtering
//! - Stale responses overtaken by a newer query
//! - Favorites for signed-in and signed-out users
//! - Contact-agent requests
//! - Fetch failure, retry, and logout while a fetch is in flight

mod common;

use std::time::Duration;

use common::TestApp;
use estatevue::testing::StubAuthProvider;
use estatevue::{
    AuthError, CatalogEvent, ListingId, ListingPatch, NotificationLevel, PropertyFilter,
    RepositoryError, SessionEvent, FAVORITE_ADDED, SIGN_IN_TO_FAVORITE,
};

fn ids(test: &TestApp) -> Vec<i64> {
    test.app.catalog().properties.iter().map(|l| l.id.0).collect()
}

// ============================================================================
// Loading and filtering
// ============================================================================

#[tokio::test]
async fn mount_loads_first_page_for_signed_in_user() {
    let test = TestApp::signed_in().mounted().await;

    assert_eq!(ids(&test), vec![1, 2, 3, 4, 5, 6]);
    assert!(!test.app.catalog().loading);
    assert_eq!(test.app.catalog().error, None);

    let calls = test.repository.fetch_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].limit, 20);
    assert_eq!(calls[0].offset, 0);
    assert_eq!(calls[0].property_type, "");
}

#[tokio::test]
async fn search_is_sent_to_the_repository() {
    let mut test = TestApp::signed_in().mounted().await;

    test.dispatch(CatalogEvent::SearchChanged("miami".into())).await;

    let last = test.repository.fetch_calls().pop().expect("a fetch");
    assert_eq!(last.search_query, "miami");
    assert_eq!(last.property_type, "");
    assert_eq!(ids(&test), vec![1]);
    assert!(test
        .app
        .catalog()
        .properties
        .iter()
        .all(|l| l.title.to_lowercase().contains("miami")
            || l.location().to_lowercase().contains("miami")));
}

#[tokio::test]
async fn filter_change_refetches_and_unchanged_filter_does_not() {
    let mut test = TestApp::signed_in().mounted().await;

    test.dispatch(CatalogEvent::FilterChanged(PropertyFilter::Apartment))
        .await;
    assert_eq!(ids(&test), vec![2, 5]);
    assert_eq!(test.repository.fetch_calls().len(), 2);

    test.dispatch(CatalogEvent::FilterChanged(PropertyFilter::Apartment))
        .await;
    assert_eq!(test.repository.fetch_calls().len(), 2);
}

#[tokio::test]
async fn signed_out_user_sees_no_fetch() {
    let test = TestApp::signed_out().mounted().await;

    assert!(!test.app.session().is_authenticated);
    assert!(test.repository.fetch_calls().is_empty());
    assert!(test.app.catalog().properties.is_empty());
}

#[tokio::test(start_paused = true)]
async fn slow_response_for_old_filter_is_dropped() {
    let mut test = TestApp::signed_in().mounted().await;
    test.repository.delay_next_fetch(Duration::from_millis(500));

    // Let the slow House fetch start before the filter changes again.
    test.app
        .process(CatalogEvent::FilterChanged(PropertyFilter::House).into());
    tokio::task::yield_now().await;
    test.dispatch(CatalogEvent::FilterChanged(PropertyFilter::Condo))
        .await;

    assert_eq!(test.repository.fetch_calls().len(), 3);
    assert_eq!(test.app.catalog().active_filter, PropertyFilter::Condo);
    assert_eq!(ids(&test), vec![4]);
    assert!(!test.app.catalog().loading);
}

// ============================================================================
// Failure and retry
// ============================================================================

#[tokio::test]
async fn fetch_failure_sets_error_and_retry_recovers() {
    let test = TestApp::signed_in();
    test.repository
        .fail_next_fetch(RepositoryError::Transport("connection refused".into()));
    let mut test = test.mounted().await;

    let error = test.app.catalog().error.clone().expect("error set");
    assert!(error.contains("connection refused"));
    assert!(!test.app.catalog().loading);
    assert_eq!(test.notifier.of_level(NotificationLevel::Error).len(), 1);

    test.dispatch(CatalogEvent::RetryRequested).await;

    assert_eq!(test.app.catalog().error, None);
    assert_eq!(ids(&test).len(), 6);
}

#[tokio::test(start_paused = true)]
async fn logout_drops_in_flight_fetch() {
    let mut test = TestApp::signed_in();
    test.app.start().await;
    test.app.settle().await;
    assert!(test.app.session().is_authenticated);

    test.repository.delay_next_fetch(Duration::from_secs(1));
    test.handle.dispatch(CatalogEvent::Mounted);
    test.handle.dispatch(SessionEvent::LogoutRequested);
    test.app.settle().await;

    assert!(!test.app.session().is_authenticated);
    assert_eq!(test.repository.fetch_calls().len(), 1);
    assert!(test.app.catalog().properties.is_empty());
    assert!(!test.app.catalog().loading);
    assert_eq!(test.auth.logout_count(), 1);
}

// ============================================================================
// Favorites
// ============================================================================

#[tokio::test]
async fn favorite_while_signed_out_warns_and_changes_nothing() {
    let mut test = TestApp::signed_out().mounted().await;
    let before = test.app.catalog().clone();

    test.dispatch(CatalogEvent::FavoriteToggled {
        id: ListingId(42),
        is_favorite: true,
    })
    .await;

    assert_eq!(
        test.notifier.of_level(NotificationLevel::Warning),
        vec![SIGN_IN_TO_FAVORITE.to_string()]
    );
    assert_eq!(test.app.catalog(), &before);
    assert!(test.repository.update_calls().is_empty());
}

#[tokio::test]
async fn favorite_is_saved_then_catalog_resynchronizes() {
    let mut test = TestApp::signed_in().mounted().await;

    test.dispatch(CatalogEvent::FavoriteToggled {
        id: ListingId(3),
        is_favorite: true,
    })
    .await;

    assert_eq!(
        test.repository.update_calls(),
        vec![(ListingId(3), ListingPatch::favorite(true))]
    );
    assert_eq!(
        test.notifier.of_level(NotificationLevel::Success),
        vec![FAVORITE_ADDED.to_string()]
    );
    assert_eq!(test.repository.fetch_calls().len(), 2);

    let listing = test.app.catalog().find(ListingId(3)).expect("listing 3");
    assert!(listing.is_favorite);
}

#[tokio::test]
async fn favorite_for_missing_listing_fails_before_writing() {
    let mut test = TestApp::signed_in().mounted().await;

    test.dispatch(CatalogEvent::FavoriteToggled {
        id: ListingId(42),
        is_favorite: true,
    })
    .await;

    assert!(test.repository.update_calls().is_empty());
    let errors = test.notifier.of_level(NotificationLevel::Error);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("42"));
    assert_eq!(test.app.catalog().error, None);
}

#[tokio::test]
async fn rejected_favorite_write_notifies_without_resync() {
    let mut test = TestApp::signed_in().mounted().await;
    test.repository
        .fail_next_update(RepositoryError::Rejected("listing is locked".into()));

    test.dispatch(CatalogEvent::FavoriteToggled {
        id: ListingId(3),
        is_favorite: true,
    })
    .await;

    assert_eq!(
        test.repository.update_calls(),
        vec![(ListingId(3), ListingPatch::favorite(true))]
    );
    let errors = test.notifier.of_level(NotificationLevel::Error);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("listing is locked"));
    assert!(test.notifier.of_level(NotificationLevel::Success).is_empty());

    assert_eq!(test.app.catalog().error, None);
    assert_eq!(test.repository.fetch_calls().len(), 1);
    let listing = test.app.catalog().find(ListingId(3)).expect("listing 3");
    assert!(!listing.is_favorite);
}

#[tokio::test]
async fn contact_request_shows_info_toast_for_listing() {
    let mut test = TestApp::signed_in().mounted().await;
    let title = test
        .app
        .catalog()
        .find(ListingId(2))
        .expect("listing 2")
        .title
        .clone();

    test.dispatch(CatalogEvent::ContactRequested { id: ListingId(2) })
        .await;

    assert_eq!(
        test.notifier.of_level(NotificationLevel::Info),
        vec![format!("Contact the agent about {}", title)]
    );
    assert_eq!(test.repository.fetch_calls().len(), 1);
    assert!(test.repository.update_calls().is_empty());
}

// ============================================================================
// Session
// ============================================================================

#[tokio::test]
async fn rejected_login_leaves_catalog_idle() {
    let test = TestApp::new(StubAuthProvider::rejecting(AuthError::Failed(
        "expired token".into(),
    )))
    .mounted()
    .await;

    assert!(!test.app.session().is_authenticated);
    assert!(test.repository.fetch_calls().is_empty());
}

#[tokio::test]
async fn broken_provider_is_not_fatal() {
    let test = TestApp::new(StubAuthProvider::broken(AuthError::NotConfigured(
        "missing project id".into(),
    )))
    .mounted()
    .await;

    assert!(!test.app.session().is_authenticated);
    assert!(test.app.session().user.is_none());
    assert!(test.repository.fetch_calls().is_empty());
}

//! End-to-end admin flows: login, session lifetime, and product CRUD.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rust_decimal::Decimal;

use velvet_lane_admin::AdminApp;
use velvet_lane_admin::clock::ManualClock;
use velvet_lane_admin::controllers::{ImageFile, ProductDraft};
use velvet_lane_admin::error::{AdminError, AuthFailureKind};
use velvet_lane_admin::providers::ListOrder;
use velvet_lane_admin::router::ActiveView;
use velvet_lane_admin::session::{SESSION_LIFETIME, SessionState, SignOutReason};
use velvet_lane_admin::ui::AuthUiState;
use velvet_lane_core::Email;
use velvet_lane_integration_tests::{Call, FakeBackend};

const ADMIN: &str = "admin@velvetlane.shop";
const PASSWORD: &str = "correct-horse";

fn app_with(backend: Arc<FakeBackend>, clock: ManualClock) -> AdminApp {
    AdminApp::from_providers(
        Arc::clone(&backend) as _,
        Arc::clone(&backend) as _,
        backend as _,
        Arc::new(clock),
        Email::parse(ADMIN).unwrap(),
    )
}

fn admin_setup() -> (Arc<FakeBackend>, ManualClock, AdminApp) {
    let clock = ManualClock::new(Utc::now());
    let backend = Arc::new(FakeBackend::with_account(clock.clone(), ADMIN, PASSWORD));
    let app = app_with(Arc::clone(&backend), clock.clone());
    (backend, clock, app)
}

fn valid_create() -> ProductDraft {
    ProductDraft {
        title: "Velvet Tote".to_owned(),
        price: "39.99".to_owned(),
        stock: "4".to_owned(),
        category: "bags".to_owned(),
        active: true,
        image_file: Some(ImageFile {
            name: "tote.png".to_owned(),
            bytes: vec![1, 2, 3],
            content_type: "image/png".to_owned(),
        }),
        ..ProductDraft::default()
    }
}

#[tokio::test(start_paused = true)]
async fn test_login_lands_on_dashboard_with_timer_armed() {
    let (backend, _clock, app) = admin_setup();

    let redirect = app.login(ADMIN, PASSWORD).await.unwrap();
    assert_eq!(redirect.as_deref(), Some("#dashboard-view"));
    assert!(app.session().expiry_timer_armed());
    assert!(backend.has_session());
    assert_eq!(app.session().auth_state(), AuthUiState::Admin);
    assert!(!app.overlay().is_busy());
}

#[tokio::test(start_paused = true)]
async fn test_invalid_credentials_classified_and_no_timer() {
    let (backend, _clock, app) = admin_setup();

    let err = app.login(ADMIN, "wrong").await.unwrap_err();
    assert!(matches!(
        err,
        AdminError::AuthFailed(AuthFailureKind::InvalidCredentials)
    ));
    assert!(!app.session().expiry_timer_armed());
    assert!(!backend.has_session());

    let messages: Vec<_> = app
        .notifications()
        .active()
        .into_iter()
        .map(|n| n.message)
        .collect();
    assert_eq!(messages, ["Invalid email or password. Please try again."]);
}

#[tokio::test(start_paused = true)]
async fn test_non_admin_login_is_torn_down() {
    let clock = ManualClock::new(Utc::now());
    let backend = Arc::new(FakeBackend::with_account(
        clock.clone(),
        "visitor@velvetlane.shop",
        PASSWORD,
    ));
    let app = app_with(Arc::clone(&backend), clock);

    let err = app.login("visitor@velvetlane.shop", PASSWORD).await.unwrap_err();
    assert!(matches!(err, AdminError::AccessDenied));
    assert_eq!(backend.count(&Call::SignOut), 1);
    assert!(!backend.has_session());
    assert_eq!(app.session().auth_state(), AuthUiState::Guest);
}

#[tokio::test(start_paused = true)]
async fn test_expired_session_ends_exactly_once() {
    let (backend, clock, app) = admin_setup();
    app.login(ADMIN, PASSWORD).await.unwrap();
    backend.clear_calls();

    clock.advance(chrono::Duration::hours(2));
    let state = app.session().current_session().await;
    assert_eq!(
        state,
        SessionState::Empty {
            reason: Some(SignOutReason::Expired)
        }
    );
    assert_eq!(backend.count(&Call::SignOut), 1);

    // the session is gone; a second check is a plain miss, not a teardown
    let state = app.session().current_session().await;
    assert_eq!(state, SessionState::Empty { reason: None });
    assert_eq!(backend.count(&Call::SignOut), 1);
}

#[tokio::test(start_paused = true)]
async fn test_idle_timer_forces_logout() {
    let (backend, _clock, app) = admin_setup();
    app.login(ADMIN, PASSWORD).await.unwrap();

    tokio::task::yield_now().await;
    tokio::time::advance(SESSION_LIFETIME + Duration::from_secs(1)).await;
    tokio::task::yield_now().await;
    tokio::task::yield_now().await;

    assert_eq!(backend.count(&Call::SignOut), 1);
    assert!(!app.session().expiry_timer_armed());
    assert_eq!(app.session().auth_state(), AuthUiState::Guest);
}

#[tokio::test(start_paused = true)]
async fn test_duplicate_login_collapses_to_one_credential_check() {
    let (backend, _clock, app) = admin_setup();
    backend.delay_sign_in(Duration::from_secs(1));

    // second call lands while the first credential check is still pending
    let (first, second) = tokio::join!(app.login(ADMIN, PASSWORD), app.login(ADMIN, PASSWORD));
    assert_eq!(first.unwrap().as_deref(), Some("#dashboard-view"));
    assert_eq!(second.unwrap(), None);
    assert_eq!(backend.count(&Call::SignIn), 1);
    assert_eq!(app.session().auth_state(), AuthUiState::Admin);
}

#[tokio::test(start_paused = true)]
async fn test_session_check_rearms_rolling_timer() {
    let (backend, clock, app) = admin_setup();
    app.login(ADMIN, PASSWORD).await.unwrap();

    clock.advance(chrono::Duration::minutes(45));
    assert!(app.session().current_session().await.is_active());
    assert!(app.session().expiry_timer_armed());
    assert_eq!(backend.count(&Call::SignOut), 0);
}

#[tokio::test(start_paused = true)]
async fn test_logout_converges_even_when_provider_fails() {
    let (backend, _clock, app) = admin_setup();
    app.login(ADMIN, PASSWORD).await.unwrap();

    backend.fail_sign_out(true);
    app.logout().await;

    assert_eq!(app.session().auth_state(), AuthUiState::Guest);
    assert!(app.session().cached_identity().is_none());
    assert!(
        app.notifications()
            .active()
            .iter()
            .any(|n| n.message == "You have been logged out successfully.")
    );
}

#[tokio::test(start_paused = true)]
async fn test_login_consumes_stored_redirect() {
    let (_backend, _clock, app) = admin_setup();

    let active = app.handle_fragment("#products-view").await;
    assert_eq!(active, ActiveView::LoginGate);

    let redirect = app.login(ADMIN, PASSWORD).await.unwrap();
    assert_eq!(redirect.as_deref(), Some("#products-view"));

    // the target is one-shot
    let redirect = app.session().take_redirect();
    assert_eq!(redirect, None);
}

#[tokio::test(start_paused = true)]
async fn test_delete_refreshes_list_then_stats() {
    let (backend, _clock, app) = admin_setup();
    app.login(ADMIN, PASSWORD).await.unwrap();
    let id = backend.seed_product("Velvet Scarf", Decimal::new(1999, 2), 5, false);
    backend.clear_calls();

    app.products().delete(&id).await.unwrap();

    assert_eq!(
        backend.calls(),
        vec![
            Call::Delete(id.to_string()),
            Call::List(ListOrder::NewestFirst),
            Call::List(ListOrder::Unordered),
        ]
    );
    assert!(backend.products().is_empty());
    assert!(
        app.notifications()
            .active()
            .iter()
            .any(|n| n.message == "Product deleted successfully")
    );
}

#[tokio::test(start_paused = true)]
async fn test_failed_delete_skips_refreshes() {
    let (backend, _clock, app) = admin_setup();
    app.login(ADMIN, PASSWORD).await.unwrap();
    let id = backend.seed_product("Velvet Scarf", Decimal::new(1999, 2), 5, false);
    backend.clear_calls();
    backend.fail_delete(true);

    let err = app.products().delete(&id).await.unwrap_err();
    assert!(matches!(err, AdminError::Persistence(_)));
    assert_eq!(backend.calls(), vec![Call::Delete(id.to_string())]);
    assert_eq!(backend.products().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_create_without_image_makes_no_backend_call() {
    let (backend, _clock, app) = admin_setup();
    app.login(ADMIN, PASSWORD).await.unwrap();
    backend.clear_calls();

    let draft = ProductDraft {
        image_file: None,
        ..valid_create()
    };
    let err = app.product_form().submit(draft).await.unwrap_err();
    assert!(matches!(err, AdminError::Validation(_)));
    assert_eq!(backend.count(&Call::Insert), 0);
    assert!(backend.calls().iter().all(|c| !matches!(c, Call::Upload(_))));
}

#[tokio::test(start_paused = true)]
async fn test_create_uploads_then_inserts() {
    let (backend, _clock, app) = admin_setup();
    app.login(ADMIN, PASSWORD).await.unwrap();
    backend.clear_calls();

    let product = app
        .product_form()
        .submit(valid_create())
        .await
        .unwrap()
        .unwrap();
    assert!(product.image.unwrap().ends_with("_tote.png"));

    let calls = backend.calls();
    assert!(matches!(&calls[0], Call::Upload(name) if name.ends_with("_tote.png")));
    assert_eq!(calls[1], Call::Insert);
    // refreshes follow the write: listing first, then stats
    assert_eq!(
        &calls[2..],
        &[
            Call::List(ListOrder::NewestFirst),
            Call::List(ListOrder::Unordered),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_edit_without_new_file_updates_without_upload() {
    let (backend, _clock, app) = admin_setup();
    app.login(ADMIN, PASSWORD).await.unwrap();
    let id = backend.seed_product("Velvet Scarf", Decimal::new(1999, 2), 5, false);
    backend.clear_calls();

    let draft = ProductDraft {
        id: Some(id.clone()),
        image_file: None,
        image_url: Some("https://cdn.test/products/existing.png".to_owned()),
        ..valid_create()
    };
    let product = app.product_form().submit(draft).await.unwrap().unwrap();
    assert_eq!(
        product.image.as_deref(),
        Some("https://cdn.test/products/existing.png")
    );
    assert_eq!(backend.count(&Call::Update(id.to_string())), 1);
    assert!(backend.calls().iter().all(|c| !matches!(c, Call::Upload(_))));
}

#[tokio::test(start_paused = true)]
async fn test_failed_upload_writes_no_record() {
    let (backend, _clock, app) = admin_setup();
    app.login(ADMIN, PASSWORD).await.unwrap();
    backend.clear_calls();
    backend.fail_upload(true);

    let err = app.product_form().submit(valid_create()).await.unwrap_err();
    assert!(matches!(err, AdminError::Upload(_)));
    assert_eq!(backend.count(&Call::Insert), 0);
    assert!(backend.products().is_empty());
}

//! Session lifecycle tests: initialize, auth events, teardown.

mod common;

use std::sync::atomic::Ordering;
use std::time::Duration;

use common::{profile, session, MockApi};
use forum_flow::config::Config;
use forum_flow::models::Role;
use forum_flow::session::{AuthEvent, SessionManager};

#[tokio::test]
async fn test_initialize_restores_session_and_profile() {
    let api = MockApi::new();
    *api.session.lock().unwrap() = Some(session("u1"));
    api.profiles
        .lock()
        .unwrap()
        .insert("u1".to_string(), profile("u1", Role::Admin));

    let mut manager = SessionManager::new(api.clone(), &Config::for_testing());
    manager.initialize().await.expect("initialize failed");

    assert_eq!(manager.user_id(), Some("u1"));
    assert!(manager.is_admin());
}

#[tokio::test]
async fn test_initialize_without_stored_session() {
    let api = MockApi::new();
    let mut manager = SessionManager::new(api.clone(), &Config::for_testing());
    manager.initialize().await.expect("initialize failed");

    assert!(manager.session().is_none());
    assert!(manager.profile().is_none());
    assert!(!manager.is_admin());
}

#[tokio::test]
async fn test_profile_load_failure_is_not_fatal() {
    let api = MockApi::new();
    *api.session.lock().unwrap() = Some(session("u1"));
    // No profile row for u1.

    let mut manager = SessionManager::new(api.clone(), &Config::for_testing());
    manager.initialize().await.expect("initialize failed");

    assert_eq!(manager.user_id(), Some("u1"));
    assert!(manager.profile().is_none());
    assert!(!manager.is_admin());
}

#[tokio::test(start_paused = true)]
async fn test_initialize_timeout_leaves_manager_signed_out() {
    let api = MockApi::new();
    *api.session.lock().unwrap() = Some(session("u1"));
    *api.current_session_delay.lock().unwrap() = Duration::from_secs(60);

    let mut manager = SessionManager::new(api.clone(), &Config::for_testing());
    // The 5s safety timeout fires instead of hanging on the stalled lookup.
    manager.initialize().await.expect("initialize failed");

    assert!(manager.session().is_none());
}

#[tokio::test]
async fn test_signed_in_event_loads_profile() {
    let api = MockApi::new();
    api.profiles
        .lock()
        .unwrap()
        .insert("u2".to_string(), profile("u2", Role::User));

    let mut manager = SessionManager::new(api.clone(), &Config::for_testing());
    manager.apply_event(AuthEvent::SignedIn(session("u2"))).await;

    assert_eq!(manager.user_id(), Some("u2"));
    assert!(manager.profile().is_some());
    assert!(!manager.is_admin());
}

#[tokio::test]
async fn test_signed_out_event_tears_down_state() {
    let api = MockApi::new();
    api.profiles
        .lock()
        .unwrap()
        .insert("u1".to_string(), profile("u1", Role::Admin));

    let mut manager = SessionManager::new(api.clone(), &Config::for_testing());
    manager.apply_event(AuthEvent::SignedIn(session("u1"))).await;
    manager.apply_event(AuthEvent::SignedOut).await;

    assert!(manager.session().is_none());
    assert!(manager.profile().is_none());
}

#[tokio::test]
async fn test_sign_out_failure_keeps_local_state_for_retry() {
    let api = MockApi::new();
    api.profiles
        .lock()
        .unwrap()
        .insert("u1".to_string(), profile("u1", Role::User));
    let mut manager = SessionManager::new(api.clone(), &Config::for_testing());
    manager.apply_event(AuthEvent::SignedIn(session("u1"))).await;

    api.fail_sign_out.store(true, Ordering::SeqCst);
    assert!(manager.sign_out().await.is_err());
    assert_eq!(manager.user_id(), Some("u1"));

    api.fail_sign_out.store(false, Ordering::SeqCst);
    manager.sign_out().await.expect("sign out failed");
    assert!(manager.session().is_none());
}

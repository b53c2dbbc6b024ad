//! Integration tests for the sliding-window rate limiter (§4.2).

use std::time::Duration;

use mcp_exec_daemon::rate_limit::RateLimiterStore;

#[tokio::test]
async fn allows_up_to_max_requests_then_blocks() {
    let store = RateLimiterStore::new();
    let window = Duration::from_secs(60);

    for expected_remaining in [2u32, 1, 0] {
        let outcome = store.check_limit("1.1.1.1", 3, window).await;
        assert!(outcome.allowed);
        assert_eq!(outcome.remaining, expected_remaining);
    }

    let outcome = store.check_limit("1.1.1.1", 3, window).await;
    assert!(!outcome.allowed);
    assert_eq!(outcome.remaining, 0);
}

#[tokio::test]
async fn a_blocked_client_stays_blocked_for_the_punitive_duration() {
    let store = RateLimiterStore::new();
    let window = Duration::from_secs(60);

    store.check_limit("y", 1, window).await;
    let blocked = store.check_limit("y", 1, window).await;
    assert!(!blocked.allowed);
    // The punitive block (1h) far outlasts the request window.
    assert!(blocked.retry_after > window);

    let still_blocked = store.check_limit("y", 1, window).await;
    assert!(!still_blocked.allowed);
}

#[tokio::test]
async fn different_clients_are_independent() {
    let store = RateLimiterStore::new();
    let window = Duration::from_secs(60);
    store.check_limit("a", 1, window).await;
    let outcome = store.check_limit("b", 1, window).await;
    assert!(outcome.allowed);
}

//! Breaker and retry behaviour against a scripted remote.

use std::sync::Arc;
use std::time::Duration;

use test_fixtures::{terminal, transient, ScriptedSemanticProvider};
use vigil_core::clock::{IClock, ManualClock};
use vigil_core::config::{CircuitBreakerConfig, RetryConfig};
use vigil_core::errors::{RemoteError, ResilienceError};
use vigil_core::models::Filters;
use vigil_core::traits::ISemanticSearchProvider;
use vigil_resilience::{CircuitBreaker, CircuitState, ResilienceGuard};

fn breaker(clock: Arc<ManualClock>) -> CircuitBreaker {
    CircuitBreaker::new("semantic", CircuitBreakerConfig::default(), clock)
}

async fn search(
    breaker: &CircuitBreaker,
    provider: &ScriptedSemanticProvider,
) -> Result<Vec<(String, f32)>, ResilienceError> {
    let filters = Filters::new();
    breaker
        .execute(|| provider.search("gdpr erasure", 20, &filters))
        .await
}

#[tokio::test]
async fn full_breaker_lifecycle() {
    let clock = Arc::new(ManualClock::new());
    let breaker = breaker(clock.clone());
    let provider = ScriptedSemanticProvider::returning(&[("doc_1", 0.9)])
        .then_fail_times(5, transient("search"))
        .then(Err(transient("search")));

    // Five consecutive transient failures open the breaker.
    for _ in 0..5 {
        assert!(matches!(
            search(&breaker, &provider).await,
            Err(ResilienceError::Remote(_))
        ));
    }
    assert_eq!(breaker.state(), CircuitState::Open);
    let opened_at = breaker.snapshot().opened_at.unwrap();

    // Before the cooldown: rejected without touching the provider.
    clock.advance(Duration::from_secs(30));
    assert!(matches!(
        search(&breaker, &provider).await,
        Err(ResilienceError::CircuitOpen { .. })
    ));
    assert_eq!(provider.calls(), 5);

    // After the cooldown the next call is a trial; it fails and reopens.
    clock.advance(Duration::from_secs(30));
    assert!(search(&breaker, &provider).await.is_err());
    assert_eq!(provider.calls(), 6);
    let snap = breaker.snapshot();
    assert_eq!(snap.state, CircuitState::Open);
    assert!(snap.opened_at.unwrap() > opened_at, "opened_at resets on reopen");

    // Second trial succeeds, HALF_OPEN until the success threshold is met.
    clock.advance(Duration::from_secs(60));
    assert!(search(&breaker, &provider).await.is_ok());
    assert_eq!(breaker.state(), CircuitState::HalfOpen);
    assert!(search(&breaker, &provider).await.is_ok());
    assert_eq!(breaker.state(), CircuitState::Closed);
    assert_eq!(breaker.snapshot().consecutive_failures, 0);
}

#[tokio::test]
async fn half_open_admits_a_single_trial() {
    let clock = Arc::new(ManualClock::new());
    let breaker = Arc::new(breaker(clock.clone()));
    for _ in 0..5 {
        let _ = breaker
            .execute(|| async { Err::<(), _>(transient("search")) })
            .await;
    }
    clock.advance(Duration::from_secs(61));

    let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();
    let trial = {
        let breaker = breaker.clone();
        tokio::spawn(async move {
            breaker
                .execute(|| async move {
                    let _ = release_rx.await;
                    Ok::<_, RemoteError>(())
                })
                .await
        })
    };
    while !breaker.snapshot().trial_in_flight {
        tokio::task::yield_now().await;
    }

    let rejected = breaker
        .execute(|| async { Ok::<_, RemoteError>(()) })
        .await
        .unwrap_err();
    match rejected {
        ResilienceError::CircuitOpen { retry_after, .. } => assert_eq!(retry_after, Duration::ZERO),
        other => panic!("expected CircuitOpen, got {other:?}"),
    }

    release_tx.send(()).unwrap();
    trial.await.unwrap().unwrap();
    assert_eq!(breaker.state(), CircuitState::HalfOpen);
    assert!(!breaker.snapshot().trial_in_flight);
}

#[tokio::test]
async fn cancelled_trial_frees_the_slot() {
    let clock = Arc::new(ManualClock::new());
    let breaker = Arc::new(breaker(clock.clone()));
    for _ in 0..5 {
        let _ = breaker
            .execute(|| async { Err::<(), _>(transient("search")) })
            .await;
    }
    clock.advance(Duration::from_secs(61));

    let trial = {
        let breaker = breaker.clone();
        tokio::spawn(async move {
            breaker
                .execute(|| std::future::pending::<Result<(), RemoteError>>())
                .await
        })
    };
    while !breaker.snapshot().trial_in_flight {
        tokio::task::yield_now().await;
    }
    trial.abort();
    assert!(trial.await.unwrap_err().is_cancelled());

    assert!(!breaker.snapshot().trial_in_flight);
    assert!(breaker
        .execute(|| async { Ok::<_, RemoteError>(()) })
        .await
        .is_ok());
}

#[tokio::test]
async fn terminal_trial_failure_keeps_half_open() {
    let clock = Arc::new(ManualClock::new());
    let breaker = breaker(clock.clone());
    for _ in 0..5 {
        let _ = breaker
            .execute(|| async { Err::<(), _>(transient("search")) })
            .await;
    }
    clock.advance(Duration::from_secs(60));
    let err = breaker
        .execute(|| async { Err::<(), _>(terminal("revoked key")) })
        .await
        .unwrap_err();
    assert!(matches!(err, ResilienceError::Remote(RemoteError::Unauthorized { .. })));
    let snap = breaker.snapshot();
    assert_eq!(snap.state, CircuitState::HalfOpen);
    assert!(!snap.trial_in_flight);
}

#[tokio::test]
async fn guard_retries_transient_failures_with_backoff() {
    let clock = Arc::new(ManualClock::new());
    let guard = ResilienceGuard::from_config(
        "semantic",
        &CircuitBreakerConfig::default(),
        &RetryConfig::default(),
        clock.clone(),
    );
    let provider = ScriptedSemanticProvider::returning(&[("doc_1", 0.9)])
        .then_fail_times(2, transient("search"));
    let filters = Filters::new();

    let hits = guard
        .call(|| provider.search("q", 20, &filters))
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(provider.calls(), 3);
    assert_eq!(
        clock.sleeps(),
        vec![Duration::from_secs(1), Duration::from_secs(2)]
    );
    assert_eq!(guard.breaker().state(), CircuitState::Closed);
}

#[tokio::test]
async fn guard_stops_once_breaker_opens() {
    let clock = Arc::new(ManualClock::new());
    let retry = RetryConfig {
        max_retries: 10,
        ..RetryConfig::default()
    };
    let guard = ResilienceGuard::from_config(
        "semantic",
        &CircuitBreakerConfig::default(),
        &retry,
        clock.clone(),
    );
    let provider = ScriptedSemanticProvider::failing(transient("search"));
    let filters = Filters::new();
    let started = clock.now();

    let err = guard
        .call(|| provider.search("q", 20, &filters))
        .await
        .unwrap_err();

    // Five real calls open the breaker; the sixth attempt sees a 60s cooldown,
    // longer than max backoff, and gives up.
    assert_eq!(provider.calls(), 5);
    match err {
        ResilienceError::RetryExhausted { attempts, last } => {
            assert_eq!(attempts, 6);
            assert!(matches!(*last, ResilienceError::CircuitOpen { .. }));
        }
        other => panic!("expected RetryExhausted, got {other:?}"),
    }
    assert_eq!(clock.now() - started, Duration::from_secs(1 + 2 + 4 + 8 + 16));
}

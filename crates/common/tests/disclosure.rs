//! Disclosure lifecycle tests against the in-memory store

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::future::join_all;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use common::prelude::*;

fn setup_policy() -> DisclosurePolicy<MemorySecretStore> {
    DisclosurePolicy::new(
        MemorySecretStore::new(),
        PasscodeHasher::new(PasscodeParams::minimum()).unwrap(),
        PolicyConfig::default(),
    )
}

fn secret(payload: &str) -> SubmitSecret {
    SubmitSecret {
        payload: payload.to_string(),
        passcode: None,
        one_time: true,
        expires_at: None,
    }
}

#[tokio::test]
async fn test_one_time_secret_is_read_once() {
    let policy = setup_policy();
    let record = policy.submit(secret("hello")).await.unwrap();

    let disclosure = policy.read(record.id).await.unwrap();
    assert_eq!(disclosure.payload, "hello");
    assert!(disclosure.one_time);
    assert!(disclosure.consumed);

    for _ in 0..3 {
        assert!(matches!(
            policy.read(record.id).await,
            Err(DisclosureError::NotFound)
        ));
    }
}

#[tokio::test]
async fn test_multi_read_secret_persists() {
    let policy = setup_policy();
    let mut request = secret("shared");
    request.one_time = false;
    let record = policy.submit(request).await.unwrap();

    for _ in 0..5 {
        let disclosure = policy.read(record.id).await.unwrap();
        assert_eq!(disclosure.payload, "shared");
        assert!(!disclosure.consumed);
    }
}

#[tokio::test]
async fn test_concurrent_reads_disclose_at_most_once() {
    let policy = Arc::new(setup_policy());
    let record = policy.submit(secret("race")).await.unwrap();

    let readers = (0..32).map(|_| {
        let policy = policy.clone();
        let id = record.id;
        tokio::spawn(async move { policy.read(id).await })
    });

    let results = join_all(readers).await;
    let successes = results
        .into_iter()
        .map(|joined| joined.unwrap())
        .filter(|result| result.is_ok())
        .count();

    assert_eq!(successes, 1);
}

#[tokio::test]
async fn test_concurrent_verifies_disclose_at_most_once() {
    let policy = Arc::new(setup_policy());
    let mut request = secret("race");
    request.passcode = Some("1234".into());
    let record = policy.submit(request).await.unwrap();

    let readers = (0..8).map(|_| {
        let policy = policy.clone();
        let id = record.id;
        tokio::spawn(async move { policy.verify(id, "1234").await })
    });

    let successes = join_all(readers)
        .await
        .into_iter()
        .filter(|joined| matches!(joined, Ok(Ok(_))))
        .count();

    assert_eq!(successes, 1);
}

#[tokio::test]
async fn test_passcode_flow() {
    let policy = setup_policy();
    let mut request = secret("x");
    request.passcode = Some("1234".into());
    let record = policy.submit(request).await.unwrap();

    assert!(matches!(
        policy.read(record.id).await,
        Err(DisclosureError::PasscodeRequired)
    ));
    assert!(matches!(
        policy.verify(record.id, "0000").await,
        Err(DisclosureError::InvalidPasscode)
    ));

    let disclosure = policy.verify(record.id, "1234").await.unwrap();
    assert_eq!(disclosure.payload, "x");

    assert!(matches!(
        policy.read(record.id).await,
        Err(DisclosureError::NotFound)
    ));
}

#[tokio::test]
async fn test_wrong_passcode_never_consumes() {
    let policy = setup_policy();

    for one_time in [true, false] {
        let mut request = secret("guarded");
        request.passcode = Some("correct horse".into());
        request.one_time = one_time;
        let record = policy.submit(request).await.unwrap();

        for attempt in ["wrong", "", "correct horse "] {
            assert!(matches!(
                policy.verify(record.id, attempt).await,
                Err(DisclosureError::InvalidPasscode)
            ));
        }

        assert!(policy.store().get(record.id).await.unwrap().is_some());
        assert_eq!(
            policy.verify(record.id, "correct horse").await.unwrap().payload,
            "guarded"
        );
    }
}

#[tokio::test]
async fn test_expired_secret_is_not_found() {
    let policy = setup_policy();

    let mut plain = secret("stale");
    plain.expires_at = Some(OffsetDateTime::now_utc() - Duration::seconds(1));
    let plain = policy.submit(plain).await.unwrap();

    let mut protected = secret("stale");
    protected.passcode = Some("1234".into());
    protected.expires_at = Some(OffsetDateTime::now_utc() - Duration::seconds(1));
    let protected = policy.submit(protected).await.unwrap();

    assert!(matches!(
        policy.read(plain.id).await,
        Err(DisclosureError::NotFound)
    ));
    assert!(matches!(
        policy.read(protected.id).await,
        Err(DisclosureError::NotFound)
    ));
    assert!(matches!(
        policy.verify(protected.id, "1234").await,
        Err(DisclosureError::NotFound)
    ));
    assert!(matches!(
        policy.mark_viewed(plain.id).await,
        Err(DisclosureError::NotFound)
    ));
}

#[tokio::test]
async fn test_future_expiry_is_readable() {
    let policy = setup_policy();
    let mut request = secret("fresh");
    let expires_at = OffsetDateTime::now_utc() + Duration::hours(1);
    request.expires_at = Some(expires_at);
    let record = policy.submit(request).await.unwrap();

    let disclosure = policy.read(record.id).await.unwrap();
    assert_eq!(disclosure.expires_at, Some(expires_at));
}

#[tokio::test]
async fn test_mark_viewed_is_idempotent() {
    let policy = setup_policy();
    let record = policy.submit(secret("once")).await.unwrap();

    policy.mark_viewed(record.id).await.unwrap();

    // a second call is a no-op that reports the secret as gone, never a failure
    for _ in 0..2 {
        assert!(matches!(
            policy.mark_viewed(record.id).await,
            Err(DisclosureError::NotFound)
        ));
    }
    assert!(matches!(
        policy.read(record.id).await,
        Err(DisclosureError::NotFound)
    ));
}

#[tokio::test]
async fn test_unknown_id() {
    let policy = setup_policy();
    let id = Uuid::new_v4();

    assert!(matches!(policy.read(id).await, Err(DisclosureError::NotFound)));
    assert!(matches!(
        policy.verify(id, "1234").await,
        Err(DisclosureError::NotFound)
    ));
    assert!(matches!(
        policy.mark_viewed(id).await,
        Err(DisclosureError::NotFound)
    ));
}

#[tokio::test]
async fn test_passcode_hashing_leaves_runtime_responsive() {
    // full-cost parameters so a hash takes long enough to starve the
    //  single-threaded test runtime if it ran inline
    let policy = DisclosurePolicy::new(
        MemorySecretStore::new(),
        PasscodeHasher::new(PasscodeParams::default()).unwrap(),
        PolicyConfig::default(),
    );
    let mut request = secret("guarded");
    request.passcode = Some("1234".to_string());
    let record = policy.submit(request).await.unwrap();

    let ticks = Arc::new(AtomicUsize::new(0));
    let ticker = {
        let ticks = ticks.clone();
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(std::time::Duration::from_millis(1)).await;
                ticks.fetch_add(1, Ordering::SeqCst);
            }
        })
    };

    let result = policy.verify(record.id, "0000").await;
    ticker.abort();

    assert!(matches!(result, Err(DisclosureError::InvalidPasscode)));
    assert!(
        ticks.load(Ordering::SeqCst) > 0,
        "timer task made no progress while the passcode was verified"
    );
}

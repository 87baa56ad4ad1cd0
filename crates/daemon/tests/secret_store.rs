//! Integration tests for the SQLite secret store

mod common;

use std::collections::HashSet;

use futures::future::join_all;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use ::common::prelude::{NewSecret, PasscodeHash, SecretStore, SecretUpdate};

fn new_secret(payload: &str, one_time: bool) -> NewSecret {
    NewSecret {
        payload: payload.to_string(),
        passcode_hash: None,
        one_time,
        expires_at: None,
    }
}

fn test_hash(tag: &str) -> PasscodeHash {
    PasscodeHash::from_stored(format!("$argon2id$v=19$m=8192,t=1,p=1$c2FsdHNhbHQ${}", tag))
}

#[tokio::test]
async fn test_create_and_get() {
    let db = common::setup_test_db().await;

    let expires_at = OffsetDateTime::now_utc() + Duration::hours(1);
    let created = db
        .create(NewSecret {
            payload: "the eagle lands at noon".to_string(),
            passcode_hash: Some(test_hash("aGFzaA")),
            one_time: false,
            expires_at: Some(expires_at),
        })
        .await
        .unwrap();

    let fetched = db.get(created.id).await.unwrap().unwrap();
    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.payload, "the eagle lands at noon");
    assert_eq!(fetched.passcode_hash, Some(test_hash("aGFzaA")));
    assert!(!fetched.one_time);
    // millisecond precision in storage
    assert_eq!(
        fetched.expires_at.unwrap().unix_timestamp(),
        expires_at.unix_timestamp()
    );

    assert!(db.get(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let db = common::setup_test_db().await;
    let created = db.create(new_secret("gone soon", true)).await.unwrap();

    assert!(db.delete(created.id).await.unwrap());
    assert!(!db.delete(created.id).await.unwrap());
    assert!(db.get(created.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_consume_one_time_deletes() {
    let db = common::setup_test_db().await;
    let created = db.create(new_secret("once", true)).await.unwrap();
    let now = OffsetDateTime::now_utc();

    let consumed = db.consume(created.id, None, now).await.unwrap().unwrap();
    assert_eq!(consumed.payload, "once");
    assert!(db.consume(created.id, None, now).await.unwrap().is_none());
    assert!(db.get(created.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_consume_multi_read_persists() {
    let db = common::setup_test_db().await;
    let created = db.create(new_secret("again and again", false)).await.unwrap();
    let now = OffsetDateTime::now_utc();

    for _ in 0..3 {
        let record = db.consume(created.id, None, now).await.unwrap().unwrap();
        assert_eq!(record.payload, "again and again");
    }
    assert!(db.get(created.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_consume_guards_on_passcode_hash() {
    let db = common::setup_test_db().await;
    let created = db
        .create(NewSecret {
            passcode_hash: Some(test_hash("Zmlyc3Q")),
            ..new_secret("guarded", true)
        })
        .await
        .unwrap();
    let now = OffsetDateTime::now_utc();

    // no hash and a stale hash both miss, and neither deletes
    assert!(db.consume(created.id, None, now).await.unwrap().is_none());
    assert!(db
        .consume(created.id, Some(&test_hash("c3RhbGU")), now)
        .await
        .unwrap()
        .is_none());
    assert!(db.get(created.id).await.unwrap().is_some());

    let consumed = db
        .consume(created.id, Some(&test_hash("Zmlyc3Q")), now)
        .await
        .unwrap();
    assert!(consumed.is_some());
    assert!(db.get(created.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_consume_respects_expiry() {
    let db = common::setup_test_db().await;
    let now = OffsetDateTime::now_utc();
    let created = db
        .create(NewSecret {
            expires_at: Some(now),
            ..new_secret("stale", false)
        })
        .await
        .unwrap();

    // expiry is inclusive
    assert!(db.consume(created.id, None, now).await.unwrap().is_none());
    assert!(db
        .consume(created.id, None, now - Duration::seconds(1))
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_concurrent_consume_single_winner() {
    let db = common::setup_test_db().await;
    let created = db.create(new_secret("only one of you", true)).await.unwrap();
    let now = OffsetDateTime::now_utc();

    let attempts = (0..16).map(|_| {
        let db = db.clone();
        tokio::spawn(async move { db.consume(created.id, None, now).await.unwrap() })
    });
    let results = join_all(attempts).await;

    let winners = results
        .into_iter()
        .map(|r| r.unwrap())
        .filter(Option::is_some)
        .count();
    assert_eq!(winners, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_consume_single_winner_on_file_database() {
    let dir = tempfile::tempdir().unwrap();
    let db = common::setup_file_db(dir.path()).await;
    let now = OffsetDateTime::now_utc();

    for round in 0..4 {
        let created = db
            .create(new_secret(&format!("round {}", round), true))
            .await
            .unwrap();

        let attempts = (0..16).map(|_| {
            let db = db.clone();
            tokio::spawn(async move { db.consume(created.id, None, now).await.unwrap() })
        });
        let winners: Vec<_> = join_all(attempts)
            .await
            .into_iter()
            .filter_map(|r| r.unwrap())
            .collect();

        assert_eq!(winners.len(), 1, "round {}", round);
        assert_eq!(winners[0].payload, format!("round {}", round));
        assert!(db.get(created.id).await.unwrap().is_none());
    }

    db.close().await;
}

#[tokio::test]
async fn test_update_applies_changes() {
    let db = common::setup_test_db().await;
    let created = db.create(new_secret("draft", true)).await.unwrap();

    let updated = db
        .update(
            created.id,
            SecretUpdate {
                payload: Some("final".to_string()),
                passcode_hash: Some(Some(test_hash("bmV3"))),
                one_time: Some(false),
                expires_at: None,
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.payload, "final");
    assert!(!updated.one_time);
    assert!(updated.updated_at >= created.updated_at);

    let fetched = db.get(created.id).await.unwrap().unwrap();
    assert_eq!(fetched.payload, "final");
    assert_eq!(fetched.passcode_hash, Some(test_hash("bmV3")));

    let cleared = db
        .update(
            created.id,
            SecretUpdate {
                passcode_hash: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert!(cleared.passcode_hash.is_none());

    assert!(db
        .update(Uuid::new_v4(), SecretUpdate::default())
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_list_and_purge_expired() {
    let db = common::setup_test_db().await;
    let now = OffsetDateTime::now_utc();

    let live = db.create(new_secret("live", true)).await.unwrap();
    let mut expired = HashSet::new();
    for _ in 0..3 {
        let record = db
            .create(NewSecret {
                expires_at: Some(now - Duration::minutes(5)),
                ..new_secret("expired", true)
            })
            .await
            .unwrap();
        expired.insert(record.id);
    }

    assert_eq!(db.list().await.unwrap().len(), 4);
    assert_eq!(db.purge_expired(now).await.unwrap(), 3);

    let remaining = db.list().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, live.id);
    assert!(!expired.contains(&remaining[0].id));
}

#[tokio::test]
async fn test_file_backed_database_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("db.sqlite");
    std::fs::write(&path, "").unwrap();
    let url = url::Url::parse(&format!("sqlite://{}", path.display())).unwrap();

    let id = {
        let db = burnnote_daemon::Database::connect(&url).await.unwrap();
        let id = db.create(new_secret("durable", false)).await.unwrap().id;
        db.close().await;
        id
    };

    let db = burnnote_daemon::Database::connect(&url).await.unwrap();
    assert_eq!(db.get(id).await.unwrap().unwrap().payload, "durable");
}

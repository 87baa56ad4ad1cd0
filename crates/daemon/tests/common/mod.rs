//! Shared helpers for the daemon integration tests
#![allow(dead_code)]

use std::net::{Ipv4Addr, SocketAddr};

use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use url::Url;

use burnnote_daemon::http_server::api::client::ApiClient;
use burnnote_daemon::http_server::{self, Config as HttpConfig};
use burnnote_daemon::{Database, ServiceConfig, ServiceState};
use ::common::prelude::PasscodeParams;

pub const ADMIN_TOKEN: &str = "test-admin-token";

/// Create an in-memory test database
pub async fn setup_test_db() -> Database {
    let db_url = Url::parse("sqlite::memory:").unwrap();
    Database::connect(&db_url).await.unwrap()
}

/// Create a WAL-mode test database file inside `dir`, backed by a full pool
pub async fn setup_file_db(dir: &std::path::Path) -> Database {
    let path = dir.join("db.sqlite");
    let db_url = Url::parse(&format!("sqlite://{}", path.display())).unwrap();
    Database::connect(&db_url).await.unwrap()
}

/// A live API server bound to an ephemeral local port
pub struct TestServer {
    pub base_url: Url,
    pub client: ApiClient,
    pub http: reqwest::Client,
    pub state: ServiceState,
    shutdown_tx: watch::Sender<()>,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::start_with_admin(Some(ADMIN_TOKEN)).await
    }

    pub async fn start_with_admin(admin_token: Option<&str>) -> Self {
        let listener = TcpListener::bind(SocketAddr::from((Ipv4Addr::LOCALHOST, 0)))
            .await
            .unwrap();
        let listen_addr = listener.local_addr().unwrap();

        let config = ServiceConfig {
            listen_addr,
            admin_token: admin_token.map(str::to_string),
            passcode: PasscodeParams::minimum(),
            ..Default::default()
        };
        let state = ServiceState::from_config(&config).await.unwrap();

        let http_config = HttpConfig::new(listen_addr, tracing::Level::DEBUG);
        let router = http_server::router(&http_config, state.clone(), config.max_payload_bytes);

        let (shutdown_tx, shutdown_rx) = watch::channel(());
        let handle = tokio::spawn(async move {
            http_server::serve(listener, router, shutdown_rx)
                .await
                .unwrap();
        });

        let base_url = Url::parse(&format!("http://{}", listen_addr)).unwrap();
        let client = ApiClient::new(&base_url).unwrap();

        Self {
            base_url,
            client,
            http: reqwest::Client::new(),
            state,
            shutdown_tx,
            handle,
        }
    }

    pub fn url(&self, path: &str) -> Url {
        self.base_url.join(path).unwrap()
    }

    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(());
        self.handle.await.unwrap();
    }
}

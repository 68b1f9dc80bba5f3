use futures::FutureExt;
use log::*;
use port_selector::random_free_tcp_port;
use std::future::Future;
use std::net::{IpAddr, Ipv4Addr};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Notify};

use tgwallet_api::domain::{UserId, DEFAULT_ADMIN_ID};

use crate::backend::{serve_stub_api, SharedLedger};
use crate::ledger::Ledger;

pub struct StubEnv {
    /// Base url of the running stub, without trailing slash
    pub url: String,
    pub admin_id: UserId,
    pub ledger: SharedLedger,
}

impl StubEnv {
    /// Registers a user with the given balances
    pub async fn seed_user(&self, user_id: UserId, username: &str, usdt: f64, rub: f64, uzs: i64) {
        let mut ledger = self.ledger.lock().await;
        ledger.upsert_user(user_id, username);
        ledger
            .add_balance(self.admin_id, user_id, usdt, rub, uzs)
            .expect("seeded user exists");
    }
}

pub async fn run_test<F, Fut>(test_body: F)
where
    F: FnOnce(StubEnv) -> Fut,
    Fut: Future<Output = ()>,
{
    let _ = env_logger::builder().is_test(true).try_init();
    let port: u16 = random_free_tcp_port().expect("available port");
    let address = IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1));
    let ledger = Arc::new(Mutex::new(Ledger::new(DEFAULT_ADMIN_ID)));
    let start_notify = Arc::new(Notify::new());

    let api_handle = tokio::spawn({
        let start_notify = start_notify.clone();
        let ledger = ledger.clone();
        async move {
            if let Err(e) = serve_stub_api(address, port, start_notify, ledger).await {
                error!("Stub backend failed: {e}");
            }
        }
    });
    tokio::time::timeout(Duration::from_secs(5), start_notify.notified())
        .await
        .expect("stub backend started");
    info!("Running stub backend on {port}");

    let env = StubEnv {
        url: format!("http://{address}:{port}"),
        admin_id: DEFAULT_ADMIN_ID,
        ledger,
    };
    let res = AssertUnwindSafe(test_body(env)).catch_unwind().await;

    api_handle.abort();
    assert!(res.is_ok());
}

use log::*;
use rocket::fairing::AdHoc;
use rocket::figment::Figment;
use rocket::http::{ContentType, Status};
use rocket::response::{self, Responder};
use rocket::serde::json::{json, Json, Value};
use rocket::{get, post, routes, Config, Request, Response, State};
use std::io::Cursor;
use std::net::IpAddr;
use std::sync::Arc;
use tokio::sync::{Mutex, Notify};

use tgwallet_api::domain::UserId;
use tgwallet_api::types::{Balance, History, Pending};

use crate::ledger::{Ledger, LedgerError, RecordedCall};

pub type SharedLedger = Arc<Mutex<Ledger>>;

impl<'r, 'o: 'r> Responder<'r, 'o> for LedgerError {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'o> {
        warn!("Stub backend rejects request: {self}");
        let resp = json!({ "detail": self.to_string() }).to_string();
        Response::build()
            .status(Status::from_code(self.status()).unwrap_or_default())
            .header(ContentType::JSON)
            .sized_body(resp.len(), Cursor::new(resp))
            .ok()
    }
}

#[get("/api/health")]
fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}

#[post("/api/user/upsert?<user_id>&<username>")]
async fn user_upsert(
    ledger: &State<SharedLedger>,
    user_id: UserId,
    username: Option<&str>,
) -> Json<Value> {
    ledger
        .lock()
        .await
        .upsert_user(user_id, username.unwrap_or_default());
    Json(json!({ "status": "ok" }))
}

#[get("/api/balance/<user_id>")]
async fn balance(
    ledger: &State<SharedLedger>,
    user_id: UserId,
) -> Result<Json<Balance>, LedgerError> {
    ledger.lock().await.balance(user_id).map(Json)
}

#[post("/api/deposit/request?<user_id>&<currency>&<amount>")]
async fn deposit_request(
    ledger: &State<SharedLedger>,
    user_id: UserId,
    currency: &str,
    amount: f64,
) -> Result<Json<Value>, LedgerError> {
    ledger
        .lock()
        .await
        .deposit_request(user_id, currency, amount)?;
    Ok(Json(json!({ "status": "pending" })))
}

#[post("/api/withdraw/request?<user_id>&<currency>&<amount>")]
async fn withdraw_request(
    ledger: &State<SharedLedger>,
    user_id: UserId,
    currency: &str,
    amount: f64,
) -> Result<Json<Value>, LedgerError> {
    ledger
        .lock()
        .await
        .withdraw_request(user_id, currency, amount)?;
    Ok(Json(json!({ "status": "pending" })))
}

#[get("/api/history/<user_id>")]
async fn history(ledger: &State<SharedLedger>, user_id: UserId) -> Json<History> {
    let items = ledger.lock().await.history(user_id);
    Json(History { items })
}

#[get("/api/admin/pending?<admin_id>")]
async fn admin_pending(
    ledger: &State<SharedLedger>,
    admin_id: UserId,
) -> Result<Json<Pending>, LedgerError> {
    let items = ledger.lock().await.pending(admin_id)?;
    Ok(Json(Pending { items }))
}

#[post("/api/admin/decision?<admin_id>&<req_type>&<req_id>&<action>")]
async fn admin_decision(
    ledger: &State<SharedLedger>,
    admin_id: UserId,
    req_type: &str,
    req_id: u64,
    action: &str,
) -> Result<Json<Value>, LedgerError> {
    let status = ledger
        .lock()
        .await
        .decision(admin_id, req_type, req_id, action)?;
    Ok(Json(json!({ "status": status.as_str() })))
}

#[post("/api/admin/add_balance?<admin_id>&<user_id>&<usdt>&<rub>&<uzs>")]
async fn admin_add_balance(
    ledger: &State<SharedLedger>,
    admin_id: UserId,
    user_id: UserId,
    usdt: Option<f64>,
    rub: Option<f64>,
    uzs: Option<i64>,
) -> Result<Json<Value>, LedgerError> {
    ledger.lock().await.add_balance(
        admin_id,
        user_id,
        usdt.unwrap_or_default(),
        rub.unwrap_or_default(),
        uzs.unwrap_or_default(),
    )?;
    Ok(Json(json!({ "status": "ok" })))
}

pub async fn serve_stub_api(
    address: IpAddr,
    port: u16,
    start_notify: Arc<Notify>,
    ledger: SharedLedger,
) -> Result<(), rocket::Error> {
    let figment = Figment::from(Config {
        address,
        port,
        ..Config::default()
    })
    .merge(("log_level", "off"));

    let on_ready = AdHoc::on_liftoff("API Start!", |_| {
        Box::pin(async move {
            start_notify.notify_one();
        })
    });
    let call_log = AdHoc::on_request("Call log", |req, _| {
        Box::pin(async move {
            if let Some(ledger) = req.rocket().state::<SharedLedger>() {
                let call = RecordedCall {
                    method: req.method().as_str().to_owned(),
                    path: req.uri().path().to_string(),
                    query: req.uri().query().map(|q| q.to_string()),
                };
                trace!("Stub backend call: {call:?}");
                let delay = {
                    let mut ledger = ledger.lock().await;
                    let delay = ledger.delays.get(&call.path).copied();
                    ledger.calls.push(call);
                    delay
                };
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
            }
        })
    });

    let _ = rocket::custom(figment)
        .mount(
            "/",
            routes![
                health,
                user_upsert,
                balance,
                deposit_request,
                withdraw_request,
                history,
                admin_pending,
                admin_decision,
                admin_add_balance
            ],
        )
        .manage(ledger)
        .attach(on_ready)
        .attach(call_log)
        .launch()
        .await?;
    Ok(())
}

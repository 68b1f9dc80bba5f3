
pub use runner::*;

use std::time::Duration;

use tgwallet_api::domain::DEFAULT_ADMIN_ID;
use tgwallet_api::types::{BalanceTopUp, DecisionAction, RequestType};

use crate::controller::{ActionOutcome, ViewController};
use crate::messages::UZBEK;
use crate::screen::{BalanceView, Panel};

const ALICE: i64 = 777;

fn balance(usdt: &str, rub: &str, uzs: &str) -> BalanceView {
    BalanceView {
        usdt: usdt.to_owned(),
        rub: rub.to_owned(),
        uzs: uzs.to_owned(),
    }
}

#[tokio::test]
async fn test_start_renders_user_and_balance() {
    run_with_user(user(ALICE, "alice"), |env| async move {
        env.stub.seed_user(ALICE, "alice", 12.5, 300.0, 150000).await;

        assert_eq!(env.controller.start().await, ActionOutcome::Done);
        let screen = env.controller.screen().await;
        assert_eq!(screen.user_label, "@alice");
        assert_eq!(screen.balance, balance("12.5", "300", "150000"));
        assert!(!screen.admin_visible);
        assert_eq!(screen.panel, Panel::Hidden);

        let text = env.controller.screen_text().await.expect("screen text");
        assert!(text.contains("@alice"));
        assert!(text.contains("USDT: 12.5"));
    })
    .await;
}

#[tokio::test]
async fn test_unknown_user_sees_zeros() {
    run_with_user(user(ALICE, "alice"), |env| async move {
        assert_eq!(env.controller.start().await, ActionOutcome::Rejected(404));
        assert_eq!(env.controller.screen().await.balance, balance("0", "0", "0"));
        assert!(env.controller.host().alerts().is_empty());
    })
    .await;
}

#[tokio::test]
async fn test_admin_entry_visibility() {
    run_with_user(user(DEFAULT_ADMIN_ID, "boss"), |env| async move {
        env.controller.start().await;
        assert!(env.controller.screen().await.admin_visible);
    })
    .await;
    run_with_user(user(DEFAULT_ADMIN_ID + 1, "not_boss"), |env| async move {
        env.controller.start().await;
        assert!(!env.controller.screen().await.admin_visible);
    })
    .await;
}

#[tokio::test]
async fn test_unresolved_identity() {
    run_with_user(None, |env| async move {
        env.controller.start().await;
        let screen = env.controller.screen().await;
        assert_eq!(screen.user_label, "Telegram user");
        assert_eq!(screen.balance, balance("0", "0", "0"));
        assert!(!screen.admin_visible);

        let ledger = env.stub.ledger.lock().await;
        assert_eq!(ledger.calls_to("/api/balance/undefined").len(), 1);
    })
    .await;
}

#[tokio::test]
async fn test_deposit_invalid_input() {
    run_with_user(user(ALICE, "alice"), |env| async move {
        env.stub.seed_user(ALICE, "alice", 0.0, 0.0, 0).await;
        env.controller.host().script(vec![Some("usdt"), Some("0")]);

        assert_eq!(env.controller.deposit().await, ActionOutcome::Invalid);
        assert_eq!(
            env.controller.host().last_alert().as_deref(),
            Some(UZBEK.invalid_input)
        );

        env.controller.host().script(vec![Some("btc"), Some("10")]);
        assert_eq!(env.controller.deposit().await, ActionOutcome::Invalid);
        assert_eq!(env.controller.host().prompts().len(), 4);

        let ledger = env.stub.ledger.lock().await;
        assert!(ledger.deposits.is_empty());
        assert!(ledger.calls_to("/api/deposit/request").is_empty());
    })
    .await;
}

#[tokio::test]
async fn test_deposit_is_pending_without_refresh() {
    run_with_user(user(ALICE, "alice"), |env| async move {
        env.stub.seed_user(ALICE, "alice", 0.0, 0.0, 0).await;
        env.controller.start().await;
        env.controller.host().script(vec![Some("USDT"), Some("15")]);

        assert_eq!(env.controller.deposit().await, ActionOutcome::Done);
        assert_eq!(
            env.controller.host().last_alert().as_deref(),
            Some(UZBEK.deposit_sent)
        );
        assert_eq!(env.controller.screen().await.balance, balance("0", "0", "0"));

        let ledger = env.stub.ledger.lock().await;
        assert_eq!(ledger.deposits.len(), 1);
        assert_eq!(ledger.deposits[0].amount, 15.0);
        let calls = ledger.calls_to("/api/deposit/request");
        assert_eq!(
            calls[0].query.as_deref(),
            Some("user_id=777&currency=usdt&amount=15")
        );
        assert_eq!(ledger.calls_to("/api/balance/777").len(), 1);
    })
    .await;
}

#[tokio::test]
async fn test_withdraw_insufficient_funds() {
    run_with_user(user(ALICE, "alice"), |env| async move {
        env.stub.seed_user(ALICE, "alice", 1.0, 0.0, 0).await;
        env.controller.host().script(vec![Some("usdt"), Some("5")]);

        assert_eq!(env.controller.withdraw().await, ActionOutcome::Rejected(400));
        assert_eq!(
            env.controller.host().last_alert().as_deref(),
            Some(UZBEK.withdraw_failed)
        );

        env.controller.host().script(vec![Some("usdt"), Some("0.5")]);
        assert_eq!(env.controller.withdraw().await, ActionOutcome::Done);
        assert_eq!(
            env.controller.host().last_alert().as_deref(),
            Some(UZBEK.withdraw_sent)
        );
        assert_eq!(env.stub.ledger.lock().await.withdraws.len(), 1);
    })
    .await;
}

#[tokio::test]
async fn test_history_panel() {
    run_with_user(user(ALICE, "alice"), |env| async move {
        env.stub.seed_user(ALICE, "alice", 100.0, 0.0, 0).await;

        assert_eq!(env.controller.history().await, ActionOutcome::Done);
        assert_eq!(env.controller.screen().await.panel, Panel::HistoryEmpty);

        {
            let mut ledger = env.stub.ledger.lock().await;
            ledger.deposit_request(ALICE, "usdt", 10.0).unwrap();
            ledger.withdraw_request(ALICE, "usdt", 3.0).unwrap();
        }
        assert_eq!(env.controller.history().await, ActionOutcome::Done);
        match env.controller.screen().await.panel {
            Panel::History(items) => {
                assert_eq!(items.len(), 2);
                assert_eq!(items[0].kind, "withdraw");
                assert_eq!(items[1].kind, "deposit");
            }
            other => panic!("Unexpected panel {other:?}"),
        }
        let html = env.controller.panel_html().await.expect("panel");
        assert!(html.find("WITHDRAW").unwrap() < html.find("DEPOSIT").unwrap());
    })
    .await;
}

#[tokio::test]
async fn test_admin_decisions() {
    run_with_user(user(DEFAULT_ADMIN_ID, "boss"), |env| async move {
        env.stub.seed_user(ALICE, "alice", 0.0, 0.0, 0).await;
        env.stub
            .ledger
            .lock()
            .await
            .deposit_request(ALICE, "usdt", 15.0)
            .unwrap();

        assert_eq!(env.controller.admin_pending().await, ActionOutcome::Done);
        let screen = env.controller.screen().await;
        let controls = screen.controls();
        assert_eq!(controls.len(), 2);
        assert_eq!(controls[0].req_type, RequestType::Deposit);
        assert_eq!(controls[0].action, DecisionAction::Approve);

        assert_eq!(env.controller.decision(controls[0]).await, ActionOutcome::Done);
        assert_eq!(
            env.controller.host().last_alert().as_deref(),
            Some(UZBEK.decision_done)
        );
        {
            let ledger = env.stub.ledger.lock().await;
            assert_eq!(ledger.user(ALICE).unwrap().usdt, 15.0);
            let calls = ledger.calls_to("/api/admin/decision");
            assert_eq!(
                calls[0].query.as_deref(),
                Some("admin_id=5815294733&req_type=deposit&req_id=1&action=approve")
            );
        }

        // Stale list: the reject control is still there
        assert!(env.controller.screen().await.panel.is_visible());
        assert_eq!(
            env.controller.decision(controls[1]).await,
            ActionOutcome::Rejected(400)
        );
        assert_eq!(
            env.controller.host().last_alert().as_deref(),
            Some(UZBEK.request_failed)
        );
        let balance_path = format!("/api/balance/{DEFAULT_ADMIN_ID}");
        assert_eq!(env.stub.ledger.lock().await.calls_to(&balance_path).len(), 2);

        assert_eq!(env.controller.admin_pending().await, ActionOutcome::Done);
        assert_eq!(env.controller.screen().await.panel, Panel::PendingEmpty);
    })
    .await;
}

#[tokio::test]
async fn test_pending_with_wrong_admin() {
    run_test_with_admin(42).await;
}

async fn run_test_with_admin(admin_id: i64) {
    tgwallet_test::runner::run_test(|stub| async move {
        let config = config_for(&stub.url, admin_id);
        let controller = ViewController::new(ScriptedHost::new(user(admin_id, "fake")), &config)
            .expect("controller");
        assert_eq!(controller.admin_pending().await, ActionOutcome::Rejected(403));
        assert_eq!(controller.screen().await.panel, Panel::Failed);
        assert_eq!(
            controller.host().last_alert().as_deref(),
            Some(UZBEK.request_failed)
        );
    })
    .await;
}

#[tokio::test]
async fn test_register_and_top_up() {
    run_with_user(user(DEFAULT_ADMIN_ID, "boss"), |env| async move {
        assert_eq!(env.controller.register().await, ActionOutcome::Done);
        assert_eq!(
            env.stub.ledger.lock().await.user(DEFAULT_ADMIN_ID).unwrap().username,
            "boss"
        );

        let top_up = BalanceTopUp {
            user_id: DEFAULT_ADMIN_ID,
            usdt: 5.0,
            rub: 0.0,
            uzs: 1000,
        };
        assert_eq!(env.controller.add_balance(top_up).await, ActionOutcome::Done);
        assert_eq!(env.controller.load_balance().await, ActionOutcome::Done);
        assert_eq!(
            env.controller.screen().await.balance,
            balance("5", "0", "1000")
        );
    })
    .await;
}

#[tokio::test]
async fn test_last_response_wins_panel() {
    run_with_user(user(DEFAULT_ADMIN_ID, "boss"), |env| async move {
        let history_path = format!("/api/history/{DEFAULT_ADMIN_ID}");
        env.stub
            .ledger
            .lock()
            .await
            .delay(&history_path, Duration::from_millis(300));
        let (hist, pending) =
            tokio::join!(env.controller.history(), env.controller.admin_pending());
        assert_eq!((hist, pending), (ActionOutcome::Done, ActionOutcome::Done));
        assert_eq!(env.controller.screen().await.panel, Panel::HistoryEmpty);

        {
            let mut ledger = env.stub.ledger.lock().await;
            ledger.delays.clear();
            ledger.delay("/api/admin/pending", Duration::from_millis(300));
        }
        let (hist, pending) =
            tokio::join!(env.controller.history(), env.controller.admin_pending());
        assert_eq!((hist, pending), (ActionOutcome::Done, ActionOutcome::Done));
        assert_eq!(env.controller.screen().await.panel, Panel::PendingEmpty);
    })
    .await;
}

#[tokio::test]
async fn test_unreachable_backend() {
    let _ = env_logger::builder().is_test(true).try_init();
    let config = config_for("http://127.0.0.1:1", DEFAULT_ADMIN_ID);
    let controller =
        ViewController::new(ScriptedHost::new(user(ALICE, "alice")), &config).expect("controller");

    assert!(controller.check_backend().await.is_err());
    assert_eq!(controller.start().await, ActionOutcome::Failed);
    assert_eq!(controller.screen().await.balance, BalanceView::default());
    assert_eq!(
        controller.host().last_alert().as_deref(),
        Some(UZBEK.network_error)
    );

    assert_eq!(controller.history().await, ActionOutcome::Failed);
    assert_eq!(controller.screen().await.panel, Panel::Failed);

    controller.host().script(vec![Some("rub"), Some("100")]);
    assert_eq!(controller.deposit().await, ActionOutcome::Failed);
    assert_eq!(controller.host().alerts().len(), 3);
}

use clap::Parser;
use figment::providers::Serialized;
use log::*;
use serde::Serialize;
use std::error::Error;
use std::io::{BufReader, Stdin, Stdout};

use tgwallet_api::domain::{InitData, Language, TgUser, UserId};
use tgwallet_api::types::{BalanceTopUp, Decision, DecisionAction, RequestType};
use tgwallet_app::config::AppConfig;
use tgwallet_app::controller::{ActionOutcome, ViewController};
use tgwallet_app::host::Host;
use tgwallet_app::terminal::TerminalHost;

type Controller = ViewController<TerminalHost<BufReader<Stdin>, Stdout>>;

#[derive(Parser, Debug, Clone)]
#[clap(about, version, author)]
struct Args {
    /// Base url of the wallet backend, overrides the config file
    #[clap(long)]
    api_url: Option<String>,
    /// User allowed to see the admin queue
    #[clap(long)]
    admin_id: Option<UserId>,
    /// Language of alerts and captions: uz or en
    #[clap(long)]
    language: Option<Language>,
    /// Telegram id the host reports for the current user
    #[clap(long, env = "TG_USER_ID")]
    user_id: Option<UserId>,
    #[clap(long, env = "TG_USERNAME")]
    username: Option<String>,
    #[clap(subcommand)]
    subcmd: SubCommand,
}

#[derive(Parser, Debug, Clone)]
enum SubCommand {
    /// Show balances
    Balance,
    /// File a deposit request
    Deposit,
    /// File a withdraw request
    Withdraw,
    /// Show request history
    History,
    /// Show pending requests of all users
    Admin,
    /// Approve or reject a pending request
    Decide {
        req_type: RequestType,
        req_id: u64,
        action: DecisionAction,
    },
    /// Register the current user with the backend
    Register,
    /// Credit balances of a user
    AddBalance {
        user_id: UserId,
        #[clap(long, default_value = "0")]
        usdt: f64,
        #[clap(long, default_value = "0")]
        rub: f64,
        #[clap(long, default_value = "0")]
        uzs: i64,
    },
    /// Menu driven session
    Interactive,
}

#[derive(Serialize)]
struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    api_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    admin_id: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    language: Option<Language>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            api_url: self.api_url.clone(),
            admin_id: self.admin_id,
            language: self.language,
        }
    }

    fn init_data(&self) -> InitData {
        InitData {
            user: self.user_id.map(|id| TgUser {
                id,
                username: self.username.clone(),
            }),
        }
    }
}

const MENU: &str = "[b]alance [d]eposit [w]ithdraw [h]istory [r]egister [q]uit";
const ADMIN_MENU: &str =
    "[b]alance [d]eposit [w]ithdraw [h]istory [r]egister [a]dmin, <type> <id> approve|reject, [q]uit";

/// Parses `deposit 7 approve`
fn parse_decision(line: &str) -> Option<Decision> {
    let mut parts = line.split_whitespace();
    let req_type = parts.next()?.parse().ok()?;
    let req_id = parts.next()?.parse().ok()?;
    let action = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(Decision {
        req_type,
        req_id,
        action,
    })
}

/// Only controls of the listed pending items are accepted
async fn decide(controller: &Controller, choice: Decision) -> ActionOutcome {
    match controller.screen().await.control(&choice) {
        Some(control) => controller.decision(control).await,
        None => {
            warn!(
                "{} {} is not in the pending list",
                choice.req_type, choice.req_id
            );
            ActionOutcome::Invalid
        }
    }
}

async fn interactive(controller: &Controller) -> Result<(), Box<dyn Error>> {
    loop {
        controller.host().print(&controller.screen_text().await?);
        let admin = controller.is_admin_visible();
        let menu = if admin { ADMIN_MENU } else { MENU };
        let choice = match controller.host().prompt(menu, "b") {
            Some(choice) => choice,
            None => break,
        };
        let outcome = match choice.trim() {
            "b" => controller.load_balance().await,
            "d" => controller.deposit().await,
            "w" => controller.withdraw().await,
            "h" => controller.history().await,
            "r" => controller.register().await,
            "a" if admin => controller.admin_pending().await,
            "q" => break,
            other => match parse_decision(other) {
                Some(choice) if admin => decide(controller, choice).await,
                _ => {
                    warn!("Unknown command: {other}");
                    continue;
                }
            },
        };
        debug!("Command {choice} finished with {outcome:?}");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let figment = AppConfig::figment().merge(Serialized::defaults(args.overrides()));
    let config = AppConfig::extract(&figment)?;
    info!("Using backend at {}", config.api_url);

    let controller = ViewController::new(TerminalHost::stdio(args.init_data()), &config)?;
    if let Err(e) = controller.check_backend().await {
        warn!("Backend health check failed: {e}");
    }
    controller.start().await;

    let outcome = match args.subcmd {
        SubCommand::Balance => ActionOutcome::Done,
        SubCommand::Deposit => controller.deposit().await,
        SubCommand::Withdraw => controller.withdraw().await,
        SubCommand::History => controller.history().await,
        SubCommand::Admin => controller.admin_pending().await,
        SubCommand::Decide {
            req_type,
            req_id,
            action,
        } => {
            controller.admin_pending().await;
            let choice = Decision {
                req_type,
                req_id,
                action,
            };
            decide(&controller, choice).await
        }
        SubCommand::Register => controller.register().await,
        SubCommand::AddBalance {
            user_id,
            usdt,
            rub,
            uzs,
        } => {
            let top_up = BalanceTopUp {
                user_id,
                usdt,
                rub,
                uzs,
            };
            let outcome = controller.add_balance(top_up).await;
            controller.load_balance().await;
            outcome
        }
        SubCommand::Interactive => {
            interactive(&controller).await?;
            return Ok(());
        }
    };
    debug!("Finished with {outcome:?}");
    controller.host().print(&controller.screen_text().await?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_lines() {
        assert_eq!(
            parse_decision("withdraw 3 reject"),
            Some(Decision {
                req_type: RequestType::Withdraw,
                req_id: 3,
                action: DecisionAction::Reject
            })
        );
        assert_eq!(parse_decision("deposit x approve"), None);
        assert_eq!(parse_decision("deposit 3"), None);
        assert_eq!(parse_decision("deposit 3 approve now"), None);
    }

    #[test]
    fn cli_overrides_config() {
        figment::Jail::expect_with(|_| {
            let args = Args::parse_from([
                "tgwallet",
                "--api-url",
                "http://wallet.test",
                "--language",
                "en",
                "--user-id",
                "5",
                "balance",
            ]);
            let figment = AppConfig::figment().merge(Serialized::defaults(args.overrides()));
            let config = AppConfig::extract(&figment).expect("config");
            assert_eq!(config.api_url, "http://wallet.test");
            assert_eq!(config.language, Language::English);
            assert_eq!(config.admin_id, tgwallet_api::domain::DEFAULT_ADMIN_ID);
            assert_eq!(args.init_data().user_ref().id(), Some(5));
            Ok(())
        });
    }
}

use slcwallet::WalletError;
use slcwallet::client::WalletClient;
use slcwallet::config::fetch_config;
use slcwallet::credentials;
use slcwallet::pager::LedgerPager;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), WalletError> {
    // Initialize tracing subscriber for logging output.
    tracing_subscriber::fmt::init();

    credentials::populate_env_from_keychain();
    let app_config = fetch_config()?;
    let client = WalletClient::new(&app_config)?;

    let balance = client.balance().await?;
    info!(
        account_key = balance.account_key,
        balance_cents = balance.balance_cents,
        currency = balance.currency,
        "balance"
    );

    let mut pager = LedgerPager::new();
    let ticket = pager.begin_refresh();
    match client.fetch_ledger(ticket.cursor(), 25).await {
        Ok(page) => {
            pager.apply(&ticket, Ok(page));
        }
        Err(WalletError::Api(api)) => {
            pager.apply(&ticket, Err(api));
        }
        Err(other) => return Err(other),
    }

    for entry in pager.entries() {
        info!(
            id = entry.id,
            event_type = entry.event_type,
            amount_cents = entry.amount_cents,
            direction = ?entry.direction,
            "ledger entry"
        );
    }

    Ok(())
}

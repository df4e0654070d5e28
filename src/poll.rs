//! Payment settlement polling.
//!
//! After a checkout URL is opened externally, the only way to learn that the
//! payment settled is to re-check the ledger. A poll session runs a bounded
//! sequence of delayed re-checks ([`POLL_DELAYS`]) and reports exactly one
//! outcome: [`PollOutcome::Completed`] with the settling entry, or
//! [`PollOutcome::Exhausted`] when the schedule runs out and the caller
//! should surface a "payment pending" notice with a manual refresh action.
//!
//! Cancellation is an explicit watch-channel handle rather than a stale
//! session counter: a cancelled session delivers no outcome even when an
//! in-flight fetch resolves afterwards. [`PollRegistry`] keeps at most one
//! active session per provider — starting a new one cancels its predecessor.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::Result;
use crate::error::{ApiError, WalletError};
use crate::models::PaymentProvider;
use crate::models::balance::Balance;
use crate::models::ledger::{LedgerEntry, LedgerPage};
use crate::settlement::{PendingPayment, find_settlement};

/// Fixed re-check schedule, identical across providers.
pub const POLL_DELAYS: [Duration; 4] = [
    Duration::from_millis(0),
    Duration::from_millis(3000),
    Duration::from_millis(7000),
    Duration::from_millis(15000),
];

/// Page size used when re-checking the ledger for a settlement.
const POLL_PAGE_LIMIT: u32 = 50;

/// Read surface the poll driver needs from the wallet backend.
///
/// Implemented by [`WalletClient`](crate::client::WalletClient); tests plug
/// in scripted fakes.
pub trait WalletBackend: Send + Sync + 'static {
    /// Fetches the current balance snapshot.
    fn fetch_balance(&self) -> impl Future<Output = Result<Balance>> + Send;

    /// Fetches the newest ledger page with the given limit.
    fn fetch_newest_ledger(&self, limit: u32) -> impl Future<Output = Result<LedgerPage>> + Send;
}

/// Terminal result of one poll session.
#[derive(Debug)]
pub enum PollOutcome {
    /// The expected credit posted. Carries the settling entry and, when the
    /// follow-up balance fetch succeeded, a fresh snapshot so the caller can
    /// swap its state without another round-trip.
    Completed {
        entry: LedgerEntry,
        balance: Option<Balance>,
    },
    /// Every scheduled attempt ran (or a 429 stopped the session early)
    /// without the credit appearing.
    Exhausted,
    /// The backend rejected our session mid-poll; the caller must force a
    /// logout.
    Unauthorized,
}

/// Outcome of a session, tagged with the payment it was watching.
#[derive(Debug)]
pub struct PollEvent {
    pub provider: PaymentProvider,
    pub reference: String,
    pub outcome: PollOutcome,
}

struct ActiveSession {
    cancel: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// Owns the poll sessions, one slot per provider.
pub struct PollRegistry<B> {
    backend: Arc<B>,
    outcomes: mpsc::UnboundedSender<PollEvent>,
    active: HashMap<PaymentProvider, ActiveSession>,
}

impl<B: WalletBackend> PollRegistry<B> {
    /// Creates a registry delivering session outcomes on `outcomes`.
    pub fn new(backend: Arc<B>, outcomes: mpsc::UnboundedSender<PollEvent>) -> Self {
        Self {
            backend,
            outcomes,
            active: HashMap::new(),
        }
    }

    /// Starts polling for `pending`, cancelling any session already running
    /// for the same provider.
    pub fn start(&mut self, pending: PendingPayment) {
        let provider = pending.provider;
        self.cancel(provider);

        info!(
            provider = provider.as_str(),
            reference = pending.reference,
            "starting settlement poll"
        );
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let task = tokio::spawn(run_session(
            Arc::clone(&self.backend),
            pending,
            cancel_rx,
            self.outcomes.clone(),
        ));
        self.active.insert(provider, ActiveSession {
            cancel: cancel_tx,
            task,
        });
    }

    /// Cancels the active session for `provider`, if any.
    ///
    /// Returns the session task so callers (tests, shutdown paths) can await
    /// its completion. The session delivers no outcome once cancelled.
    pub fn cancel(&mut self, provider: PaymentProvider) -> Option<JoinHandle<()>> {
        let session = self.active.remove(&provider)?;
        let _ = session.cancel.send(true);
        debug!(provider = provider.as_str(), "cancelled settlement poll");
        Some(session.task)
    }

    /// Cancels every active session (app backgrounding, screen blur).
    ///
    /// Callers keep their pending payment contexts and may [`start`] again
    /// on foregrounding.
    ///
    /// [`start`]: Self::start
    pub fn cancel_all(&mut self) {
        for provider in PaymentProvider::ALL {
            self.cancel(provider);
        }
    }

    /// True while a session for `provider` has not finished.
    pub fn is_active(&self, provider: PaymentProvider) -> bool {
        self.active
            .get(&provider)
            .is_some_and(|session| !session.task.is_finished())
    }
}

async fn run_session<B: WalletBackend>(
    backend: Arc<B>,
    pending: PendingPayment,
    mut cancelled: watch::Receiver<bool>,
    outcomes: mpsc::UnboundedSender<PollEvent>,
) {
    let mut throttled = false;

    for (attempt, delay) in POLL_DELAYS.iter().enumerate() {
        tokio::select! {
            _ = tokio::time::sleep(*delay) => {}
            _ = cancelled.changed() => return,
        }
        // A zero delay can win the race against an already-signalled cancel.
        if *cancelled.borrow() {
            return;
        }

        debug!(
            provider = pending.provider.as_str(),
            attempt,
            "settlement re-check"
        );
        match check_once(&*backend, &pending).await {
            Ok(Some((entry, balance))) => {
                if *cancelled.borrow() {
                    return;
                }
                info!(
                    provider = pending.provider.as_str(),
                    entry_id = entry.id,
                    "payment settled"
                );
                let _ = outcomes.send(PollEvent {
                    provider: pending.provider,
                    reference: pending.reference,
                    outcome: PollOutcome::Completed { entry, balance },
                });
                return;
            }
            Ok(None) => {}
            Err(err) if err.requires_logout() => {
                if *cancelled.borrow() {
                    return;
                }
                warn!(
                    provider = pending.provider.as_str(),
                    "session rejected during settlement poll"
                );
                let _ = outcomes.send(PollEvent {
                    provider: pending.provider,
                    reference: pending.reference,
                    outcome: PollOutcome::Unauthorized,
                });
                return;
            }
            Err(WalletError::Api(ApiError::Throttled)) => {
                warn!(
                    provider = pending.provider.as_str(),
                    attempt, "throttled, stopping settlement poll early"
                );
                throttled = true;
                break;
            }
            Err(err) => {
                // Transient failures are retried on the next scheduled attempt.
                warn!(
                    provider = pending.provider.as_str(),
                    attempt,
                    error = %err,
                    "settlement re-check failed"
                );
            }
        }
    }

    if *cancelled.borrow() {
        return;
    }
    info!(
        provider = pending.provider.as_str(),
        reference = pending.reference,
        throttled,
        "settlement poll exhausted, payment still pending"
    );
    let _ = outcomes.send(PollEvent {
        provider: pending.provider,
        reference: pending.reference,
        outcome: PollOutcome::Exhausted,
    });
}

/// One re-check: fetch the newest ledger page and look for the settlement.
///
/// On a match the balance is refetched as well; a failure there is not fatal
/// because the caller can always refresh separately.
async fn check_once<B: WalletBackend>(
    backend: &B,
    pending: &PendingPayment,
) -> Result<Option<(LedgerEntry, Option<Balance>)>> {
    let page = backend.fetch_newest_ledger(POLL_PAGE_LIMIT).await?;
    let Some(entry) = find_settlement(pending, &page.results) else {
        return Ok(None);
    };
    let entry = entry.clone();
    let balance = match backend.fetch_balance().await {
        Ok(balance) => Some(balance),
        Err(err) => {
            warn!(error = %err, "balance refresh after settlement failed");
            None
        }
    };
    Ok(Some((entry, balance)))
}

//! Shared test utilities: a scriptable wallet backend for poll tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{Duration, Utc};
use tokio::sync::Notify;

use slcwallet::Result;
use slcwallet::models::PaymentProvider;
use slcwallet::models::balance::Balance;
use slcwallet::models::ledger::{Direction, LedgerEntry, LedgerPage};
use slcwallet::poll::WalletBackend;
use slcwallet::settlement::PendingPayment;

/// Backend whose ledger fetches pop from a pre-loaded script.
///
/// When the script is exhausted, fetches return an empty page. With `gated`
/// set, every fetch blocks until [`release`](Self::release) is called,
/// which lets tests resolve a request after cancellation.
pub struct ScriptedBackend {
    pages: Mutex<VecDeque<Result<LedgerPage>>>,
    gate: Option<Notify>,
    fetch_calls: AtomicUsize,
}

impl ScriptedBackend {
    pub fn new(pages: Vec<Result<LedgerPage>>) -> Self {
        Self {
            pages: Mutex::new(pages.into_iter().collect()),
            gate: None,
            fetch_calls: AtomicUsize::new(0),
        }
    }

    pub fn gated(pages: Vec<Result<LedgerPage>>) -> Self {
        Self {
            gate: Some(Notify::new()),
            ..Self::new(pages)
        }
    }

    /// Lets one blocked fetch proceed.
    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

impl WalletBackend for ScriptedBackend {
    fn fetch_balance(&self) -> impl Future<Output = Result<Balance>> + Send {
        async {
            Ok(Balance {
                account_key: "acct-test".to_string(),
                balance_cents: 1_000,
                currency: "SLC".to_string(),
            })
        }
    }

    fn fetch_newest_ledger(&self, _limit: u32) -> impl Future<Output = Result<LedgerPage>> + Send {
        async {
            self.fetch_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            match self.pages.lock().expect("script lock poisoned").pop_front() {
                Some(result) => result,
                None => Ok(empty_page()),
            }
        }
    }
}

pub fn empty_page() -> LedgerPage {
    LedgerPage {
        results: Vec::new(),
        next_cursor: None,
    }
}

/// A page containing one credit entry settling `reference`.
pub fn settled_page(reference: &str, amount_cents: i64) -> LedgerPage {
    LedgerPage {
        results: vec![LedgerEntry {
            id: format!("le-{reference}"),
            event_id: format!("evt-{reference}"),
            event_type: "mint".to_string(),
            occurred_at: Utc::now(),
            account_key: "acct-test".to_string(),
            amount_cents,
            currency: "SLC".to_string(),
            direction: Direction::Credit,
            note: None,
            metadata: serde_json::json!({ "reference": reference }),
        }],
        next_cursor: None,
    }
}

/// A pending payment whose checkout launched a minute ago.
pub fn pending(provider: PaymentProvider, reference: &str, amount_cents: i64) -> PendingPayment {
    PendingPayment {
        provider,
        reference: reference.to_string(),
        expected_amount_cents: amount_cents,
        started_at: Utc::now() - Duration::seconds(60),
    }
}

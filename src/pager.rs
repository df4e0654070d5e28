//! Cursor-based ledger pagination.
//!
//! [`LedgerPager`] is a pure state machine: it issues request tickets, the
//! caller performs the HTTP fetch (see
//! [`WalletClient::fetch_ledger`](crate::client::WalletClient::fetch_ledger)),
//! and the result is applied back together with its ticket. The ticket guard
//! discards results from superseded in-flight requests, which is the only
//! protection against refresh and load-more racing each other — stale
//! responses are computed but never observed.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::error::ApiError;
use crate::models::ledger::{LedgerEntry, LedgerPage};

/// Ticket identifying one issued fetch.
///
/// Carries the cursor the request must be made with. Only the most recently
/// issued ticket may mutate the pager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTicket {
    id: u64,
    cursor: Option<String>,
}

impl RequestTicket {
    /// Cursor to pass to the ledger endpoint (`None` requests the newest
    /// page).
    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }
}

/// Result of applying a fetch outcome to the pager.
#[derive(Debug, PartialEq)]
pub enum PagerOutcome {
    /// State updated; `appended` new entries were added.
    Updated { appended: usize },
    /// The ticket was superseded by a newer request; nothing changed.
    Stale,
    /// The cursor was rejected as invalid. Pagination state has been reset
    /// and the caller should issue a fresh refresh instead of surfacing an
    /// error.
    ReloadRequired,
    /// Any other fetch error; existing state is untouched.
    Failed(ApiError),
}

/// Accumulates ledger pages without duplicating entries.
#[derive(Debug, Default)]
pub struct LedgerPager {
    entries: Vec<LedgerEntry>,
    held_ids: HashSet<String>,
    next_cursor: Option<String>,
    latest_ticket: u64,
}

impl LedgerPager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries accumulated so far, newest page first.
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// True when the backend reported more pages after the last applied one.
    pub fn has_more(&self) -> bool {
        self.next_cursor.is_some()
    }

    /// Starts a refresh from the newest page.
    ///
    /// Supersedes any in-flight request; their results will be discarded.
    pub fn begin_refresh(&mut self) -> RequestTicket {
        self.latest_ticket += 1;
        RequestTicket {
            id: self.latest_ticket,
            cursor: None,
        }
    }

    /// Starts a load-more from the stored cursor, or `None` when the end of
    /// the ledger has been reached.
    pub fn begin_load_more(&mut self) -> Option<RequestTicket> {
        let cursor = self.next_cursor.clone()?;
        self.latest_ticket += 1;
        Some(RequestTicket {
            id: self.latest_ticket,
            cursor: Some(cursor),
        })
    }

    /// Applies the outcome of a fetch issued with `ticket`.
    pub fn apply(
        &mut self,
        ticket: &RequestTicket,
        result: Result<LedgerPage, ApiError>,
    ) -> PagerOutcome {
        if ticket.id != self.latest_ticket {
            debug!(
                ticket = ticket.id,
                latest = self.latest_ticket,
                "discarding superseded ledger fetch"
            );
            return PagerOutcome::Stale;
        }

        match result {
            Ok(page) => {
                if ticket.cursor.is_none() {
                    self.entries.clear();
                    self.held_ids.clear();
                }
                let mut appended = 0;
                for entry in page.results {
                    if self.held_ids.insert(entry.id.clone()) {
                        self.entries.push(entry);
                        appended += 1;
                    }
                }
                self.next_cursor = page.next_cursor;
                PagerOutcome::Updated { appended }
            }
            Err(ApiError::InvalidCursor) => {
                warn!("ledger cursor rejected, resetting pagination");
                self.next_cursor = None;
                PagerOutcome::ReloadRequired
            }
            Err(err) => PagerOutcome::Failed(err),
        }
    }
}

//! Client-side validation layer for transfer and spend submission.
//!
//! Enforces the amount rules and the spend-reference allow-list before any
//! request is sent, and holds the local cooldown the client enters after a
//! 429. Acts as a safety net between UI intent and the wallet endpoints.

use std::fmt;
use std::time::{Duration, Instant};

use crate::models::spend::SpendReference;

/// How long submissions stay blocked after the backend throttles us.
pub const THROTTLE_COOLDOWN: Duration = Duration::from_secs(3);

/// Reason a submission was rejected before reaching the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    NonPositiveAmount {
        amount_cents: i64,
    },
    /// Transfer amount must be strictly below the balance; spend may equal it.
    ExceedsBalance {
        amount_cents: i64,
        balance_cents: i64,
    },
    ReferenceNotAllowed {
        reference: String,
    },
    /// A recent 429 put the client in a cooldown window.
    CoolingDown {
        remaining: Duration,
    },
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveAmount { amount_cents } => {
                write!(f, "amount must be positive, got {amount_cents}")
            }
            Self::ExceedsBalance {
                amount_cents,
                balance_cents,
            } => {
                write!(
                    f,
                    "amount {amount_cents} exceeds available balance {balance_cents}"
                )
            }
            Self::ReferenceNotAllowed { reference } => {
                write!(f, "spend reference {reference:?} is not allowed")
            }
            Self::CoolingDown { remaining } => {
                write!(
                    f,
                    "rate limited, retry in {}ms",
                    remaining.as_millis()
                )
            }
        }
    }
}

impl std::error::Error for SubmitError {}

/// Validates wallet submissions against local rules and the throttle cooldown.
pub struct TransferGuard {
    cooldown: Duration,
    cooldown_until: Option<Instant>,
}

impl TransferGuard {
    /// Creates a guard with the standard [`THROTTLE_COOLDOWN`].
    pub fn new() -> Self {
        Self::with_cooldown(THROTTLE_COOLDOWN)
    }

    /// Creates a guard with a custom cooldown window.
    pub fn with_cooldown(cooldown: Duration) -> Self {
        Self {
            cooldown,
            cooldown_until: None,
        }
    }

    /// Validates a transfer of `amount_cents` against the current balance.
    ///
    /// A transfer must leave a positive remainder, so the amount has to be
    /// strictly less than the balance.
    pub fn check_transfer(&self, amount_cents: i64, balance_cents: i64) -> Result<(), SubmitError> {
        self.ensure_not_cooling()?;
        if amount_cents <= 0 {
            return Err(SubmitError::NonPositiveAmount { amount_cents });
        }
        if amount_cents >= balance_cents {
            return Err(SubmitError::ExceedsBalance {
                amount_cents,
                balance_cents,
            });
        }
        Ok(())
    }

    /// Validates a spend, resolving `reference` against the allow-list.
    ///
    /// Spending the entire balance is allowed.
    pub fn check_spend(
        &self,
        amount_cents: i64,
        balance_cents: i64,
        reference: &str,
    ) -> Result<SpendReference, SubmitError> {
        self.ensure_not_cooling()?;
        if amount_cents <= 0 {
            return Err(SubmitError::NonPositiveAmount { amount_cents });
        }
        if amount_cents > balance_cents {
            return Err(SubmitError::ExceedsBalance {
                amount_cents,
                balance_cents,
            });
        }
        SpendReference::parse(reference).ok_or_else(|| SubmitError::ReferenceNotAllowed {
            reference: reference.to_string(),
        })
    }

    /// Records a 429 response; submissions are blocked for the cooldown
    /// window from now.
    pub fn note_throttled(&mut self) {
        self.cooldown_until = Some(Instant::now() + self.cooldown);
    }

    fn ensure_not_cooling(&self) -> Result<(), SubmitError> {
        if let Some(until) = self.cooldown_until {
            let now = Instant::now();
            if now < until {
                return Err(SubmitError::CoolingDown {
                    remaining: until - now,
                });
            }
        }
        Ok(())
    }
}

impl Default for TransferGuard {
    fn default() -> Self {
        Self::new()
    }
}

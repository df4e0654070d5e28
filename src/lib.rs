//! SelfLink wallet client engine.
//!
//! Provides typed models and async functions for the SLC coin wallet:
//! balance and ledger reads with cursor pagination, guarded transfer/spend
//! submission, multi-provider checkout launching, settlement polling, and
//! the realtime gift-event stream.

pub mod auth;
pub mod checkout;
pub mod client;
pub mod config;
pub mod credentials;
pub mod dedupe;
pub mod error;
pub mod guard;
pub mod models;
pub mod pager;
pub mod poll;
pub mod realtime;
pub mod settlement;
pub mod tls;

pub use error::{ApiError, Result, WalletError};

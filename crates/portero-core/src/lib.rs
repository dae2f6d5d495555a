//! Platform-agnostic core of the Portero gate-control bot.
//!
//! This crate contains the pieces shared by the backend client and the
//! Telegram frontend, with no I/O of its own:
//!
//! - [`ActionToken`] — structured navigation/command intent carried on
//!   inline buttons
//! - [`domain`] — canonical domain records (modules, groups, gates, menu)
//! - [`ErrorCategory`] — status-based error taxonomy
//! - [`RetryPolicy`] — linear-backoff retry state machine

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod action;
pub mod domain;
pub mod error;
pub mod retry;

pub use action::{ActionToken, ActionTokenError};
pub use domain::{Gate, GateList, Group, Menu, Module, UserProfile};
pub use error::ErrorCategory;
pub use retry::RetryPolicy;

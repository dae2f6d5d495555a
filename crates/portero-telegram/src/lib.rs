//! Portero Telegram bot — a thin gate-control frontend.
//!
//! Talks to the Portero authority backend over HTTP (through
//! `portero-backend`) and exposes gates to Telegram users as a single
//! anchored message the bot keeps editing in place: HOME, the group
//! list, the gate list, and a per-gate detail screen with the open
//! command.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod bot;
pub mod commands;
pub mod config;
pub mod controller;
pub mod error;
pub mod outbound;
pub mod render;
pub mod session;

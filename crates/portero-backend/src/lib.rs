//! HTTP client for the Portero authority backend.
//!
//! All backend traffic goes through [`BackendClient::issue`], which owns
//! the timeout, the classified retry loop, per-attempt correlation ids
//! and opportunistic body parsing. The typed operations layered on top
//! ([`BackendClient::menu`] and friends) normalize the heterogeneous
//! payload shapes of deployed backend versions into the canonical
//! structs from `portero-core`, so the navigation layer never sees raw
//! backend variance.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod client;
pub mod error;
pub mod normalize;
pub mod outcome;

pub use client::{BackendClient, BackendConfig};
pub use error::BackendError;
pub use outcome::RequestOutcome;

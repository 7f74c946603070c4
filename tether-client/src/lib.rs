//! # tether-client
//!
//! Blocking HTTP implementations of the capability traits in `tether-core`:
//! [`NetBoxClient`] for the registry and [`LibreNmsClient`] for the monitor.
//!
//! Payload decoding lives in plain functions next to each client so it can be
//! tested without a server. Every failure leaves this crate as a
//! [`tether_core::ClientError`].

pub mod http;
pub mod librenms;
pub mod netbox;

pub use http::{build_agent, Session};
pub use librenms::LibreNmsClient;
pub use netbox::NetBoxClient;

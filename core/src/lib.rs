//! Synchronous client for the Pushwoosh push-notification JSON API.
//!
//! # Overview
//! Shapes request bodies (notifications, filter conditions, geo-zones), wraps
//! them in the `{"request": {...}}` envelope with the application code and
//! auth token, performs one blocking `POST` per operation, and turns any reply
//! other than `200` / `"OK"` into a typed error.
//!
//! ```no_run
//! use pushwoosh_core::{Content, PushwooshClient, ZoneSpec, DEFAULT_CLUSTER_COOLDOWN};
//!
//! fn main() -> pushwoosh_core::Result<()> {
//!     let client = PushwooshClient::new("AUTH_TOKEN", "XXXXX-XXXXX");
//!
//!     client.create_message(&Content::from("Hello"), None, None)?;
//!
//!     let cluster = client.create_cluster("Downtown", DEFAULT_CLUSTER_COOLDOWN)?;
//!     let mut zone = ZoneSpec::new(40.70087797, -73.931851387, "Welcome!");
//!     zone.cluster = Some(cluster);
//!     let ids = client.create_zones(vec![zone])?;
//!     client.delete_zones(&ids)?;
//!     Ok(())
//! }
//! ```
//!
//! # Design
//! - `builder` holds the pure body-shaping functions; `client` owns I/O.
//! - The network sits behind the `Transport` trait. `UreqTransport` is the
//!   default; any `Fn(HttpRequest) -> Result<HttpResponse, TransportError>`
//!   works too, which is how tests run without a server.
//! - Successful create/delete calls emit `tracing` info events; install a
//!   subscriber to see them.

pub mod builder;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod types;

pub use builder::{apply_zone_defaults, build_notification, derive_conditions};
pub use client::{Endpoint, PushwooshClient, DEFAULT_CLUSTER_COOLDOWN};
pub use config::ClientConfig;
pub use error::{Error, RequestError, Result, TransportError};
pub use http::{HttpRequest, HttpResponse, Transport, UreqTransport};
pub use types::{
    Cluster, Condition, Content, Coordinate, GeoZone, Notification, Operator, ResponseEnvelope,
    ZoneGroup, ZoneSpec,
};

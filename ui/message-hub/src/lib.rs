//! The UI Message Hub (spec §4.1): a bidirectional, typed, JSON-framed
//! message stream to one or more UI clients, built on `axum`'s
//! websocket upgrade.

mod client;
mod connection;
mod egress;
mod handlers;
mod handshake;
mod hub;
mod inbound;
mod router;

pub use client::ClientHandle;
pub use client::ClientId;
pub use client::EGRESS_QUEUE_CAPACITY;
pub use client::LOW_PRIORITY_TYPES;
pub use handlers::Handler;
pub use handlers::HandlerFuture;
pub use handshake::SessionLookup;
pub use handshake::register as register_handshake;
pub use hub::Hub;
pub use inbound::InboundFrame;
pub use inbound::parse_inbound;
pub use router::router;

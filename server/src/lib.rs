//! # Arena Server Library
//!
//! Authoritative server for a two-team cannon arena. Clients connect over
//! TCP, press buttons (fire, turn, place brick) and receive periodic world
//! snapshots. The server owns the only copy of the world that matters.
//!
//! ## Architecture Design
//!
//! ### Single Serialized World
//! All mutations (joins, leaves, inputs, timer ticks) travel through one
//! bounded queue into a single consumer, the world actor in [`network`].
//! Each event runs to completion before the next is dequeued, so the world
//! needs no locks and every event is atomic.
//!
//! ### Dead Reckoning
//! Fuel, cannon position and missile travel are stored as a value at an
//! origin time plus a rate (see `shared::motion`). Nothing is integrated per
//! frame; state is evaluated on demand and origins are rewritten when a
//! player acts.
//!
//! ### Session Decoupling
//! Every connection gets an inbound task that turns frames into events and
//! an outbound loop that drains the player's own mailbox. The world only
//! ever does a non-blocking hand-off into mailboxes, so a stalled client
//! loses snapshots instead of stalling the arena.
//!
//! ## Module Organization
//!
//! - [`game`]: world state and the pure `apply(event, now)` transition
//! - [`collision`]: missile versus cannon sweep
//! - [`codec`]: length-prefixed bincode framing
//! - [`session`]: per-connection tasks
//! - [`network`]: listener, timers and the world actor loop
//! - [`discovery`]: LAN multicast responder and request
//! - [`config`]: runtime settings
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::config::ServerConfig;
//! use server::network::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), server::network::BoxError> {
//!     let mut server = Server::new(ServerConfig::default()).await?;
//!     server.run().await
//! }
//! ```

pub mod codec;
pub mod collision;
pub mod config;
pub mod discovery;
pub mod game;
pub mod network;
pub mod session;

use crate::discovery::DISCOVERY_GROUP;
use std::net::SocketAddrV4;
use std::time::Duration;

/// Runtime settings for [`crate::network::Server`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// TCP address the arena listens on.
    pub listen_addr: String,
    /// Period of regular snapshot broadcasts.
    pub update_interval: Duration,
    /// Period of collision sweeps.
    pub collision_interval: Duration,
    /// Snapshots buffered per player before new ones are dropped.
    pub mailbox_capacity: usize,
    /// Pending events before producers wait on the world.
    pub event_queue_capacity: usize,
    /// Multicast group answered with the listen address, if enabled.
    pub discovery: Option<SocketAddrV4>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            update_interval: Duration::from_millis(1000),
            collision_interval: Duration::from_millis(250),
            mailbox_capacity: 8,
            event_queue_capacity: 1000,
            discovery: Some(DISCOVERY_GROUP),
        }
    }
}

impl ServerConfig {
    pub fn with_listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.listen_addr = addr.into();
        self
    }

    pub fn without_discovery(mut self) -> Self {
        self.discovery = None;
        self
    }
}

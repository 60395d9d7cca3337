//! Server network layer: TCP sessions feeding the world actor

use crate::config::ServerConfig;
use crate::discovery;
use crate::game::{Delivery, Event, PlayerId, World};
use crate::session::run_session;
use log::{error, info, warn};
use shared::{Button, GameTime, Update};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::time::{interval, Instant, MissedTickBehavior};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Messages funnelled into the world actor, processed in arrival order.
#[derive(Debug)]
pub enum ServerMessage {
    Join {
        player_id: PlayerId,
        mailbox: mpsc::Sender<Update>,
    },
    Leave {
        player_id: PlayerId,
    },
    Input {
        player_id: PlayerId,
        button: Button,
    },
    UpdateTick,
    CollisionTick,
}

/// Arena server: owns the world and every player's mailbox.
pub struct Server {
    listener: Arc<TcpListener>,
    config: ServerConfig,
    world: World,
    mailboxes: HashMap<PlayerId, mpsc::Sender<Update>>,
    started: Instant,

    server_tx: mpsc::Sender<ServerMessage>,
    server_rx: mpsc::Receiver<ServerMessage>,
}

impl Server {
    pub async fn new(config: ServerConfig) -> Result<Self, BoxError> {
        let listener = TcpListener::bind(&config.listen_addr).await?;
        info!("Server listening on {}", listener.local_addr()?);

        let (server_tx, server_rx) = mpsc::channel(config.event_queue_capacity);

        Ok(Server {
            listener: Arc::new(listener),
            world: World::new(config.update_interval),
            mailboxes: HashMap::new(),
            started: Instant::now(),
            config,
            server_tx,
            server_rx,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    fn now(&self) -> GameTime {
        GameTime::from_secs(self.started.elapsed().as_secs_f64())
    }

    /// Spawns task that accepts connections and starts a session for each
    fn spawn_acceptor(&self) {
        let listener = Arc::clone(&self.listener);
        let server_tx = self.server_tx.clone();
        let mailbox_capacity = self.config.mailbox_capacity;

        tokio::spawn(async move {
            let mut next_player_id: PlayerId = 1;

            loop {
                match listener.accept().await {
                    Ok((stream, addr)) => {
                        let player_id = next_player_id;
                        next_player_id = next_player_id.wrapping_add(1);
                        info!("Connection from {} (player {})", addr, player_id);
                        tokio::spawn(run_session(
                            stream,
                            addr,
                            player_id,
                            server_tx.clone(),
                            mailbox_capacity,
                        ));
                    }
                    Err(e) => {
                        error!("Error accepting connection: {}", e);
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    }
                }
            }
        });
    }

    /// Spawns task that posts `make()` into the world queue every `period`
    fn spawn_ticker(&self, period: Duration, make: fn() -> ServerMessage) {
        let server_tx = self.server_tx.clone();

        tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                if server_tx.send(make()).await.is_err() {
                    break;
                }
            }
        });
    }

    fn spawn_discovery(&self) {
        let Some(group) = self.config.discovery else {
            return;
        };
        let advertised = match self.local_addr() {
            Ok(addr) => addr.to_string(),
            Err(e) => {
                warn!("Discovery disabled, no local address: {}", e);
                return;
            }
        };

        tokio::spawn(async move {
            if let Err(e) = discovery::respond(group, advertised).await {
                warn!("Discovery responder stopped: {}", e);
            }
        });
    }

    /// Applies one message to the world and hands out resulting snapshots
    fn handle_message(&mut self, message: ServerMessage) {
        let now = self.now();
        let event = match message {
            ServerMessage::Join { player_id, mailbox } => {
                self.mailboxes.insert(player_id, mailbox);
                Event::Join(player_id)
            }
            ServerMessage::Leave { player_id } => {
                self.mailboxes.remove(&player_id);
                Event::Leave(player_id)
            }
            ServerMessage::Input { player_id, button } => Event::Input { player_id, button },
            ServerMessage::UpdateTick => Event::UpdateTick,
            ServerMessage::CollisionTick => Event::CollisionTick,
        };

        let deliveries = self.world.apply(event, now);
        self.deliver(deliveries);
    }

    /// Hands snapshots to mailboxes without waiting on any client
    fn deliver(&mut self, deliveries: Vec<Delivery>) {
        for Delivery { player_id, update } in deliveries {
            let Some(mailbox) = self.mailboxes.get(&player_id) else {
                warn!("No mailbox for player {}", player_id);
                continue;
            };

            match mailbox.try_send(update) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    warn!("Mailbox of player {} is full, snapshot dropped", player_id);
                }
                Err(TrySendError::Closed(_)) => {
                    error!("Mailbox of player {} is closed", player_id);
                }
            }
        }
    }

    /// Main server loop: the only place the world is mutated
    pub async fn run(&mut self) -> Result<(), BoxError> {
        self.spawn_acceptor();
        self.spawn_ticker(self.config.update_interval, || ServerMessage::UpdateTick);
        self.spawn_ticker(self.config.collision_interval, || {
            ServerMessage::CollisionTick
        });
        self.spawn_discovery();

        info!("Server started successfully");

        while let Some(message) = self.server_rx.recv().await {
            self.handle_message(message);
        }

        info!("Server shutting down");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::Button;

    async fn test_server() -> Server {
        let config = ServerConfig::default()
            .with_listen_addr("127.0.0.1:0")
            .without_discovery();
        Server::new(config).await.unwrap()
    }

    #[tokio::test]
    async fn test_join_registers_mailbox_before_broadcast() {
        let mut server = test_server().await;
        let (mailbox, mut outbox) = mpsc::channel(4);

        server.handle_message(ServerMessage::Join {
            player_id: 1,
            mailbox,
        });
        server.handle_message(ServerMessage::UpdateTick);

        let update = outbox.try_recv().unwrap();
        assert_eq!(update.cannons.len(), 1);
        assert!(update.cannons[0].player);
    }

    #[tokio::test]
    async fn test_fire_reaches_every_mailbox_with_sound() {
        let mut server = test_server().await;
        let (mailbox1, mut outbox1) = mpsc::channel(4);
        let (mailbox2, mut outbox2) = mpsc::channel(4);
        server.handle_message(ServerMessage::Join {
            player_id: 1,
            mailbox: mailbox1,
        });
        server.handle_message(ServerMessage::Join {
            player_id: 2,
            mailbox: mailbox2,
        });

        server.handle_message(ServerMessage::Input {
            player_id: 2,
            button: Button::Fire,
        });

        for outbox in [&mut outbox1, &mut outbox2] {
            let update = outbox.try_recv().unwrap();
            assert!(update.fire_sound);
            assert_eq!(update.missiles.len(), 1);
            assert_eq!(update.missiles[0].team, 1);
        }
    }

    #[tokio::test]
    async fn test_full_mailbox_drops_snapshots_without_blocking() {
        let mut server = test_server().await;
        let (mailbox, mut outbox) = mpsc::channel(2);
        server.handle_message(ServerMessage::Join {
            player_id: 1,
            mailbox,
        });

        for _ in 0..5 {
            server.handle_message(ServerMessage::UpdateTick);
        }

        assert!(outbox.try_recv().is_ok());
        assert!(outbox.try_recv().is_ok());
        assert!(outbox.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_leave_drops_mailbox_and_player() {
        let mut server = test_server().await;
        let (mailbox, mut outbox) = mpsc::channel(4);
        server.handle_message(ServerMessage::Join {
            player_id: 1,
            mailbox,
        });
        server.handle_message(ServerMessage::Leave { player_id: 1 });
        server.handle_message(ServerMessage::UpdateTick);

        assert!(server.world.players.is_empty());
        assert!(server.mailboxes.is_empty());
        // The mailbox sender is gone, so the session side sees the end.
        assert!(matches!(
            outbox.try_recv(),
            Err(mpsc::error::TryRecvError::Disconnected)
        ));
    }

    #[tokio::test]
    async fn test_closed_mailbox_is_skipped() {
        let mut server = test_server().await;
        let (mailbox1, outbox1) = mpsc::channel(4);
        let (mailbox2, mut outbox2) = mpsc::channel(4);
        server.handle_message(ServerMessage::Join {
            player_id: 1,
            mailbox: mailbox1,
        });
        server.handle_message(ServerMessage::Join {
            player_id: 2,
            mailbox: mailbox2,
        });
        drop(outbox1);

        server.handle_message(ServerMessage::UpdateTick);
        assert!(outbox2.try_recv().is_ok());
    }

    #[test]
    fn test_server_message_creation() {
        let msg = ServerMessage::Input {
            player_id: 42,
            button: Button::Turn,
        };

        match msg {
            ServerMessage::Input { player_id, button } => {
                assert_eq!(player_id, 42);
                assert_eq!(button, Button::Turn);
            }
            _ => panic!("Unexpected message type"),
        }
    }
}

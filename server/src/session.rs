//! Per-connection session tasks.
//!
//! A session registers its player with the world, then runs two halves:
//! an inbound task decoding [`ClientPacket`]s into world events, and an
//! outbound loop writing snapshots from the player's mailbox. Whichever half
//! stops first takes the other down, and exactly one `Leave` is sent.

use crate::codec::{read_packet, write_packet, CodecError};
use crate::game::PlayerId;
use crate::network::ServerMessage;
use log::{debug, info, warn};
use shared::{ClientPacket, ServerPacket, Update};
use std::net::SocketAddr;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};

/// Serves one TCP connection until either direction fails.
pub async fn run_session(
    stream: TcpStream,
    addr: SocketAddr,
    player_id: PlayerId,
    events: mpsc::Sender<ServerMessage>,
    mailbox_capacity: usize,
) {
    if let Err(e) = stream.set_nodelay(true) {
        debug!("Could not disable Nagle for {}: {}", addr, e);
    }
    let (reader, writer) = stream.into_split();
    serve(reader, writer, addr, player_id, events, mailbox_capacity).await;
}

/// Session body, generic over the transport halves.
pub async fn serve<R, W>(
    reader: R,
    mut writer: W,
    addr: SocketAddr,
    player_id: PlayerId,
    events: mpsc::Sender<ServerMessage>,
    mailbox_capacity: usize,
) where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin,
{
    let (mailbox, mut outbox) = mpsc::channel::<Update>(mailbox_capacity);

    // The mailbox travels with the join so the world never targets a
    // player it cannot reach.
    if events
        .send(ServerMessage::Join { player_id, mailbox })
        .await
        .is_err()
    {
        warn!("World is gone, dropping connection from {}", addr);
        return;
    }
    info!("Session {} started for {}", player_id, addr);

    let (quit_tx, mut quit_rx) = oneshot::channel::<()>();
    let inbound = tokio::spawn(read_inputs(reader, addr, player_id, events.clone(), quit_tx));

    loop {
        tokio::select! {
            _ = &mut quit_rx => {
                debug!("Session {}: inbound side finished", player_id);
                break;
            }
            update = outbox.recv() => {
                let Some(update) = update else {
                    break;
                };
                if let Err(e) = write_packet(&mut writer, &ServerPacket::Update(update)).await {
                    warn!("Session {}: failed to write to {}: {}", player_id, addr, e);
                    break;
                }
            }
        }
    }

    inbound.abort();
    if events.send(ServerMessage::Leave { player_id }).await.is_err() {
        warn!("World is gone, could not deregister player {}", player_id);
    }
    info!("Session {} for {} closed", player_id, addr);
}

async fn read_inputs<R>(
    mut reader: R,
    addr: SocketAddr,
    player_id: PlayerId,
    events: mpsc::Sender<ServerMessage>,
    quit: oneshot::Sender<()>,
) where
    R: AsyncRead + Unpin,
{
    loop {
        match read_packet::<_, ClientPacket>(&mut reader).await {
            Ok(ClientPacket::Input(button)) => {
                debug!("Session {}: {:?}", player_id, button);
                if events
                    .send(ServerMessage::Input { player_id, button })
                    .await
                    .is_err()
                {
                    break;
                }
            }
            Err(CodecError::Closed) => {
                info!("Client {} disconnected", addr);
                break;
            }
            Err(e) => {
                warn!("Dropping client {}: {}", addr, e);
                break;
            }
        }
    }
    let _ = quit.send(());
}

//! LAN discovery over UDP multicast.
//!
//! The responder answers any datagram sent to the discovery group with the
//! server's TCP listen address as plain text. Clients send a request and
//! resolve the reply into a connectable endpoint.

use log::{info, warn};
use std::net::{IpAddr, Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::{sleep, timeout};

pub const DISCOVERY_GROUP: SocketAddrV4 = SocketAddrV4::new(Ipv4Addr::new(239, 1, 1, 1), 8888);

const REQUEST: &[u8] = b"request\n";
const READ_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// Answers discovery requests on `group`. Returns only if the socket cannot be set up.
pub async fn respond(group: SocketAddrV4, advertised: String) -> std::io::Result<()> {
    let socket = UdpSocket::bind(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, group.port())).await?;
    socket.join_multicast_v4(*group.ip(), Ipv4Addr::UNSPECIFIED)?;
    info!("Discovery service on {} advertising {}", group, advertised);
    answer(&socket, &advertised).await;
    Ok(())
}

/// Replies to every datagram on `socket` with `advertised`.
async fn answer(socket: &UdpSocket, advertised: &str) {
    let mut buffer = [0u8; 1000];
    loop {
        let (_, src) = match socket.recv_from(&mut buffer).await {
            Ok(received) => received,
            Err(e) => {
                warn!("Discovery read error: {}", e);
                sleep(READ_ERROR_BACKOFF).await;
                continue;
            }
        };
        match socket.send_to(advertised.as_bytes(), src).await {
            Ok(_) => info!("Discovery: replied {} to {}", advertised, src),
            Err(e) => warn!("Discovery write error to {}: {}", src, e),
        }
    }
}

/// Asks the LAN for an arena server and returns its endpoint.
pub async fn request(group: SocketAddrV4, wait: Duration) -> std::io::Result<SocketAddr> {
    let socket = UdpSocket::bind(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0)).await?;
    socket.set_multicast_loop_v4(true)?;
    socket.set_multicast_ttl_v4(5)?;
    socket.send_to(REQUEST, group).await?;

    let mut buffer = [0u8; 1000];
    let (len, src) = timeout(wait, socket.recv_from(&mut buffer))
        .await
        .map_err(|_| std::io::Error::new(std::io::ErrorKind::TimedOut, "no discovery reply"))??;

    let reply = String::from_utf8_lossy(&buffer[..len]);
    info!("Discovery reply from {}: {}", src, reply.trim());
    resolve_endpoint(&reply, src).ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("unusable discovery reply {:?}", reply),
        )
    })
}

/// Turns an advertised listen address into an endpoint reachable from here.
///
/// A missing or unspecified host (`:8080`, `0.0.0.0:8080`) means the server
/// listens everywhere, so the reply's source address is used instead.
pub fn resolve_endpoint(reply: &str, src: SocketAddr) -> Option<SocketAddr> {
    let reply = reply.trim();
    let (host, port) = reply.rsplit_once(':')?;
    let port: u16 = port.parse().ok()?;

    let host = host.trim_start_matches('[').trim_end_matches(']');
    let ip = if host.is_empty() {
        src.ip()
    } else {
        match host.parse::<IpAddr>().ok()? {
            ip if ip.is_unspecified() => src.ip(),
            ip => ip,
        }
    };
    Some(SocketAddr::new(ip, port))
}

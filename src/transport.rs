use std::{
    net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr},
    time::Duration,
};

use rosc::{OscMessage, OscPacket, OscType};
use socket2::{Domain, Protocol, Socket, Type};
use tokio::{net::UdpSocket, sync::Mutex};

use crate::{config::Config, Error};

/// Note listings for long clips do not fit in an Ethernet MTU, so the
/// receive buffer is sized for the largest UDP payload.
const RECV_BUFFER_SIZE: usize = 65_536;

/// The UDP socket pair shared by every call of one client.
///
/// Requests leave through an ephemeral socket guarded by a send lock;
/// replies arrive on the socket bound to [`Config::listen_addr`].
pub struct Transport {
    send_socket: Mutex<UdpSocket>,
    recv_socket: UdpSocket,
    remote: SocketAddr,
}

impl Transport {
    pub async fn bind(config: &Config) -> Result<Self, Error> {
        let recv_socket = bind_reply_socket(config.listen_addr())?;
        let send_socket = UdpSocket::bind(SocketAddr::new(unspecified(config.host), 0)).await?;
        log::debug!(
            "OSC transport bound: replies on {:?}, sending from {:?} to {}",
            recv_socket.local_addr().ok(),
            send_socket.local_addr().ok(),
            config.remote_addr(),
        );
        Ok(Transport {
            send_socket: Mutex::new(send_socket),
            recv_socket,
            remote: config.remote_addr(),
        })
    }

    /// Address replies are received on.
    pub fn local_addr(&self) -> Result<SocketAddr, Error> {
        Ok(self.recv_socket.local_addr()?)
    }

    pub fn remote_addr(&self) -> SocketAddr {
        self.remote
    }

    /// Sends one OSC message as one datagram.
    pub async fn send(&self, address: &str, args: Vec<OscType>) -> Result<(), Error> {
        let packet = OscPacket::Message(OscMessage {
            addr: address.to_string(),
            args,
        });
        let buf = rosc::encoder::encode(&packet)?;
        let socket = self.send_socket.lock().await;
        socket.send_to(&buf, self.remote).await?;
        log::trace!("sent {} ({} bytes) to {}", address, buf.len(), self.remote);
        Ok(())
    }

    /// Receives one datagram and returns the messages it carries.
    ///
    /// With `Some(timeout)` the wait is bounded and ends in
    /// [`Error::Timeout`] with the address `*`.
    pub async fn receive(&self, timeout: Option<Duration>) -> Result<Vec<OscMessage>, Error> {
        let mut buf = vec![0u8; RECV_BUFFER_SIZE];
        let len = match timeout {
            None => self.recv_socket.recv(&mut buf).await?,
            Some(window) => tokio::time::timeout(window, self.recv_socket.recv(&mut buf))
                .await
                .map_err(|_| Error::Timeout {
                    address: "*".to_string(),
                    prefix: Vec::new(),
                    timeout: window,
                    bridge_error: None,
                })??,
        };
        decode_datagram(&buf[..len])
    }
}

/// Decodes a datagram, flattening bundles into their messages in order.
pub fn decode_datagram(bytes: &[u8]) -> Result<Vec<OscMessage>, Error> {
    let (_, packet) = rosc::decoder::decode_udp(bytes)?;
    let mut messages = Vec::new();
    flatten(packet, &mut messages);
    Ok(messages)
}

fn flatten(packet: OscPacket, out: &mut Vec<OscMessage>) {
    match packet {
        OscPacket::Message(message) => out.push(message),
        OscPacket::Bundle(bundle) => {
            for inner in bundle.content {
                flatten(inner, out);
            }
        }
    }
}

fn bind_reply_socket(addr: SocketAddr) -> Result<UdpSocket, std::io::Error> {
    let socket = Socket::new(Domain::for_address(addr), Type::DGRAM, Some(Protocol::UDP))?;
    // Lets a restarted client take the reply port back immediately.
    socket.set_reuse_address(true)?;
    socket.bind(&addr.into())?;
    socket.set_nonblocking(true)?;
    UdpSocket::from_std(socket.into())
}

fn unspecified(like: IpAddr) -> IpAddr {
    match like {
        IpAddr::V4(_) => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        IpAddr::V6(_) => IpAddr::V6(Ipv6Addr::UNSPECIFIED),
    }
}

use super::ClientHandle;
use super::NetEvent;
use super::PendingAcks;
use super::client;
use super::wire;
use crate::config::NetSettings;
use crate::protocol::Envelope;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use tokio::net::TcpListener;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::unbounded_channel;
use tokio::time::Duration;
use tokio::time::Instant;

/// The orchestrator's face of the transport: the accept loop runs in
/// its own task and feeds one event queue; everything else (client
/// table, ack track, fanout) is owned here and touched only from the
/// orchestrator tick.
pub struct Gateway {
    clients: HashMap<i32, ClientHandle>,
    pending: PendingAcks,
    inbox: UnboundedReceiver<NetEvent>,
    population: Arc<AtomicUsize>,
    address: SocketAddr,
    settings: NetSettings,
}

impl Gateway {
    pub async fn bind(settings: NetSettings) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(("0.0.0.0", settings.port)).await?;
        let address = listener.local_addr()?;
        log::info!("listening on {}", address);
        let (events, inbox) = unbounded_channel();
        let population = Arc::new(AtomicUsize::new(0));
        let capacity = settings.max_clients;
        let gate = population.clone();
        tokio::spawn(async move {
            let mut next = 1i32;
            loop {
                match listener.accept().await {
                    Ok((stream, peer)) => {
                        if gate.load(Ordering::Relaxed) >= capacity {
                            log::warn!("refusing {}: session full", peer);
                            continue;
                        }
                        gate.fetch_add(1, Ordering::Relaxed);
                        let id = next;
                        next += 1;
                        log::info!("client {} connected from {}", id, peer);
                        client::spawn(id, stream, events.clone());
                    }
                    Err(e) => log::warn!("accept failed: {}", e),
                }
            }
        });
        Ok(Self {
            clients: HashMap::new(),
            pending: PendingAcks::default(),
            inbox,
            population,
            address,
            settings,
        })
    }

    pub fn address(&self) -> SocketAddr {
        self.address
    }
    pub fn clients(&self) -> impl Iterator<Item = i32> {
        self.clients.keys().copied()
    }
    pub fn connected(&self, client: i32) -> bool {
        self.clients.contains_key(&client)
    }

    /// Drain the event queue, keeping the client table and ack track
    /// in step. The read and write tasks can both report the same
    /// death; only the first one survives the filter.
    pub fn poll(&mut self) -> Vec<NetEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.inbox.try_recv() {
            match event {
                NetEvent::Connected(handle) => {
                    self.clients.insert(handle.id, handle.clone());
                    events.push(NetEvent::Connected(handle));
                }
                NetEvent::Disconnected(id) => {
                    if self.clients.remove(&id).is_some() {
                        self.pending.drop_client(id);
                        self.population.fetch_sub(1, Ordering::Relaxed);
                        events.push(NetEvent::Disconnected(id));
                    }
                }
                message => events.push(message),
            }
        }
        events
    }

    /// point-to-point send; reliable envelopes join the ack track
    pub fn send(&mut self, client: i32, envelope: &Envelope) {
        let Some(handle) = self.clients.get(&client) else {
            log::debug!("send to absent client {}", client);
            return;
        };
        let frame = wire::encode(envelope);
        if envelope.requires_ack {
            self.pending
                .track(envelope.sequence_id, client, frame.clone(), Instant::now());
        }
        handle.push(frame);
    }

    /// Fanout to everyone. Reliable broadcasts are re-sequenced per
    /// recipient from the broadcast counter space so each pending
    /// entry is individually ackable.
    pub fn broadcast(&mut self, envelope: &Envelope) {
        match envelope.requires_ack {
            false => {
                let frame = wire::encode(envelope);
                for handle in self.clients.values() {
                    handle.push(frame.clone());
                }
            }
            true => {
                let ids = self.clients.keys().copied().collect::<Vec<i32>>();
                for id in ids {
                    let clone = envelope.recloned();
                    self.send(id, &clone);
                }
            }
        }
    }

    /// ack received from a peer
    pub fn settle(&mut self, sequence: u32) {
        if !self.pending.settle(sequence) {
            log::debug!("ack for unknown seq {}", sequence);
        }
    }

    /// retry sweep, driven once per orchestrator tick
    pub fn sweep(&mut self) {
        let timeout = Duration::from_millis(self.settings.ack_timeout_ms);
        let retransmit =
            self.pending
                .sweep(Instant::now(), timeout, self.settings.ack_max_retries);
        for (client, frame) in retransmit {
            if let Some(handle) = self.clients.get(&client) {
                handle.push(frame);
            }
        }
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::MessageKind;
    use crate::protocol::payloads::Ping;
    use crate::protocol::payloads::Pong;
    use tokio::io::AsyncWriteExt;

    async fn drain(gateway: &mut Gateway, wanted: usize) -> Vec<NetEvent> {
        let mut events = Vec::new();
        for _ in 0..200 {
            events.extend(gateway.poll());
            if events.len() >= wanted {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        events
    }

    #[tokio::test]
    async fn connect_send_receive_and_disconnect() {
        let settings = NetSettings { port: 0, ..NetSettings::default() };
        let mut gateway = Gateway::bind(settings).await.expect("bind");
        let mut socket = tokio::net::TcpStream::connect(gateway.address()).await.expect("connect");
        let ping = Envelope::fire(MessageKind::Ping, &Ping { timestamp: 5 });
        socket.write_all(&wire::encode(&ping)).await.expect("write");
        let events = drain(&mut gateway, 2).await;
        assert!(matches!(events[0], NetEvent::Connected(_)));
        let NetEvent::Message(client, received) = &events[1] else {
            panic!("expected the ping");
        };
        assert!(*received == ping);
        let pong = Envelope::fire(
            MessageKind::Pong,
            &Pong { original_timestamp: 5, server_received_at: 6 },
        );
        gateway.send(*client, &pong);
        let mut reader = socket;
        let back = wire::read_frame(&mut reader).await.expect("framed reply");
        assert!(back == pong);
        drop(reader);
        let events = drain(&mut gateway, 1).await;
        assert!(events.iter().any(|e| matches!(e, NetEvent::Disconnected(_))));
        assert!(gateway.clients().count() == 0);
    }

    #[tokio::test]
    async fn illegal_prefix_costs_the_connection() {
        let settings = NetSettings { port: 0, ..NetSettings::default() };
        let mut gateway = Gateway::bind(settings).await.expect("bind");
        let mut socket = tokio::net::TcpStream::connect(gateway.address()).await.expect("connect");
        socket.write_all(&0u32.to_le_bytes()).await.expect("write");
        let events = drain(&mut gateway, 2).await;
        assert!(events.iter().any(|e| matches!(e, NetEvent::Disconnected(_))));
    }

    #[tokio::test]
    async fn reliable_broadcast_reclones_per_recipient() {
        let settings = NetSettings { port: 0, ..NetSettings::default() };
        let mut gateway = Gateway::bind(settings).await.expect("bind");
        let mut first = tokio::net::TcpStream::connect(gateway.address()).await.expect("connect");
        let mut second = tokio::net::TcpStream::connect(gateway.address()).await.expect("connect");
        drain(&mut gateway, 2).await;
        let start = Envelope::reliable(
            MessageKind::StartRound,
            &crate::protocol::payloads::StartRound { round_number: 3 },
        );
        gateway.broadcast(&start);
        assert!(gateway.pending() == 2);
        let a = wire::read_frame(&mut first).await.expect("framed");
        let b = wire::read_frame(&mut second).await.expect("framed");
        assert!(a.sequence_id != b.sequence_id);
        assert!(a.sequence_id >= 0x8000_0000 && b.sequence_id >= 0x8000_0000);
        assert!(a.payload_json == b.payload_json);
        gateway.settle(a.sequence_id);
        gateway.settle(b.sequence_id);
        assert!(gateway.pending() == 0);
    }
}

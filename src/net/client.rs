use super::wire;
use crate::protocol::Envelope;
use bytes::Bytes;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::mpsc::unbounded_channel;

/// What the transport tells the orchestrator.
#[derive(Debug)]
pub enum NetEvent {
    Connected(ClientHandle),
    Message(i32, Envelope),
    Disconnected(i32),
}

/// The orchestrator's grip on one connection: the id the reader was
/// tagged with and the outbox feeding its writer task. One writer task
/// owns the write half, so outbound frames never interleave.
#[derive(Debug, Clone)]
pub struct ClientHandle {
    pub id: i32,
    outbox: UnboundedSender<Bytes>,
}

impl ClientHandle {
    pub fn push(&self, frame: Bytes) {
        self.outbox
            .send(frame)
            .map(|_| ())
            .unwrap_or_else(|_| log::debug!("client {} outbox closed", self.id));
    }
}

/// Split the socket, spawn the read and write tasks, announce the
/// handle. Read errors, illegal prefixes and EOF all end the same
/// way: one Disconnected event and silence.
pub fn spawn(id: i32, stream: TcpStream, events: UnboundedSender<NetEvent>) {
    let (mut reader, mut writer) = stream.into_split();
    let (outbox, mut inbox) = unbounded_channel::<Bytes>();
    let _ = events.send(NetEvent::Connected(ClientHandle { id, outbox }));
    let reads = events.clone();
    tokio::spawn(async move {
        loop {
            match wire::read_frame(&mut reader).await {
                Ok(envelope) => {
                    if reads.send(NetEvent::Message(id, envelope)).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    log::info!("client {} read path closed: {}", id, e);
                    let _ = reads.send(NetEvent::Disconnected(id));
                    break;
                }
            }
        }
    });
    tokio::spawn(async move {
        while let Some(frame) = inbox.recv().await {
            if let Err(e) = writer.write_all(&frame).await {
                log::info!("client {} write path closed: {}", id, e);
                let _ = events.send(NetEvent::Disconnected(id));
                break;
            }
        }
    });
}

use crate::protocol::Envelope;
use byteorder::LittleEndian;
use byteorder::WriteBytesExt;
use bytes::Bytes;
use tokio::io::AsyncRead;
use tokio::io::AsyncReadExt;

/// Frame cap: a 32-bit little-endian length prefix, then that many
/// bytes of UTF-8 JSON. Anything larger (or empty) is a protocol
/// violation and costs the connection.
pub const MAX_FRAME: usize = 1_048_576;

/// length-prefix framing for one outbound envelope
pub fn encode(envelope: &Envelope) -> Bytes {
    let body = serde_json::to_vec(envelope).expect("envelope serializes");
    let mut frame = Vec::with_capacity(4 + body.len());
    frame
        .write_u32::<LittleEndian>(body.len() as u32)
        .expect("length prefix writes");
    frame.extend_from_slice(&body);
    Bytes::from(frame)
}

/// Read one frame off an ordered stream. Errors mean the connection
/// is beyond saving: bad prefix, oversized frame, malformed JSON, or
/// plain EOF.
pub async fn read_frame<R: AsyncRead + Unpin>(reader: &mut R) -> anyhow::Result<Envelope> {
    let length = reader.read_u32_le().await? as usize;
    if length == 0 || length > MAX_FRAME {
        anyhow::bail!("illegal frame length {}", length);
    }
    let mut body = vec![0u8; length];
    reader.read_exact(&mut body).await?;
    serde_json::from_slice(&body).map_err(|e| anyhow::anyhow!("malformed envelope: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::MessageKind;
    use crate::protocol::payloads::Ping;

    #[tokio::test]
    async fn encode_then_read_round_trips() {
        let sent = Envelope::fire(MessageKind::Ping, &Ping { timestamp: 99 });
        let frame = encode(&sent);
        let mut reader = std::io::Cursor::new(frame.to_vec());
        let received = read_frame(&mut reader).await.expect("well formed");
        assert!(received == sent);
    }

    #[tokio::test]
    async fn prefix_is_little_endian_and_exact() {
        let sent = Envelope::fire(MessageKind::Ping, &Ping { timestamp: 0 });
        let frame = encode(&sent);
        let length = u32::from_le_bytes([frame[0], frame[1], frame[2], frame[3]]) as usize;
        assert!(length == frame.len() - 4);
    }

    #[tokio::test]
    async fn zero_length_frames_are_rejected() {
        let mut reader = std::io::Cursor::new(vec![0u8, 0, 0, 0]);
        assert!(read_frame(&mut reader).await.is_err());
    }

    #[tokio::test]
    async fn oversized_frames_are_rejected() {
        let mut reader = std::io::Cursor::new(((MAX_FRAME + 1) as u32).to_le_bytes().to_vec());
        assert!(read_frame(&mut reader).await.is_err());
    }

    #[tokio::test]
    async fn truncated_frames_are_rejected() {
        let mut bytes = 32u32.to_le_bytes().to_vec();
        bytes.extend_from_slice(b"{}");
        let mut reader = std::io::Cursor::new(bytes);
        assert!(read_frame(&mut reader).await.is_err());
    }
}

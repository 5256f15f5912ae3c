use super::MessageKind;
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::atomic::AtomicU32;
use std::sync::atomic::Ordering;

// Unicasts and per-recipient broadcast clones draw from disjoint
// counter spaces so a cloned reliable broadcast can never collide
// with an in-flight unicast sequence.
static UNICAST: AtomicU32 = AtomicU32::new(1);
static BROADCAST: AtomicU32 = AtomicU32::new(0x8000_0000);

/// The only wire form: a typed header around an opaque JSON payload.
/// Field names are the shared contract with the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Envelope {
    #[serde(rename = "Type")]
    pub kind: MessageKind,
    pub payload_json: String,
    pub sequence_id: u32,
    pub requires_ack: bool,
}

impl Envelope {
    /// reliable message: rides the ack/retry track
    pub fn reliable<T: Serialize>(kind: MessageKind, payload: &T) -> Self {
        Self::build(kind, payload, true)
    }

    /// fire-and-forget message
    pub fn fire<T: Serialize>(kind: MessageKind, payload: &T) -> Self {
        Self::build(kind, payload, false)
    }

    fn build<T: Serialize>(kind: MessageKind, payload: &T, requires_ack: bool) -> Self {
        Self {
            kind,
            payload_json: serde_json::to_string(payload).expect("payload serializes"),
            sequence_id: UNICAST.fetch_add(1, Ordering::Relaxed),
            requires_ack,
        }
    }

    /// per-recipient clone of a reliable broadcast, re-sequenced from
    /// the broadcast counter space
    pub fn recloned(&self) -> Self {
        let mut clone = self.clone();
        clone.sequence_id = BROADCAST.fetch_add(1, Ordering::Relaxed);
        clone
    }

    pub fn decode<T: DeserializeOwned>(&self) -> anyhow::Result<T> {
        serde_json::from_str(&self.payload_json)
            .map_err(|e| anyhow::anyhow!("malformed {} payload: {}", self.kind, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::payloads::*;

    #[test]
    fn wire_keys_are_pascal_case() {
        let envelope = Envelope::reliable(MessageKind::ReadyUp, &ReadyUp { is_ready: true });
        let json = serde_json::to_string(&envelope).expect("serializes");
        assert!(json.contains("\"Type\":\"ReadyUp\""));
        assert!(json.contains("\"PayloadJson\""));
        assert!(json.contains("\"SequenceId\""));
        assert!(json.contains("\"RequiresAck\":true"));
    }

    #[test]
    fn round_trip_preserves_the_envelope() {
        let sent = Envelope::fire(MessageKind::Ping, &Ping { timestamp: 42 });
        let bytes = serde_json::to_vec(&sent).expect("serializes");
        let back: Envelope = serde_json::from_slice(&bytes).expect("parses");
        assert!(back == sent);
        assert!(back.decode::<Ping>().expect("payload").timestamp == 42);
    }

    #[test]
    fn recloned_broadcasts_use_the_high_counter_space() {
        let original = Envelope::reliable(MessageKind::StartRound, &StartRound { round_number: 1 });
        let clone = original.recloned();
        assert!(clone.sequence_id >= 0x8000_0000);
        assert!(original.sequence_id < 0x8000_0000);
        assert!(clone.payload_json == original.payload_json);
    }

    #[test]
    fn buy_xp_kind_spells_xp_upper() {
        let envelope = Envelope::reliable(MessageKind::BuyXp, &BuyXp {});
        let json = serde_json::to_string(&envelope).expect("serializes");
        assert!(json.contains("\"Type\":\"BuyXP\""));
    }
}

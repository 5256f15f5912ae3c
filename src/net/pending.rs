use bytes::Bytes;
use std::collections::HashMap;
use tokio::time::Duration;
use tokio::time::Instant;

/// One reliable message awaiting its ack.
#[derive(Debug, Clone)]
struct Entry {
    client: i32,
    frame: Bytes,
    sent_at: Instant,
    retries: u32,
}

/// The ack/retry track. Reliable sends register here; the sweeper
/// retransmits the same bytes past the timeout and gives up after the
/// retry budget, logging who went deaf. Entries die on ack, on
/// exhaustion, or with their connection.
#[derive(Debug, Default)]
pub struct PendingAcks {
    entries: HashMap<u32, Entry>,
}

impl PendingAcks {
    pub fn track(&mut self, sequence: u32, client: i32, frame: Bytes, now: Instant) {
        self.entries.insert(
            sequence,
            Entry {
                client,
                frame,
                sent_at: now,
                retries: 0,
            },
        );
    }

    /// ack received: the entry is done
    pub fn settle(&mut self, sequence: u32) -> bool {
        self.entries.remove(&sequence).is_some()
    }

    /// the recipient is gone; its outstanding acks go with it
    pub fn drop_client(&mut self, client: i32) {
        self.entries.retain(|_, e| e.client != client);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Timed-out entries under budget are returned for retransmission
    /// (same bytes, same sequence id); exhausted ones are dropped with
    /// a log line naming recipient and sequence.
    pub fn sweep(&mut self, now: Instant, timeout: Duration, max_retries: u32) -> Vec<(i32, Bytes)> {
        let mut retransmit = Vec::new();
        let mut exhausted = Vec::new();
        for (sequence, entry) in self.entries.iter_mut() {
            if now.duration_since(entry.sent_at) <= timeout {
                continue;
            }
            match entry.retries < max_retries {
                true => {
                    entry.retries += 1;
                    entry.sent_at = now;
                    retransmit.push((entry.client, entry.frame.clone()));
                }
                false => exhausted.push(*sequence),
            }
        }
        for sequence in exhausted {
            let entry = self.entries.remove(&sequence).expect("collected above");
            log::warn!(
                "giving up on seq {} to client {} after {} retries",
                sequence,
                entry.client,
                entry.retries,
            );
        }
        retransmit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_millis(800);

    #[test]
    fn sweeps_only_past_the_timeout() {
        let mut pending = PendingAcks::default();
        let t0 = Instant::now();
        pending.track(1, 10, Bytes::from_static(b"frame"), t0);
        assert!(pending.sweep(t0 + Duration::from_millis(100), TIMEOUT, 3).is_empty());
        let late = pending.sweep(t0 + Duration::from_millis(900), TIMEOUT, 3);
        assert!(late.len() == 1);
        assert!(late[0] == (10, Bytes::from_static(b"frame")));
    }

    #[test]
    fn ack_before_retry_stops_the_resend() {
        let mut pending = PendingAcks::default();
        let t0 = Instant::now();
        pending.track(1, 10, Bytes::from_static(b"frame"), t0);
        let first = pending.sweep(t0 + TIMEOUT + Duration::from_millis(1), TIMEOUT, 3);
        assert!(first.len() == 1);
        assert!(pending.settle(1));
        let after = pending.sweep(t0 + Duration::from_secs(60), TIMEOUT, 3);
        assert!(after.is_empty());
        assert!(!pending.settle(1));
    }

    #[test]
    fn retry_budget_exhausts_and_drops() {
        let mut pending = PendingAcks::default();
        let mut now = Instant::now();
        pending.track(1, 10, Bytes::from_static(b"frame"), now);
        for _ in 0..3 {
            now += TIMEOUT + Duration::from_millis(1);
            assert!(pending.sweep(now, TIMEOUT, 3).len() == 1);
        }
        now += TIMEOUT + Duration::from_millis(1);
        assert!(pending.sweep(now, TIMEOUT, 3).is_empty());
        assert!(pending.is_empty());
    }

    #[test]
    fn disconnect_discards_outstanding_acks() {
        let mut pending = PendingAcks::default();
        let t0 = Instant::now();
        pending.track(1, 10, Bytes::from_static(b"a"), t0);
        pending.track(2, 11, Bytes::from_static(b"b"), t0);
        pending.drop_client(10);
        assert!(pending.len() == 1);
        let survivors = pending.sweep(t0 + Duration::from_secs(60), TIMEOUT, 3);
        assert!(survivors.len() == 1);
        assert!(survivors[0].0 == 11);
    }
}

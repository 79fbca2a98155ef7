//! In-process loopback transport.
//!
//! Queues every send in order instead of touching a socket, so tests can
//! drive a whole server/client exchange deterministically and inspect exactly
//! what went over each channel. This is the reference implementation of the
//! ordering contract on [`Transport`](crate::transport::Transport).

use std::collections::VecDeque;

use crate::error::Result;
use crate::transport::{PeerId, Transport};

/// One queued send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub channel: String,
    /// `None` for a broadcast.
    pub dest: Option<PeerId>,
    pub frame: Vec<u8>,
}

/// A recorded disconnect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disconnect {
    pub peer: PeerId,
    pub reason: String,
}

/// Transport that records traffic in memory, preserving send order.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    outbox: VecDeque<Delivery>,
    disconnects: Vec<Disconnect>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return all queued deliveries, oldest first.
    pub fn drain(&mut self) -> Vec<Delivery> {
        self.outbox.drain(..).collect()
    }

    /// Remove and return the oldest queued delivery.
    pub fn pop(&mut self) -> Option<Delivery> {
        self.outbox.pop_front()
    }

    /// Queued deliveries without draining them.
    pub fn pending(&self) -> impl Iterator<Item = &Delivery> {
        self.outbox.iter()
    }

    pub fn pending_count(&self) -> usize {
        self.outbox.len()
    }

    /// Disconnects issued so far, in order.
    pub fn disconnects(&self) -> &[Disconnect] {
        &self.disconnects
    }
}

impl Transport for MemoryTransport {
    fn send(&mut self, channel: &str, dest: PeerId, frame: &[u8]) -> Result<()> {
        self.outbox.push_back(Delivery {
            channel: channel.to_string(),
            dest: Some(dest),
            frame: frame.to_vec(),
        });
        Ok(())
    }

    fn send_to_all(&mut self, channel: &str, frame: &[u8]) -> Result<()> {
        self.outbox.push_back(Delivery {
            channel: channel.to_string(),
            dest: None,
            frame: frame.to_vec(),
        });
        Ok(())
    }

    fn disconnect(&mut self, peer: PeerId, reason: &str) -> Result<()> {
        self.disconnects.push(Disconnect {
            peer,
            reason: reason.to_string(),
        });
        Ok(())
    }
}

//! Broadcast bus: fan-out of server events to connected sessions
//!
//! Rules code never talks to sockets. It returns [`Outbound`] values and
//! the bus serializes each event once, then pushes the text onto the
//! outbound queue of every matching session. Each session's writer task
//! drains its own queue, so a slow client never stalls the simulation.

use log::{debug, error};
use shared::ServerEvent;
use std::collections::HashMap;
use tokio::sync::mpsc;

/// Who should receive an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipient {
    All,
    AllExcept(String),
    Only(String),
}

impl Recipient {
    pub fn includes(&self, session_id: &str) -> bool {
        match self {
            Recipient::All => true,
            Recipient::AllExcept(excluded) => excluded != session_id,
            Recipient::Only(target) => target == session_id,
        }
    }
}

/// An event paired with its audience
#[derive(Debug, Clone, PartialEq)]
pub struct Outbound {
    pub recipient: Recipient,
    pub event: ServerEvent,
}

impl Outbound {
    pub fn all(event: ServerEvent) -> Self {
        Self {
            recipient: Recipient::All,
            event,
        }
    }

    pub fn all_except(session_id: impl Into<String>, event: ServerEvent) -> Self {
        Self {
            recipient: Recipient::AllExcept(session_id.into()),
            event,
        }
    }

    pub fn only(session_id: impl Into<String>, event: ServerEvent) -> Self {
        Self {
            recipient: Recipient::Only(session_id.into()),
            event,
        }
    }
}

pub type SessionSender = mpsc::UnboundedSender<String>;

#[derive(Debug, Default)]
pub struct BroadcastBus {
    sessions: HashMap<String, SessionSender>,
}

impl BroadcastBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, session_id: impl Into<String>, sender: SessionSender) {
        self.sessions.insert(session_id.into(), sender);
    }

    /// Drops the session's queue, which lets its writer task finish
    pub fn unregister(&mut self, session_id: &str) -> bool {
        self.sessions.remove(session_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Delivers every outbound event in order. Returns the number of
    /// individual messages queued.
    pub fn dispatch(&mut self, outbound: Vec<Outbound>) -> usize {
        let mut delivered = 0;
        let mut dead = Vec::new();

        for Outbound { recipient, event } in outbound {
            let text = match serde_json::to_string(&event) {
                Ok(text) => text,
                Err(e) => {
                    error!("Failed to encode {} event: {}", event.kind(), e);
                    continue;
                }
            };

            for (session_id, sender) in &self.sessions {
                if !recipient.includes(session_id) {
                    continue;
                }
                if sender.send(text.clone()).is_ok() {
                    delivered += 1;
                } else if !dead.contains(session_id) {
                    dead.push(session_id.clone());
                }
            }
        }

        for session_id in dead {
            debug!("Pruning closed session {}", session_id);
            self.sessions.remove(&session_id);
        }

        delivered
    }
}

//! Shared-room plumbing for playing the same puzzle as other people.
//!
//! Only the message contract and an in-process loopback exist; nothing here
//! is wired into the engine. A session reads the same `RoundSnapshot` the
//! front-end renders and reports submissions as plain text.

use std::sync::mpsc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::difficulty::Difficulty;
use crate::session::round::{Outcome, RoundSnapshot};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Join { room: String, player: String },
    Progress { level: u32, selected: usize },
    Submit { level: u32, text: String, correct: bool },
    Leave,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Joined { room: String, players: Vec<String> },
    PuzzleStarted { level: u32, difficulty: Difficulty, hint: String },
    PeerSolved { player: String, level: u32 },
    PeerLeft { player: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChannelError {
    #[error("peer disconnected")]
    Disconnected,
    #[error("cannot encode message: {0}")]
    Encode(String),
}

/// Transport for room messages. Implementations must not block on receive.
pub trait MessageChannel {
    fn send(&self, message: ClientMessage) -> Result<(), ChannelError>;
    fn try_recv(&self) -> Result<Option<ServerMessage>, ChannelError>;
}

/// In-process channel pair; the other half plays the server.
pub struct LoopbackChannel {
    outgoing: mpsc::Sender<ClientMessage>,
    incoming: mpsc::Receiver<ServerMessage>,
}

/// Server side of a `LoopbackChannel`.
pub struct LoopbackPeer {
    pub received: mpsc::Receiver<ClientMessage>,
    pub sender: mpsc::Sender<ServerMessage>,
}

impl LoopbackChannel {
    pub fn pair() -> (Self, LoopbackPeer) {
        let (client_tx, client_rx) = mpsc::channel();
        let (server_tx, server_rx) = mpsc::channel();
        (
            Self {
                outgoing: client_tx,
                incoming: server_rx,
            },
            LoopbackPeer {
                received: client_rx,
                sender: server_tx,
            },
        )
    }
}

impl MessageChannel for LoopbackChannel {
    fn send(&self, message: ClientMessage) -> Result<(), ChannelError> {
        self.outgoing
            .send(message)
            .map_err(|_| ChannelError::Disconnected)
    }

    fn try_recv(&self) -> Result<Option<ServerMessage>, ChannelError> {
        match self.incoming.try_recv() {
            Ok(message) => Ok(Some(message)),
            Err(mpsc::TryRecvError::Empty) => Ok(None),
            Err(mpsc::TryRecvError::Disconnected) => Err(ChannelError::Disconnected),
        }
    }
}

/// Encode a message the way a network transport would put it on the wire.
pub fn encode(message: &ClientMessage) -> Result<String, ChannelError> {
    serde_json::to_string(message).map_err(|e| ChannelError::Encode(e.to_string()))
}

/// Tracks one player's view of a room.
pub struct MultiplayerSession<C: MessageChannel> {
    channel: C,
    player: String,
    room: Option<String>,
    peers: Vec<String>,
    solved_by_peers: Vec<(String, u32)>,
    last_selected: Option<(u32, usize)>,
}

impl<C: MessageChannel> MultiplayerSession<C> {
    pub fn new(channel: C, player: &str) -> Self {
        Self {
            channel,
            player: player.to_string(),
            room: None,
            peers: Vec::new(),
            solved_by_peers: Vec::new(),
            last_selected: None,
        }
    }

    pub fn join(&mut self, room: &str) -> Result<(), ChannelError> {
        self.channel.send(ClientMessage::Join {
            room: room.to_string(),
            player: self.player.clone(),
        })
    }

    pub fn leave(&mut self) -> Result<(), ChannelError> {
        self.room = None;
        self.peers.clear();
        self.channel.send(ClientMessage::Leave)
    }

    pub fn room(&self) -> Option<&str> {
        self.room.as_deref()
    }

    pub fn peers(&self) -> &[String] {
        &self.peers
    }

    pub fn solved_by_peers(&self) -> &[(String, u32)] {
        &self.solved_by_peers
    }

    /// Report selection progress; only sends when it changed.
    pub fn publish_progress(&mut self, snapshot: &RoundSnapshot) -> Result<(), ChannelError> {
        if self.room.is_none() {
            return Ok(());
        }
        let current = (snapshot.level, snapshot.selection.len());
        if self.last_selected == Some(current) {
            return Ok(());
        }
        self.last_selected = Some(current);
        self.channel.send(ClientMessage::Progress {
            level: current.0,
            selected: current.1,
        })
    }

    /// Report a submission once the round has an outcome.
    pub fn publish_submission(&mut self, snapshot: &RoundSnapshot) -> Result<(), ChannelError> {
        let (Some(_), Some(outcome)) = (&self.room, snapshot.outcome) else {
            return Ok(());
        };
        self.channel.send(ClientMessage::Submit {
            level: snapshot.level,
            text: snapshot.selection.iter().collect(),
            correct: outcome == Outcome::Correct,
        })
    }

    /// Apply every pending server message. Returns how many were handled.
    pub fn pump(&mut self) -> Result<usize, ChannelError> {
        let mut handled = 0;
        while let Some(message) = self.channel.try_recv()? {
            self.apply(message);
            handled += 1;
        }
        Ok(handled)
    }

    fn apply(&mut self, message: ServerMessage) {
        match message {
            ServerMessage::Joined { room, players } => {
                log::info!("joined room {room} with {} players", players.len());
                self.room = Some(room);
                self.peers = players.into_iter().filter(|p| *p != self.player).collect();
            }
            ServerMessage::PuzzleStarted { level, .. } => {
                log::debug!("room moved to level {level}");
                self.solved_by_peers.retain(|(_, l)| *l >= level);
            }
            ServerMessage::PeerSolved { player, level } => {
                self.solved_by_peers.push((player, level));
            }
            ServerMessage::PeerLeft { player } => {
                self.peers.retain(|p| *p != player);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::round::Phase;

    fn snapshot(level: u32, selection: &str, outcome: Option<Outcome>) -> RoundSnapshot {
        RoundSnapshot {
            phase: Phase::Active,
            difficulty: Difficulty::Easy,
            level,
            hint: String::new(),
            answer_len: 5,
            tiles: Vec::new(),
            selection: selection.chars().collect(),
            seconds_remaining: 100,
            time_limit: 180,
            retries_left: 3,
            locked: outcome.is_some(),
            outcome,
            revealed_answer: None,
        }
    }

    fn joined() -> (MultiplayerSession<LoopbackChannel>, LoopbackPeer) {
        let (channel, peer) = LoopbackChannel::pair();
        let mut session = MultiplayerSession::new(channel, "李白");
        session.join("tang").unwrap();
        peer.sender
            .send(ServerMessage::Joined {
                room: "tang".to_string(),
                players: vec!["李白".to_string(), "杜甫".to_string()],
            })
            .unwrap();
        assert_eq!(session.pump().unwrap(), 1);
        let _join = peer.received.try_recv().unwrap();
        (session, peer)
    }

    #[test]
    fn test_join_lists_other_players() {
        let (session, _peer) = joined();
        assert_eq!(session.room(), Some("tang"));
        assert_eq!(session.peers(), ["杜甫"]);
    }

    #[test]
    fn test_progress_only_sent_on_change() {
        let (mut session, peer) = joined();
        session.publish_progress(&snapshot(1, "床", None)).unwrap();
        session.publish_progress(&snapshot(1, "床", None)).unwrap();
        session.publish_progress(&snapshot(1, "床前", None)).unwrap();
        let sent: Vec<_> = peer.received.try_iter().collect();
        assert_eq!(
            sent,
            vec![
                ClientMessage::Progress { level: 1, selected: 1 },
                ClientMessage::Progress { level: 1, selected: 2 },
            ]
        );
    }

    #[test]
    fn test_submission_carries_text_and_outcome() {
        let (mut session, peer) = joined();
        session
            .publish_submission(&snapshot(2, "床前明月光", Some(Outcome::Correct)))
            .unwrap();
        assert_eq!(
            peer.received.try_recv().unwrap(),
            ClientMessage::Submit {
                level: 2,
                text: "床前明月光".to_string(),
                correct: true,
            }
        );
    }

    #[test]
    fn test_nothing_sent_outside_a_room() {
        let (channel, peer) = LoopbackChannel::pair();
        let mut session = MultiplayerSession::new(channel, "李白");
        session.publish_progress(&snapshot(1, "床", None)).unwrap();
        assert!(peer.received.try_recv().is_err());
    }

    #[test]
    fn test_peer_events_update_room() {
        let (mut session, peer) = joined();
        peer.sender
            .send(ServerMessage::PeerSolved {
                player: "杜甫".to_string(),
                level: 1,
            })
            .unwrap();
        peer.sender
            .send(ServerMessage::PeerLeft {
                player: "杜甫".to_string(),
            })
            .unwrap();
        session.pump().unwrap();
        assert_eq!(session.solved_by_peers(), [("杜甫".to_string(), 1)]);
        assert!(session.peers().is_empty());
    }

    #[test]
    fn test_dropped_server_reports_disconnect() {
        let (channel, peer) = LoopbackChannel::pair();
        let mut session = MultiplayerSession::new(channel, "李白");
        drop(peer);
        assert_eq!(session.pump(), Err(ChannelError::Disconnected));
    }

    #[test]
    fn test_wire_format_is_tagged() {
        let json = encode(&ClientMessage::Leave).unwrap();
        assert_eq!(json, r#"{"type":"leave"}"#);
    }
}

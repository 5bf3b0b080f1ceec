//! Wire protocol envelopes.
//!
//! Every message on the socket is a JSON `{type, data}` envelope. Inbound
//! messages are either a join request or a command; outbound messages are
//! the per-tick broadcast, join-time state, connection bookkeeping, and
//! targeted notices (whose envelopes come straight from
//! [`kingdoms_core::game::Notice`]).

use serde::{Deserialize, Serialize};

use kingdoms_core::game::{Command, GameState, PlayerView};
use kingdoms_core::player::PlayerId;

/// A message from a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Join the game as a named player, optionally in a kingdom.
    #[serde(rename_all = "camelCase")]
    JoinGame {
        /// Display name.
        player_name: String,
        /// Kingdom to join or found.
        #[serde(default)]
        kingdom_name: Option<String>,
    },
    /// A gameplay command.
    Command(Command),
}

/// Online counters shown to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerStats {
    /// Connected players.
    pub online_players: usize,
    /// Existing kingdoms.
    pub kingdoms: usize,
}

/// A message to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Sent once on connect, before the client joins.
    #[serde(rename_all = "camelCase")]
    Connection {
        /// The session id; doubles as the player id after joining.
        client_id: PlayerId,
        /// Online counters.
        stats: ServerStats,
    },
    /// Full state, sent once to a freshly joined client.
    GameState(GameState),
    /// Full state, broadcast to every client each tick.
    GameUpdate(GameState),
    /// Broadcast when a player joins.
    #[serde(rename_all = "camelCase")]
    PlayerJoined {
        /// The new player.
        player: PlayerView,
        /// Online counters after the join.
        online_players: usize,
        /// Kingdom count after the join.
        kingdoms: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_game_wire_shape() {
        let json = r#"{
            "type": "join_game",
            "data": { "playerName": "alice", "kingdomName": "Wessex" }
        }"#;
        let message: ClientMessage = serde_json::from_str(json).unwrap();
        assert_eq!(
            message,
            ClientMessage::JoinGame {
                player_name: "alice".into(),
                kingdom_name: Some("Wessex".into()),
            }
        );
    }

    #[test]
    fn test_join_game_without_kingdom() {
        let json = r#"{"type": "join_game", "data": {"playerName": "bob"}}"#;
        let message: ClientMessage = serde_json::from_str(json).unwrap();
        assert_eq!(
            message,
            ClientMessage::JoinGame {
                player_name: "bob".into(),
                kingdom_name: None,
            }
        );
    }

    #[test]
    fn test_command_envelope() {
        let json = r#"{
            "type": "command",
            "data": { "type": "advance_age" }
        }"#;
        let message: ClientMessage = serde_json::from_str(json).unwrap();
        assert_eq!(message, ClientMessage::Command(Command::AdvanceAge));
    }

    #[test]
    fn test_gather_command_payload() {
        let json = r#"{
            "type": "command",
            "data": { "type": "gather_resource", "unitIds": [7], "resourceId": 42 }
        }"#;
        let message: ClientMessage = serde_json::from_str(json).unwrap();
        assert_eq!(
            message,
            ClientMessage::Command(Command::GatherResource {
                unit_ids: vec![7],
                resource_id: 42,
            })
        );
    }

    #[test]
    fn test_connection_message_shape() {
        let message = ServerMessage::Connection {
            client_id: uuid::Uuid::nil(),
            stats: ServerStats {
                online_players: 3,
                kingdoms: 1,
            },
        };
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["type"], "connection");
        assert_eq!(json["data"]["stats"]["onlinePlayers"], 3);
    }

    #[test]
    fn test_server_messages_roundtrip() {
        let message = ServerMessage::Connection {
            client_id: uuid::Uuid::new_v4(),
            stats: ServerStats {
                online_players: 0,
                kingdoms: 0,
            },
        };
        let json = serde_json::to_string(&message).unwrap();
        let back: ServerMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(message, back);
    }
}

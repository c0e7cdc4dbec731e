//! Wire protocol: JSON objects tagged by a `type` field, one closed enum
//! per direction.

use serde::{Deserialize, Serialize};

use crate::game::state::Worm;
use crate::util::vec2::Vec2;

/// Messages from client to server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    /// Announce the local worm once after `welcome`
    Join {
        name: String,
        x: f32,
        y: f32,
        angle: f32,
        segments: Vec<Vec2>,
        color: String,
        glow_color: String,
    },
    /// Periodic local state; `segments` holds every other segment
    Update {
        x: f32,
        y: f32,
        angle: f32,
        segments: Vec<Vec2>,
        is_boosting: bool,
        score: u32,
    },
    Died,
    Respawn {
        x: f32,
        y: f32,
        segments: Vec<Vec2>,
    },
}

/// Messages from server to client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    /// Assigned identity plus everyone already in the room
    Welcome {
        player_id: String,
        #[serde(default)]
        players: Vec<RemotePlayerState>,
    },
    PlayerJoined {
        player_id: String,
    },
    PlayerLeft {
        player_id: String,
    },
    /// Full roster snapshot
    GameState {
        #[serde(default)]
        players: Vec<RemotePlayerState>,
    },
    PlayerDied {
        player_id: String,
        #[serde(default)]
        segments: Vec<Vec2>,
        #[serde(default)]
        color: String,
    },
    /// Any `type` this client does not know
    #[serde(other)]
    Unknown,
}

/// One peer as reported by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemotePlayerState {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub angle: f32,
    #[serde(default)]
    pub segments: Vec<Vec2>,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub glow_color: String,
    #[serde(default)]
    pub score: u32,
    #[serde(default)]
    pub is_boosting: bool,
    #[serde(default = "default_alive")]
    pub alive: bool,
}

fn default_alive() -> bool {
    true
}

impl RemotePlayerState {
    /// Reported body, or just the head position when no segments came along
    pub fn target_segments(&self) -> Vec<Vec2> {
        if self.segments.is_empty() {
            vec![Vec2::new(self.x, self.y)]
        } else {
            self.segments.clone()
        }
    }
}

fn head_of(worm: &Worm) -> Vec2 {
    worm.head().unwrap_or(Vec2::ZERO)
}

impl ClientMessage {
    pub fn join(worm: &Worm) -> Self {
        let head = head_of(worm);
        ClientMessage::Join {
            name: worm.name.clone(),
            x: head.x,
            y: head.y,
            angle: worm.angle,
            segments: worm.segments.clone(),
            color: worm.color.clone(),
            glow_color: worm.glow_color.clone(),
        }
    }

    /// Update carrying only the even-indexed segments
    pub fn update(worm: &Worm) -> Self {
        let head = head_of(worm);
        ClientMessage::Update {
            x: head.x,
            y: head.y,
            angle: worm.angle,
            segments: worm.segments.iter().step_by(2).copied().collect(),
            is_boosting: worm.is_boosting,
            score: worm.score,
        }
    }

    pub fn respawn(worm: &Worm) -> Self {
        let head = head_of(worm);
        ClientMessage::Respawn {
            x: head.x,
            y: head.y,
            segments: worm.segments.clone(),
        }
    }
}

/// Serialize a message to its JSON text frame
pub fn encode<T: Serialize>(message: &T) -> Result<String, EncodeError> {
    serde_json::to_string(message).map_err(|e| EncodeError(e.to_string()))
}

/// Parse a JSON text frame
pub fn decode<T: for<'de> Deserialize<'de>>(data: &str) -> Result<T, DecodeError> {
    serde_json::from_str(data).map_err(|e| DecodeError(e.to_string()))
}

#[derive(Debug, thiserror::Error)]
#[error("Encode error: {0}")]
pub struct EncodeError(String);

#[derive(Debug, thiserror::Error)]
#[error("Decode error: {0}")]
pub struct DecodeError(String);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::constants::world;
    use crate::game::factory::create_worm;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::Value;

    fn player() -> Worm {
        let mut rng = StdRng::seed_from_u64(8);
        create_worm(true, 0, Some("Ana"), world::MAP_SIZE, &mut rng)
    }

    #[test]
    fn test_join_wire_shape() {
        let worm = player();
        let json: Value = serde_json::from_str(&encode(&ClientMessage::join(&worm)).unwrap()).unwrap();
        assert_eq!(json["type"], "join");
        assert_eq!(json["name"], "Ana");
        assert_eq!(json["glowColor"], worm.glow_color.as_str());
        assert_eq!(json["segments"].as_array().unwrap().len(), world::INITIAL_SEGMENTS);
        assert!(json["segments"][0]["x"].is_number());
    }

    #[test]
    fn test_update_sends_even_segments() {
        let mut worm = player();
        worm.grow(1); // 11 segments -> indices 0,2,4,6,8,10
        worm.score = 42;
        let json: Value = serde_json::from_str(&encode(&ClientMessage::update(&worm)).unwrap()).unwrap();
        assert_eq!(json["type"], "update");
        assert_eq!(json["isBoosting"], false);
        assert_eq!(json["score"], 42);
        let segments = json["segments"].as_array().unwrap();
        assert_eq!(segments.len(), 6);
        assert_eq!(segments[1]["x"].as_f64().unwrap() as f32, worm.segments[2].x);
    }

    #[test]
    fn test_died_is_bare_tag() {
        assert_eq!(encode(&ClientMessage::Died).unwrap(), r#"{"type":"died"}"#);
    }

    #[test]
    fn test_respawn_carries_full_body() {
        let worm = player();
        match ClientMessage::respawn(&worm) {
            ClientMessage::Respawn { x, y, segments } => {
                assert_eq!(Vec2::new(x, y), worm.segments[0]);
                assert_eq!(segments.len(), worm.len());
            }
            other => panic!("Wrong message type: {:?}", other),
        }
    }

    #[test]
    fn test_decode_welcome() {
        let raw = r##"{"type":"welcome","playerId":"p1","players":[
            {"id":"p7","name":"Zed","x":10,"y":20,"angle":0.5,
             "segments":[{"x":10,"y":20},{"x":2,"y":20}],
             "color":"#fff","glowColor":"#fff8","score":3,"isBoosting":true,"alive":true}]}"##;
        match decode::<ServerMessage>(raw).unwrap() {
            ServerMessage::Welcome { player_id, players } => {
                assert_eq!(player_id, "p1");
                assert_eq!(players.len(), 1);
                assert_eq!(players[0].name, "Zed");
                assert!(players[0].is_boosting);
                assert_eq!(players[0].glow_color, "#fff8");
                assert_eq!(players[0].segments[1], Vec2::new(2.0, 20.0));
            }
            other => panic!("Wrong message type: {:?}", other),
        }
    }

    #[test]
    fn test_decode_missing_players_defaults_empty() {
        let msg: ServerMessage = decode(r#"{"type":"game_state"}"#).unwrap();
        assert_eq!(msg, ServerMessage::GameState { players: vec![] });
    }

    #[test]
    fn test_decode_player_events() {
        let left: ServerMessage = decode(r#"{"type":"player_left","playerId":"p3"}"#).unwrap();
        assert_eq!(left, ServerMessage::PlayerLeft { player_id: "p3".into() });

        let died: ServerMessage = decode(
            r##"{"type":"player_died","playerId":"p3","segments":[{"x":1,"y":2}],"color":"#abc"}"##,
        )
        .unwrap();
        match died {
            ServerMessage::PlayerDied { player_id, segments, color } => {
                assert_eq!(player_id, "p3");
                assert_eq!(segments, vec![Vec2::new(1.0, 2.0)]);
                assert_eq!(color, "#abc");
            }
            other => panic!("Wrong message type: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_type_decodes_to_unknown() {
        let msg: ServerMessage = decode(r#"{"type":"leaderboard","top":[]}"#).unwrap();
        assert_eq!(msg, ServerMessage::Unknown);
    }

    #[test]
    fn test_malformed_payload_is_error() {
        assert!(decode::<ServerMessage>("not json").is_err());
        assert!(decode::<ServerMessage>(r#"{"type":"player_left"}"#).is_err());
        assert!(decode::<ServerMessage>(r#"{"playerId":"p1"}"#).is_err());
    }

    #[test]
    fn test_remote_state_defaults() {
        let p: RemotePlayerState = decode(r#"{"id":"p9","x":5,"y":6}"#).unwrap();
        assert!(p.alive);
        assert_eq!(p.target_segments(), vec![Vec2::new(5.0, 6.0)]);
    }
}

//! Save document sections for each stateful entity
//!
//! Document layout:
//!
//! ```json
//! {
//!   "Version": 1,
//!   "Seed": 42,
//!   "PlayerData": { "Lives": 3, "Score": 120, ... },
//!   "LevelData": {
//!     "Ball":   { "Speed": 100.0, "Direction": { "X": 0.7, "Y": -0.7 }, "Position": { ... } },
//!     "Paddle": { "Speed": 320.0, "Position": { "X": 320.0, "Y": 330.0 } },
//!     "Blocks": { "<guid>": true, ... }
//!   }
//! }
//! ```

use std::collections::HashMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::{Document, Persist, PersistError, field};
use crate::consts::{FIRST_LEVEL, MAX_LEVEL, SAVE_VERSION};
use crate::sim::{Ball, GameEvent, GameState, Level, Paddle, PlayerData, PowerUpRegistry};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Point {
    x: f32,
    y: f32,
}

impl From<Vec2> for Point {
    fn from(v: Vec2) -> Self {
        Self { x: v.x, y: v.y }
    }
}

impl From<Point> for Vec2 {
    fn from(p: Point) -> Self {
        Vec2::new(p.x, p.y)
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct BallRecord {
    speed: f32,
    direction: Point,
    position: Point,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PaddleRecord {
    speed: f32,
    position: Point,
}

fn check_finite(point: Point, key: &'static str) -> Result<(), PersistError> {
    if Vec2::from(point).is_finite() {
        Ok(())
    } else {
        Err(PersistError::InvalidValue(key))
    }
}

/// Speeds may be zero but not negative
fn check_speed(value: f32, key: &'static str) -> Result<(), PersistError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(PersistError::InvalidValue(key))
    }
}

fn check_positive(value: f32, key: &'static str) -> Result<(), PersistError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(PersistError::InvalidValue(key))
    }
}

impl Persist for PlayerData {
    fn save(&self) -> Document {
        json!(self)
    }

    fn load(&mut self, doc: &Document) -> Result<(), PersistError> {
        let loaded = PlayerData::deserialize(doc)?;
        if !(FIRST_LEVEL..=MAX_LEVEL).contains(&loaded.level_index) {
            return Err(PersistError::InvalidValue("LevelIndex"));
        }
        check_positive(loaded.paddle_width, "PaddleWidth")?;
        check_speed(loaded.ball_speed, "BallSpeed")?;
        check_speed(loaded.paddle_speed, "PaddleSpeed")?;
        if !loaded.launch_direction.is_finite() || loaded.launch_direction == Vec2::ZERO {
            return Err(PersistError::InvalidValue("LaunchDirection"));
        }

        self.restore_from(loaded);
        Ok(())
    }
}

impl Persist for Ball {
    fn save(&self) -> Document {
        json!(BallRecord {
            speed: self.body.speed(),
            direction: self.body.direction().into(),
            position: self.body.position.into(),
        })
    }

    fn load(&mut self, doc: &Document) -> Result<(), PersistError> {
        let record = BallRecord::deserialize(doc)?;
        check_speed(record.speed, "Speed")?;
        check_finite(record.direction, "Direction")?;
        check_finite(record.position, "Position")?;
        self.body.position = record.position.into();
        self.body.restore(record.speed, record.direction.into());
        Ok(())
    }
}

impl Persist for Paddle {
    fn save(&self) -> Document {
        json!(PaddleRecord {
            speed: self.speed,
            position: self.position().into(),
        })
    }

    fn load(&mut self, doc: &Document) -> Result<(), PersistError> {
        let record = PaddleRecord::deserialize(doc)?;
        check_speed(record.speed, "Speed")?;
        check_finite(record.position, "Position")?;
        self.restore(record.speed, record.position.into());
        Ok(())
    }
}

/// Block enabled flags keyed by GUID
impl Persist for Level {
    fn save(&self) -> Document {
        let blocks: serde_json::Map<String, Document> = self
            .blocks
            .iter()
            .map(|b| (b.guid.to_string(), Document::Bool(b.is_enabled())))
            .collect();
        Document::Object(blocks)
    }

    fn load(&mut self, doc: &Document) -> Result<(), PersistError> {
        let entries = HashMap::<String, bool>::deserialize(doc)?;

        let mut updates = Vec::with_capacity(entries.len());
        for (key, enabled) in entries {
            let guid = Uuid::parse_str(&key).map_err(|_| PersistError::InvalidGuid(key.clone()))?;
            if self.block(guid).is_none() {
                return Err(PersistError::UnknownBlock(guid, self.index));
            }
            updates.push((guid, enabled));
        }

        for (guid, enabled) in updates {
            if let Some(block) = self.block_mut(guid) {
                block.set_enabled(enabled);
            }
        }
        Ok(())
    }
}

impl Persist for GameState {
    fn save(&self) -> Document {
        json!({
            "Version": SAVE_VERSION,
            "Seed": self.seed,
            "PlayerData": self.player.save(),
            "LevelData": {
                "Ball": self.ball.save(),
                "Paddle": self.paddle.save(),
                "Blocks": self.level.save(),
            },
        })
    }

    /// Every section is parsed into fresh values first; live state is only
    /// replaced once the whole document is valid.
    fn load(&mut self, doc: &Document) -> Result<(), PersistError> {
        let version = field(doc, "Version")?
            .as_u64()
            .ok_or(PersistError::MissingKey("Version"))?;
        if version != SAVE_VERSION {
            return Err(PersistError::UnsupportedVersion(version));
        }

        let mut player = self.player.clone();
        player.load(field(doc, "PlayerData")?)?;

        let level_data = field(doc, "LevelData")?;

        let mut level = Level::build(player.level_index);
        level.load(field(level_data, "Blocks")?)?;

        let mut paddle = Paddle::new();
        paddle.set_width(player.paddle_width);
        paddle.load(field(level_data, "Paddle")?)?;

        let mut ball = Ball::new();
        ball.load(field(level_data, "Ball")?)?;
        ball.attach_to(&paddle);

        let seed = doc.get("Seed").and_then(Document::as_u64).unwrap_or(self.seed);

        // Commit
        self.seed = seed;
        self.player = player;
        self.level = level;
        self.paddle = paddle;
        self.ball = ball;
        self.powerups = PowerUpRegistry::new();
        self.pickups.clear();

        self.push_event(GameEvent::LivesChanged(self.player.lives()));
        self.push_event(GameEvent::ScoreChanged(self.player.score()));
        log::info!(
            "Loaded level {} (lives {}, score {})",
            self.level.index,
            self.player.lives(),
            self.player.score()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;

    #[test]
    fn test_player_data_round_trip() {
        let mut player = PlayerData::default();
        player.set_lives(7);
        player.add_score(1234);
        player.ball_speed = 150.0;
        player.level_index = 4;

        let mut loaded = PlayerData::default();
        loaded.load(&player.save()).unwrap();
        assert_eq!(loaded, player);
    }

    #[test]
    fn test_player_data_keys() {
        let doc = PlayerData::default().save();
        for key in ["Lives", "Score", "BallSpeed", "LaunchDirection", "LevelIndex"] {
            assert!(doc.get(key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn test_player_lives_clamped_on_load() {
        let mut doc = PlayerData::default().save();
        doc["Lives"] = json!(500);
        let mut player = PlayerData::default();
        player.load(&doc).unwrap();
        assert_eq!(player.lives(), MAX_LIVES);
    }

    #[test]
    fn test_ball_direction_normalized_on_load() {
        let doc = json!({
            "Speed": 90.0,
            "Direction": {"X": 3.0, "Y": -4.0},
            "Position": {"X": 100.0, "Y": 200.0},
        });
        let mut ball = Ball::new();
        ball.load(&doc).unwrap();

        assert!(ball.is_launched());
        assert!((ball.body.direction() - Vec2::new(0.6, -0.8)).length() < 1e-6);
        assert_eq!(ball.position(), Vec2::new(100.0, 200.0));
        assert_eq!(ball.body.speed(), 90.0);
    }

    #[test]
    fn test_paddle_round_trip() {
        let mut paddle = Paddle::new();
        paddle.move_by_axis(-1.0, 0.25);
        paddle.speed = 250.0;

        let mut loaded = Paddle::new();
        loaded.load(&paddle.save()).unwrap();
        assert_eq!(loaded.position(), paddle.position());
        assert_eq!(loaded.speed, 250.0);
    }

    #[test]
    fn test_level_blocks_restore_enabled_flags() {
        let mut level = Level::build(1);
        let guid = level.blocks[3].guid;
        level.block_mut(guid).unwrap().set_enabled(false);

        let mut loaded = Level::build(1);
        loaded.load(&level.save()).unwrap();
        assert!(!loaded.block(guid).unwrap().is_enabled());
        assert_eq!(loaded.remaining_blocks(), level.remaining_blocks());
    }

    #[test]
    fn test_level_rejects_bad_guids() {
        let mut level = Level::build(1);

        let bad = json!({"not-a-guid": false});
        assert!(matches!(level.load(&bad), Err(PersistError::InvalidGuid(_))));

        let stranger = Uuid::from_u128(42);
        let mut unknown = serde_json::Map::new();
        unknown.insert(level.blocks[0].guid.to_string(), json!(false));
        unknown.insert(stranger.to_string(), json!(false));
        assert!(matches!(
            level.load(&Document::Object(unknown)),
            Err(PersistError::UnknownBlock(g, 1)) if g == stranger
        ));
        // Nothing applied
        assert!(level.blocks[0].is_enabled());
    }

    #[test]
    fn test_game_state_round_trip() {
        let mut state = GameState::new(5);
        state.advance_level();
        let guid = state.level.blocks[0].guid;
        state.destroy_block(guid);
        state.ball.launch(BALL_SPEED, Vec2::new(0.6, -0.8));

        let doc = state.save();

        let mut restored = GameState::new(77);
        restored.load(&doc).unwrap();

        assert_eq!(restored.seed, 5);
        assert_eq!(restored.player, state.player);
        assert_eq!(restored.level.index, 2);
        assert!(!restored.level.block(guid).unwrap().is_enabled());
        assert_eq!(restored.ball.position(), state.ball.position());
        assert!((restored.ball.velocity() - state.ball.velocity()).length() < 1e-4);
        assert_eq!(restored.paddle.position(), state.paddle.position());
    }

    #[test]
    fn test_failed_load_leaves_state_untouched() {
        let mut source = GameState::new(5);
        source.add_score(999);
        let mut doc = source.save();
        doc["LevelData"]["Blocks"] = json!({"garbage": true});

        let mut state = GameState::new(1);
        let before = state.player.clone();
        assert!(matches!(state.load(&doc), Err(PersistError::InvalidGuid(_))));
        assert_eq!(state.player, before);
    }

    #[test]
    fn test_version_and_missing_sections() {
        let mut state = GameState::new(1);

        let mut doc = state.save();
        doc["Version"] = json!(99);
        assert!(matches!(state.load(&doc), Err(PersistError::UnsupportedVersion(99))));

        let mut doc = state.save();
        doc["LevelData"].as_object_mut().unwrap().remove("Paddle");
        assert!(matches!(state.load(&doc), Err(PersistError::MissingKey("Paddle"))));
    }

    #[test]
    fn test_out_of_range_level_index_is_rejected() {
        let mut doc = GameState::new(5).save();
        doc["PlayerData"]["LevelIndex"] = json!(u32::MAX);

        let mut state = GameState::new(1);
        let before = state.player.clone();
        assert!(matches!(
            state.load(&doc),
            Err(PersistError::InvalidValue("LevelIndex"))
        ));
        assert_eq!(state.player, before);
        assert_eq!(state.level.index, FIRST_LEVEL);

        let mut last = GameState::new(5);
        last.player.level_index = MAX_LEVEL;
        last.start_level();
        state.load(&last.save()).unwrap();
        assert_eq!(state.level.index, MAX_LEVEL);
    }

    #[test]
    fn test_player_tuning_is_validated() {
        let cases = [
            ("PaddleWidth", json!(0.0)),
            ("PaddleWidth", json!(-1.5)),
            ("BallSpeed", json!(-10.0)),
            ("PaddleSpeed", json!(-320.0)),
            ("LaunchDirection", json!([0.0, 0.0])),
        ];
        for (key, value) in cases {
            let mut doc = PlayerData::default().save();
            doc[key] = value;
            let mut player = PlayerData::default();
            assert!(
                matches!(player.load(&doc), Err(PersistError::InvalidValue(k)) if k == key),
                "{key} accepted"
            );
            assert_eq!(player, PlayerData::default());
        }
    }

    #[test]
    fn test_negative_body_speeds_are_rejected() {
        let mut ball = Ball::new();
        let doc = json!({
            "Speed": -90.0,
            "Direction": {"X": 0.0, "Y": -1.0},
            "Position": {"X": 100.0, "Y": 200.0},
        });
        assert!(matches!(ball.load(&doc), Err(PersistError::InvalidValue("Speed"))));
        assert!(!ball.is_launched());

        let mut paddle = Paddle::new();
        let doc = json!({"Speed": -1.0, "Position": {"X": 320.0, "Y": 330.0}});
        assert!(matches!(paddle.load(&doc), Err(PersistError::InvalidValue("Speed"))));
        assert_eq!(paddle.speed, PADDLE_SPEED);
    }
}

//! Games, their specs and their status

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::error::{AntroidError, Result};

/// Server-side identifier of a game
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(pub String);

impl GameId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for GameId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A game as listed by the server
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub identifier: GameId,
    #[serde(default)]
    pub creation_date: String,
    #[serde(default)]
    pub creator: String,
    #[serde(default)]
    pub teaser: String,
    #[serde(skip)]
    pub spec: Option<GameSpec>,
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} by {} ({})", self.identifier, self.creator, self.teaser)
    }
}

/// Bounds enforced by the v0 API
pub mod limits {
    use std::ops::RangeInclusive;

    pub const PACE: RangeInclusive<u32> = 1..=100;
    pub const TURNS: RangeInclusive<u32> = 1..=100_000;
    pub const ANTS_PER_PLAYER: RangeInclusive<u32> = 1..=42;
    pub const PLAYERS: RangeInclusive<u32> = 1..=42;
    pub const INITIAL_ENERGY: RangeInclusive<u32> = 1..=1000;
    pub const INITIAL_ACID: RangeInclusive<u32> = 1..=1000;
}

/// Parameters of a game to create
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSpec {
    pub public: bool,
    /// Invited players, only for private games
    pub players: Vec<String>,
    pub description: String,
    pub pace: u32,
    pub turns: u32,
    pub ants_per_player: u32,
    pub max_players: u32,
    pub min_players: u32,
    pub initial_energy: u32,
    pub initial_acid: u32,
}

impl Default for GameSpec {
    fn default() -> Self {
        Self {
            public: true,
            players: Vec::new(),
            description: String::new(),
            pace: 1,
            turns: 10,
            ants_per_player: 1,
            max_players: 1,
            min_players: 1,
            initial_energy: 100,
            initial_acid: 100,
        }
    }
}

impl GameSpec {
    /// Check the spec against the API bounds
    pub fn validate(&self) -> Result<()> {
        if self.public && !self.players.is_empty() {
            return Err(AntroidError::InvalidSpec(
                "public games cannot list players".into(),
            ));
        }
        if !self.public && self.players.is_empty() {
            return Err(AntroidError::InvalidSpec(
                "private games need at least one player".into(),
            ));
        }

        let checks = [
            ("pace", self.pace, limits::PACE),
            ("turns", self.turns, limits::TURNS),
            ("ants_per_player", self.ants_per_player, limits::ANTS_PER_PLAYER),
            ("max_players", self.max_players, limits::PLAYERS),
            ("min_players", self.min_players, limits::PLAYERS),
            ("initial_energy", self.initial_energy, limits::INITIAL_ENERGY),
            ("initial_acid", self.initial_acid, limits::INITIAL_ACID),
        ];
        for (name, value, range) in checks {
            if !range.contains(&value) {
                return Err(AntroidError::InvalidSpec(format!(
                    "{} = {} is outside {:?}",
                    name, value, range
                )));
            }
        }

        if self.min_players > self.max_players {
            return Err(AntroidError::InvalidSpec(format!(
                "min_players ({}) exceeds max_players ({})",
                self.min_players, self.max_players
            )));
        }

        Ok(())
    }

    /// Value of the `users` parameter: `+` for public games
    pub fn users_param(&self) -> String {
        if self.public {
            "+".to_string()
        } else {
            self.players.join(",")
        }
    }
}

/// Status value the server uses for finished games
pub const STATUS_OVER: &str = "over";

/// Current state of a game
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameStatus {
    pub game: Game,
    pub score: HashMap<String, i64>,
    pub status: String,
    pub turn: u64,
    /// Players actually in the game
    pub players: Vec<String>,
}

impl GameStatus {
    pub fn is_over(&self) -> bool {
        self.status == STATUS_OVER
    }

    pub fn ants_per_player(&self) -> u32 {
        self.game.spec.as_ref().map_or(0, |spec| spec.ants_per_player)
    }

    /// Scores sorted by player name
    pub fn sorted_scores(&self) -> Vec<(String, i64)> {
        let sorted: BTreeMap<&String, &i64> = self.score.iter().collect();
        sorted.into_iter().map(|(p, s)| (p.clone(), *s)).collect()
    }
}

/// One documented API method
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiMethod {
    #[serde(default, rename = "method")]
    pub verb: String,
    #[serde(default)]
    pub input: Vec<String>,
    #[serde(default)]
    pub description: String,
}

/// What `/api` tells about the server
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiInfo {
    #[serde(default)]
    pub doc: BTreeMap<String, ApiMethod>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_spec_is_valid() {
        assert!(GameSpec::default().validate().is_ok());
    }

    #[test]
    fn test_public_private_players() {
        let spec = GameSpec {
            players: vec!["bob".into()],
            ..Default::default()
        };
        assert!(spec.validate().is_err());

        let spec = GameSpec {
            public: false,
            ..Default::default()
        };
        assert!(spec.validate().is_err());

        let spec = GameSpec {
            public: false,
            players: vec!["alice".into(), "bob".into()],
            ..Default::default()
        };
        assert!(spec.validate().is_ok());
        assert_eq!(spec.users_param(), "alice,bob");
        assert_eq!(GameSpec::default().users_param(), "+");
    }

    #[test]
    fn test_bounds() {
        let spec = GameSpec {
            ants_per_player: 43,
            ..Default::default()
        };
        assert!(spec.validate().is_err());

        let spec = GameSpec {
            min_players: 3,
            max_players: 2,
            ..Default::default()
        };
        assert!(spec.validate().is_err());

        let spec = GameSpec {
            pace: 0,
            ..Default::default()
        };
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_status_helpers() {
        let status = GameStatus {
            status: "over".into(),
            score: HashMap::from([("zoe".into(), 3), ("adam".into(), 7)]),
            ..Default::default()
        };
        assert!(status.is_over());
        assert_eq!(status.ants_per_player(), 0);
        assert_eq!(
            status.sorted_scores(),
            vec![("adam".to_string(), 7), ("zoe".to_string(), 3)]
        );
    }
}

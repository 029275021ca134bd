//! Turn observations

use serde::{Deserialize, Serialize};

use crate::map::{Direction, PartialMap, Position};

/// Brain-tag of ants driven by a player
pub const CONTROLLED_BRAIN: &str = "controlled";

/// What can be known about any ant, ours or not
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BasicAntStatus {
    pub pos: Position,
    pub dir: Direction,
    pub brain: String,
}

impl BasicAntStatus {
    /// 1 for player-controlled ants, 0 for anything else
    pub fn brain_code(&self) -> u8 {
        if self.brain == CONTROLLED_BRAIN { 1 } else { 0 }
    }
}

/// Full status of one of our ants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AntStatus {
    #[serde(flatten)]
    pub basic: BasicAntStatus,
    pub id: u32,
    pub energy: i64,
    pub acid: i64,

    /// What this ant sees this turn
    #[serde(skip)]
    pub vision: PartialMap,

    /// Ants in sight, including this one
    #[serde(default)]
    pub visible_ants: Vec<BasicAntStatus>,
}

impl AntStatus {
    /// Visible ants without the ant itself
    ///
    /// The server lists the observer among the ants it sees.
    pub fn other_visible_ants(&self) -> impl Iterator<Item = &BasicAntStatus> {
        self.visible_ants.iter().filter(move |ant| **ant != self.basic)
    }
}

/// Everything we learn about a turn
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Turn {
    pub number: u64,
    pub ants: Vec<AntStatus>,
}

impl Turn {
    pub fn empty() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basic(x: i32, y: i32, brain: &str) -> BasicAntStatus {
        BasicAntStatus {
            pos: Position::new(x, y),
            dir: Direction::new(1, 0),
            brain: brain.into(),
        }
    }

    #[test]
    fn test_other_visible_ants_excludes_self() {
        let me = basic(2, 2, CONTROLLED_BRAIN);
        let ant = AntStatus {
            basic: me.clone(),
            id: 0,
            energy: 100,
            acid: 50,
            vision: PartialMap::new(),
            visible_ants: vec![me.clone(), basic(3, 2, "enemy")],
        };

        let others: Vec<_> = ant.other_visible_ants().collect();
        assert_eq!(others, vec![&basic(3, 2, "enemy")]);
    }

    #[test]
    fn test_same_position_other_brain_is_not_self() {
        let me = basic(2, 2, CONTROLLED_BRAIN);
        let ant = AntStatus {
            basic: me,
            id: 0,
            energy: 1,
            acid: 1,
            vision: PartialMap::new(),
            visible_ants: vec![basic(2, 2, "zombie")],
        };
        assert_eq!(ant.other_visible_ants().count(), 1);
    }

    #[test]
    fn test_brain_code() {
        assert_eq!(basic(0, 0, CONTROLLED_BRAIN).brain_code(), 1);
        assert_eq!(basic(0, 0, "zombie").brain_code(), 0);
    }
}

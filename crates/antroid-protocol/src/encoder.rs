//! Turn-state message sent to brains and listeners
//!
//! One message per turn, one record per line, fields separated by spaces:
//!
//! ```text
//! T A P S            turn, ants per player, players, 1 if playing else 0
//! ID X Y DX DY E A B one line per ant of ours
//! N                  number of other visible ants
//! X Y DX DY B        one line per other visible ant
//! W H N              merged map width, height and cell count
//! X Y C S            one line per known cell: content code, seen this turn
//! ```

use antroid_core::{BasicAntStatus, GameStatus, GridMap, PartialMap, Turn};
use tracing::debug;

use crate::tracker::merge_visions;

/// Builds the per-turn message and remembers the map seen so far
#[derive(Debug, Default)]
pub struct TurnEncoder {
    map: PartialMap,
}

impl TurnEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map merged from every turn encoded so far
    pub fn map(&self) -> &PartialMap {
        &self.map
    }

    /// Merge this turn's visions and render the message
    pub fn encode(&mut self, status: &GameStatus, turn: &Turn) -> String {
        self.map = merge_visions(&self.map, &turn.ants);
        let message = encode_turn(status, turn, &self.map);
        debug!(
            turn = turn.number,
            ants = turn.ants.len(),
            cells = self.map.len(),
            "encoded turn state"
        );
        message
    }
}

/// `T A P S` header
pub fn header_line(turn: u64, ants_per_player: u32, players: usize, playing: bool) -> String {
    format!(
        "{} {} {} {}\n",
        turn,
        ants_per_player,
        players,
        u8::from(playing)
    )
}

/// Ants seen by ours that are not ours, one per position
///
/// When two observations land on the same position the later one wins but
/// keeps the slot of the first.
pub fn other_visible_ants(turn: &Turn) -> Vec<BasicAntStatus> {
    let mut others: Vec<BasicAntStatus> = Vec::new();

    for ant in &turn.ants {
        for seen in ant.other_visible_ants() {
            if turn.ants.iter().any(|own| own.basic == *seen) {
                continue;
            }
            match others.iter_mut().find(|o| o.pos == seen.pos) {
                Some(slot) => *slot = seen.clone(),
                None => others.push(seen.clone()),
            }
        }
    }

    others
}

/// Render the full message for a turn against an already merged map
pub fn encode_turn<M: GridMap>(status: &GameStatus, turn: &Turn, map: &M) -> String {
    let mut out = header_line(
        turn.number,
        status.ants_per_player(),
        status.players.len(),
        !status.is_over(),
    );

    for ant in &turn.ants {
        out.push_str(&format!(
            "{} {} {} {} {} {} {} {}\n",
            ant.id,
            ant.basic.pos.x,
            ant.basic.pos.y,
            ant.basic.dir.dx,
            ant.basic.dir.dy,
            ant.energy,
            ant.acid,
            ant.basic.brain_code(),
        ));
    }

    let others = other_visible_ants(turn);
    out.push_str(&format!("{}\n", others.len()));
    for ant in &others {
        out.push_str(&format!(
            "{} {} {} {} {}\n",
            ant.pos.x,
            ant.pos.y,
            ant.dir.dx,
            ant.dir.dy,
            ant.brain_code(),
        ));
    }

    let cells: Vec<_> = map.known_cells().collect();
    out.push_str(&format!("{} {} {}\n", map.width(), map.height(), cells.len()));
    for cell in cells {
        out.push_str(&format!(
            "{} {} {} {}\n",
            cell.pos.x,
            cell.pos.y,
            cell.content.code(),
            u8::from(cell.visible),
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use antroid_core::{
        AntStatus, Cell, CellContent, Direction, Game, GameSpec, Position, CONTROLLED_BRAIN,
    };

    fn status(ants_per_player: u32, players: usize, state: &str) -> GameStatus {
        GameStatus {
            game: Game {
                spec: Some(GameSpec {
                    ants_per_player,
                    ..Default::default()
                }),
                ..Default::default()
            },
            status: state.into(),
            players: (0..players).map(|i| format!("p{}", i)).collect(),
            ..Default::default()
        }
    }

    fn basic(x: i32, y: i32, brain: &str) -> BasicAntStatus {
        BasicAntStatus {
            pos: Position::new(x, y),
            dir: Direction::new(1, 0),
            brain: brain.into(),
        }
    }

    fn ant(id: u32, x: i32, y: i32, visible: Vec<BasicAntStatus>, vision: &[(i32, i32, &str)]) -> AntStatus {
        let me = basic(x, y, CONTROLLED_BRAIN);
        let mut visible_ants = vec![me.clone()];
        visible_ants.extend(visible);
        AntStatus {
            basic: me,
            id,
            energy: 90,
            acid: 40,
            vision: vision
                .iter()
                .map(|(x, y, kind)| Cell::new(Position::new(*x, *y), CellContent::from(*kind)))
                .collect(),
            visible_ants,
        }
    }

    #[test]
    fn test_header_line() {
        assert_eq!(header_line(7, 3, 2, true), "7 3 2 1\n");
        assert_eq!(header_line(7, 3, 2, false), "7 3 2 0\n");
    }

    #[test]
    fn test_header_reflects_game_over() {
        let turn = Turn {
            number: 7,
            ants: vec![],
        };
        let playing = encode_turn(&status(3, 2, "playing"), &turn, &PartialMap::new());
        assert!(playing.starts_with("7 3 2 1\n"));

        let over = encode_turn(&status(3, 2, "over"), &turn, &PartialMap::new());
        assert!(over.starts_with("7 3 2 0\n"));
    }

    #[test]
    fn test_full_message() {
        let turn = Turn {
            number: 2,
            ants: vec![ant(
                0,
                1,
                1,
                vec![basic(2, 1, "zombie")],
                &[(1, 1, "grass"), (2, 1, "sugar")],
            )],
        };

        let mut encoder = TurnEncoder::new();
        let message = encoder.encode(&status(1, 1, "playing"), &turn);

        let expected = "2 1 1 1\n\
                        0 1 1 1 0 90 40 1\n\
                        1\n\
                        2 1 1 0 0\n\
                        3 2 2\n\
                        1 1 0 1\n\
                        2 1 1 1\n";
        assert_eq!(message, expected);
    }

    #[test]
    fn test_other_ants_deduplicated_by_position() {
        let turn = Turn {
            number: 1,
            ants: vec![
                ant(0, 0, 0, vec![basic(5, 5, "zombie")], &[]),
                ant(1, 9, 9, vec![basic(5, 5, CONTROLLED_BRAIN), basic(6, 6, "zombie")], &[]),
            ],
        };

        let others = other_visible_ants(&turn);
        assert_eq!(others.len(), 2);
        assert_eq!(others[0], basic(5, 5, CONTROLLED_BRAIN));
        assert_eq!(others[1], basic(6, 6, "zombie"));
    }

    #[test]
    fn test_our_own_ants_are_not_others() {
        let turn = Turn {
            number: 1,
            ants: vec![
                ant(0, 0, 0, vec![basic(1, 0, CONTROLLED_BRAIN)], &[]),
                ant(1, 1, 0, vec![basic(0, 0, CONTROLLED_BRAIN)], &[]),
            ],
        };
        assert!(other_visible_ants(&turn).is_empty());
    }

    #[test]
    fn test_map_visibility_across_turns() {
        let mut encoder = TurnEncoder::new();
        let first = Turn {
            number: 1,
            ants: vec![ant(0, 0, 0, vec![], &[(0, 0, "grass"), (0, 1, "water")])],
        };
        encoder.encode(&status(1, 1, "playing"), &first);

        let second = Turn {
            number: 2,
            ants: vec![ant(0, 0, 0, vec![], &[(0, 0, "grass")])],
        };
        let message = encoder.encode(&status(1, 1, "playing"), &second);

        assert!(message.ends_with("1 2 2\n0 0 0 1\n0 1 4 0\n"));
        assert_eq!(encoder.map().len(), 2);
    }
}

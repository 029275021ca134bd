//! JSON bodies of the game server
//!
//! Every answer is wrapped in an envelope:
//!
//! ```json
//! {"status": "completed", "response": { ... }}
//! {"status": "error", "response": {"error_code": 415302510, "error_msg": "..."}}
//! ```

use antroid_core::{
    AntStatus, AntroidError, ApiError, BasicAntStatus, Cell, CellContent, Direction, Game, GameId,
    GameSpec, GameStatus, PartialMap, Position, Result, Turn,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

const STATUS_COMPLETED: &str = "completed";
const STATUS_ERROR: &str = "error";

/// Prefix of `/whoami` answers for logged-in users
pub const LOGGED_AS: &str = "logged as ";

#[derive(Debug, Deserialize)]
struct Envelope {
    status: String,
    #[serde(default)]
    response: Value,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error_code: i64,
    #[serde(default)]
    error_msg: String,
}

/// Unwrap an envelope, turning error envelopes into [`ApiError`]s
pub fn open_envelope(body: &str) -> Result<Value> {
    if body.trim().is_empty() {
        return Err(AntroidError::EmptyBody);
    }

    let envelope: Envelope = serde_json::from_str(body)?;
    match envelope.status.as_str() {
        STATUS_COMPLETED => Ok(envelope.response),
        STATUS_ERROR => {
            let err: ErrorResponse = serde_json::from_value(envelope.response)?;
            debug!("server error {}: {}", err.error_code, err.error_msg);
            Err(ApiError::from_code(err.error_code).into())
        }
        other => Err(AntroidError::ProtocolError(format!(
            "unexpected envelope status {:?}",
            other
        ))),
    }
}

/// Decode the response of a completed envelope
pub fn decode<T: DeserializeOwned>(body: &str) -> Result<T> {
    Ok(serde_json::from_value(open_envelope(body)?)?)
}

/// Accept a completed envelope with nothing in it
pub fn expect_empty(body: &str) -> Result<()> {
    match open_envelope(body)? {
        Value::Null => Ok(()),
        Value::Object(fields) if fields.is_empty() => Ok(()),
        other => Err(AntroidError::ProtocolError(format!(
            "expected an empty response, got {}",
            other
        ))),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateResponse {
    pub identifier: GameId,
}

#[derive(Debug, Deserialize)]
struct ListedGame {
    game_description: Game,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GamesResponse {
    #[serde(default)]
    games: Vec<ListedGame>,
}

impl GamesResponse {
    pub fn into_games(self) -> Vec<Game> {
        self.games.into_iter().map(|g| g.game_description).collect()
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct WhoAmIResponse {
    #[serde(default)]
    pub status: String,
}

impl WhoAmIResponse {
    /// Login name, if the session is authenticated
    pub fn login(&self) -> Option<&str> {
        self.status.strip_prefix(LOGGED_AS)
    }
}

#[derive(Debug, Default, Deserialize)]
struct StatusState {
    #[serde(default)]
    status: String,
}

#[derive(Debug, Deserialize)]
struct StatusBody {
    #[serde(default)]
    creator: String,
    #[serde(default)]
    creation_date: String,
    #[serde(default)]
    teaser: String,
    #[serde(default)]
    visibility: String,
    #[serde(default)]
    nb_ant_per_player: u32,
    #[serde(default)]
    pace: u32,
    #[serde(default)]
    initial_energy: u32,
    #[serde(default)]
    initial_acid: u32,
    #[serde(default)]
    players: Vec<String>,
    #[serde(default)]
    score: HashMap<String, i64>,
    #[serde(default)]
    status: StatusState,
    #[serde(default)]
    turn: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusResponse {
    status: StatusBody,
}

impl StatusResponse {
    pub fn into_status(self, id: GameId) -> GameStatus {
        let body = self.status;
        let spec = GameSpec {
            public: body.visibility == "public",
            description: body.teaser.clone(),
            pace: body.pace,
            ants_per_player: body.nb_ant_per_player,
            initial_energy: body.initial_energy,
            initial_acid: body.initial_acid,
            ..Default::default()
        };

        GameStatus {
            game: Game {
                identifier: id,
                creation_date: body.creation_date,
                creator: body.creator,
                teaser: body.teaser,
                spec: Some(spec),
            },
            score: body.score,
            status: body.status.status,
            turn: body.turn,
            players: body.players,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawAnt {
    x: i32,
    y: i32,
    dx: i32,
    dy: i32,
    brain: String,
}

impl From<RawAnt> for BasicAntStatus {
    fn from(raw: RawAnt) -> Self {
        BasicAntStatus {
            pos: Position::new(raw.x, raw.y),
            dir: Direction::new(raw.dx, raw.dy),
            brain: raw.brain,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawOwnAnt {
    #[serde(flatten)]
    basic: RawAnt,
    id: u32,
    energy: i64,
    acid: i64,
}

/// Cell contents come either bare or wrapped in `{"kind": ...}`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawContent {
    Bare(String),
    Tagged { kind: String },
}

#[derive(Debug, Deserialize)]
struct RawCell {
    x: i32,
    y: i32,
    content: RawContent,
}

impl From<RawCell> for Cell {
    fn from(raw: RawCell) -> Self {
        let kind = match raw.content {
            RawContent::Bare(kind) | RawContent::Tagged { kind } => kind,
        };
        Cell::new(Position::new(raw.x, raw.y), CellContent::from(kind))
    }
}

/// One ant, what it sees, and the ants it sees
type RawObservation = (RawOwnAnt, Vec<RawCell>, Vec<RawAnt>);

#[derive(Debug, Deserialize)]
pub(crate) struct PlayResponse {
    turn: u64,
    #[serde(default)]
    observations: Vec<RawObservation>,
}

impl PlayResponse {
    pub fn into_turn(self) -> Turn {
        let ants = self
            .observations
            .into_iter()
            .map(|(ant, cells, seen)| AntStatus {
                basic: ant.basic.into(),
                id: ant.id,
                energy: ant.energy,
                acid: ant.acid,
                vision: cells.into_iter().map(Cell::from).collect::<PartialMap>(),
                visible_ants: seen.into_iter().map(BasicAntStatus::from).collect(),
            })
            .collect();

        Turn {
            number: self.turn,
            ants,
        }
    }
}

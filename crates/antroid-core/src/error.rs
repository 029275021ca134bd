//! Error types for Antroid

use thiserror::Error;

/// Result type for Antroid operations
pub type Result<T> = std::result::Result<T, AntroidError>;

/// Antroid error types
#[derive(Debug, Error)]
pub enum AntroidError {
    /// The game server answered with an error envelope
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// HTTP 4xx from the game server
    #[error("Client error (HTTP {0})")]
    ClientHttp(u16),

    /// HTTP 5xx from the game server
    #[error("Server error (HTTP {0})")]
    ServerHttp(u16),

    /// The server sent an empty body where a response was expected
    #[error("Unexpected empty response body")]
    EmptyBody,

    /// Transport-level failure talking to the game server
    #[error("HTTP error: {0}")]
    Http(String),

    /// Brain or listener process failure
    #[error("Actor error: {0}")]
    Actor(String),

    /// Every brain process has died
    #[error("No live brain left in the pool")]
    NoLiveBrains,

    /// Invalid game specification
    #[error("Invalid game spec: {0}")]
    InvalidSpec(String),

    /// Malformed command text
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Protocol error
    #[error("Protocol error: {0}")]
    ProtocolError(String),
}

impl From<serde_json::Error> for AntroidError {
    fn from(err: serde_json::Error) -> Self {
        AntroidError::SerializationError(err.to_string())
    }
}

impl AntroidError {
    /// Whether this is the server telling us the game is no longer running
    pub fn is_game_not_playing(&self) -> bool {
        matches!(self, AntroidError::Api(ApiError::GameNotPlaying))
    }
}

/// Errors the game server reports through `error_code`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("Unknown user")]
    UnknownUser,
    #[error("Invalid argument")]
    InvalidArgument,
    #[error("User already exists")]
    UserAlreadyExists,
    #[error("Invalid game identifier")]
    WrongGame,
    #[error("No permission")]
    NoPerm,
    #[error("No more slot")]
    NoMoreSlot,
    #[error("Already joined")]
    AlreadyJoined,
    #[error("The game is not over")]
    GameNotOver,
    #[error("Invalid ant identifier")]
    WrongAnt,
    #[error("Must join first")]
    MustJoin,
    #[error("Must be logged")]
    NotLogged,
    #[error("Invalid command")]
    WrongCmd,
    #[error("The game is not playing")]
    GameNotPlaying,
    #[error("Invalid login")]
    InvalidLogin,
    #[error("Unknown error code {0}")]
    UnknownCode(i64),
}

impl ApiError {
    /// Map a server `error_code` to its error
    pub fn from_code(code: i64) -> Self {
        match code {
            error_codes::UNKNOWN_USER => ApiError::UnknownUser,
            error_codes::WRONG_CMD => ApiError::WrongCmd,
            error_codes::ALREADY_JOINED => ApiError::AlreadyJoined,
            error_codes::GAME_NOT_PLAYING => ApiError::GameNotPlaying,
            error_codes::USER_ALREADY_EXISTS => ApiError::UserAlreadyExists,
            error_codes::NOT_LOGGED => ApiError::NotLogged,
            error_codes::WRONG_ANT => ApiError::WrongAnt,
            error_codes::GAME_NOT_OVER => ApiError::GameNotOver,
            error_codes::INVALID_LOGIN => ApiError::InvalidLogin,
            error_codes::MUST_JOIN => ApiError::MustJoin,
            error_codes::NO_MORE_SLOT => ApiError::NoMoreSlot,
            error_codes::WRONG_GAME => ApiError::WrongGame,
            error_codes::INVALID_ARGUMENT => ApiError::InvalidArgument,
            error_codes::NO_PERM => ApiError::NoPerm,
            other => ApiError::UnknownCode(other),
        }
    }
}

/// Error codes of the v0 game server API
pub mod error_codes {
    pub const UNKNOWN_USER: i64 = 202165063;
    pub const WRONG_CMD: i64 = 285625267;
    pub const ALREADY_JOINED: i64 = 306276868;
    pub const GAME_NOT_PLAYING: i64 = 318351321;
    pub const USER_ALREADY_EXISTS: i64 = 332299703;
    pub const NOT_LOGGED: i64 = 415302510;
    pub const WRONG_ANT: i64 = 591857505;
    pub const GAME_NOT_OVER: i64 = 598240942;
    pub const INVALID_LOGIN: i64 = 621433138;
    pub const MUST_JOIN: i64 = 683983482;
    pub const NO_MORE_SLOT: i64 = 761507830;
    pub const WRONG_GAME: i64 = 796193025;
    pub const INVALID_ARGUMENT: i64 = 995492770;
    pub const NO_PERM: i64 = 1032614003;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes() {
        assert_eq!(ApiError::from_code(285625267), ApiError::WrongCmd);
        assert_eq!(ApiError::from_code(318351321), ApiError::GameNotPlaying);
        assert_eq!(ApiError::from_code(42), ApiError::UnknownCode(42));
    }

    #[test]
    fn test_game_not_playing_detection() {
        let err: AntroidError = ApiError::GameNotPlaying.into();
        assert!(err.is_game_not_playing());
        assert!(!AntroidError::EmptyBody.is_game_not_playing());
    }
}

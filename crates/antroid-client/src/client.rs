//! HTTP client for the Antroid game server
//!
//! Calls live under `<base>/<version>/<call>`. Reads are GET requests with a
//! query string, credentials go in form-encoded POST bodies, and the session
//! cookie set by `/auth` is kept by the cookie store.

use antroid_core::{
    AntroidError, ApiError, ApiInfo, Commands, Game, GameId, GameSpec, GameStatus, Result, Turn,
};
use antroid_harness::GameServer;
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{RequestBuilder, StatusCode};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, trace};

use crate::wire::{
    self, CreateResponse, GamesResponse, PlayResponse, StatusResponse, WhoAmIResponse,
};

/// Public server the game runs on
pub const DEFAULT_BASE_URL: &str = "https://yann.regis-gianas.org/antroid";

/// API version this client speaks
pub const DEFAULT_API_VERSION: &str = "0";

pub const DEFAULT_USER_AGENT: &str = concat!("antroid/", env!("CARGO_PKG_VERSION"));

/// Configuration for the game server client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_version: String,
    pub user_agent: String,
    /// Timeout of a single request
    pub timeout: Duration,
    /// The public server uses a self-signed certificate
    pub accept_invalid_certs: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
            accept_invalid_certs: true,
        }
    }
}

impl ClientConfig {
    /// Default config against another server
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Absolute URL of an API call
    pub fn call_url(&self, call: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            self.api_version,
            call.trim_start_matches('/')
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct Credentials {
    login: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct IdParams<'a> {
    id: &'a str,
}

#[derive(Debug, Serialize)]
struct PlayParams<'a> {
    id: &'a str,
    cmds: &'a str,
}

/// Query parameters of `/create`
#[derive(Debug, PartialEq, Eq, Serialize)]
struct CreateParams<'a> {
    users: String,
    teaser: &'a str,
    pace: u32,
    nb_turn: u32,
    nb_ant_per_player: u32,
    nb_player: u32,
    minimal_nb_player: u32,
    initial_energy: u32,
    initial_acid: u32,
}

impl<'a> From<&'a GameSpec> for CreateParams<'a> {
    fn from(spec: &'a GameSpec) -> Self {
        Self {
            users: spec.users_param(),
            teaser: &spec.description,
            pace: spec.pace,
            nb_turn: spec.turns,
            nb_ant_per_player: spec.ants_per_player,
            nb_player: spec.max_players,
            minimal_nb_player: spec.min_players,
            initial_energy: spec.initial_energy,
            initial_acid: spec.initial_acid,
        }
    }
}

const NO_PARAMS: &[(&str, &str)] = &[];

fn http_error(err: reqwest::Error) -> AntroidError {
    AntroidError::Http(err.to_string())
}

/// Map a non-success HTTP status to its error
fn status_error(status: StatusCode) -> Option<AntroidError> {
    if status.is_client_error() {
        Some(AntroidError::ClientHttp(status.as_u16()))
    } else if status.is_server_error() {
        Some(AntroidError::ServerHttp(status.as_u16()))
    } else {
        None
    }
}

/// Client for the Antroid game server
pub struct AntroidClient {
    http: reqwest::Client,
    config: ClientConfig,
    credentials: Option<Credentials>,
    authenticated: bool,
}

impl AntroidClient {
    /// Create a client for the public server
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .cookie_store(true)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(http_error)?;

        Ok(Self {
            http,
            config,
            credentials: None,
            authenticated: false,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    async fn get<Q: Serialize + ?Sized>(&self, call: &str, query: &Q) -> Result<String> {
        let request = self.http.get(self.config.call_url(call)).query(query);
        self.send(call, request).await
    }

    async fn post<F: Serialize + ?Sized>(&self, call: &str, form: &F) -> Result<String> {
        let request = self.http.post(self.config.call_url(call)).form(form);
        self.send(call, request).await
    }

    async fn send(&self, call: &str, request: RequestBuilder) -> Result<String> {
        let response = request
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(http_error)?;

        let status = response.status();
        if let Some(err) = status_error(status) {
            debug!("/{} answered HTTP {}", call, status);
            return Err(err);
        }

        let body = response.text().await.map_err(http_error)?;
        trace!("/{} -> {}", call, body);
        Ok(body)
    }

    /// Methods documented by the server
    pub async fn api_info(&self) -> Result<ApiInfo> {
        let body = self.get("api", NO_PARAMS).await?;
        wire::decode(&body)
    }

    /// Create an account; the credentials are kept for [`login`](Self::login)
    pub async fn register(&mut self, login: &str, password: &str) -> Result<()> {
        let credentials = Credentials {
            login: login.to_string(),
            password: password.to_string(),
        };
        let body = self.post("register", &credentials).await?;
        self.credentials = Some(credentials);
        wire::expect_empty(&body)
    }

    /// Authenticate with the stored credentials
    pub async fn login(&mut self) -> Result<()> {
        let credentials = self
            .credentials
            .clone()
            .ok_or(AntroidError::Api(ApiError::NotLogged))?;

        let result = match self.post("auth", &credentials).await {
            Ok(body) => wire::expect_empty(&body),
            Err(e) => Err(e),
        };
        self.authenticated = result.is_ok();
        if self.authenticated {
            info!("logged in as {}", credentials.login);
        }
        result
    }

    /// Authenticate, unless already logged in with these exact credentials
    pub async fn login_with_credentials(&mut self, login: &str, password: &str) -> Result<()> {
        let wanted = Credentials {
            login: login.to_string(),
            password: password.to_string(),
        };
        if self.authenticated {
            if self.credentials.as_ref() == Some(&wanted) {
                return Ok(());
            }
            self.logout().await?;
        }

        self.credentials = Some(wanted);
        self.login().await
    }

    /// Register the account if it does not exist yet, then log in
    pub async fn connect(&mut self, login: &str, password: &str) -> Result<()> {
        match self.register(login, password).await {
            Ok(()) => info!("registered {}", login),
            Err(AntroidError::Api(ApiError::UserAlreadyExists)) => {
                debug!("{} is already registered", login)
            }
            Err(e) => return Err(e),
        }
        self.login_with_credentials(login, password).await
    }

    /// End the session; does nothing when not logged in
    pub async fn logout(&mut self) -> Result<()> {
        if !self.authenticated {
            return Ok(());
        }
        let body = self.get("logout", NO_PARAMS).await?;
        wire::expect_empty(&body)?;
        self.authenticated = false;
        Ok(())
    }

    /// Login name of the current session
    pub async fn whoami(&mut self) -> Result<String> {
        let body = self.get("whoami", NO_PARAMS).await?;
        let response: WhoAmIResponse = wire::decode(&body)?;

        match response.login() {
            Some(login) => {
                self.authenticated = true;
                Ok(login.to_string())
            }
            None => {
                self.authenticated = false;
                Err(ApiError::NotLogged.into())
            }
        }
    }

    pub async fn create_game(&self, spec: &GameSpec) -> Result<Game> {
        spec.validate()?;
        let body = self.get("create", &CreateParams::from(spec)).await?;
        let response: CreateResponse = wire::decode(&body)?;
        info!("created game {}", response.identifier);

        Ok(Game {
            identifier: response.identifier,
            teaser: spec.description.clone(),
            spec: Some(spec.clone()),
            ..Default::default()
        })
    }

    pub async fn destroy_game(&self, id: &GameId) -> Result<()> {
        let body = self.get("destroy", &IdParams { id: id.as_str() }).await?;
        wire::expect_empty(&body)
    }

    /// Games visible to the current user
    pub async fn list_games(&self) -> Result<Vec<Game>> {
        let body = self.get("games", NO_PARAMS).await?;
        Ok(wire::decode::<GamesResponse>(&body)?.into_games())
    }

    pub async fn join_game(&self, id: &GameId) -> Result<()> {
        let body = self.get("join", &IdParams { id: id.as_str() }).await?;
        wire::expect_empty(&body)
    }

    pub async fn game_status(&self, id: &GameId) -> Result<GameStatus> {
        let body = self.get("status", &IdParams { id: id.as_str() }).await?;
        Ok(wire::decode::<StatusResponse>(&body)?.into_status(id.clone()))
    }

    /// Submit commands and get the turn that follows
    pub async fn play(&self, id: &GameId, commands: &Commands) -> Result<Turn> {
        let params = PlayParams {
            id: id.as_str(),
            cmds: commands.as_str(),
        };
        let body = self.get("play", &params).await?;
        Ok(wire::decode::<PlayResponse>(&body)?.into_turn())
    }
}

#[async_trait]
impl GameServer for AntroidClient {
    async fn join_game(&mut self, id: &GameId) -> Result<()> {
        AntroidClient::join_game(self, id).await
    }

    async fn game_status(&mut self, id: &GameId) -> Result<GameStatus> {
        AntroidClient::game_status(self, id).await
    }

    async fn play(&mut self, id: &GameId, commands: &Commands) -> Result<Turn> {
        AntroidClient::play(self, id, commands).await
    }

    async fn logout(&mut self) -> Result<()> {
        AntroidClient::logout(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve the same HTTP response to every request
    async fn serve(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    break;
                };
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_line,
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });

        format!("http://{}", addr)
    }

    fn client(base_url: String) -> AntroidClient {
        AntroidClient::with_config(ClientConfig::with_base_url(base_url)).unwrap()
    }

    #[test]
    fn test_call_url() {
        let config = ClientConfig::with_base_url("https://example.org/antroid/");
        assert_eq!(config.call_url("play"), "https://example.org/antroid/0/play");
        assert_eq!(config.call_url("/auth"), "https://example.org/antroid/0/auth");
        assert!(ClientConfig::default().accept_invalid_certs);
    }

    #[test]
    fn test_create_params() {
        let spec = GameSpec {
            description: "duel".into(),
            turns: 50,
            ants_per_player: 2,
            max_players: 4,
            min_players: 2,
            ..Default::default()
        };
        let params = CreateParams::from(&spec);
        assert_eq!(params.users, "+");
        assert_eq!(params.teaser, "duel");
        assert_eq!(params.nb_turn, 50);
        assert_eq!(params.nb_ant_per_player, 2);
        assert_eq!(params.nb_player, 4);
        assert_eq!(params.minimal_nb_player, 2);

        let private = GameSpec {
            public: false,
            players: vec!["alice".into(), "bob".into()],
            ..Default::default()
        };
        assert_eq!(CreateParams::from(&private).users, "alice,bob");
    }

    #[test]
    fn test_status_error() {
        assert!(matches!(
            status_error(StatusCode::NOT_FOUND),
            Some(AntroidError::ClientHttp(404))
        ));
        assert!(matches!(
            status_error(StatusCode::BAD_GATEWAY),
            Some(AntroidError::ServerHttp(502))
        ));
        assert!(status_error(StatusCode::OK).is_none());
    }

    #[tokio::test]
    async fn test_whoami_against_server() {
        let base = serve(
            "200 OK",
            r#"{"status":"completed","response":{"status":"logged as alice"}}"#,
        )
        .await;
        let mut client = client(base);
        assert_eq!(client.whoami().await.unwrap(), "alice");
        assert!(client.is_authenticated());
    }

    #[tokio::test]
    async fn test_error_envelope_from_server() {
        let base = serve(
            "200 OK",
            r#"{"status":"error","response":{"error_code":796193025,"error_msg":"no such game"}}"#,
        )
        .await;
        let client = client(base);
        assert!(matches!(
            client.game_status(&GameId::from("nope")).await,
            Err(AntroidError::Api(ApiError::WrongGame))
        ));
    }

    #[tokio::test]
    async fn test_http_status_from_server() {
        let base = serve("503 Service Unavailable", "").await;
        let client = client(base);
        assert!(matches!(
            client.list_games().await,
            Err(AntroidError::ServerHttp(503))
        ));
    }

    #[test]
    fn test_logout_without_session_is_a_noop() {
        let mut client = client("http://127.0.0.1:9".into());
        tokio_test::assert_ok!(tokio_test::block_on(client.logout()));
    }

    #[tokio::test]
    async fn test_invalid_spec_is_rejected_before_calling() {
        let client = client("http://127.0.0.1:9".into());
        let spec = GameSpec {
            ants_per_player: 0,
            ..Default::default()
        };
        assert!(matches!(
            client.create_game(&spec).await,
            Err(AntroidError::InvalidSpec(_))
        ));
    }
}

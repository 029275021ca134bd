//! Antroid command-line runner
//!
//! Either plays a whole game with local brain processes, or performs a
//! single call against the game server.

use anyhow::{Context, Result, bail};
use antroid_actors::{ActorSpec, BrainPool, ListenerPool, StageConfig};
use antroid_client::{AntroidClient, ClientConfig, DEFAULT_BASE_URL};
use antroid_core::{Commands, GameId, GameSpec, GameStatus, Turn};
use antroid_harness::Player;
use clap::{Args, Parser, Subcommand};
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "antroid", version, about = "Play Antroid games with external brain processes")]
struct Cli {
    #[arg(long, env = "ANTROID_LOGIN")]
    login: String,

    #[arg(long, env = "ANTROID_PASSWORD", hide_env_values = true)]
    password: String,

    /// Game server root, without the API version
    #[arg(long, env = "ANTROID_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Accept self-signed certificates
    #[arg(long, env = "ANTROID_INSECURE", default_value_t = true, action = clap::ArgAction::Set)]
    insecure: bool,

    /// Log at debug level (overrides RUST_LOG)
    #[arg(long, env = "ANTROID_DEBUG")]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play a game to the end with local brains
    Play(PlayArgs),
    /// List the API methods
    Methods,
    /// Show who the server thinks we are
    Whoami,
    /// List visible games
    Games,
    /// Show a game's status
    Status { id: String },
    /// Create a game
    Create(SpecArgs),
    /// Destroy a game
    Destroy { id: String },
    /// Join a game
    Join { id: String },
    /// Play one turn by hand
    Turn {
        id: String,
        /// Command batch, e.g. `0:forward,1:left`
        #[arg(long, default_value = "")]
        cmds: String,
    },
}

#[derive(Args, Debug)]
struct PlayArgs {
    /// Brain command line; repeat for more brains, answers are joined in this order
    #[arg(long = "ai", required = true, value_parser = actor_spec)]
    brains: Vec<ActorSpec>,

    /// Listener command line, fed every turn and never read
    #[arg(long = "listener", value_parser = actor_spec)]
    listeners: Vec<ActorSpec>,

    /// Join this game instead of creating one
    #[arg(long)]
    join: Option<String>,

    /// How long brains get to answer each turn
    #[arg(long, env = "ANTROID_TURN_TIMEOUT_MS", default_value_t = 10_000)]
    turn_timeout_ms: u64,

    /// How long processes get to exit before being killed
    #[arg(long, env = "ANTROID_STOP_GRACE_MS", default_value_t = 2_000)]
    stop_grace_ms: u64,

    #[command(flatten)]
    spec: SpecArgs,
}

#[derive(Args, Debug)]
struct SpecArgs {
    /// Game description
    #[arg(long, default_value = "")]
    description: String,

    /// Invited player; makes the game private
    #[arg(long = "player")]
    players: Vec<String>,

    #[arg(long, default_value_t = 1)]
    pace: u32,

    #[arg(long, default_value_t = 10)]
    turns: u32,

    /// Ants per player
    #[arg(long, default_value_t = 1)]
    ants: u32,

    /// Maximum number of players
    #[arg(long, default_value_t = 1)]
    max: u32,

    /// Minimum number of players
    #[arg(long, default_value_t = 1)]
    min: u32,

    #[arg(long, default_value_t = 100)]
    energy: u32,

    #[arg(long, default_value_t = 100)]
    acid: u32,
}

impl From<SpecArgs> for GameSpec {
    fn from(args: SpecArgs) -> Self {
        GameSpec {
            public: args.players.is_empty(),
            players: args.players,
            description: args.description,
            pace: args.pace,
            turns: args.turns,
            ants_per_player: args.ants,
            max_players: args.max,
            min_players: args.min,
            initial_energy: args.energy,
            initial_acid: args.acid,
        }
    }
}

fn actor_spec(command_line: &str) -> std::result::Result<ActorSpec, String> {
    ActorSpec::parse(command_line).ok_or_else(|| "empty command line".to_string())
}

fn init_logging(debug: bool) -> Result<()> {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn print_status(status: &GameStatus) {
    println!("Game {} ({})", status.game.identifier, status.status);
    println!("Turn: {}", status.turn);
    println!("Players: {}", status.players.join(", "));
    print_scores(&status.sorted_scores());
}

fn print_scores(scores: &[(String, i64)]) {
    let width = scores.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    for (name, score) in scores {
        println!("{:<width$}: {}", name, score, width = width);
    }
}

fn print_turn(turn: &Turn) {
    println!("Turn {}", turn.number);
    for ant in &turn.ants {
        println!(
            "ant {} at ({}, {}) facing ({}, {}), energy {}, acid {}, {} cell(s) in sight, {} other ant(s)",
            ant.id,
            ant.basic.pos.x,
            ant.basic.pos.y,
            ant.basic.dir.dx,
            ant.basic.dir.dy,
            ant.energy,
            ant.acid,
            ant.vision.len(),
            ant.other_visible_ants().count(),
        );
    }
}

async fn play(client: AntroidClient, args: PlayArgs) -> Result<()> {
    let id = match args.join {
        Some(id) => GameId::from(id.as_str()),
        None => {
            let game = client.create_game(&GameSpec::from(args.spec)).await?;
            game.identifier
        }
    };

    let config = StageConfig {
        turn_timeout: Some(Duration::from_millis(args.turn_timeout_ms)),
        stop_grace: Duration::from_millis(args.stop_grace_ms),
    };
    let mut brains = BrainPool::new(config.clone());
    for brain in args.brains {
        brains.add_brain(brain)?;
    }
    let mut listeners = ListenerPool::new(config);
    for listener in args.listeners {
        listeners.add_listener(listener)?;
    }

    let mut player = Player::new(client, brains, listeners);
    let outcome = async {
        player.join_game(id).await?;
        player.play_to_end().await
    }
    .await;

    if let Err(e) = player.quit().await {
        warn!("quitting failed: {}", e);
    }
    outcome?;

    println!("End of game.");
    println!("Scores:");
    print_scores(&player.scores());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug)?;

    let config = ClientConfig {
        base_url: cli.base_url.clone(),
        accept_invalid_certs: cli.insecure,
        ..Default::default()
    };
    let mut client = AntroidClient::with_config(config).context("building HTTP client")?;

    match cli.command {
        Command::Play(args) => {
            client
                .connect(&cli.login, &cli.password)
                .await
                .context("connecting to the game server")?;
            play(client, args).await
        }
        command => {
            client
                .login_with_credentials(&cli.login, &cli.password)
                .await
                .context("logging in")?;
            one_shot_then_logout(&mut client, command).await
        }
    }
}

/// Run a one-shot command; a failed logout never hides its outcome
async fn one_shot_then_logout(client: &mut AntroidClient, command: Command) -> Result<()> {
    let result = one_shot(client, command).await;
    if let Err(e) = client.logout().await {
        warn!("logout failed: {}", e);
    }
    result
}

async fn one_shot(client: &mut AntroidClient, command: Command) -> Result<()> {
    match command {
        Command::Play(_) => bail!("play is not a one-shot command"),
        Command::Methods => {
            let info = client.api_info().await?;
            let names: Vec<&str> = info.doc.keys().map(String::as_str).collect();
            println!("API methods: {}", names.join(", "));
        }
        Command::Whoami => println!("Username: {}", client.whoami().await?),
        Command::Games => {
            println!("Available games:");
            for game in client.list_games().await? {
                println!("- {}", game);
            }
        }
        Command::Status { id } => {
            let status = client.game_status(&GameId::from(id.as_str())).await?;
            print_status(&status);
        }
        Command::Create(spec) => {
            let game = client.create_game(&GameSpec::from(spec)).await?;
            println!("Game {} successfully created", game.identifier);
        }
        Command::Destroy { id } => {
            let id = GameId::from(id.as_str());
            client.destroy_game(&id).await?;
            println!("Game {} successfully destroyed", id);
        }
        Command::Join { id } => {
            let id = GameId::from(id.as_str());
            client.join_game(&id).await?;
            println!("Game {} successfully joined", id);
        }
        Command::Turn { id, cmds } => {
            let commands = Commands::from(cmds.as_str());
            if let Err(e) = commands.parse() {
                info!("sending unparsed commands: {}", e);
            }
            let turn = client.play(&GameId::from(id.as_str()), &commands).await?;
            print_turn(&turn);
        }
    }
    Ok(())
}

use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use spotgate::{cli, config, error};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Authorize with Spotify API
    Auth,

    /// Forget the cached token
    Logout,

    /// Show whether a usable token is cached
    Status,

    /// Print an app-only token from the client credentials grant
    ClientToken,

    /// Show the authenticated user's profile
    Me,

    /// Search the catalog
    Search(SearchOptions),

    /// Look up artists by id
    Artists(IdsOptions),

    /// Look up albums by id
    Albums(IdsOptions),

    /// Look up a single track
    Track(TrackOptions),

    /// Track recommendations from seed artists, genres and tracks
    Recommendations(RecommendationsOptions),

    /// Show featured playlists
    Featured,

    #[clap(about = "Create playlists and add tracks")]
    Playlist(PlaylistOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct SearchOptions {
    /// Search query
    pub query: String,

    /// Item type(s) to search for; can be repeated (defaults to track)
    #[clap(long = "type", num_args = 1)]
    pub types: Vec<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct IdsOptions {
    /// Spotify ids
    #[clap(required = true)]
    pub ids: Vec<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct TrackOptions {
    pub id: String,
}

#[derive(Parser, Debug, Clone)]
pub struct RecommendationsOptions {
    /// Seed artist id; can be repeated
    #[clap(long = "artist", num_args = 1)]
    pub artists: Vec<String>,

    /// Seed genre; can be repeated
    #[clap(long = "genre", num_args = 1)]
    pub genres: Vec<String>,

    /// Seed track id; can be repeated
    #[clap(long = "track", num_args = 1)]
    pub tracks: Vec<String>,
}

#[derive(Parser, Debug, Clone)]
#[command(about = "Create playlists and add tracks")]
pub struct PlaylistOptions {
    #[command(subcommand)]
    pub command: PlaylistSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum PlaylistSubcommand {
    /// Create a playlist for the authenticated (or configured) user
    Create(PlaylistCreateOpts),

    /// Add tracks to an existing playlist
    Add(PlaylistAddOpts),
}

#[derive(Parser, Debug, Clone)]
pub struct PlaylistCreateOpts {
    pub name: String,

    #[clap(long)]
    pub description: Option<String>,

    #[clap(long)]
    pub public: bool,

    #[clap(long)]
    pub collaborative: bool,

    /// Track URI to add after creation; can be repeated
    #[clap(long = "track", num_args = 1)]
    pub tracks: Vec<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct PlaylistAddOpts {
    pub playlist_id: String,

    /// Track URIs
    #[clap(required = true)]
    pub uris: Vec<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    match cli.command {
        Command::Auth => cli::auth().await,
        Command::Logout => cli::logout().await,
        Command::Status => cli::status().await,
        Command::ClientToken => cli::client_token().await,
        Command::Me => cli::me().await,
        Command::Search(opt) => cli::search(opt.query, opt.types).await,
        Command::Artists(opt) => cli::artists(opt.ids).await,
        Command::Albums(opt) => cli::albums(opt.ids).await,
        Command::Track(opt) => cli::track(opt.id).await,
        Command::Recommendations(opt) => {
            cli::recommendations(opt.artists, opt.genres, opt.tracks).await
        }
        Command::Featured => cli::featured().await,
        Command::Playlist(opt) => match opt.command {
            PlaylistSubcommand::Create(c) => {
                cli::create_playlist(c.name, c.description, c.public, c.collaborative, c.tracks)
                    .await
            }
            PlaylistSubcommand::Add(a) => cli::add_to_playlist(a.playlist_id, a.uris).await,
        },
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}

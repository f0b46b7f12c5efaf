use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use playlist_curator::catalog::{CatalogClient, SpotifyClient};
use playlist_curator::clock::SystemClock;
use playlist_curator::config::{AppConfig, CliConfig, FileConfig};
use playlist_curator::curation::{DailyDrivePolicy, GenerationRequest, PlaylistGenerator};
use playlist_curator::intent::{InMemoryConversationStore, IntentHandler, RulesetSelector};
use playlist_curator::playlist_store::{PlaylistRecordStore, SqlitePlaylistStore};
use playlist_curator::ruleset::{
    match_rulesets, NewRuleset, Ruleset, RulesetCriteria, RulesetStore, SourceMode,
    SqliteRulesetStore,
};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
#[command(
    name = "curator",
    version,
    about = "Keyword-driven playlist curation against a music catalog"
)]
struct CliArgs {
    /// Path to a TOML config file. Values in the file override CLI flags.
    #[clap(long, value_parser = parse_path, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the ruleset and playlist databases.
    #[clap(long, value_parser = parse_path, global = true)]
    pub db_dir: Option<PathBuf>,

    /// Base URL of the catalog Web API.
    #[clap(long, global = true)]
    pub api_base_url: Option<String>,

    /// Bearer token for the catalog Web API. Falls back to the
    /// CATALOG_ACCESS_TOKEN env var, then the config file.
    #[clap(long, global = true)]
    pub access_token: Option<String>,

    /// File containing the bearer token.
    #[clap(long, value_parser = parse_path, global = true)]
    pub access_token_file: Option<PathBuf>,

    /// Timeout in seconds for catalog API requests.
    #[clap(long, default_value_t = 30, global = true)]
    pub timeout_sec: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a playlist from guidelines and matching rulesets.
    Generate {
        /// Free-text guidelines used to select rulesets by keyword.
        #[clap(long, default_value = "")]
        guidelines: String,

        /// Explicit playlist name. Defaults to a name derived from the guidelines.
        #[clap(long)]
        name: Option<String>,

        /// Number of songs to aim for.
        #[clap(long)]
        songs: Option<usize>,

        /// Build today's Daily Drive playlist, replacing earlier runs.
        #[clap(long)]
        daily_drive: bool,

        /// Prefer clean tracks over explicit ones.
        #[clap(long)]
        no_explicit: bool,

        /// Apply this ruleset, skipping keyword matching.
        #[clap(long)]
        ruleset: Option<String>,

        /// Keep only music tracks, dropping podcast episodes.
        #[clap(long)]
        music_only: bool,

        /// Minutes east of UTC for resolving the local day.
        #[clap(long)]
        utc_offset_minutes: Option<i32>,

        /// Seed for the sampler RNG, for reproducible runs.
        #[clap(long)]
        seed: Option<u64>,
    },

    /// Execute an intent record produced by the extraction model.
    Intent {
        /// Path to the raw model output, or `-` for stdin.
        #[clap(long, default_value = "-")]
        file: String,

        /// User id for conversation tracking.
        #[clap(long)]
        user: Option<String>,
    },

    /// Manage curation rulesets.
    Rulesets {
        #[command(subcommand)]
        command: RulesetCommand,
    },

    /// Show which rulesets a set of guidelines would trigger.
    Match {
        /// Free-text guidelines to test.
        #[clap(long)]
        guidelines: String,
    },

    /// List playlists created by this tool, newest first.
    History,

    /// Inspect the user's catalog library.
    Library {
        #[command(subcommand)]
        command: LibraryCommand,
    },
}

#[derive(Subcommand, Debug)]
enum RulesetCommand {
    /// List rulesets. Inactive rulesets are hidden unless --all is given.
    List {
        #[clap(long)]
        all: bool,
    },

    /// Show one ruleset by name or id.
    Show { identifier: String },

    /// Create a ruleset.
    Create {
        name: String,

        /// Trigger keywords, comma separated.
        #[clap(long, value_delimiter = ',')]
        keywords: Vec<String>,

        #[clap(long)]
        description: Option<String>,

        /// Keep items released in this year or earlier.
        #[clap(long)]
        max_year: Option<i32>,

        /// Keep items released in this year or later.
        #[clap(long)]
        min_year: Option<i32>,

        /// Keep items from the last N years.
        #[clap(long)]
        years_back: Option<i32>,

        /// Genre filters, comma separated.
        #[clap(long, value_delimiter = ',')]
        genres: Vec<String>,

        /// Pull items from these playlists, comma separated.
        #[clap(long, value_delimiter = ',')]
        source_playlists: Vec<String>,

        /// Use source playlists instead of sampling rather than alongside it.
        #[clap(long)]
        replace: bool,
    },

    /// Delete a ruleset by name or id.
    Delete { identifier: String },

    /// Install the built-in rulesets if none exist yet.
    Seed,
}

#[derive(Subcommand, Debug)]
enum LibraryCommand {
    /// Top artists by listening history.
    Artists {
        #[clap(long, default_value_t = 20)]
        limit: usize,
    },

    /// Playlists in the user's library.
    Playlists,

    /// Saved podcast shows.
    Shows,

    /// Saved tracks.
    Tracks {
        #[clap(long, default_value_t = 50)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    let file_config = match &cli_args.config {
        Some(path) => Some(FileConfig::load(path)?),
        None => None,
    };

    let access_token = cli_args
        .access_token
        .clone()
        .or_else(|| std::env::var("CATALOG_ACCESS_TOKEN").ok());

    let cli_config = CliConfig {
        db_dir: cli_args.db_dir.clone(),
        api_base_url: cli_args.api_base_url.clone(),
        access_token,
        access_token_file: cli_args.access_token_file.clone(),
        http_timeout_sec: cli_args.timeout_sec,
        default_song_count: 20,
        user_id: None,
    };
    let config = AppConfig::resolve(&cli_config, file_config)?;

    match cli_args.command {
        Command::Generate {
            guidelines,
            name,
            songs,
            daily_drive,
            no_explicit,
            ruleset,
            music_only,
            utc_offset_minutes,
            seed,
        } => {
            let request = GenerationRequest {
                name,
                guidelines,
                num_songs: songs.unwrap_or(config.default_song_count),
                is_daily_drive: daily_drive,
                allow_explicit: !no_explicit,
                ruleset_name: ruleset,
                music_only,
                utc_offset_minutes,
            };
            cmd_generate(&config, request, seed).await
        }
        Command::Intent { file, user } => cmd_intent(&config, &file, user.as_deref()).await,
        Command::Rulesets { command } => cmd_rulesets(&config, command),
        Command::Match { guidelines } => cmd_match(&config, &guidelines),
        Command::History => cmd_history(&config),
        Command::Library { command } => cmd_library(&config, command).await,
    }
}

fn catalog_client(config: &AppConfig) -> Result<Arc<SpotifyClient>> {
    let token = config.require_access_token()?;
    Ok(Arc::new(SpotifyClient::new(
        config.api_base_url.clone(),
        token.to_string(),
        config.http_timeout_sec,
    )))
}

fn build_generator(config: &AppConfig) -> Result<(PlaylistGenerator, Arc<SqliteRulesetStore>)> {
    let client = catalog_client(config)?;
    let rulesets = Arc::new(SqliteRulesetStore::open(&config.rulesets_db_path())?);
    let records = Arc::new(SqlitePlaylistStore::open(&config.playlists_db_path())?);
    let generator = PlaylistGenerator::new(
        client,
        rulesets.clone(),
        records,
        Arc::new(SystemClock),
        DailyDrivePolicy::new(config.daily_drive_intros.clone()),
    );
    Ok((generator, rulesets))
}

async fn cmd_generate(
    config: &AppConfig,
    request: GenerationRequest,
    seed: Option<u64>,
) -> Result<()> {
    let (generator, _) = build_generator(config)?;

    let mut rng = match seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_os_rng(),
    };

    let created = generator.generate(request, &mut rng).await?;

    println!(
        "Created playlist '{}' with {} items",
        created.name, created.items_count
    );
    println!("  id:  {}", created.playlist_id);
    println!("  url: {}", created.url);
    if !created.rulesets_applied.is_empty() {
        println!("  rulesets: {}", created.rulesets_applied.join(", "));
    }
    Ok(())
}

async fn cmd_intent(config: &AppConfig, file: &str, user: Option<&str>) -> Result<()> {
    let text = if file == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read intent from stdin")?;
        buf
    } else {
        std::fs::read_to_string(file)
            .with_context(|| format!("Failed to read intent file: {}", file))?
    };

    let (generator, rulesets) = build_generator(config)?;
    let handler = IntentHandler::new(
        generator,
        rulesets,
        Arc::new(InMemoryConversationStore::new()),
    );

    let user_id = user.unwrap_or(&config.user_id);
    let mut rng = SmallRng::from_os_rng();
    let outcome = handler.handle(user_id, text.trim(), &mut rng).await?;
    println!("{}", outcome.summary());
    Ok(())
}

fn cmd_rulesets(config: &AppConfig, command: RulesetCommand) -> Result<()> {
    let store = SqliteRulesetStore::open(&config.rulesets_db_path())?;

    match command {
        RulesetCommand::List { all } => {
            let visible: Vec<Ruleset> = store
                .list()?
                .into_iter()
                .filter(|r| all || r.is_active)
                .collect();
            if visible.is_empty() {
                println!("No rulesets defined. Run `curator rulesets seed` to install the defaults.");
                return Ok(());
            }
            for ruleset in &visible {
                let status = if ruleset.is_active { "" } else { " [inactive]" };
                println!(
                    "{:>4}  {}{}  keywords: {}",
                    ruleset.id,
                    ruleset.name,
                    status,
                    ruleset.keywords.join(", ")
                );
            }
        }
        RulesetCommand::Show { identifier } => match find_ruleset(&store, &identifier)? {
            Some(ruleset) => print_ruleset(&ruleset),
            None => println!("No ruleset matches '{}'", identifier),
        },
        RulesetCommand::Create {
            name,
            keywords,
            description,
            max_year,
            min_year,
            years_back,
            genres,
            source_playlists,
            replace,
        } => {
            let new = NewRuleset {
                name,
                keywords,
                description,
                criteria: RulesetCriteria {
                    max_year,
                    min_year,
                    years_back,
                    genre_filter: if genres.is_empty() { None } else { Some(genres) },
                },
                source_playlist_names: source_playlists,
                source_mode: if replace {
                    SourceMode::Replace
                } else {
                    SourceMode::Supplement
                },
                is_active: true,
            };
            let created = store.create(new)?;
            println!("Created ruleset '{}' (id {})", created.name, created.id);
        }
        RulesetCommand::Delete { identifier } => match find_ruleset(&store, &identifier)? {
            Some(ruleset) => {
                store.delete(ruleset.id)?;
                println!("Deleted ruleset '{}'", ruleset.name);
            }
            None => println!("No ruleset matches '{}'", identifier),
        },
        RulesetCommand::Seed => {
            let seeded = store.seed_defaults()?;
            if seeded == 0 {
                println!("Rulesets already present, nothing seeded");
            } else {
                println!("Seeded {} default rulesets", seeded);
            }
        }
    }
    Ok(())
}

fn find_ruleset(store: &dyn RulesetStore, identifier: &str) -> Result<Option<Ruleset>> {
    match RulesetSelector::parse(identifier) {
        RulesetSelector::Id(id) => store.get_by_id(id),
        RulesetSelector::Name(name) => store.get_by_name(&name),
    }
}

fn print_ruleset(ruleset: &Ruleset) {
    println!("{} (id {})", ruleset.name, ruleset.id);
    if let Some(description) = &ruleset.description {
        println!("  {}", description);
    }
    println!("  keywords: {}", ruleset.keywords.join(", "));
    if let Some(year) = ruleset.criteria.max_year {
        println!("  max year: {}", year);
    }
    if let Some(year) = ruleset.criteria.min_year {
        println!("  min year: {}", year);
    }
    if let Some(years) = ruleset.criteria.years_back {
        println!("  years back: {}", years);
    }
    if let Some(genres) = &ruleset.criteria.genre_filter {
        println!("  genres: {}", genres.join(", "));
    }
    if !ruleset.source_playlist_names.is_empty() {
        println!(
            "  source playlists: {} ({})",
            ruleset.source_playlist_names.join(", "),
            ruleset.source_mode.as_str()
        );
    }
    if !ruleset.is_active {
        println!("  inactive");
    }
}

fn cmd_match(config: &AppConfig, guidelines: &str) -> Result<()> {
    let store = SqliteRulesetStore::open(&config.rulesets_db_path())?;
    let rulesets = store.list()?;

    let result = match_rulesets(guidelines, &rulesets);
    if result.is_empty() {
        println!("No rulesets match");
        return Ok(());
    }
    for (ruleset, keyword) in result.matched.iter().zip(result.keywords_found.iter()) {
        println!("{}  (keyword: {})", ruleset.name, keyword);
    }
    Ok(())
}

fn cmd_history(config: &AppConfig) -> Result<()> {
    let store = SqlitePlaylistStore::open(&config.playlists_db_path())?;
    let records = store.list()?;

    if records.is_empty() {
        println!("No playlists recorded yet");
        return Ok(());
    }
    for record in &records {
        println!(
            "{}  {}  ({})",
            format_timestamp(record.created_at),
            record.name,
            record.playlist_id
        );
        if let Some(guidelines) = &record.guidelines {
            println!("      guidelines: {}", guidelines);
        }
        if !record.rulesets_applied.is_empty() {
            println!("      rulesets: {}", record.rulesets_applied.join(", "));
        }
    }
    Ok(())
}

fn format_timestamp(secs: i64) -> String {
    chrono::DateTime::from_timestamp(secs, 0)
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| secs.to_string())
}

async fn cmd_library(config: &AppConfig, command: LibraryCommand) -> Result<()> {
    let client = catalog_client(config)?;

    match command {
        LibraryCommand::Artists { limit } => {
            for artist in client.get_top_artists(limit).await? {
                if artist.genres.is_empty() {
                    println!("{}", artist.name);
                } else {
                    println!("{}  [{}]", artist.name, artist.genres.join(", "));
                }
            }
        }
        LibraryCommand::Playlists => {
            for playlist in client.get_user_playlists().await? {
                println!(
                    "{}  ({} tracks, by {})",
                    playlist.name, playlist.tracks_total, playlist.owner
                );
            }
        }
        LibraryCommand::Shows => {
            for show in client.get_saved_shows().await? {
                match &show.publisher {
                    Some(publisher) => println!("{}  ({})", show.name, publisher),
                    None => println!("{}", show.name),
                }
            }
        }
        LibraryCommand::Tracks { limit } => {
            for track in client.get_saved_tracks(limit).await? {
                let artists = track
                    .artists
                    .iter()
                    .map(|a| a.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                println!("{} - {}", artists, track.name);
            }
        }
    }
    Ok(())
}

use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use playlist_converter::source_url::parse_playlist_url;
use playlist_converter::{
    Catalog, Config, ConversionJob, ConversionOptions, DestinationCatalog, JobReport,
    MatchSelector, QueryGenerator, SourceCatalog, SpotifyClient, VideoPolicy, YtMusicClient,
};
use playlist_converter::matcher::{Scorer, SimilarityScorer};

const RESULTS_DIR: &str = "conversion_results";

#[derive(Parser)]
#[command(name = "playlist-converter")]
#[command(about = "Copy playlists between Spotify and YouTube Music")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Service {
    Spotify,
    YoutubeMusic,
}

impl From<Service> for Catalog {
    fn from(service: Service) -> Self {
        match service {
            Service::Spotify => Catalog::Spotify,
            Service::YoutubeMusic => Catalog::YouTubeMusic,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ScorerKind {
    /// Exact and containment matches, penalised by duration difference
    Conservative,
    /// Jaro-Winkler similarity over title, artist, album and duration
    Similarity,
}

#[derive(clap::Args, Clone, Copy)]
struct ConvertFlags {
    /// Candidate scoring strategy
    #[arg(long, value_enum, default_value = "conservative")]
    scorer: ScorerKind,

    /// Add tracks again when several source tracks match the same destination track
    #[arg(long)]
    keep_duplicates: bool,

    /// Match tracks without creating any playlists
    #[arg(long)]
    dry_run: bool,

    /// Search for YouTube Music videos instead of setting them aside
    #[arg(long)]
    match_videos: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a single playlist, given its Spotify or YouTube Music link
    Convert {
        /// Playlist URL or spotify:playlist: URI
        url: String,

        #[command(flatten)]
        flags: ConvertFlags,
    },

    /// Convert liked songs, every playlist and saved albums in your library
    Library {
        /// Service to copy from; the other one is the destination
        #[arg(long, value_enum)]
        from: Service,

        #[command(flatten)]
        flags: ConvertFlags,
    },

    /// List the playlists in your library
    ListPlaylists {
        #[arg(long, value_enum, default_value = "spotify")]
        from: Service,
    },

    /// Show setup guide
    Setup,
}

enum Target<'a> {
    Playlist(&'a str),
    Library,
}

fn setup_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_tracing(cli.verbose);

    match cli.command {
        Commands::Convert { url, flags } => {
            let parsed = parse_playlist_url(&url).context("Unrecognised playlist link")?;
            convert(parsed.catalog, Target::Playlist(&parsed.playlist_id), flags).await?;
        }
        Commands::Library { from, flags } => {
            convert(from.into(), Target::Library, flags).await?;
        }
        Commands::ListPlaylists { from } => {
            list_playlists(from.into()).await?;
        }
        Commands::Setup => {
            show_setup_guide();
        }
    }

    Ok(())
}

fn load_config() -> Result<Config> {
    let config = Config::from_env().context("Failed to load configuration")?;

    let missing = config.get_missing_config();
    if !missing.is_empty() {
        println!("{}", "Missing configuration:".red());
        for item in &missing {
            println!("   - {}", item);
        }
        println!(
            "\n{}",
            "Run `playlist-converter setup` for instructions.".yellow()
        );
        bail!("incomplete configuration");
    }

    Ok(config)
}

async fn convert(source: Catalog, target: Target<'_>, flags: ConvertFlags) -> Result<()> {
    let destination = source.other();

    println!(
        "{}",
        format!("{} to {} Playlist Converter", source, destination).cyan().bold()
    );
    println!("{}", "=".repeat(50));

    if flags.dry_run {
        println!("{}", "DRY RUN MODE - No playlists will be created".yellow());
    }

    let config = load_config()?;

    let spotify = SpotifyClient::new(&config)
        .await
        .context("Failed to connect to Spotify")?;
    let ytmusic = YtMusicClient::new(&config).context("Failed to connect to YouTube Music")?;

    let report = match source {
        Catalog::Spotify => with_scorer(spotify, ytmusic, &config, target, flags).await?,
        Catalog::YouTubeMusic => with_scorer(ytmusic, spotify, &config, target, flags).await?,
    };

    report.print_summary();
    report
        .save(Path::new(RESULTS_DIR))
        .context("Failed to save conversion results")?;

    if flags.dry_run {
        println!("\n{}", "Dry run completed - no changes made".yellow());
    } else {
        println!("\n{}", "Conversion completed!".green());
    }

    Ok(())
}

async fn with_scorer<S, D>(
    source: S,
    destination: D,
    config: &Config,
    target: Target<'_>,
    flags: ConvertFlags,
) -> Result<JobReport>
where
    S: SourceCatalog,
    D: DestinationCatalog,
{
    let queries = QueryGenerator::new().with_title_only(destination.catalog() == Catalog::Spotify);
    let settings = config.match_settings();

    match flags.scorer {
        ScorerKind::Conservative => {
            let selector = MatchSelector::from_settings(queries, &settings);
            run(source, destination, selector, target, flags).await
        }
        ScorerKind::Similarity => {
            let selector = MatchSelector::new(queries, SimilarityScorer::default(), &settings);
            run(source, destination, selector, target, flags).await
        }
    }
}

async fn run<S, D, M>(
    source: S,
    destination: D,
    selector: MatchSelector<M>,
    target: Target<'_>,
    flags: ConvertFlags,
) -> Result<JobReport>
where
    S: SourceCatalog,
    D: DestinationCatalog,
    M: Scorer,
{
    let video_policy = if flags.match_videos {
        VideoPolicy::Match
    } else {
        VideoPolicy::for_source(source.catalog())
    };

    let options = ConversionOptions {
        keep_duplicates: flags.keep_duplicates,
        dry_run: flags.dry_run,
        video_policy,
    };

    let mut job = ConversionJob::new(source, destination, selector, options);

    match target {
        Target::Playlist(id) => {
            job.convert_playlist(id)
                .await
                .with_context(|| format!("Failed to convert playlist {}", id))?;
        }
        Target::Library => {
            job.convert_library()
                .await
                .context("Failed to convert library")?;
        }
    }

    Ok(job.finish())
}

async fn list_playlists(from: Catalog) -> Result<()> {
    println!("{}", format!("Your {} Playlists", from).cyan().bold());
    println!("{}", "=".repeat(50));

    let config = Config::from_env().context("Failed to load configuration")?;

    let playlists = match from {
        Catalog::Spotify => {
            let client = SpotifyClient::new(&config)
                .await
                .context("Failed to connect to Spotify")?;
            client.playlists().await
        }
        Catalog::YouTubeMusic => {
            let client =
                YtMusicClient::new(&config).context("Failed to connect to YouTube Music")?;
            client.playlists().await
        }
    }
    .context("Failed to fetch playlists")?;

    if playlists.is_empty() {
        println!("{}", "No playlists found".yellow());
        return Ok(());
    }

    for (i, playlist) in playlists.iter().enumerate() {
        println!(
            "{:2}. {} ({} tracks)",
            i + 1,
            playlist.name.green(),
            playlist.total_tracks
        );
        println!("     {}", playlist.id.cyan());
    }

    println!("\n{}", format!("Total: {} playlists", playlists.len()).cyan());

    Ok(())
}

fn show_setup_guide() {
    println!("{}", "Playlist Converter Setup Guide".cyan().bold());
    println!("{}", "=".repeat(50));

    println!("\n{}", "1. Spotify API Setup".yellow());
    println!("   - Go to https://developer.spotify.com/dashboard/");
    println!("   - Create a new app");
    println!("   - Copy your Client ID and Client Secret");
    println!("   - Add 'http://127.0.0.1:8080/callback' as a redirect URI");

    println!("\n{}", "2. YouTube Music Setup".yellow());
    println!("   - Open https://music.youtube.com in a signed-in browser");
    println!("   - Copy the request headers of any POST to /youtubei/v1/browse");
    println!("   - Save them as a JSON object of header name to value in headers_auth.json");

    println!("\n{}", "3. Configuration".yellow());
    println!("   - Create a .env file with:");
    println!("     SPOTIFY_CLIENT_ID=your_spotify_client_id");
    println!("     SPOTIFY_CLIENT_SECRET=your_spotify_client_secret");
    println!("     SPOTIFY_REDIRECT_URI=http://127.0.0.1:8080/callback");
    println!("     YTMUSIC_HEADERS=headers_auth.json");
    println!("     SEARCH_LIMIT=10                     (optional)");

    println!("\n{}", "4. Usage".yellow());
    println!("   - playlist-converter list-playlists --from spotify");
    println!("   - playlist-converter convert <playlist url> --dry-run");
    println!("   - playlist-converter convert <playlist url> --keep-duplicates");
    println!("   - playlist-converter library --from youtube-music --match-videos");

    println!("\n{}", "Ready to start converting!".green());
}

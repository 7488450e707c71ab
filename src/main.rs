use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use press_play::playback::shutdown;
use press_play::{AppConfig, MetadataProbe, PlaybackController, PlaybackOptions};

/// Play a media file or URL with ffplay
#[derive(Parser, Debug)]
#[command(name = "press-play")]
#[command(version)]
struct Args {
    /// File path or URL of the media to play
    media: String,

    /// Start playback this many seconds in
    #[arg(short, long, default_value_t = 0.0)]
    seek: f64,

    /// Show the ffplay window
    #[arg(short, long)]
    display: bool,

    /// Skip probing the media before playback
    #[arg(long)]
    no_metadata: bool,

    /// Print the probed metadata as JSON and exit
    #[arg(long)]
    info: bool,

    /// Directory containing ffprobe and ffplay
    #[arg(long, env = "PRESSPLAY_FFMPEG_PATH")]
    ffmpeg_path: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let _hooks = shutdown::guard();

    let args = Args::parse();

    let mut config = AppConfig::load()?;
    if args.ffmpeg_path.is_some() {
        config.ffmpeg_path = args.ffmpeg_path.clone();
    }
    let tools = config.tools();
    log::debug!("Using tools {:?}", tools);

    if args.info {
        let metadata = MetadataProbe::from_tools(&tools)
            .probe(&args.media)
            .context("Failed to probe media")?;
        match metadata {
            Some(metadata) => println!("{}", metadata),
            None => anyhow::bail!("No metadata available for {}", args.media),
        }
        return Ok(());
    }

    if !args.seek.is_finite() || args.seek < 0.0 {
        anyhow::bail!("Seek time must be a non-negative number of seconds");
    }

    let mut options = PlaybackOptions::new(args.media.clone())
        .seek_time(Duration::from_secs_f64(args.seek));
    options.display = args.display || config.display;
    options.parse_metadata = config.parse_metadata && !args.no_metadata;

    let player = Arc::new(PlaybackController::new(options, &tools)?);
    if let Some(metadata) = player.metadata() {
        log::info!(
            "{} - {} ({}s)",
            metadata.artist(),
            metadata.title(),
            metadata.duration().as_secs()
        );
    }
    player.play()?;

    let mut waiter = {
        let player = Arc::clone(&player);
        tokio::task::spawn_blocking(move || player.join())
    };

    tokio::select! {
        result = &mut waiter => {
            result.context("Playback worker failed")?;
        }
        signal = shutdown_signal() => {
            let signal = signal.context("Failed to install signal handlers")?;
            log::info!("Received {}, stopping playback", signal);
            shutdown::run_hooks();
            waiter.await.context("Playback worker failed")?;
        }
    }

    log::info!("Playback ended: {:?}", player.state());
    Ok(())
}

/// Resolves when the host is asked to exit: Ctrl+C everywhere, plus
/// SIGTERM and SIGHUP on Unix.
async fn shutdown_signal() -> std::io::Result<&'static str> {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await?;
        Ok::<_, std::io::Error>("Ctrl+C")
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        let mut term = signal(SignalKind::terminate())?;
        let mut hangup = signal(SignalKind::hangup())?;
        let name = tokio::select! {
            _ = term.recv() => "SIGTERM",
            _ = hangup.recv() => "SIGHUP",
        };
        Ok::<_, std::io::Error>(name)
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<std::io::Result<&'static str>>();

    tokio::select! {
        result = ctrl_c => result,
        result = terminate => result,
    }
}

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;

use wallpaper_dl::{BatchDownloader, Config, Event, RunSummary};

const BANNER: &str = "\
┌───────────────────────────────────┐
│  wallpaper-dl                     │
│  every wallpaper in the feed, now │
└───────────────────────────────────┘";

#[derive(Parser)]
#[command(name = "wallpaper-dl", version)]
#[command(about = "Download every wallpaper listed in a JSON feed, concurrently")]
struct Cli {
    /// Feed URL (defaults to the built-in endpoint)
    #[arg(long)]
    url: Option<String>,

    /// Directory images are saved to
    #[arg(short, long)]
    dir: Option<PathBuf>,

    /// Number of concurrent download workers
    #[arg(short, long)]
    workers: Option<usize>,

    /// Per-request timeout in seconds (0 = no timeout)
    #[arg(long)]
    timeout: Option<u64>,

    /// Record field holding the image URL
    #[arg(long)]
    field: Option<String>,

    /// JSON config file; command line flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Only print errors and the final summary
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn into_config(self) -> wallpaper_dl::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_json_file(path)?,
            None => Config::default(),
        };

        if let Some(url) = self.url {
            config.source_url = url;
        }
        if let Some(dir) = self.dir {
            config.download_dir = dir;
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if let Some(secs) = self.timeout {
            config.request_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }
        if let Some(field) = self.field {
            config.image_field = field;
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let quiet = cli.quiet;

    let default_filter = if quiet {
        "wallpaper_dl=warn"
    } else {
        "wallpaper_dl=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    if !quiet {
        println!("{}", BANNER);
    }

    let config = match cli.into_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("✗ {}", e);
            return ExitCode::FAILURE;
        }
    };

    let downloader = match BatchDownloader::new(config) {
        Ok(downloader) => downloader,
        Err(e) => {
            eprintln!("✗ {}", e);
            return ExitCode::FAILURE;
        }
    };

    let events = downloader.subscribe();
    let printer = tokio::spawn(print_events(events, quiet));

    let result = downloader.run().await;

    // Dropping the last sender ends the printer once it has caught up
    drop(downloader);
    printer.await.ok();

    match result {
        Ok(summary) => {
            print_summary(&summary);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(code = e.error_code(), error = %e, "Run aborted");
            eprintln!("✗ Could not download wallpapers: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn print_events(mut events: tokio::sync::broadcast::Receiver<Event>, quiet: bool) {
    loop {
        match events.recv().await {
            Ok(Event::TaskQueued { url, .. }) if !quiet => {
                println!("🔎 Found image URL: {}", url);
            }
            Ok(Event::DownloadComplete { destination, .. }) if !quiet => {
                println!("✓ Saved {}", destination.display());
            }
            Ok(Event::DownloadFailed { url, error, .. }) => {
                eprintln!("✗ Failed {}: {}", url, error);
            }
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "Event printer fell behind");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

fn print_summary(summary: &RunSummary) {
    println!(
        "Done: {} of {} images saved ({} failed, {:.1} MB) in {:.1}s",
        summary.succeeded,
        summary.queued,
        summary.failed,
        summary.bytes as f64 / 1_048_576.0,
        summary.elapsed.as_secs_f64()
    );
}

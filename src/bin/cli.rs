//! Thread Digest CLI
//!
//! Local execution entry point.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use thread_digest::{
    error::Result,
    models::Config,
    pipeline::{self, AttachmentProcessor, ThreadInput},
    services::{AttachmentDownloader, DownloadMode, EdClient, OpenAiSummarizer, Transcriber},
    storage::LocalStorage,
    utils::http,
};

/// Thread Digest - Discussion Thread Collector
#[derive(Parser, Debug)]
#[command(
    name = "thread-digest",
    version,
    about = "Collects discussion threads, archives attachments and classifies posts"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct FetchArgs {
    /// Replay threads from a local JSON array instead of the API
    #[arg(long)]
    local: Option<PathBuf>,

    /// Course to list threads from
    #[arg(long)]
    course_id: Option<u64>,

    /// Case-insensitive phrase a thread title must contain
    #[arg(long)]
    filter_text: Option<String>,

    /// Also match the filter phrase against thread bodies
    #[arg(long)]
    match_body: bool,

    /// Where to write the filtered threads
    #[arg(long)]
    output_file: Option<PathBuf>,

    /// Root directory for downloaded attachments
    #[arg(long)]
    files_dir: Option<PathBuf>,

    /// Record attachments as empty placeholder files
    #[arg(long)]
    no_download: bool,
}

impl FetchArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(course_id) = self.course_id {
            config.ed.course_id = course_id;
        }
        if let Some(phrase) = &self.filter_text {
            config.filter.phrase = phrase.clone();
        }
        if self.match_body {
            config.filter.include_body = true;
        }
        if let Some(path) = &self.output_file {
            config.paths.threads_file = path.to_string_lossy().into_owned();
        }
        if let Some(dir) = &self.files_dir {
            // Manifest paths keep the configured relative prefix.
            config.paths.files_dir = dir.to_string_lossy().into_owned();
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch and filter threads, then download their attachments
    Fetch(FetchArgs),

    /// Classify previously fetched threads
    Process {
        /// Threads file (default: paths.threads_file)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Posts file (default: paths.posts_file)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Summarize classified posts per homework and model
    Insights {
        /// Posts file (default: paths.posts_file)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Insights file (default: paths.insights_file)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Run full pipeline: Fetch → Process → Insights
    Run {
        #[command(flatten)]
        fetch: FetchArgs,

        /// Do not generate insights even if an API key is set
        #[arg(long)]
        skip_insights: bool,
    },

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn build_processor(config: &Config, no_download: bool) -> Result<AttachmentProcessor> {
    let client = http::create_download_client(&config.download, &config.ed.user_agent)?;
    let mode = DownloadMode::from_no_download(no_download);
    if mode == DownloadMode::Placeholder {
        log::info!("No-download mode: attachments are recorded as empty placeholders");
    }

    Ok(AttachmentProcessor::new(
        AttachmentDownloader::new(client, mode),
        Transcriber::default(),
        LocalStorage::new(".", config.paths.clone()).files_dir(),
        config.paths.saved_path_prefix.clone(),
    )
    .with_max_concurrent(config.download.max_concurrent))
}

/// Apply `process` overrides and check the classifier tables before use.
fn prepare_process(config: &mut Config, output: Option<&Path>) -> Result<()> {
    if let Some(path) = output {
        config.paths.posts_file = path.to_string_lossy().into_owned();
    }
    config.validate()
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    log::info!("Thread Digest starting...");

    let mut config = Config::load_or_default(&cli.config);
    log::info!("Loaded configuration from {}", cli.config.display());

    match cli.command {
        Command::Fetch(args) => {
            args.apply(&mut config);
            config.validate()?;

            let storage = LocalStorage::new(".", config.paths.clone());
            let processor = build_processor(&config, args.no_download)?;

            let (threads, stats) = match args.local {
                Some(path) => {
                    pipeline::run_extract(&config, &storage, ThreadInput::Replay(path), &processor)
                        .await?
                }
                None => {
                    let client = EdClient::from_env(&config.ed)?;
                    pipeline::run_extract(&config, &storage, ThreadInput::Live(&client), &processor)
                        .await?
                }
            };

            log::info!(
                "Fetch complete: {} threads, {} files downloaded, {} transcripts created",
                threads.len(),
                stats.files_saved,
                stats.transcripts_created
            );
        }

        Command::Process { input, output } => {
            prepare_process(&mut config, output.as_deref())?;
            let storage = LocalStorage::new(".", config.paths.clone());
            let input = input.unwrap_or_else(|| storage.path(&config.paths.threads_file));

            let threads = storage.load_threads(&input).await?;
            log::info!("Loaded {} threads from {}", threads.len(), input.display());

            let (posts, skipped) = pipeline::run_process(&config, &storage, &threads).await?;
            log::info!("Process complete: {} posts classified, {} skipped", posts.len(), skipped);
        }

        Command::Insights { input, output } => {
            if let Some(path) = &output {
                config.paths.insights_file = path.to_string_lossy().into_owned();
            }
            let storage = LocalStorage::new(".", config.paths.clone());
            let input = input.unwrap_or_else(|| storage.path(&config.paths.posts_file));

            let client = http::create_download_client(&config.download, &config.ed.user_agent)?;
            let Some(summarizer) = OpenAiSummarizer::from_env(client, &config.insights) else {
                log::error!("OPENAI_API_KEY is not set");
                return Err(thread_digest::error::AppError::config(
                    "OPENAI_API_KEY is required for insights",
                ));
            };

            let posts = storage.load_posts(&input).await?;
            log::info!("Loaded {} posts from {}", posts.len(), input.display());

            let insights = pipeline::run_insights(&summarizer, &posts).await;
            let path = storage.save_insights(&insights).await?;
            log::info!("Insights saved to {}", path.display());
        }

        Command::Run {
            fetch,
            skip_insights,
        } => {
            fetch.apply(&mut config);
            config.validate()?;

            let storage = LocalStorage::new(".", config.paths.clone());
            let processor = build_processor(&config, fetch.no_download)?;

            let summarizer = if skip_insights {
                None
            } else {
                let client = http::create_download_client(&config.download, &config.ed.user_agent)?;
                let summarizer = OpenAiSummarizer::from_env(client, &config.insights);
                if summarizer.is_none() {
                    log::warn!("OPENAI_API_KEY is not set, skipping insights");
                }
                summarizer
            };
            let summarizer = summarizer
                .as_ref()
                .map(|s| s as &dyn thread_digest::services::InsightSummarizer);

            match fetch.local {
                Some(path) => {
                    pipeline::run_pipeline(
                        &config,
                        &storage,
                        ThreadInput::Replay(path),
                        &processor,
                        summarizer,
                    )
                    .await?;
                }
                None => {
                    let client = EdClient::from_env(&config.ed)?;
                    pipeline::run_pipeline(
                        &config,
                        &storage,
                        ThreadInput::Live(&client),
                        &processor,
                        summarizer,
                    )
                    .await?;
                }
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK (includes keyword tables and paths)");

            log::info!("All validations passed!");
        }
    }

    log::info!("Done!");

    Ok(())
}

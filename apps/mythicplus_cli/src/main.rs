mod notifier;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use dialoguer::Confirm;
use mythicplus_adapters::configuration::{self, default_data_dir};
use mythicplus_adapters::network::build_api_client;
use mythicplus_adapters::telemetry;
use mythicplus_adapters::{
    BlizzardClient, CredentialCache, DiscordNotifier, FileCharacterRepository, LogNotifier,
    RaiderIoClient,
};
use mythicplus_core::clock::{SystemClock, TokioSleeper};
use mythicplus_core::config::Settings;
use mythicplus_core::notification::{build_leaderboard_message, build_leaderboard_text};
use mythicplus_core::ports::Notifier;
use mythicplus_core::use_cases::{SyncScoresUseCase, TrackCharactersUseCase};
use mythicplus_core::Error;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use notifier::ChatNotifier;

type ScoreSync = SyncScoresUseCase<
    FileCharacterRepository,
    BlizzardClient,
    RaiderIoClient,
    ChatNotifier,
    TokioSleeper,
>;
type Tracker = TrackCharactersUseCase<FileCharacterRepository, BlizzardClient, RaiderIoClient>;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run score update passes on the configured schedule until interrupted
    Run,

    /// Run a single score update pass now
    Update,

    /// Start tracking a character
    Add {
        /// Character name
        name: String,
        /// Realm name or slug
        realm: String,
    },

    /// Stop tracking a character
    Remove {
        /// Character name
        name: String,
        /// Realm name or slug
        realm: String,

        /// Skip the confirmation prompt
        #[arg(short, long, default_value = "false")]
        yes: bool,
    },

    /// List tracked characters, highest score first
    List {
        /// Maximum number of characters (0 for all)
        #[arg(short = 'n', long, default_value = "0")]
        limit: usize,

        /// Print as JSON
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Show the score leaderboard
    Scores {
        /// Maximum number of characters
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,

        /// Also post the leaderboard to the configured channel
        #[arg(long, default_value = "false")]
        post: bool,
    },
}

struct App {
    settings: Settings,
    sync: Arc<ScoreSync>,
    tracker: Tracker,
    notifier: Arc<ChatNotifier>,
}

fn build_app(settings: Settings) -> Result<App, Error> {
    let client = build_api_client()?;

    let credentials = CredentialCache::new(
        client.clone(),
        settings.blizzard.client_id.clone(),
        settings.blizzard.client_secret.clone(),
        Arc::new(SystemClock),
    );
    let ratings = Arc::new(BlizzardClient::new(
        client.clone(),
        settings.blizzard.region,
        credentials,
    ));
    let profiles = Arc::new(RaiderIoClient::new(
        client.clone(),
        settings.raiderio.access_key.clone(),
        settings.raiderio.region,
    ));

    let notifier = if settings.discord.token.is_empty() {
        warn!("no discord token configured, notifications go to the log");
        ChatNotifier::Log(LogNotifier)
    } else {
        ChatNotifier::Discord(DiscordNotifier::new(client, settings.discord.token.clone()))
    };
    let notifier = Arc::new(notifier);

    let data_dir = settings.store.path.clone().unwrap_or_else(default_data_dir);
    let characters = Arc::new(FileCharacterRepository::new(data_dir));

    let sync = SyncScoresUseCase::new(
        characters.clone(),
        ratings.clone(),
        profiles.clone(),
        notifier.clone(),
        Arc::new(TokioSleeper),
    )
    .with_cooldown(settings.updater.cooldown());
    let tracker = TrackCharactersUseCase::new(characters, ratings, profiles);

    Ok(App {
        settings,
        sync: Arc::new(sync),
        tracker,
        notifier,
    })
}

impl App {
    fn channel_id(&self) -> anyhow::Result<&str> {
        let channel_id = self.settings.discord.channel_id.as_str();
        if channel_id.is_empty() && self.notifier.is_discord() {
            anyhow::bail!("discord.channel_id must be set when a discord token is configured");
        }
        Ok(channel_id)
    }
}

async fn run_scheduled(app: &App) -> anyhow::Result<()> {
    let channel_id = app.channel_id()?.to_string();
    let cancel = CancellationToken::new();

    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, stopping after the current character");
            shutdown.cancel();
        }
    });

    let frequency = app.settings.updater.frequency();
    info!(
        minutes = app.settings.updater.frequency_minutes,
        "starting scheduled score updates"
    );

    let mut ticker = interval(frequency);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = cancel.cancelled() => break,
        }

        match app.sync.run_pass(&channel_id, &cancel).await {
            Ok(summary) => info!(?summary, "pass finished"),
            Err(Error::Cancelled) => break,
            Err(e) => error!(error = %e, "score update pass failed"),
        }
    }

    info!("scheduler stopped");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = match configuration::get_configuration() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("failed to load configuration: {}", e);
            return Err(anyhow::anyhow!("configuration loading failed"));
        }
    };

    let _guard = telemetry::init_subscriber("mythicplus", &settings.log_level);

    let cli = Cli::parse();
    let app = build_app(settings)?;

    match &cli.command {
        Commands::Run => run_scheduled(&app).await?,
        Commands::Update => {
            let channel_id = app.channel_id()?;
            let summary = app
                .sync
                .run_pass(channel_id, &CancellationToken::new())
                .await?;
            println!(
                "Checked {} characters: {} updated, {} unchanged, {} failed.",
                summary.checked, summary.updated, summary.unchanged, summary.failed
            );
            if summary.notify_failed > 0 {
                println!("{} notifications could not be sent.", summary.notify_failed);
            }
        }
        Commands::Add { name, realm } => match app.tracker.add(name, realm).await {
            Ok(character) => println!(
                "Now tracking {} ({}) with a score of {:.2}.",
                character, character.class, character.overall_score
            ),
            Err(Error::AlreadyTracked(key)) => println!("{} is already tracked.", key),
            Err(e) => return Err(e.into()),
        },
        Commands::Remove { name, realm, yes } => {
            if !yes {
                let confirmed = Confirm::new()
                    .with_prompt(format!("Stop tracking {}-{}?", name, realm))
                    .default(false)
                    .interact()?;

                if !confirmed {
                    println!("Cancelled.");
                    return Ok(());
                }
            }

            match app.tracker.remove(name, realm).await {
                Ok(()) => println!("Stopped tracking {}-{}.", name, realm),
                Err(Error::NotTracked(key)) => println!("{} is not tracked.", key),
                Err(e) => return Err(e.into()),
            }
        }
        Commands::List { limit, json } => {
            let characters = app.tracker.list(*limit).await?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&characters)?);
            } else if characters.is_empty() {
                println!("No characters are being tracked.");
            } else {
                println!("Tracking {} characters:", characters.len());
                for c in characters {
                    println!(
                        "- {} [{}] {:.2} (tank {:.2}, heal {:.2}, dps {:.2})",
                        c, c.class, c.overall_score, c.tank_score, c.heal_score, c.dps_score
                    );
                }
            }
        }
        Commands::Scores { limit, post } => {
            let characters = app.tracker.list(*limit).await?;
            let region = app.settings.raiderio.region;
            println!("{}", build_leaderboard_text(&characters, region));

            if *post {
                let channel_id = app.channel_id()?;
                let message = build_leaderboard_message(&characters, region);
                app.notifier.send_rich_message(channel_id, &message).await?;
                println!("Leaderboard posted.");
            }
        }
    }

    Ok(())
}

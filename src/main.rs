//! Wiring & DI. Entry point: parse the command, bootstrap adapters, inject into services, run one bot.
//! No business logic here.

use clap::{Parser, Subcommand, ValueEnum};
use dotenv::dotenv;
use econ_bots::adapters::directory::{DirectoryRules, HttpDirectory};
use econ_bots::adapters::nber::NberSearch;
use econ_bots::adapters::planitpurple::PlanItPurpleFeed;
use econ_bots::adapters::templates::HandlebarsRenderer;
use econ_bots::adapters::zulip::ZulipGateway;
use econ_bots::domain::{ChannelMessage, FieldMapper, SubscriptionPlanner};
use econ_bots::ports::{ChatGateway, DirectorySource, EventFeed, PaperSearch, TemplatePort};
use econ_bots::shared::config::{AppConfig, PAPER_REQUEST_DELAY, ZulipCredentials};
use econ_bots::shared::department::DepartmentConfig;
use econ_bots::usecases::{EventsDigest, PapersDigest, Period, WelcomeService, publish};
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "econ-bots", version, about = "Economics department Zulip bots")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Greet and auto-subscribe users: backfill existing users, then listen for new ones.
    Welcome,
    /// Post campus events to the field channels.
    Events {
        #[arg(value_enum)]
        period: PeriodArg,
        /// Print the messages instead of posting them.
        #[arg(long)]
        dry_run: bool,
    },
    /// Post this week's new working papers to the field channels.
    Papers {
        /// Print the messages instead of posting them.
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PeriodArg {
    Daily,
    Weekly,
}

impl From<PeriodArg> for Period {
    fn from(p: PeriodArg) -> Self {
        match p {
            PeriodArg::Daily => Period::Daily,
            PeriodArg::Weekly => Period::Weekly,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!("no .env found"),
    }

    let cli = Cli::parse();

    let cfg = AppConfig::load().map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;
    let Some(zuliprc) = cfg.zuliprc() else {
        anyhow::bail!("Set ZULIPRC (or ECON_BOTS_ZULIPRC) to the bot's zuliprc file");
    };
    let credentials = ZulipCredentials::load(&zuliprc)?;
    info!(site = %credentials.site, bot = %credentials.email, "loaded zuliprc");

    let department = match cfg.department_file.as_deref() {
        Some(path) => {
            info!(path, "loading department tables");
            DepartmentConfig::load(path)?
        }
        None => DepartmentConfig::northwestern(),
    };

    // --- Adapters ---
    let chat: Arc<dyn ChatGateway> = Arc::new(ZulipGateway::new(credentials)?);
    let templates: Arc<dyn TemplatePort> = Arc::new(HandlebarsRenderer::new(
        department.channel_emojis.clone(),
        cfg.template_dir.as_deref().map(Path::new),
    )?);

    match cli.command {
        Command::Welcome => run_welcome(&cfg, department, chat, templates).await,
        Command::Events { period, dry_run } => {
            let feed: Arc<dyn EventFeed> = Arc::new(PlanItPurpleFeed::new(
                cfg.planitpurple_url_or_default(),
                cfg.planitpurple_feed_id_or_default(),
            )?);
            let digest = EventsDigest::new(feed, templates, department.event_channels);
            let today = chrono::Local::now().date_naive();
            let messages = digest.build(period.into(), today).await?;
            deliver(chat.as_ref(), &messages, dry_run).await
        }
        Command::Papers { dry_run } => {
            let search: Arc<dyn PaperSearch> = Arc::new(NberSearch::new(&cfg.nber_url_or_default())?);
            let digest = PapersDigest::new(
                search,
                templates,
                department.paper_channels,
                PAPER_REQUEST_DELAY,
            );
            let messages = digest.build().await?;
            deliver(chat.as_ref(), &messages, dry_run).await
        }
    }
}

/// Fetch the directory once, backfill, then follow registrations until the process is stopped.
async fn run_welcome(
    cfg: &AppConfig,
    department: DepartmentConfig,
    chat: Arc<dyn ChatGateway>,
    templates: Arc<dyn TemplatePort>,
) -> anyhow::Result<()> {
    let directory = HttpDirectory::new(
        cfg.directory_url_or_default(),
        DirectoryRules {
            email_domains: department.student_email_domains.clone(),
            name_suffixes: department.name_suffixes.clone(),
        },
    )?;
    let students = directory.fetch_students().await?;
    info!(count = students.len(), "loaded student directory");

    let planner = SubscriptionPlanner::new(
        FieldMapper::new(department.field_channels),
        department.first_year_courses,
        cfg.first_year_policy_or_default(),
    );
    let service = WelcomeService::new(chat, templates, planner, students);

    service.backfill().await?;
    service.run_live().await?;
    Ok(())
}

async fn deliver(
    chat: &dyn ChatGateway,
    messages: &[ChannelMessage],
    dry_run: bool,
) -> anyhow::Result<()> {
    if dry_run {
        for message in messages {
            println!("{message}\n");
        }
        return Ok(());
    }
    publish(chat, messages).await?;
    info!(count = messages.len(), "all messages posted");
    Ok(())
}

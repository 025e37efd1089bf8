// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

mod output;

use clap::{ArgAction, Args, Parser, Subcommand};
use feedvault_core::{ExitCode, MachineError, ENV_FEEDVAULT_LOG_JSON};
use feedvault_model::MonthKey;
use feedvault_query::{FeedCriteria, SortDirection};
use feedvault_runtime::{
    current_month, ConfigError, FeedCommand, FeedConfig, FeedRenderer, FeedRuntime, FeedSession,
    NullRenderer,
};
use feedvault_store::ShardLoader;
use output::PageBuffer;
use std::path::PathBuf;
use std::process::ExitCode as ProcessExitCode;
use tracing::debug;

#[derive(Parser)]
#[command(name = "feedvault")]
#[command(about = "Browse an archived monthly post feed")]
#[command(version)]
struct Cli {
    /// Site root serving members.json and data/<YYYY>-<MM>.json.
    #[arg(long, global = true)]
    base_url: Option<String>,
    /// Local checkout to read instead of a site.
    #[arg(long, global = true)]
    root: Option<PathBuf>,
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Allow a site on localhost or a private network address.
    #[arg(long, global = true, default_value_t = false)]
    allow_private_hosts: bool,
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
    #[arg(long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the filtered feed, one page per `--pages`.
    Feed(FeedArgs),
    /// Months that have posts, newest first.
    Months,
    /// Distinct hidden labels.
    Labels,
    Members,
    Guide,
}

#[derive(Args)]
struct FeedArgs {
    #[arg(long)]
    member: Option<String>,
    #[arg(long, value_parser = parse_month_arg)]
    month: Option<MonthKey>,
    #[arg(long)]
    tag: Option<String>,
    #[arg(long)]
    label: Option<String>,
    #[arg(long)]
    search: Option<String>,
    #[arg(long, default_value_t = false)]
    oldest: bool,
    #[arg(long, default_value_t = 1)]
    pages: usize,
}

impl FeedArgs {
    fn criteria(&self) -> FeedCriteria {
        FeedCriteria {
            member_id: self.member.clone(),
            month: self.month,
            tag: self.tag.clone(),
            hidden_label: self.label.clone(),
            search_text: self.search.clone(),
            sort: if self.oldest {
                SortDirection::OldestFirst
            } else {
                SortDirection::NewestFirst
            },
        }
    }
}

fn parse_month_arg(raw: &str) -> Result<MonthKey, String> {
    MonthKey::parse(raw).map_err(|e| e.to_string())
}

#[derive(Debug)]
struct CliError {
    exit: ExitCode,
    error: MachineError,
}

impl CliError {
    fn new(exit: ExitCode, code: &str, message: &str) -> Self {
        Self {
            exit,
            error: MachineError::new(code, message),
        }
    }

    fn with_detail(mut self, key: &str, value: &str) -> Self {
        self.error = self.error.with_detail(key, value);
        self
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::new(ExitCode::Usage, err.code.as_str(), &err.message)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ProcessExitCode {
    let cli = Cli::parse();
    let json_logs = cli.json
        || std::env::var(ENV_FEEDVAULT_LOG_JSON).is_ok_and(|v| matches!(v.as_str(), "1" | "true"));
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    feedvault_runtime::telemetry::init_tracing_with_default(json_logs, level);

    let json = cli.json;
    match run(cli).await {
        Ok(lines) => {
            for line in lines {
                println!("{line}");
            }
            ProcessExitCode::from(ExitCode::Success.as_u8())
        }
        Err(err) => {
            if json {
                eprintln!("{}", err.error.to_json_line());
            } else {
                eprintln!("{}", err.error);
            }
            ProcessExitCode::from(err.exit.as_u8())
        }
    }
}

async fn run(cli: Cli) -> Result<Vec<String>, CliError> {
    let config = load_config(&cli)?;
    let loader = ShardLoader::new(config.shard_source()?);
    debug!(backend = loader.backend_tag(), "shard source ready");

    match cli.command {
        Commands::Members => {
            let members = loader.load_members().await;
            Ok(output::member_lines(&members, cli.json))
        }
        Commands::Guide => {
            let guide = loader.load_guide().await.ok_or_else(|| {
                CliError::new(
                    ExitCode::DependencyFailure,
                    "guide_unavailable",
                    "guide.json is missing or malformed",
                )
            })?;
            if cli.json {
                let line = serde_json::to_string(&guide).map_err(|e| {
                    CliError::new(ExitCode::Internal, "encode_failed", &e.to_string())
                })?;
                return Ok(vec![line]);
            }
            let mut lines = vec![guide.title.clone()];
            lines.extend(guide.items.iter().map(|item| format!("- {item}")));
            Ok(lines)
        }
        Commands::Months => {
            let session = load_everything(loader, config).await?;
            Ok(output::month_lines(&session.distinct_months(), cli.json))
        }
        Commands::Labels => {
            let session = load_everything(loader, config).await?;
            Ok(output::label_lines(&session.distinct_hidden_labels(), cli.json))
        }
        Commands::Feed(args) => feed(loader, config, &args, cli.json).await,
    }
}

fn load_config(cli: &Cli) -> Result<FeedConfig, CliError> {
    let mut config = FeedConfig::load(cli.config.as_deref())?;
    config.apply_env_overrides(|key| std::env::var(key).ok())?;
    if let Some(base_url) = &cli.base_url {
        config.base_url = base_url.clone();
        config.local_root = None;
    }
    if let Some(root) = &cli.root {
        config.local_root = Some(root.clone());
    }
    if cli.allow_private_hosts {
        config.allow_private_hosts = true;
    }
    config.validate()?;
    Ok(config)
}

fn feed_runtime(loader: ShardLoader, config: FeedConfig) -> Result<FeedRuntime, CliError> {
    let now = current_month()
        .map_err(|e| CliError::new(ExitCode::Internal, "clock_out_of_range", &e.to_string()))?;
    Ok(FeedRuntime::new(loader, config, now))
}

async fn load_everything(loader: ShardLoader, config: FeedConfig) -> Result<FeedSession, CliError> {
    let mut session = FeedSession::new(config.page_size);
    let runtime = feed_runtime(loader, config)?;
    let mut renderer = NullRenderer;
    let queue = runtime.bootstrap(&mut session, &mut renderer).await;
    runtime.backfill_all(&mut session, &mut renderer, queue).await;
    ensure_reachable(&runtime, &session)?;
    Ok(session)
}

/// An empty member list with no shard loaded means nothing was reachable,
/// which is reported instead of printing an empty feed.
fn ensure_reachable(runtime: &FeedRuntime, session: &FeedSession) -> Result<(), CliError> {
    let stats = runtime.loader().stats();
    if !session.members().is_empty() || stats.shards_loaded > 0 {
        return Ok(());
    }
    Err(CliError::new(
        ExitCode::DependencyFailure,
        "source_unreachable",
        "no members and no shards could be loaded; \
         pass --allow-private-hosts for a site on localhost or a private network",
    )
    .with_detail("backend", runtime.loader().backend_tag())
    .with_detail("shards_failed", &stats.shards_failed.to_string()))
}

/// Reveals up to `pages - 1` further pages, stopping once the view runs out.
fn show_more_pages<R>(session: &mut FeedSession, renderer: &mut R, pages: usize)
where
    R: FeedRenderer + ?Sized,
{
    for _ in 1..pages {
        if session.pager().is_exhausted() {
            break;
        }
        FeedRuntime::handle_command(session, renderer, FeedCommand::More);
    }
}

async fn feed(
    loader: ShardLoader,
    config: FeedConfig,
    args: &FeedArgs,
    json: bool,
) -> Result<Vec<String>, CliError> {
    let mut session = FeedSession::new(config.page_size);
    let runtime = feed_runtime(loader, config)?;
    let mut buffer = PageBuffer::new(json);

    let queue = runtime.bootstrap(&mut session, &mut buffer).await;
    runtime.backfill_all(&mut session, &mut buffer, queue).await;
    ensure_reachable(&runtime, &session)?;

    FeedRuntime::handle_command(
        &mut session,
        &mut buffer,
        FeedCommand::SetCriteria(args.criteria()),
    );
    show_more_pages(&mut session, &mut buffer, args.pages);
    debug!(
        matched = session.view_len(),
        shown = buffer.blocks().len(),
        skipped = buffer.skipped(),
        stats = ?runtime.loader().stats(),
        "feed rendered"
    );
    Ok(buffer.blocks().to_vec())
}

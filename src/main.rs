use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use is_terminal::IsTerminal;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use session_stream::config::{self, Config, DEFAULT_AGENT, DEFAULT_TAIL};
use session_stream::listing;
use session_stream::session_log::format::{error, Theme};
use session_stream::session_log::sessions::latest_session;
use session_stream::session_log::RenderOptions;
use session_stream::stream::stream_file;

#[derive(Parser, Debug)]
#[command(name = "session-stream")]
#[command(about = "Stream OpenClaw and inber session logs in a readable format.", long_about = None)]
#[command(after_help = "Examples:
  session-stream                        # latest session for default agent (main)
  session-stream --agent argraphments   # latest session for a specific agent
  session-stream --list                 # list available agents
  session-stream --list --agent work    # list sessions for an agent
  session-stream <path>.jsonl           # stream a specific file
  session-stream --no-follow            # dump and exit (no tail)
  session-stream -n 50                  # show last N messages instead of default 20
  session-stream --verbose              # show request entries (inber format)")]
struct Args {
    /// Session file to stream instead of the agent's latest
    path: Option<PathBuf>,

    /// Agent id
    #[arg(short, long, default_value = DEFAULT_AGENT)]
    agent: String,

    /// List agents, or sessions when --agent is given
    #[arg(short, long)]
    list: bool,

    /// Dump and exit
    #[arg(long)]
    no_follow: bool,

    /// Number of recent lines to show before following
    #[arg(short = 'n', default_value_t = DEFAULT_TAIL)]
    tail: usize,

    /// Show request entries (inber format)
    #[arg(short, long)]
    verbose: bool,

    /// State directory (defaults to $OPENCLAW_STATE_DIR or ~/.openclaw)
    #[arg(long)]
    state_dir: Option<PathBuf>,

    /// Disable coloured output
    #[arg(long)]
    no_color: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Diagnostics go to stderr so they never mix with the transcript.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "session_stream=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let color = config::color_enabled(args.no_color, std::io::stdout().is_terminal());
    if let Err(e) = run(args, color).await {
        let theme = Theme::new(std::io::stderr().is_terminal());
        eprintln!("{}", theme.paint(format!("{e:#}"), error()));
        std::process::exit(1);
    }
}

async fn run(args: Args, color: bool) -> Result<()> {
    let config = Config {
        state_dir: config::resolve_state_dir(args.state_dir.as_deref())?,
        agent: args.agent,
        follow: !args.no_follow,
        tail: args.tail,
        render: RenderOptions {
            verbose: args.verbose,
            color,
        },
    };
    debug!(?config, "resolved configuration");

    let theme = Theme::new(config.render.color);
    if args.list {
        let mut stdout = std::io::stdout();
        return if config.is_default_agent() {
            listing::print_agents(&mut stdout, &config.state_dir, &theme)
        } else {
            listing::print_sessions(&mut stdout, &config.state_dir, &config.agent, &theme)
        };
    }

    let path = match args.path {
        Some(path) => {
            if !path.exists() {
                bail!("file not found: {}", path.display());
            }
            path
        }
        None => latest_session(&config.state_dir, &config.agent)?,
    };

    stream_file(&path, config.follow, config.tail, config.render).await
}

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use log::LevelFilter;
use wrapped_core::{PollSettings, POLL_INTERVAL};
use wrapped_engine::{ApiSettings, DEFAULT_API_BASE};

use super::logging::LogDestination;

pub(crate) const DEFAULT_STATE_FILE: &str = "./.wrapped_state.ron";
pub(crate) const DEFAULT_YEAR: i32 = 2025;

#[derive(Parser)]
#[command(name = "wrapped")]
#[command(about = "Your group chat's year in review, from a WhatsApp export", long_about = None)]
#[command(version)]
pub(crate) struct Cli {
    /// Backend base URL.
    #[arg(long, global = true, env = "WRAPPED_API_BASE", default_value = DEFAULT_API_BASE)]
    pub(crate) api_base: String,

    /// Where the session (job, selection, cached results) is kept.
    #[arg(long, global = true, env = "WRAPPED_STATE_FILE", default_value = DEFAULT_STATE_FILE)]
    pub(crate) state_file: PathBuf,

    /// Log level: trace, debug, info, warn, error or off.
    #[arg(long, global = true, env = "WRAPPED_LOG", default_value = "info", value_parser = parse_log_level)]
    pub(crate) log: LevelFilter,

    #[arg(long, global = true, value_enum, default_value_t = LogDestination::File)]
    pub(crate) log_to: LogDestination,

    /// Give up polling after this many seconds. Unbounded by default.
    #[arg(long, global = true)]
    pub(crate) max_wait: Option<u64>,

    #[command(subcommand)]
    pub(crate) command: Command,
}

impl Cli {
    pub(crate) fn api_settings(&self) -> ApiSettings {
        ApiSettings {
            base_url: self.api_base.clone(),
            ..ApiSettings::default()
        }
    }

    pub(crate) fn poll_settings(&self) -> PollSettings {
        PollSettings {
            interval: POLL_INTERVAL,
            max_duration: self.max_wait.map(Duration::from_secs),
        }
    }
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Upload a chat export (.txt, at most 20MB) and list its participants.
    Upload(UploadArgs),

    /// Show or change which participants are analyzed.
    Select(SelectArgs),

    /// Analyze the uploaded chat and wait for the results.
    Analyze,

    /// Show the current slide.
    Show {
        /// Print every slide instead of the current one.
        #[arg(long)]
        all: bool,
    },

    /// Advance to the next slide.
    Next,

    /// Go back to the previous slide.
    Prev,

    /// Close the deck; the next `show` starts from the first slide.
    Close,

    /// Forget the cached results and the current session.
    Reset,

    /// Upload, analyze and show the first slide. Cached results are shown
    /// without contacting the backend.
    Run {
        #[command(flatten)]
        upload: UploadArgs,
        /// Analyze only these participants (repeatable). Default: everyone.
        #[arg(long = "member")]
        members: Vec<String>,
        /// Ignore cached results.
        #[arg(long)]
        fresh: bool,
    },
}

#[derive(Args)]
pub(crate) struct UploadArgs {
    /// Exported chat file.
    pub(crate) file: PathBuf,
    /// Year the backend should report on.
    #[arg(long, default_value_t = DEFAULT_YEAR)]
    pub(crate) year: i32,
}

#[derive(Args, Default)]
pub(crate) struct SelectArgs {
    /// Flip one participant (repeatable).
    #[arg(long)]
    pub(crate) toggle: Vec<String>,
    /// Select everyone unless everyone is already selected.
    #[arg(long)]
    pub(crate) toggle_all: bool,
    /// Select everyone.
    #[arg(long, conflicts_with = "none")]
    pub(crate) all: bool,
    /// Deselect everyone.
    #[arg(long)]
    pub(crate) none: bool,
}

fn parse_log_level(raw: &str) -> Result<LevelFilter, String> {
    wrapped_logging::parse_level(raw).ok_or_else(|| format!("unknown log level `{raw}`"))
}

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use wrapped_core::FlowError;
use wrapped_engine::{ApiGateway, KeyValueStore, ReqwestApi, RonFileStore};
use wrapped_logging::{wrapped_error, wrapped_info};

use super::cli::{Cli, Command};
use super::flow::Wizard;
use super::logging;
use super::render::{self, TerminalSink};

const RESTART_HINT: &str = "Start over with `wrapped upload <chat.txt>`.";

pub fn run_app() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::initialize(cli.log_to, cli.log);
    wrapped_info!("wrapped starting");

    let api: Arc<dyn ApiGateway> =
        Arc::new(ReqwestApi::new(cli.api_settings()).context("invalid --api-base")?);
    let store = RonFileStore::open(&cli.state_file);
    wrapped_info!("session state file {:?}", store.path());
    let store: Arc<dyn KeyValueStore> = Arc::new(store);
    let wizard = Wizard::new(api, store, cli.poll_settings());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start the async runtime")?;
    runtime.block_on(dispatch(&wizard, cli.command))
}

async fn dispatch(wizard: &Wizard, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Upload(args) => {
            let response = wizard
                .upload(&args.file, args.year)
                .await
                .map_err(surface)?;
            if let Some(group) = &response.group_name {
                println!("{group}");
            }
            if let Some(selection) = wizard.selection() {
                print!("{}", render::render_selection(&selection));
            }
            println!("Next: `wrapped select --toggle <name>` or `wrapped analyze`.");
        }
        Command::Select(args) => {
            let selection = wizard.select(&args)?;
            print!("{}", render::render_selection(&selection));
        }
        Command::Analyze => {
            let cancel = cancel_on_ctrl_c();
            report(wizard.analyze(&cancel, &TerminalSink).await)?;
            print!("{}", render::render_deck(&wizard.require_deck()?));
        }
        Command::Show { all } => {
            let deck = wizard.require_deck()?;
            if all {
                print!("{}", render::render_all(&deck));
            } else {
                print!("{}", render::render_deck(&deck));
            }
        }
        Command::Next => print!("{}", render::render_deck(&wizard.next()?)),
        Command::Prev => print!("{}", render::render_deck(&wizard.prev()?)),
        Command::Close => wizard.close()?,
        Command::Reset => {
            wizard.reset()?;
            println!("Session cleared.");
        }
        Command::Run {
            upload,
            members,
            fresh,
        } => {
            let cancel = cancel_on_ctrl_c();
            let result = wizard
                .run(&upload.file, upload.year, &members, fresh, &cancel, &TerminalSink)
                .await;
            print!("{}", render::render_deck(&result.map_err(surface)?));
        }
    }
    Ok(())
}

/// Converts a stopped flow into the message the user sees.
fn report<T>(result: Result<T, FlowError>) -> anyhow::Result<T> {
    result.map_err(reported)
}

/// Like [`report`] for errors that may or may not carry a [`FlowError`].
fn surface(err: anyhow::Error) -> anyhow::Error {
    match err.downcast::<FlowError>() {
        Ok(flow) => reported(flow),
        Err(other) => other,
    }
}

fn reported(err: FlowError) -> anyhow::Error {
    wrapped_error!("analysis flow failed: {}", err);
    anyhow::anyhow!(failure_text(&err))
}

fn failure_text(err: &FlowError) -> String {
    if err.is_retryable() {
        format!("{} {}", err.user_message(), RESTART_HINT)
    } else {
        err.user_message()
    }
}

fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            trigger.cancel();
        }
    });
    cancel
}

//! `qra-sim`: runs the quick-reply assistant against a recorded host page.
//!
//! Usage:
//!   qra-sim --page bar.html --host host.json show
//!   qra-sim --page bar.html --host host.json whitelist JSR::abc
//!   qra-sim --page bar.html --host host.json remove script_container_abc
//!
//! Settings persist in `qr_assistant.json` under `--settings-dir`.

mod logging;
mod render;

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use assistant_core::{Column, Msg, SettingChange, SourceIdentity};
use assistant_engine::sources::{HostSnapshot, StaticHost};
use assistant_engine::{Assistant, Dom, EngineConfig, JsonFileSettingsStore, MixedContentPolicy};
use assistant_logging::{log_ring, qra_info, LogCategory};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};

use crate::logging::LogDestination;

#[derive(Parser, Debug)]
#[command(name = "qra-sim")]
#[command(about = "Replay the quick-reply assistant against a recorded page")]
struct Args {
    /// HTML of the host region holding the action bar
    #[arg(long)]
    page: PathBuf,

    /// JSON snapshot of the providers' state
    #[arg(long)]
    host: PathBuf,

    /// Directory holding the assistant's settings file
    #[arg(long, default_value = ".")]
    settings_dir: PathBuf,

    #[arg(long, value_enum, default_value_t = LogDestination::Terminal)]
    log: LogDestination,

    #[arg(short, long)]
    verbose: bool,

    /// Only whitelisted or protected containers keep their parent visible
    #[arg(long)]
    containers_only: bool,

    /// Print the in-memory log history before exiting
    #[arg(long)]
    dump_log: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the popup, the whitelist panel and the bar
    Show,
    /// Toggle a source identity such as `JSR::abc` in the whitelist
    Whitelist { identity: String },
    /// Open the popup and click an entry
    Click { column: ColumnArg, index: usize },
    /// Remove an element, let healing run, and print the result
    Remove { element_id: String },
    /// Turn the assistant on or off
    Enable {
        #[arg(action = ArgAction::Set)]
        on: bool,
    },
    /// Turn label de-duplication on or off
    Dedup {
        #[arg(action = ArgAction::Set)]
        on: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ColumnArg {
    Scripts,
    Standard,
}

impl From<ColumnArg> for Column {
    fn from(arg: ColumnArg) -> Self {
        match arg {
            ColumnArg::Scripts => Column::Scripts,
            ColumnArg::Standard => Column::Standard,
        }
    }
}

/// Feeds pending mutations and moves the clock past the quiet period until
/// healing and its follow-up pass have both run.
async fn settle(assistant: &mut Assistant, dom: &mut Dom, mut now: Instant) -> Instant {
    let step = assistant.config().quiet_period + Duration::from_millis(1);
    for _ in 0..3 {
        assistant.observe(dom, now).await;
        now += step;
        assistant.tick(dom, now).await;
    }
    now
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::initialize(args.log, args.verbose);

    let markup = fs::read_to_string(&args.page)
        .with_context(|| format!("reading page {}", args.page.display()))?;
    let host_text = fs::read_to_string(&args.host)
        .with_context(|| format!("reading host snapshot {}", args.host.display()))?;
    let snapshot = HostSnapshot::from_json(&host_text)
        .with_context(|| format!("parsing host snapshot {}", args.host.display()))?;

    let mut dom = Dom::parse_html(&markup);
    let mut host = StaticHost::new(snapshot);
    host.bind_dom(&dom);
    let host = Arc::new(host);

    let config = EngineConfig {
        mixed_content: if args.containers_only {
            MixedContentPolicy::ContainersOnly
        } else {
            MixedContentPolicy::DescendantScan
        },
        ..EngineConfig::default()
    };
    let store = Arc::new(JsonFileSettingsStore::new(args.settings_dir.clone()));
    qra_info!(LogCategory::System; "settings file: {}", store.path().display());

    let mut assistant = Assistant::new(config, host.providers(), store);
    let started = Instant::now();
    assistant.start(&mut dom, started).await;
    let mut now = settle(&mut assistant, &mut dom, started).await;

    match args.command {
        Command::Show => {}
        Command::Whitelist { identity } => {
            let identity = SourceIdentity::new(identity);
            if identity.tag().is_none() {
                bail!("{identity} is not a source identity (expected QRV2::, JSR:: or LWB::)");
            }
            assistant
                .dispatch(&mut dom, Msg::WhitelistToggled(identity))
                .await;
        }
        Command::Click { column, index } => {
            assistant.dispatch(&mut dom, Msg::MenuButtonClicked).await;
            assistant
                .dispatch(
                    &mut dom,
                    Msg::EntryClicked {
                        column: column.into(),
                        index,
                    },
                )
                .await;
            for call in host.calls() {
                println!("host call: {call}");
            }
        }
        Command::Remove { element_id } => {
            let Some(node) = dom.get_element_by_id(&element_id) else {
                bail!("no element #{element_id} on the page");
            };
            dom.remove(node)?;
            now = settle(&mut assistant, &mut dom, now).await;
            qra_info!(
                LogCategory::System;
                "healing restored {} containers",
                assistant.last_heal().restored_count()
            );
        }
        Command::Enable { on } => {
            assistant
                .dispatch(&mut dom, Msg::SettingChanged(SettingChange::Enabled(on)))
                .await;
        }
        Command::Dedup { on } => {
            assistant
                .dispatch(&mut dom, Msg::SettingChanged(SettingChange::LabelDedup(on)))
                .await;
        }
    }
    assistant.tick(&mut dom, now).await;

    let view = assistant.view();
    print!("{}", render::render_menu(&view));
    println!();
    print!("{}", render::render_panel(&view));
    println!();
    println!("{}", assistant.structure_dump(&dom));

    if args.dump_log {
        println!();
        println!("{}", log_ring().export());
    }
    Ok(())
}

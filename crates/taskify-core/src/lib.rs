pub mod cli;
pub mod codec;
pub mod commands;
pub mod config;
pub mod error;
pub mod events;
pub mod filter;
pub mod list;
pub mod render;
pub mod reorder;
pub mod store;
pub mod task;
pub mod theme;

use std::ffi::OsString;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, info};

#[tracing::instrument(skip_all)]
pub fn run(raw_args: Vec<OsString>) -> anyhow::Result<()> {
    let pre = cli::preprocess_args(&raw_args)?;
    let cli = cli::GlobalCli::parse_from(pre.cleaned_args);

    cli::init_tracing(cli.verbose, cli.quiet)?;

    info!(verbose = cli.verbose, quiet = cli.quiet, "starting taskify CLI");
    debug!(?pre.rc_overrides, "preprocessed rc overrides");

    let mut cfg = config::Config::load(cli.rcfile.as_deref())?;
    cfg.apply_overrides(
        pre.rc_overrides
            .into_iter()
            .chain(cli.rc_overrides.into_iter().map(|kv| (kv.key, kv.value))),
    );

    let data_dir = config::resolve_data_dir(&cfg, cli.data.as_deref())
        .context("failed to resolve data directory")?;

    let store = store::FileStore::open(&data_dir)
        .with_context(|| format!("failed to open store at {}", data_dir.display()))?;

    // Theme and tasks are restored before any command runs or renders.
    let mut app = events::App::load(store);
    let mut renderer = render::Renderer::new(&cfg)?;
    let inv = cli::Invocation::parse(&cfg, cli.rest)?;

    commands::dispatch(&mut app, &cfg, &mut renderer, inv)?;

    info!("done");
    Ok(())
}

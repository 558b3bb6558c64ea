//! Keep `bspwm`'s monitors and desktops in line with the displays that are
//! plugged in

// monitor -> desktop -> node -> client

#![deny(
    clippy::all,
    clippy::complexity,
    clippy::correctness,
    clippy::nursery,
    clippy::pedantic,
    clippy::perf,
    clippy::style,
    absolute_paths_not_starting_with_crate,
    anonymous_parameters,
    bad_style,
    ellipsis_inclusive_range_patterns,
    exported_private_dependencies,
    ill_formed_attribute_input,
    improper_ctypes,
    keyword_idents,
    macro_use_extern_crate,
    meta_variable_misuse,
    missing_abi,
    no_mangle_generic_items,
    non_shorthand_field_patterns,
    noop_method_call,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    semicolon_in_expressions_from_macros,
    trivial_casts,
    trivial_numeric_casts,
    unconditional_recursion,
    unreachable_pub,
    unsafe_code,
    while_true
)]
#![allow(
    clippy::doc_markdown,
    clippy::module_name_repetitions,
    clippy::redundant_pub_crate,
    clippy::similar_names,
    clippy::missing_errors_doc,
    clippy::expect_used,
    clippy::exit,
    clippy::indexing_slicing,
    clippy::print_stderr,
    clippy::use_debug,
)]
#![cfg_attr(
    any(test),
    allow(
        clippy::expect_fun_call,
        clippy::expect_used,
        clippy::panic,
        clippy::panic_in_result_fn,
        clippy::unwrap_in_result,
        clippy::unwrap_used,
        clippy::wildcard_enum_match_arm,
    )
)]

mod bspc;
mod cli;
mod config;
mod error;
mod macros;
mod monitor;
mod reconcile;
mod tree;
mod utils;
mod watcher;
mod x;

use anyhow::{Context, Result};
use bspc::{Bspc, BspcClient, DryRun};
use clap::Parser;
use cli::Opts;
use colored::Colorize;
use config::Config;
use reconcile::Reconciler;
use watcher::Watcher;
use x::xconnection::XConnection;

fn main() {
    if let Err(e) = run() {
        bspmon_fatal!("{:#}", e);
    }
}

/// Parse arguments, set up logging and hand off to [`start`]
fn run() -> Result<()> {
    let args = Opts::parse();

    match args.color_when.as_deref() {
        Some("always") => colored::control::set_override(true),
        Some("never") => colored::control::set_override(false),
        _ => {},
    }

    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };
    let _logger = utils::initialize_logging(&config, &args)?;
    log::debug!("{}: {:#?}", "Configuration options".bright_blue(), config);

    let reconciler = Reconciler::new(
        config.global.reconcile_settings(),
        config.global.primary_poll_interval(),
    );
    let bspc = BspcClient::new(config.global.bspc.clone());

    if args.dry_run {
        start(&args, &config, &reconciler, &DryRun::new(bspc))
    } else {
        start(&args, &config, &reconciler, &bspc)
    }
}

/// Reconcile once, or watch for hotplugs until the X connection goes away
fn start<B: Bspc>(args: &Opts, config: &Config, reconciler: &Reconciler, bspc: &B) -> Result<()> {
    let xconn = XConnection::new().context("failed to set up the X11 connection")?;

    if args.once {
        return reconciler.run_pass(bspc, &xconn);
    }

    xconn.subscribe()?;
    bspmon_info!("watching for monitors being plugged in or unplugged");

    let watcher = Watcher::new(reconciler, bspc, &xconn, config.global.settle_delay());
    let passes = watcher.run(xconn.hotplugs())?;
    log::info!("stopped watching after {} successful passes", passes);

    Ok(())
}

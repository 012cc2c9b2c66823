// SPDX-FileCopyrightText: 2021–2022, 2025 Felix Gruber
//
// SPDX-License-Identifier: GPL-3.0-or-later

use anyhow::bail;
use clap::{crate_name, crate_version, Arg, ArgAction, Command};
use tracing::Level;

use tvgen_rs::tv_pong::commandline;

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .compact()
        .init();
}

fn main() -> anyhow::Result<()> {
    let matches = Command::new(crate_name!())
        .about("A software NTSC video generator playing Pong.")
        .version(crate_version!())
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .help("log game events")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
        )
        .subcommand(commandline::play_subcommand())
        .subcommand(commandline::render_subcommand())
        .get_matches();
    setup_logging(matches.get_flag("verbose"));
    match matches.subcommand() {
        Some(("play", matches)) => {
            commandline::run_play_from_subcommand(matches)
        }
        Some(("render", matches)) => {
            commandline::run_render_from_subcommand(matches)
        }
        Some((s, _)) => {
            bail!("Unknown subcommand: {}", s);
        }
        None => {
            bail!("Missing subcommand.");
        }
    }
}

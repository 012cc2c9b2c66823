// SPDX-FileCopyrightText: 2025 Felix Gruber
//
// SPDX-License-Identifier: GPL-3.0-or-later

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};

use super::config::{Config, VideoConfig};
use super::hardware::PaddleChannel;
use super::simulator::{ManualPaddles, NoisyPaddles, SimulatedHardware};
use super::timing::FieldTiming;
use super::tv_window::TvWindow;
use super::{TvPong, FIELD_RATE};

/// Change of the paddle reading per field while a key is held.
const PADDLE_KEY_STEP: i16 = 6;

fn video_args(command: Command) -> Command {
    command
    .arg(
        Arg::new("line-repeat")
            .help("scan lines per framebuffer row")
            .long("line-repeat")
            .default_value("4")
            .value_parser(value_parser!(u16))
    )
    .arg(
        Arg::new("row-bytes")
            .help("pixel bytes per scan line, 8 pixels each")
            .long("row-bytes")
            .default_value("11")
            .value_parser(value_parser!(u16).range(1..=26))
    )
    .arg(
        Arg::new("equalizing-lines")
            .help("equalizing lines before and after vertical sync")
            .long("equalizing-lines")
            .default_value("0")
            .value_parser(value_parser!(u16))
    )
    .arg(
        Arg::new("invert")
            .help("invert pixel bytes for an inverting buffer on the pixel pin")
            .long("invert")
            .action(ArgAction::SetTrue)
    )
    .arg(
        Arg::new("ball-velocity")
            .help("fields per ball step (1 = fastest)")
            .long("ball-velocity")
            .default_value("3")
            .value_parser(value_parser!(u8).range(1..))
    )
    .arg(
        Arg::new("adc-noise")
            .help("jitter of the simulated paddle readings")
            .long("adc-noise")
            .default_value("0")
            .value_parser(value_parser!(u8))
    )
    .arg(
        Arg::new("seed")
            .help("seed for the paddle jitter")
            .long("seed")
            .default_value("0")
            .value_parser(value_parser!(u64))
    )
}

pub fn play_subcommand() -> Command {
    video_args(
        Command::new("play")
        .about("Play Pong on a simulated TV (W/S and Up/Down move the paddles)")
    )
}

pub fn render_subcommand() -> Command {
    video_args(
        Command::new("render")
        .about("Run the generator headless and print what the TV shows")
        .arg(
            Arg::new("fields")
                .help("number of fields to generate")
                .long("fields")
                .default_value("120")
                .value_parser(value_parser!(u64))
        )
        .arg(
            Arg::new("left")
                .help("left paddle reading")
                .long("left")
                .default_value("128")
                .value_parser(value_parser!(u8))
        )
        .arg(
            Arg::new("right")
                .help("right paddle reading")
                .long("right")
                .default_value("128")
                .value_parser(value_parser!(u8))
        )
        .arg(
            Arg::new("framebuffer")
                .help("print the framebuffer instead of the decoded picture")
                .long("framebuffer")
                .action(ArgAction::SetTrue)
        )
    )
}

fn value<T: Clone + Send + Sync + 'static>(matches: &ArgMatches,
                                           id: &str) -> anyhow::Result<T> {
    matches.get_one::<T>(id)
           .cloned()
           .with_context(|| format!("missing value for --{}", id))
}

fn config_from_matches(matches: &ArgMatches) -> anyhow::Result<Config> {
    let video = VideoConfig {
        field: FieldTiming::NTSC
                   .with_equalizing(value(matches, "equalizing-lines")?),
        line_repeat: value(matches, "line-repeat")?,
        row_bytes: value(matches, "row-bytes")?,
        invert_pixels: matches.get_flag("invert"),
        ..VideoConfig::default()
    };
    let mut config = Config::new(video);
    config.game.ball_velocity = value(matches, "ball-velocity")?;
    Ok(config)
}

fn paddles_from_matches(matches: &ArgMatches, paddles: ManualPaddles)
        -> anyhow::Result<NoisyPaddles<ManualPaddles>> {
    Ok(NoisyPaddles::new(paddles,
                         value(matches, "adc-noise")?,
                         value(matches, "seed")?))
}

pub fn run_play_from_subcommand(matches: &ArgMatches) -> anyhow::Result<()> {
    let config = config_from_matches(matches)?;
    let paddles = paddles_from_matches(matches, ManualPaddles::default())?;
    let hardware = SimulatedHardware::new(&config.video, paddles);
    let mut pong = TvPong::new(config, hardware)
        .context("cannot start the video generator")?;
    let mut window = TvWindow::new(config.video.width() as usize,
                                   config.video.field.active_lines as usize,
                                   FIELD_RATE)?;
    while window.is_open() && !window.is_esc_pressed() {
        for channel in [PaddleChannel::Left, PaddleChannel::Right] {
            let movement = window.paddle_movement(channel) * PADDLE_KEY_STEP;
            pong.hardware_mut().paddles_mut().inner_mut()
                .nudge(channel, movement);
        }
        pong.run_field();
        window.refresh(pong.hardware().receiver().picture())?;
    }
    Ok(())
}

pub fn run_render_from_subcommand(matches: &ArgMatches) -> anyhow::Result<()> {
    let config = config_from_matches(matches)?;
    let paddles = paddles_from_matches(
        matches,
        ManualPaddles::new(value(matches, "left")?, value(matches, "right")?),
    )?;
    let hardware = SimulatedHardware::new(&config.video, paddles);
    let mut pong = TvPong::new(config, hardware)
        .context("cannot start the video generator")?;
    let fields: u64 = value(matches, "fields")?;
    for _ in 0..fields {
        pong.run_field();
    }

    let receiver = pong.hardware().receiver();
    if matches.get_flag("framebuffer") {
        print!("{}", pong.framebuffer());
    } else {
        print!("{}", receiver.picture());
    }
    let stats = receiver.last_field();
    println!("fields: {}, lines: {}, vsync pulses: {}, video lines: {}, \
              widest line: {} bits, overruns: {}",
             receiver.fields(), stats.lines, stats.long_pulses,
             stats.video_lines, stats.widest_line_bits, stats.overruns);
    let score = pong.game().score();
    println!("score: {} - {}", score.left(), score.right());
    Ok(())
}

use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use clap::Parser;
use client_core::CoinView;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod controller;
mod ui;

use config::load_settings;
use controller::{
    commands::{parse_command, HELP},
    orchestration::{seed_platform, Outcome, Session},
};
use ui::render::{render_json, render_view};

#[derive(Parser, Debug)]
#[command(about = "Track coins with live updates from other clients")]
struct Args {
    /// Path to a TOML config file (defaults to ./coin_tracker.toml if present).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print every view as JSON instead of the text form.
    #[arg(long)]
    json: bool,
}

fn print_view(view: &CoinView, json: bool) {
    if json {
        match render_json(view) {
            Ok(out) => println!("{out}"),
            Err(error) => warn!(%error, "failed to serialize view"),
        }
    } else {
        print!("{}", render_view(view));
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let settings = load_settings(args.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&settings.log_filter))
        .with_writer(std::io::stderr)
        .init();

    let platform = Arc::new(seed_platform(settings.feed_capacity, &settings.seed));
    let session = Session::new(platform, settings.peer_name.clone());
    info!(client_id = %session.tracker.client_id(), "coin tracker starting");

    if let Some(problems) = session.start().await {
        println!("{problems}");
    }
    println!("{HELP}");

    let mut views = session.tracker.watch_view();
    let mut last_rendered = views.borrow_and_update().clone();
    print_view(&last_rendered, args.json);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                let command = match parse_command(&line) {
                    Ok(command) => command,
                    Err(controller::commands::CommandError::Empty) => continue,
                    Err(err) => {
                        println!("{err}");
                        continue;
                    }
                };

                match session.execute(command).await {
                    Outcome::Quit => break,
                    Outcome::ShowJson => print_view(&session.tracker.view(), true),
                    Outcome::Continue { status } => {
                        if let Some(status) = status {
                            println!("{status}");
                        }
                        last_rendered = session.tracker.view();
                        print_view(&last_rendered, args.json);
                    }
                }
            }
            changed = views.changed() => {
                if changed.is_err() {
                    break;
                }
                // Pushes from other clients; local commands render themselves.
                let view = views.borrow_and_update().clone();
                if view.coins != last_rendered.coins {
                    println!("-- update --");
                    print_view(&view, args.json);
                    last_rendered = view;
                }
            }
        }
    }

    session.shutdown().await;
    info!("coin tracker stopped");
    Ok(())
}

mod args;
mod demo;

use std::io;
use std::process::ExitCode;

use md_typist::render::{render_document, HtmlSurface, Renderer, TermSurface};
use md_typist::{Outcome, Scheduler};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::args::Args;

fn setup_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    setup_logging();

    let argv: Vec<String> = std::env::args().skip(1).collect();
    let (args, unrecognized) = Args::parse(&argv);
    for arg in &unrecognized {
        warn!("ignoring unrecognized argument {arg}");
    }

    let text = match &args.file {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                error!("could not read {path}: {err}");
                return ExitCode::FAILURE;
            }
        },
        None => demo::DEMO.to_string(),
    };

    let scheduler = match Scheduler::new(args.pacing()) {
        Ok(scheduler) => scheduler,
        Err(err) => {
            error!("bad pacing: {err}");
            return ExitCode::FAILURE;
        }
    };

    let mut renderer = match Renderer::attach(TermSurface::new(io::stdout()), "stdout", args.mode)
    {
        Ok(renderer) => renderer,
        Err(err) => {
            error!("could not attach renderer: {err}");
            return ExitCode::FAILURE;
        }
    };

    let cancel = scheduler.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    match scheduler.run(&text, &mut renderer).await {
        Outcome::Completed { units } => info!("streamed {units} units"),
        Outcome::Cancelled { delivered } => info!("cancelled after {delivered} units"),
    }

    if args.finalize {
        renderer.finalize();
    } else {
        renderer.end_stream();
    }

    if args.html {
        let mut html = HtmlSurface::default();
        if let Err(err) = render_document(&mut html, renderer.document()) {
            error!("html render failed: {err}");
            return ExitCode::FAILURE;
        }
        println!("{}", html.html());
    }

    if args.json {
        match serde_json::to_string_pretty(renderer.document()) {
            Ok(json) => println!("{json}"),
            Err(err) => {
                error!("could not serialize document: {err}");
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}

use std::collections::BTreeSet;
use std::time::Duration;

use md_typist::{Pacing, RenderMode};
use tracing::error;

pub struct Args {
    pub file: Option<String>,
    pub pacing: Pacing,
    pub delay: Option<Duration>,
    pub seed: Option<u64>,
    pub mode: RenderMode,
    pub finalize: bool,
    pub html: bool,
    pub json: bool,
}

impl Default for Args {
    fn default() -> Self {
        Args {
            file: None,
            pacing: Pacing::default(),
            delay: None,
            seed: None,
            mode: RenderMode::Incremental,
            finalize: false,
            html: false,
            json: false,
        }
    }
}

fn parse_number<T: std::str::FromStr>(args: &[String], i: usize, what: &str) -> Option<T> {
    let Some(value) = args.get(i) else {
        error!("{what} argument missing?");
        return None;
    };

    let parsed = value.parse().ok();
    if parsed.is_none() {
        error!("failed to parse {what} argument '{value}'");
    }
    parsed
}

impl Args {
    // parse arguments, return set of unrecognized args
    pub fn parse(args: &[String]) -> (Self, BTreeSet<String>) {
        let mut unrecognized_args = BTreeSet::new();
        let mut res = Args::default();

        let mut i = 0;
        let len = args.len();
        while i < len {
            let arg = &args[i];

            if arg == "--chars" {
                res.pacing = Pacing::default();
            } else if arg == "--char-by-char" {
                res.pacing = Pacing::character_by_character();
            } else if arg == "--chunks" {
                i += 1;
                if let Some(target) = parse_number(args, i, "chunks") {
                    res.pacing = Pacing::Chunks {
                        target,
                        delay: Pacing::chunks().delay(),
                    };
                }
            } else if arg == "--tokens" {
                let min = parse_number(args, i + 1, "tokens min");
                let max = parse_number(args, i + 2, "tokens max");
                i += 2;
                if let (Some(min), Some(max)) = (min, max) {
                    res.pacing = Pacing::Tokens {
                        min,
                        max,
                        delay: Pacing::model_tokens(0).delay(),
                        seed: 0,
                    };
                }
            } else if arg == "--delay" {
                i += 1;
                res.delay = parse_number(args, i, "delay").map(Duration::from_millis);
            } else if arg == "--seed" {
                i += 1;
                res.seed = parse_number(args, i, "seed");
            } else if arg == "--rerender" {
                res.mode = RenderMode::Rerender;
            } else if arg == "--finalize" {
                res.finalize = true;
            } else if arg == "--html" {
                res.html = true;
            } else if arg == "--json" {
                res.json = true;
            } else if !arg.starts_with('-') && res.file.is_none() {
                res.file = Some(arg.clone());
            } else {
                unrecognized_args.insert(arg.clone());
            }

            i += 1;
        }

        (res, unrecognized_args)
    }

    /// The pacing to stream with, after `--delay` and `--seed` overrides.
    pub fn pacing(&self) -> Pacing {
        let mut pacing = self.pacing.clone();
        if let (Pacing::Tokens { seed, .. }, Some(new_seed)) = (&mut pacing, self.seed) {
            *seed = new_seed;
        }
        match self.delay {
            Some(delay) => pacing.with_delay(delay),
            None => pacing,
        }
    }
}

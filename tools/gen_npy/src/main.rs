use error_stack::{fmt::{Charset, ColorMode}, Report};
use npy_fixtures::{FixtureSet, GenerateOptions, DEFAULT_OUTPUT_DIR};
use tracing::Level;
use tracing_error::ErrorLayer;
use tracing_subscriber::{prelude::*, FmtSubscriber};
use std::{env, path::PathBuf, process::ExitCode};

const HELP: &str = "\
Writes a.npy, b.npy and c.npy: float32 fixtures for an (M x K) . (K x N) matrix product

USAGE:
  gen_npy [OPTIONS]

OPTIONS:
  --out-dir DIR     Output directory [default: custom_test/npy_data]
  --shape M,K,N     Matrix dimensions [default: 7,5,3]
  --seed N          Seed the random source for reproducible values
  --create-dirs     Create the output directory if it doesn't exist
  -h, --help        Print this message

Set RUST_LOG to one of error, warn, info, debug, trace to enable logging.
";

fn parse_shape(s: &str) -> Result<[usize; 3], String> {
    let dims = s.split(',')
        .map(|d| d.trim().parse::<usize>().map_err(|e| format!("invalid dimension \"{d}\": {e}")))
        .collect::<Result<Vec<_>, _>>()?;
    match dims.as_slice() {
        &[m, k, n] => Ok([m, k, n]),
        _ => Err(format!("expected three comma-separated dimensions M,K,N, found \"{s}\"")),
    }
}

/// Maximum log level from `RUST_LOG`, if it's set to something usable
fn log_level() -> Option<Level> {
    let value = env::var_os("RUST_LOG")?;
    match value.to_str().map(str::parse::<Level>) {
        Some(Ok(level)) => Some(level),
        _ => {
            eprintln!("Ignoring RUST_LOG={value:?}: expected error, warn, info, debug, or trace");
            None
        },
    }
}

// a bad RUST_LOG only costs us the logs; fixtures are still generated
fn init_logging() {
    let Some(level) = log_level() else { return };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish()
        .with(ErrorLayer::default());
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Logging disabled, couldn't install subscriber: {e}");
    }
}

fn main() -> ExitCode {
    let supports_color = supports_color::on_cached(supports_color::Stream::Stderr)
        .map_or(false, |level| level.has_basic);
    Report::set_color_mode(if supports_color { ColorMode::Color } else { ColorMode::None });

    let supports_unicode = supports_unicode::on(supports_unicode::Stream::Stderr);
    Report::set_charset(if supports_unicode { Charset::Utf8 } else { Charset::Ascii });

    init_logging();

    let mut args = pico_args::Arguments::from_env();
    if args.contains(["-h", "--help"]) {
        print!("{HELP}");
        return ExitCode::SUCCESS;
    }

    let parsed = (|| -> Result<_, pico_args::Error> {
        let out_dir: Option<PathBuf> = args.opt_value_from_str("--out-dir")?;
        let shape = args.opt_value_from_fn("--shape", parse_shape)?;
        let seed: Option<u64> = args.opt_value_from_str("--seed")?;
        let create_dirs = args.contains("--create-dirs");
        Ok((out_dir, shape, seed, create_dirs))
    })();
    let (out_dir, shape, seed, create_dirs) = match parsed {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("{e}\n\n{HELP}");
            return ExitCode::from(2);
        },
    };
    let remaining = args.finish();
    if !remaining.is_empty() {
        eprintln!("Unrecognized arguments: {remaining:?}\n\n{HELP}");
        return ExitCode::from(2);
    }

    let mut opts = GenerateOptions::in_dir(out_dir.unwrap_or_else(|| DEFAULT_OUTPUT_DIR.into()));
    opts.seed = seed;
    opts.create_dirs = create_dirs;

    let [m, k, n] = shape.unwrap_or([7, 5, 3]);
    let set = FixtureSet::matmul(m, k, n);
    match set.generate(&opts) {
        Ok(files) => {
            for file in files {
                println!("{} {:?} {} bytes", file.path.display(), file.shape, file.bytes);
            }
            ExitCode::SUCCESS
        },
        Err(report) => {
            eprintln!("{report:?}");
            ExitCode::FAILURE
        },
    }
}

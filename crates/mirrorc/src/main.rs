//! Mirror CLI
//!
//! Loads a JSON declaration manifest and prints the C# signature (or display
//! name) of every declared type and member.

mod listing;
mod options;

use std::sync::Once;

use mirror_symbols::SymbolCache;
use options::CliOptions;

static TRACING_INIT: Once = Once::new();

/// Install a subscriber when `RUST_LOG` is set, e.g.
/// `RUST_LOG=mirror_symbols=trace`.
fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}

fn main() {
    init_tracing();
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    match args[1].as_str() {
        "help" | "--help" | "-h" => print_usage(),
        "version" | "--version" | "-V" => {
            println!("Mirror {}", env!("CARGO_PKG_VERSION"));
        }
        _ => {
            let options = match CliOptions::parse(&args[1..]) {
                Ok(options) => options,
                Err(error) => {
                    eprintln!("error: {error}");
                    eprintln!();
                    print_usage();
                    std::process::exit(1);
                }
            };
            run(&options);
        }
    }
}

fn run(options: &CliOptions) {
    let universe = match mirror_meta::manifest::load_path(&options.manifest) {
        Ok(universe) => universe,
        Err(error) => {
            eprintln!("error: {error}");
            std::process::exit(1);
        }
    };
    tracing::debug!(
        manifest = %options.manifest.display(),
        types = universe.type_count(),
        "manifest loaded"
    );

    let cache = SymbolCache::new(universe);
    match listing::render(&cache, options) {
        Ok(text) => print!("{text}"),
        Err(error) => {
            eprintln!("error: {error}");
            std::process::exit(1);
        }
    }
    let stats = cache.stats();
    tracing::debug!(
        symbols = stats.symbols,
        hits = stats.hits,
        misses = stats.misses,
        derivations = stats.derivations,
        "cache statistics"
    );
}

fn print_usage() {
    println!("Mirror (C# declarations from a metadata manifest)");
    println!();
    println!("Usage: mirror <manifest.json> [options]");
    println!();
    println!("Options:");
    println!("  --qualified, -q     Qualify type names with namespaces");
    println!("  --compact, -c       Omit custom attributes");
    println!("  --type=<name>       Only list one type (full or simple name)");
    println!("  --names, -n         Print display names instead of signatures");
    println!("  help                Show this help message");
    println!("  version             Show version information");
    println!();
    println!("Examples:");
    println!("  mirror api.json");
    println!("  mirror api.json --type=Acme.Collections.Bag`1 --qualified");
    println!("  RUST_LOG=mirror_symbols=debug mirror api.json --names");
}

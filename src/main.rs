use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use amalgam_instrument::catalogue::{Catalogue, DEFAULT_GUARD};
use amalgam_instrument::error::Error;
use amalgam_instrument::report::{format_summary, format_verdict, to_json};
use amalgam_instrument::run::run;
use amalgam_instrument::source_file::{read_source, write_source};
use amalgam_instrument::validate::{CountPolicy, DEFAULT_MIN_HOOKS, Validation, validate};

#[derive(Parser)]
#[command(
    name = "amalgam-instrument",
    about = "Inject guarded visualization hooks into a SQLite amalgamation",
    version,
    after_help = "Re-running against an instrumented file is safe: hooks already present are left alone."
)]
struct Cli {
    /// Path to the amalgamated source (e.g. sqlite3.c). Rewritten in place.
    path: PathBuf,

    /// Fail unless at least this many hooks are in place after the run.
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MIN_HOOKS)]
    min_hooks: usize,

    /// Count only hooks inserted by this run toward --min-hooks.
    #[arg(long)]
    fresh_only: bool,

    /// Preprocessor macro guarding every inserted fragment.
    #[arg(long, value_name = "MACRO", default_value = DEFAULT_GUARD)]
    guard: String,

    /// Run the pipeline and report, but leave the file untouched.
    #[arg(long)]
    dry_run: bool,

    /// Print the per-hook report as JSON on stdout.
    #[arg(long)]
    json: bool,
}

fn main() {
    init_logging();
    let cli = Cli::parse();
    if let Err(e) = instrument(cli) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn init_logging() {
    let default_level = "warn";
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(default_level))
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

fn instrument(cli: Cli) -> Result<(), Error> {
    let catalogue = Catalogue::builtin(&cli.guard)?;
    let policy = if cli.fresh_only {
        CountPolicy::FreshOnly
    } else {
        CountPolicy::Installed
    };

    let source = read_source(&cli.path)?;
    eprintln!("read {} bytes from {}", source.len(), cli.path.display());

    let original_len = source.len();
    let (instrumented, report) = run(source, &catalogue);

    anstream::eprint!("\n{}", format_summary(&report));
    if cli.json {
        println!("{}", to_json(&report)?);
    }

    // Partial instrumentation is still written; the threshold only decides the
    // exit status.
    if cli.dry_run {
        eprintln!("dry run: {} left unchanged", cli.path.display());
    } else if instrumented.len() != original_len {
        write_source(&cli.path, &instrumented)?;
        eprintln!(
            "wrote {} (+{} bytes)",
            cli.path.display(),
            instrumented.len() - original_len
        );
    } else {
        eprintln!("no changes to {}", cli.path.display());
    }

    let validation = validate(&report, cli.min_hooks, policy);
    anstream::eprint!(
        "{}",
        format_verdict(&report, validation, cli.min_hooks, policy)
    );
    match validation {
        Validation::Pass => Ok(()),
        Validation::Fail { counted, minimum } => Err(Error::ThresholdNotMet { counted, minimum }),
    }
}

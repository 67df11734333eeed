//! quire - split large EPUB files into parts

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use quire::{
    CollisionPolicy, DEFAULT_BATCH_SIZE, Error, SplitConfig, SplitReport, default_output_dir,
    split_epub,
};

#[derive(Parser)]
#[command(name = "quire")]
#[command(version, about = "Split a large EPUB file into parts", long_about = None)]
#[command(after_help = "EXAMPLES:
    quire saga.epub                       Parts of 100 chapters next to saga.epub
    quire saga.epub -s 50 -o parts/       Parts of 50 chapters in parts/
    quire saga.epub --single-range 1 20   One file with chapters 1 to 20
    quire saga.epub -t \"Saga Book One\" --single-range 1 20")]
struct Cli {
    /// Path to the EPUB file
    #[arg(value_name = "EPUB")]
    epub: String,

    /// Number of chapters per split
    #[arg(short, long, value_name = "N", default_value_t = DEFAULT_BATCH_SIZE)]
    split_size: usize,

    /// Output directory for split files (default: the EPUB's directory)
    #[arg(short, long, value_name = "DIR")]
    outdir: Option<String>,

    /// Custom title for the output EPUB(s)
    #[arg(short, long)]
    title: Option<String>,

    /// Create a single file for chapters START to END (inclusive)
    #[arg(long, num_args = 2, value_names = ["START", "END"])]
    single_range: Option<Vec<usize>>,

    /// Let parts that share a file name overwrite each other
    #[arg(long)]
    overwrite: bool,

    /// Print the run report as JSON
    #[arg(long)]
    json: bool,

    /// Suppress progress messages
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.quiet);

    match run(&cli) {
        Ok(report) => {
            if cli.json {
                match serde_json::to_string_pretty(&report) {
                    Ok(json) => println!("{json}"),
                    Err(e) => {
                        eprintln!("error: {e}");
                        return ExitCode::FAILURE;
                    }
                }
            } else if !cli.quiet {
                print_report(&report);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            if let Error::Batch { written, .. } = &e {
                for path in written {
                    eprintln!("  kept: {}", path.display());
                }
            }
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(quiet: bool) {
    let default = if quiet { "warn" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<SplitReport, Error> {
    let output_dir = match &cli.outdir {
        Some(dir) => dir.into(),
        None => default_output_dir(&cli.epub),
    };
    std::fs::create_dir_all(&output_dir)?;

    let mut config = SplitConfig::new(&cli.epub, output_dir).with_batch_size(cli.split_size);
    if let Some(range) = &cli.single_range
        && let [start, end] = range[..]
    {
        config = config.with_range(start, end);
    }
    if let Some(title) = &cli.title {
        config = config.with_title(title);
    }
    if cli.overwrite {
        config = config.with_collision_policy(CollisionPolicy::Overwrite);
    }

    split_epub(&config)
}

fn print_report(report: &SplitReport) {
    println!("Book: {}", report.base_name);
    println!("Chapters: {}", report.chapter_count);
    if let Some(cover) = &report.cover {
        println!("Cover: {cover}");
    }
    for part in &report.parts {
        println!(
            "{} [{}-{}] {} chapter(s): {}",
            part.path.display(),
            part.start,
            part.end,
            part.chapter_count,
            part.title
        );
    }
}

use anyhow::Result;
use clap::Parser;
use tracing::instrument;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "fmv",
    version,
    about = "Move the files of a directory whose names match a regular expression",
    long_about = "`fmv` moves every regular file directly inside ORIGIN whose name matches PATTERN into DESTINATION.

Only the file name is matched, not the full path, and the expression is not anchored: use ^ and $
to match whole names. Subdirectories are not searched. Existing files in DESTINATION are
overwritten unless --on-conflict says otherwise. DESTINATION is created if missing. Moving
across filesystems falls back to copy and delete, which is not atomic.

Running the same move twice is safe: the second run finds nothing left to move.

Failures on individual files are reported as warnings and do not change the exit code.

EXIT CODES:
    0 - Completed (possibly with per-file failures)
    1 - Invalid pattern, missing origin, invalid --newermt value or unusable destination

EXAMPLES:
    # Move all finished downloads
    fmv ~/Downloads ~/done '\\.(zip|tar\\.gz)$'

    # Move text files using a glob, preview only
    fmv /data/in /data/out '*.txt' --glob --dry-run

    # Copy instead of moving, keeping existing destination files
    fmv /data/in /data/out 'report' --mode copy --on-conflict skip"
)]
struct Args {
    // Selection
    /// Select only files newer than this file's modification time or ISO date/datetime
    ///
    /// An existing path always takes precedence. A date without a time (2023-10-27) means the
    /// start of that day. Files whose mtime equals the cutoff are NOT selected.
    #[arg(long, value_name = "REF", help_heading = "Selection")]
    newermt: Option<String>,

    /// Require this file name suffix (case-sensitive), e.g. ".xlsx"
    #[arg(short = 'e', long, value_name = "EXT", help_heading = "Selection")]
    extension: Option<String>,

    /// Treat PATTERN as a shell glob (e.g. "*.txt") matched against the whole name
    #[arg(long, help_heading = "Selection")]
    glob: bool,

    // Transfer options
    /// Whether matched files are moved or copied
    #[arg(
        short = 'm',
        long,
        value_enum,
        default_value_t = common::Mode::Move,
        value_name = "MODE",
        help_heading = "Transfer options"
    )]
    mode: common::Mode,

    /// What to do when DESTINATION already has a file with the same name
    #[arg(
        long,
        value_enum,
        default_value_t = common::ConflictPolicy::Overwrite,
        value_name = "POLICY",
        help_heading = "Transfer options"
    )]
    on_conflict: common::ConflictPolicy,

    /// Show what would be done without touching the filesystem
    #[arg(short = 'n', long, help_heading = "Transfer options")]
    dry_run: bool,

    // Progress & output
    /// Suppress output of successfully transferred files, useful for cron jobs
    #[arg(short = 'q', long = "quiet", help_heading = "Progress & output")]
    quiet: bool,

    /// Print summary at the end
    #[arg(long, help_heading = "Progress & output")]
    summary: bool,

    /// Verbose level (implies "summary"): -v INFO / -vv DEBUG / -vvv TRACE (default: WARN)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, help_heading = "Progress & output")]
    verbose: u8,

    // ARGUMENTS
    /// Directory to take files from
    #[arg()]
    origin: std::path::PathBuf,

    /// Directory to put files into
    #[arg()]
    destination: std::path::PathBuf,

    /// Regular expression matched against file names
    #[arg()]
    pattern: String,
}

#[instrument]
fn run_move(args: Args) -> Result<common::transfer::Summary> {
    let job = common::Job::new(common::JobSettings {
        origin: args.origin,
        destination: args.destination,
        pattern: args.pattern,
        syntax: if args.glob {
            common::pattern::PatternSyntax::Glob
        } else {
            common::pattern::PatternSyntax::Regex
        },
        extension: args.extension,
        newermt: args.newermt,
        mode: args.mode,
        on_conflict: args.on_conflict,
        dry_run: args.dry_run,
        quiet: args.quiet,
    })?;
    tracing::debug!("job config: {:?}", job.config());
    tracing::info!(
        "transferring from {:?} to {:?}",
        job.config().origin(),
        job.config().destination()
    );
    let summary = job.run()?;
    if summary.has_failures() {
        tracing::warn!("{} file(s) could not be transferred", summary.files_failed());
    }
    Ok(summary)
}

fn main() -> Result<()> {
    let args = Args::parse();
    let output = common::OutputConfig {
        quiet: args.quiet,
        verbose: args.verbose,
        print_summary: args.summary,
    };
    let func = {
        let args = args.clone();
        || run_move(args)
    };
    match common::run(output, func) {
        Some(summary) => {
            if !args.quiet {
                println!("{} file(s) processed.", summary.operations.len());
            }
            Ok(())
        }
        None => std::process::exit(1),
    }
}

use anyhow::Result;
use clap::Parser;
use tracing::instrument;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "fcp",
    version,
    about = "Copy the files of a directory whose names match a regular expression",
    long_about = "`fcp` copies every regular file directly inside ORIGIN whose name matches PATTERN into DESTINATION.

Only the file name is matched, not the full path, and the expression is not anchored: use ^ and $
to match whole names. Subdirectories are not searched. Existing files in DESTINATION are
overwritten unless --on-conflict says otherwise. DESTINATION is created if missing.

Failures on individual files are reported as warnings and do not change the exit code.

EXIT CODES:
    0 - Completed (possibly with per-file failures)
    1 - Invalid pattern, missing origin, invalid --newermt value or unusable destination

EXAMPLES:
    # Copy all text files
    fcp ~/inbox /backup/inbox '\\.txt$'

    # Copy files modified after 10:00, reporting only problems (for cron)
    fcp /var/spool/reports /srv/archive 'report' --newermt 2023-10-27T10:00:00 --quiet

    # Copy files newer than a stamp file, preview only
    fcp /data/in /data/out '.*' --newermt /data/last-run.stamp --dry-run"
)]
struct Args {
    // Selection
    /// Copy only files newer than this file's modification time or ISO date/datetime
    ///
    /// An existing path always takes precedence. A date without a time (2023-10-27) means the
    /// start of that day. Files whose mtime equals the cutoff are NOT copied.
    #[arg(long, value_name = "REF", help_heading = "Selection")]
    newermt: Option<String>,

    /// Require this file name suffix (case-sensitive), e.g. ".xlsx"
    #[arg(short = 'e', long, value_name = "EXT", help_heading = "Selection")]
    extension: Option<String>,

    /// Treat PATTERN as a shell glob (e.g. "*.txt") matched against the whole name
    #[arg(long, help_heading = "Selection")]
    glob: bool,

    // Copy options
    /// What to do when DESTINATION already has a file with the same name
    #[arg(
        long,
        value_enum,
        default_value_t = common::ConflictPolicy::Overwrite,
        value_name = "POLICY",
        help_heading = "Copy options"
    )]
    on_conflict: common::ConflictPolicy,

    /// Show what files would be copied without copying them
    #[arg(short = 'n', long, help_heading = "Copy options")]
    dry_run: bool,

    // Progress & output
    /// Suppress output of successfully copied files, useful for cron jobs
    #[arg(short = 'q', long = "quiet", help_heading = "Progress & output")]
    quiet: bool,

    /// Print summary at the end
    #[arg(long, help_heading = "Progress & output")]
    summary: bool,

    /// Verbose level (implies "summary"): -v INFO / -vv DEBUG / -vvv TRACE (default: WARN)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, help_heading = "Progress & output")]
    verbose: u8,

    // ARGUMENTS
    /// Directory to copy files from
    #[arg()]
    origin: std::path::PathBuf,

    /// Directory to copy files into
    #[arg()]
    destination: std::path::PathBuf,

    /// Regular expression matched against file names
    #[arg()]
    pattern: String,
}

#[instrument]
fn run_copy(args: Args) -> Result<common::transfer::Summary> {
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
        mode: common::Mode::Copy,
        on_conflict: args.on_conflict,
        dry_run: args.dry_run,
        quiet: args.quiet,
    })?;
    tracing::debug!("job config: {:?}", job.config());
    tracing::info!(
        "copying from {:?} to {:?}",
        job.config().origin(),
        job.config().destination()
    );
    let summary = job.run()?;
    if summary.has_failures() {
        tracing::warn!("{} file(s) could not be copied", summary.files_failed());
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
        || run_copy(args)
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

use anyhow::Result;
use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "ffind",
    version,
    about = "Resolve exactly one file in a directory by a substring of its name",
    long_about = "`ffind` prints the path of the single regular file in DIRECTORY whose name contains
SUBSTRING (plain text, not a pattern) and, with --extension, ends with EXT.

It fails when no file or more than one file qualifies, listing every candidate in the latter
case. Use it to guard scripts that expect one well-identified input file.

EXIT CODES:
    0 - Exactly one file found, its path is printed to stdout
    1 - No file, several files, or DIRECTORY is not a directory

EXAMPLE:
    # Feed this week's report into a pipeline
    process-report \"$(ffind ~/reports weekly --extension .xlsx)\""
)]
struct Args {
    /// Require this file name suffix (case-sensitive), e.g. ".xlsx"
    #[arg(short = 'e', long, value_name = "EXT")]
    extension: Option<String>,

    /// Verbose level: -v INFO / -vv DEBUG / -vvv TRACE (default: WARN)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,

    // ARGUMENTS
    /// Directory to search (not recursive)
    #[arg()]
    directory: std::path::PathBuf,

    /// Text the file name must contain
    #[arg()]
    substring: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let output = common::OutputConfig {
        quiet: false,
        verbose: args.verbose,
        // the resolved path is the "summary" of this tool
        print_summary: true,
    };
    let func = || {
        common::get_target_file(&args.directory, &args.substring, args.extension.as_deref())
            .map(|path| path.display().to_string())
    };
    if common::run(output, func).is_none() {
        std::process::exit(1);
    }
    Ok(())
}

use clap::{Parser, Subcommand};
use coldiff::{DiffError, Options, SelectionSet, compare_files, diff_paths, patch};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "coldiff")]
#[command(about = "Column-aligned text and directory diffs that replay as patches")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two files side by side
    Compare {
        file1: PathBuf,
        file2: PathBuf,

        /// Colorize the output
        #[arg(short, long)]
        term: bool,

        /// How many lines ahead to look for a matching line
        #[arg(short, long, default_value_t = coldiff::diff::DEFAULT_WINDOW)]
        max_lines: usize,

        /// Line ranges to compare (e.g. "1-10" or "a:1-8,b:2-9")
        #[arg(long, default_value = "")]
        lines: SelectionSet,

        /// Character column ranges to compare on every line
        #[arg(long, default_value = "")]
        columns: SelectionSet,

        /// Compare at most this many lines
        #[arg(long)]
        limit_lines: Option<usize>,

        /// Truncate lines to this many characters
        #[arg(long)]
        limit_width: Option<usize>,
    },
    /// Compare two files or directory trees, printing a patch
    Diff {
        path1: PathBuf,
        path2: PathBuf,

        /// Colorize the output
        #[arg(short, long)]
        term: bool,

        /// How many lines ahead to look for a matching line
        #[arg(short, long, default_value_t = coldiff::diff::DEFAULT_WINDOW)]
        max_lines: usize,

        /// Only compare files whose name or relative path matches this glob
        #[arg(short = 's', long)]
        select_file: Option<glob::Pattern>,
    },
    /// Apply a patch produced by `diff` or `compare`
    Patch {
        patch_file: PathBuf,
        target_dir: PathBuf,

        /// File receiving rows that precede any file header
        #[arg(long)]
        target: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Compare {
            file1,
            file2,
            term,
            max_lines,
            lines,
            columns,
            limit_lines,
            limit_width,
        } => {
            let opts = Options::default()
                .with_window(max_lines)
                .with_color(term)
                .with_lines(lines)
                .with_columns(columns)
                .with_limit_lines(limit_lines)
                .with_limit_width(limit_width);
            print!("{}", compare_files(&file1, &file2, &opts).map_err(DiffError::from)?);
        }
        Commands::Diff {
            path1,
            path2,
            term,
            max_lines,
            select_file,
        } => {
            let mut opts = Options::default().with_window(max_lines).with_color(term);
            if let Some(pattern) = select_file {
                opts = opts.with_filter(move |rel| matches_file(&pattern, rel));
            }
            print!("{}", diff_paths(&path1, &path2, &opts).map_err(DiffError::from)?);
        }
        Commands::Patch {
            patch_file,
            target_dir,
            target,
        } => {
            let text = std::fs::read_to_string(&patch_file)?;
            let touched =
                patch::apply(&text, &target_dir, target.as_deref()).map_err(DiffError::from)?;
            println!("Patch applied successfully.");
            for path in touched {
                println!("  {}", path.display());
            }
        }
    }

    Ok(())
}

/// A file is selected when the glob matches its name or its whole relative
/// path.
fn matches_file(pattern: &glob::Pattern, rel: &Path) -> bool {
    rel.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| pattern.matches(name))
        || pattern.matches_path(rel)
}

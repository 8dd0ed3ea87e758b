use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use rtfd::archive::RtfdArchive;
use rtfd::directory::{DecodeOptions, DEFAULT_MAX_DEPTH};
use rtfd::flatten::FlattenedEntry;
use rtfd::node::Node;
use rtfd::report;
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rtfd", about = "Unpack serialized RTFD file-wrapper bundles")]
struct Cli {
    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    /// Deepest directory nesting accepted
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH, global = true)]
    max_depth: usize,
    /// Reject strings longer than this many bytes
    #[arg(long, global = true)]
    max_string_len: Option<u64>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Strategy {
    /// Decode header and directory records
    Structural,
    /// Search for single-file wrapper markers (damaged bundles)
    Marker,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract every file and print a JSON summary
    Extract {
        input: PathBuf,
        #[arg(short = 'C', long, default_value = "extracted_files")]
        extract_dir: PathBuf,
        /// Write the JSON summary here instead of stdout
        #[arg(long)]
        json_out: Option<PathBuf>,
        #[arg(short, long, value_enum, default_value_t = Strategy::Structural)]
        strategy: Strategy,
    },
    /// List the flattened file entries
    List {
        input: PathBuf,
        #[arg(short, long, value_enum, default_value_t = Strategy::Structural)]
        strategy: Strategy,
    },
    /// Show the decoded directory tree
    Tree {
        input: PathBuf,
    },
    /// Check whether inputs start with a valid bundle header
    Check {
        #[arg(required = true, num_args = 1..)]
        inputs: Vec<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let options = DecodeOptions {
        max_depth:      cli.max_depth,
        max_string_len: cli.max_string_len,
    };

    match cli.command {

        // ── Extract ──────────────────────────────────────────────────────────
        Commands::Extract { input, extract_dir, json_out, strategy } => {
            let entries = load_entries(&input, &options, strategy)?;
            let files = report::extract_entries(&entries, &extract_dir)?;
            let json = report::to_json(&files)?;
            match json_out {
                Some(path) => {
                    std::fs::write(&path, json)?;
                    println!("JSON results written to {}", path.display());
                }
                None => println!("{json}"),
            }
        }

        // ── List ─────────────────────────────────────────────────────────────
        Commands::List { input, strategy } => {
            let entries = load_entries(&input, &options, strategy)?;
            println!("Bundle: {}", input.display());
            println!("{:<40} {:>12} {:>8}", "Path", "Size", "Padding");
            for entry in &entries {
                let path = if entry.path.is_empty() { "—" } else { entry.path.as_str() };
                println!("{:<40} {:>12} {:>8}", path, entry.data.len(), entry.pad_len);
            }
        }

        // ── Tree ─────────────────────────────────────────────────────────────
        Commands::Tree { input } => {
            let root = RtfdArchive::open_path(&input)?
                .with_options(options)
                .parse_tree()?;
            println!("{} ({} file(s), {} B)", input.display(), root.file_count(), root.total_size());
            print_node(&root, "", 1);
        }

        // ── Check ────────────────────────────────────────────────────────────
        Commands::Check { inputs } => {
            let mut all_valid = true;
            for input in &inputs {
                let valid = RtfdArchive::open_path(input)
                    .map(|mut ar| ar.is_valid())
                    .unwrap_or(false);
                all_valid &= valid;
                println!("{:<8} {}", if valid { "valid" } else { "invalid" }, input.display());
            }
            if !all_valid {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

// ── helpers ──────────────────────────────────────────────────────────────────

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    // RUST_LOG, when set, overrides -v.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_entries(
    input:    &Path,
    options:  &DecodeOptions,
    strategy: Strategy,
) -> Result<Vec<FlattenedEntry<'static>>, rtfd::FormatError> {
    let mut ar = RtfdArchive::open_path(input)?.with_options(options.clone());
    match strategy {
        Strategy::Structural => ar.parse_entries(),
        Strategy::Marker => Ok(ar.scan_markers()?.into_iter().map(FlattenedEntry::from).collect()),
    }
}

fn print_node(node: &Node, key: &str, depth: usize) {
    let indent = "  ".repeat(depth);
    match node {
        Node::File(file) => {
            println!("{indent}{} [{} B{}]",
                label(key, &file.name),
                file.content.data.len(),
                if file.content.pad_len > 0 { ", padded" } else { "" });
        }
        Node::Directory(dir) => {
            println!("{indent}{}/", label(key, &dir.name));
            for child in &dir.children {
                print_node(&child.node, &child.key, depth + 1);
            }
        }
    }
}

fn label(key: &str, name: &str) -> String {
    match (key.is_empty(), name.is_empty()) {
        (true, true)   => ".".to_string(),
        (true, false)  => name.to_string(),
        (false, true)  => key.to_string(),
        (false, false) if key == name => key.to_string(),
        (false, false) => format!("{key} → {name}"),
    }
}

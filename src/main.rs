/// The Big IDEA:
/// Releasing an Ukagaka ghost means producing three artifacts that the SSP
/// update protocol understands: the updates2.dau manifest (path, MD5, size
/// per distributed file), the cumulative delete.txt a client uses to clean
/// up files that left the distribution, and the .nar archive (a ZIP with a
/// renamed extension). Doing this by hand goes wrong in exactly the boring
/// ways: stale manifest entries, files deleted years ago reappearing in
/// delete.txt, development junk shipped inside the archive. This tool
/// resolves the distributed file set once (git-aware, ignore-file filtered)
/// and derives all three artifacts from it.
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use ghost_release::utils;

#[derive(Parser)]
#[command(name = "ghost-release")]
#[command(about = "Packages an Ukagaka ghost into SSP update release artifacts")]
struct Cli {
    /// Ghost root directory
    #[arg(long, global = true, value_name = "DIR", default_value = ".")]
    root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the updates2.dau update manifest
    Dau {
        /// Output path (default: <root>/updates2.dau)
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Create the .nar distribution archive
    Nar {
        /// Output path (default: <root>/<dirname>.nar)
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Generate delete.txt listing files removed from the distribution
    Delete {
        /// Output path (default: <root>/delete.txt)
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,
        /// Previous git ref (tag, SHA, etc.) to diff against
        #[arg(long, value_name = "REF")]
        prev_ref: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let root = cli
        .root
        .canonicalize()
        .with_context(|| format!("Ghost root {} does not exist", cli.root.display()))?;

    match cli.command {
        Commands::Dau { output } => utils::generate_manifest(&root, output),
        Commands::Nar { output } => utils::create_archive(&root, output),
        Commands::Delete { output, prev_ref } => {
            utils::generate_delete_list(&root, output, prev_ref.as_deref())
        }
    }
}

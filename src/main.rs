use clap::{Parser, Subcommand};
use mixpak::{Archive, DecodeOptions};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mixpak", about = "The Westwood MIX1 package CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pack one or more files into a MIX package
    Create {
        #[arg(short, long)]
        output: PathBuf,
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,
    },
    /// List package contents
    List {
        input: PathBuf,
        /// Emit the listing as JSON
        #[arg(long)]
        json: bool,
        /// Accept entries whose stored checksum disagrees with their name
        #[arg(long)]
        lenient: bool,
        /// Also cross-check the redundant entry count between tables
        #[arg(long)]
        strict: bool,
    },
    /// Extract a package into a directory
    Extract {
        input: PathBuf,
        #[arg(short = 'C', long, default_value = ".")]
        output_dir: PathBuf,
        #[arg(long)]
        lenient: bool,
    },
    /// Add files to an existing package
    Add {
        archive: PathBuf,
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,
        /// Write to a different file instead of rewriting in place
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        lenient: bool,
    },
    /// Remove entries from an existing package
    Remove {
        archive: PathBuf,
        #[arg(required = true, num_args = 1..)]
        names: Vec<String>,
        /// Write to a different file instead of rewriting in place
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        lenient: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    match Cli::parse().command {

        // ── Create ───────────────────────────────────────────────────────────
        Commands::Create { output, input } => {
            let mut ar = Archive::new();
            for path in &input {
                ar.add_path(path)?;
                println!("  packed  {}", path.display());
            }
            ar.save(&output)?;
            println!("Created: {}", output.display());
        }

        // ── List ─────────────────────────────────────────────────────────────
        Commands::List { input, json, lenient, strict } => {
            let ar = Archive::load(&input, DecodeOptions { lenient, strict })?;
            let listing = ar.list();
            if json {
                println!("{}", serde_json::to_string_pretty(&listing)?);
            } else {
                println!("Package: {} ({} entries)", input.display(), listing.len());
                println!("{:<26} {:>12}  {:>8}  {:>8}", "Name", "Size", "Name CRC", "Data CRC");
                for info in listing {
                    println!("{:<26} {:>12}  {:08X}  {:08X}",
                        info.name, info.size, info.name_crc, info.data_crc);
                }
            }
        }

        // ── Extract ──────────────────────────────────────────────────────────
        Commands::Extract { input, output_dir, lenient } => {
            let ar = Archive::load(&input, DecodeOptions { lenient, ..Default::default() })?;
            ar.extract_all(&output_dir)?;
            println!("Extracted {} entries to: {}", ar.len(), output_dir.display());
        }

        // ── Add ──────────────────────────────────────────────────────────────
        Commands::Add { archive, input, output, lenient } => {
            let mut ar = Archive::load(&archive, DecodeOptions { lenient, ..Default::default() })?;
            for path in &input {
                ar.add_path(path)?;
                println!("  added   {}", path.display());
            }
            let target = output.unwrap_or(archive);
            ar.save(&target)?;
            println!("Wrote: {}", target.display());
        }

        // ── Remove ───────────────────────────────────────────────────────────
        Commands::Remove { archive, names, output, lenient } => {
            let mut ar = Archive::load(&archive, DecodeOptions { lenient, ..Default::default() })?;
            for name in &names {
                match ar.remove(name) {
                    Some(entry) => println!("  removed {}", entry.name()),
                    None => eprintln!("  no entry named {name}"),
                }
            }
            let target = output.unwrap_or(archive);
            ar.save(&target)?;
            println!("Wrote: {}", target.display());
        }
    }

    Ok(())
}

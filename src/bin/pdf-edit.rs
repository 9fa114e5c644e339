//! PDF Edit CLI tool
//!
//! A command-line tool for merging, splitting, watermarking and
//! password-protecting PDFs.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use glob::glob;
use tracing_subscriber::EnvFilter;

use pdf_edit::pdf::{
    add_watermark, decrypt_pdf, encrypt_pdf, extract_metadata, merge_pdfs, split_pdf,
    AlwaysOverwrite, MergeOptions,
};

/// PDF Edit - Merge, split, watermark and encrypt PDFs
#[derive(Parser)]
#[command(name = "pdf-edit")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Merge PDFs in the order given
    pdf-edit merge -o handout.pdf intro.pdf \"[0-9]*.pdf\"

    # Extract pages 1 to 3, then 5 and 7
    pdf-edit split input.pdf \"1-3, 5, 7\" -o excerpt.pdf

    # Stamp a watermark on every page
    pdf-edit watermark input.pdf \"Draft copy\" -o draft.pdf

    # Password-protect, then unlock again
    PDF_EDIT_PASSWORD=secret pdf-edit encrypt input.pdf -o locked.pdf
    pdf-edit decrypt locked.pdf --password secret -o unlocked.pdf")]
struct Cli {
    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge multiple PDF files into one
    Merge {
        /// Input PDF files (in order). Supports glob patterns like "*.pdf"
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Output PDF file path
        #[arg(short, long)]
        output: PathBuf,

        /// Overwrite the output file without asking
        #[arg(short, long)]
        force: bool,
    },

    /// Copy a selection of pages into a new PDF
    Split {
        /// Input PDF file
        input: PathBuf,

        /// Pages to keep, e.g. "1-3, 5, 7" (1-based, in output order)
        pages: String,

        /// Output PDF file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Add a text watermark to every page
    Watermark {
        /// Input PDF file
        input: PathBuf,

        /// Watermark text
        text: String,

        /// Output PDF file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Password-protect a PDF
    Encrypt {
        /// Input PDF file
        input: PathBuf,

        /// Password to protect the output with
        #[arg(short, long, env = "PDF_EDIT_PASSWORD", hide_env_values = true)]
        password: String,

        /// Output PDF file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Remove password protection from a PDF
    Decrypt {
        /// Encrypted input PDF file
        input: PathBuf,

        /// Password that unlocks the input
        #[arg(short, long, env = "PDF_EDIT_PASSWORD", hide_env_values = true)]
        password: String,

        /// Output PDF file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Show information about a PDF file
    Info {
        /// PDF file to inspect
        input: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.quiet);

    let result = match cli.command {
        Commands::Merge { inputs, output, force } => cmd_merge(inputs, output, force),
        Commands::Split { input, pages, output } => {
            split_pdf(&input, &pages, &output).map_err(Into::into)
        }
        Commands::Watermark { input, text, output } => {
            add_watermark(&input, &text, &output).map_err(Into::into)
        }
        Commands::Encrypt { input, password, output } => {
            encrypt_pdf(&input, &password, &output).map_err(Into::into)
        }
        Commands::Decrypt { input, password, output } => {
            decrypt_pdf(&input, &password, &output).map_err(Into::into)
        }
        Commands::Info { input } => cmd_info(&input),
    };

    if let Err(e) = result {
        let lib_error = e.downcast_ref::<pdf_edit::Error>();
        if lib_error.is_some_and(pdf_edit::Error::is_cancellation) {
            eprintln!("{}", e);
            process::exit(2);
        }
        eprintln!("Error: {:#}", e);
        if lib_error.is_some_and(pdf_edit::Error::is_range_error) {
            eprintln!("Page ranges are comma-separated pages or a-b ranges, e.g. \"1-3, 5, 7\"");
        }
        process::exit(1);
    }
}

/// Log to stderr, filtered by RUST_LOG when set
fn init_logging(quiet: bool) {
    let default = if quiet { "warn" } else { "pdf_edit=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Expand glob patterns in input paths, keeping the order patterns were given
fn expand_globs(patterns: Vec<String>) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for pattern in patterns {
        // Check if pattern contains glob characters
        if pattern.contains('*') || pattern.contains('?') || pattern.contains('[') {
            let mut matched: Vec<PathBuf> = glob(&pattern)
                .with_context(|| format!("Invalid glob pattern: {}", pattern))?
                .filter_map(|entry| match entry {
                    Ok(path) => Some(path),
                    Err(e) => {
                        tracing::warn!("glob error for {}: {}", pattern, e);
                        None
                    }
                })
                .collect();
            if matched.is_empty() {
                bail!("No files matched pattern: {}", pattern);
            }
            // Sort each pattern's matches for consistent ordering
            matched.sort();
            paths.extend(matched);
        } else {
            // No glob characters, treat as literal path
            paths.push(PathBuf::from(pattern));
        }
    }

    Ok(paths)
}

/// Ask on stdin whether `path` may be replaced
fn prompt_overwrite(path: &Path) -> bool {
    eprint!("{} already exists. Overwrite? [y/N] ", path.display());
    let _ = io::stderr().flush();

    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Merge multiple PDFs into one
fn cmd_merge(inputs: Vec<String>, output: PathBuf, force: bool) -> Result<()> {
    let options = MergeOptions {
        input_paths: expand_globs(inputs)?,
        output_path: output,
    };

    if force {
        merge_pdfs(&options, &mut AlwaysOverwrite)?;
    } else {
        merge_pdfs(&options, &mut prompt_overwrite)?;
    }

    Ok(())
}

/// Show information about a PDF
fn cmd_info(input: &Path) -> Result<()> {
    let metadata = extract_metadata(input)?;

    println!("File: {}", input.display());
    println!("Version: {}", metadata.version);
    println!("Pages: {}", metadata.page_count);
    println!("Encrypted: {}", if metadata.encrypted { "yes" } else { "no" });

    if let Some(title) = metadata.title {
        println!("Title: {}", title);
    }
    if let Some(author) = metadata.author {
        println!("Author: {}", author);
    }

    Ok(())
}

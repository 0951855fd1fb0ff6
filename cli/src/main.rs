//! gendoc CLI - document generation tool
//!
//! A command-line tool for generating DOCX, XLSX, PPTX and PDF files from
//! plain text, tabular data or slide-list JSON.

use clap::{Parser, Subcommand};
use colored::*;
use gendoc::{PptxTemplateEngine, TemplateConfig};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;

/// Generate Office documents and PDFs from loosely structured text
#[derive(Parser)]
#[command(
    name = "gendoc",
    version,
    about = "Generate Office documents and PDFs from text",
    long_about = "gendoc - document generation tool.\n\n\
                  Turns plain text, CSV/JSON tabular data and slide-list JSON\n\
                  into DOCX, XLSX, PPTX and PDF files."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a Word document from plain text
    Word {
        /// Input text file (default: stdin)
        input: Option<PathBuf>,

        /// Output file path
        #[arg(short, long, default_value = "output.docx")]
        output: PathBuf,
    },

    /// Generate an Excel workbook from CSV or JSON tabular data
    Excel {
        /// Input data file (default: stdin)
        input: Option<PathBuf>,

        /// Output file path
        #[arg(short, long, default_value = "output.xlsx")]
        output: PathBuf,
    },

    /// Generate a PowerPoint deck from slide-list JSON or plain text
    Slides {
        /// Input file (default: stdin)
        input: Option<PathBuf>,

        /// Output file path
        #[arg(short, long, default_value = "output.pptx")]
        output: PathBuf,

        /// Corporate .pptx template to fill instead of the generic deck
        #[arg(short, long)]
        template: Option<PathBuf>,
    },

    /// Generate a PDF from plain text
    Pdf {
        /// Input text file (default: stdin)
        input: Option<PathBuf>,

        /// Output file path
        #[arg(short, long, default_value = "output.pdf")]
        output: PathBuf,

        /// Document title rendered in the header
        #[arg(short, long)]
        title: Option<String>,
    },
}

fn read_input(path: &Option<PathBuf>) -> io::Result<String> {
    match path {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn run(command: Commands) -> Result<PathBuf, Box<dyn std::error::Error>> {
    match command {
        Commands::Word { input, output } => {
            let text = read_input(&input)?;
            fs::write(&output, gendoc::generate_docx(&text)?)?;
            Ok(output)
        }
        Commands::Excel { input, output } => {
            let data = read_input(&input)?;
            fs::write(&output, gendoc::generate_xlsx(&data)?)?;
            Ok(output)
        }
        Commands::Slides {
            input,
            output,
            template,
        } => {
            let json = read_input(&input)?;
            let bytes = match template {
                Some(template_path) => {
                    let template_bytes = fs::read(&template_path)?;
                    let engine =
                        PptxTemplateEngine::from_bytes(&template_bytes, TemplateConfig::default())?;
                    let slides = gendoc::parse_slides(&json).into_slides();
                    engine.build(&slides)?
                }
                None => gendoc::generate_pptx(&json)?,
            };
            fs::write(&output, bytes)?;
            Ok(output)
        }
        Commands::Pdf {
            input,
            output,
            title,
        } => {
            let text = read_input(&input)?;
            fs::write(&output, gendoc::generate_pdf(&text, title.as_deref())?)?;
            Ok(output)
        }
    }
}


fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match run(cli.command) {
        Ok(output) => {
            println!("{} {}", "Wrote".green().bold(), output.display());
        }
        Err(err) => {
            eprintln!("{} {err}", "Error:".red().bold());
            process::exit(1);
        }
    }
}

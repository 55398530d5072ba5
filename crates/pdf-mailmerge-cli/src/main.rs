mod logger;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use logger::CliLogger;
use pdf_mailmerge::TextColor;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pdfmm", about = "Fill PDF templates from CSV records", version)]
struct Cli {
    /// Log per-record and per-page detail
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate one PDF per CSV record from a template and tag placements
    Merge {
        /// Template PDF
        #[arg(short, long)]
        template: PathBuf,

        /// CSV file with a header row; an optional `Pages` column selects pages
        #[arg(short, long)]
        records: PathBuf,

        /// JSON array of {pageNumber, x, y, text} placements
        #[arg(short, long)]
        placements: PathBuf,

        /// Directory for output_file_N.pdf files
        #[arg(short, long, default_value = "output_files")]
        output_dir: PathBuf,

        /// Options file (JSON); flags below override it
        #[arg(long)]
        config: Option<PathBuf>,

        /// Target paper size
        #[arg(long, value_enum)]
        paper: Option<PaperArg>,

        /// Target orientation
        #[arg(long, value_enum)]
        orientation: Option<OrientationArg>,

        /// Text color: black, white or #rrggbb
        #[arg(long, value_parser = parse_color)]
        color: Option<TextColor>,

        /// Font size for tag text in points
        #[arg(long)]
        font_size: Option<f32>,

        /// What to do when a record fails
        #[arg(long, value_enum)]
        on_error: Option<PolicyArg>,
    },

    /// Rescale every page of a PDF to a fixed paper size
    Normalize {
        /// Input PDF file
        #[arg(short, long)]
        input: PathBuf,

        /// Output PDF file
        #[arg(short, long)]
        output: PathBuf,

        /// Target paper size
        #[arg(long, default_value = "a4", value_enum)]
        paper: PaperArg,

        /// Target orientation
        #[arg(long, default_value = "portrait", value_enum)]
        orientation: OrientationArg,
    },

    /// Extract pages (1-based, comma-separated, repeats allowed) into a new PDF
    Subset {
        /// Input PDF file
        #[arg(short, long)]
        input: PathBuf,

        /// Output PDF file
        #[arg(short, long)]
        output: PathBuf,

        /// Pages to keep, e.g. "2,4,4"
        #[arg(long)]
        pages: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PaperArg {
    A3,
    A4,
    A5,
    Letter,
    Legal,
}

#[derive(Clone, Copy, ValueEnum)]
enum OrientationArg {
    Portrait,
    Landscape,
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    Skip,
    Abort,
}

impl From<PaperArg> for pdf_mailmerge::PaperSize {
    fn from(arg: PaperArg) -> Self {
        match arg {
            PaperArg::A3 => Self::A3,
            PaperArg::A4 => Self::A4,
            PaperArg::A5 => Self::A5,
            PaperArg::Letter => Self::Letter,
            PaperArg::Legal => Self::Legal,
        }
    }
}

impl From<OrientationArg> for pdf_mailmerge::Orientation {
    fn from(arg: OrientationArg) -> Self {
        match arg {
            OrientationArg::Portrait => Self::Portrait,
            OrientationArg::Landscape => Self::Landscape,
        }
    }
}

impl From<PolicyArg> for pdf_mailmerge::FailurePolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Skip => Self::SkipRecord,
            PolicyArg::Abort => Self::AbortBatch,
        }
    }
}

fn parse_color(s: &str) -> std::result::Result<TextColor, String> {
    s.parse().map_err(|e: pdf_mailmerge::MergeError| e.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    CliLogger::new(cli.verbose).init()?;

    match cli.command {
        Commands::Merge {
            template,
            records,
            placements,
            output_dir,
            config,
            paper,
            orientation,
            color,
            font_size,
            on_error,
        } => {
            let mut options = match config {
                Some(path) => pdf_mailmerge::MergeOptions::load(&path)
                    .await
                    .with_context(|| format!("loading {}", path.display()))?,
                None => pdf_mailmerge::MergeOptions::default(),
            };
            if let Some(paper) = paper {
                options.paper_size = paper.into();
            }
            if let Some(orientation) = orientation {
                options.orientation = orientation.into();
            }
            if let Some(color) = color {
                options.overlay.color = color;
            }
            if let Some(font_size) = font_size {
                options.overlay.font_size = font_size;
            }
            if let Some(policy) = on_error {
                options.failure_policy = policy.into();
            }

            let template_doc = pdf_mailmerge::load_pdf(&template).await?;
            let rows = pdf_mailmerge::load_records(&records).await?;
            let parsed = pdf_mailmerge::load_placements(&placements).await?;
            if !parsed.rejected.is_empty() {
                log::warn!(
                    "{} placement(s) rejected from {}",
                    parsed.rejected.len(),
                    placements.display()
                );
            }

            let prefix = options.output_prefix.clone();
            let outcome =
                pdf_mailmerge::run_merge(template_doc, rows, parsed.placements, options).await?;
            let manifest = pdf_mailmerge::write_outputs(outcome, &output_dir, &prefix).await?;

            println!("{}", serde_json::to_string_pretty(&manifest)?);
        }

        Commands::Normalize {
            input,
            output,
            paper,
            orientation,
        } => {
            let target = pdf_mailmerge::PageSize::from_paper(paper.into(), orientation.into());
            let doc = pdf_mailmerge::load_pdf(&input).await?;
            let normalized = tokio::task::spawn_blocking(move || {
                pdf_mailmerge::normalize(&doc, target)
            })
            .await??;
            pdf_mailmerge::save_pdf(normalized, &output).await?;
            println!(
                "Normalized to {:.1}x{:.1} pt → {}",
                target.width,
                target.height,
                output.display()
            );
        }

        Commands::Subset {
            input,
            output,
            pages,
        } => {
            let doc = pdf_mailmerge::load_pdf(&input).await?;
            let record: pdf_mailmerge::Record =
                [(pdf_mailmerge::PAGES_FIELD, pages)].into_iter().collect();
            let numbers = pdf_mailmerge::resolve_pages(&record, doc.get_pages().len());
            let subset = tokio::task::spawn_blocking(move || {
                pdf_mailmerge::select_pages(&doc, &numbers)
            })
            .await??;
            let count = subset.get_pages().len();
            pdf_mailmerge::save_pdf(subset, &output).await?;
            println!("Extracted {} pages → {}", count, output.display());
        }
    }

    Ok(())
}

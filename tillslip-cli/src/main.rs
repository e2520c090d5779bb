use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tillslip_core::{
    compute_stats, local_date, Period, Receipt, ReceiptBook, ReceiptEdit, ReceiptFilter, ReceiptId,
};
use tillslip_scan::{
    scan_image, transcribe_and_build, ProgressTracker, ReceiptBuilder, ScanInput, TranscribeRequest,
};

mod config;
mod export;
mod llm;
mod ocr;
mod state;

use config::Config;
use state::KeyValueStore;

#[derive(Parser, Debug)]
#[command(name = "tillslip", version, about = "Receipt extraction and spend tracking")]
struct Cli {
    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract a receipt from OCR text or an image and store it
    Scan {
        /// Plain-text OCR output
        #[arg(long, conflicts_with = "image", required_unless_present = "image")]
        text: Option<PathBuf>,

        /// Receipt photo (png, jpg, webp, gif)
        #[arg(long)]
        image: Option<PathBuf>,

        /// Ask the configured AI provider for structured fields
        #[arg(long)]
        ai: bool,

        /// Print the receipt without storing it
        #[arg(long)]
        dry_run: bool,
    },

    /// Build a receipt from a saved AI response containing JSON
    ImportJson {
        file: PathBuf,

        #[arg(long)]
        dry_run: bool,
    },

    /// List stored receipts, newest first
    List {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Spend summary for the filtered receipts
    Stats {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Show one receipt with its items
    Show { id: ReceiptId },

    /// Correct fields of a stored receipt
    Edit {
        id: ReceiptId,

        #[arg(long)]
        merchant: Option<String>,

        /// YYYY-MM-DD
        #[arg(long)]
        date: Option<NaiveDate>,

        #[arg(long)]
        total: Option<f64>,

        #[arg(long)]
        category: Option<String>,
    },

    /// Remove a stored receipt
    Delete { id: ReceiptId },

    /// Export receipts
    Export {
        /// Destination CSV file
        #[arg(long)]
        csv: PathBuf,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Manage ~/.tillslip/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config if none exists
    Init,
    /// Print the effective config
    Show,
}

#[derive(Args, Debug, Clone, Default)]
struct FilterArgs {
    /// Exact category label
    #[arg(long)]
    category: Option<String>,

    /// Case-insensitive text in the merchant or an item name
    #[arg(long)]
    search: Option<String>,

    /// all, week or month
    #[arg(long, default_value = "all")]
    period: Period,
}

impl From<FilterArgs> for ReceiptFilter {
    fn from(a: FilterArgs) -> Self {
        ReceiptFilter {
            category: a.category,
            search: a.search,
            period: a.period,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG > --verbose > info
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                let cfg = config::load_config()?;
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
        },

        Command::Scan {
            text,
            image,
            ai,
            dry_run,
        } => {
            let cfg = config::load_config()?;
            let store = state::open_store()?;
            let book = store.load_book()?;
            let builder = receipt_builder(&cfg, &book)?;
            let receipt = match (text, image) {
                (Some(path), _) => scan_text(&cfg, &builder, &path, ai)?,
                (None, Some(path)) => scan_photo(&cfg, &builder, &path, ai)?,
                (None, None) => bail!("pass --text <file> or --image <file>"),
            };
            finish_scan(store, book, receipt, dry_run)?;
        }

        Command::ImportJson { file, dry_run } => {
            let cfg = config::load_config()?;
            let response = std::fs::read_to_string(&file)
                .with_context(|| format!("read {}", file.display()))?;
            let store = state::open_store()?;
            let book = store.load_book()?;
            let builder = receipt_builder(&cfg, &book)?;
            let receipt = builder
                .build(ScanInput::structured(response))
                .with_context(|| format!("import {}", file.display()))?;
            finish_scan(store, book, receipt, dry_run)?;
        }

        Command::List { filter } => {
            let cfg = config::load_config()?;
            let book = state::open_store()?.load_book()?;
            let today = local_date(Utc::now(), cfg.timezone()?);
            let filter = ReceiptFilter::from(filter);
            let shown = filter.apply(book.as_slice(), today);

            for r in &shown {
                println!(
                    "{} | {} | {:<28} | {:<12} | ${:>9.2}{}",
                    r.id,
                    r.date,
                    truncate(&r.merchant, 28),
                    r.category,
                    r.total,
                    if r.manually_edited { " (edited)" } else { "" }
                );
            }
            println!("\n{} of {} receipts", shown.len(), book.len());
        }

        Command::Stats { filter } => {
            let cfg = config::load_config()?;
            let book = state::open_store()?.load_book()?;
            let today = local_date(Utc::now(), cfg.timezone()?);
            let filter = ReceiptFilter::from(filter);
            let stats = compute_stats(filter.apply(book.as_slice(), today), book.as_slice(), today);

            println!("Receipts:       {}", stats.count);
            println!("Total spend:    ${:.2}", stats.total_spend);
            println!("30-day change:  {:+.1}%", stats.percent_change);
            if !stats.by_category.is_empty() {
                println!();
                for (category, spend) in stats.categories_by_spend() {
                    let share = if stats.total_spend > 0.0 {
                        spend / stats.total_spend * 100.0
                    } else {
                        0.0
                    };
                    println!("  {category:<14} ${spend:>9.2}  {share:>5.1}%");
                }
            }
        }

        Command::Show { id } => {
            let book = state::open_store()?.load_book()?;
            let r = book.get(id).with_context(|| format!("no receipt with id {id}"))?;
            print_receipt(r);
        }

        Command::Edit {
            id,
            merchant,
            date,
            total,
            category,
        } => {
            let edit = ReceiptEdit {
                merchant,
                date,
                total,
                category,
            };
            if edit.is_empty() {
                bail!("nothing to edit (pass --merchant, --date, --total or --category)");
            }
            let cfg = config::load_config()?;
            let categories = cfg.category_config()?;
            let mut store = state::open_store()?;
            let mut book = store.load_book()?;
            let updated = book.update(id, edit, &categories)?.clone();
            store.save_book(&book)?;
            info!(%id, "receipt updated");
            print_receipt(&updated);
        }

        Command::Delete { id } => {
            let mut store = state::open_store()?;
            let mut book = store.load_book()?;
            let removed = book.delete(id)?;
            store.save_book(&book)?;
            println!("Deleted {} ({} ${:.2})", removed.id, removed.merchant, removed.total);
        }

        Command::Export { csv, filter } => {
            let cfg = config::load_config()?;
            let book = state::open_store()?.load_book()?;
            let today = local_date(Utc::now(), cfg.timezone()?);
            let rows = ReceiptFilter::from(filter).apply(book.as_slice(), today);
            let n = export::export_csv(&csv, rows)?;
            println!("Wrote {n} receipts to {}", csv.display());
        }
    }

    Ok(())
}

/// New ids always land above the newest stored receipt.
fn receipt_builder(cfg: &Config, book: &ReceiptBook) -> Result<ReceiptBuilder> {
    let builder = ReceiptBuilder::new(cfg.category_config()?, cfg.extraction_config())
        .with_timezone(cfg.timezone()?);
    if let Some(max) = book.iter().map(|r| r.id).max() {
        builder.advance_ids_past(max);
    }
    Ok(builder)
}

fn scan_text(cfg: &Config, builder: &ReceiptBuilder, path: &Path, ai: bool) -> Result<Receipt> {
    let text = std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;

    let receipt = if ai {
        let transcriber = llm::AiTranscriber::new(cfg.ai.clone(), builder.categorizer().config());
        transcribe_and_build(
            &transcriber,
            builder,
            &TranscribeRequest::Text(text),
            None,
            Utc::now(),
        )?
    } else {
        builder.build(ScanInput::raw_text(text))?
    };
    Ok(receipt)
}

fn scan_photo(cfg: &Config, builder: &ReceiptBuilder, path: &Path, ai: bool) -> Result<Receipt> {
    let bytes = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let image_ref = Some(path.display().to_string());

    let receipt = if ai {
        let transcriber = llm::AiTranscriber::new(cfg.ai.clone(), builder.categorizer().config());
        let request = TranscribeRequest::Image {
            bytes,
            media_type: media_type(path)?.to_string(),
        };
        transcribe_and_build(&transcriber, builder, &request, image_ref, Utc::now())?
    } else {
        let ocr = ocr::TesseractCli::default();
        let mut tracker = ProgressTracker::new();
        let mut report = |e: &tillslip_scan::RecognitionEvent| {
            if let Some(p) = tracker.observe(e) {
                eprint!("\rRecognizing text... {p}%");
                let _ = std::io::stderr().flush();
            }
        };
        let receipt = scan_image(&ocr, builder, &bytes, image_ref, &mut report, Utc::now());
        eprintln!();
        receipt?
    };
    Ok(receipt)
}

fn media_type(path: &Path) -> Result<&'static str> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    Ok(match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        other => bail!("unsupported image type: {other:?} ({})", path.display()),
    })
}

/// Store the new receipt (newest first) unless this is a dry run.
fn finish_scan(
    mut store: KeyValueStore,
    mut book: ReceiptBook,
    receipt: Receipt,
    dry_run: bool,
) -> Result<()> {
    if dry_run {
        println!("{}", serde_json::to_string_pretty(&receipt)?);
        return Ok(());
    }

    print_receipt(&receipt);
    book.add(receipt);
    store.save_book(&book)?;
    info!(count = book.len(), path = %store.path().display(), "receipt saved");
    Ok(())
}

fn print_receipt(r: &Receipt) {
    println!("{}  {}", r.merchant, r.date);
    println!("  id:        {}", r.id);
    println!("  category:  {}", r.category);
    println!("  total:     ${:.2}", r.total);
    if r.manually_edited {
        println!("  (manually edited)");
    }
    if let Some(image) = &r.image {
        println!("  image:     {}", truncate(image, 60));
    }
    for item in &r.items {
        let qty = if item.quantity > 1 {
            format!(" x{}", item.quantity)
        } else {
            String::new()
        };
        println!("    - {}{}  ${:.2}", item.name, qty, item.price);
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

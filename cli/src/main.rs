//! redocx CLI - rebuild scanned pages as DOCX documents

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use redocx::pipeline::{
    self, collect_inputs, page_id, rebuild_with, BatchReport, CommandCorrector,
    CommandOcrProvider, CommandSpec, PageOutcome, PageStatus, TextCorrector,
};
use redocx::{
    build_page, rename_numbered, PageOutputLocation, PageRange, Pipeline, PipelineOptions,
    RenderOptions,
};

#[derive(Parser)]
#[command(name = "redocx")]
#[command(version)]
#[command(about = "Turn scanned pages into DOCX through OCR, correction and layout assembly", long_about = None)]
struct Cli {
    /// Folder that receives one sub-folder per page
    #[arg(long, global = true, value_name = "DIR", default_value = "output")]
    output_root: PathBuf,

    /// Command line of the OCR helper process
    #[arg(long, global = true, value_name = "CMD", env = "REDOCX_OCR_CMD")]
    ocr_cmd: Option<String>,

    /// Command line of the text correction helper process
    #[arg(long, global = true, value_name = "CMD", env = "REDOCX_CORRECTOR_CMD")]
    corrector_cmd: Option<String>,

    /// Skip the text correction stage
    #[arg(long, global = true)]
    no_correct: bool,

    /// Write the batch report as JSON to this file
    #[arg(long, global = true, value_name = "FILE")]
    report: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run OCR on one image or PDF
    Ocr {
        /// Input image or PDF
        #[arg(value_name = "IMAGE")]
        input: PathBuf,
    },

    /// Correct the OCR results of one page folder
    Correct {
        /// Page folder containing <page>_res.json
        #[arg(value_name = "PAGE_DIR")]
        page_dir: PathBuf,
    },

    /// Build DOCX and Markdown for one page folder
    Build {
        /// Page folder containing <page>_res.json or <page>_improved.json
        #[arg(value_name = "PAGE_DIR")]
        page_dir: PathBuf,
    },

    /// Run OCR, correction and building over a folder of pages
    Convert {
        /// Folder of page images or PDFs
        #[arg(value_name = "INPUT_DIR")]
        input: PathBuf,

        /// Lowest page number to process
        #[arg(long)]
        min: Option<u32>,

        /// Highest page number to process
        #[arg(long)]
        max: Option<u32>,
    },

    /// Rebuild DOCX files from existing JSON in the output folder
    Rebuild {
        /// Lowest page number
        #[arg(long)]
        min: u32,

        /// Highest page number
        #[arg(long)]
        max: u32,
    },

    /// Rename <text>-<number>.<ext> files to <number>.<ext>
    Rename {
        /// Folder to rename files in
        #[arg(value_name = "DIR")]
        dir: PathBuf,

        /// File extension to match
        #[arg(long, default_value = "pdf")]
        ext: String,
    },

    /// Show version information
    Version,
}

type CmdResult = Result<(), Box<dyn std::error::Error>>;

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Ocr { input } => cmd_ocr(&cli, input),
        Commands::Correct { page_dir } => cmd_correct(&cli, page_dir),
        Commands::Build { page_dir } => cmd_build(page_dir),
        Commands::Convert { input, min, max } => cmd_convert(&cli, input, *min, *max),
        Commands::Rebuild { min, max } => cmd_rebuild(&cli, *min, *max),
        Commands::Rename { dir, ext } => cmd_rename(dir, ext),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn spawn_ocr(cli: &Cli) -> Result<CommandOcrProvider, Box<dyn std::error::Error>> {
    let line = cli
        .ocr_cmd
        .as_deref()
        .ok_or("no OCR provider configured: pass --ocr-cmd or set REDOCX_OCR_CMD")?;
    Ok(CommandOcrProvider::spawn(&CommandSpec::parse(line)?)?)
}

fn spawn_corrector(cli: &Cli) -> Result<Option<CommandCorrector>, Box<dyn std::error::Error>> {
    if cli.no_correct {
        return Ok(None);
    }
    match cli.corrector_cmd.as_deref() {
        Some(line) => Ok(Some(CommandCorrector::spawn(&CommandSpec::parse(line)?)?)),
        None => {
            log::info!("No corrector configured, skipping correction");
            Ok(None)
        }
    }
}

fn cmd_ocr(cli: &Cli, input: &Path) -> CmdResult {
    let mut ocr = spawn_ocr(cli)?;
    let location = PageOutputLocation::create(&cli.output_root, page_id(input))?;
    let page = pipeline::ocr_page(&mut ocr, input, &location)?;

    println!(
        "{} {} ({} blocks)",
        "OCR results saved to".green(),
        location.page_dir().display(),
        page.len()
    );
    Ok(())
}

fn cmd_correct(cli: &Cli, page_dir: &Path) -> CmdResult {
    let mut corrector = spawn_corrector(cli)?
        .ok_or("no corrector configured: pass --corrector-cmd or set REDOCX_CORRECTOR_CMD")?;
    let location = PageOutputLocation::from_page_dir(page_dir)?;
    let stats = pipeline::correct_location(&mut corrector as &mut dyn TextCorrector, &location)?;

    println!(
        "{} {} ({} segments)",
        "Corrected text JSON saved to".green(),
        location.improved_json().display(),
        stats.corrected
    );
    Ok(())
}

fn cmd_build(page_dir: &Path) -> CmdResult {
    let location = PageOutputLocation::from_page_dir(page_dir)?;
    let stats = build_page(&location, &RenderOptions::default())?;

    println!("{} {}", "DOCX file saved to".green(), location.docx().display());
    println!(
        "  {} {} paragraphs, {} tables, {} images, {} words",
        "└─".dimmed(),
        stats.paragraph_count + stats.heading_count,
        stats.table_count,
        stats.image_count,
        stats.word_count
    );
    Ok(())
}

fn cmd_convert(cli: &Cli, input: &Path, min: Option<u32>, max: Option<u32>) -> CmdResult {
    let range = PageRange::new(min, max)?;
    let files = collect_inputs(input, range)?;
    if files.is_empty() {
        println!("{}", "No input files to process.".yellow());
        return Ok(());
    }

    let ocr = spawn_ocr(cli)?;
    let corrector = spawn_corrector(cli)?.map(|c| Box::new(c) as Box<dyn TextCorrector>);
    let options = PipelineOptions::new().with_output_root(&cli.output_root);
    let mut pipeline = Pipeline::new(Box::new(ocr), corrector, options);

    println!("\nStarting conversion of {} files...\n", files.len());
    let pb = progress_bar(files.len(), "green");
    let report = pipeline.run_with(&files, |outcome| advance(&pb, outcome));
    pb.finish_and_clear();

    print_summary("Conversion", &report);
    save_report(cli, &report)
}

fn cmd_rebuild(cli: &Cli, min: u32, max: u32) -> CmdResult {
    let range = PageRange::new(Some(min), Some(max))?;
    let options = PipelineOptions::new().with_output_root(&cli.output_root);

    println!("\nBuilding DOCX files for pages {} to {}...", min, max);
    let pb = progress_bar((max - min) as usize + 1, "blue");
    let report = rebuild_with(&options, range, |outcome| advance(&pb, outcome))?;
    pb.finish_and_clear();

    print_summary("Rebuild", &report);
    save_report(cli, &report)
}

fn cmd_rename(dir: &Path, ext: &str) -> CmdResult {
    let report = rename_numbered(dir, ext)?;

    for (from, to) in &report.renamed {
        println!(
            "{} {} → {}",
            "Renamed:".green(),
            file_name(from),
            file_name(to)
        );
    }
    for (path, reason) in &report.skipped {
        let why = match reason {
            redocx::rename::SkipReason::NoNumber => "no number pattern found",
            redocx::rename::SkipReason::TargetExists(_) => "target already exists",
        };
        println!("{} {} ({})", "Skipped:".yellow(), file_name(path), why);
    }

    println!(
        "\n{}: {} renamed, {} skipped",
        "Summary".bold(),
        report.renamed.len(),
        report.skipped.len()
    );
    Ok(())
}

fn cmd_version() {
    println!("{} {}", "redocx".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Scanned page to DOCX rebuilder");
}

fn progress_bar(len: usize, color: &str) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    let template = format!(
        "{{spinner:.{}}} [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {{msg}}",
        color
    );
    let style = ProgressStyle::default_bar()
        .template(&template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb
}

fn advance(pb: &ProgressBar, outcome: &PageOutcome) {
    let status = match &outcome.status {
        PageStatus::Succeeded => format!("Done ({:.1}s)", outcome.elapsed.as_secs_f64()),
        PageStatus::Failed(message) => format!("Error: {}", message),
        PageStatus::Skipped(reason) => format!("Skipped ({})", reason),
    };
    pb.set_message(format!("page {}: {}", outcome.page, status));
    pb.inc(1);
}

fn print_summary(title: &str, report: &BatchReport) {
    println!("{}", "=".repeat(60).dimmed());
    if report.is_success() {
        println!("{} {}", title.green().bold(), "completed".green());
    } else {
        println!("{} {}", title.yellow().bold(), "completed with failures".yellow());
    }
    println!(
        "  {} {} succeeded",
        "├─".dimmed(),
        report.succeeded.len().to_string().green()
    );
    println!(
        "  {} {} failed",
        "├─".dimmed(),
        report.failed.len().to_string().red()
    );
    println!("  {} {} skipped", "├─".dimmed(), report.skipped.len());
    println!(
        "  {} {} words, {} tables, {} images written",
        "├─".dimmed(),
        report.totals.word_count,
        report.totals.table_count,
        report.totals.image_count
    );
    println!(
        "  {} {}s elapsed",
        "└─".dimmed(),
        report.elapsed().num_seconds()
    );
    for failure in &report.failed {
        println!("    {} {}: {}", "✗".red(), failure.page, failure.message);
    }
    if report.cancelled {
        println!("{}", "Batch stopped early.".yellow());
    }
    println!("{}", "=".repeat(60).dimmed());
}

fn save_report(cli: &Cli, report: &BatchReport) -> CmdResult {
    if let Some(path) = &cli.report {
        fs::write(path, report.to_json()?)?;
        println!("{} {}", "Report saved to".green(), path.display());
    }
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

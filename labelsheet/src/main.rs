use clap::{ArgAction, Args, Parser, Subcommand};
use log::warn;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use label_core::{ImageSlot, MatchRule, Registry, associate_folder, import_csv};
use labelsheet::{Config, FileNaming, Renderer, Result, SheetSettings, generate_all};

#[derive(Parser, Debug)]
#[command(author, version, about = "Print sheets of EAN-13 labels from a product list")]
struct Cli {
    /// JSON file with default settings; flags override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write one PDF sheet per product code
    Generate(GenerateArgs),
    /// Show every code with its product and model photo
    List(ListArgs),
}

#[derive(Args, Debug)]
struct Inputs {
    /// CSV with brand, product and EAN columns and a header row
    #[arg(long)]
    csv: PathBuf,

    /// Folder with product photos named after their EAN
    #[arg(long)]
    products: Option<PathBuf>,

    /// Folder with model photos named after their EAN
    #[arg(long)]
    models: Option<PathBuf>,

    /// How the EAN must appear in a photo's file name
    #[arg(long = "match")]
    match_rule: Option<MatchRule>,

    /// Photo used for codes without a match
    #[arg(long)]
    placeholder: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    #[command(flatten)]
    inputs: Inputs,

    /// Output directory
    #[arg(long)]
    out: PathBuf,

    /// Labels per sheet (at most 30 fit on one page)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    duplicates: Option<u32>,

    /// Which photo goes on the labels
    #[arg(long)]
    photo: Option<ImageSlot>,

    /// Output file naming: labels (<ean>_EAN_labels.pdf) or ticket (<ean>_ticket.pdf)
    #[arg(long)]
    naming: Option<FileNaming>,

    /// Also write a PNG preview of every sheet
    #[arg(long)]
    preview: bool,

    /// Directory for temporary barcode images
    #[arg(long)]
    scratch_dir: Option<PathBuf>,

    /// TTF/OTF font for the label text
    #[arg(long)]
    font: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ListArgs {
    #[command(flatten)]
    inputs: Inputs,

    /// Print the entries as JSON
    #[arg(long)]
    json: bool,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<bool> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    match cli.command {
        Command::Generate(args) => {
            apply_inputs(&mut config, &args.inputs);
            if let Some(n) = args.duplicates {
                config.duplicates = n;
            }
            if let Some(photo) = args.photo {
                config.photo = photo;
            }
            if let Some(naming) = args.naming {
                config.naming = naming;
            }
            if args.scratch_dir.is_some() {
                config.scratch_dir = args.scratch_dir;
            }
            if args.font.is_some() {
                config.font = args.font;
            }
            config.preview |= args.preview;
            generate(&config, &args.inputs, &args.out)
        }
        Command::List(args) => {
            apply_inputs(&mut config, &args.inputs);
            list(&config, &args.inputs, args.json)?;
            Ok(true)
        }
    }
}

fn apply_inputs(config: &mut Config, inputs: &Inputs) {
    if let Some(rule) = inputs.match_rule {
        config.match_rule = rule;
    }
    if inputs.placeholder.is_some() {
        config.placeholder = inputs.placeholder.clone();
    }
}

/// Import the CSV and run both folder scans. An unreadable folder is only a
/// warning; the affected codes keep the placeholder.
fn load_registry(config: &Config, inputs: &Inputs) -> Result<Registry> {
    let mut registry = Registry::new(config.placeholder_path());
    let report = import_csv(&mut registry, &inputs.csv)?;
    if !report.skipped.is_empty() {
        eprintln!(
            "{}: {} row(s) skipped",
            inputs.csv.display(),
            report.skipped.len()
        );
    }

    let folders = [
        (inputs.products.as_deref(), ImageSlot::Product),
        (inputs.models.as_deref(), ImageSlot::Model),
    ];
    for (folder, slot) in folders {
        let Some(folder) = folder else { continue };
        if let Err(e) = associate_folder(&mut registry, folder, slot, config.match_rule) {
            warn!("{} photos: {e}", slot.as_str());
        }
    }
    Ok(registry)
}

fn generate(config: &Config, inputs: &Inputs, out: &Path) -> Result<bool> {
    let registry = load_registry(config, inputs)?;
    let renderer = Renderer::new(config.font.as_deref())?;
    let settings = SheetSettings::from_config(config);

    let report = generate_all(&registry, &settings, &renderer, out, |p| {
        eprintln!("[{:>3}%] {}/{} {}", p.percent(), p.index, p.total, p.ean);
    })?;

    for outcome in &report.written {
        println!("{}", outcome.path.display());
        if outcome.dropped() > 0 {
            eprintln!(
                "{}: {} of {} labels placed, {} dropped",
                outcome.ean,
                outcome.rendered,
                outcome.requested,
                outcome.dropped()
            );
        }
    }
    for (ean, e) in &report.failed {
        eprintln!("failed: {ean}: {e}");
    }
    Ok(report.is_success())
}

fn list(config: &Config, inputs: &Inputs, json: bool) -> Result<()> {
    let registry = load_registry(config, inputs)?;
    if json {
        println!("{}", serde_json::to_string_pretty(registry.all())?);
        return Ok(());
    }

    let shown = |entry: &label_core::CodeEntry, slot: ImageSlot| {
        if entry.uses_placeholder(slot, registry.placeholder()) {
            "(placeholder)".to_string()
        } else {
            entry.image(slot).display().to_string()
        }
    };
    for entry in registry.all() {
        println!("{}  {} / {}", entry.ean, entry.brand, entry.product);
        println!("    product: {}", shown(entry, ImageSlot::Product));
        println!("    model:   {}", shown(entry, ImageSlot::Model));
    }
    eprintln!("{} code(s)", registry.len());
    Ok(())
}

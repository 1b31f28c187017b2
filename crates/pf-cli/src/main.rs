#![forbid(unsafe_code)]

//! ProxyForge CLI - render card proxies and manage layouts.
//!
//! # Commands
//!
//! - `render`: Render a card to SVG, or PNG with the `png` feature
//! - `dims`: Show canvas and export sizes at a DPI
//! - `fit`: Shrink-to-fit a line of text into a layout field
//! - `cost`: Place a mana cost in a layout's cost box
//! - `layout`: List, show, import, export, create, edit and delete layouts
//! - `lookup`: Find a card, or name suggestions, in a local card-data dump

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use futures::executor::block_on;
use pf_cli::config::{validate_dpi, validate_margin};
use pf_cli::{
    CardDump, CardJob, CliConfig, DigestIds, FileStore, FsAssetLoader, NativeRenderer,
    RenderSummary, SystemTimer, cost_report, dimensions_report, fit_field, fit_in_rect,
    load_config,
};
use pf_core::geometry::{DPI_PRESETS, PixelRect, scale_factor};
use pf_core::{
    BackgroundTransform, CardLookup, CardRecord, FieldKey, FontSpec, LayoutConfig, LayoutEditor,
    LayoutLibrary, TextPosition, default_layout, export_layout_document, parse_layout_bundle,
};
use pf_parser::{parse_card_json, parse_symbol_catalog};
use pf_render_canvas::RenderConfig;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Id of the built-in layout used when no bundle is configured.
const CLASSIC_LAYOUT_ID: &str = "classic";

/// ProxyForge CLI - render card proxies and manage layouts.
#[derive(Debug, Parser)]
#[command(
    name = "proxyforge",
    version,
    about = "ProxyForge CLI - render card proxies and manage layouts",
    long_about = "Composes printable card proxies from card data, a frame layout and artwork.\n\n\
        Renders to SVG (PNG with the `png` feature), inspects layout geometry and\n\
        typography, and manages a file-backed library of custom layouts."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose logging (can be repeated for more detail: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Configuration file. Defaults to ./proxyforge.toml, then the user config directory.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Render a card to SVG or PNG.
    Render(RenderArgs),

    /// Show canvas, margin and export sizes.
    Dims {
        /// Resolution (150, 300, 500 or 800)
        #[arg(long, default_value_t = 300)]
        dpi: u32,

        /// Bleed kept on export, in millimeters (0-5)
        #[arg(long, default_value_t = 0.0)]
        margin_mm: f64,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Fit a line of text into a layout field, or into a box of the given width.
    Fit {
        /// Text to fit
        text: String,

        /// Field key, e.g. name, typeLine, powerToughness
        #[arg(long, default_value = "name")]
        field: String,

        /// Layout id or name
        #[arg(short, long)]
        layout: Option<String>,

        /// Free-standing box width in pixels; ignores the layout
        #[arg(long)]
        width: Option<f64>,

        /// Base font size in points for --width
        #[arg(long, default_value_t = 9.0)]
        size: f64,

        /// Font family for --width, or for fields without one
        #[arg(long)]
        family: Option<String>,

        #[arg(long)]
        bold: bool,

        #[arg(long, default_value_t = 300)]
        dpi: u32,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Lay out a mana cost such as "{2}{W}{U}" in a layout's cost box.
    Cost {
        cost: String,

        /// Layout id or name
        #[arg(short, long)]
        layout: Option<String>,

        #[arg(long, default_value_t = 300)]
        dpi: u32,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage the layout library.
    Layout {
        #[command(subcommand)]
        action: LayoutAction,
    },

    /// Look up a card by exact then fuzzy name in the card-data dump.
    Lookup {
        name: String,

        /// Card-data dump; overrides `paths.cards`
        #[arg(long)]
        cards: Option<PathBuf>,

        /// List name suggestions instead of resolving one card
        #[arg(long)]
        autocomplete: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Args)]
struct RenderArgs {
    /// Card JSON file, "-" for stdin, or inline JSON. With --name, a card name.
    #[arg(default_value = "-")]
    input: String,

    /// Treat the input as a card name to look up in the card-data dump
    #[arg(long)]
    name: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "svg")]
    format: OutputFormat,

    /// Output file or directory. If omitted, writes to stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Layout id or name
    #[arg(short, long)]
    layout: Option<String>,

    /// Background art URL; defaults to the card's art crop
    #[arg(long)]
    art: Option<String>,

    /// Background zoom on top of the layout's art anchor
    #[arg(long, default_value_t = 1.0)]
    scale: f64,

    /// Background horizontal offset, in percent of the canvas width
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    offset_x: f64,

    /// Background vertical offset, in percent of the canvas height
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    offset_y: f64,

    /// Copyright line for layouts with a copyright field
    #[arg(long)]
    copyright: Option<String>,

    /// Resolution (150, 300, 500 or 800)
    #[arg(long)]
    dpi: Option<u32>,

    /// Bleed kept on export, in millimeters (0-5)
    #[arg(long)]
    margin_mm: Option<f64>,

    /// Draw field boxes and the art anchor
    #[arg(long)]
    debug: bool,

    /// Symbol catalog JSON; overrides `paths.symbols`
    #[arg(long)]
    symbols: Option<PathBuf>,

    /// Asset directory; overrides `paths.assets`
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Card-data dump for --name; overrides `paths.cards`
    #[arg(long)]
    cards: Option<PathBuf>,

    /// Print a JSON summary of what was drawn to stderr
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Subcommand)]
enum LayoutAction {
    /// List built-in and custom layouts.
    List {
        #[arg(long)]
        json: bool,
    },
    /// Print a layout document.
    Show { layout: String },
    /// Import a layout document under a fresh id.
    Import {
        /// Layout JSON file or "-" for stdin
        #[arg(default_value = "-")]
        input: String,
    },
    /// Write a layout document, to `<id>-border.json` inside a directory output.
    Export {
        layout: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Create a custom layout from the classic template.
    New {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Set a custom layout's text box for one field from a JSON text position.
    SetField {
        layout: String,
        field: String,
        /// e.g. '{"x":14,"y":8,"width":50,"height":5,"fontSize":9}'
        position: String,
    },
    /// Remove a custom layout's text box for one field.
    RemoveField { layout: String, field: String },
    /// Delete a custom layout.
    Delete { layout: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Svg,
    Png,
}

impl OutputFormat {
    const fn extension(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png",
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    let config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Command::Render(args) => cmd_render(&config, &args),

        Command::Dims {
            dpi,
            margin_mm,
            json,
        } => cmd_dims(dpi, margin_mm, json),

        Command::Fit {
            text,
            field,
            layout,
            width,
            size,
            family,
            bold,
            dpi,
            json,
        } => cmd_fit(
            &config,
            &FitArgs {
                text,
                field,
                layout,
                width,
                size,
                family,
                bold,
                dpi,
            },
            json,
        ),

        Command::Cost {
            cost,
            layout,
            dpi,
            json,
        } => cmd_cost(&config, &cost, layout.as_deref(), dpi, json),

        Command::Layout { action } => cmd_layout(&config, action),

        Command::Lookup {
            name,
            cards,
            autocomplete,
            json,
        } => cmd_lookup(&config, &name, cards.as_deref(), autocomplete, json),
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .without_time()
        .try_init();
}

fn load_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        Ok(buffer)
    } else if Path::new(input).exists() {
        std::fs::read_to_string(input).context(format!("Failed to read file: {input}"))
    } else {
        // Treat as inline JSON
        Ok(input.to_string())
    }
}

fn read_file(path: &Path, what: &str) -> Result<String> {
    std::fs::read_to_string(path).context(format!("Failed to read {what}: {}", path.display()))
}

/// `output` itself, or `output/<file_name>` when it is a directory.
fn output_path(output: &Path, file_name: &str) -> PathBuf {
    if output.is_dir() {
        output.join(file_name)
    } else {
        output.to_path_buf()
    }
}

fn write_output_bytes(output: Option<&Path>, file_name: &str, content: &[u8]) -> Result<()> {
    match output {
        Some(output) => {
            let path = output_path(output, file_name);
            std::fs::write(&path, content)
                .context(format!("Failed to write to: {}", path.display()))?;
            info!("Wrote output to: {}", path.display());
        }
        None => {
            io::stdout()
                .write_all(content)
                .context("Failed to write to stdout")?;
        }
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// =============================================================================
// Layout library
// =============================================================================

/// The configured built-in bundle, or the default layout as `classic`.
fn built_in_layouts(config: &CliConfig) -> Result<Vec<LayoutConfig>> {
    match &config.paths.layouts {
        Some(path) => {
            let json = read_file(path, "layout bundle")?;
            parse_layout_bundle(&json).context(format!("Invalid layout bundle: {}", path.display()))
        }
        None => {
            let mut classic = default_layout();
            classic.id = String::from(CLASSIC_LAYOUT_ID);
            classic.name = String::from("Classic");
            classic.description = Some(String::from("Default frame layout"));
            Ok(vec![classic])
        }
    }
}

fn open_library(config: &CliConfig) -> Result<LayoutLibrary<FileStore>> {
    let path = config.store_path();
    let store =
        FileStore::open(&path).context(format!("Failed to open layout store: {}", path.display()))?;
    Ok(LayoutLibrary::new(store, built_in_layouts(config)?))
}

/// By id, then by case-insensitive name.
fn find_layout(library: &LayoutLibrary<FileStore>, key: &str) -> Option<LayoutConfig> {
    library.find(key).or_else(|| {
        library
            .all()
            .into_iter()
            .find(|layout| layout.name.eq_ignore_ascii_case(key))
    })
}

/// The named layout, else the active draft, else the first built-in.
fn resolve_layout(config: &CliConfig, key: Option<&str>) -> Result<LayoutConfig> {
    let library = open_library(config)?;
    if let Some(key) = key {
        return find_layout(&library, key).with_context(|| format!("Unknown layout: {key}"));
    }
    if let Some(draft) = library.active_draft() {
        debug!(id = %draft.id, "using active draft layout");
        return Ok(draft);
    }
    Ok(library
        .built_ins()
        .first()
        .cloned()
        .unwrap_or_else(default_layout))
}

fn parse_field(name: &str) -> Result<FieldKey> {
    FieldKey::parse(name).with_context(|| {
        let known: Vec<&str> = FieldKey::ALL.iter().map(|field| field.as_str()).collect();
        format!("Unknown field '{name}'; expected one of {}", known.join(", "))
    })
}

// =============================================================================
// Command: render
// =============================================================================

fn load_card(config: &CliConfig, args: &RenderArgs) -> Result<CardRecord> {
    if args.name {
        let dump = load_dump(config, args.cards.as_deref())?;
        let lookup = CardLookup::new(dump, SystemTimer::new());
        return block_on(lookup.card_by_name(&args.input))
            .with_context(|| format!("No card named '{}'", args.input));
    }
    let json = load_input(&args.input)?;
    parse_card_json(&json).context("Invalid card JSON")
}

fn render_config(config: &CliConfig, args: &RenderArgs) -> Result<RenderConfig> {
    let mut render = config.render_config(RenderConfig::default())?;
    if let Some(dpi) = args.dpi {
        render.dpi = validate_dpi(dpi)?;
    }
    if let Some(margin) = args.margin_mm {
        render.export_margin_mm = validate_margin(margin)?;
    }
    if args.debug {
        render.debug = true;
    }
    Ok(render)
}

fn cmd_render(config: &CliConfig, args: &RenderArgs) -> Result<()> {
    let start = Instant::now();

    let card = load_card(config, args)?;
    let layout = resolve_layout(config, args.layout.as_deref())?;
    let render = render_config(config, args)?;
    let dpi = render.dpi;
    debug!(card = %card.name, layout = %layout.id, dpi, "rendering");

    let assets = args.assets.clone().unwrap_or_else(|| config.assets_root());
    let mut renderer = NativeRenderer::new(FsAssetLoader::new(assets), config.proxy_rewriter(), render);
    if let Some(path) = args.symbols.as_ref().or(config.paths.symbols.as_ref()) {
        let json = read_file(path, "symbol catalog")?;
        let catalog = parse_symbol_catalog(&json)
            .context(format!("Invalid symbol catalog: {}", path.display()))?;
        renderer = renderer.with_catalog(catalog);
    }

    let job = CardJob {
        background_url: args.art.clone(),
        transform: BackgroundTransform {
            scale: args.scale,
            offset_x: args.offset_x,
            offset_y: args.offset_y,
        },
        copyright: args.copyright.clone(),
        ..CardJob::new(card, layout)
    };
    let svg = renderer.render(&job).context("Render failed")?;
    for failure in &svg.report.failures {
        warn!("Skipped layer: {failure}");
    }

    let svg_text = svg.document.to_string();
    let stem = svg.file_name.trim_end_matches(".svg");
    let file_name = format!("{stem}.{}", args.format.extension());
    let bytes = match args.format {
        OutputFormat::Svg => svg_text.into_bytes(),
        OutputFormat::Png => {
            #[cfg(feature = "png")]
            {
                let (png, width, height) = pf_cli::svg_to_png(&svg_text)?;
                debug!(width, height, "rasterized");
                png
            }
            #[cfg(not(feature = "png"))]
            {
                bail!(
                    "PNG output requires the 'png' feature. Rebuild with: cargo build --features png"
                );
            }
        }
    };

    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    if args.json {
        let summary = RenderSummary {
            file_name: file_name.clone(),
            format: args.format.extension(),
            output_bytes: bytes.len(),
            render_time_ms: elapsed_ms,
            ..RenderSummary::new(&job, &svg, dpi)
        };
        eprintln!("{}", serde_json::to_string_pretty(&summary)?);
    }

    write_output_bytes(args.output.as_deref(), &file_name, &bytes)?;

    info!(
        "Rendered {} with layout '{}' in {elapsed_ms:.2}ms",
        job.card.name, job.layout.name
    );
    Ok(())
}

// =============================================================================
// Command: dims
// =============================================================================

fn cmd_dims(dpi: u32, margin_mm: f64, json: bool) -> Result<()> {
    let dpi = validate_dpi(dpi)?;
    let margin_mm = validate_margin(margin_mm)?;
    let report = dimensions_report(dpi, margin_mm);
    if json {
        return print_json(&report);
    }

    let canvas = &report.canvas;
    println!("DPI:          {} (scale {:.4})", canvas.dpi, report.scale_factor);
    println!("Card:         {} x {} px", canvas.card_width, canvas.card_height);
    println!("Margin:       {} px per side", canvas.margin_pixels);
    println!("Full canvas:  {} x {} px", canvas.full_width, canvas.full_height);
    println!(
        "Export:       {} x {} px ({margin_mm} mm bleed, {} px cropped per side)",
        report.export.width, report.export.height, report.export.crop
    );
    let presets: Vec<String> = DPI_PRESETS.iter().map(u32::to_string).collect();
    debug!("available presets: {}", presets.join(", "));
    Ok(())
}

// =============================================================================
// Command: fit
// =============================================================================

#[derive(Debug)]
struct FitArgs {
    text: String,
    field: String,
    layout: Option<String>,
    width: Option<f64>,
    size: f64,
    family: Option<String>,
    bold: bool,
    dpi: u32,
}

fn cmd_fit(config: &CliConfig, args: &FitArgs, json: bool) -> Result<()> {
    let dpi = validate_dpi(args.dpi)?;
    let defaults = config.render_config(RenderConfig::default())?;
    let family = args
        .family
        .clone()
        .unwrap_or(defaults.default_font_family);

    let report = match args.width {
        Some(width) => {
            let font = FontSpec::new(family, args.size * scale_factor(dpi)).bold(args.bold);
            fit_in_rect(
                &args.text,
                &font,
                PixelRect::new(0.0, 0.0, width, font.size),
                pf_core::Align::Left,
            )
        }
        None => {
            let field = parse_field(&args.field)?;
            let layout = resolve_layout(config, args.layout.as_deref())?;
            fit_field(&layout, field, &args.text, dpi, &family, args.bold)?
        }
    };

    if json {
        return print_json(&report);
    }
    let target = report.field.unwrap_or("box");
    println!(
        "{target}: {:.1}px -> {:.1}px ({:.1}px of {:.1}px){}",
        report.base_size,
        report.fitted_size,
        report.text_width,
        report.box_width,
        if report.shrunk { ", shrunk" } else { "" }
    );
    Ok(())
}

// =============================================================================
// Command: cost
// =============================================================================

fn cmd_cost(config: &CliConfig, cost: &str, layout: Option<&str>, dpi: u32, json: bool) -> Result<()> {
    let dpi = validate_dpi(dpi)?;
    let layout = resolve_layout(config, layout)?;
    let report = cost_report(&layout, cost, dpi)?;
    if json {
        return print_json(&report);
    }

    println!(
        "{} symbols, {:.1}px each, {:.1}px apart, {:.1}px wide in a {:.1}px box",
        report.row.symbols.len(),
        report.row.size,
        report.row.spacing,
        report.row.total_width,
        report.field_rect.width
    );
    for placed in &report.row.symbols {
        println!(
            "  {{{}}} {:<8} at ({:.1}, {:.1})",
            placed.symbol.value,
            placed.symbol.kind.as_str(),
            placed.x,
            placed.y
        );
    }
    if report.overflows {
        warn!("Mana cost overflows its box in layout '{}'", layout.name);
    }
    Ok(())
}

// =============================================================================
// Command: layout
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LayoutListing {
    id: String,
    name: String,
    built_in: bool,
    draft: bool,
}

fn custom_layout_id(library: &LayoutLibrary<FileStore>, key: &str) -> Result<String> {
    let layout = find_layout(library, key).with_context(|| format!("Unknown layout: {key}"))?;
    if library.is_built_in(&layout.id) {
        bail!("Layout '{}' is built in and cannot be modified", layout.name);
    }
    Ok(layout.id)
}

fn open_editor(config: &CliConfig) -> Result<LayoutEditor<FileStore, DigestIds>> {
    Ok(LayoutEditor::open(open_library(config)?, DigestIds::new()))
}

/// Load the custom layout `key` into an editor session.
fn edit_custom(config: &CliConfig, key: &str) -> Result<LayoutEditor<FileStore, DigestIds>> {
    let mut editor = open_editor(config)?;
    let id = custom_layout_id(editor.library(), key)?;
    let layout = editor
        .library()
        .find(&id)
        .with_context(|| format!("Unknown layout: {key}"))?;
    editor.load_existing(&layout)?;
    Ok(editor)
}

fn cmd_layout(config: &CliConfig, action: LayoutAction) -> Result<()> {
    match action {
        LayoutAction::List { json } => {
            let library = open_library(config)?;
            let draft = library.active_draft().map(|layout| layout.id);
            let listing: Vec<LayoutListing> = library
                .all()
                .into_iter()
                .map(|layout| LayoutListing {
                    built_in: library.is_built_in(&layout.id),
                    draft: draft.as_deref() == Some(layout.id.as_str()),
                    id: layout.id,
                    name: layout.name,
                })
                .collect();
            if json {
                return print_json(&listing);
            }
            for entry in &listing {
                let kind = if entry.built_in { "built-in" } else { "custom" };
                let marker = if entry.draft { " *" } else { "" };
                println!("{:<38} {:<9} {}{marker}", entry.id, kind, entry.name);
            }
            Ok(())
        }

        LayoutAction::Show { layout } => {
            let library = open_library(config)?;
            let found =
                find_layout(&library, &layout).with_context(|| format!("Unknown layout: {layout}"))?;
            let (_, json) = export_layout_document(&found)?;
            println!("{json}");
            Ok(())
        }

        LayoutAction::Import { input } => {
            let json = load_input(&input)?;
            let mut editor = open_editor(config)?;
            editor.import_json(&json).context("Layout import rejected")?;
            let imported = editor.editing();
            info!("Imported layout '{}'", imported.name);
            println!("{}", imported.id);
            Ok(())
        }

        LayoutAction::Export { layout, output } => {
            let library = open_library(config)?;
            let found =
                find_layout(&library, &layout).with_context(|| format!("Unknown layout: {layout}"))?;
            let (file_name, json) = export_layout_document(&found)?;
            write_output_bytes(output.as_deref(), &file_name, json.as_bytes())
        }

        LayoutAction::New { name, description } => {
            let mut editor = open_editor(config)?;
            editor.create_new()?;
            editor.set_general_info(name, description)?;
            println!("{}", editor.editing().id);
            Ok(())
        }

        LayoutAction::SetField {
            layout,
            field,
            position,
        } => {
            let field = parse_field(&field)?;
            let position: TextPosition =
                serde_json::from_str(&position).context("Invalid text position JSON")?;
            if !position.is_within_bounds() {
                warn!("Text position for {} has negative coordinates", field.as_str());
            }
            let mut editor = edit_custom(config, &layout)?;
            editor.set_text_position(field, position)?;
            Ok(())
        }

        LayoutAction::RemoveField { layout, field } => {
            let field = parse_field(&field)?;
            let mut editor = edit_custom(config, &layout)?;
            editor.remove_text_position(field)?;
            Ok(())
        }

        LayoutAction::Delete { layout } => {
            let mut editor = open_editor(config)?;
            let id = custom_layout_id(editor.library(), &layout)?;
            editor.delete_custom(&id)?;
            info!("Deleted layout {id}");
            Ok(())
        }
    }
}

// =============================================================================
// Command: lookup
// =============================================================================

fn load_dump(config: &CliConfig, explicit: Option<&Path>) -> Result<CardDump> {
    let path = explicit
        .or(config.paths.cards.as_deref())
        .context("No card-data dump; pass --cards or set paths.cards")?;
    let json = read_file(path, "card-data dump")?;
    let dump = CardDump::from_json(&json)
        .context(format!("Invalid card-data dump: {}", path.display()))?;
    debug!(cards = dump.len(), "loaded card-data dump");
    Ok(dump)
}

fn cmd_lookup(
    config: &CliConfig,
    name: &str,
    cards: Option<&Path>,
    autocomplete: bool,
    json: bool,
) -> Result<()> {
    let lookup = CardLookup::new(load_dump(config, cards)?, SystemTimer::new());

    if autocomplete {
        let names = block_on(lookup.autocomplete(name));
        if json {
            return print_json(&names);
        }
        for suggestion in names {
            println!("{suggestion}");
        }
        return Ok(());
    }

    let card = block_on(lookup.card_by_name(name)).with_context(|| format!("No card named '{name}'"))?;
    if json {
        return print_json(&card);
    }
    println!("{}", card.name);
    if let Some(cost) = card.cost() {
        println!("  Cost:   {cost}");
    }
    println!("  Type:   {}", card.type_line);
    if let Some(pt) = card.power_toughness_label() {
        println!("  P/T:    {pt}");
    }
    if let Some(oracle) = card.oracle() {
        println!("  Text:   {}", oracle.replace('\n', "\n          "));
    }
    Ok(())
}

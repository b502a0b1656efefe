use std::io;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use whaaale::config::ViewerConfig;
use whaaale::report::TextPresenter;
use whaaale::state::DisplayMode;
use whaaale::terminal::TerminalUi;
use whaaale::{Controller, LoaderRegistry};

#[derive(Parser)]
#[command(name = "whaaale")]
#[command(version, about = "Hyperspectral image viewer", long_about = None)]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the supported file formats
    Formats,

    /// Show dimensions, sample type and band labels of an image
    Info {
        /// Image file
        file: PathBuf,
    },

    /// Print the spectrum of one pixel
    Pixel {
        /// Image file
        file: PathBuf,
        /// Row (clamped to the image)
        row: i64,
        /// Column (clamped to the image)
        col: i64,
    },

    /// Print min / quartiles / mean / max spectra of an area
    Area {
        /// Image file
        file: PathBuf,
        /// Row of the first corner
        r1: i64,
        /// Column of the first corner
        c1: i64,
        /// Row of the second corner
        r2: i64,
        /// Column of the second corner
        c2: i64,
    },

    /// Find pixels with a spectrum similar to one pixel
    Similar {
        /// Image file
        file: PathBuf,
        /// Row of the base pixel
        row: i64,
        /// Column of the base pixel
        col: i64,
        /// Threshold in percent of the maximum error (default from config)
        #[arg(short, long, value_name = "PERCENT")]
        threshold: Option<f64>,
    },
}

type Viewer = Controller<TextPresenter<io::Stdout>>;

fn main() {
    let cli = Cli::parse();

    let config_path = cli.config.clone().or_else(ViewerConfig::default_path);
    let config = config_path
        .as_deref()
        .and_then(ViewerConfig::load_from)
        .unwrap_or_default();

    env_logger::Builder::new()
        .filter_level(config.preferences.log_level.to_level_filter())
        .parse_default_env()
        .init();

    let opened = last_opened(&cli.command).map(Path::to_path_buf);
    let result = match cli.command {
        Commands::Formats => cmd_formats(),
        Commands::Info { file } => cmd_info(&config, &file),
        Commands::Pixel { file, row, col } => cmd_pixel(&config, &file, row, col),
        Commands::Area {
            file,
            r1,
            c1,
            r2,
            c2,
        } => cmd_area(&config, &file, (r1, c1), (r2, c2)),
        Commands::Similar {
            file,
            row,
            col,
            threshold,
        } => cmd_similar(&config, &file, row, col, threshold),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    if let Some(path) = config_path {
        remember_directory(config, &path, opened.as_deref());
    }
}

fn last_opened(command: &Commands) -> Option<&Path> {
    match command {
        Commands::Formats => None,
        Commands::Info { file }
        | Commands::Pixel { file, .. }
        | Commands::Area { file, .. }
        | Commands::Similar { file, .. } => Some(file.as_path()),
    }
}

fn remember_directory(mut config: ViewerConfig, config_path: &Path, file: Option<&Path>) {
    let Some(dir) = file.and_then(Path::parent).filter(|d| !d.as_os_str().is_empty()) else {
        return;
    };
    let dir = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
    if config.preferences.last_directory.as_deref() == Some(dir.as_path()) {
        return;
    }
    config.preferences.last_directory = Some(dir);
    if let Err(e) = config.save_to(config_path) {
        log::warn!("Could not save configuration: {}", e);
    }
}

fn cmd_formats() -> Result<(), String> {
    let registry = LoaderRegistry::new();
    for filter in registry.filters() {
        println!("{}", filter);
    }
    Ok(())
}

/// Open `file` in a fresh controller, answering prompts on the terminal.
fn open(config: &ViewerConfig, file: &Path) -> Result<Viewer, String> {
    let registry = LoaderRegistry::new();
    let mut controller = Controller::with_settings(
        TextPresenter::new(io::stdout()),
        config.preferences.display_mode,
        config.preferences.similarity_threshold,
    );
    let mut ui = TerminalUi::stdio();

    match controller.open_file(&registry, file, &mut ui) {
        Ok(true) => Ok(controller),
        Ok(false) => Err("cancelled".to_string()),
        Err(failure) => Err(format!("{}\n\n{}", failure.message, failure.detail)),
    }
}

fn cmd_info(config: &ViewerConfig, file: &Path) -> Result<(), String> {
    let controller = open(config, file)?;
    let image = controller
        .image()
        .ok_or_else(|| "no image loaded".to_string())?;

    let (h, w, b) = image.shape();
    println!("file\t{}", file.display());
    println!("height\t{}", h);
    println!("width\t{}", w);
    println!("bands\t{}", b);
    println!("sample type\t{}", image.sample_type());
    if let Some(bpp) = image.bpp() {
        println!("bits per pixel\t{}", bpp);
    }
    if let Some(method) = image.normalisation() {
        println!("normalisation\t{}", method.name());
    }
    println!("labels\t{:?}\t{}", image.labels_type(), image.labels().join(", "));
    if let Some((r, g, b)) = image.closest_rgb_idx() {
        println!("rgb bands\t{}, {}, {}", r, g, b);
    }
    Ok(())
}

fn cmd_pixel(config: &ViewerConfig, file: &Path, row: i64, col: i64) -> Result<(), String> {
    let mut controller = open(config, file)?;
    controller.select_pixel_mode();
    controller.pointer_down(row, col);
    controller.pointer_up(row, col);
    Ok(())
}

fn cmd_area(
    config: &ViewerConfig,
    file: &Path,
    first: (i64, i64),
    second: (i64, i64),
) -> Result<(), String> {
    let mut controller = open(config, file)?;
    controller.select_area_mode();
    controller.pointer_down(first.0, first.1);
    controller.pointer_up(second.0, second.1);
    Ok(())
}

fn cmd_similar(
    config: &ViewerConfig,
    file: &Path,
    row: i64,
    col: i64,
    threshold: Option<f64>,
) -> Result<(), String> {
    let mut controller = open(config, file)?;
    if let Some(percent) = threshold {
        controller.set_threshold(percent);
    }
    controller.set_display_mode(DisplayMode::Mono);
    controller.select_similar_mode();
    controller.pointer_down(row, col);
    controller.pointer_up(row, col);
    Ok(())
}

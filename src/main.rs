use assetpress::batch::{BatchFailure, process_batch};
use assetpress::error::ErrorKind;
use assetpress::favicon::{FaviconFormat, IcoEncoding, generate_favicon};
use assetpress::pwa::generate_pwa_icons;
use assetpress::types::{ImageBlob, OutputFormat};
use assetpress::{config, output};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter (`info` when unset).
const LOG_ENV: &str = "ASSETPRESS_LOG";

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "assetpress")]
#[command(about = "Optimize images and generate favicons and PWA asset bundles")]
#[command(long_about = "\
Optimize images and generate favicons and PWA asset bundles

Commands:

  optimize   HEIC → JPEG (always), optional resize, then convert to the
             configured format. One bad file never stops the rest.
  favicon    Render square favicons and package them as .ico or .png.
  pwa        Render PWA icons and splash screens and zip them together
             with a manifest.json (pwa-assets.zip).

Settings come from ./assetpress.toml (or --config), with command-line flags
taking precedence. Set ASSETPRESS_LOG=debug for per-stage logging.

Run 'assetpress gen-config' to generate a documented assetpress.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Config file (default: ./assetpress.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output directory
    #[arg(long, default_value = "out", global = true)]
    out_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Optimize one or more images
    Optimize {
        /// Input images
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Output format: webp, jpeg, png, avif, heic or original
        #[arg(long)]
        format: Option<OutputFormat>,
        /// Encoder quality, 1-100
        #[arg(long)]
        quality: Option<u32>,
        /// Resize width (resize needs both bounds)
        #[arg(long)]
        max_width: Option<u32>,
        /// Resize height (resize needs both bounds)
        #[arg(long)]
        max_height: Option<u32>,
    },
    /// Generate a favicon
    Favicon {
        /// Source image
        file: PathBuf,
        /// Comma-separated square sizes, e.g. 16,32,48
        #[arg(long, value_delimiter = ',')]
        sizes: Option<Vec<u32>>,
        /// Output container
        #[arg(long, value_enum)]
        format: Option<FaviconArg>,
        /// Write a real multi-size ICO instead of a single PNG payload
        #[arg(long)]
        ico_container: bool,
    },
    /// Generate the PWA icon/splash bundle
    Pwa {
        /// Source image
        file: PathBuf,
        /// Splash background and manifest colour
        #[arg(long)]
        background: Option<String>,
        /// Manifest name
        #[arg(long)]
        name: Option<String>,
        /// Manifest short_name
        #[arg(long)]
        short_name: Option<String>,
    },
    /// Print a stock assetpress.toml with all options documented
    GenConfig,
}

#[derive(Clone, Copy, ValueEnum)]
enum FaviconArg {
    Ico,
    Png,
}

impl From<FaviconArg> for FaviconFormat {
    fn from(arg: FaviconArg) -> Self {
        match arg {
            FaviconArg::Ico => FaviconFormat::Ico,
            FaviconArg::Png => FaviconFormat::Png,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging();

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let mut app_config = match &cli.config {
        Some(path) => config::load_config_file(path)?,
        None => config::load_config(Path::new("."))?,
    };
    init_thread_pool(&app_config.processing);

    match cli.command {
        Command::Optimize {
            files,
            format,
            quality,
            max_width,
            max_height,
        } => {
            let optimize = &mut app_config.optimize;
            optimize.format = format.unwrap_or(optimize.format);
            optimize.quality = quality.unwrap_or(optimize.quality);
            optimize.max_width = max_width.unwrap_or(optimize.max_width);
            optimize.max_height = max_height.unwrap_or(optimize.max_height);
            optimize.validate()?;

            let mut blobs = Vec::with_capacity(files.len());
            let mut unreadable = Vec::new();
            for path in &files {
                match ImageBlob::read(path) {
                    Ok(blob) => blobs.push(blob),
                    Err(e) => {
                        tracing::warn!(path = %path.display(), "cannot read: {e}");
                        unreadable.push(BatchFailure {
                            name: path.display().to_string(),
                            kind: ErrorKind::Io,
                            message: e.to_string(),
                        });
                    }
                }
            }

            let mut report = process_batch(&blobs, &app_config.optimize);
            report.failures.splice(0..0, unreadable);

            std::fs::create_dir_all(&cli.out_dir)?;
            for blob in &report.outputs {
                std::fs::write(cli.out_dir.join(blob.name()), blob.bytes())?;
            }
            output::print_batch_output(&report, &cli.out_dir);

            if report.all_failed() {
                return Err(format!("all {} files failed", report.failures.len()).into());
            }
        }
        Command::Favicon {
            file,
            sizes,
            format,
            ico_container,
        } => {
            let favicon = &mut app_config.favicon;
            if let Some(sizes) = sizes {
                favicon.sizes = sizes;
            }
            if let Some(format) = format {
                favicon.output_format = format.into();
            }
            if ico_container {
                favicon.ico_encoding = IcoEncoding::Container;
            }

            let source = ImageBlob::read(&file)?;
            let icon = generate_favicon(&source, favicon)?;
            std::fs::create_dir_all(&cli.out_dir)?;
            std::fs::write(cli.out_dir.join(icon.name()), icon.bytes())?;
            output::print_favicon_output(&icon, &cli.out_dir);
        }
        Command::Pwa {
            file,
            background,
            name,
            short_name,
        } => {
            let pwa = &mut app_config.pwa;
            if let Some(background) = background {
                pwa.background_color = background;
            }
            if let Some(name) = name {
                pwa.name = name;
            }
            if let Some(short_name) = short_name {
                pwa.short_name = short_name;
            }

            let source = ImageBlob::read(&file)?;
            let bundle = generate_pwa_icons(&source, pwa)?;
            std::fs::create_dir_all(&cli.out_dir)?;
            std::fs::write(
                cli.out_dir.join(bundle.archive.name()),
                bundle.archive.bytes(),
            )?;
            output::print_pwa_output(&bundle, &cli.out_dir);
        }
        Command::GenConfig => {}
    }

    Ok(())
}

/// Install the stderr log subscriber. The filter comes from `ASSETPRESS_LOG`.
fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

use clap::{Parser, Subcommand};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use wandgate::{
    Gate, ImageOptions, ImageOutput, ImageSource, RustEngine, WandError, config, logging, output,
};

/// Options shared by resize and thumbnail.
#[derive(clap::Args, Clone)]
struct ImageArgs {
    /// Input image path, or `-` for stdin
    input: String,

    /// Output path, or `-` for stdout
    #[arg(short, long)]
    output: String,

    /// Target width in pixels (0 = derive from height)
    #[arg(long, allow_negative_numbers = true)]
    width: Option<i64>,

    /// Target height in pixels (0 = derive from width)
    #[arg(long, allow_negative_numbers = true)]
    height: Option<i64>,

    /// Encoder quality 0-100 (0 = encoder default)
    #[arg(long, allow_negative_numbers = true)]
    quality: Option<i64>,

    /// Output format by extension (png, jpg, webp, tiff, avif)
    #[arg(long)]
    format: Option<String>,

    /// Fill the target box and center-crop the overflow
    #[arg(long)]
    autocrop: bool,

    /// Per-request ceiling for width and height
    #[arg(long)]
    max_dimension: Option<u32>,

    /// Options as a JSON object; flags override its keys
    #[arg(long, value_name = "JSON")]
    options: Option<String>,
}

impl ImageArgs {
    fn image_options(&self) -> Result<ImageOptions, WandError> {
        let base = match &self.options {
            Some(json) => ImageOptions::from_json(json)?,
            None => ImageOptions::new(),
        };
        let mut flags = ImageOptions::new();
        if let Some(width) = self.width {
            flags = flags.width(width);
        }
        if let Some(height) = self.height {
            flags = flags.height(height);
        }
        if let Some(quality) = self.quality {
            flags = flags.quality(quality);
        }
        if let Some(format) = &self.format {
            flags = flags.format(format.as_str());
        }
        if self.autocrop {
            flags = flags.autocrop(true);
        }
        if let Some(max) = self.max_dimension {
            flags = flags.max_dimension(max);
        }
        Ok(base.merge(flags))
    }
}

#[derive(Parser)]
#[command(name = "wandgate")]
#[command(about = "Validate and dispatch image resize requests")]
#[command(long_about = "\
Validate and dispatch image resize requests

Every request is checked before any decoding starts: options are normalized
and range-checked, the input path is resolved and must be a readable regular
file, and the requested size must stay under the dimension ceiling.

Examples:

  wandgate resize photo.jpg -o small.jpg --width 640
  wandgate resize photo.jpg -o square.png --width 256 --height 256 --autocrop
  wandgate thumbnail - -o - < photo.jpg > thumb.jpg
  wandgate resize photo.jpg -o out.webp --options '{\"width\":\"800\",\"format\":\"webp\"}'
  wandgate rotate photo.jpg --degrees 90 -o rotated.jpg

Set RUST_LOG=wandgate=debug to trace each request.
Run 'wandgate gen-config' to generate a documented wandgate.toml.")]
#[command(version)]
struct Cli {
    /// Configuration file
    #[arg(long, default_value = "wandgate.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resize an image
    Resize(ImageArgs),
    /// Produce a thumbnail (keeps the source format)
    Thumbnail(ImageArgs),
    /// Rotate an image clockwise
    Rotate {
        /// Input image path, or `-` for stdin
        input: String,

        /// Output path, or `-` for stdout
        #[arg(short, long)]
        output: String,

        /// Clockwise angle in degrees (multiples of 90)
        #[arg(long, allow_negative_numbers = true)]
        degrees: f64,
    },
    /// Print a stock wandgate.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_subscriber(logging::DEFAULT_FILTER);
    let cli = Cli::parse();

    let (tx, rx) = mpsc::channel();
    let deliver = move |result: Result<ImageOutput, WandError>| {
        tx.send(result).ok();
    };

    let (operation, input, dest, submitted) = match cli.command {
        Command::Resize(args) => {
            let gate = open_gate(&cli.config)?;
            let submitted = args
                .image_options()
                .and_then(|opts| gate.resize(read_source(&args.input)?, opts, deliver));
            ("resize", args.input, args.output, submitted)
        }
        Command::Thumbnail(args) => {
            let gate = open_gate(&cli.config)?;
            let submitted = args.image_options().and_then(|opts| {
                let opts = (!opts.is_empty()).then_some(opts);
                gate.thumbnail(read_source(&args.input)?, opts, deliver)
            });
            ("thumbnail", args.input, args.output, submitted)
        }
        Command::Rotate {
            input,
            output,
            degrees,
        } => {
            let gate = open_gate(&cli.config)?;
            let submitted = read_source(&input).and_then(|src| gate.rotate(src, degrees, deliver));
            ("rotate", input, output, submitted)
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
            return Ok(());
        }
    };

    let result = submitted.and_then(|()| rx.recv().unwrap_or_else(|_| Err(worker_vanished())));
    match result {
        Ok(image) => {
            write_dest(&dest, &image.data)?;
            output::print_lines(&output::format_success(operation, &input, &dest, &image));
            Ok(())
        }
        Err(err) => {
            output::print_lines(&output::format_failure(operation, &input, &err));
            std::process::exit(1);
        }
    }
}

fn open_gate(config_path: &Path) -> Result<Gate<RustEngine>, config::ConfigError> {
    let cfg = config::load_config(config_path)?;
    init_thread_pool(&cfg.processing);
    Ok(Gate::with_config(RustEngine::new(), &cfg))
}

/// `-` reads stdin into a buffer; anything else is a path for the gate to validate.
fn read_source(input: &str) -> Result<ImageSource, WandError> {
    if input != "-" {
        return Ok(ImageSource::from(input));
    }
    let mut bytes = Vec::new();
    std::io::stdin()
        .read_to_end(&mut bytes)
        .map_err(|e| WandError::InvalidPath(format!("failed to read stdin: {e}")))?;
    Ok(ImageSource::from(bytes))
}

fn write_dest(dest: &str, data: &[u8]) -> std::io::Result<()> {
    if dest == "-" {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(data)?;
        return stdout.flush();
    }
    let path = Path::new(dest);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, data)
}

fn worker_vanished() -> WandError {
    WandError::Engine(wandgate::imaging::EngineError::ProcessingFailed(
        "worker exited without a result".into(),
    ))
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; the user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

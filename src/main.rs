use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::{debug, info};
use serde::Serialize;

use ppmgrid::format::detect_format;
use ppmgrid::ppm::ChannelPolicy;
use ppmgrid::ppm_consumer;
use ppmgrid::{Config, ImageFormat, LoadError, load};

/// Decode plain PPM images, inspect them and convert them
#[derive(Parser)]
#[command(name = "ppmgrid", version, about)]
struct Cli {
    /// Configuration file (defaults to ./ppmgrid.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Keep channel values above the header's max value instead of failing
    #[arg(long, global = true)]
    lenient: bool,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Print format, dimensions and max value as JSON
    Info {
        file: PathBuf,
        /// Force the input format: ppm, jpeg or png
        #[arg(long)]
        format: Option<ImageFormat>,
    },
    /// Decode every file and report the ones that fail
    Check {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Convert an image between PPM, PNG and JPEG
    Convert {
        input: PathBuf,
        output: PathBuf,
        /// Force the input format
        #[arg(long)]
        from: Option<ImageFormat>,
        /// Output format; defaults to the output extension, then the config
        #[arg(long)]
        to: Option<ImageFormat>,
    },
}

#[derive(Serialize)]
struct ImageInfo<'a> {
    file: &'a Path,
    format: ImageFormat,
    width: u32,
    height: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_value: Option<u32>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let mut config = match Config::load_or_default(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Config error: {e}");
            return ExitCode::FAILURE;
        }
    };
    if cli.lenient {
        config.decode.channels = ChannelPolicy::Lenient;
    }
    debug!("decode options: {:?}", config.decode);

    let result = match cli.command {
        Cmd::Info { file, format } => cmd_info(&config, &file, format),
        Cmd::Check { files } => cmd_check(&config, &files),
        Cmd::Convert {
            input,
            output,
            from,
            to,
        } => cmd_convert(&config, &input, &output, from, to),
    };

    match result {
        Ok(code) => code,
        Err(msg) => {
            eprintln!("{msg}");
            ExitCode::FAILURE
        }
    }
}

fn describe(path: &Path, e: &LoadError) -> String {
    if e.is_not_found() {
        format!("File {} not found!", path.display())
    } else {
        format!("{}: {}", path.display(), e)
    }
}

fn cmd_info(config: &Config, file: &Path, format: Option<ImageFormat>) -> Result<ExitCode, String> {
    let format = detect_format(file, format).map_err(|e| describe(file, &e))?;
    let loaded = load(file, Some(format), &config.decode).map_err(|e| describe(file, &e))?;

    let info = ImageInfo {
        file,
        format,
        width: loaded.width(),
        height: loaded.height(),
        max_value: loaded.max_value(),
    };
    let json = serde_json::to_string_pretty(&info).map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(ExitCode::SUCCESS)
}

fn cmd_check(config: &Config, files: &[PathBuf]) -> Result<ExitCode, String> {
    let mut failed = 0usize;
    for file in files {
        match load(file, None, &config.decode) {
            Ok(loaded) => {
                println!("{}: ok ({}x{})", file.display(), loaded.width(), loaded.height());
            }
            Err(e) => {
                failed += 1;
                eprintln!("{}", describe(file, &e));
            }
        }
    }

    info!("checked {} file(s), {} failed", files.len(), failed);
    Ok(if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn cmd_convert(
    config: &Config,
    input: &Path,
    output: &Path,
    from: Option<ImageFormat>,
    to: Option<ImageFormat>,
) -> Result<ExitCode, String> {
    let target = to
        .or_else(|| ImageFormat::from_path(output))
        .unwrap_or(config.output.format);

    let loaded = load(input, from, &config.decode).map_err(|e| describe(input, &e))?;
    ppm_consumer::save(&loaded, output, target)
        .map_err(|e| format!("{}: {}", output.display(), e))?;
    Ok(ExitCode::SUCCESS)
}

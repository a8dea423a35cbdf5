//! Dataset preparation tool for radiance-field and point-cloud pipelines.
//!
//! Usage:
//! ```bash
//! camera-info cam-info \
//!   --images-dir data/family/images \
//!   --intrinsics-file data/family/sparse/0/cam_intrinsics.txt \
//!   --extrinsics-file data/family/sparse/0/cam_extrinsics.txt \
//!   --output-dir data/family/sparse/0
//!
//! camera-info subsample --images-dir data/family/images --step 2
//! camera-info resize --images-dir data/family/images --width 512 --height 272
//! ```

use camera_info_tools::camera::Resolution;
use camera_info_tools::config::ConfigFile;
use camera_info_tools::dataset::{resize_images, subsample_images};
use camera_info_tools::report::generate_camera_info;
use clap::{Args, Parser, Subcommand};
use flexi_logger::{colored_detailed_format, detailed_format, Duplicate, FileSpec, Logger};
use log::info;
use std::path::PathBuf;

/// Camera-info generation and image dataset preparation
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level filter (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Also write logs into this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write cam_infos_created.txt from intrinsics, extrinsics and images
    CamInfo(CamInfoArgs),
    /// Keep every n-th .jpg frame and renumber the rest
    Subsample {
        #[arg(short = 'i', long, env = "CAMINFO_IMAGES_DIR")]
        images_dir: PathBuf,
        #[arg(short = 's', long, default_value_t = 2)]
        step: usize,
    },
    /// Resize all images of a folder in place
    Resize {
        #[arg(short = 'i', long, env = "CAMINFO_IMAGES_DIR")]
        images_dir: PathBuf,
        #[arg(long, default_value_t = 512)]
        width: u32,
        #[arg(long, default_value_t = 272)]
        height: u32,
    },
}

#[derive(Args, Debug)]
struct CamInfoArgs {
    /// YAML file providing any of the paths below
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Folder with the .jpg/.png images, in camera order by file name
    #[arg(short = 'i', long, env = "CAMINFO_IMAGES_DIR")]
    images_dir: Option<PathBuf>,

    /// Focal length table
    #[arg(long, env = "CAMINFO_INTRINSICS_FILE")]
    intrinsics_file: Option<PathBuf>,

    /// Pose matrix dump
    #[arg(long, env = "CAMINFO_EXTRINSICS_FILE")]
    extrinsics_file: Option<PathBuf>,

    /// Directory receiving cam_infos_created.txt
    #[arg(short = 'o', long, env = "CAMINFO_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Fail on pose blocks without exactly three rows instead of dropping them
    #[arg(long)]
    strict_extrinsics: bool,

    /// Also write cam_infos_created.json
    #[arg(long)]
    json: bool,
}

impl CamInfoArgs {
    fn into_config_file(self) -> Result<ConfigFile, Box<dyn std::error::Error>> {
        let from_cli = ConfigFile {
            images_dir: self.images_dir,
            intrinsics_file: self.intrinsics_file,
            extrinsics_file: self.extrinsics_file,
            output_dir: self.output_dir,
            strict_extrinsics: self.strict_extrinsics.then_some(true),
            write_json: self.json.then_some(true),
        };
        let merged = match self.config {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                from_cli.or(ConfigFile::load_from_yaml(path)?)
            }
            None => from_cli,
        };
        Ok(merged)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let logger = Logger::try_with_str(&cli.log_level)?.format_for_stderr(colored_detailed_format);
    let logger = match &cli.log_dir {
        Some(dir) => logger
            .log_to_file(
                FileSpec::default()
                    .directory(dir)
                    .suppress_timestamp()
                    .suffix("log"),
            )
            .duplicate_to_stdout(Duplicate::All)
            .format_for_files(detailed_format)
            .format_for_stdout(colored_detailed_format),
        None => logger,
    };
    let _logger = logger.start()?;

    match cli.command {
        Command::CamInfo(args) => {
            let config = args.into_config_file()?.into_report_config()?;
            let report_path = generate_camera_info(&config)?;
            println!("Camera info written to {}", report_path.display());
        }
        Command::Subsample { images_dir, step } => {
            let kept = subsample_images(&images_dir, step)?;
            println!("Kept {} images in {}", kept.len(), images_dir.display());
        }
        Command::Resize {
            images_dir,
            width,
            height,
        } => {
            let summary = resize_images(&images_dir, Resolution { width, height })?;
            println!(
                "Resized {} images to {width}x{height} ({} failed)",
                summary.resized, summary.failed
            );
        }
    }

    Ok(())
}

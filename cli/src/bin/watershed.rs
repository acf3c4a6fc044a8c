use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{self, EnvFilter};
use watershed::EngineConfig;
use watershed_cli::{load_markers, run_job, write_output, OutputFormat, SegmentationJob};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a segmentation job described by a TOML or JSON file
    Run {
        /// Path to the job file
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Segment an image from a markers file
    Segment {
        /// Image to segment
        #[arg(short, long)]
        image: PathBuf,
        /// JSON array of markers
        #[arg(short, long)]
        markers: PathBuf,
        /// Working resolution control; higher means finer segmentation
        #[arg(short, long, default_value = "400.0")]
        sensitivity: f64,
        /// Where to write the polygons
        #[arg(short, long)]
        output: PathBuf,
        /// Output format
        #[arg(long, default_value_t = OutputFormat::Geojson)]
        format: OutputFormat,
        /// Leave out polygons too small or malformed to be annotations
        #[arg(long)]
        drop_invalid: bool,
        /// Douglas-Peucker epsilon in working pixels
        #[arg(long, default_value = "1.0")]
        epsilon: f32,
    },
    /// Print the JSON schema of job files
    Schema,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config } => {
            let job = SegmentationJob::from_file(&config)?;
            process_job(&job)?;
        }
        Commands::Segment {
            image,
            markers,
            sensitivity,
            output,
            format,
            drop_invalid,
            epsilon,
        } => {
            let job = SegmentationJob {
                image: path_string(&image),
                sensitivity,
                output: path_string(&output),
                format,
                drop_invalid,
                engine: EngineConfig {
                    simplify_epsilon: epsilon,
                    ..EngineConfig::default()
                },
                markers: load_markers(&markers)?,
            };
            process_job(&job)?;
        }
        Commands::Schema => {
            let schema = SegmentationJob::schema();
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
    }

    Ok(())
}

fn process_job(job: &SegmentationJob) -> Result<()> {
    let set = run_job(job)?;

    if set.polygons.is_empty() {
        warn!("No polygons produced");
    }
    for polygon in &set.polygons {
        info!(
            "Region {} '{}': {} vertices, area {:.1}",
            polygon.id,
            polygon.label_id,
            polygon.points.len(),
            polygon.area()
        );
    }

    write_output(&set, &job.output, job.format)?;
    info!("Wrote {} polygons to {} as {}", set.polygons.len(), job.output, job.format);
    Ok(())
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

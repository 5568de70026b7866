use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use foodcloud_rs::cloud_pipeline::{
    export::cloud_file_name, AreaPriority, CameraIntrinsics, CloudWriter, ColorNormalization,
    FileFrameReader, FoodCloudPipeline, FrameSource, InputOrderOverwrite, LasCloudWriter,
    PipelineConfig, PointCloud, RankingPolicy, SceneContext,
};
use foodcloud_rs::logger;

use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Ranking {
    /// Later annotations win overlapping pixels
    InputOrder,
    /// Larger masks are painted first
    Area,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Normalization {
    /// rgb / 255
    Unit,
    /// (rgb - 255) / 255, as the reference demo produced
    ReferenceInverted,
}

impl From<Normalization> for ColorNormalization {
    fn from(value: Normalization) -> Self {
        match value {
            Normalization::Unit => ColorNormalization::Unit,
            Normalization::ReferenceInverted => ColorNormalization::ReferenceInverted,
        }
    }
}

#[derive(Parser)]
#[command(name = "foodcloud")]
#[command(about = "Per-item food point clouds from a color image, depth map and segmentation annotation")]
#[command(version)]
struct Cli {
    /// Color image (PNG or JPEG)
    #[arg(long, default_value = "data/demo.jpg")]
    color: PathBuf,

    /// Depth map (.npy array or single-channel TIFF)
    #[arg(long, default_value = "data/demo.npy")]
    depth: PathBuf,

    /// Segmentation annotation JSON
    #[arg(long, default_value = "data/demo.json")]
    annotation: PathBuf,

    /// Camera intrinsics JSON (default: built-in 1280x720 depth intrinsics)
    #[arg(long)]
    intrinsics: Option<PathBuf>,

    /// Directory receiving one LAS file per instance
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Overlap resolution between instance masks
    #[arg(long, value_enum, default_value_t = Ranking::InputOrder)]
    ranking: Ranking,

    /// Point color normalization
    #[arg(long, value_enum, default_value_t = Normalization::Unit)]
    color_normalization: Normalization,

    /// Geometry to hide in the scene (repeatable)
    #[arg(long = "hide")]
    hidden: Vec<String>,

    /// Enable debug logging unless RUST_LOG is set
    #[arg(short, long)]
    verbose: bool,
}

fn run_pipeline<P: RankingPolicy>(
    policy: P,
    intrinsics: CameraIntrinsics,
    config: PipelineConfig,
    source: &FrameSource,
) -> anyhow::Result<Vec<PointCloud>> {
    let pipeline = FoodCloudPipeline::with_custom(FileFrameReader, policy, intrinsics, config)?;
    let intrinsics = pipeline.intrinsics();
    debug!(
        fx = intrinsics.fx,
        fy = intrinsics.fy,
        ppx = intrinsics.ppx,
        ppy = intrinsics.ppy,
        coeffs = ?intrinsics.coeffs,
        config = ?pipeline.config(),
        "Pipeline configured"
    );
    let (clouds, timings) = pipeline.run_with_timings(source)?;
    timings.log_summary();
    Ok(clouds)
}

fn export_clouds(clouds: &[PointCloud], output_dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("creating {}", output_dir.display()))?;

    let writer = LasCloudWriter::default();
    for cloud in clouds {
        let path = output_dir.join(cloud_file_name(cloud, "las"));
        writer.write_cloud(cloud, &path)?;
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logger::init_with_default(if cli.verbose { "debug" } else { "info" });

    info!("Starting foodcloud...");

    let intrinsics = match &cli.intrinsics {
        Some(path) => CameraIntrinsics::from_json_file(path)?,
        None => CameraIntrinsics::depth_1280x720(),
    };
    let config = PipelineConfig::builder()
        .color_normalization(cli.color_normalization.into())
        .build();
    let source = FrameSource::new(&cli.color, &cli.depth, &cli.annotation);

    let clouds = match cli.ranking {
        Ranking::InputOrder => run_pipeline(InputOrderOverwrite, intrinsics, config, &source)?,
        Ranking::Area => run_pipeline(AreaPriority, intrinsics, config, &source)?,
    };

    if let Some(output_dir) = &cli.output_dir {
        export_clouds(&clouds, output_dir)?;
    }

    let mut scene = SceneContext::new();
    scene.load(clouds);
    debug!(geometries = ?scene.names().collect::<Vec<_>>(), "Scene loaded");
    for name in &cli.hidden {
        match scene.set_visible(name, false).and_then(|()| scene.is_visible(name)) {
            Ok(visible) => info!(name = %name, visible, "Visibility updated"),
            Err(e) => warn!("{}", e),
        }
    }

    for geometry in scene.geometries() {
        info!(
            name = %geometry.name,
            points = geometry.cloud.len(),
            score = ?geometry.cloud.score,
            anchor = ?geometry.anchor,
            visible = geometry.visible,
            "Geometry"
        );
    }
    info!(
        clouds = scene.visible_clouds().count(),
        points = scene.visible_clouds().map(PointCloud::len).sum::<usize>(),
        "Visible geometry"
    );
    match scene.camera_pose() {
        Some(pose) => info!(center = ?pose.center, eye = ?pose.eye, fov = pose.field_of_view_deg, "Camera"),
        None => info!("No food instances found"),
    }

    Ok(())
}

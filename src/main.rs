use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use room::assets::{FileAssetLoader, ModelRef, StaticRepository};
use room::config::EngineConfig;
use room::engine::{Action, RoomEngine};
use room::error::{ConfigError, ExportError, LayoutError};
use room::export::write_png;
use room::grid::{GridCanvas, Layout, LengthUnit};
use room::raster::SoftwareRenderer;
use room::scene;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("invalid layout: {0}")]
    Layout(#[from] LayoutError),
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("export failed: {0}")]
    Export(#[from] ExportError),
    #[error("scene encode failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("model {reference} failed to load: {message}")]
    ModelLoad { reference: String, message: String },
}

#[derive(Parser, Debug)]
#[command(name = "decora", about = "Floorplan to 3D room: build scenes and export four-view collages")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the synthesized scene for a layout as JSON.
    Build(BuildCommand),
    /// Print each wall's length label.
    Labels(LabelsCommand),
    /// Place models and write the four-view collage PNG.
    Export(ExportCommand),
}

#[derive(Args, Debug)]
struct BuildCommand {
    /// Layout JSON file (an array of `{x1, y1, x2, y2}`).
    #[arg(long, env = "DECORA_LAYOUT")]
    layout: PathBuf,

    #[arg(long)]
    pretty: bool,
}

#[derive(Args, Debug)]
struct LabelsCommand {
    #[arg(long, env = "DECORA_LAYOUT")]
    layout: PathBuf,

    /// Overrides `ROOM_UNIT`.
    #[arg(long, value_parser = parse_unit)]
    unit: Option<LengthUnit>,
}

#[derive(Args, Debug)]
struct ExportCommand {
    #[arg(long, env = "DECORA_LAYOUT")]
    layout: PathBuf,

    /// Output PNG path.
    #[arg(long, default_value = "room.png")]
    out: PathBuf,

    /// Model to place, as `NAME=PATH` to a `.glb` or `.gltf` file. Repeatable.
    #[arg(long = "model", value_parser = parse_model_arg)]
    models: Vec<(String, String)>,

    /// Continue the export when a model fails to load.
    #[arg(long)]
    skip_failed: bool,
}

fn parse_model_arg(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, path)) if !name.is_empty() && !path.is_empty() => Ok((name.to_string(), path.to_string())),
        _ => Err(format!("expected NAME=PATH, got {raw:?}")),
    }
}

fn parse_unit(raw: &str) -> Result<LengthUnit, String> {
    match raw {
        "feet" => Ok(LengthUnit::Feet),
        "meters" => Ok(LengthUnit::Meters),
        other => Err(format!("expected feet or meters, got {other:?}")),
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Build(cmd) => run_build(&cmd),
        Command::Labels(cmd) => run_labels(&cmd),
        Command::Export(cmd) => run_export(cmd).await,
    }
}

fn read_layout(path: &Path) -> Result<Layout, CliError> {
    let raw = std::fs::read_to_string(path).map_err(|source| CliError::Read { path: path.to_path_buf(), source })?;
    Ok(Layout::from_json(&raw)?)
}

fn run_build(cmd: &BuildCommand) -> Result<(), CliError> {
    let layout = read_layout(&cmd.layout)?;
    let scene = scene::build(&layout);
    let rendered = if cmd.pretty { serde_json::to_string_pretty(&scene)? } else { serde_json::to_string(&scene)? };
    println!("{rendered}");
    Ok(())
}

fn run_labels(cmd: &LabelsCommand) -> Result<(), CliError> {
    let config = EngineConfig::from_env()?;
    let mut canvas = GridCanvas::with_layout(read_layout(&cmd.layout)?);
    canvas.set_unit(cmd.unit.unwrap_or(config.unit));
    for (i, wall) in canvas.layout().walls().iter().enumerate() {
        println!("{i}\t({}, {}) -> ({}, {})\t{}", wall.x1, wall.y1, wall.x2, wall.y2, canvas.length_label(wall));
    }
    Ok(())
}

async fn run_export(cmd: ExportCommand) -> Result<(), CliError> {
    let config = EngineConfig::from_env()?;
    let layout = read_layout(&cmd.layout)?;

    let mut repository = StaticRepository::new();
    for (name, path) in &cmd.models {
        repository.insert(name.clone(), path.clone());
    }

    let mut engine = RoomEngine::new(config, Arc::new(repository), Arc::new(FileAssetLoader));
    engine.load_layout(layout);

    for (name, _) in &cmd.models {
        engine.select_model(ModelRef::new(name.clone()));
    }
    for action in engine.settle_loads().await {
        if let Action::LoadFailed { reference, message, .. } = action {
            if !cmd.skip_failed {
                return Err(CliError::ModelLoad { reference: reference.to_string(), message });
            }
            tracing::warn!(%reference, %message, "model skipped");
            eprintln!("skipped {reference}: {message}");
        }
    }

    let mut renderer = SoftwareRenderer::new();
    let collage = engine.export(&mut renderer)?;
    write_png(&collage, &cmd.out)?;
    eprintln!(
        "wrote {} ({}x{}, {} walls, {} objects)",
        cmd.out.display(),
        collage.width(),
        collage.height(),
        engine.scene().walls.len(),
        engine.objects().len()
    );
    Ok(())
}

use anyhow::{Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tideview_assets::SkyboxFace;
use tideview_scene::{ConfigFormat, PlaneMesh, SceneConfig, WaterParam, WaveField};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tideview-cli", about = "CLI tool for tideview scenes")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version, crate info and scene defaults
    Info,
    /// Print (or write) the default scene config
    Config {
        /// Output format; yaml unless --output names a .json file
        #[arg(short, long, value_enum)]
        format: Option<Format>,
        /// Write to this file instead of stdout; must agree with --format
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Check that every skybox face exists and decodes
    CheckAssets {
        /// Asset directory
        #[arg(short, long, default_value = "assets")]
        dir: PathBuf,
    },
    /// Evaluate the water surface at one point
    Sample {
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        x: f32,
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        z: f32,
        /// Seconds since scene start
        #[arg(short, long, default_value = "0")]
        time: f32,
        /// Scene config to take the water settings from
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Yaml,
    Json,
}

impl From<Format> for ConfigFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Yaml => ConfigFormat::Yaml,
            Format::Json => ConfigFormat::Json,
        }
    }
}

#[derive(Debug, Serialize)]
struct SurfaceSample {
    x: f32,
    z: f32,
    time: f32,
    big_wave: f32,
    elevation: f32,
    mix_strength: f32,
    color: String,
}

fn sample(config: &SceneConfig, x: f32, z: f32, time: f32) -> SurfaceSample {
    let field = WaveField::new(&config.water);
    let elevation = field.elevation(x, z, time);
    let color = field.color(elevation);
    SurfaceSample {
        x,
        z,
        time,
        big_wave: field.big_wave(x, z, time),
        elevation,
        mix_strength: field.mix_strength(elevation),
        color: color.to_hex(),
    }
}

/// The output file's extension decides the format; an explicit `--format`
/// has to agree with it.
fn config_format(format: Option<Format>, output: Option<&Path>) -> Result<ConfigFormat> {
    let Some(path) = output else {
        return Ok(format.unwrap_or(Format::Yaml).into());
    };
    let from_path = ConfigFormat::from_path(path)?;
    if let Some(format) = format {
        let requested = ConfigFormat::from(format);
        if requested != from_path {
            bail!(
                "--format {requested:?} conflicts with output file {} ({from_path:?})",
                path.display()
            );
        }
    }
    Ok(from_path)
}

fn load_config(path: Option<&Path>) -> Result<SceneConfig> {
    Ok(match path {
        Some(path) => SceneConfig::load(path)?,
        None => SceneConfig::default(),
    })
}

fn info() {
    let config = SceneConfig::default();
    let mesh = PlaneMesh::water();
    println!("tideview-cli v{}", env!("CARGO_PKG_VERSION"));
    println!("scene: {}", tideview_scene::crate_info());
    println!("assets: {}", tideview_assets::crate_info());
    println!(
        "water plane: {}x{} units, {}x{} segments, {} vertices, {} triangles",
        mesh.width,
        mesh.depth,
        mesh.segments_x,
        mesh.segments_z,
        mesh.vertex_count(),
        mesh.index_count() / 3
    );
    println!(
        "camera: fov={} near={} far={} position={}",
        config.camera.fov_degrees, config.camera.near, config.camera.far, config.camera.position
    );
    println!("clear color: {}", config.clear_color);
    println!("water defaults:");
    for param in WaterParam::ALL {
        let range = param.range();
        println!(
            "  {:<24} {:>8.3}  [{}, {}] step {}",
            param.label(),
            param.value(&config.water),
            range.start(),
            range.end(),
            param.step()
        );
    }
    println!("  {:<24} {:>8}", "depthColor", config.water.depth_color);
    println!("  {:<24} {:>8}", "surfaceColor", config.water.surface_color);
}

fn check_assets(dir: &Path) -> Result<()> {
    println!("Checking skybox in {}", dir.display());
    let statuses = tideview_assets::check_dir(dir);
    let failed = statuses.iter().filter(|s| s.result.is_err()).count();
    for status in &statuses {
        println!("  {status}");
    }
    if failed > 0 {
        bail!("{failed} of {} skybox faces failed", SkyboxFace::ALL.len());
    }
    match tideview_assets::SkyboxImages::load(dir) {
        Ok(images) => println!("Skybox OK: six {0}x{0} faces", images.size()),
        Err(e) => bail!("skybox faces do not form a cube: {e}"),
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => info(),
        Commands::Config { format, output } => {
            let config = SceneConfig::default();
            let format = config_format(format, output.as_deref())?;
            match output {
                Some(path) => {
                    config.save(&path)?;
                    println!("Wrote default {format:?} config to {}", path.display());
                }
                None => print!("{}", config.render(format)?),
            }
        }
        Commands::CheckAssets { dir } => check_assets(&dir)?,
        Commands::Sample {
            x,
            z,
            time,
            config,
            json,
        } => {
            let config = load_config(config.as_deref())?;
            let s = sample(&config, x, z, time);
            tracing::debug!(?s, "sampled water surface");
            if json {
                println!("{}", serde_json::to_string_pretty(&s)?);
            } else {
                println!("Surface at x={} z={} t={}s", s.x, s.z, s.time);
                println!("  big wave:     {:.5}", s.big_wave);
                println!("  elevation:    {:.5}", s.elevation);
                println!("  mix strength: {:.5}", s.mix_strength);
                println!("  color:        {}", s.color);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tideview_scene::WaterSettings;

    #[test]
    fn parses_sample_with_negative_coordinates() {
        let cli = Cli::parse_from(["tideview-cli", "sample", "--x", "-2.5", "--z", "1", "--json"]);
        match cli.command {
            Commands::Sample { x, z, json, .. } => {
                assert_eq!(x, -2.5);
                assert_eq!(z, 1.0);
                assert!(json);
            }
            _ => panic!("expected sample"),
        }
    }

    #[test]
    fn config_format_flag() {
        let cli = Cli::parse_from(["tideview-cli", "config", "--format", "json"]);
        match cli.command {
            Commands::Config { format, output } => {
                assert_eq!(format, Some(Format::Json));
                assert!(output.is_none());
            }
            _ => panic!("expected config"),
        }
    }

    #[test]
    fn config_format_defaults_to_yaml_on_stdout() {
        assert_eq!(config_format(None, None).unwrap(), ConfigFormat::Yaml);
        assert_eq!(
            config_format(Some(Format::Json), None).unwrap(),
            ConfigFormat::Json
        );
    }

    #[test]
    fn config_format_follows_output_extension() {
        let json = Path::new("scene.json");
        assert_eq!(config_format(None, Some(json)).unwrap(), ConfigFormat::Json);
        assert_eq!(
            config_format(Some(Format::Json), Some(json)).unwrap(),
            ConfigFormat::Json
        );
        assert!(config_format(None, Some(Path::new("scene.toml"))).is_err());
    }

    #[test]
    fn config_format_conflicting_with_output_is_rejected() {
        let err = config_format(Some(Format::Json), Some(Path::new("x.yaml"))).unwrap_err();
        assert!(err.to_string().contains("x.yaml"));
        assert!(config_format(Some(Format::Yaml), Some(Path::new("x.json"))).is_err());
    }

    #[test]
    fn sample_rejects_config_with_huge_iteration_count() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storm.json");
        std::fs::write(&path, r#"{"water": {"small_iterations": 20000000.0}}"#).unwrap();
        assert!(load_config(Some(path.as_path())).is_err());
    }

    #[test]
    fn sample_at_origin_at_rest() {
        let s = sample(&SceneConfig::default(), 0.0, 0.0, 0.0);
        // sin(0) kills the swell and Perlin noise is zero on the lattice.
        assert_eq!(s.big_wave, 0.0);
        assert!(s.elevation.abs() < 1e-6);
        let expected = WaveField::new(&WaterSettings::default()).mix_strength(0.0);
        assert!((s.mix_strength - expected).abs() < 1e-6);
        assert!(s.color.starts_with('#'));
        assert_eq!(s.color.len(), 7);
    }

    #[test]
    fn sample_serializes_to_json() {
        let s = sample(&SceneConfig::default(), 1.0, -1.0, 2.0);
        let value: serde_json::Value = serde_json::to_value(&s).unwrap();
        assert_eq!(value["time"], 2.0);
        assert!(value["elevation"].is_number());
    }

    #[test]
    fn check_assets_fails_on_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(check_assets(dir.path()).is_err());
    }

    #[test]
    fn sample_reads_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("calm.json");
        std::fs::write(&path, r#"{"water": {"big_waves_elevation": 0.0}}"#).unwrap();
        let config = load_config(Some(path.as_path())).unwrap();
        let s = sample(&config, 0.3, 0.7, 1.0);
        assert_eq!(s.big_wave, 0.0);
    }
}

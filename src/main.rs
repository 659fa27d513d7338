use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use glam::UVec2;
use log::{info, log_enabled, Level};

use cornell_scene::renderer::Raytracer;
use cornell_scene::{load_cornell_box, Accelerator, CornellBoxOptions};

/// Builds the Cornell box test scene and reports what it contains.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    #[arg(long, default_value_t = 512, value_parser = clap::value_parser!(u32).range(1..))]
    width: u32,

    #[arg(long, default_value_t = 512, value_parser = clap::value_parser!(u32).range(1..))]
    height: u32,

    /// Feature bitmask: 1 ceiling, 2 sun, 4 point, 8 background, 16 large mirror,
    /// 32 large glass, 64 mirror ball, 128 glass ball
    #[arg(long, conflicts_with = "config")]
    mask: Option<u32>,

    /// JSON file with named scene options
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Accelerator::Bvh)]
    accel: Accelerator,

    /// Render a direct lighting preview to this PNG
    #[arg(long)]
    preview: Option<PathBuf>,

    #[arg(long, default_value_t = 4)]
    spp: u32,

    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn load_options(args: &Args) -> anyhow::Result<CornellBoxOptions> {
    if let Some(mask) = args.mask {
        return Ok(CornellBoxOptions::from_mask(mask));
    }

    match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("invalid options in {}", path.display()))
        }
        None => Ok(CornellBoxOptions::default()),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let options = load_options(&args)?;
    info!("building cornell box, mask {:#x}", options.mask());

    let (scene, conflict) = load_cornell_box(UVec2::new(args.width, args.height), options, args.accel)?;
    if let Some(conflict) = conflict {
        // the library already logged it; keep it visible even with logging filtered off
        if !log_enabled!(Level::Warn) {
            eprintln!("warning: {}", conflict);
        }
    }
    println!("{}", serde_json::to_string_pretty(&scene.summary())?);

    if let Some(path) = &args.preview {
        info!("rendering preview, {} spp", args.spp);
        let img = Raytracer::new(&scene, args.seed).render(args.spp);
        img.save(path).with_context(|| format!("failed to write {}", path.display()))?;
        info!("wrote {}", path.display());
    }

    Ok(())
}

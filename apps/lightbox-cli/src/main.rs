use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use lightbox_common::SurfaceSize;
use lightbox_kernel::{
    DeviceContext, FrameLoop, IntervalRefresh, LightboxConfig, ResizeCoordinator, ResizeObserver,
    SharedSurface, SurfaceBinding, SystemClock,
};
use lightbox_render::{DebugTextRenderer, Renderer};
use lightbox_scene::SceneBuilder;
use lightbox_tools::{FrameStats, SceneInspector};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lightbox-cli", about = "Headless lightbox tool")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Describe the starting scene
    Scene {
        /// Print a JSON summary instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print the effective configuration as YAML
    Config,
    /// Drive the frame loop against a text renderer
    Run {
        /// Number of frames to render
        #[arg(short, long, default_value = "120")]
        frames: u64,
        /// Refresh rate in Hz
        #[arg(long, default_value = "60")]
        fps: f64,
        /// Surface size as WIDTHxHEIGHT (defaults to the configured window)
        #[arg(long, value_parser = parse_size)]
        size: Option<SurfaceSize>,
        /// Resize the surface to WIDTHxHEIGHT halfway through
        #[arg(long, value_parser = parse_size)]
        resize: Option<SurfaceSize>,
    },
}

fn parse_size(text: &str) -> Result<SurfaceSize, String> {
    let (w, h) = text
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {text:?}"))?;
    let width = w.trim().parse().map_err(|e| format!("bad width {w:?}: {e}"))?;
    let height = h.trim().parse().map_err(|e| format!("bad height {h:?}: {e}"))?;
    Ok(SurfaceSize::new(width, height))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = LightboxConfig::load_or_default(cli.config.as_deref())
        .context("loading configuration")?;

    match cli.command {
        Commands::Info => {
            println!("lightbox-cli v{}", env!("CARGO_PKG_VERSION"));
            println!(
                "window: {} {}x{}",
                config.window.title, config.window.width, config.window.height
            );
            println!(
                "camera: fov={} near={} far={}",
                config.camera.fov_degrees, config.camera.near, config.camera.far
            );
            println!("render info interval: {} ms", config.render_info_interval_ms);
        }
        Commands::Scene { json } => {
            let scene = SceneBuilder::new(config.scene.clone()).build();
            let summary = SceneInspector::summary(&scene);
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                let size = SurfaceSize::new(config.window.width, config.window.height);
                let aspect = size.aspect().unwrap_or(1.0);
                let renderer = DebugTextRenderer::new(size);
                print!("{}", renderer.describe(&scene, &config.camera.camera(aspect)));
                println!("{summary}");
            }
        }
        Commands::Config => {
            print!("{}", config.to_yaml_string()?);
        }
        Commands::Run {
            frames,
            fps,
            size,
            resize,
        } => run(&config, frames, fps, size, resize)?,
    }

    Ok(())
}

fn run(
    config: &LightboxConfig,
    frames: u64,
    fps: f64,
    size: Option<SurfaceSize>,
    resize: Option<SurfaceSize>,
) -> Result<()> {
    let host = SharedSurface::new(
        size.unwrap_or(SurfaceSize::new(config.window.width, config.window.height)),
    );
    let binding = SurfaceBinding::new("headless", host.clone());
    let mut ctx = DeviceContext::startup(&binding, config, SystemClock::new(), |size| {
        Ok(DebugTextRenderer::new(size))
    })
    .map_err(|e| anyhow::anyhow!(e.diagnostic()))?;
    let mut coordinator = ResizeCoordinator::new(binding);

    let mut frame_loop = FrameLoop::new()
        .with_info_interval(Duration::from_millis(config.render_info_interval_ms));

    tracing::info!(size = %ctx.renderer().size(), frames, fps, "headless run starting");

    let first = if resize.is_some() { frames / 2 } else { frames };
    let mut rendered = frame_loop.run(&mut ctx, &mut IntervalRefresh::from_hz(fps).limit(first))?;

    if let Some(new_size) = resize {
        host.set(new_size);
        let outcome = coordinator.surface_resized(&mut ctx);
        tracing::info!(?outcome, "surface resized mid-run");
        println!("resize -> {outcome:?}");
        rendered += frame_loop.run(
            &mut ctx,
            &mut IntervalRefresh::from_hz(fps).limit(frames - first),
        )?;
    }

    let stats = frame_loop.stats();
    let info = frame_loop.last_info();
    tracing::info!(
        rendered,
        fps = stats.average_fps(),
        draw_calls = info.draw_calls,
        "headless run finished"
    );
    println!("{}", run_summary(rendered, ctx.renderer().size(), stats));
    println!("draw calls: {}, triangles: {}", info.draw_calls, info.triangles);
    print!("{}", ctx.renderer().last_frame());
    Ok(())
}

fn run_summary(rendered: u64, size: SurfaceSize, stats: &FrameStats) -> String {
    format!(
        "rendered {rendered} frames at {size} ({:.1} fps, last {:.2} ms)",
        stats.average_fps(),
        stats.frame_ms()
    )
}

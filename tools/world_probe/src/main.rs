use std::env;
use std::path::PathBuf;
use std::process;

use glam::{IVec3, Vec3};
use tracing::{info, warn};

use ashlar_render::camera::Camera;
use ashlar_render::renderer::{DrawSink, WorldRenderer};
use ashlar_render::settings::RenderSettings;
use ashlar_shared::coords::{ChunkPos, CHUNK_SIZE};
use ashlar_shared::mesh::MeshBuffer;
use ashlar_world::world::World;

const DEFAULT_SEED: u64 = 0x5EED;
const DEFAULT_FRAMES: u32 = 240;

/// Headless stand-in for the GPU side of the draw boundary: counts what a
/// real backend would have uploaded and drawn.
#[derive(Debug, Default)]
struct ProbeSink {
    solid_draws: u64,
    transparent_draws: u64,
    solid_vertices: u64,
    transparent_vertices: u64,
    highlights: u64,
    fog_distance: f32,
}

impl DrawSink for ProbeSink {
    fn set_fog_distance(&mut self, distance: f32) {
        self.fog_distance = distance;
    }

    fn draw_solid(&mut self, _chunk_pos: ChunkPos, buffer: &MeshBuffer) {
        self.solid_draws += 1;
        self.solid_vertices += buffer.vertices.len() as u64;
    }

    fn draw_transparent(&mut self, _chunk_pos: ChunkPos, buffer: &MeshBuffer) {
        self.transparent_draws += 1;
        self.transparent_vertices += buffer.vertices.len() as u64;
    }

    fn highlight_block(&mut self, _block_pos: IVec3) {
        self.highlights += 1;
    }
}

struct ProbeConfig {
    seed: u64,
    frames: u32,
    settings_path: PathBuf,
}

fn parse_args() -> ProbeConfig {
    let mut config = ProbeConfig {
        seed: DEFAULT_SEED,
        frames: DEFAULT_FRAMES,
        settings_path: PathBuf::from("settings.toml"),
    };

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--seed" => {
                let Some(value) = args.next() else {
                    eprintln!("--seed expects a numeric argument");
                    process::exit(2);
                };
                match value.parse::<u64>() {
                    Ok(parsed) => config.seed = parsed,
                    Err(err) => {
                        eprintln!("invalid seed '{value}': {err}");
                        process::exit(2);
                    }
                }
            }
            "--frames" => {
                let Some(value) = args.next() else {
                    eprintln!("--frames expects a numeric argument");
                    process::exit(2);
                };
                match value.parse::<u32>() {
                    Ok(parsed) => config.frames = parsed,
                    Err(err) => {
                        eprintln!("invalid frame count '{value}': {err}");
                        process::exit(2);
                    }
                }
            }
            "--settings" => {
                let Some(value) = args.next() else {
                    eprintln!("--settings expects a path argument");
                    process::exit(2);
                };
                config.settings_path = PathBuf::from(value);
            }
            "--help" | "-h" => {
                println!("Usage: world_probe [--seed <u64>] [--frames <u32>] [--settings <path>]");
                process::exit(0);
            }
            other => {
                eprintln!("unknown argument: {other}");
                process::exit(2);
            }
        }
    }

    config
}

fn main() {
    let _ = tracing_subscriber::fmt().with_target(false).try_init();

    let config = parse_args();
    let settings = RenderSettings::load_or_default(&config.settings_path);
    info!(
        "probing seed {} for {} frames at render distance {}",
        config.seed, config.frames, settings.render_distance
    );

    let mut world = World::new(config.seed);
    let camera = Camera::new(
        Vec3::new(
            CHUNK_SIZE as f32 / 2.0,
            72.0,
            CHUNK_SIZE as f32 / 2.0,
        ),
        0.0,
        -0.3,
    );

    // Load the full in-range square up front; mesh building stays amortized
    // across the probe frames.
    let radius = settings.render_distance;
    for z in -radius..=radius {
        for x in -radius..=radius {
            if let Err(err) = world.load_chunk(ChunkPos::new(x, z)) {
                warn!("{err}");
            }
        }
    }
    info!("loaded {} chunks", world.chunk_count());

    let mut renderer = WorldRenderer::new(settings.render_distance);
    renderer.bind_world(&mut world, &camera);

    let mut sink = ProbeSink::default();
    for frame in 0..config.frames {
        renderer.render_world(&mut world, &camera, &mut sink);

        if frame % 60 == 0 {
            info!(
                "frame {frame}: {} builds pending, {} regenerations pending",
                renderer.pending_builds(),
                world.regeneration_len()
            );
        }
    }

    let built = world
        .chunks()
        .filter(|(_, chunk)| chunk.mesh_is_current())
        .count();
    info!(
        "done: {} of {} chunk meshes built, {} solid draws ({} vertices), {} transparent draws ({} vertices), {} highlight frames, fog at {:.0}",
        built,
        world.chunk_count(),
        sink.solid_draws,
        sink.solid_vertices,
        sink.transparent_draws,
        sink.transparent_vertices,
        sink.highlights,
        sink.fog_distance
    );
}

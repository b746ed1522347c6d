//! # Headless Streaming Demo
//!
//! Flies an observer across Perlin terrain for a fixed number of frames,
//! blasts a crater under its path and logs what the chunk manager did. No
//! window or GPU is involved; meshes go to the headless backend.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release -- [config.json]
//! ```

use cgmath::{Deg, Point3, Vector3};
use log::info;
use voxel_stream::{
    config::StreamingConfig,
    core::StResource,
    engine_state::{
        buffer_state::BufferState,
        camera_state::{Camera, Projection},
        voxels::{
            block::block_type::BlockType,
            world::{ChunkManager, Collaborators},
        },
    },
    error::EngineError,
    init_logger,
};

const FRAMES: u32 = 240;
const OBSERVER_SPEED: f32 = 0.5;

fn main() -> Result<(), EngineError> {
    init_logger();

    let config = match std::env::args().nth(1) {
        Some(path) => StreamingConfig::from_json_file(path)?,
        None => StreamingConfig {
            render_distance: 4,
            ..StreamingConfig::default()
        },
    };

    let buffers = StResource::new(BufferState::new());
    let collaborators = Collaborators::headless(&config, buffers.clone())?;
    let mut manager = ChunkManager::new(config, collaborators)?;

    let mut camera = Camera::new(Point3::new(0.0, 40.0, 0.0), Deg(0.0), Deg(-20.0));
    let projection = Projection::new(1280, 720, Deg(70.0), 0.1, 1000.0);

    for frame in 0..FRAMES {
        camera.position += Vector3::new(OBSERVER_SPEED, 0.0, 0.0);
        let frame_stats = manager.update(camera.position);
        let drawn = manager.render(&projection.calc_matrix(), &camera.calc_matrix());

        if frame == FRAMES / 2 {
            let down = Vector3::new(0.0, -1.0, 0.0);
            if let Some(hit) = manager.cast_ray(camera.position, down, 200.0) {
                let center = Point3::new(hit.voxel.x as f32, hit.voxel.y as f32, hit.voxel.z as f32);
                let outcome = manager.apply_sphere_edit(center, 6.0);
                info!("Crater at {:?} ({:?}): {:?}", hit.voxel, hit.block, outcome);

                let marker = BlockType::random_occupied();
                let placed = manager.write_voxel(hit.voxel.x, hit.voxel.y + 8, hit.voxel.z, marker);
                info!("Marker {:?} placed above the crater: {}", marker, placed);
            }
        }

        if frame % 30 == 0 {
            info!(
                "frame {}: {:?}, drew {} meshes",
                frame, frame_stats, drawn
            );
        }
    }

    let stats = manager.stats();
    info!("Final world stats: {:#?}", stats);
    let buffer_state = buffers.get();
    info!(
        "Buffers: {} live, {} released, {} bytes used",
        buffer_state.live_buffer_count(),
        buffer_state.released_buffer_count(),
        buffer_state.get_total_used_memory()
    );
    Ok(())
}

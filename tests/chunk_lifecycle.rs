/// Integration tests for residency, generation, meshing and unloading.
/// Tasks run on an inline executor unless stated otherwise, so every
/// interleaving of submission, state change and result is deterministic.
use std::{
    thread,
    time::{Duration, Instant},
};

use cgmath::{Deg, Point3};
use voxel_stream::{
    config::StreamingConfig,
    core::StResource,
    engine_state::{
        buffer_state::BufferState,
        camera_state::{Camera, Projection},
        rendering::HeadlessRenderer,
        spatial::ChunkBoundsIndex,
        task_management::{InlineExecutor, TaskManager},
        voxels::{
            block::block_type::BlockType,
            chunk::ChunkKey,
            world::{ChunkManager, ChunkRequest, Collaborators, PendingKind},
        },
    },
    error::EngineError,
};

mod common;

use common::{empty_world, flat_world, harness, harness_with_executor, sync_config};

fn async_config(chunk_size: usize) -> StreamingConfig {
    StreamingConfig {
        chunk_size,
        render_distance: 2,
        max_loads_per_frame: 1000,
        max_unloads_per_frame: 1000,
        max_mesh_rebuilds_per_frame: 1000,
        worker_threads: 0,
        ..StreamingConfig::default()
    }
}

fn center_of(key: ChunkKey, size: usize) -> Point3<f32> {
    let half = size as f32 / 2.0;
    let origin = key.origin(size);
    Point3::new(
        origin.x as f32 + half,
        origin.y as f32 + half,
        origin.z as f32 + half,
    )
}

#[test]
fn backend_failure_is_surfaced_from_construction() {
    let buffers = StResource::new(BufferState::new());
    let collaborators = Collaborators {
        generator: std::sync::Arc::new(empty_world()),
        executor: Box::new(InlineExecutor::new()),
        spatial_index: Box::new(ChunkBoundsIndex::new(4, true)),
        renderer: Box::new(HeadlessRenderer::unavailable(buffers.clone(), "no adapter")),
        allocator: Box::new(buffers),
    };

    let result = ChunkManager::new(sync_config(4), collaborators);
    assert!(matches!(result, Err(EngineError::BackendUnavailable(reason)) if reason == "no adapter"));
}

#[test]
fn inconsistent_margins_are_rejected() {
    let buffers = StResource::new(BufferState::new());
    let config = StreamingConfig {
        load_margin: 2.0,
        unload_margin: 1.5,
        ..sync_config(4)
    };
    let collaborators = Collaborators::headless(&config, buffers).unwrap();
    assert!(matches!(
        ChunkManager::new(config, collaborators),
        Err(EngineError::InvalidConfig(_))
    ));
}

#[test]
fn generation_is_requested_once_per_chunk() {
    let mut h = harness(async_config(4), flat_world(2));
    let key = ChunkKey::new(0, 0, 0);

    assert!(matches!(h.manager.get_or_create_chunk(key), ChunkRequest::Pending));
    assert!(matches!(h.manager.get_or_create_chunk(key), ChunkRequest::Pending));
    assert!(matches!(h.manager.peek_chunk(key), ChunkRequest::Pending));

    let stats = h.manager.stats();
    assert_eq!(stats.pending_operations, 1);
    assert_eq!(stats.tasks_in_flight, 1);
    assert_eq!(
        h.manager.pending_operation(key).map(|op| op.kind),
        Some(PendingKind::Generate)
    );

    assert_eq!(h.manager.process_completed_tasks(), 1);
    assert!(h.manager.has_chunk(key));
    assert!(h.manager.is_dirty(key));
    assert!(h.manager.pending_operation(key).is_none());
    assert_eq!(
        h.manager.peek_chunk(key).chunk().map(|chunk| chunk.solid_count()),
        Some(32)
    );
}

#[test]
fn pending_chunks_are_not_resident() {
    let mut h = harness(async_config(4), flat_world(2));
    let key = ChunkKey::new(1, 0, 0);

    h.manager.get_or_create_chunk(key);
    assert!(h.manager.is_loaded(key));
    assert!(!h.manager.has_chunk(key));
    assert_eq!(h.manager.read_voxel(4, 0, 0), BlockType::AIR);
    assert!(matches!(h.manager.peek_chunk(ChunkKey::new(9, 9, 9)), ChunkRequest::Absent));
}

#[test]
fn generation_finishing_after_unload_is_discarded() {
    let mut h = harness(async_config(4), flat_world(2));
    let key = ChunkKey::new(0, 0, 0);

    h.manager.get_or_create_chunk(key);
    assert!(h.manager.unload_chunk(key));
    assert_eq!(h.manager.process_completed_tasks(), 1);

    let stats = h.manager.stats();
    assert!(!h.manager.has_chunk(key));
    assert_eq!(stats.discarded_results, 1);
    assert_eq!(stats.resident_chunks, 0);
    assert_eq!(stats.pending_operations, 0);
    assert_eq!(stats.loaded_chunks, 0);
}

#[test]
fn reload_ignores_the_superseded_generation() {
    let mut h = harness(async_config(4), flat_world(2));
    let key = ChunkKey::new(0, 0, 0);

    h.manager.get_or_create_chunk(key);
    h.manager.unload_chunk(key);
    h.manager.get_or_create_chunk(key);

    assert_eq!(h.manager.process_completed_tasks(), 2);
    assert!(h.manager.has_chunk(key));
    assert_eq!(h.manager.stats().discarded_results, 1);
    assert_eq!(h.manager.stats().chunks_generated, 1);
}

#[test]
fn synchronous_generation_is_ready_immediately() {
    let mut h = harness(sync_config(4), flat_world(2));
    let key = ChunkKey::new(0, -1, 0);

    let request = h.manager.get_or_create_chunk(key);
    assert_eq!(request.chunk().map(|chunk| chunk.solid_count()), Some(64));
    assert!(h.manager.is_dirty(key));
    assert_eq!(h.manager.stats().spatial_nodes, 1);
}

#[test]
fn unload_releases_the_mesh_and_its_buffers() {
    let mut h = harness(sync_config(4), flat_world(2));
    let key = ChunkKey::new(0, 0, 0);

    h.manager.get_or_create_chunk(key);
    assert_eq!(h.manager.rebuild_dirty_meshes(), 1);
    assert!(h.manager.mesh(key).is_some());
    assert_eq!(h.buffers.get().live_buffer_count(), 2);
    assert_eq!(h.renderer.get().live_meshes, 1);

    assert!(h.manager.unload_chunk(key));

    let stats = h.manager.stats();
    assert_eq!(stats.resident_chunks, 0);
    assert_eq!(stats.meshes, 0);
    assert_eq!(stats.dirty_chunks, 0);
    assert_eq!(stats.spatial_nodes, 0);
    assert!(h.manager.bounds(key).is_none());
    assert_eq!(h.buffers.get().live_buffer_count(), 0);
    assert_eq!(h.buffers.get().released_buffer_count(), 2);
    assert_eq!(h.renderer.get().live_meshes, 0);

    assert!(!h.manager.unload_chunk(key));
}

#[test]
fn repeated_dirty_marking_rebuilds_once() {
    let mut h = harness(sync_config(4), flat_world(2));
    let key = ChunkKey::new(0, 0, 0);

    h.manager.get_or_create_chunk(key);
    h.manager.rebuild_dirty_meshes();
    assert_eq!(h.manager.stats().dirty_chunks, 0);

    h.manager.mark_chunk_dirty(key);
    h.manager.mark_chunk_dirty(key);
    h.manager.mark_chunk_dirty(key);
    assert_eq!(h.manager.stats().dirty_chunks, 1);

    assert_eq!(h.manager.rebuild_dirty_meshes(), 1);
    assert_eq!(h.manager.rebuild_dirty_meshes(), 0);
    assert_eq!(h.manager.stats().meshes_built, 2);
}

#[test]
fn replacing_a_mesh_releases_the_old_one() {
    let mut h = harness(sync_config(4), flat_world(2));
    let key = ChunkKey::new(0, 0, 0);

    h.manager.get_or_create_chunk(key);
    h.manager.rebuild_dirty_meshes();
    let first = h.manager.mesh(key).map(|mesh| mesh.handle.id);

    h.manager.write_voxel(1, 2, 1, BlockType::DIRT);
    h.manager.rebuild_dirty_meshes();

    assert_ne!(h.manager.mesh(key).map(|mesh| mesh.handle.id), first);
    assert_eq!(h.buffers.get().live_buffer_count(), 2);
    assert_eq!(h.renderer.get().meshes_deleted, 1);
}

#[test]
fn emptied_chunk_loses_its_mesh() {
    let mut h = harness(sync_config(4), empty_world());
    let key = ChunkKey::new(0, 0, 0);

    h.manager.get_or_create_chunk(key);
    h.manager.write_voxel(1, 1, 1, BlockType::SAND);
    h.manager.rebuild_dirty_meshes();
    assert_eq!(h.manager.mesh(key).map(|mesh| mesh.vertex_count), Some(24));

    h.manager.write_voxel(1, 1, 1, BlockType::AIR);
    h.manager.rebuild_dirty_meshes();
    assert!(h.manager.mesh(key).is_none());
    assert!(!h.manager.is_dirty(key));
    assert_eq!(h.buffers.get().live_buffer_count(), 0);
}

#[test]
fn write_during_mesh_build_keeps_the_chunk_dirty() {
    let config = StreamingConfig {
        async_meshing: true,
        ..sync_config(4)
    };
    let mut h = harness(config, flat_world(2));
    let key = ChunkKey::new(0, 0, 0);

    h.manager.get_or_create_chunk(key);
    assert_eq!(h.manager.rebuild_dirty_meshes(), 1);
    assert_eq!(
        h.manager.pending_operation(key).map(|op| op.kind),
        Some(PendingKind::Mesh)
    );

    // Second request for the same chunk while the first is in flight.
    assert_eq!(h.manager.rebuild_dirty_meshes(), 0);

    assert!(h.manager.write_voxel(0, 3, 0, BlockType::STONE));
    h.manager.process_completed_tasks();

    assert!(h.manager.mesh(key).is_some());
    assert!(h.manager.is_dirty(key));

    assert_eq!(h.manager.rebuild_dirty_meshes(), 1);
    h.manager.process_completed_tasks();
    assert!(!h.manager.is_dirty(key));
    let version = h.manager.peek_chunk(key).chunk().map(|chunk| chunk.version());
    assert_eq!(h.manager.mesh(key).map(|mesh| mesh.source_version), version);
}

#[test]
fn mesh_finishing_after_unload_is_discarded() {
    let config = StreamingConfig {
        async_meshing: true,
        ..sync_config(4)
    };
    let mut h = harness(config, flat_world(2));
    let key = ChunkKey::new(0, 0, 0);

    h.manager.get_or_create_chunk(key);
    h.manager.rebuild_dirty_meshes();
    h.manager.unload_chunk(key);
    h.manager.process_completed_tasks();

    assert!(h.manager.mesh(key).is_none());
    assert_eq!(h.manager.stats().discarded_results, 1);
    assert_eq!(h.renderer.get().meshes_created, 0);
}

#[test]
fn loads_respect_the_budget_nearest_first() {
    let config = StreamingConfig {
        max_loads_per_frame: 4,
        ..sync_config(4)
    };
    let mut h = harness(config, empty_world());

    let update = h.manager.update_residency(center_of(ChunkKey::default(), 4));
    assert_eq!(update.loads_started, 4);
    assert!(h.manager.has_chunk(ChunkKey::default()));
    assert!(h
        .manager
        .resident_keys()
        .all(|key| key.distance(ChunkKey::default()) <= 1.0));

    let backlog = h.manager.stats().queued_loads;
    assert!(backlog > 0);

    h.manager.update_residency(center_of(ChunkKey::default(), 4));
    assert_eq!(h.manager.stats().queued_loads, backlog - 4);
    assert_eq!(h.manager.stats().resident_chunks, 8);
}

#[test]
fn residency_has_hysteresis() {
    // render distance 2: load within 2.2 chunks, unload beyond 3.0
    let mut h = harness(sync_config(4), empty_world());
    let origin = ChunkKey::default();

    h.manager.update_residency(center_of(origin, 4));
    assert!(h.manager.has_chunk(ChunkKey::new(2, 0, 0)));
    assert!(h.manager.has_chunk(ChunkKey::new(-1, 0, 0)));
    assert!(!h.manager.is_loaded(ChunkKey::new(3, 0, 0)));
    assert!(!h.manager.is_loaded(ChunkKey::new(0, 3, 0)));

    // Exactly 3.0 away: outside the load sphere but not past the unload radius.
    h.manager.update_residency(center_of(ChunkKey::new(3, 0, 0), 4));
    assert!(h.manager.has_chunk(origin));
    assert!(!h.manager.has_chunk(ChunkKey::new(-1, 0, 0)));

    // About 2.45 away: kept, since it was loaded before the move.
    assert!(h.manager.has_chunk(ChunkKey::new(1, 1, 1)));
    // About 2.24 away and never loaded: the gap does not pull it in.
    assert!(!h.manager.is_loaded(ChunkKey::new(3, 2, 1)));

    h.manager.update_residency(center_of(ChunkKey::new(4, 0, 0), 4));
    assert!(!h.manager.has_chunk(origin));
    assert!(h.manager.stats().chunks_unloaded > 0);
}

#[test]
fn unload_budget_carries_over() {
    let config = StreamingConfig {
        max_unloads_per_frame: 1,
        ..sync_config(4)
    };
    let mut h = harness(config, empty_world());

    h.manager.update_residency(center_of(ChunkKey::default(), 4));
    let resident = h.manager.stats().resident_chunks;

    let far = center_of(ChunkKey::new(100, 0, 0), 4);
    let update = h.manager.update_residency(far);
    assert_eq!(update.unloads, 1);
    assert_eq!(h.manager.stats().queued_unloads, resident - 1);

    h.manager.update_residency(far);
    assert_eq!(h.manager.stats().queued_unloads, resident - 2);
}

#[test]
fn frustum_culls_meshes_behind_the_camera() {
    let mut h = harness(sync_config(4), flat_world(2));

    let camera = Camera::new(Point3::new(2.0, 3.0, 2.0), Deg(0.0), Deg(0.0));
    let projection = Projection::new(800, 600, Deg(70.0), 0.1, 100.0);

    h.manager.update(camera.position);
    h.manager.update(camera.position);
    let drawn = h.manager.render(&projection.calc_matrix(), &camera.calc_matrix());

    let stats = h.manager.stats();
    assert!(stats.meshes > 0);
    assert!(stats.visible_last_frame > 0);
    assert!(stats.culled_last_frame > 0);
    assert_eq!(stats.visible_last_frame + stats.culled_last_frame, stats.meshes);
    assert_eq!(drawn, stats.visible_last_frame);
    assert_eq!(h.renderer.get().last_batch_size, drawn);
}

#[test]
fn asynchronous_frames_converge() {
    let mut h = harness(async_config(4), flat_world(2));
    let observer = center_of(ChunkKey::default(), 4);

    for _ in 0..4 {
        h.manager.update(observer);
    }

    let stats = h.manager.stats();
    assert_eq!(stats.pending_operations, 0);
    assert_eq!(stats.dirty_chunks, 0);
    assert_eq!(stats.queued_loads, 0);
    assert_eq!(stats.resident_chunks, stats.loaded_chunks);
    assert!(stats.meshes > 0);
    assert_eq!(stats.discarded_results, 0);
}

#[test]
fn worker_pool_streams_the_load_sphere() {
    let config = async_config(4);
    let mut h = harness_with_executor(config, flat_world(2), Box::new(TaskManager::new(2).unwrap()));
    let observer = center_of(ChunkKey::default(), 4);

    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        h.manager.update(observer);
        let stats = h.manager.stats();
        if stats.queued_loads == 0
            && stats.pending_operations == 0
            && stats.dirty_chunks == 0
            && stats.tasks_in_flight == 0
        {
            break;
        }
        assert!(Instant::now() < deadline, "streaming did not settle: {:?}", stats);
        thread::sleep(Duration::from_millis(1));
    }

    let stats = h.manager.stats();
    assert_eq!(stats.resident_chunks, stats.loaded_chunks);
    assert!(stats.meshes > 0);
}

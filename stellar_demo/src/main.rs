//! Stellar demo — drives one scene through a few frames.
//!
//! A loader thread streams Vobs into the scene under the scene lock while
//! the main thread runs the frame loop: propagate transforms, fit shadow
//! cascades, collect and sort render commands, then report what the GPU
//! layer would submit.

use std::sync::Arc;
use std::thread;
use std::time::Duration;
use stellar_scene::glam::{Quat, Vec3};
use stellar_scene::stellar::Engine;
use stellar_scene::stellar::camera::Camera;
use stellar_scene::stellar::log::LogSeverity;
use stellar_scene::stellar::math::AABB;
use stellar_scene::stellar::render::{RenderBucket, RenderCommandQueue};
use stellar_scene::stellar::resource::{
    Material, MaterialFlags, MaterialKind, Mesh, MeshGroup, MeshHandle, ShaderHandle,
};
use stellar_scene::stellar::scene::{Scene, Vob};
use stellar_scene::stellar::shadow::{CascadeConfig, CascadedShadow};
use stellar_scene::{engine_info, engine_warn};

const FRAME_COUNT: usize = 5;
const LOADED_VOBS: usize = 24;

fn mesh(handle: u32, name: &str, half_extents: Vec3) -> Arc<Mesh> {
    Arc::new(Mesh::new(
        MeshHandle(handle),
        name,
        AABB::from_center_half_extents(Vec3::ZERO, half_extents),
    ))
}

/// Shared mesh groups, as an asset cache would hand them out
struct DemoAssets {
    crate_group: Arc<MeshGroup>,
    window_group: Arc<MeshGroup>,
    gizmo_group: Arc<MeshGroup>,
    probe_group: Arc<MeshGroup>,
}

impl DemoAssets {
    fn new() -> Self {
        let pbr = Arc::new(Material::deferred_pbr(ShaderHandle(1)));
        let glass = Arc::new(Material::new(ShaderHandle(2), MaterialKind::Forward, MaterialFlags::BLEND));
        let gizmo = Arc::new(Material::tool(ShaderHandle(3), 0));
        let probe = Arc::new(Material::new(ShaderHandle(4), MaterialKind::Probe, MaterialFlags::empty()));

        Self {
            crate_group: Arc::new(MeshGroup::with_entries(vec![
                (mesh(1, "crate", Vec3::ONE), Arc::clone(&pbr)),
                (mesh(2, "crate_lid", Vec3::new(1.0, 0.1, 1.0)), pbr),
            ])),
            window_group: Arc::new(MeshGroup::with_entries(vec![
                (mesh(3, "window", Vec3::new(1.0, 1.0, 0.05)), glass),
            ])),
            gizmo_group: Arc::new(MeshGroup::with_entries(vec![
                (mesh(4, "gizmo", Vec3::splat(0.25)), gizmo),
            ])),
            probe_group: Arc::new(MeshGroup::with_entries(vec![
                (mesh(5, "probe_sphere", Vec3::splat(0.5)), probe),
            ])),
        }
    }

    fn make_vob(&self, index: usize) -> Vob {
        let angle = index as f32 * 0.7;
        let distance = 4.0 + index as f32 * 1.5;
        let position = Vec3::new(angle.cos() * distance, 0.0, -angle.sin().abs() * distance);

        let mut vob = match index % 6 {
            0 => Vob::probe(Arc::clone(&self.probe_group), index as u32),
            1 | 2 => Vob::from_mesh_group(Arc::clone(&self.window_group)),
            3 => Vob::from_mesh_group(Arc::clone(&self.gizmo_group)),
            _ => Vob::from_mesh_group(Arc::clone(&self.crate_group)),
        };
        vob.set_position(position);
        vob.set_rotation(Quat::from_rotation_y(angle));
        vob.update_trafo(true);
        vob
    }
}

fn main() {
    Engine::set_min_severity(LogSeverity::Debug);

    let scene = Arc::new(Scene::new());
    let assets = Arc::new(DemoAssets::new());

    // Loader: add Vobs in small batches, one lock per batch
    let loader = {
        let scene = Arc::clone(&scene);
        let assets = Arc::clone(&assets);
        thread::spawn(move || {
            for batch in (0..LOADED_VOBS).collect::<Vec<_>>().chunks(6) {
                let vobs: Vec<Vob> = batch.iter().map(|&i| assets.make_vob(i)).collect();
                let mut access = scene.acquire_lock();
                for vob in vobs {
                    access.add_vob(vob, true);
                }
                drop(access);
                thread::sleep(Duration::from_millis(2));
            }
        })
    };

    let mut camera = Camera::perspective(
        Vec3::new(0.0, 3.0, 8.0),
        Vec3::new(0.0, 0.0, -10.0),
        Vec3::Y,
        60.0_f32.to_radians(),
        16.0 / 9.0,
        0.1,
        150.0,
    );
    let mut shadow = CascadedShadow::new(CascadeConfig::default());
    shadow.resize(2048, 2048);
    let light_direction = Vec3::new(-0.4, -1.0, -0.2);
    let mut queue = RenderCommandQueue::new();

    for frame in 0..FRAME_COUNT {
        let eye = Vec3::new(frame as f32 * 0.5, 3.0, 8.0);
        camera.set_view(stellar_scene::glam::Mat4::look_at_rh(eye, Vec3::new(0.0, 0.0, -10.0), Vec3::Y));

        let mut access = scene.acquire_lock();
        access.update_world_trafo_hierarchy(frame == 0);
        let frame_state = access.frame_state();

        shadow.frame_update(&camera, light_direction);

        queue.clear();
        queue.use_camera_culling(&camera);
        access.collect_render_commands(&mut queue, true);
        drop(access);
        queue.sort();

        let stats = queue.stats();
        engine_info!("stellar::Demo",
            "Frame {}: {} active vobs ({} probes), {} pushed, {} culled",
            frame, frame_state.active_count, frame_state.active_probe_count,
            stats.pushed, stats.culled);
        for bucket in RenderBucket::SUBMISSION_ORDER {
            engine_info!("stellar::Demo", "  {:<16} {}", bucket.name(), queue.bucket(bucket).len());
        }
        if !frame_state.bounding_box.is_valid() {
            engine_warn!("stellar::Demo", "Frame {}: scene is still empty", frame);
        }

        thread::sleep(Duration::from_millis(3));
    }

    if loader.join().is_err() {
        engine_warn!("stellar::Demo", "Loader thread panicked");
    }

    let splits = shadow.split_distances();
    engine_info!("stellar::Demo", "Cascade splits: {:?} ({} bytes of GPU data)",
        splits, shadow.cascade_data().to_gpu_bytes().len());
}

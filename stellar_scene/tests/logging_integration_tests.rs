//! Integration tests for the logging facade as seen by scene code
//!
//! Every test swaps the global logger, so all of them run serially.

use std::sync::{Arc, Mutex};
use serial_test::serial;
use stellar_scene::glam::Vec3;
use stellar_scene::stellar::log::{LogEntry, LogSeverity, Logger};
use stellar_scene::stellar::scene::{NodeTree, Scene, SceneNode};
use stellar_scene::stellar::shadow::{CascadeConfig, CascadedShadow};
use stellar_scene::stellar::camera::Camera;
use stellar_scene::stellar::{Engine, Error};

// ============================================================================
// Helpers
// ============================================================================

#[derive(Clone, Default)]
struct CaptureLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl CaptureLogger {
    fn take(&self) -> Vec<LogEntry> {
        std::mem::take(&mut *self.entries.lock().unwrap())
    }
}

impl Logger for CaptureLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

fn install_capture() -> CaptureLogger {
    let capture = CaptureLogger::default();
    Engine::set_logger(capture.clone());
    Engine::set_min_severity(LogSeverity::Trace);
    capture
}

fn restore_defaults() {
    Engine::reset_logger();
    Engine::set_min_severity(LogSeverity::Trace);
}

// ============================================================================
// Tests
// ============================================================================

#[test]
#[serial]
fn test_scene_mutations_log_at_debug() {
    let capture = install_capture();
    let scene = Scene::new();

    {
        let mut access = scene.acquire_lock();
        let key = access.create_vob(NodeTree::new(), true);
        access.delete_vob(key);
    }

    let entries = capture.take();
    restore_defaults();

    let scene_entries: Vec<&LogEntry> = entries.iter().filter(|e| e.source == "stellar::Scene").collect();
    assert_eq!(scene_entries.len(), 2);
    assert!(scene_entries.iter().all(|e| e.severity == LogSeverity::Debug));
    assert!(scene_entries[1].message.contains("Deleted"));
}

#[test]
#[serial]
fn test_rejected_reparent_logs_error_with_location() {
    let capture = install_capture();
    let mut nodes = NodeTree::new();
    let root = nodes.root();
    let child = nodes.insert(SceneNode::new());
    nodes.add_child(root, child);

    let result = nodes.reparent(root, Some(child));

    let entries = capture.take();
    restore_defaults();

    assert!(matches!(result, Err(Error::InvalidArgument(_))));
    let error = entries
        .iter()
        .find(|e| e.severity == LogSeverity::Error)
        .expect("an ERROR entry");
    assert_eq!(error.source, "stellar::NodeTree");
    assert!(error.file.is_some());
    assert!(error.line.is_some());
}

#[test]
#[serial]
fn test_threshold_filters_per_frame_trace() {
    let capture = install_capture();
    Engine::set_min_severity(LogSeverity::Debug);
    let camera = Camera::perspective(Vec3::new(0.0, 2.0, 5.0), Vec3::ZERO, Vec3::Y, 1.0, 1.0, 0.1, 50.0);
    let mut shadow = CascadedShadow::new(CascadeConfig::default());

    shadow.frame_update(&camera, Vec3::NEG_Y);
    shadow.resize(512, 1024);

    let entries = capture.take();
    restore_defaults();

    let shadow_entries: Vec<&LogEntry> = entries.iter().filter(|e| e.source == "stellar::CascadedShadow").collect();
    assert_eq!(shadow_entries.len(), 1, "trace summary filtered, resize kept");
    assert_eq!(shadow_entries[0].severity, LogSeverity::Debug);
}

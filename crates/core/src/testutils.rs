use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::mpsc::Receiver;
use tempfile::TempDir;

use crate::types::ScanEvent;

/// Create a small mixed tree: three files mention `findme`, one does not,
/// and one is skipped by extension.
pub fn create_test_tree() -> TempDir {
    let dir = TempDir::new().unwrap();

    write_file(dir.path(), "notes.txt", "Remember to findme before Friday.\n");
    write_file(dir.path(), "readme.log", "boot ok\nservice findme started\n");
    write_gzip(dir.path(), "syslog.1.gz", "kernel: findme loaded\nkernel: idle\n");

    fs::create_dir(dir.path().join("sub")).unwrap();
    write_file(dir.path().join("sub"), "config.json", "{\"name\": \"other\"}");
    write_file(dir.path().join("sub"), "photo.jpg", "findme");

    dir
}

pub fn collect_events(rx: Receiver<ScanEvent>) -> Vec<ScanEvent> {
    rx.into_iter().collect()
}

fn write_file(dir: impl AsRef<Path>, name: &str, content: &str) {
    fs::write(dir.as_ref().join(name), content).unwrap();
}

fn write_gzip(dir: impl AsRef<Path>, name: &str, content: &str) {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(content.as_bytes()).unwrap();
    fs::write(dir.as_ref().join(name), encoder.finish().unwrap()).unwrap();
}

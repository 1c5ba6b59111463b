//! src/test_utils.rs
use std::path::PathBuf;

pub fn test_data_dir() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("data");
    path
}

/// A fresh, existing directory under the system temp dir.
pub fn scratch_dir() -> PathBuf {
    let path = std::env::temp_dir()
        .join("keyword-index")
        .join(uuid::Uuid::new_v4().to_string());
    std::fs::create_dir_all(&path).expect("Failed to create test directory");
    path
}

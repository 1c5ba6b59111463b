//! tests/api/helpers.rs
use keyword_index::configuration::{get_configuration, Settings};
use keyword_index::telemetry::init_tracing;
use std::path::PathBuf;
use std::sync::LazyLock;
use uuid::Uuid;

// Set TEST_LOG to see the job's logs while running the tests.
static TRACING: LazyLock<()> = LazyLock::new(|| {
    if std::env::var("TEST_LOG").is_ok() {
        let settings = get_configuration().expect("Failed to read configuration");
        init_tracing("tests::api", &settings.telemetry).expect("Failed to setup tracing");
    }
});

pub fn test_data_dir() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("data");
    path
}

/// A fresh directory that is removed when dropped.
pub struct ScratchDir {
    pub path: PathBuf,
}

impl ScratchDir {
    pub fn new() -> Self {
        let path = std::env::temp_dir()
            .join("keyword-index-api")
            .join(Uuid::new_v4().to_string());
        std::fs::create_dir_all(&path).expect("Failed to create scratch dir");
        Self { path }
    }

    pub fn output(&self) -> PathBuf {
        self.path.join("out")
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        std::fs::remove_dir_all(&self.path).ok();
    }
}

pub fn test_settings() -> Settings {
    LazyLock::force(&TRACING);
    get_configuration().expect("Failed to read configuration")
}

use std::path::PathBuf;

use tempfile::TempDir;

use crate::corpus::DEFAULT_SEPARATOR;

/// Isolated directory for corpus files.
pub struct UnitTestFixture {
    pub temp_dir: TempDir,
    pub data_path: PathBuf,
}

impl Default for UnitTestFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl UnitTestFixture {
    #[must_use]
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let data_path = temp_dir.path().to_path_buf();
        println!("[FIXTURE] Created temp directory: {data_path:?}");
        Self {
            temp_dir,
            data_path,
        }
    }

    /// Write a file below the fixture root, creating parent directories.
    pub fn create_file(&self, relative_path: &str, content: impl AsRef<[u8]>) -> PathBuf {
        let full_path = self.data_path.join(relative_path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        std::fs::write(&full_path, content).expect("Failed to write file");
        full_path
    }

    /// Write `documents` joined by the default separator.
    pub fn create_corpus(&self, relative_path: &str, documents: &[&str]) -> PathBuf {
        let joined = documents.join(&format!("\n{DEFAULT_SEPARATOR}\n"));
        println!(
            "[FIXTURE] Corpus {relative_path}: {} documents",
            documents.len()
        );
        self.create_file(relative_path, joined)
    }
}

//! Offline CSV sources: a directory mirror of the public site and an
//! in-memory map.

use super::provider::{CsvSource, DataError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reads `<root>/<label>/<file>.csv`, the same layout as the public site.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Local path mirroring the last two segments of `url`.
    pub fn path_for(&self, url: &str) -> PathBuf {
        let mut segments = url.rsplit('/');
        let file = segments.next().unwrap_or_default();
        let label = segments.next().unwrap_or_default();
        self.root.join(label).join(file)
    }
}

impl CsvSource for DirSource {
    fn name(&self) -> &str {
        "directory"
    }

    fn fetch_text(&self, url: &str) -> Result<String, DataError> {
        let path = self.path_for(url);
        debug!(path = %path.display(), "reading mirrored CSV");
        std::fs::read_to_string(&path).map_err(|e| DataError::Transport {
            url: url.to_string(),
            reason: format!("{}: {e}", path.display()),
        })
    }
}

/// URL → body map. Unknown URLs answer 404.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    bodies: HashMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, url: impl Into<String>, body: impl Into<String>) {
        self.bodies.insert(url.into(), body.into());
    }

    pub fn with(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.insert(url, body);
        self
    }
}

impl CsvSource for MemorySource {
    fn name(&self) -> &str {
        "memory"
    }

    fn fetch_text(&self, url: &str) -> Result<String, DataError> {
        self.bodies
            .get(url)
            .cloned()
            .ok_or_else(|| DataError::HttpStatus {
                url: url.to_string(),
                status: 404,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dir_source_mirrors_site_layout() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("pal")).unwrap();
        std::fs::write(dir.path().join("pal/20210101pal.csv"), "a,b\n1,2\n").unwrap();

        let source = DirSource::new(dir.path());
        let url = "http://mis.nyiso.com/public/csv/pal/20210101pal.csv";
        assert_eq!(source.path_for(url), dir.path().join("pal/20210101pal.csv"));
        assert_eq!(source.fetch_text(url).unwrap(), "a,b\n1,2\n");
    }

    #[test]
    fn dir_source_missing_file_is_transport_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = DirSource::new(dir.path())
            .fetch_text("http://x/pal/20210101pal.csv")
            .unwrap_err();
        assert!(err.is_transport());
    }

    #[test]
    fn memory_source_404s_unknown_urls() {
        let source = MemorySource::new().with("http://x/a.csv", "body");
        assert_eq!(source.fetch_text("http://x/a.csv").unwrap(), "body");
        assert!(matches!(
            source.fetch_text("http://x/b.csv"),
            Err(DataError::HttpStatus { status: 404, .. })
        ));
    }
}

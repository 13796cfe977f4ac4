//! Directory walking implementation using walkdir.

use super::filter::{is_hidden, SourceFilter};
use super::{ScanResult, SourceScanner};
use crate::core::policy::TargetFormat;
use crate::error::ScanError;
use crate::events::{Event, EventSender, ScanEvent};
use std::path::Path;
use walkdir::WalkDir;

/// Configuration for the directory scanner
#[derive(Debug, Clone, Default)]
pub struct ScanConfig {
    /// Descend into subdirectories
    pub recursive: bool,
    /// Whether to follow symbolic links
    pub follow_symlinks: bool,
    /// Whether to include hidden files and directories
    pub include_hidden: bool,
}

/// Scanner implementation using the walkdir crate
pub struct WalkDirScanner {
    config: ScanConfig,
}

impl WalkDirScanner {
    /// Create a new scanner with the given configuration
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }
}

impl SourceScanner for WalkDirScanner {
    fn list_sources_with_events(
        &self,
        root: &Path,
        format: TargetFormat,
        events: &EventSender,
    ) -> Result<ScanResult, ScanError> {
        if !root.is_dir() {
            return Err(ScanError::DirectoryNotFound {
                path: root.to_path_buf(),
            });
        }

        events.send(Event::Scan(ScanEvent::Started {
            root: root.to_path_buf(),
            recursive: self.config.recursive,
        }));

        let filter = SourceFilter::new(format).with_hidden(self.config.include_hidden);
        let mut files = Vec::new();
        let mut errors = Vec::new();

        // Sorted per directory so the file order is stable between runs
        let mut walker = WalkDir::new(root)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name();

        if !self.config.recursive {
            walker = walker.max_depth(1);
        }

        let include_hidden = self.config.include_hidden;
        let entries = walker
            .into_iter()
            .filter_entry(|e| include_hidden || e.depth() == 0 || !is_hidden(e.path()));

        for entry_result in entries {
            match entry_result {
                Ok(entry) => {
                    if entry.file_type().is_file() && filter.should_include(entry.path()) {
                        files.push(entry.into_path());
                    }
                }
                Err(e) => {
                    let path = e.path().map(|p| p.to_path_buf()).unwrap_or_default();

                    let error = if e.io_error().map(|e| e.kind())
                        == Some(std::io::ErrorKind::PermissionDenied)
                    {
                        ScanError::PermissionDenied { path: path.clone() }
                    } else {
                        ScanError::ReadDirectory {
                            path: path.clone(),
                            source: std::io::Error::other(e.to_string()),
                        }
                    };

                    events.send(Event::Scan(ScanEvent::Error {
                        path,
                        message: error.to_string(),
                    }));

                    errors.push(error);
                }
            }
        }

        events.send(Event::Scan(ScanEvent::Completed {
            total_files: files.len(),
        }));

        Ok(ScanResult { files, errors })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use tempfile::TempDir;

    fn touch(path: &Path) {
        File::create(path).unwrap();
    }

    #[test]
    fn lists_only_sources_for_target() {
        let temp = TempDir::new().unwrap();
        touch(&temp.path().join("a.jpg"));
        touch(&temp.path().join("b.JPEG"));
        touch(&temp.path().join("c.png"));
        touch(&temp.path().join("notes.txt"));

        let scanner = WalkDirScanner::new(ScanConfig::default());

        let to_png = scanner.list_sources(temp.path(), TargetFormat::Png).unwrap();
        assert_eq!(to_png.files.len(), 2);

        let to_jpeg = scanner.list_sources(temp.path(), TargetFormat::Jpeg).unwrap();
        assert_eq!(to_jpeg.files, vec![temp.path().join("c.png")]);
    }

    #[test]
    fn non_recursive_ignores_subdirectories() {
        let temp = TempDir::new().unwrap();
        let sub = temp.path().join("2024");
        fs::create_dir(&sub).unwrap();
        touch(&temp.path().join("root.jpg"));
        touch(&sub.join("nested.jpg"));

        let flat = WalkDirScanner::new(ScanConfig::default())
            .list_sources(temp.path(), TargetFormat::Png)
            .unwrap();
        assert_eq!(flat.files, vec![temp.path().join("root.jpg")]);

        let deep = WalkDirScanner::new(ScanConfig {
            recursive: true,
            ..Default::default()
        })
        .list_sources(temp.path(), TargetFormat::Png)
        .unwrap();
        assert_eq!(deep.files.len(), 2);
    }

    #[test]
    fn order_is_sorted_by_name() {
        let temp = TempDir::new().unwrap();
        for name in ["c.jpg", "a.jpg", "b.jpg"] {
            touch(&temp.path().join(name));
        }

        let result = WalkDirScanner::new(ScanConfig::default())
            .list_sources(temp.path(), TargetFormat::Png)
            .unwrap();

        let names: Vec<_> = result
            .files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.jpg", "b.jpg", "c.jpg"]);
    }

    #[test]
    fn hidden_directories_are_pruned() {
        let temp = TempDir::new().unwrap();
        let hidden = temp.path().join(".thumbnails");
        fs::create_dir(&hidden).unwrap();
        touch(&hidden.join("thumb.jpg"));
        touch(&temp.path().join("visible.jpg"));

        let config = ScanConfig {
            recursive: true,
            ..Default::default()
        };
        let result = WalkDirScanner::new(config.clone())
            .list_sources(temp.path(), TargetFormat::Png)
            .unwrap();
        assert_eq!(result.files, vec![temp.path().join("visible.jpg")]);

        let with_hidden = WalkDirScanner::new(ScanConfig {
            include_hidden: true,
            ..config
        })
        .list_sources(temp.path(), TargetFormat::Png)
        .unwrap();
        assert_eq!(with_hidden.files.len(), 2);
    }

    #[test]
    fn missing_root_is_an_error() {
        let result = WalkDirScanner::new(ScanConfig::default())
            .list_sources(Path::new("/nonexistent/path/12345"), TargetFormat::Png);
        assert!(matches!(result, Err(ScanError::DirectoryNotFound { .. })));
    }
}

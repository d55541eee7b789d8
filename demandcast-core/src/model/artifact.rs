//! Locating, unpacking, and loading the model artifact.
//!
//! The model ships as a JSON file. Distributions may carry only a zip archive
//! of it; on first load the matching entry is extracted next to the expected
//! model path and read from there afterwards.

use super::ensemble::TreeEnsemble;
use crate::config::ModelConfig;
use crate::error::{ForecastError, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Where the model file lives and which archive can provide it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelArtifact {
    model_path: PathBuf,
    archive_path: PathBuf,
}

impl ModelArtifact {
    pub fn new(model_path: impl Into<PathBuf>, archive_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
            archive_path: archive_path.into(),
        }
    }

    /// Build from config, resolving relative paths against `workspace`.
    pub fn from_config(config: &ModelConfig, workspace: &Path) -> Self {
        Self::new(
            workspace.join(&config.path),
            workspace.join(&config.archive),
        )
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    pub fn archive_path(&self) -> &Path {
        &self.archive_path
    }

    /// Make sure the model file exists, extracting it from the archive if needed.
    pub fn ensure_extracted(&self) -> Result<&Path> {
        if self.model_path.is_file() {
            return Ok(&self.model_path);
        }
        if !self.archive_path.is_file() {
            return Err(ForecastError::artifact(format!(
                "model file {} not found and archive {} is missing",
                self.model_path.display(),
                self.archive_path.display()
            )));
        }
        info!(
            archive = %self.archive_path.display(),
            model = %self.model_path.display(),
            "Model file missing, extracting from archive"
        );
        extract_entry(&self.archive_path, &self.model_path)?;
        Ok(&self.model_path)
    }

    /// Extract if needed, then parse and validate the ensemble.
    pub fn load(&self) -> Result<TreeEnsemble> {
        let path = self.ensure_extracted()?;
        let model = TreeEnsemble::from_path(path)?;
        info!(
            name = %model.name,
            version = %model.version,
            trees = model.tree_count(),
            "Loaded model"
        );
        Ok(model)
    }
}

/// Extract the archive entry whose file name matches `dest`'s file name.
fn extract_entry(archive_path: &Path, dest: &Path) -> Result<()> {
    let wanted = dest.file_name().ok_or_else(|| {
        ForecastError::artifact(format!("model path {} has no file name", dest.display()))
    })?;

    let file = File::open(archive_path)?;
    let mut archive = zip::ZipArchive::new(BufReader::new(file))?;

    let mut found = None;
    for i in 0..archive.len() {
        let entry = archive.by_index_raw(i)?;
        if entry.is_dir() {
            continue;
        }
        // Entries escaping the archive root (absolute or `..`) yield no enclosed name.
        let Some(name) = entry.enclosed_name() else {
            debug!(entry = entry.name(), "Skipping unsafe archive entry");
            continue;
        };
        if name.file_name() == Some(wanted) {
            found = Some(i);
            break;
        }
    }

    let index = found.ok_or_else(|| {
        ForecastError::artifact(format!(
            "archive {} has no entry named {}",
            archive_path.display(),
            wanted.to_string_lossy()
        ))
    })?;

    let parent = match dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            std::fs::create_dir_all(parent)?;
            parent
        }
        None => Path::new("."),
    };
    // Write beside the destination and rename, so the model path only ever
    // holds a complete file.
    let mut entry = archive.by_index(index)?;
    let mut staged = tempfile::NamedTempFile::new_in(parent)?;
    let bytes = std::io::copy(&mut entry, staged.as_file_mut())?;
    staged.as_file().sync_all()?;
    staged.persist(dest).map_err(|e| e.error)?;
    debug!(bytes, dest = %dest.display(), "Extracted model entry");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ensemble::{Node, Tree};
    use std::io::Write;
    use tempfile::TempDir;

    fn model_json() -> String {
        let model = TreeEnsemble::new("archived", 0.75, vec![Tree::new(vec![Node::leaf(0, 0.5)])]);
        serde_json::to_string(&model).unwrap()
    }

    fn write_archive(path: &Path, entries: &[(&str, &str)]) {
        let file = File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);
        for (name, content) in entries {
            zip.start_file(*name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_loads_existing_model_file() {
        let dir = TempDir::new().unwrap();
        let model_path = dir.path().join("model.json");
        std::fs::write(&model_path, model_json()).unwrap();

        let artifact = ModelArtifact::new(&model_path, dir.path().join("model.zip"));
        let model = artifact.load().unwrap();
        assert_eq!(model.name, "archived");
    }

    #[test]
    fn test_extracts_from_archive_when_missing() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("model.zip");
        let json = model_json();
        write_archive(
            &archive,
            &[("README.txt", "not a model"), ("nested/model.json", json.as_str())],
        );

        let model_path = dir.path().join("model.json");
        let artifact = ModelArtifact::new(&model_path, &archive);
        assert!(!model_path.exists());

        let model = artifact.load().unwrap();
        assert_eq!(model.base_score, 0.75);
        assert!(model_path.is_file());
        assert_eq!(std::fs::read_to_string(&model_path).unwrap(), json);
    }

    #[test]
    fn test_extraction_leaves_no_staging_files() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("model.zip");
        write_archive(&archive, &[("model.json", model_json().as_str())]);

        let model_path = dir.path().join("models").join("model.json");
        ModelArtifact::new(&model_path, &archive).load().unwrap();

        let mut names: Vec<String> = std::fs::read_dir(dir.path().join("models"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["model.json".to_string()]);
    }

    #[test]
    fn test_skips_traversal_entries() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("model.zip");
        let json = model_json();
        write_archive(&archive, &[("../model.json", json.as_str())]);

        let artifact = ModelArtifact::new(dir.path().join("model.json"), &archive);
        let err = artifact.load().unwrap_err();
        assert!(err.to_string().contains("no entry named model.json"));
    }

    #[test]
    fn test_missing_model_and_archive() {
        let dir = TempDir::new().unwrap();
        let artifact = ModelArtifact::new(dir.path().join("a.json"), dir.path().join("a.zip"));
        let err = artifact.load().unwrap_err();
        assert!(matches!(err, ForecastError::Artifact(_)));
    }

    #[test]
    fn test_corrupt_archive_is_reported() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("model.zip");
        std::fs::write(&archive, b"definitely not a zip").unwrap();
        let artifact = ModelArtifact::new(dir.path().join("model.json"), &archive);
        assert!(matches!(
            artifact.load().unwrap_err(),
            ForecastError::Archive(_)
        ));
    }

    #[test]
    fn test_from_config_joins_workspace() {
        let config = ModelConfig::default();
        let artifact = ModelArtifact::from_config(&config, Path::new("/srv/app"));
        assert_eq!(artifact.model_path(), Path::new("/srv/app").join(&config.path));
        assert_eq!(artifact.archive_path(), Path::new("/srv/app").join(&config.archive));
    }
}

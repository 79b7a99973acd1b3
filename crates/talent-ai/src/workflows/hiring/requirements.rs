//! Requirements artifact shared between the pipeline and the intake graph.
//!
//! UTF-8, one requirement per line, no header. Writes replace the file wholesale through a
//! sibling temp file and a rename so readers never see a partial list.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Used by intake when no posting has been generated yet.
pub const DEFAULT_REQUIREMENTS: [&str; 5] = [
    "Machine learning model development",
    "Python",
    "TensorFlow or PyTorch",
    "Data pipelines",
    "AWS or GCP",
];

pub fn default_requirements() -> Vec<String> {
    DEFAULT_REQUIREMENTS
        .iter()
        .map(|requirement| requirement.to_string())
        .collect()
}

#[derive(Debug, thiserror::Error)]
pub enum RequirementsError {
    #[error("failed to write requirements artifact {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read requirements artifact {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Where the requirements came from on a given read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementsSource {
    Artifact,
    Default,
}

#[derive(Debug, Clone)]
pub struct RequirementsArtifact {
    path: PathBuf,
}

impl RequirementsArtifact {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&self, requirements: &[String]) -> Result<(), RequirementsError> {
        let wrap = |source| RequirementsError::Write {
            path: self.path.clone(),
            source,
        };

        let mut contents = String::new();
        for requirement in requirements {
            let line = requirement.trim();
            if line.is_empty() {
                continue;
            }
            contents.push_str(line);
            contents.push('\n');
        }

        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(wrap)?;
        }

        let staging = self.staging_path();
        let mut file = fs::File::create(&staging).map_err(wrap)?;
        file.write_all(contents.as_bytes()).map_err(wrap)?;
        file.sync_all().map_err(wrap)?;
        drop(file);

        fs::rename(&staging, &self.path).map_err(|err| {
            let _ = fs::remove_file(&staging);
            wrap(err)
        })?;

        debug!(path = %self.path.display(), count = requirements.len(), "requirements artifact written");
        Ok(())
    }

    /// `Ok(None)` when the artifact does not exist or holds no requirements.
    pub fn load(&self) -> Result<Option<Vec<String>>, RequirementsError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(RequirementsError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let requirements: Vec<String> = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        Ok((!requirements.is_empty()).then_some(requirements))
    }

    /// Never fails: unreadable or absent artifacts yield the default list.
    pub fn load_or_default(&self) -> (Vec<String>, RequirementsSource) {
        match self.load() {
            Ok(Some(requirements)) => (requirements, RequirementsSource::Artifact),
            Ok(None) => (default_requirements(), RequirementsSource::Default),
            Err(err) => {
                warn!(error = %err, "requirements artifact unreadable, using defaults");
                (default_requirements(), RequirementsSource::Default)
            }
        }
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

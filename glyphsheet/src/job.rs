//! Storage for the values a job shares between its passes.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use crate::{reference::ClusterCenters, Error};

/// Name of the file holding the cluster centers in a job directory.
pub const CENTERS_FILE: &str = "cluster_centers.json";

/// Persists the cluster centers established by the first pass of a job.
pub trait CenterStore {
    /// Returns the stored centers.
    ///
    /// Fails with [`Error::MissingCenters`] if nothing was stored yet.
    fn load(&self) -> Result<ClusterCenters, Error>;

    /// Stores `centers`, replacing any previous value.
    fn store(&mut self, centers: &ClusterCenters) -> Result<(), Error>;
}

/// A job's working directory on disk.
///
/// Centers are stored as a JSON array of four numbers.
#[derive(Clone, Debug)]
pub struct JobDir {
    root: PathBuf,
}

impl JobDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn centers_path(&self) -> PathBuf {
        self.root.join(CENTERS_FILE)
    }

    /// Writes `contents` to the file `name` in the job directory, creating
    /// the directory if needed.
    pub fn write(&self, name: &str, contents: &str) -> Result<PathBuf, Error> {
        fs::create_dir_all(&self.root).map_err(|source| Error::Io {
            path: self.root.clone(),
            source,
        })?;
        let path = self.root.join(name);
        fs::write(&path, contents).map_err(|source| Error::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

impl CenterStore for JobDir {
    fn load(&self) -> Result<ClusterCenters, Error> {
        let path = self.centers_path();
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(Error::MissingCenters),
            Err(source) => return Err(Error::Io { path, source }),
        };
        let centers: [f64; 4] = serde_json::from_str(&text)?;
        log::debug!("loaded cluster centers {centers:?} from {path:?}");
        Ok(ClusterCenters(centers))
    }

    fn store(&mut self, centers: &ClusterCenters) -> Result<(), Error> {
        let text = serde_json::to_string(&centers.0)?;
        let path = self.write(CENTERS_FILE, &text)?;
        log::debug!("stored cluster centers at {path:?}");
        Ok(())
    }
}

/// Keeps the centers in memory, for tests and single process use.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(Option<ClusterCenters>);

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_centers(centers: ClusterCenters) -> Self {
        Self(Some(centers))
    }

    pub fn centers(&self) -> Option<ClusterCenters> {
        self.0
    }
}

impl CenterStore for MemoryStore {
    fn load(&self) -> Result<ClusterCenters, Error> {
        self.0.ok_or(Error::MissingCenters)
    }

    fn store(&mut self, centers: &ClusterCenters) -> Result<(), Error> {
        self.0 = Some(*centers);
        Ok(())
    }
}

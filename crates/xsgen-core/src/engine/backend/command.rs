use super::{BackendError, LatticeJob, LatticePhysicsBackend};
use crate::core::io::binary::{BinaryLibraryFile, cycle_library_file_name, xs_id_library_file_name};
use crate::core::io::traits::LibraryFile;
use crate::core::library::xs_library::XsLibrary;
use crate::engine::config::{ConfigError, ExecutableConfig};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;
use tracing::{debug, info};

pub const INPUT_FILE_NAME: &str = "lattice-input.toml";

/// Runs an external lattice physics executable once per identifier.
///
/// Each job runs in `{working_directory}/{xs_id}/`. The job description is written to
/// [`INPUT_FILE_NAME`] there and passed as the only argument; the executable must leave
/// an `ISO{xs_id}` library in the same directory.
///
/// The executable is resolved once; later jobs reuse the resolved path.
#[derive(Debug, Clone)]
pub struct ExternalCommandBackend {
    config: ExecutableConfig,
    resolved: OnceLock<PathBuf>,
}

impl ExternalCommandBackend {
    pub fn new(config: ExecutableConfig) -> Self {
        Self {
            config,
            resolved: OnceLock::new(),
        }
    }

    pub fn working_directory(&self) -> &Path {
        &self.config.working_directory
    }

    fn job_directory(&self, job: &LatticeJob) -> PathBuf {
        self.config.working_directory.join(job.xs_id.as_str())
    }
}

/// Resolves an executable: paths with directory components must exist as given,
/// bare names are searched for on `PATH`.
pub fn resolve_executable(executable: &Path) -> Result<PathBuf, ConfigError> {
    let not_found = || ConfigError::ExecutableNotFound {
        path: executable.display().to_string(),
    };
    if executable.as_os_str().is_empty() {
        return Err(not_found());
    }
    if executable.components().count() > 1 || executable.is_absolute() {
        return if executable.is_file() {
            Ok(executable.to_path_buf())
        } else {
            Err(not_found())
        };
    }
    let search_path = std::env::var_os("PATH").ok_or_else(not_found)?;
    std::env::split_paths(&search_path)
        .map(|dir| dir.join(executable))
        .find(|candidate| candidate.is_file())
        .ok_or_else(not_found)
}

fn io_error(path: &Path, source: std::io::Error) -> BackendError {
    BackendError::Io {
        path: path.display().to_string(),
        source,
    }
}

impl LatticePhysicsBackend for ExternalCommandBackend {
    fn name(&self) -> &str {
        "external-command"
    }

    fn executable_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = self.resolved.get() {
            return Ok(path.clone());
        }
        let path = resolve_executable(&self.config.executable)?;
        Ok(self.resolved.get_or_init(|| path).clone())
    }

    fn read_existing_libraries(&self, cycle: u32) -> Result<Option<XsLibrary>, BackendError> {
        let path = self
            .config
            .working_directory
            .join(cycle_library_file_name(cycle));
        if !path.is_file() {
            debug!(path = %path.display(), "No existing library for this cycle.");
            return Ok(None);
        }
        info!("Reading existing cross-section library from {}", path.display());
        Ok(Some(BinaryLibraryFile::read_from_path(&path)?))
    }

    fn compute(&self, job: &LatticeJob) -> Result<XsLibrary, BackendError> {
        let executable = self
            .executable_path()
            .map_err(|e| BackendError::Other(e.to_string()))?;
        let job_dir = self.job_directory(job);
        fs::create_dir_all(&job_dir).map_err(|e| io_error(&job_dir, e))?;

        let input_path = job_dir.join(INPUT_FILE_NAME);
        let input =
            toml::to_string(job).map_err(|e| BackendError::InputSerialization(e.to_string()))?;
        fs::write(&input_path, input).map_err(|e| io_error(&input_path, e))?;

        debug!(xs_id = %job.xs_id, executable = %executable.display(), "Launching lattice physics run.");
        let output = Command::new(&executable)
            .arg(&input_path)
            .current_dir(&job_dir)
            .output()
            .map_err(|e| io_error(&executable, e))?;
        if !output.status.success() {
            return Err(BackendError::ProcessFailed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let output_path = job_dir.join(xs_id_library_file_name(&job.xs_id));
        if !output_path.is_file() {
            return Err(BackendError::MissingOutput(output_path.display().to_string()));
        }
        Ok(BinaryLibraryFile::read_from_path(&output_path)?)
    }

    fn clear(&self) -> Result<(), BackendError> {
        let root = &self.config.working_directory;
        if !root.is_dir() {
            return Ok(());
        }
        let entries = fs::read_dir(root).map_err(|e| io_error(root, e))?;
        for entry in entries {
            let path = entry.map_err(|e| io_error(root, e))?.path();
            if path.join(INPUT_FILE_NAME).is_file() {
                debug!(path = %path.display(), "Removing previous lattice physics outputs.");
                fs::remove_dir_all(&path).map_err(|e| io_error(&path, e))?;
            }
        }
        Ok(())
    }

    fn persist_library(&self, cycle: u32, library: &XsLibrary) -> Result<(), BackendError> {
        let root = &self.config.working_directory;
        fs::create_dir_all(root).map_err(|e| io_error(root, e))?;
        let path = root.join(cycle_library_file_name(cycle));
        BinaryLibraryFile::write_to_path(library, &path)?;
        info!("Stored cross-section library for cycle {} at {}", cycle, path.display());
        Ok(())
    }
}

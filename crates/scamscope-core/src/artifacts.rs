//! # Persisted Artifacts
//!
//! The trainer writes three JSON files into one directory; the predictor
//! reads the same three. Each file is an envelope carrying a format
//! version, an artifact kind and the run id of the training run that
//! produced it, so stale, swapped or mixed files fail loudly.
//!
//! The run id is a SHA-256 fingerprint of all three payloads, stamped
//! into every envelope of a set. A directory caught halfway through a
//! rewrite, or assembled from two runs, does not load.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::encoder::LabelEncoder;
use crate::error::{Result, ScamScopeError};
use crate::pipeline::{Pipeline, PipelineArtifact};

/// Version of the on-disk artifact format.
pub const FORMAT_VERSION: u32 = 2;

/// File name of the fitted pipeline.
pub const PIPELINE_FILE: &str = "scam_model.json";
/// File name of the scam-type encoder.
pub const SCAM_TYPE_ENCODER_FILE: &str = "le_scam_type.json";
/// File name of the state encoder.
pub const STATE_ENCODER_FILE: &str = "le_state.json";

/// Environment variable overriding the artifact directory.
pub const MODEL_DIR_ENV: &str = "SCAMSCOPE_MODEL_DIR";

const PIPELINE_KIND: &str = "pipeline";
const SCAM_TYPE_KIND: &str = "scam_type_encoder";
const STATE_KIND: &str = "state_encoder";

/// Digest bytes kept in a run id.
const RUN_ID_BYTES: usize = 8;

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    format_version: u32,
    kind: &'a str,
    run_id: &'a str,
    data: &'a T,
}

#[derive(Deserialize)]
struct Header {
    format_version: u32,
    kind: String,
}

#[derive(Deserialize)]
struct Envelope<T> {
    run_id: String,
    data: T,
}

/// An artifact payload together with the run id it was written under.
#[derive(Debug, Clone, PartialEq)]
pub struct Stamped<T> {
    pub run_id: String,
    pub data: T,
}

/// Locations of the three artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub pipeline: PathBuf,
    pub scam_type_encoder: PathBuf,
    pub state_encoder: PathBuf,
}

impl ArtifactPaths {
    /// Well-known file names inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            pipeline: dir.join(PIPELINE_FILE),
            scam_type_encoder: dir.join(SCAM_TYPE_ENCODER_FILE),
            state_encoder: dir.join(STATE_ENCODER_FILE),
        }
    }

    /// `models/` next to the running executable, or `./models` if the
    /// executable path is unavailable.
    pub fn default_dir() -> PathBuf {
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join("models")))
            .unwrap_or_else(|| PathBuf::from("models"))
    }

    /// Returns `true` if all three files are present.
    pub fn all_exist(&self) -> bool {
        self.pipeline.exists() && self.scam_type_encoder.exists() && self.state_encoder.exists()
    }
}

/// Serializes `value` into `path` under `run_id`, replacing any previous
/// file atomically.
pub fn write_artifact<T: Serialize>(path: &Path, kind: &str, run_id: &str, value: &T) -> Result<()> {
    let io_err = |source| ScamScopeError::ArtifactIo {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    let envelope = EnvelopeRef {
        format_version: FORMAT_VERSION,
        kind,
        run_id,
        data: value,
    };
    let json = serde_json::to_vec(&envelope).map_err(|source| ScamScopeError::ArtifactFormat {
        path: path.to_path_buf(),
        source,
    })?;

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).map_err(io_err)?;
    fs::rename(&tmp, path).map_err(io_err)?;
    debug!(path = %path.display(), kind, run_id, "artifact written");
    Ok(())
}

/// Reads an artifact written by [`write_artifact`].
///
/// # Errors
///
/// - `ScamScopeError::ArtifactIo` if the file cannot be read.
/// - `ScamScopeError::IncompatibleArtifact` on a format version mismatch.
/// - `ScamScopeError::ArtifactFormat` if the content does not decode or
///   holds a different kind of artifact.
pub fn read_artifact<T: DeserializeOwned>(path: &Path, kind: &str) -> Result<Stamped<T>> {
    let bytes = fs::read(path).map_err(|source| ScamScopeError::ArtifactIo {
        path: path.to_path_buf(),
        source,
    })?;
    let format_err = |source| ScamScopeError::ArtifactFormat {
        path: path.to_path_buf(),
        source,
    };

    let header: Header = serde_json::from_slice(&bytes).map_err(format_err)?;
    if header.format_version != FORMAT_VERSION {
        return Err(ScamScopeError::IncompatibleArtifact {
            path: path.to_path_buf(),
            found: header.format_version,
            expected: FORMAT_VERSION,
        });
    }
    if header.kind != kind {
        return Err(format_err(serde_json::Error::custom(format!(
            "expected a {kind} artifact, found {}",
            header.kind
        ))));
    }

    let envelope: Envelope<T> = serde_json::from_slice(&bytes).map_err(format_err)?;
    debug!(path = %path.display(), kind, run_id = %envelope.run_id, "artifact read");
    Ok(Stamped {
        run_id: envelope.run_id,
        data: envelope.data,
    })
}

/// The three artifacts the predictor needs, loaded together.
#[derive(Debug, Clone)]
pub struct ArtifactSet {
    pub pipeline: Pipeline,
    pub scam_types: LabelEncoder,
    pub states: LabelEncoder,
}

impl ArtifactSet {
    /// Reads all three artifacts and checks they belong together.
    ///
    /// # Errors
    ///
    /// - Any artifact error from [`read_artifact`].
    /// - `ScamScopeError::MismatchedArtifacts` if an encoder was written by
    ///   a different training run than the pipeline.
    /// - `ScamScopeError::Model` if the pipeline or an encoder is
    ///   internally inconsistent.
    pub fn load(paths: &ArtifactPaths) -> Result<Self> {
        let pipeline: Stamped<PipelineArtifact> = read_artifact(&paths.pipeline, PIPELINE_KIND)?;
        let scam_types: Stamped<LabelEncoder> =
            read_artifact(&paths.scam_type_encoder, SCAM_TYPE_KIND)?;
        let states: Stamped<LabelEncoder> = read_artifact(&paths.state_encoder, STATE_KIND)?;

        for (path, run_id) in [
            (&paths.scam_type_encoder, &scam_types.run_id),
            (&paths.state_encoder, &states.run_id),
        ] {
            if *run_id != pipeline.run_id {
                return Err(ScamScopeError::MismatchedArtifacts {
                    path: path.clone(),
                    found: run_id.clone(),
                    expected: pipeline.run_id.clone(),
                });
            }
        }
        scam_types.data.validate()?;
        states.data.validate()?;

        debug!(run_id = %pipeline.run_id, "artifact set loaded");
        Ok(Self {
            pipeline: Pipeline::from_artifact(pipeline.data)?,
            scam_types: scam_types.data,
            states: states.data,
        })
    }

    /// Writes all three artifacts under one run id and returns it.
    ///
    /// # Errors
    ///
    /// Any artifact error from [`write_artifact`].
    pub fn save(&self, paths: &ArtifactPaths) -> Result<String> {
        let run_id = self.run_id()?;
        write_artifact(&paths.pipeline, PIPELINE_KIND, &run_id, self.pipeline.artifact())?;
        write_artifact(&paths.scam_type_encoder, SCAM_TYPE_KIND, &run_id, &self.scam_types)?;
        write_artifact(&paths.state_encoder, STATE_KIND, &run_id, &self.states)?;
        Ok(run_id)
    }

    /// Fingerprint of the three payloads, in hex.
    ///
    /// # Errors
    ///
    /// Returns `ScamScopeError::Model` if a payload does not serialize.
    pub fn run_id(&self) -> Result<String> {
        let mut hasher = Sha256::new();
        for part in [
            serde_json::to_vec(self.pipeline.artifact()),
            serde_json::to_vec(&self.scam_types),
            serde_json::to_vec(&self.states),
        ] {
            let bytes = part.map_err(|e| {
                ScamScopeError::Model(format!("cannot fingerprint artifacts: {e}"))
            })?;
            hasher.update((bytes.len() as u64).to_le_bytes());
            hasher.update(&bytes);
        }
        Ok(hex::encode(&hasher.finalize()[..RUN_ID_BYTES]))
    }
}

use camino::Utf8PathBuf;
use thiserror::Error;

/// Error taxonomy for the gated reconstruction pipeline.
///
/// The gating stages (thresholder, partitioner, dataloader) validate their
/// inputs and fail fast with one of the typed variants below before any
/// expensive gridding work begins. The reconstructor never substitutes
/// defaults; numeric degeneracies surface as errors to the caller.
#[derive(Error, Debug)]
pub enum RegateError {
    /// A configuration value is out of its admissible domain (bad output
    /// shape, threshold outside `[0, 100]`, oversampling ratio ≤ 1, ...).
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// Two co-indexed arrays disagree along the readout axis.
    #[error("shape mismatch for {context}: expected {expected} readouts, got {actual}")]
    ShapeMismatch {
        context: String,
        expected: usize,
        actual: usize,
    },

    /// The respiratory trace carries no usable variation (zero robust scale),
    /// so no gating threshold can be derived from it.
    #[error("degenerate respiratory signal: {0}")]
    DegenerateSignal(String),

    /// Gating retained zero k-space readouts; reconstructing from an empty
    /// sample set would only produce garbage.
    #[error("no k-space samples retained after gating")]
    InsufficientSamples,

    /// A required preprocessed input array is absent from the data directory.
    #[error("required input array not found: {0}")]
    MissingInput(Utf8PathBuf),

    #[error("unable to perform file operation: {0}")]
    Io(#[from] std::io::Error),

    #[error("error parsing YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("error reading npy array: {0}")]
    Npy(#[from] ndarray_npy::ReadNpyError),

    #[error("error writing NIfTI volume: {0}")]
    Nifti(#[from] nifti::error::NiftiError),
}

//! # Reconstruction configuration
//!
//! This module defines the two configuration surfaces of the pipeline:
//!
//! 1. [`ReconConfig`] — the on-disk YAML contract of the batch driver. It
//!    mirrors the recognized option set of the acquisition site
//!    (`img_shape`, `gating_thresh`, `gating_weight`, `oversamp`,
//!    `kernel_width`, `device`, `strategies`) and is deserialized with
//!    [`serde`].
//! 2. [`ReconParams`] — the validated, strongly-typed parameter object the
//!    reconstruction strategies consume, produced either from a
//!    [`ReconConfig`] or through the fluent [`ReconParamsBuilder`].
//!
//! Validation happens once, up front: a [`ReconParams`] that exists is safe
//! to hand to the NUFFT reconstructor without further checking.
//!
//! ## Example
//!
//! ```rust
//! use regate::config::ReconParams;
//!
//! let params = ReconParams::builder()
//!     .img_shape([128, 128, 128])
//!     .oversamp(1.25)
//!     .kernel_width(4.0)
//!     .build()
//!     .unwrap();
//! assert_eq!(params.img_shape, [128, 128, 128]);
//! ```

use std::cmp::Ordering::Greater;
use std::fs;

use camino::Utf8Path;
use serde::{Deserialize, Serialize};

use crate::regate_errors::RegateError;

/// Compute target for the per-coil reconstruction loop.
///
/// `Host` runs the gridding and FFT stages on the CPU (the per-coil loop is
/// still parallelized across worker threads). `Accelerator` carries the
/// device index requested by the configuration; this build ships no
/// accelerator backend, so requesting one is rejected at validation time
/// rather than silently falling back to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComputeDevice {
    Host,
    Accelerator(u32),
}

impl ComputeDevice {
    /// Map the configuration convention (`-1` = host, `>= 0` = accelerator
    /// index) onto the enum.
    pub fn from_index(index: i64) -> Result<Self, RegateError> {
        match index {
            -1 => Ok(ComputeDevice::Host),
            i if i >= 0 => Ok(ComputeDevice::Accelerator(i as u32)),
            i => Err(RegateError::Configuration(format!(
                "device index must be -1 (host) or a non-negative accelerator index, got {i}"
            ))),
        }
    }
}

impl Default for ComputeDevice {
    fn default() -> Self {
        ComputeDevice::Host
    }
}

// -------------------------------------------------------------------------------------------------
// On-disk YAML configuration
// -------------------------------------------------------------------------------------------------

fn default_img_shape() -> [usize; 3] {
    [256, 256, 256]
}
fn default_gating_thresh() -> f64 {
    50.0
}
fn default_gating_weight() -> f64 {
    1.0
}
fn default_oversamp() -> f64 {
    1.25
}
fn default_kernel_width() -> f64 {
    4.0
}
fn default_device() -> i64 {
    -1
}
fn default_strategies() -> Vec<String> {
    vec!["hard_gating".to_string(), "no_gating".to_string()]
}

/// Global configuration of a reconstruction batch, loaded from a YAML file.
///
/// Every field has a default matching the clinical protocol, so a partial
/// file (or an empty one) is accepted; [`ReconConfig::validate`] is still
/// run on the merged result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconConfig {
    /// Output volume dimensions (same convention as the scanner protocol).
    #[serde(default = "default_img_shape")]
    pub img_shape: [usize; 3],

    /// Gating threshold as a percentile of the retained respiratory band,
    /// in `[0, 100]`.
    #[serde(default = "default_gating_thresh")]
    pub gating_thresh: f64,

    /// Reserved weighting option; accepted and validated but numerically
    /// inert in the hard-gating algorithm.
    #[serde(default = "default_gating_weight")]
    pub gating_weight: f64,

    /// NUFFT grid oversampling ratio, strictly greater than 1.
    #[serde(default = "default_oversamp")]
    pub oversamp: f64,

    /// Interpolation kernel support in oversampled-grid units.
    #[serde(default = "default_kernel_width")]
    pub kernel_width: f64,

    /// Compute target: `-1` = host, `>= 0` = accelerator index.
    #[serde(default = "default_device")]
    pub device: i64,

    /// Names of the reconstruction strategies to run, in order.
    #[serde(default = "default_strategies")]
    pub strategies: Vec<String>,
}

impl Default for ReconConfig {
    fn default() -> Self {
        ReconConfig {
            img_shape: default_img_shape(),
            gating_thresh: default_gating_thresh(),
            gating_weight: default_gating_weight(),
            oversamp: default_oversamp(),
            kernel_width: default_kernel_width(),
            device: default_device(),
            strategies: default_strategies(),
        }
    }
}

impl ReconConfig {
    /// Load and validate a configuration from a YAML file.
    ///
    /// Arguments
    /// -----------------
    /// * `path`: location of the YAML configuration file.
    ///
    /// Return
    /// ----------
    /// * The validated [`ReconConfig`], or a [`RegateError`] if the file is
    ///   missing, unparsable, or fails validation.
    pub fn from_yaml(path: &Utf8Path) -> Result<Self, RegateError> {
        if !path.is_file() {
            return Err(RegateError::Configuration(format!(
                "configuration file not found: {path}"
            )));
        }
        let contents = fs::read_to_string(path)?;
        let config: ReconConfig = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every recognized option against its admissible domain.
    ///
    /// Validation rules
    /// -----------------
    /// * `img_shape` dimensions all strictly positive.
    /// * `gating_thresh` within `[0, 100]`.
    /// * `gating_weight` finite and non-negative (reserved option).
    /// * `oversamp > 1.0` — the apodization correction is only defined on a
    ///   genuinely oversampled grid.
    /// * `kernel_width > 0.0` and finite.
    /// * `device >= -1`.
    /// * `strategies` non-empty (unknown names are rejected later, at
    ///   strategy construction).
    pub fn validate(&self) -> Result<(), RegateError> {
        if self.img_shape.iter().any(|&d| d == 0) {
            return Err(RegateError::Configuration(format!(
                "img_shape dimensions must be strictly positive, got {:?}",
                self.img_shape
            )));
        }
        if !(0.0..=100.0).contains(&self.gating_thresh) {
            return Err(RegateError::Configuration(format!(
                "gating_thresh must be a percentile in [0, 100], got {}",
                self.gating_thresh
            )));
        }
        if !self.gating_weight.is_finite() || self.gating_weight < 0.0 {
            return Err(RegateError::Configuration(format!(
                "gating_weight must be finite and non-negative, got {}",
                self.gating_weight
            )));
        }
        if !matches!(self.oversamp.partial_cmp(&1.0), Some(Greater)) {
            return Err(RegateError::Configuration(format!(
                "oversamp must be strictly greater than 1.0, got {}",
                self.oversamp
            )));
        }
        if !self.kernel_width.is_finite()
            || !matches!(self.kernel_width.partial_cmp(&0.0), Some(Greater))
        {
            return Err(RegateError::Configuration(format!(
                "kernel_width must be strictly positive, got {}",
                self.kernel_width
            )));
        }
        if self.device < -1 {
            return Err(RegateError::Configuration(format!(
                "device must be -1 (host) or a non-negative accelerator index, got {}",
                self.device
            )));
        }
        if self.strategies.is_empty() {
            return Err(RegateError::Configuration(
                "at least one reconstruction strategy must be configured".to_string(),
            ));
        }
        Ok(())
    }

    /// Build the validated reconstruction parameters from this configuration.
    pub fn recon_params(&self) -> Result<ReconParams, RegateError> {
        ReconParams::builder()
            .img_shape(self.img_shape)
            .oversamp(self.oversamp)
            .kernel_width(self.kernel_width)
            .device(ComputeDevice::from_index(self.device)?)
            .build()
    }
}

// -------------------------------------------------------------------------------------------------
// Validated reconstruction parameters
// -------------------------------------------------------------------------------------------------

/// Validated parameter set consumed by the reconstruction strategies.
///
/// Construct through [`ReconParams::builder`] (or from a [`ReconConfig`] via
/// [`ReconConfig::recon_params`]); both paths run the same validation, so
/// downstream code can rely on the invariants documented per field.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconParams {
    /// Output volume dimensions, all strictly positive.
    pub img_shape: [usize; 3],
    /// NUFFT grid oversampling ratio, strictly greater than 1.
    pub oversamp: f64,
    /// Interpolation kernel support in oversampled-grid units, positive.
    pub kernel_width: f64,
    /// Compute target; `Host` is the only backend available in this build.
    pub device: ComputeDevice,
}

impl Default for ReconParams {
    fn default() -> Self {
        ReconParams {
            img_shape: default_img_shape(),
            oversamp: default_oversamp(),
            kernel_width: default_kernel_width(),
            device: ComputeDevice::Host,
        }
    }
}

impl ReconParams {
    /// Create a new [`ReconParamsBuilder`] initialized with protocol defaults.
    pub fn builder() -> ReconParamsBuilder {
        ReconParamsBuilder::new()
    }
}

/// Builder for [`ReconParams`], with validation.
#[derive(Debug, Clone, Default)]
pub struct ReconParamsBuilder {
    params: ReconParams,
}

impl ReconParamsBuilder {
    /// Create a new builder initialized with default values.
    pub fn new() -> Self {
        Self {
            params: ReconParams::default(),
        }
    }

    pub fn img_shape(mut self, v: [usize; 3]) -> Self {
        self.params.img_shape = v;
        self
    }
    pub fn oversamp(mut self, v: f64) -> Self {
        self.params.oversamp = v;
        self
    }
    pub fn kernel_width(mut self, v: f64) -> Self {
        self.params.kernel_width = v;
        self
    }
    pub fn device(mut self, v: ComputeDevice) -> Self {
        self.params.device = v;
        self
    }

    /// Return true iff x > 0.0 and comparable (i.e., not NaN).
    #[inline]
    fn gt0(x: f64) -> bool {
        x.partial_cmp(&0.0) == Some(Greater)
    }

    /// Return true iff a > b and comparable (i.e., not NaN).
    #[inline]
    fn gt(a: f64, b: f64) -> bool {
        matches!(a.partial_cmp(&b), Some(Greater))
    }

    /// Finalize the builder and produce a [`ReconParams`] instance.
    ///
    /// Validation rules
    /// -----------------
    /// * Every `img_shape` dimension is strictly positive.
    /// * `oversamp > 1.0` and `kernel_width > 0.0` (NaN rejected).
    /// * `device` is the host — no accelerator backend is compiled into this
    ///   build, and a requested accelerator must not silently degrade to CPU.
    pub fn build(self) -> Result<ReconParams, RegateError> {
        let p = &self.params;
        if p.img_shape.iter().any(|&d| d == 0) {
            return Err(RegateError::Configuration(format!(
                "output volume dimensions must be strictly positive, got {:?}",
                p.img_shape
            )));
        }
        if !Self::gt(p.oversamp, 1.0) {
            return Err(RegateError::Configuration(format!(
                "oversamp must be strictly greater than 1.0, got {}",
                p.oversamp
            )));
        }
        if !Self::gt0(p.kernel_width) || !p.kernel_width.is_finite() {
            return Err(RegateError::Configuration(format!(
                "kernel_width must be strictly positive, got {}",
                p.kernel_width
            )));
        }
        if let ComputeDevice::Accelerator(index) = p.device {
            return Err(RegateError::Configuration(format!(
                "accelerator device {index} requested but no accelerator backend is available in this build"
            )));
        }
        Ok(self.params)
    }
}

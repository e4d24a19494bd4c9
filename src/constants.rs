//! # Constants and type definitions for Regate
//!
//! This module centralizes the **numerical constants** and **common type
//! aliases** used throughout the `regate` library. All array data is carried
//! as [`ndarray`] containers so that views, defensive copies, and axis
//! selections compose without copying element types around.
//!
//! ## Overview
//!
//! - Robust-statistics constants used by the respiratory thresholder
//! - Core array aliases shared by the gating, NUFFT, and reconstruction modules
//!
//! These definitions are used by all main modules, including the gating
//! pipeline, the adjoint NUFFT, and the volume writer.

use ndarray::{Array1, Array2, Array3};
use num_complex::Complex64;

// -------------------------------------------------------------------------------------------------
// Numerical constants
// -------------------------------------------------------------------------------------------------

/// Scale factor converting the median absolute deviation to a Gaussian-equivalent
/// standard deviation: MAD = 0.6745 σ, hence σ = 1.4826 MAD.
pub const MAD_SCALE: f64 = 1.4826;

/// Default margin (in percent) trimmed from both tails of the standardized
/// respiratory signal before the gating threshold is estimated.
pub const DEFAULT_MARGIN_PERCENT: f64 = 5.0;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Respiratory trace: one real-valued sample per acquired readout, time-ordered.
pub type RespTrace = Array1<f64>;

/// Complex k-space samples, shape `(num_coils, num_readouts)`. Column `j`
/// corresponds by index to `Trajectory` row `j`, `DcfWeights[j]`, and
/// `RespTrace[j]`.
pub type KSpace = Array2<Complex64>;

/// Spatial-frequency coordinates, shape `(num_readouts, num_dims)` with
/// `num_dims` being 2 or 3.
pub type Trajectory = Array2<f64>;

/// Density compensation weights, one non-negative scalar per readout.
pub type DcfWeights = Array1<f64>;

/// Binary respiratory inclusion mask, one `0`/`1` label per readout.
pub type GatingMask = Array1<u8>;

/// Dense real-valued magnitude volume in canonical (depth, height, width)
/// axis order.
pub type Volume = Array3<f64>;

//! # Reconstruction strategies
//!
//! The shared reconstruction contract and its gating variants.
//!
//! ## Overview
//! -----------------
//! Every gating variant exposes the single entry point
//! [`Recon::run`]: borrow the caller's arrays, work on private copies, and
//! return an owned magnitude volume. The variants are:
//!
//! * [`HardGating`](hard_gating::HardGating) — thresholds the respiratory
//!   trace, partitions the k-space arrays, reconstructs the gated subset.
//! * [`NoGating`](no_gating::NoGating) — ungated baseline over the full
//!   sample set, numerically identical to hard gating with an all-ones
//!   mask.
//!
//! [`GatingStrategy`] is the tagged union over the variants; the batch
//! driver constructs strategies from configuration by name and iterates
//! them without per-strategy branching.
//!
//! ## Ownership
//! -----------------
//! `run` never mutates caller state: inputs are defensively copied on
//! entry, so the same source arrays can be handed to several strategies in
//! sequence (or from separate threads) without aliasing hazards.
//!
//! ## Error semantics
//! -----------------
//! Failures are typed ([`RegateError`]) and raised before the expensive
//! per-coil loop whenever the inputs permit it: co-indexing violations,
//! degenerate traces, and empty gated subsets never reach the gridder.

pub mod hard_gating;
pub mod no_gating;

use ndarray::{Array3, ArrayView1, ArrayView2, Axis};
use num_complex::Complex64;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::config::{ReconConfig, ReconParams};
use crate::constants::{DcfWeights, KSpace, Trajectory, Volume};
use crate::gating::GatingParams;
use crate::regate_errors::RegateError;

pub use hard_gating::HardGating;
pub use no_gating::NoGating;

/// Borrowed views of the co-indexed input arrays for one reconstruction.
///
/// The respiratory trace is optional at this level: gated strategies
/// require it and fail with [`RegateError::MissingInput`] when absent,
/// the ungated baseline ignores it.
#[derive(Debug, Clone, Copy)]
pub struct ReconInputs<'a> {
    /// Complex k-space samples, `(num_coils, num_readouts)`.
    pub ksp: ArrayView2<'a, Complex64>,
    /// Trajectory coordinates, `(num_readouts, num_dims)`.
    pub coord: ArrayView2<'a, f64>,
    /// Density compensation weights, `(num_readouts,)`.
    pub dcf: ArrayView1<'a, f64>,
    /// Respiratory trace, `(num_readouts,)`.
    pub resp: Option<ArrayView1<'a, f64>>,
}

impl ReconInputs<'_> {
    /// Validate co-indexing of all present arrays along the readout axis.
    pub fn check_readout_axis(&self) -> Result<(), RegateError> {
        let expected = self.ksp.ncols();
        let check = |context: &str, actual: usize| -> Result<(), RegateError> {
            if actual != expected {
                return Err(RegateError::ShapeMismatch {
                    context: context.to_string(),
                    expected,
                    actual,
                });
            }
            Ok(())
        };
        check("trajectory coordinates", self.coord.nrows())?;
        check("density compensation weights", self.dcf.len())?;
        if let Some(resp) = &self.resp {
            check("respiratory trace", resp.len())?;
        }
        Ok(())
    }
}

/// Common contract implemented by every gating strategy.
pub trait Recon {
    /// Execute the reconstruction and return the magnitude volume.
    fn run(&self, inputs: &ReconInputs<'_>) -> Result<Volume, RegateError>;
}

/// Tagged union over the available gating strategies.
#[derive(Debug, Clone)]
pub enum GatingStrategy {
    HardGating(HardGating),
    NoGating(NoGating),
}

impl GatingStrategy {
    /// Construct a strategy by its configured name.
    ///
    /// Recognized names are `"hard_gating"` and `"no_gating"`; anything
    /// else is a configuration error.
    pub fn from_config(name: &str, config: &ReconConfig) -> Result<Self, RegateError> {
        let params = config.recon_params()?;
        match name {
            "hard_gating" => {
                let gating = GatingParams {
                    gating_thresh: config.gating_thresh,
                    gating_weight: config.gating_weight,
                    ..GatingParams::default()
                };
                gating.validate()?;
                Ok(GatingStrategy::HardGating(HardGating::new(params, gating)))
            }
            "no_gating" => Ok(GatingStrategy::NoGating(NoGating::new(params))),
            other => Err(RegateError::Configuration(format!(
                "unknown reconstruction strategy: {other}"
            ))),
        }
    }

    /// Stable name of the variant, used for logging and output files.
    pub fn name(&self) -> &'static str {
        match self {
            GatingStrategy::HardGating(_) => "hard_gating",
            GatingStrategy::NoGating(_) => "no_gating",
        }
    }
}

impl Recon for GatingStrategy {
    fn run(&self, inputs: &ReconInputs<'_>) -> Result<Volume, RegateError> {
        match self {
            GatingStrategy::HardGating(s) => s.run(inputs),
            GatingStrategy::NoGating(s) => s.run(inputs),
        }
    }
}

/// Shared reconstruction loop: density pre-weighting, per-coil adjoint
/// NUFFT, sum-of-squares coil combination, canonical axis order.
///
/// The per-coil transforms are independent and run on the rayon pool;
/// partial sum-of-squares accumulators are merged by summation, so no
/// more per-coil images are alive at once than there are workers.
pub(crate) fn reconstruct_volume(
    ksp: &KSpace,
    coord: &Trajectory,
    dcf: &DcfWeights,
    params: &ReconParams,
) -> Result<Volume, RegateError> {
    let num_readouts = ksp.ncols();
    if num_readouts == 0 {
        return Err(RegateError::InsufficientSamples);
    }

    // Density pre-weighting, broadcast across coils.
    let mut weighted = ksp.clone();
    for mut row in weighted.axis_iter_mut(Axis(0)) {
        row.zip_mut_with(dcf, |w, &d| *w *= d);
    }

    let num_coils = weighted.nrows();
    info!(num_coils, num_readouts, "performing per-coil adjoint NUFFT");

    let accumulator = (0..num_coils)
        .into_par_iter()
        .map(|coil| {
            debug!(coil, "reconstructing coil image");
            let coil_img = crate::nufft::nufft_adjoint(
                weighted.row(coil),
                coord.view(),
                params.img_shape,
                params.oversamp,
                params.kernel_width,
            )?;
            Ok::<_, RegateError>(coil_img.mapv(|v| v.norm_sqr()))
        })
        .try_reduce(
            || Array3::<f64>::zeros(params.img_shape),
            |a, b| Ok(a + b),
        )?;

    let volume = accumulator.mapv(f64::sqrt);

    // Canonical (depth, height, width) output order.
    Ok(volume.reversed_axes().as_standard_layout().to_owned())
}

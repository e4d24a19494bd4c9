//! Ungated baseline reconstruction over the full sample set.

use tracing::info;

use crate::config::ReconParams;
use crate::constants::Volume;
use crate::recon::{reconstruct_volume, Recon, ReconInputs};
use crate::regate_errors::RegateError;

/// No-gating reconstruction strategy.
///
/// Numerically identical to hard gating with an all-ones mask: every
/// acquired readout contributes. Serves as the motion-blurred reference
/// against which gated reconstructions are compared.
#[derive(Debug, Clone)]
pub struct NoGating {
    params: ReconParams,
}

impl NoGating {
    pub fn new(params: ReconParams) -> Self {
        NoGating { params }
    }
}

impl Recon for NoGating {
    fn run(&self, inputs: &ReconInputs<'_>) -> Result<Volume, RegateError> {
        inputs.check_readout_axis()?;

        // Private working copies; the respiratory trace is ignored here.
        let ksp = inputs.ksp.to_owned();
        let coord = inputs.coord.to_owned();
        let dcf = inputs.dcf.to_owned();

        info!(readouts = ksp.ncols(), "reconstructing ungated baseline");
        reconstruct_volume(&ksp, &coord, &dcf, &self.params)
    }
}

//! Hard respiratory gating: reconstruct only the readouts acquired in the
//! stable end-expiration phase.

use tracing::info;

use crate::config::ReconParams;
use crate::constants::Volume;
use crate::gating::{partition, threshold_mask, GatingParams};
use crate::recon::{reconstruct_volume, Recon, ReconInputs};
use crate::regate_errors::RegateError;

/// Hard-gating reconstruction strategy.
///
/// Derives a binary inclusion mask from the respiratory trace, partitions
/// the k-space arrays by that mask, and reconstructs the retained subset
/// with the shared adjoint-NUFFT loop. The mask is an internal
/// intermediate: it is computed, consumed, and discarded within one
/// [`run`](Recon::run) call.
#[derive(Debug, Clone)]
pub struct HardGating {
    params: ReconParams,
    gating: GatingParams,
}

impl HardGating {
    pub fn new(params: ReconParams, gating: GatingParams) -> Self {
        HardGating { params, gating }
    }
}

impl Recon for HardGating {
    fn run(&self, inputs: &ReconInputs<'_>) -> Result<Volume, RegateError> {
        inputs.check_readout_axis()?;
        let resp = inputs.resp.ok_or_else(|| {
            RegateError::MissingInput("respiratory trace (resp)".into())
        })?;

        // Private working copies; the caller's arrays stay untouched.
        let ksp = inputs.ksp.to_owned();
        let coord = inputs.coord.to_owned();
        let dcf = inputs.dcf.to_owned();
        let resp = resp.to_owned();

        let mask = threshold_mask(resp.view(), &self.gating)?;
        let retained = mask.iter().filter(|&&m| m == 1).count();
        info!(
            retained,
            total = mask.len(),
            "derived respiratory inclusion mask"
        );

        let (gated_ksp, gated_coord, gated_dcf) =
            partition(&mask, ksp.view(), coord.view(), dcf.view())?;

        reconstruct_volume(&gated_ksp, &gated_coord, &gated_dcf, &self.params)
    }
}

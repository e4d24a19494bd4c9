pub mod config;
pub mod constants;
pub mod dataloader;
pub mod gating;
pub mod nufft;
pub mod recon;
pub mod regate_errors;
pub mod volume;

pub use config::{ComputeDevice, ReconConfig, ReconParams};
pub use recon::{GatingStrategy, Recon, ReconInputs};
pub use regate_errors::RegateError;

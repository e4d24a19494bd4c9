//! # Preprocessed input loading
//!
//! Loads the co-indexed `.npy` arrays produced by the acquisition
//! preprocessing step from a data directory:
//!
//! * `ksp.npy`   — complex k-space samples, `(num_coils, num_readouts)`
//! * `coord.npy` — trajectory coordinates, `(num_readouts, num_dims)`
//! * `dcf.npy`   — density compensation weights, `(num_readouts,)`
//! * `resp.npy`  — respiratory trace, `(num_readouts,)`
//! * `tr.npy`    — repetition time, optional scalar metadata
//! * `noise.npy` — noise calibration data, optional (often stored as a
//!   zero placeholder when no calibration scan was acquired)
//!
//! Co-indexing across the four required arrays is verified here, at load
//! time, so reconstruction strategies can assume consistent inputs.

use std::fs::File;

use camino::Utf8Path;
use ndarray::Array2;
use ndarray_npy::ReadNpyExt;
use num_complex::Complex64;
use tracing::{debug, info, warn};

use crate::constants::{DcfWeights, KSpace, RespTrace, Trajectory};
use crate::regate_errors::RegateError;

/// Fully materialized input data of one reconstruction batch.
#[derive(Debug, Clone)]
pub struct ReconData {
    pub ksp: KSpace,
    pub coord: Trajectory,
    pub dcf: DcfWeights,
    pub resp: RespTrace,
    /// Repetition time in seconds, if archived with the acquisition.
    pub tr: Option<f64>,
    /// Noise calibration samples, if a calibration scan was archived.
    pub noise: Option<Array2<Complex64>>,
}

impl ReconData {
    /// Number of acquired readouts (shared readout-axis length).
    pub fn num_readouts(&self) -> usize {
        self.ksp.ncols()
    }

    /// Number of receiver coils.
    pub fn num_coils(&self) -> usize {
        self.ksp.nrows()
    }
}

/// Load the preprocessed arrays from `data_dir`.
///
/// Arguments
/// -----------------
/// * `data_dir`: directory containing the `.npy` files listed in the
///   module documentation.
///
/// Return
/// ----------
/// * The loaded [`ReconData`], or a [`RegateError`]:
///   - [`RegateError::MissingInput`] if a required file is absent,
///   - [`RegateError::Npy`] if a file cannot be parsed,
///   - [`RegateError::ShapeMismatch`] if the readout axes disagree.
pub fn load_dataset(data_dir: &Utf8Path) -> Result<ReconData, RegateError> {
    info!(%data_dir, "loading preprocessed input arrays");

    let ksp: KSpace = read_required(&data_dir.join("ksp.npy"))?;
    let coord: Trajectory = read_required(&data_dir.join("coord.npy"))?;
    let dcf: DcfWeights = read_required(&data_dir.join("dcf.npy"))?;
    let resp: RespTrace = read_required(&data_dir.join("resp.npy"))?;

    let num_readouts = ksp.ncols();
    check_axis("trajectory coordinates (coord.npy)", num_readouts, coord.nrows())?;
    check_axis("density compensation weights (dcf.npy)", num_readouts, dcf.len())?;
    check_axis("respiratory trace (resp.npy)", num_readouts, resp.len())?;

    let tr = match read_optional::<ndarray::Array1<f64>>(&data_dir.join("tr.npy"))? {
        Some(arr) => arr.first().copied(),
        None => None,
    };
    if let Some(tr) = tr {
        debug!(tr, "repetition time loaded");
    }

    // Noise calibration is frequently archived as a scalar zero placeholder;
    // anything that does not parse as a complex matrix is treated as absent.
    let noise_path = data_dir.join("noise.npy");
    let noise = if noise_path.is_file() {
        match Array2::<Complex64>::read_npy(File::open(&noise_path)?) {
            Ok(arr) => Some(arr),
            Err(err) => {
                warn!(%noise_path, %err, "ignoring unusable noise calibration file");
                None
            }
        }
    } else {
        None
    };

    info!(
        num_coils = ksp.nrows(),
        num_readouts,
        num_dims = coord.ncols(),
        "input arrays loaded"
    );

    Ok(ReconData {
        ksp,
        coord,
        dcf,
        resp,
        tr,
        noise,
    })
}

fn read_required<A: ReadNpyExt>(path: &Utf8Path) -> Result<A, RegateError> {
    if !path.is_file() {
        return Err(RegateError::MissingInput(path.to_owned()));
    }
    Ok(A::read_npy(File::open(path)?)?)
}

fn read_optional<A: ReadNpyExt>(path: &Utf8Path) -> Result<Option<A>, RegateError> {
    if !path.is_file() {
        return Ok(None);
    }
    Ok(Some(A::read_npy(File::open(path)?)?))
}

fn check_axis(context: &str, expected: usize, actual: usize) -> Result<(), RegateError> {
    if expected != actual {
        return Err(RegateError::ShapeMismatch {
            context: context.to_string(),
            expected,
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod dataloader_test {
    use camino::Utf8Path;
    use ndarray::{Array1, Array2};
    use ndarray_npy::WriteNpyExt;
    use num_complex::Complex64;

    use super::*;

    fn write_npy<A: WriteNpyExt>(dir: &Utf8Path, name: &str, arr: &A) {
        let file = std::fs::File::create(dir.join(name)).unwrap();
        arr.write_npy(file).unwrap();
    }

    fn write_dataset(dir: &Utf8Path, n: usize) {
        let ksp = Array2::from_elem((2, n), Complex64::new(1.0, -1.0));
        let coord = Array2::<f64>::zeros((n, 3));
        let dcf = Array1::<f64>::ones(n);
        let resp = Array1::from_shape_fn(n, |i| (i as f64 * 0.2).sin());
        write_npy(dir, "ksp.npy", &ksp);
        write_npy(dir, "coord.npy", &coord);
        write_npy(dir, "dcf.npy", &dcf);
        write_npy(dir, "resp.npy", &resp);
    }

    #[test]
    fn loads_consistent_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let dir = Utf8Path::from_path(dir.path()).unwrap();
        write_dataset(dir, 12);
        write_npy(dir, "tr.npy", &Array1::from_vec(vec![0.004_f64]));

        let data = load_dataset(dir).unwrap();
        assert_eq!(data.num_coils(), 2);
        assert_eq!(data.num_readouts(), 12);
        assert_eq!(data.tr, Some(0.004));
        assert!(data.noise.is_none());
    }

    #[test]
    fn missing_required_array_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let dir = Utf8Path::from_path(dir.path()).unwrap();
        write_dataset(dir, 8);
        std::fs::remove_file(dir.join("resp.npy")).unwrap();

        let res = load_dataset(dir);
        assert!(matches!(res, Err(RegateError::MissingInput(p)) if p.ends_with("resp.npy")));
    }

    #[test]
    fn inconsistent_readout_axis_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let dir = Utf8Path::from_path(dir.path()).unwrap();
        write_dataset(dir, 8);
        // Overwrite the trace with a shorter one.
        write_npy(dir, "resp.npy", &Array1::<f64>::zeros(5));

        let res = load_dataset(dir);
        assert!(matches!(res, Err(RegateError::ShapeMismatch { .. })));
    }
}

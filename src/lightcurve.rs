use std::path::Path;

use crate::fits::{BinTable, FitsError};

#[derive(thiserror::Error, Debug)]
pub enum LightCurveError {
    #[error("Failed to parse the light curve product")]
    Fits(#[from] FitsError),
    #[error("Light curve has no finite flux sample")]
    NoData,
}
type Result<T> = std::result::Result<T, LightCurveError>;

/// Normalized flux time series of one target
///
/// Time is in the TESS convention (BJD - 2457000); flux is the PDCSAP flux
/// divided by its median so that typical values sit near 1. NaN samples
/// (momentum dumps, gaps) are kept and render as holes in the figure.
#[derive(Debug, Clone)]
pub struct LightCurve {
    pub time: Vec<f64>,
    pub flux: Vec<f64>,
}
impl LightCurve {
    /// Loads the `TIME` and `PDCSAP_FLUX` columns of a light-curve product
    /// and normalizes the flux
    pub fn from_fits<P: AsRef<Path>>(path: P) -> Result<Self> {
        let table = BinTable::from_path(path)?;
        let time = table.column("TIME")?;
        let flux = table.column("PDCSAP_FLUX")?;
        Self::normalized(time, flux)
    }
    /// Divides the raw flux by its 50th percentile, NaN samples ignored
    pub fn normalized(time: Vec<f64>, raw_flux: Vec<f64>) -> Result<Self> {
        let median = nan_median(&raw_flux).ok_or(LightCurveError::NoData)?;
        let flux = raw_flux.into_iter().map(|flux| flux / median).collect();
        Ok(Self { time, flux })
    }
    pub fn len(&self) -> usize {
        self.time.len()
    }
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}

/// Median of the finite values, with linear interpolation for even counts
///
/// Returns `None` when no value is finite.
pub fn nan_median(values: &[f64]) -> Option<f64> {
    let mut finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return None;
    }
    finite.sort_by(f64::total_cmp);
    let n = finite.len();
    Some(if n % 2 == 1 {
        finite[n / 2]
    } else {
        (finite[n / 2 - 1] + finite[n / 2]) / 2.0
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_median_is_one() {
        let raw = vec![90.0, 95.0, 100.0, 105.0, 110.0, 120.0, 80.0];
        let lc = LightCurve::normalized((0..7).map(|i| i as f64).collect(), raw).unwrap();
        let median = nan_median(&lc.flux).unwrap();
        assert!((median - 1.0).abs() < 1e-12);
    }

    #[test]
    fn median_ignores_nan() {
        assert_eq!(nan_median(&[f64::NAN, 1.0, 3.0]), Some(2.0));
    }

    #[test]
    fn even_count_interpolates() {
        assert_eq!(nan_median(&[4.0, 1.0, 2.0, 3.0]), Some(2.5));
    }

    #[test]
    fn nan_samples_are_preserved() {
        let lc = LightCurve::normalized(vec![0.0, 1.0, 2.0], vec![99.0, f64::NAN, 101.0]).unwrap();
        assert!(lc.flux[1].is_nan());
        assert_eq!(lc.len(), 3);
    }

    #[test]
    fn all_nan_flux_is_no_data() {
        assert!(matches!(
            LightCurve::normalized(vec![0.0], vec![f64::NAN]),
            Err(LightCurveError::NoData)
        ));
    }
}

//! Batch generation of interactive TESS light-curve figures
//!
//! The pipeline reads a MAST bulk-export catalog of targets, downloads the
//! `LC` data product of each observation from the archive, normalizes the
//! PDCSAP flux by its median and writes one interactive HTML figure per
//! target, together with a `random.js` script that displays one of the
//! rendered figures at random inside a webpage frame.

use std::path::Path;

pub mod batch;
pub mod catalog;
mod error;
pub mod figure;
pub mod fits;
pub mod lightcurve;
pub mod mast;
pub mod selector;

pub use batch::BatchSummary;
pub use catalog::{CatalogLoader, CatalogRow};
pub use error::Error;
pub use lightcurve::LightCurve;
pub use mast::{FetchLightCurve, MastClient};

/// Regenerates the selector script from the artifacts present in `fig_dir`
///
/// Runs once after the batch; the scan deliberately includes artifacts left
/// by earlier runs since the figure directory is never cleaned.
pub fn regenerate_selector(fig_dir: &Path, script: &Path) -> Result<usize, Error> {
    let links = selector::scan_artifacts(fig_dir)?;
    selector::write_selector_script(script, &links)?;
    Ok(links.len())
}

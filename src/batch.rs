//! Sequential batch driver
//!
//! One target is fully processed (or skipped) before the next begins; a
//! fetch failure is logged and the batch moves on.

use std::{fs, path::Path};

use indicatif::{ProgressBar, ProgressIterator};

use crate::{
    catalog::CatalogRow,
    figure::{lightcurve_figure, point_color},
    mast::FetchLightCurve,
};

#[derive(thiserror::Error, Debug)]
pub enum BatchError {
    #[error("Failed to create the figure directory")]
    Io(#[from] std::io::Error),
}

/// Per-run counters, reported once the catalog is exhausted
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub generated: usize,
    pub skipped: usize,
}

/// Fetches and renders every catalog row in order, writing one
/// `TIC{id}.html` artifact per success into `fig_dir`
pub fn run<F: FetchLightCurve>(
    rows: &[CatalogRow],
    fetcher: &F,
    fig_dir: &Path,
) -> Result<BatchSummary, BatchError> {
    fs::create_dir_all(fig_dir)?;
    let total = rows.len();
    let bar = ProgressBar::new(total as u64);
    let mut summary = BatchSummary::default();
    for row in rows.iter().progress_with(bar.clone()) {
        bar.println(format!("TIC {} ({} of {})", row.tic, summary.generated, total));
        let lightcurve = match fetcher.fetch(&row.obsid.to_string()) {
            Ok(lightcurve) => lightcurve,
            Err(e) => {
                bar.println(format!(
                    "TIC {}, obsid {} could not be processed: {}",
                    row.tic, row.obsid, e
                ));
                log::warn!("skipping TIC {}: {}", row.tic, e);
                summary.skipped += 1;
                continue;
            }
        };
        let figure = lightcurve_figure(
            &lightcurve,
            &format!("TIC{}", row.tic),
            point_color(row.tic),
        );
        figure.write_html(fig_dir.join(format!("TIC{}.html", row.tic)));
        summary.generated += 1;
    }
    Ok(summary)
}

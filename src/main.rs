use std::path::PathBuf;

use anyhow::Context;
use structopt::StructOpt;

use fetch_lightcurves::{batch, regenerate_selector, CatalogLoader, MastClient};

#[derive(Debug, StructOpt)]
#[structopt(
    name = "fetch-lightcurves",
    about = "Batch download of TESS light curves and interactive figure generation"
)]
struct Opt {
    /// Path to the MAST bulk-export catalog
    #[structopt(long, parse(from_os_str), default_value = "data/tess-timeseries-mast.csv")]
    catalog: PathBuf,
    /// TESS sector (catalog `sequence_number`) to process
    #[structopt(long, default_value = "1")]
    sector: u32,
    /// Maximum number of targets to process
    #[structopt(long, default_value = "1024")]
    limit: usize,
    /// Figure output directory
    #[structopt(long, parse(from_os_str), default_value = "fig")]
    fig_dir: PathBuf,
    /// Path of the generated random-selection script
    #[structopt(long, parse(from_os_str), default_value = "random.js")]
    script: PathBuf,
    /// MAST archive base URL
    #[structopt(long, default_value = "https://mast.stsci.edu")]
    mast_url: String,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opt = Opt::from_args();

    let rows = CatalogLoader::default()
        .path(&opt.catalog)
        .sector(opt.sector)
        .limit(opt.limit)
        .load()
        .with_context(|| format!("loading the target catalog {:?}", opt.catalog))?;
    log::info!("{} targets selected from {:?}", rows.len(), opt.catalog);

    let client = MastClient::new()?.base_url(opt.mast_url);
    let summary = batch::run(&rows, &client, &opt.fig_dir)?;
    println!(
        "{} figures generated, {} targets skipped",
        summary.generated, summary.skipped
    );

    let links = regenerate_selector(&opt.fig_dir, &opt.script)
        .with_context(|| format!("writing the selector script {:?}", opt.script))?;
    log::info!("{} artifacts listed in {:?}", links, opt.script);

    Ok(())
}

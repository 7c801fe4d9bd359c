//! MAST archive client
//!
//! Lists the data products of one observation through the CAOM invoke
//! service and downloads the light-curve (`LC`) product to a local
//! directory, mirroring the archive's bulk-download layout.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;

use crate::lightcurve::{LightCurve, LightCurveError};

pub const MAST_URL: &str = "https://mast.stsci.edu";
const DOWNLOAD_DIR: &str = "mastDownload";

/// Why one target could not be processed
///
/// The batch driver treats every variant as skip-and-continue; the taxonomy
/// exists so that retry logic can be added later without a signature change.
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("No 'LC' data product for obsid {0}")]
    NotFound(String),
    #[error("Archive request failed")]
    Transient(#[from] reqwest::Error),
    #[error("Failed to store the downloaded product")]
    Io(#[from] std::io::Error),
    #[error("Malformed light curve product")]
    Malformed(#[from] LightCurveError),
}
type Result<T> = std::result::Result<T, FetchError>;

/// Source of normalized light curves, keyed by observation id
pub trait FetchLightCurve {
    fn fetch(&self, obsid: &str) -> Result<LightCurve>;
}

/// One entry of a CAOM product listing
#[derive(Debug, Clone, Deserialize)]
pub struct Product {
    #[serde(rename = "productSubGroupDescription")]
    pub subgroup: Option<String>,
    #[serde(rename = "dataURI")]
    pub data_uri: String,
    #[serde(rename = "productFilename")]
    pub filename: String,
}

#[derive(Debug, Deserialize)]
struct ProductListing {
    #[serde(default)]
    data: Vec<Product>,
}

pub struct MastClient {
    base_url: String,
    download_dir: PathBuf,
    http: reqwest::blocking::Client,
}
impl MastClient {
    pub fn new() -> Result<Self> {
        Ok(Self {
            base_url: MAST_URL.to_string(),
            download_dir: PathBuf::from(DOWNLOAD_DIR),
            // the batch has no deadline, downloads may be large
            http: reqwest::blocking::Client::builder()
                .timeout(None::<Duration>)
                .build()?,
        })
    }
    pub fn base_url<S: Into<String>>(self, base_url: S) -> Self {
        Self {
            base_url: base_url.into(),
            ..self
        }
    }
    pub fn download_dir<P: AsRef<Path>>(self, download_dir: P) -> Self {
        Self {
            download_dir: download_dir.as_ref().to_path_buf(),
            ..self
        }
    }
    /// Returns the light-curve product of one observation
    pub fn lightcurve_product(&self, obsid: &str) -> Result<Product> {
        let request = serde_json::json!({
            "service": "Mast.Caom.Products",
            "params": { "obsid": obsid },
            "format": "json",
        });
        log::debug!("listing products for obsid {}", obsid);
        let listing: ProductListing = self
            .http
            .get(format!("{}/api/v0/invoke", self.base_url))
            .query(&[("request", request.to_string())])
            .send()?
            .error_for_status()?
            .json()?;
        first_lc_product(listing.data, obsid)
    }
    /// Downloads a product, returning its local path
    pub fn download(&self, product: &Product) -> Result<PathBuf> {
        fs::create_dir_all(&self.download_dir)?;
        let local = self.download_dir.join(&product.filename);
        let bytes = self
            .http
            .get(format!("{}/api/v0.1/Download/file", self.base_url))
            .query(&[("uri", product.data_uri.as_str())])
            .send()?
            .error_for_status()?
            .bytes()?;
        fs::write(&local, &bytes)?;
        log::info!("downloaded {:?} ({} bytes)", local, bytes.len());
        Ok(local)
    }
}
impl FetchLightCurve for MastClient {
    fn fetch(&self, obsid: &str) -> Result<LightCurve> {
        let product = self.lightcurve_product(obsid)?;
        let path = self.download(&product)?;
        Ok(LightCurve::from_fits(path)?)
    }
}

/// First product flagged as a light curve, in listing order
fn first_lc_product(products: Vec<Product>, obsid: &str) -> Result<Product> {
    products
        .into_iter()
        .find(|product| product.subgroup.as_deref() == Some("LC"))
        .ok_or_else(|| FetchError::NotFound(obsid.to_string()))
}

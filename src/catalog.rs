use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read the target catalog")]
    Csv(#[from] csv::Error),
}
type Result<T> = std::result::Result<T, CatalogError>;

/// One target of the MAST bulk-export catalog
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogRow {
    /// TIC identifier
    #[serde(rename = "target_name")]
    pub tic: u64,
    /// MAST observation identifier
    pub obsid: u64,
    /// TESS sector the observation belongs to
    pub sequence_number: u32,
}

/// Catalog loader with a sector filter and a row cap
///
/// The defaults reproduce the original batch: sector 1, at most 1024 targets.
pub struct CatalogLoader {
    path: PathBuf,
    sector: u32,
    limit: usize,
}
impl Default for CatalogLoader {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/tess-timeseries-mast.csv"),
            sector: 1,
            limit: 1024,
        }
    }
}
impl CatalogLoader {
    pub fn path<P: AsRef<Path>>(self, path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            ..self
        }
    }
    pub fn sector(self, sector: u32) -> Self {
        Self { sector, ..self }
    }
    pub fn limit(self, limit: usize) -> Self {
        Self { limit, ..self }
    }
    /// Loads the catalog, keeping the first `limit` rows of the selected sector
    ///
    /// A malformed catalog fails the whole run.
    pub fn load(self) -> Result<Vec<CatalogRow>> {
        let mut rdr = csv::Reader::from_path(&self.path)?;
        let mut rows = Vec::new();
        for record in rdr.deserialize() {
            if rows.len() >= self.limit {
                break;
            }
            let row: CatalogRow = record?;
            if row.sequence_number == self.sector {
                rows.push(row);
            }
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn catalog_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    const CATALOG: &str = "\
target_name,obsid,sequence_number
101,900000101,1
102,900000102,1
103,900000103,2
";

    #[test]
    fn sector_filter_and_cap() {
        let file = catalog_file(CATALOG);
        let rows = CatalogLoader::default()
            .path(file.path())
            .sector(1)
            .limit(2)
            .load()
            .unwrap();
        let tics: Vec<_> = rows.iter().map(|row| row.tic).collect();
        assert_eq!(tics, vec![101, 102]);
    }

    #[test]
    fn cap_truncates_within_a_sector() {
        let file = catalog_file(CATALOG);
        let rows = CatalogLoader::default()
            .path(file.path())
            .sector(1)
            .limit(1)
            .load()
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].tic, 101);
        assert_eq!(rows[0].obsid, 900000101);
    }

    #[test]
    fn other_sectors_are_excluded() {
        let file = catalog_file(CATALOG);
        let rows = CatalogLoader::default()
            .path(file.path())
            .sector(2)
            .limit(1024)
            .load()
            .unwrap();
        let tics: Vec<_> = rows.iter().map(|row| row.tic).collect();
        assert_eq!(tics, vec![103]);
    }

    #[test]
    fn malformed_catalog_is_fatal() {
        let file = catalog_file("target_name,obsid,sequence_number\nnot-a-number,1,1\n");
        assert!(CatalogLoader::default().path(file.path()).load().is_err());
    }
}

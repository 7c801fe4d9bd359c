use crate::{
    batch::BatchError, catalog::CatalogError, mast::FetchError, selector::SelectorError,
};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Error in the `catalog` module")]
    Catalog(#[from] CatalogError),
    #[error("Error in the `mast` module")]
    Fetch(#[from] FetchError),
    #[error("Error in the `batch` module")]
    Batch(#[from] BatchError),
    #[error("Error in the `selector` module")]
    Selector(#[from] SelectorError),
}

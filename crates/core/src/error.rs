use thiserror::Error;

use crate::model::{CatalogError, SettingsError};

/// Any configuration problem that makes a book unusable.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

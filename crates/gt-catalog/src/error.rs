use gt_core::{GtError, RouteId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("route {0} has no coordinates")]
    EmptyRoute(RouteId),

    #[error("route {0} is defined more than once")]
    DuplicateRoute(RouteId),

    #[error("route parse error: {0}")]
    Parse(String),

    #[error(transparent)]
    Core(#[from] GtError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

use gt_core::RouteId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("route {0} is not in the catalog")]
    RouteNotFound(RouteId),

    #[error("scheduler configuration error: {0}")]
    Config(String),

    #[error("no tokio runtime available; build the scheduler inside a runtime or pass one with `runtime()`")]
    NoRuntime,
}

pub type SimResult<T> = Result<T, SimError>;

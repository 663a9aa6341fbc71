//! Backend resource client: transport seam, normalized errors, typed
//! element/attribute/point calls, and the composite batch executor.

pub mod batch;
pub mod error;
pub mod resource;
pub mod transport;
pub mod wire;

pub use batch::{execute as execute_batch, BatchError, BatchOutcome, BatchPlan, BatchStep, StepKey, StepResponse};
pub use error::{ApiError, ErrorKind};
pub use resource::{PointCatalog, PointPage, StoreClient};
pub use transport::{
    HttpTransport, Method, Retrying, RetryPolicy, Transport, TransportRequest, TransportResponse,
};

// Cascade CMS batch client
// Accumulates operations in a queue, then dispatches them concurrently in
// rounds with ordered, all-or-nothing results:
// - BatchExecutor runs a round over one shared transport session
// - CascadeDriver pairs a queue and an executor for one Cascade instance
// - ClientConfig and logging set up the HTTP stack from the environment

pub mod config;
pub mod driver;
pub mod executor;
pub mod logging;

pub use config::{ClientConfig, ConfigError};
pub use driver::CascadeDriver;
pub use executor::BatchExecutor;

pub use cascade_core::{
    ApiBase, AssetTransform, Batch, BatchError, CascadeAsset, CascadeIdentifier,
    IdentityTransform, OperationDescriptor, OperationError, OperationQueue, Payload, QueueState,
    RawResponse, ResponseTransform, RoundFailure, SubmissionResult, TransformError,
    TransportError, TransportResponse, Verb,
};
pub use cascade_transport::{HttpTransport, HttpTransportConfig, Transport, TransportSession};

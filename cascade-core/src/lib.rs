// Cascade batch client core types
// - Operation descriptors and the queue that accumulates them
// - Batch snapshots handed to an executor round
// - Response and transform model, including the Cascade asset parser
// - Error taxonomy for dispatch, transform and round failures

pub mod asset;
pub mod endpoint;
pub mod error;
pub mod operation;
pub mod queue;
pub mod response;
pub mod transform;

pub use asset::{AssetProperty, AssetTransform, CascadeAsset, CascadeIdentifier};
pub use endpoint::ApiBase;
pub use error::{BatchError, OperationError, RoundFailure, TransformError, TransportError};
pub use operation::{DescriptorError, OperationDescriptor, Payload, Verb};
pub use queue::{Batch, OperationQueue, QueueState};
pub use response::{RawResponse, SubmissionResult, TransportResponse};
pub use transform::{IdentityTransform, ResponseTransform};

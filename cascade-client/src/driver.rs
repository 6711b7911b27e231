use crate::config::ClientConfig;
use crate::executor::BatchExecutor;
use cascade_core::{
    ApiBase, AssetTransform, BatchError, CascadeIdentifier, OperationDescriptor, OperationError,
    OperationQueue, ResponseTransform, RoundFailure, SubmissionResult,
};
use cascade_transport::{HttpTransport, Transport};
use tracing::{debug, info};

/// Queue plus executor for one Cascade instance.
///
/// The caller drives each round: queue operations, [`submit`](Self::submit),
/// then [`flush`](Self::flush). The composite helpers (`read_all`,
/// `list_sites`) run on their own queue and leave the driver's queue alone.
#[derive(Debug)]
pub struct CascadeDriver<T, X> {
    api: ApiBase,
    queue: OperationQueue,
    executor: BatchExecutor<T, X>,
}

impl CascadeDriver<HttpTransport, AssetTransform> {
    /// HTTP driver that parses every response into a [`CascadeAsset`](cascade_core::CascadeAsset)
    pub fn from_config(config: &ClientConfig) -> Self {
        let mut executor = BatchExecutor::new(
            HttpTransport::new(config.transport_config()),
            AssetTransform,
        );
        if let Some(limit) = config.max_concurrency {
            executor = executor.with_max_concurrency(limit);
        }
        info!(api = %config.api_base(), "Initializing Cascade driver");
        Self::new(config.api_base(), executor)
    }
}

impl<T, X> CascadeDriver<T, X>
where
    T: Transport,
    X: ResponseTransform,
{
    pub fn new(api: ApiBase, executor: BatchExecutor<T, X>) -> Self {
        Self {
            api,
            queue: OperationQueue::new(),
            executor,
        }
    }

    pub fn api(&self) -> &ApiBase {
        &self.api
    }

    pub fn queue(&self) -> &OperationQueue {
        &self.queue
    }

    pub fn executor(&self) -> &BatchExecutor<T, X> {
        &self.executor
    }

    pub fn enqueue(&mut self, operation: OperationDescriptor) {
        self.queue.enqueue(operation);
    }

    /// Queue `GET read/<type>/<id>`
    pub fn queue_read(&mut self, identifier: &CascadeIdentifier) {
        let op = self.api.get(["read", identifier.asset_type.as_str(), identifier.id.as_str()]);
        self.queue.enqueue(op);
    }

    /// Queue `GET listSites`
    pub fn queue_list_sites(&mut self) {
        let op = self.api.get(["listSites"]);
        self.queue.enqueue(op);
    }

    /// Run a round over everything queued since the last flush
    pub async fn submit(&mut self) -> Result<SubmissionResult<X::Output>, BatchError> {
        self.executor.submit_queue(&mut self.queue).await
    }

    pub fn flush(&mut self) {
        self.queue.flush();
    }

    /// Read every identified asset in one round
    pub async fn read_all(
        &self,
        identifiers: &[CascadeIdentifier],
    ) -> Result<SubmissionResult<X::Output>, BatchError> {
        if identifiers.is_empty() {
            return Ok(SubmissionResult::new(Vec::new()));
        }

        let mut queue = OperationQueue::new();
        queue.extend(
            identifiers
                .iter()
                .map(|id| self.api.get(["read", id.asset_type.as_str(), id.id.as_str()])),
        );
        debug!(count = identifiers.len(), "Reading assets");
        let result = self.executor.submit_queue(&mut queue).await;
        queue.flush();
        result
    }
}

impl<T> CascadeDriver<T, AssetTransform>
where
    T: Transport,
{
    /// Identifiers of every site visible to the API key
    pub async fn list_sites(&self) -> Result<Vec<CascadeIdentifier>, BatchError> {
        let mut queue = OperationQueue::new();
        queue.enqueue(self.api.get(["listSites"]));
        let result = self.executor.submit_queue(&mut queue).await;
        queue.flush();

        let Some(response) = result?.first().cloned() else {
            return Ok(Vec::new());
        };
        response.references("sites").map_err(|source| {
            RoundFailure::new(vec![OperationError::Transform { index: 0, source }], 1).into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cascade_core::{IdentityTransform, QueueState, TransportError, TransportResponse};
    use cascade_transport::TransportSession;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    /// Counts requests and echoes the target URL
    #[derive(Debug, Default, Clone)]
    struct Echo(Arc<AtomicUsize>);

    struct EchoSession(Arc<AtomicUsize>);

    #[async_trait]
    impl Transport for Echo {
        type Session = EchoSession;

        async fn open(&self) -> Result<EchoSession, TransportError> {
            Ok(EchoSession(self.0.clone()))
        }
    }

    #[async_trait]
    impl TransportSession for EchoSession {
        async fn request(
            &self,
            operation: &OperationDescriptor,
        ) -> Result<TransportResponse, TransportError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            let body = if operation.target().ends_with("/listSites") {
                json!({
                    "success": true,
                    "sites": [
                        {"id": "s1", "type": "site", "path": {"path": "www"}, "recycled": false},
                        {"id": "s2", "type": "site", "name": "intranet", "path": {"path": "intranet"}}
                    ]
                })
            } else {
                json!({"success": true, "url": operation.target()})
            };
            Ok(TransportResponse::ok(body))
        }

        fn timeout(&self) -> Option<Duration> {
            None
        }
    }

    fn driver<X: ResponseTransform>(transform: X) -> CascadeDriver<Echo, X> {
        CascadeDriver::new(
            ApiBase::new("https://cms.example.edu"),
            BatchExecutor::new(Echo::default(), transform),
        )
    }

    #[tokio::test]
    async fn test_enqueue_submit_flush_cycle() {
        let mut driver = driver(IdentityTransform);
        driver.queue_read(&CascadeIdentifier::new("page", "p1"));
        driver.queue_list_sites();
        assert_eq!(driver.queue().state(), QueueState::Pending);

        let result = driver.submit().await.unwrap();
        let urls: Vec<&Value> = result.iter().map(|v| &v["url"]).collect();
        assert_eq!(urls[0], &json!("https://cms.example.edu/api/v1/read/page/p1"));
        assert_eq!(driver.queue().state(), QueueState::Submitted);

        driver.flush();
        assert_eq!(driver.queue().state(), QueueState::Clean);
        assert!(driver.queue().is_empty());
    }

    #[tokio::test]
    async fn test_submit_on_fresh_driver_is_empty_batch() {
        let mut driver = driver(IdentityTransform);
        assert_eq!(driver.submit().await.unwrap_err(), BatchError::EmptyBatch);
        assert_eq!(driver.executor().transport().0.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_read_all_leaves_driver_queue_untouched() {
        let mut driver = driver(AssetTransform);
        driver.queue_list_sites();

        let assets = driver
            .read_all(&[
                CascadeIdentifier::new("page", "p1"),
                CascadeIdentifier::new("folder", "f1"),
            ])
            .await
            .unwrap();
        assert_eq!(assets.len(), 2);
        assert_eq!(driver.queue().len(), 1);
        assert_eq!(driver.queue().state(), QueueState::Pending);
    }

    #[tokio::test]
    async fn test_read_all_with_no_identifiers() {
        let driver = driver(AssetTransform);
        let assets = driver.read_all(&[]).await.unwrap();
        assert!(assets.is_empty());
        assert_eq!(driver.executor().transport().0.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_list_sites_keeps_sites_with_extra_keys() {
        let driver = driver(AssetTransform);
        let sites = driver.list_sites().await.unwrap();
        assert_eq!(
            sites,
            vec![
                CascadeIdentifier::new("site", "s1"),
                CascadeIdentifier::new("site", "s2")
            ]
        );
    }
}

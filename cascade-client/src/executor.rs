// Batch executor
// Runs one round per submit:
// - opens a single transport session shared by every dispatch
// - fans out one dispatch per operation, all started before any completes
// - fans back in by index so results follow queue order
// - fails the whole round if any operation fails, listing every failure

use cascade_core::{
    Batch, BatchError, OperationDescriptor, OperationError, OperationQueue, RawResponse,
    ResponseTransform, RoundFailure, SubmissionResult, TransportError,
};
use cascade_transport::{Transport, TransportSession};
use futures::future::join_all;
use futures::stream::{self, StreamExt};
use std::time::Instant;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Dispatches batches concurrently and transforms every response
#[derive(Debug)]
pub struct BatchExecutor<T, X> {
    transport: T,
    transform: X,
    max_concurrency: Option<usize>,
}

impl<T, X> BatchExecutor<T, X>
where
    T: Transport,
    X: ResponseTransform,
{
    pub fn new(transport: T, transform: X) -> Self {
        Self {
            transport,
            transform,
            max_concurrency: None,
        }
    }

    /// Cap the number of in-flight dispatches per round. Results still come
    /// back in queue order. A limit of zero is treated as one.
    pub fn with_max_concurrency(mut self, limit: usize) -> Self {
        self.max_concurrency = Some(limit.max(1));
        self
    }

    pub fn max_concurrency(&self) -> Option<usize> {
        self.max_concurrency
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transform(&self) -> &X {
        &self.transform
    }

    /// Run one round over `batch`.
    ///
    /// Returns one transformed value per operation in batch order, or a
    /// [`RoundFailure`] naming every operation that failed. An empty batch is
    /// rejected before any session is opened. The batch is not deduplicated:
    /// submitting a clone again repeats every remote call.
    pub async fn submit(&self, batch: Batch) -> Result<SubmissionResult<X::Output>, BatchError> {
        if batch.is_empty() {
            debug!("Rejecting empty batch");
            return Err(BatchError::EmptyBatch);
        }

        let span = info_span!("round", round_id = %Uuid::new_v4(), operations = batch.len());
        self.run_round(batch).instrument(span).await
    }

    /// Snapshot `queue`, mark its contents as submitted and run the round.
    ///
    /// The queue is left as is; call [`OperationQueue::flush`] before
    /// queueing the next round.
    pub async fn submit_queue(
        &self,
        queue: &mut OperationQueue,
    ) -> Result<SubmissionResult<X::Output>, BatchError> {
        let batch = queue.begin_round();
        self.submit(batch).await
    }

    async fn run_round(&self, batch: Batch) -> Result<SubmissionResult<X::Output>, BatchError> {
        if batch.is_stale() {
            warn!(
                operations = batch.len(),
                "Queue was already submitted and not flushed; earlier operations will be sent again. Did you forget to flush?"
            );
        }

        info!("Submitting batch");
        let started = Instant::now();
        let session = self.transport.open().await.map_err(BatchError::Session)?;

        let outcomes = self.fan_out(&session, &batch).await;
        drop(session);

        let total = outcomes.len();
        let mut values = Vec::with_capacity(total);
        let mut failures = Vec::new();
        for outcome in outcomes {
            match outcome {
                Ok(value) => values.push(value),
                Err(err) => failures.push(err),
            }
        }

        let elapsed_ms = started.elapsed().as_millis() as u64;
        if failures.is_empty() {
            info!(elapsed_ms, "Batch completed");
            Ok(SubmissionResult::new(values))
        } else {
            let failure = RoundFailure::new(failures, total);
            warn!(
                elapsed_ms,
                failed = failure.failures().len(),
                indices = ?failure.failed_indices(),
                "Batch failed"
            );
            Err(BatchError::Round(failure))
        }
    }

    async fn fan_out(
        &self,
        session: &T::Session,
        batch: &Batch,
    ) -> Vec<Result<X::Output, OperationError>> {
        let dispatches = batch
            .iter()
            .enumerate()
            .map(|(index, operation)| self.dispatch(session, index, operation));

        match self.max_concurrency {
            None => join_all(dispatches).await,
            Some(limit) => stream::iter(dispatches).buffered(limit).collect().await,
        }
    }

    async fn dispatch(
        &self,
        session: &T::Session,
        index: usize,
        operation: &OperationDescriptor,
    ) -> Result<X::Output, OperationError> {
        debug!(index, operation = %operation, "Dispatching operation");

        let response = match session.timeout() {
            Some(budget) => tokio::time::timeout(budget, session.request(operation))
                .await
                .unwrap_or_else(|_| Err(TransportError::Timeout(budget))),
            None => session.request(operation).await,
        }
        .map_err(|source| OperationError::Dispatch { index, source })?;

        if !response.is_success() {
            return Err(OperationError::Dispatch {
                index,
                source: TransportError::Status {
                    status: response.status,
                    body: response.body.to_string(),
                },
            });
        }

        debug!(index, status = response.status, "Operation completed");
        self.transform
            .transform(RawResponse::from_transport(index, response))
            .map_err(|source| OperationError::Transform { index, source })
    }
}

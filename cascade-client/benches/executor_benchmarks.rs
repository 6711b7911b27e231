use async_trait::async_trait;
use cascade_client::{
    BatchExecutor, IdentityTransform, OperationDescriptor, OperationQueue, Transport,
    TransportError, TransportResponse, TransportSession,
};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::json;
use std::hint::black_box;
use std::time::Duration;

/// Answers immediately so the benchmark measures pipeline overhead only
struct InstantTransport;

struct InstantSession;

#[async_trait]
impl Transport for InstantTransport {
    type Session = InstantSession;

    async fn open(&self) -> Result<InstantSession, TransportError> {
        Ok(InstantSession)
    }
}

#[async_trait]
impl TransportSession for InstantSession {
    async fn request(
        &self,
        operation: &OperationDescriptor,
    ) -> Result<TransportResponse, TransportError> {
        Ok(TransportResponse::ok(json!({ "target": operation.target() })))
    }

    fn timeout(&self) -> Option<Duration> {
        None
    }
}

fn queue_of(size: usize) -> OperationQueue {
    let mut queue = OperationQueue::new();
    for i in 0..size {
        queue.enqueue(OperationDescriptor::get(format!("/api/v1/read/page/{}", i)).unwrap());
    }
    queue
}

fn bench_round(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("round");

    for size in [1, 10, 100, 1000].iter() {
        let queue = queue_of(*size);

        group.bench_with_input(BenchmarkId::new("unbounded", size), size, |b, _| {
            let executor = BatchExecutor::new(InstantTransport, IdentityTransform);
            b.to_async(&runtime)
                .iter(|| async { black_box(executor.submit(queue.snapshot()).await) })
        });

        group.bench_with_input(BenchmarkId::new("bounded_16", size), size, |b, _| {
            let executor =
                BatchExecutor::new(InstantTransport, IdentityTransform).with_max_concurrency(16);
            b.to_async(&runtime)
                .iter(|| async { black_box(executor.submit(queue.snapshot()).await) })
        });
    }

    group.finish();
}

fn bench_enqueue(c: &mut Criterion) {
    let mut group = c.benchmark_group("enqueue");

    for size in [10, 100, 1000].iter() {
        group.bench_with_input(BenchmarkId::new("enqueue_flush", size), size, |b, &size| {
            b.iter(|| {
                let mut queue = queue_of(size);
                let batch = queue.begin_round();
                queue.flush();
                black_box(batch)
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_round, bench_enqueue);
criterion_main!(benches);

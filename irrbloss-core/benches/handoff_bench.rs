#[macro_use]
extern crate criterion;

use bytes::Bytes;
use criterion::Criterion;

use irrbloss_core::queue::HandoffQueue;

fn bench_handoff_push_pop(c: &mut Criterion) {
    let mut group = c.benchmark_group("handoff_throughput");

    for capacity in [16, 64, 1024] {
        group.throughput(criterion::Throughput::Elements(capacity as u64));
        group.bench_function(format!("capacity_{}", capacity), |b| {
            let queue = HandoffQueue::with_capacity(capacity);
            let frame = Bytes::from_static(&[0xD0u8; 64]);
            b.iter(|| {
                queue.try_send(frame.clone()).unwrap();
                queue.try_recv().unwrap();
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_handoff_push_pop);
criterion_main!(benches);

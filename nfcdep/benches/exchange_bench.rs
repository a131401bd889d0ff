use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use nfcdep::session::{InitiatorConfig, TargetConfig};
use nfcdep::test_support::Loopback;
use nfcdep::types::Nfcid3;

fn bench_loopback_exchange(c: &mut Criterion) {
    let mut group = c.benchmark_group("loopback_exchange");
    for &size in &[16usize, 250usize, 1024usize, 4096usize] {
        let payload: Vec<u8> = (0..size).map(|i| (i & 0xff) as u8).collect();
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &payload, |b, payload| {
            let mut lo = Loopback::new(
                InitiatorConfig::new(Nfcid3::from_bytes([0x01; 10])),
                TargetConfig::new(Nfcid3::from_bytes([0x02; 10])),
            );
            lo.activate().expect("activate");
            b.iter(|| {
                let answer = lo.exchange(black_box(payload)).expect("exchange");
                black_box(answer);
                lo.log.clear();
                lo.delivered.clear();
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_loopback_exchange);
criterion_main!(benches);

use std::time::Duration;

use criterion::{criterion_main, Criterion, Throughput};
use routing_table::{AttrFilter, Attributes, PrefixTrie, RadixTrie, RoutingTable};

fn sample_prefixes(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            let a = (i >> 16) as u8;
            let b = (i >> 8) as u8;
            let c = i as u8;
            format!("10.{a}.{b}.{c}/32")
        })
        .collect()
}

macro_rules! benchmarks {
    ( $id:ident: $table:ty ) => {
        mod $id {
            use super::*;

            pub fn benches(c: &mut Criterion) {
                construct(c);
                lookup_hit(c);
                lookup_miss(c);
            }

            fn construct(c: &mut Criterion) {
                let mut g = c.benchmark_group(concat!(stringify!($id), "-construct"));
                g.measurement_time(Duration::from_secs(10));
                g.sample_size(10);
                for size in [100usize, 10_000] {
                    let prefixes = sample_prefixes(size);
                    g.throughput(Throughput::Elements(size as u64));
                    g.bench_function(size.to_string(), |b| {
                        b.iter(|| {
                            let mut table = <$table>::new();
                            for p in &prefixes {
                                table.add(p.as_str(), Attributes::new()).unwrap();
                            }
                            table
                        })
                    });
                }
                g.finish();
            }

            fn lookup_hit(c: &mut Criterion) {
                let mut g = c.benchmark_group(concat!(stringify!($id), "-lookup-hit"));
                for size in [100usize, 10_000] {
                    let prefixes = sample_prefixes(size);
                    let mut table = <$table>::new();
                    for p in &prefixes {
                        table.add(p.as_str(), Attributes::new()).unwrap();
                    }
                    g.throughput(Throughput::Elements(1));
                    g.bench_function(size.to_string(), |b| {
                        b.iter(|| table.get(prefixes[size / 2].as_str(), &AttrFilter::any()))
                    });
                }
                g.finish();
            }

            fn lookup_miss(c: &mut Criterion) {
                let mut g = c.benchmark_group(concat!(stringify!($id), "-lookup-miss"));
                for size in [100usize, 10_000] {
                    let prefixes = sample_prefixes(size);
                    let mut table = <$table>::new();
                    for p in &prefixes {
                        table.add(p.as_str(), Attributes::new()).unwrap();
                    }
                    g.throughput(Throughput::Elements(1));
                    g.bench_function(size.to_string(), |b| {
                        b.iter(|| table.get("203.0.113.1/32", &AttrFilter::any()))
                    });
                }
                g.finish();
            }
        }
    };
}

benchmarks!(prefix_trie: PrefixTrie);
benchmarks!(radix_trie: RadixTrie);

fn benches() {
    let mut c = Criterion::default().configure_from_args();
    prefix_trie::benches(&mut c);
    radix_trie::benches(&mut c);
}

criterion_main!(benches);

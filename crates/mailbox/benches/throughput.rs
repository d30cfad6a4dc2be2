use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mailbox_rs::{spawn, Buffer};
use std::thread;

const MSG_COUNT: u64 = 500_000;

fn bench_spsc_unbounded(c: &mut Criterion) {
    let mut group = c.benchmark_group("spsc");
    group.throughput(Throughput::Elements(MSG_COUNT));

    group.bench_function("unbounded", |b| {
        b.iter(|| {
            let (output, input, _seal) = spawn(Buffer::<u64>::unbounded());

            let producer = thread::spawn(move || {
                for i in 0..MSG_COUNT {
                    output.send(i);
                }
            });

            let mut count = 0u64;
            while input.recv().is_some() {
                count += 1;
                if count == MSG_COUNT {
                    break;
                }
            }

            producer.join().unwrap();
            black_box(count)
        });
    });

    group.finish();
}

fn bench_spsc_bounded(c: &mut Criterion) {
    let mut group = c.benchmark_group("spsc");
    group.throughput(Throughput::Elements(MSG_COUNT));

    for capacity in [1usize, 64, 4096].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("bounded_{capacity}")),
            capacity,
            |b, &capacity| {
                b.iter(|| {
                    let (output, input, _seal) = spawn(Buffer::<u64>::bounded(capacity));

                    let producer = thread::spawn(move || {
                        for i in 0..MSG_COUNT {
                            output.send(i);
                        }
                    });

                    let mut count = 0u64;
                    while input.recv().is_some() {
                        count += 1;
                        if count == MSG_COUNT {
                            break;
                        }
                    }

                    producer.join().unwrap();
                    black_box(count)
                });
            },
        );
    }

    group.finish();
}

fn bench_mpmc(c: &mut Criterion) {
    let mut group = c.benchmark_group("mpmc");

    for num_producers in [2usize, 4, 8].iter() {
        let total = MSG_COUNT * (*num_producers as u64);
        group.throughput(Throughput::Elements(total));

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{num_producers}P_1C")),
            num_producers,
            |b, &n| {
                b.iter(|| {
                    let (output, input, _seal) = spawn(Buffer::<u64>::bounded(4096));

                    let per_producer = MSG_COUNT;
                    let mut handles = Vec::with_capacity(n);
                    for _ in 0..n {
                        let out = output.clone();
                        handles.push(thread::spawn(move || {
                            for i in 0..per_producer {
                                out.send(i);
                            }
                        }));
                    }
                    drop(output);

                    let mut count = 0u64;
                    while input.recv().is_some() {
                        count += 1;
                    }

                    for h in handles {
                        h.join().unwrap();
                    }
                    black_box(count)
                });
            },
        );
    }

    group.finish();
}

fn bench_newest_drop_oldest(c: &mut Criterion) {
    let mut group = c.benchmark_group("newest");
    group.throughput(Throughput::Elements(MSG_COUNT));

    group.bench_function("newest_64_never_blocks", |b| {
        b.iter(|| {
            let (output, input, _seal) = spawn(Buffer::<u64>::newest(64));
            for i in 0..MSG_COUNT {
                output.send(black_box(i));
            }
            drop(output);
            let mut count = 0u64;
            while input.recv().is_some() {
                count += 1;
            }
            black_box(count)
        });
    });

    group.finish();
}

fn bench_broadcast_fan_out(c: &mut Criterion) {
    let mut group = c.benchmark_group("broadcast");

    for fan_out in [2usize, 4, 8].iter() {
        group.throughput(Throughput::Elements(MSG_COUNT));

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("fan_out_{fan_out}")),
            fan_out,
            |b, &fan_out| {
                b.iter(|| {
                    let mut combined = None;
                    let mut inputs = Vec::with_capacity(fan_out);
                    for _ in 0..fan_out {
                        let (output, input, _seal) = spawn(Buffer::<u64>::unbounded());
                        combined = Some(match combined.take() {
                            Some(acc) => acc + output,
                            None => output,
                        });
                        inputs.push(input);
                    }
                    let output = combined.unwrap();

                    let producer = thread::spawn(move || {
                        for i in 0..MSG_COUNT {
                            output.send(i);
                        }
                    });

                    for input in inputs {
                        let mut count = 0u64;
                        while input.recv().is_some() {
                            count += 1;
                            if count == MSG_COUNT {
                                break;
                            }
                        }
                    }

                    producer.join().unwrap();
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_spsc_unbounded,
    bench_spsc_bounded,
    bench_mpmc,
    bench_newest_drop_oldest,
    bench_broadcast_fan_out
);
criterion_main!(benches);

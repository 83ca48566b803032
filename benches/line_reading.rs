use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tempfile::{Builder, NamedTempFile};
use wkr::io::byte_lines;
use wkr::{count_lines, lines, write_atomic, Encoding};

fn log_lines(size_kb: usize) -> Vec<u8> {
    let target_size = size_kb * 1024;
    let mut content = Vec::with_capacity(target_size);
    let mut line_num = 0;

    while content.len() < target_size {
        let line = format!(
            "[2024-09-02T10:{}:{}] INFO: Request {} user_{}\n",
            (line_num / 3600) % 24,
            (line_num / 60) % 60,
            line_num,
            line_num % 1000
        );
        content.extend_from_slice(line.as_bytes());
        line_num += 1;
    }
    content
}

fn create_test_file(size_kb: usize, suffix: &str) -> NamedTempFile {
    let temp_file = Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("Failed to create temp file");
    write_atomic([log_lines(size_kb)], temp_file.path(), false).expect("Failed to write test file");
    temp_file
}

fn bench_count_lines(c: &mut Criterion) {
    let mut group = c.benchmark_group("count_lines");
    group.sample_size(10);

    for suffix in [".log", ".log.gz", ".log.xz"] {
        for &size_kb in &[50, 5000] {
            let file = create_test_file(size_kb, suffix);
            let label = format!("{}KB{}", size_kb, suffix);
            group.bench_with_input(BenchmarkId::new("count", &label), &file, |b, file| {
                b.iter(|| black_box(count_lines(file.path()).unwrap()))
            });
        }
    }

    group.finish();
}

fn bench_line_iteration(c: &mut Criterion) {
    let mut group = c.benchmark_group("line_iteration");
    group.sample_size(10);

    let plain = create_test_file(5000, ".log");
    let gzip = create_test_file(5000, ".log.gz");

    for (label, file) in [("plain", &plain), ("gzip", &gzip)] {
        group.bench_function(BenchmarkId::new("decoded", label), |b| {
            b.iter(|| {
                let total: usize = lines(file.path(), Encoding::Utf8)
                    .unwrap()
                    .map(|line| line.unwrap().len())
                    .sum();
                black_box(total)
            })
        });
        group.bench_function(BenchmarkId::new("raw", label), |b| {
            b.iter(|| {
                let total: usize = byte_lines(file.path())
                    .unwrap()
                    .map(|line| line.unwrap().len())
                    .sum();
                black_box(total)
            })
        });
    }

    group.finish();
}

fn bench_atomic_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("atomic_write");
    group.sample_size(10);
    let content = log_lines(500);
    let dir = tempfile::TempDir::new().unwrap();

    for name in ["out.log", "out.log.gz"] {
        let path = dir.path().join(name);
        group.bench_function(name, |b| {
            b.iter(|| write_atomic([&content], &path, false).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_count_lines, bench_line_iteration, bench_atomic_write);
criterion_main!(benches);

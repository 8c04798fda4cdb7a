//! String field codec micro-benchmark.
//!
//! Measures throughput of the fixed-field string codec:
//! - clean_copy on text that fits the field
//! - clean_copy on text that must be truncated and sanitized
//! - decode_field on a full status field
//!
//! Every status/label/error write goes through clean_copy under the region
//! lock, so this path bounds how often a plugin can publish.

use criterion::{Criterion, criterion_group, criterion_main};

use burnin_common::shm::consts::{MAX_DISPLAY_TEXT, MAX_ERROR_TEXT};
use burnin_common::shm::strings::{clean_copy, decode_field};

fn bench_clean_copy_short(c: &mut Criterion) {
    let inputs = ["Writing", "Reading", "Verifying", "Waiting"];
    let mut buf = [0u8; MAX_DISPLAY_TEXT];
    let mut cycle = 0usize;

    c.bench_function("clean_copy_short", |b| {
        b.iter(|| {
            cycle += 1;
            clean_copy(&mut buf, inputs[cycle % inputs.len()])
        });
    });
}

fn bench_clean_copy_truncating(c: &mut Criterion) {
    // Longer than MAX_ERROR_TEXT and peppered with bytes the sanitizer
    // has to replace.
    let input = "device \\dev\\sdb: short read at sector 8\t(wanted 4096 bytes, got 512) \
                 retry budget 100% exhausted after 3 attempts during verify pass"
        .to_string();
    let mut buf = [0u8; MAX_ERROR_TEXT];
    let mut cycle = 0usize;

    c.bench_function("clean_copy_truncating", |b| {
        b.iter(|| {
            cycle += 1;
            // Rotate the start so the copied window differs per iteration.
            clean_copy(&mut buf, &input[cycle % 8..])
        });
    });
}

fn bench_decode_field(c: &mut Criterion) {
    let mut buf = [0u8; MAX_ERROR_TEXT];
    clean_copy(&mut buf, "verify mismatch at block 1924: expected 0xA5 got 0x5A");

    c.bench_function("decode_field", |b| {
        b.iter(|| decode_field(&buf));
    });
}

criterion_group!(
    benches,
    bench_clean_copy_short,
    bench_clean_copy_truncating,
    bench_decode_field,
);
criterion_main!(benches);

//! Lexer benchmarks.
//!
//! Run with: `cargo bench --package tacc-lex`

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use tacc_lex::Lexer;

fn token_count(source: &str) -> usize {
    Lexer::tokenize(source).unwrap().len()
}

fn bench_lexer_assignments(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer_assignments");

    let source = "x = 1\ny = x + 2\nprint(y)\n";
    group.throughput(Throughput::Bytes(source.len() as u64));

    group.bench_function("simple_assign", |b| {
        b.iter(|| token_count(black_box("x = 1\n")))
    });

    group.bench_function("assign_then_print", |b| {
        b.iter(|| token_count(black_box(source)))
    });

    group.finish();
}

fn bench_lexer_nested_blocks(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer_nested_blocks");

    let source = r#"
def fibonacci(n):
    if n <= 1:
        return n
    else:
        return fibonacci(n - 1) + fibonacci(n - 2)

for i in range(10):
    print(fibonacci(i))
"#;

    group.throughput(Throughput::Bytes(source.len() as u64));

    group.bench_function("nested_indentation", |b| {
        b.iter(|| token_count(black_box(source)))
    });

    group.finish();
}

fn bench_lexer_strings(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer_strings");

    group.bench_function("short_string", |b| {
        b.iter(|| token_count(black_box("s = \"hola\"\n")))
    });

    group.bench_function("long_string", |b| {
        let source = "s = \"This is a longer string used to benchmark lexing of string literals.\"\n";
        b.iter(|| token_count(black_box(source)))
    });

    group.finish();
}

fn bench_lexer_numbers(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer_numbers");

    group.bench_function("integer", |b| b.iter(|| token_count(black_box("x = 123456\n"))));

    group.bench_function("float", |b| b.iter(|| token_count(black_box("x = 3.14159\n"))));

    group.finish();
}

fn bench_lexer_identifiers(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer_identifiers");

    group.bench_function("short_ident", |b| b.iter(|| token_count(black_box("x = 1\n"))));

    group.bench_function("long_ident", |b| {
        b.iter(|| token_count(black_box("very_long_variable_name = 1\n")))
    });

    group.bench_function("many_idents", |b| {
        b.iter(|| token_count(black_box("a = 1\nb = 2\nc = 3\nd = 4\ne = 5\n")))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_lexer_assignments,
    bench_lexer_nested_blocks,
    bench_lexer_strings,
    bench_lexer_numbers,
    bench_lexer_identifiers
);
criterion_main!(benches);

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use session_stream::{process_line, RenderOptions};

fn nested_lines() -> Vec<String> {
    vec![
        r#"{"timestamp":1739443800000,"message":{"role":"user","content":"Refactor the parser"}}"#.to_string(),
        r#"{"timestamp":1739443801000,"message":{"role":"assistant","content":[{"type":"text","text":"Reading the module first."},{"type":"toolCall","name":"read","arguments":{"path":"src/parser.rs"}}],"usage":{"input":3,"output":196,"cacheRead":9155,"cacheWrite":75824,"totalTokens":85178,"cost":{"total":0.4834}}}}"#.to_string(),
        format!(
            r#"{{"message":{{"role":"tool","content":[{{"type":"toolResult","text":"{}"}}]}}}}"#,
            "fn parse() {} ".repeat(200)
        ),
    ]
}

fn flat_lines() -> Vec<String> {
    vec![
        r#"{"role":"thinking","content":"Need to check the tests","ts":"2026-02-13T10:30:00Z"}"#.to_string(),
        r#"{"role":"tool_call","tool_name":"shell","tool_input":{"command":"cargo test"},"ts":"2026-02-13T10:30:01Z"}"#.to_string(),
        r#"{"role":"tool_result","content":"test result: ok. 42 passed","ts":"2026-02-13T10:30:05Z"}"#.to_string(),
        r#"{"role":"assistant","content":"All green.","in_tokens":5120,"out_tokens":88,"cost_usd":0.021,"ts":"2026-02-13T10:30:06Z"}"#.to_string(),
    ]
}

fn bench_process_line(c: &mut Criterion) {
    let options = RenderOptions {
        verbose: false,
        color: true,
    };

    let nested = nested_lines();
    c.bench_function("process_line_nested", |b| {
        b.iter(|| {
            for line in &nested {
                black_box(process_line(black_box(line), &options));
            }
        })
    });

    let flat = flat_lines();
    c.bench_function("process_line_flat", |b| {
        b.iter(|| {
            for line in &flat {
                black_box(process_line(black_box(line), &options));
            }
        })
    });

    let large = format!(
        r#"{{"message":{{"role":"assistant","content":"{}","usage":{{"output":10,"totalTokens":50000}}}}}}"#,
        "x".repeat(100 * 1024)
    );
    c.bench_function("process_line_100kb", |b| {
        b.iter(|| black_box(process_line(black_box(&large), &options)))
    });
}

criterion_group!(benches, bench_process_line);
criterion_main!(benches);

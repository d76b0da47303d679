use criterion::{black_box, criterion_group, criterion_main, Criterion};

use quizmark_core::judge::parse_verdict;
use quizmark_core::parser::{extract_quiz_block, parse_quiz};

fn make_quiz_yaml(questions: usize) -> String {
    let mut yaml = String::from("title: Bench quiz\nquestions:\n");
    for i in 0..questions {
        yaml.push_str(&format!(
            "  - type: mcq\n    q: Question {i}?\n    options: [a, b, c, d]\n    answer: [a, b]\n    multiple: true\n"
        ));
    }
    yaml
}

fn bench_parse_quiz(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_quiz");

    for count in [5usize, 50] {
        let yaml = make_quiz_yaml(count);
        group.bench_function(format!("{count}_questions"), |b| {
            b.iter(|| parse_quiz(black_box(&yaml)).unwrap())
        });
    }

    group.finish();
}

fn bench_extract_quiz_block(c: &mut Criterion) {
    let filler: String = "Some markdown prose that is not part of any quiz.\n".repeat(200);
    let markdown = format!("{filler}\n```quiz\n{}\n```\n{filler}", make_quiz_yaml(10));

    c.bench_function("extract_quiz_block", |b| {
        b.iter(|| extract_quiz_block(black_box(&markdown)))
    });
}

fn bench_parse_verdict(c: &mut Criterion) {
    let bare = r#"{"score": 85, "explanation": "Good answer.", "expectedAnswer": "The answer."}"#;
    let fenced = format!("```json\n{bare}\n```");

    let mut group = c.benchmark_group("parse_verdict");
    group.bench_function("bare", |b| b.iter(|| parse_verdict(black_box(bare)).unwrap()));
    group.bench_function("fenced", |b| {
        b.iter(|| parse_verdict(black_box(&fenced)).unwrap())
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_parse_quiz,
    bench_extract_quiz_block,
    bench_parse_verdict
);
criterion_main!(benches);

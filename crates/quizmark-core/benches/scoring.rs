use criterion::{black_box, criterion_group, criterion_main, Criterion};

use quizmark_core::model::{
    status_for_score, Question, Quiz, QuizScoring, Status, TrueFalseQuestion, UserAnswer,
};
use quizmark_core::results::{calculate_quiz_result, QuestionResult};

fn make_results(count: usize) -> (Quiz, Vec<QuestionResult>) {
    let quiz = Quiz {
        title: "bench".into(),
        description: None,
        scoring: QuizScoring {
            min_score_to_pass: 80,
            min_score_to_fail: 60,
        },
        questions: vec![],
    };
    let results = (0..count)
        .map(|i| QuestionResult {
            question: Question::TrueFalse(TrueFalseQuestion {
                prompt: format!("q{i}"),
                answer: true,
                weight: 1.0 + (i % 3) as f64,
            }),
            user_answer: UserAnswer::Bool(true),
            score: ((i * 13) % 101) as u8,
            status: Status::Passed,
            explanation: None,
            expected_answer: None,
        })
        .collect();
    (quiz, results)
}

fn bench_status_for_score(c: &mut Criterion) {
    let scoring = QuizScoring {
        min_score_to_pass: 80,
        min_score_to_fail: 60,
    };

    c.bench_function("status_for_score", |b| {
        b.iter(|| status_for_score(black_box(72.5), black_box(&scoring)))
    });
}

fn bench_calculate_quiz_result(c: &mut Criterion) {
    let mut group = c.benchmark_group("calculate_quiz_result");

    for count in [10usize, 100, 1000] {
        let (quiz, results) = make_results(count);
        group.bench_function(format!("{count}_questions"), |b| {
            b.iter(|| calculate_quiz_result(black_box(&quiz), black_box(results.clone())))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_status_for_score, bench_calculate_quiz_result);
criterion_main!(benches);

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use newsgroups_classifier::classifier::{default_param_grid, default_pipeline};
use newsgroups_classifier::feature_engineering::{CountVectorizer, TfidfTransformer};
use newsgroups_classifier::pipeline::Label;
use newsgroups_classifier::search::{GridSearch, ParamGrid, SearchConfig};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

const VOCAB_A: &[&str] = &["god", "faith", "church", "belief", "prayer", "scripture", "atheist", "moral"];
const VOCAB_B: &[&str] = &["rocket", "orbit", "launch", "engine", "satellite", "thrust", "nasa", "shuttle"];
const SHARED: &[&str] = &["the", "question", "people", "think", "article", "writes", "time", "read"];

fn create_corpus(n_docs: usize) -> (Vec<String>, Vec<Label>) {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut docs = Vec::with_capacity(n_docs);
    let mut labels = Vec::with_capacity(n_docs);

    for i in 0..n_docs {
        let label = (i % 2) as Label;
        let topical = if label == 0 { VOCAB_A } else { VOCAB_B };
        let words: Vec<&str> = (0..40)
            .map(|_| {
                if rng.gen_bool(0.4) {
                    *topical.choose(&mut rng).unwrap_or(&"word")
                } else {
                    *SHARED.choose(&mut rng).unwrap_or(&"word")
                }
            })
            .collect();
        docs.push(words.join(" "));
        labels.push(label);
    }
    (docs, labels)
}

fn bench_grid_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid_search");
    group.sample_size(10); // Fewer samples for training benchmarks

    for n_docs in [100, 500, 1000].iter() {
        let (docs, labels) = create_corpus(*n_docs);

        group.bench_with_input(BenchmarkId::new("fit_default", n_docs), &(docs, labels), |b, (docs, labels)| {
            b.iter(|| {
                let pipeline = default_pipeline().unwrap();
                let config = SearchConfig::default().with_verbose(0);
                let mut search = GridSearch::new(pipeline, default_param_grid(), config).unwrap();
                search.fit(black_box(docs), black_box(labels)).unwrap().best_score
            })
        });
    }

    group.finish();
}

fn bench_vectorize(c: &mut Criterion) {
    let mut group = c.benchmark_group("vectorize");
    let (docs, _) = create_corpus(2000);

    group.bench_function("count_tfidf", |b| {
        b.iter(|| {
            let mut vect = CountVectorizer::new();
            let counts = vect.fit_transform(black_box(&docs)).unwrap();
            let mut tfidf = TfidfTransformer::new();
            tfidf.fit(&counts).unwrap();
            tfidf.transform(&counts).unwrap()
        })
    });

    group.bench_function("grid_candidates", |b| {
        let grid = ParamGrid::new()
            .add("vect__max_df", vec![0.5, 0.75, 1.0])
            .add("clf__alpha", vec![1e-5, 1e-4, 1e-3])
            .add("clf__max_iter", vec![5, 10, 20]);
        b.iter(|| black_box(&grid).candidates().len())
    });

    group.finish();
}

criterion_group!(benches, bench_grid_search, bench_vectorize);
criterion_main!(benches);

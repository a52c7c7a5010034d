//! Integration test: newsgroups classifier lifecycle

use newsgroups_classifier::classifier::NewsGroupsClassifier;
use newsgroups_classifier::search::{ParamGrid, ParamValue, SearchConfig};
use newsgroups_classifier::ClassifierError;

fn docs(texts: &[&str]) -> Vec<String> {
    texts.iter().map(|t| t.to_string()).collect()
}

fn religion_space_corpus() -> (Vec<String>, Vec<i64>) {
    let texts = [
        "god faith church belief prayer",
        "faith prayer church god scripture",
        "religion belief god scripture moral",
        "church prayer scripture faith atheist",
        "atheist moral belief religion god",
        "rocket orbit launch engine nasa",
        "orbit satellite launch rocket shuttle",
        "engine thrust orbit rocket nasa",
        "satellite thrust launch engine shuttle",
        "nasa shuttle orbit satellite rocket",
    ];
    (docs(&texts), vec![0, 0, 0, 0, 0, 1, 1, 1, 1, 1])
}

#[test]
fn test_end_to_end_defaults_two_documents() {
    let mut clf = NewsGroupsClassifier::new(None, None).unwrap();
    let examples = docs(&["god is great and faith matters", "rockets fly high into orbit"]);

    clf.fit(&examples, &[0, 1]).unwrap();

    let params = clf.best_params().unwrap();
    assert_eq!(params["clf__max_iter"], ParamValue::Int(5));
    let score = clf.best_score().unwrap();
    assert!((0.0..=1.0).contains(&score), "score out of range: {}", score);
}

#[test]
fn test_accessors_before_fit() {
    let clf = NewsGroupsClassifier::default_config().unwrap();

    assert!(matches!(clf.best_estimator(), Err(ClassifierError::NotAvailable("best_estimator"))));
    assert!(matches!(clf.best_params(), Err(ClassifierError::NotAvailable("best_params"))));
    assert!(matches!(clf.best_score(), Err(ClassifierError::NotAvailable("best_score"))));
    assert!(clf.summary().unwrap_err().is_not_available());
}

#[test]
fn test_best_params_keys_match_grid() {
    let (examples, labels) = religion_space_corpus();
    let mut clf = NewsGroupsClassifier::new(None, None).unwrap();
    clf.fit(&examples, &labels).unwrap();

    let keys: Vec<String> = clf.best_params().unwrap().keys().cloned().collect();
    assert_eq!(keys, clf.search().grid().names());

    let grid = clf.search().grid();
    for (name, value) in clf.best_params().unwrap() {
        assert!(grid.get(name).unwrap().contains(value));
    }
}

#[test]
fn test_candidate_and_fold_counts() {
    let (examples, labels) = religion_space_corpus();
    let grid = ParamGrid::new()
        .add("vect__max_df", vec![0.75, 1.0])
        .add("tfidf__use_idf", vec![true, false])
        .add("clf__max_iter", vec![5, 10]);
    let config = SearchConfig::default().with_cv_folds(5);
    let mut clf = NewsGroupsClassifier::builder().grid(grid).config(config).build().unwrap();

    let result = clf.fit(&examples, &labels).unwrap();
    assert_eq!(result.cv_results.len(), 8);
    assert_eq!(result.n_splits, 5);
    assert!(result.cv_results.iter().all(|c| c.fold_scores.len() == 5));
    assert_eq!(result.cv_results[result.best_index].rank, 1);
}

#[test]
fn test_second_fit_overwrites() {
    let mut clf = NewsGroupsClassifier::new(None, None).unwrap();

    let first = docs(&["god is great and faith matters", "rockets fly high into orbit"]);
    assert_eq!(clf.fit(&first, &[0, 1]).unwrap().n_splits, 2);

    let (examples, labels) = religion_space_corpus();
    let result = clf.fit(&examples, &labels).unwrap();
    assert_eq!(result.n_splits, 5);

    let predicted = clf.best_estimator().unwrap().predict(&examples).unwrap();
    assert_eq!(predicted.len(), examples.len());

    let mut fresh = NewsGroupsClassifier::new(None, None).unwrap();
    let expected = fresh.fit(&examples, &labels).unwrap();
    assert_eq!(clf.best_score().unwrap(), expected.best_score);
    assert_eq!(clf.best_params().unwrap(), &expected.best_params);

    let result = clf.search().result().unwrap();
    assert_eq!(result.cv_results.len(), expected.cv_results.len());
    for (got, want) in result.cv_results.iter().zip(&expected.cv_results) {
        assert_eq!(got.fold_scores.len(), 5);
        assert_eq!(got.fold_scores, want.fold_scores);
    }
}

#[test]
fn test_failed_fit_keeps_previous_result() {
    let (examples, labels) = religion_space_corpus();
    let mut clf = NewsGroupsClassifier::new(None, None).unwrap();
    clf.fit(&examples, &labels).unwrap();
    let score = clf.best_score().unwrap();

    let err = clf.fit(&examples, &labels[..3]).unwrap_err();
    assert!(matches!(err, ClassifierError::ShapeError { .. }));
    assert_eq!(clf.best_score().unwrap(), score);
}

#[test]
fn test_summary_contents() {
    let (examples, labels) = religion_space_corpus();
    let mut clf = NewsGroupsClassifier::new(None, None).unwrap();
    clf.fit(&examples, &labels).unwrap();

    let report = clf.summary().unwrap();
    assert_eq!(report.step_names, vec!["vect", "tfidf", "clf"]);
    assert_eq!(&report.best_params, clf.best_params().unwrap());
    assert_eq!(report.best_score, clf.best_score().unwrap());

    let text = report.to_string();
    assert!(text.contains("CLASSIFICATION SUMMARY REPORT:"));
    assert!(text.contains("['vect', 'tfidf', 'clf']"));
    assert!(text.contains("\tvect__max_df : (0.5, 0.75, 1.0)"));
    assert!(text.contains("\tclf__max_iter : (5,)"));
    assert!(text.contains(&format!("Best score:\n\t{}", report.best_score)));
}

#[test]
fn test_invalid_grid_rejected_at_construction() {
    let grid = ParamGrid::new().add("clf__max_iter", vec![0]);
    let err = NewsGroupsClassifier::new(None, Some(grid)).unwrap_err();
    assert!(matches!(err, ClassifierError::InvalidParameter { ref name, .. } if name == "clf__max_iter"));

    let grid = ParamGrid::new().add("nosep", vec![1]);
    assert!(NewsGroupsClassifier::new(None, Some(grid)).unwrap_err().is_configuration());
}

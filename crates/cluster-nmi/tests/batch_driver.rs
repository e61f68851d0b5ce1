//! End-to-end batch runs over a model directory on disk.

use std::fs;
use std::io::Write;
use std::path::Path;

use cluster_nmi::config::{EntropyFormula, EvalSettings, Normalization};
use cluster_nmi::reports::{write_csv, JsonReport};
use cluster_nmi::sources::{
    DirectoryModelRepository, ItemSource, JsonlItemSource, JsonlVectorSource, VectorSource,
};
use cluster_nmi::BatchDriver;
use tempfile::TempDir;

/// Four items on a line: two near 0 tagged `physics`, two near 10 tagged `history`.
fn write_dataset(dir: &Path, categories: &[&str]) {
    let mut items = fs::File::create(dir.join("items.jsonl")).unwrap();
    let mut vectors = fs::File::create(dir.join("vectors.jsonl")).unwrap();

    for (i, (x, category)) in [0.0, 1.0, 10.0, 11.0].iter().zip(categories).enumerate() {
        writeln!(items, r#"{{"id": {}, "categories": [{}]}}"#, i, category).unwrap();
        writeln!(vectors, r#"{{"id": {}, "vector": [{:.1}]}}"#, i, x).unwrap();
    }
}

fn write_model(dir: &Path, name: &str, body: &str) {
    fs::write(dir.join(name), body).unwrap();
}

fn setup(categories: &[&str]) -> TempDir {
    let root = TempDir::new().unwrap();
    fs::create_dir(root.path().join("output")).unwrap();
    write_dataset(root.path(), categories);
    root
}

fn run(root: &Path, technique: &str, settings: EvalSettings) -> cluster_nmi::BatchReport {
    let items = JsonlItemSource::new(root.join("items.jsonl"))
        .load_items()
        .unwrap();
    let vectors = JsonlVectorSource::new(root.join("vectors.jsonl"))
        .load_vectors()
        .unwrap();
    let repo = DirectoryModelRepository::open(root.join("output"), ".cm").unwrap();
    BatchDriver::new(repo, settings)
        .run(technique, &items, &vectors)
        .unwrap()
}

fn csv(report: &cluster_nmi::BatchReport) -> String {
    let mut buf = Vec::new();
    write_csv(report, &mut buf).unwrap();
    String::from_utf8(buf).unwrap()
}

#[test]
fn test_batch_over_model_directory() {
    let root = setup(&[r#""physics""#, r#""physics""#, r#""history""#, r#""history""#]);
    let models = root.path().join("output");
    write_model(&models, "kmeans_1.cm", r#"{"centroids": [[0.0], [10.0]]}"#);
    write_model(&models, "kmeans_10.cm", r#"{"centroids": [[5.0]]}"#);
    write_model(&models, "kmeans_2.cm", r#"{"centroids": [[10.0], [0.0]]}"#);
    write_model(&models, "kmeans_3.cm", "{ not a model");
    write_model(&models, "gmm_1.cm", r#"{"centroids": [[0.0], [10.0]]}"#);
    write_model(&models, "kmeans_1.cm.crc", "checksum");

    let report = run(root.path(), "kmeans", EvalSettings::default());

    assert_eq!(
        csv(&report),
        "kmeans_1.cm,0.6931471805599453\nkmeans_10.cm,0.0\nkmeans_2.cm,0.6931471805599453\n"
    );

    let failed: Vec<&str> = report.failed().map(|(m, _)| m).collect();
    assert_eq!(failed, vec!["kmeans_3.cm"]);
    assert_eq!(report.best().map(|(m, _)| m), Some("kmeans_1.cm"));
}

#[test]
fn test_shannon_perfect_agreement_is_one() {
    let root = setup(&[r#""physics""#, r#""physics""#, r#""history""#, r#""history""#]);
    write_model(&root.path().join("output"), "kmeans_1.cm", r#"{"centroids": [[0.0], [10.0]]}"#);

    let settings = EvalSettings {
        entropy: EntropyFormula::Shannon,
        ..EvalSettings::default()
    };
    let report = run(root.path(), "kmeans", settings);

    let (_, eval) = report.scored().next().unwrap();
    assert!((eval.score.value() - 1.0).abs() < 1e-12);
}

#[test]
fn test_degenerate_single_cluster_single_category() {
    let root = setup(&[r#""physics""#, r#""physics""#, r#""physics""#, r#""physics""#]);
    write_model(&root.path().join("output"), "kmeans_1.cm", r#"{"centroids": [[5.0]]}"#);

    let report = run(root.path(), "kmeans", EvalSettings::default());

    assert_eq!(csv(&report), "kmeans_1.cm,NaN\n");
    let json = JsonReport::from_batch(&report);
    assert_eq!(json.summary.models_degenerate, 1);
    assert!(json.summary.best_model.is_none());
}

#[test]
fn test_multi_label_observation_totals() {
    let root = setup(&[
        r#""physics", "optics""#,
        r#""physics""#,
        "",
        r#""history", "art", "physics""#,
    ]);
    write_model(&root.path().join("output"), "kmeans_1.cm", r#"{"centroids": [[0.0], [10.0]]}"#);

    for normalization in [Normalization::ItemCount, Normalization::ObservationCount] {
        let settings = EvalSettings {
            normalization,
            ..EvalSettings::default()
        };
        let report = run(root.path(), "kmeans", settings);
        let (_, eval) = report.scored().next().unwrap();

        assert_eq!(eval.item_count, 4);
        assert_eq!(eval.observation_count, 6);
        assert_eq!(eval.cluster_count, 2);
        assert_eq!(eval.category_count, 4);
        assert!(eval.score.finite().is_some());
    }
}

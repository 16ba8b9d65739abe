mod support;

use lexrag_core::{CorpusEntry, EntryCatalog, Error, Metric, RetrievalParams};
use lexrag_retrieve::RetrievalEngine;
use lexrag_vector::flat::distance;
use lexrag_vector::FlatIndex;
use support::{basis, engine, MapEmbedder};

fn params(top_k: usize, similarity_threshold: f32, max_results: usize) -> RetrievalParams {
    RetrievalParams {
        top_k,
        similarity_threshold,
        max_results,
    }
}

#[test]
fn catalog_row_matches_index_position() {
    let rows = [
        ("刑法.txt", "第一条", basis(3, 0)),
        ("民法典.txt", "第二条", basis(3, 1)),
        ("宪法.txt", "第三条", basis(3, 2)),
    ];
    let engine = engine(3, &rows, &[("问题", basis(3, 1))]);
    let out = engine.retrieve("问题", &params(1, 0.9, 3)).expect("retrieve");
    assert_eq!(out.results.len(), 1);
    assert_eq!(out.results[0].source_id, "民法典.txt");
    assert_eq!(out.results[0].text, "第二条");
    assert_eq!(out.results[0].distance, 0.0);
}

#[test]
fn misaligned_catalog_and_index_are_rejected() {
    let catalog = EntryCatalog::new(vec![
        CorpusEntry::new("a", "x"),
        CorpusEntry::new("b", "y"),
        CorpusEntry::new("c", "z"),
    ]);
    let index =
        FlatIndex::from_vectors(2, Metric::L2, vec![basis(2, 0), basis(2, 1)]).expect("index");
    let err = RetrievalEngine::new(Box::new(MapEmbedder::new(2)), Box::new(index), catalog)
        .err()
        .expect("must fail");
    assert_eq!(
        err,
        Error::CatalogIndexMisalignment {
            catalog: 3,
            index: 2
        }
    );
}

#[test]
fn result_count_never_exceeds_cap() {
    let texts = ["甲", "乙", "丙", "丁", "戊", "己"];
    let rows: Vec<(&str, &str, Vec<f32>)> = texts
        .iter()
        .enumerate()
        .map(|(i, t)| ("src", *t, basis(6, i)))
        .collect();
    let engine = engine(6, &rows, &[("问题", vec![0.6, 0.5, 0.4, 0.3, 0.2, 0.1])]);
    for cap in 0..=8 {
        let out = engine.retrieve("问题", &params(6, 0.9, cap)).expect("retrieve");
        assert!(out.results.len() <= cap);
        assert_eq!(out.results.len(), cap.min(6));
    }
}

#[test]
fn raising_threshold_never_shrinks_results() {
    // Ten same-length entries at 0°, 10°, ... 90° on the unit circle.
    let texts = [
        "条文零", "条文一", "条文二", "条文三", "条文四", "条文五", "条文六", "条文七", "条文八",
        "条文九",
    ];
    let rows: Vec<(&str, &str, Vec<f32>)> = texts
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let angle = (i as f32 * 10.0).to_radians();
            ("src", *t, vec![angle.cos(), angle.sin()])
        })
        .collect();
    let engine = engine(2, &rows, &[("问题", vec![1.0, 0.0])]);

    let mut previous = 0usize;
    for step in 0..=20 {
        let threshold = step as f32 / 20.0;
        let out = engine
            .retrieve("问题", &params(10, threshold, 10))
            .expect("retrieve");
        assert!(
            out.results.len() >= previous,
            "threshold {threshold}: {} < {previous}",
            out.results.len()
        );
        previous = out.results.len();
    }
    assert_eq!(previous, 10);
}

#[test]
fn later_longer_duplicate_takes_the_slot() {
    let a = vec![1.0, 0.0];
    let b = vec![0.96, 0.28];
    let query = vec![1.0, 0.1];
    let rows = [
        ("a.txt", "短条文", a.clone()),
        ("b.txt", "更长更详细的条文", b.clone()),
    ];
    let engine = engine(2, &rows, &[("问题", query.clone())]);
    let out = engine.retrieve("问题", &params(2, 0.9, 3)).expect("retrieve");
    assert_eq!(out.results.len(), 1);
    assert_eq!(out.results[0].source_id, "b.txt");
    assert_eq!(out.results[0].text, "更长更详细的条文");
    assert_eq!(out.results[0].distance, distance(Metric::L2, &query, &b));
    assert_ne!(out.results[0].distance, distance(Metric::L2, &query, &a));
}

#[test]
fn distinct_hits_keep_index_order() {
    let rows = [
        ("s0", "零", basis(4, 0)),
        ("s1", "一", basis(4, 1)),
        ("s2", "二", basis(4, 2)),
        ("s3", "三", basis(4, 3)),
    ];
    let engine = engine(4, &rows, &[("问题", vec![0.9, 0.8, 0.7, 0.6])]);
    let out = engine.retrieve("问题", &params(4, 0.9, 3)).expect("retrieve");
    let sources: Vec<&str> = out.results.iter().map(|r| r.source_id.as_str()).collect();
    assert_eq!(sources, vec!["s0", "s1", "s2"]);
    for pair in out.results.windows(2) {
        assert!(pair[0].distance <= pair[1].distance);
    }
}

#[test]
fn context_is_space_joined_result_text() {
    let rows = [("a", "A", basis(2, 0)), ("b", "B B", basis(2, 1))];
    let engine = engine(2, &rows, &[("问题", vec![1.0, 0.5])]);
    let out = engine.retrieve("问题", &params(2, 0.9, 3)).expect("retrieve");
    assert_eq!(out.context, "A B B");
}

#[test]
fn zero_cap_and_empty_corpus_give_empty_context() {
    let rows = [("a", "A", basis(2, 0))];
    let engine = engine(2, &rows, &[("问题", basis(2, 0))]);
    let out = engine.retrieve("问题", &params(5, 0.9, 0)).expect("retrieve");
    assert!(out.results.is_empty());
    assert_eq!(out.context, "");

    let empty = support::engine(2, &[], &[("问题", basis(2, 0))]);
    let out = empty.retrieve("问题", &params(5, 0.9, 3)).expect("retrieve");
    assert!(out.results.is_empty());
    assert_eq!(out.context, "");
}

#[test]
fn invalid_params_are_rejected() {
    let engine = engine(2, &[("a", "A", basis(2, 0))], &[("问题", basis(2, 0))]);
    let err = engine.retrieve("问题", &params(0, 0.9, 3)).unwrap_err();
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::InvalidArgument(_))));
    let err = engine.retrieve("问题", &params(3, 1.5, 3)).unwrap_err();
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::InvalidArgument(_))));
}

#[test]
fn query_of_wrong_width_is_a_dimension_mismatch() {
    let engine = engine(2, &[("a", "A", basis(2, 0))], &[]);
    let engine_with_bad_query = {
        // Same corpus, but the query embeds to three dimensions.
        let embedder = MapEmbedder::new(3).with("问题", basis(3, 0));
        let index = FlatIndex::from_vectors(2, Metric::L2, vec![basis(2, 0)]).expect("index");
        RetrievalEngine::new(
            Box::new(embedder),
            Box::new(index),
            engine.catalog().clone(),
        )
        .expect("engine")
    };
    let err = engine_with_bad_query
        .retrieve("问题", &params(1, 0.9, 3))
        .unwrap_err();
    assert_eq!(
        err.downcast_ref::<Error>(),
        Some(&Error::DimensionMismatch {
            expected: 2,
            actual: 3
        })
    );
}

#[test]
fn near_duplicates_collapse_to_the_longer_entry() {
    let short = "盗窃罪数额较大的处罚";
    let long = "盗窃公私财物，数额较大的，或者多次盗窃、入户盗窃的处三年以下";
    assert_eq!(short.chars().count(), 10);
    assert_eq!(long.chars().count(), 30);

    let mut near = basis(8, 0);
    near[0] = 0.95;
    near[1] = (1.0f32 - 0.95 * 0.95).sqrt();
    let rows = [
        ("刑法.txt", short, basis(8, 0)),
        ("刑法.txt", "故意伤害他人身体的处三年以下有期徒刑", basis(8, 2)),
        ("刑法释义.txt", long, near),
        ("婚姻法.txt", "婚姻自由一夫一妻男女平等", basis(8, 3)),
        ("民法典.txt", "合同是民事主体之间设立变更终止民事法律关系的协议", basis(8, 4)),
    ];
    let query = vec![1.0, 0.2, 0.1, 0.05, 0.02, 0.0, 0.0, 0.0];
    let engine = engine(8, &rows, &[("盗窃多少钱会判刑", query)]);
    let out = engine
        .retrieve("盗窃多少钱会判刑", &params(5, 0.9, 3))
        .expect("retrieve");
    assert_eq!(out.results.len(), 3);
    let texts: Vec<&str> = out.results.iter().map(|r| r.text.as_str()).collect();
    assert!(texts.contains(&long));
    assert!(!texts.contains(&short));
}

//! tests/api/inverted_index.rs
use claims::assert_ok;
use keyword_index::error::JobError;
use keyword_index::job::run_inverted_index;
use keyword_index::keywords::KeywordSet;
use keyword_index::output::{read_output, SUCCESS_MARKER, TEMPORARY_DIR};

use crate::helpers::{test_data_dir, test_settings, ScratchDir};

#[tokio::test]
async fn should_rank_documents_for_each_keyword() {
    // Arrange
    let scratch = ScratchDir::new();
    let settings = test_settings();
    let keywords = KeywordSet::new(["the", "sat", "zzz"]);

    // Act
    let report = run_inverted_index(&settings, &test_data_dir(), &scratch.output(), &keywords)
        .await
        .expect("Job failed");

    // Assert
    assert_eq!(report.map_tasks, 2);
    assert_eq!(report.emitted_pairs, 5);
    assert_eq!(report.output_records, 2);
    assert!(scratch.output().join(SUCCESS_MARKER).is_file());
    assert!(!scratch.output().join(TEMPORARY_DIR).exists());

    let index = read_output(&scratch.output()).expect("Failed to read output");
    assert_eq!(index.len(), 2);
    assert_eq!(index["the"].to_string(), "doc2 1 doc1 2");
    assert_eq!(index["sat"].to_string(), "doc1 1 doc2 1");
    assert!(!index.contains_key("zzz"));
}

#[tokio::test]
async fn results_should_not_depend_on_splits_partitions_or_workers() {
    let keywords = KeywordSet::new(["the", "very", "she", "book", "Alice", "zzz"]);
    let corpus = test_data_dir().join("corpus");

    let mut outputs = vec![];
    for (workers, reduce_tasks, split_size) in [(1, 1, 64 * 1024 * 1024), (3, 4, 64), (2, 7, 1)] {
        let scratch = ScratchDir::new();
        let mut settings = test_settings();
        settings.cluster.workers = workers;
        settings.job.reduce_tasks = reduce_tasks;
        settings.job.split_size_in_bytes = split_size;

        let report = run_inverted_index(&settings, &corpus, &scratch.output(), &keywords)
            .await
            .expect("Job failed");

        assert_eq!(report.parts.len(), reduce_tasks as usize);
        outputs.push(read_output(&scratch.output()).expect("Failed to read output"));
    }

    let index = &outputs[0];
    assert_eq!(index["the"].to_string(), "rabbit.txt 2 alice.txt 3 well.txt 3");
    assert_eq!(index["very"].to_string(), "alice.txt 1 rabbit.txt 2 well.txt 2");
    assert_eq!(index["she"].to_string(), "alice.txt 1 well.txt 7");
    assert_eq!(index["book"].to_string(), "alice.txt 1");
    assert_eq!(index["Alice"].to_string(), "rabbit.txt 1 alice.txt 2");
    assert!(!index.contains_key("zzz"));
    for other in &outputs[1..] {
        assert_eq!(other, index);
    }
}

#[tokio::test]
async fn hidden_files_should_not_be_indexed() {
    let scratch = ScratchDir::new();
    let keywords = KeywordSet::new(["the", "she"]);

    run_inverted_index(
        &test_settings(),
        &test_data_dir().join("corpus"),
        &scratch.output(),
        &keywords,
    )
    .await
    .expect("Job failed");

    let index = read_output(&scratch.output()).expect("Failed to read output");
    for ranked in index.values() {
        for (document, _) in ranked.entries() {
            assert!(!document.starts_with('.') && !document.starts_with('_'));
        }
    }
}

#[tokio::test]
async fn a_single_file_can_be_indexed() {
    let scratch = ScratchDir::new();

    run_inverted_index(
        &test_settings(),
        &test_data_dir().join("doc1"),
        &scratch.output(),
        &KeywordSet::new(["the", "mat"]),
    )
    .await
    .expect("Job failed");

    let index = read_output(&scratch.output()).expect("Failed to read output");
    assert_eq!(index["the"].to_string(), "doc1 2");
    assert_eq!(index["mat"].to_string(), "doc1 1");
}

#[tokio::test]
async fn an_existing_output_should_be_left_untouched() {
    let scratch = ScratchDir::new();
    let settings = test_settings();
    let keywords = KeywordSet::new(["the"]);
    assert_ok!(run_inverted_index(&settings, &test_data_dir(), &scratch.output(), &keywords).await);

    let rerun = run_inverted_index(&settings, &test_data_dir(), &scratch.output(), &keywords).await;

    assert!(matches!(rerun, Err(JobError::Configuration(_))));
    let index = read_output(&scratch.output()).expect("First output should survive");
    assert_eq!(index["the"].to_string(), "doc2 1 doc1 2");
}

#[tokio::test]
async fn a_missing_input_should_fail_without_creating_output() {
    let scratch = ScratchDir::new();

    let result = run_inverted_index(
        &test_settings(),
        &test_data_dir().join("no-such-input"),
        &scratch.output(),
        &KeywordSet::new(["the"]),
    )
    .await;

    assert!(matches!(result, Err(JobError::Configuration(_))));
    assert!(!scratch.output().exists());
}

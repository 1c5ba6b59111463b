//! tests/api/spec.rs
use claims::{assert_none, assert_some};
use keyword_index::error::JobError;
use keyword_index::job::inverted_index_spec;
use keyword_index::keywords::KeywordSet;
use keyword_index::mappers::KEYWORD_FILTER;
use keyword_index::reducers::COUNT_AND_RANK;
use keyword_index::spec::{MapReduceInput, MapReduceOutput, MapReduceSpecification};
use std::path::Path;

use crate::helpers::test_settings;

#[test]
fn you_should_be_able_to_create_a_map_reduce_spec() {
    let spec = MapReduceSpecification::new("invertIndex", 2, 1024);
    assert_eq!(spec.name(), "invertIndex");
    assert_eq!(spec.machines(), 2);
    assert_eq!(spec.split_size_in_bytes(), 1024);
    assert!(spec.conf().is_empty());
}

#[test]
fn you_should_be_able_to_add_input_to_a_map_reduce_spec() {
    let mut spec = MapReduceSpecification::new("invertIndex", 2, 1024);

    for i in 0..5 {
        spec.add_input(MapReduceInput::new(format!("input_{i}.txt"), KEYWORD_FILTER));
    }

    assert_eq!(spec.inputs().len(), 5);
    for (i, input) in spec.inputs().iter().enumerate() {
        assert_eq!(input.path(), Path::new(&format!("input_{i}.txt")));
        assert_eq!(input.mapper(), KEYWORD_FILTER);
    }
}

#[test]
fn you_should_be_able_to_define_a_map_reduce_output_on_a_spec() {
    let mut spec = MapReduceSpecification::new("invertIndex", 2, 1024);
    spec.add_input(MapReduceInput::new("input_0.txt", KEYWORD_FILTER));
    assert_none!(spec.output());

    spec.set_output(MapReduceOutput::new("/root/home/index", 100, COUNT_AND_RANK));

    let output = assert_some!(spec.output());
    assert_eq!(output.base_path(), Path::new("/root/home/index"));
    assert_eq!(output.num_tasks(), 100);
    assert_eq!(output.reducer(), COUNT_AND_RANK);
}

#[test]
fn the_inverted_index_spec_follows_the_configuration() {
    let settings = test_settings();
    let spec = inverted_index_spec(
        &settings,
        Path::new("books"),
        Path::new("index"),
        &KeywordSet::new(["Alice", "rabbit"]),
    )
    .expect("Failed to describe job");

    assert_eq!(spec.machines(), u32::from(settings.cluster.workers));
    assert_eq!(spec.split_size_in_bytes(), settings.job.split_size_in_bytes);
    assert_eq!(spec.max_map_attempts(), settings.job.max_map_attempts);
    let output = assert_some!(spec.output());
    assert_eq!(output.num_tasks(), settings.job.reduce_tasks);
    assert_eq!(spec.inputs()[0].mapper(), KEYWORD_FILTER);
    assert_eq!(
        KeywordSet::from_conf(spec.conf()).expect("Keywords should round trip"),
        KeywordSet::new(["Alice", "rabbit"])
    );
}

#[test]
fn an_inverted_index_without_keywords_is_a_configuration_error() {
    let result = inverted_index_spec(
        &test_settings(),
        Path::new("books"),
        Path::new("index"),
        &KeywordSet::default(),
    );
    assert!(matches!(result, Err(JobError::Configuration(_))));
}

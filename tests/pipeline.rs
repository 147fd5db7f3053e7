//! End-to-end runs of the four stages through the file-based driver.

use std::fs;
use std::path::{Path, PathBuf};

use booktrends::error::PipelineError;
use booktrends::standalone::engine::read_output;
use booktrends::standalone::pipeline::{run, run_stage};
use booktrends::standalone::PipelineConfig;
use tempfile::TempDir;

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn records(dir: &Path) -> Vec<(String, String)> {
    read_output(dir).unwrap()
}

fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
    items
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn corpus(dir: &TempDir, body: &str) -> String {
    let mut content = String::from("bookID,title,year,content\n");
    content.push_str(body);
    write(dir.path(), "books.csv", &content)
        .to_string_lossy()
        .into_owned()
}

#[test]
fn cat_and_dog_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let input = corpus(&dir, "1,TitleA,1851,\"The cat and the dog ran.\"\n");
    let lexicon = write(dir.path(), "afinn.txt", "cat\t0\ndog\t1\nran\t0\n");
    let output = dir.path().join("out");

    let config = PipelineConfig {
        lexicon: Some(lexicon),
        ..Default::default()
    };
    let report = run(&input, &output, &config).unwrap();

    assert_eq!(records(&output.join("clean")), pairs(&[("1,1851", "cat dog ran")]));
    assert_eq!(
        records(&output.join("frequency")),
        pairs(&[("1,cat,1851", "1"), ("1,dog,1851", "1"), ("1,ran,1851", "1")])
    );
    assert_eq!(records(&output.join("decade")), pairs(&[("1,1850", "3")]));
    assert_eq!(records(&output.join("sentiment")), pairs(&[("1,1851", "1")]));

    assert_eq!(report.stages.len(), 4);
    assert_eq!(report.stage("frequency").unwrap().map_records, 3);
    assert_eq!(report.stage("decade").unwrap().output_records, 1);
}

#[test]
fn malformed_and_stopword_only_lines_produce_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let input = corpus(
        &dir,
        "2,OnlyTwo\n3,Stop,1900,The and of it is\n4,Bad,year,cat\n",
    );
    let output = dir.path().join("out");

    let report = run(&input, &output, &PipelineConfig::default()).unwrap();
    for stage in ["clean", "frequency", "decade", "sentiment"] {
        assert!(records(&output.join(stage)).is_empty(), "{stage} should be empty");
        assert_eq!(report.stage(stage).unwrap().output_records, 0);
    }
}

#[test]
fn unmatched_input_fails_without_leaving_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("missing-*.csv").to_string_lossy().into_owned();
    let output = dir.path().join("out");

    let err = run(&input, &output, &PipelineConfig::default()).unwrap_err();
    assert!(matches!(
        err.root_cause().downcast_ref::<PipelineError>(),
        Some(PipelineError::NoInput(_))
    ));
    assert!(!output.exists());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn cleaner_alone_drops_bad_lines_silently() {
    let dir = tempfile::tempdir().unwrap();
    let input = corpus(&dir, "2,OnlyTwo\n3,Stop,1900,the and of\n5,Good,1901,whale sighted\n");
    let output = dir.path().join("clean");

    let report = run_stage("clean", &input, &output, &PipelineConfig::default()).unwrap();
    assert_eq!(report.map_records, 1);
    assert_eq!(records(&output), pairs(&[("5,1901", "whale sighted")]));
}

#[test]
fn lines_for_the_same_book_and_year_are_concatenated() {
    let dir = tempfile::tempdir().unwrap();
    let input = corpus(
        &dir,
        "7,Moby,1851,Call me Ishmael.\n7,Moby,1851,Some years ago\n7,Moby,1852,whale\n",
    );
    let output = dir.path().join("out");
    let config = PipelineConfig {
        split_lines: 1,
        n_reduce: 3,
        ..Default::default()
    };
    run(&input, &output, &config).unwrap();

    assert_eq!(
        records(&output.join("clean")),
        pairs(&[("7,1851", "call me ishmael some years ago"), ("7,1852", "whale")])
    );
    assert_eq!(records(&output.join("decade")), pairs(&[("7,1850", "7")]));
    // no lexicon: every total is zero
    assert_eq!(
        records(&output.join("sentiment")),
        pairs(&[("7,1851", "0"), ("7,1852", "0")])
    );
}

#[test]
fn lemma_table_feeds_frequency_and_sentiment() {
    let dir = tempfile::tempdir().unwrap();
    let input = corpus(&dir, "1,A,1903,Mice loved the flies; mice wept.\n");
    let lemmas = write(dir.path(), "lemmas.txt", "mice mouse\nwept weep\n");
    let lexicon = write(dir.path(), "afinn.txt", "love\t3\nweep\t-2\nfly\t-1\n");
    let output = dir.path().join("out");

    let config = PipelineConfig {
        lemmas: Some(lemmas),
        lexicon: Some(lexicon),
        ..Default::default()
    };
    run(&input, &output, &config).unwrap();

    assert_eq!(
        records(&output.join("frequency")),
        pairs(&[
            ("1,fly,1903", "1"),
            ("1,lov,1903", "1"),
            ("1,mouse,1903", "2"),
            ("1,weep,1903", "1"),
        ])
    );
    // "loved" strips to "lov", which the lexicon does not know
    assert_eq!(records(&output.join("sentiment")), pairs(&[("1,1903", "-3")]));
}

#[test]
fn missing_tables_degrade_instead_of_failing() {
    let dir = tempfile::tempdir().unwrap();
    let input = corpus(&dir, "1,A,1851,running dogs\n");
    let output = dir.path().join("out");
    let config = PipelineConfig {
        lemmas: Some(dir.path().join("no-lemmas.txt")),
        lexicon: Some(dir.path().join("no-afinn.txt")),
        ..Default::default()
    };
    run(&input, &output, &config).unwrap();

    assert_eq!(
        records(&output.join("frequency")),
        pairs(&[("1,dog,1851", "1"), ("1,runn,1851", "1")])
    );
    assert_eq!(records(&output.join("sentiment")), pairs(&[("1,1851", "0")]));
}

#[test]
fn single_pass_sentiment_matches_two_pass_totals() {
    let dir = tempfile::tempdir().unwrap();
    let input = corpus(
        &dir,
        "1,A,1851,good dogs and bad cats\n1,A,1851,good good\n2,B,1900,bad\n",
    );
    let lexicon = write(dir.path(), "afinn.txt", "good\t3\nbad\t-3\ndog\t1\n");
    let output = dir.path().join("out");
    let config = PipelineConfig {
        lexicon: Some(lexicon),
        ..Default::default()
    };
    run(&input, &output, &config).unwrap();

    let direct = dir.path().join("direct");
    let clean = output.join("clean").to_string_lossy().into_owned();
    run_stage("sentiment-text", &clean, &direct, &config).unwrap();

    assert_eq!(records(&direct), records(&output.join("sentiment")));
    assert_eq!(records(&direct), pairs(&[("1,1851", "7"), ("2,1900", "-3")]));
}

#[test]
fn decade_span_argument() {
    let dir = tempfile::tempdir().unwrap();
    let input = corpus(&dir, "1,A,1851,whale\n1,A,1949,whale\n");
    let output = dir.path().join("out");
    let config = PipelineConfig {
        args: vec!["--span".into(), "100".into()],
        ..Default::default()
    };
    run(&input, &output, &config).unwrap();
    assert_eq!(
        records(&output.join("decade")),
        pairs(&[("1,1800", "1"), ("1,1900", "1")])
    );
}

#[test]
fn existing_output_is_never_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    let input = corpus(&dir, "1,A,1851,whale\n");
    let output = dir.path().join("out");
    fs::create_dir(&output).unwrap();
    write(&output, "keep.txt", "mine");

    let err = run(&input, &output, &PipelineConfig::default()).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<PipelineError>(),
        Some(PipelineError::OutputExists(_))
    ));
    assert_eq!(fs::read_to_string(output.join("keep.txt")).unwrap(), "mine");
}

#[test]
fn every_input_file_has_its_own_header() {
    let dir = tempfile::tempdir().unwrap();
    let books = dir.path().join("books");
    fs::create_dir(&books).unwrap();
    write(&books, "a.csv", "bookID,title,year,content\n1,A,1851,whale\n");
    write(&books, "b.csv", "bookID,title,year,content\n2,B,1852,ship\n");
    let output = dir.path().join("out");

    run(&books.to_string_lossy(), &output, &PipelineConfig::default()).unwrap();
    assert_eq!(
        records(&output.join("clean")),
        pairs(&[("1,1851", "whale"), ("2,1852", "ship")])
    );
}

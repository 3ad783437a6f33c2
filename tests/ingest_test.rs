mod helpers;

use helpers::{dialogue_question, phrase_question, render_question_file, test_store};
use kikitori::question::ingest::{ingest_dir, ingest_file};
use kikitori::question::types::Section;
use std::fs;

#[test]
fn ingest_file_adds_then_skips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vid1_section2.txt");
    let questions = vec![
        dialogue_question("駅で話しています", "次の電車は何時ですか。", "何時ですか"),
        dialogue_question("店で話しています", "これはいくらですか。", "いくらですか"),
    ];
    fs::write(&path, render_question_file(&questions)).unwrap();

    let mut store = test_store();

    let outcome = ingest_file(&mut store, &path, Section::Dialogue).unwrap();
    assert_eq!(outcome.parsed, 2);
    assert_eq!(outcome.added, 2);
    assert!(!outcome.skipped_file);

    // Re-ingesting the same file is a whole-file no-op
    let outcome = ingest_file(&mut store, &path, Section::Dialogue).unwrap();
    assert_eq!(outcome.added, 0);
    assert!(outcome.skipped_file);
    assert_eq!(store.count(Section::Dialogue).unwrap(), 2);
}

#[test]
fn partially_ingested_file_is_completed() {
    let dir = tempfile::tempdir().unwrap();
    let one = vec![dialogue_question("a", "b", "c")];
    let two = vec![
        dialogue_question("a", "b", "c"),
        dialogue_question("d", "e", "f"),
    ];
    let path = dir.path().join("vid1_section2.txt");

    let mut store = test_store();

    // First pass sees only one record
    fs::write(&path, render_question_file(&one)).unwrap();
    ingest_file(&mut store, &path, Section::Dialogue).unwrap();

    // The file grows; a second pass must pick up the new record only
    fs::write(&path, render_question_file(&two)).unwrap();
    let outcome = ingest_file(&mut store, &path, Section::Dialogue).unwrap();
    assert!(!outcome.skipped_file);
    assert_eq!(outcome.added, 1);
    assert_eq!(outcome.skipped_duplicate, 1);
}

#[test]
fn malformed_records_are_counted_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vid1_section3.txt");
    // Second record lacks its Situation line
    let contents = "\
<question>
Situation:
先生に質問があります
Question:
なんと言いますか
</question>
<question>
Question:
どうしますか
</question>
";
    fs::write(&path, contents).unwrap();

    let mut store = test_store();
    let outcome = ingest_file(&mut store, &path, Section::PhraseMatch).unwrap();
    assert_eq!(outcome.parsed, 2);
    assert_eq!(outcome.added, 1);
    assert_eq!(outcome.skipped_invalid, 1);
}

#[test]
fn missing_file_errors() {
    let mut store = test_store();
    assert!(ingest_file(
        &mut store,
        std::path::Path::new("/nonexistent/vid1_section2.txt"),
        Section::Dialogue
    )
    .is_err());
}

#[test]
fn ingest_dir_routes_by_suffix_and_survives_bad_files() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("vid1_section2.txt"),
        render_question_file(&[dialogue_question("a", "b", "c")]),
    )
    .unwrap();
    fs::write(
        dir.path().join("vid2_section3.txt"),
        render_question_file(&[phrase_question("s", "q")]),
    )
    .unwrap();
    // Ignored: wrong suffix, and a question-free text file
    fs::write(dir.path().join("notes.md"), "not a question file").unwrap();
    fs::write(dir.path().join("vid3_section2.txt"), "no records here").unwrap();

    let mut store = test_store();
    let reports = ingest_dir(&mut store, dir.path()).unwrap();

    // Three matching files reported (the empty one parses to zero records)
    assert_eq!(reports.len(), 3);
    assert_eq!(store.count(Section::Dialogue).unwrap(), 1);
    assert_eq!(store.count(Section::PhraseMatch).unwrap(), 1);

    let sections: Vec<Section> = reports.iter().map(|(_, s, _)| *s).collect();
    assert!(sections.contains(&Section::Dialogue));
    assert!(sections.contains(&Section::PhraseMatch));
}

#[test]
fn source_tracking_spans_sections_independently() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("vid1_section2.txt"),
        render_question_file(&[dialogue_question("a", "b", "c")]),
    )
    .unwrap();
    fs::write(
        dir.path().join("vid1_section3.txt"),
        render_question_file(&[phrase_question("s", "q")]),
    )
    .unwrap();

    let mut store = test_store();
    ingest_dir(&mut store, dir.path()).unwrap();

    // Same source id in both sections, tracked per collection
    assert_eq!(store.source_files(Section::Dialogue).unwrap(), vec!["vid1"]);
    assert_eq!(store.source_files(Section::PhraseMatch).unwrap(), vec!["vid1"]);
}

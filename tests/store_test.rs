mod helpers;

use helpers::{
    dialogue_question, phrase_question, store_with, CountingProvider, FailingProvider,
};
use kikitori::question::types::{Question, Section};
use std::sync::atomic::Ordering;

#[test]
fn invalid_records_never_reach_the_embedder() {
    let (provider, calls) = CountingProvider::new();
    let mut store = store_with(Box::new(provider));

    let incomplete = Question::new(Section::Dialogue).with_field("Introduction", "話しています");
    let complete = dialogue_question("a", "b", "c");

    let outcome = store
        .add_questions(Section::Dialogue, &[incomplete, complete], "vid1")
        .unwrap();

    assert_eq!(outcome.added, 1);
    assert_eq!(outcome.skipped_invalid, 1);
    // Only the valid record was embedded
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn duplicate_records_never_reach_the_embedder() {
    let (provider, calls) = CountingProvider::new();
    let mut store = store_with(Box::new(provider));
    let q = vec![dialogue_question("a", "b", "c")];

    store.add_questions(Section::Dialogue, &q, "vid1").unwrap();
    let embeds_after_first = calls.load(Ordering::SeqCst);

    store.add_questions(Section::Dialogue, &q, "vid1").unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), embeds_after_first);
}

#[test]
fn failed_embedding_does_not_block_ingestion() {
    let mut store = store_with(Box::new(FailingProvider));

    let questions = vec![
        dialogue_question("a", "b", "c"),
        dialogue_question("d", "e", "f"),
    ];
    let outcome = store
        .add_questions(Section::Dialogue, &questions, "vid1")
        .unwrap();

    // Zero vectors were substituted; both documents stored and recoverable
    assert_eq!(outcome.added, 2);
    let stored = store
        .get_question(Section::Dialogue, "vid1_2_1")
        .unwrap()
        .unwrap();
    assert_eq!(stored.field("Introduction"), Some("d"));
}

#[test]
fn validation_is_per_section() {
    let mut store = helpers::test_store();

    // A phrase-match record lacking Situation is invalid in its own section
    let invalid = Question::new(Section::PhraseMatch).with_field("Question", "なんと言いますか");
    let valid = phrase_question("店で店員を呼びます", "なんと言いますか");

    let outcome = store
        .add_questions(Section::PhraseMatch, &[invalid, valid], "vid9")
        .unwrap();
    assert_eq!(outcome.added, 1);
    assert_eq!(outcome.skipped_invalid, 1);

    // Ordinals count all records, so the valid one landed at position 1
    assert!(store
        .get_question(Section::PhraseMatch, "vid9_3_1")
        .unwrap()
        .is_some());
}

#[test]
fn get_missing_question_is_none() {
    let store = helpers::test_store();
    assert!(store
        .get_question(Section::Dialogue, "nope_2_0")
        .unwrap()
        .is_none());
}

#[test]
fn persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("questions.db");

    {
        let mut store = kikitori::question::store::QuestionVectorStore::open(
            &db_path,
            Box::new(helpers::HashProvider),
        )
        .unwrap();
        store
            .add_questions(
                Section::Dialogue,
                &[dialogue_question("a", "b", "c")],
                "vid1",
            )
            .unwrap();
    }

    let store = kikitori::question::store::QuestionVectorStore::open(
        &db_path,
        Box::new(helpers::HashProvider),
    )
    .unwrap();
    assert_eq!(store.count(Section::Dialogue).unwrap(), 1);
    assert!(store
        .get_question(Section::Dialogue, "vid1_2_0")
        .unwrap()
        .is_some());
}

//! Label addressing

use super::helpers::*;
use crate::command::{Comment, Label};
use crate::types::Launch;
use maplit::hashmap;

#[test]
fn test_find_label_case_insensitive() {
    let (engine, _) = engine_with(vec![
        boxed(Comment::new("intro")),
        boxed(Label::new("start")),
    ]);

    assert_eq!(engine.find_label("Start"), Some(1));
    assert_eq!(engine.find_label("missing"), None);
}

#[test]
fn test_duplicate_labels_resolve_to_first() {
    let (engine, _) = engine_with(vec![
        boxed(Label::new("Start")),
        boxed(Comment::new("between")),
        boxed(Label::new("Start")),
    ]);

    assert_eq!(engine.find_label("Start"), Some(0));
}

#[test]
fn test_execute_label() {
    let log = new_log();
    let (mut engine, recorder) = engine_with(vec![
        boxed(Probe::sync("prologue", &log)),
        boxed(Label::new("Chapter2")),
        boxed(Probe::sync("chapter two", &log)),
    ]);

    let launch = engine.execute_label("chapter2", None).unwrap();

    assert_eq!(launch, Launch::Started);
    assert_eq!(entries(&log), vec!["chapter two"]);
    assert_eq!(recorder.executed(), vec![2]);
}

#[test]
fn test_execute_missing_label_does_not_start() {
    let log = new_log();
    let (mut engine, recorder) = engine_with(vec![boxed(Probe::sync("a", &log))]);
    let (completed, on_complete) = completion_counter();

    let launch = engine
        .execute_label("nowhere", Some(Box::new(on_complete)))
        .unwrap();

    assert_eq!(launch, Launch::LabelNotFound);
    assert_eq!(engine.run_count(), 0);
    assert_eq!(count(&completed), 0);
    assert!(recorder.events().is_empty());
}

#[test]
fn test_labels_follow_sequence_edits() {
    let log = new_log();
    let (mut engine, _) = engine_with(vec![boxed(Probe::sync("a", &log))]);

    engine
        .sequence_mut()
        .unwrap()
        .insert(0, boxed(Label::new("top")));

    assert_eq!(engine.find_label("top"), Some(0));
    engine.execute_label("top", None).unwrap();
    assert_eq!(entries(&log), vec!["a"]);
}

#[test]
fn test_every_label_resolves_to_its_position() {
    let (engine, _) = engine_with(vec![
        boxed(Label::new("intro")),
        boxed(Comment::new("scene one")),
        boxed(Label::new("Choice")),
        boxed(Comment::new("scene two")),
        boxed(Label::new("ending")),
    ]);
    let expected = hashmap! {
        "intro" => 0,
        "choice" => 2,
        "ENDING" => 4,
    };

    for (key, position) in expected {
        assert_eq!(engine.find_label(key), Some(position), "label {key}");
    }
}

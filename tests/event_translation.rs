// tests/event_translation.rs

use notify::event::{
    AccessKind, CreateKind, DataChange, MetadataKind, ModifyKind, RemoveKind, RenameMode,
};
use notify::{Event, EventKind};

use war::watch::{translate, EventTranslator, WatchEvent, WatchEventKind};

fn event(kind: EventKind, paths: &[&str]) -> Event {
    paths
        .iter()
        .fold(Event::new(kind), |ev, p| ev.add_path(p.into()))
}

#[test]
fn create_and_remove_map_directly() {
    assert_eq!(
        translate(&event(EventKind::Create(CreateKind::File), &["/w/a.go"])),
        vec![WatchEvent::new(WatchEventKind::Create, "/w/a.go")]
    );
    assert_eq!(
        translate(&event(EventKind::Remove(RemoveKind::Folder), &["/w/src"])),
        vec![WatchEvent::new(WatchEventKind::Remove, "/w/src")]
    );
}

#[test]
fn data_modifications_are_writes() {
    for kind in [
        ModifyKind::Data(DataChange::Content),
        ModifyKind::Any,
        ModifyKind::Other,
    ] {
        assert_eq!(
            translate(&event(EventKind::Modify(kind), &["/w/a.go"])),
            vec![WatchEvent::new(WatchEventKind::Write, "/w/a.go")],
            "{kind:?}"
        );
    }
}

#[test]
fn rename_sides_are_split() {
    assert_eq!(
        translate(&event(
            EventKind::Modify(ModifyKind::Name(RenameMode::From)),
            &["/w/old.go"]
        )),
        vec![WatchEvent::new(WatchEventKind::Rename, "/w/old.go")]
    );
    assert_eq!(
        translate(&event(
            EventKind::Modify(ModifyKind::Name(RenameMode::To)),
            &["/w/new.go"]
        )),
        vec![WatchEvent::new(WatchEventKind::Create, "/w/new.go")]
    );
    assert_eq!(
        translate(&event(
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)),
            &["/w/old.go", "/w/new.go"]
        )),
        vec![
            WatchEvent::new(WatchEventKind::Rename, "/w/old.go"),
            WatchEvent::new(WatchEventKind::Create, "/w/new.go"),
        ]
    );
}

#[test]
fn ambiguous_rename_checks_what_still_exists() {
    let dir = tempfile::tempdir().unwrap();
    let present = dir.path().join("present.go");
    std::fs::write(&present, "x").unwrap();
    let absent = dir.path().join("absent.go");

    let ev = Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::Any)))
        .add_path(absent.clone())
        .add_path(present.clone());

    assert_eq!(
        translate(&ev),
        vec![
            WatchEvent::new(WatchEventKind::Rename, absent),
            WatchEvent::new(WatchEventKind::Create, present),
        ]
    );
}

#[test]
fn metadata_and_access_are_dropped() {
    assert!(translate(&event(
        EventKind::Modify(ModifyKind::Metadata(MetadataKind::Permissions)),
        &["/w/a.go"]
    ))
    .is_empty());
    assert!(translate(&event(EventKind::Access(AccessKind::Any), &["/w/a.go"])).is_empty());
    assert!(translate(&event(EventKind::Any, &["/w/a.go"])).is_empty());
}

#[test]
fn multi_path_events_fan_out() {
    assert_eq!(
        translate(&event(
            EventKind::Create(CreateKind::Any),
            &["/w/a.go", "/w/b.go"]
        )),
        vec![
            WatchEvent::new(WatchEventKind::Create, "/w/a.go"),
            WatchEvent::new(WatchEventKind::Create, "/w/b.go"),
        ]
    );
}

fn rename(mode: RenameMode, paths: &[&str], tracker: usize) -> Event {
    event(EventKind::Modify(ModifyKind::Name(mode)), paths).set_tracker(tracker)
}

#[test]
fn paired_rename_is_reported_once() {
    let mut translator = EventTranslator::new();

    let from = translator.translate(&rename(RenameMode::From, &["/w/a"], 7));
    let to = translator.translate(&rename(RenameMode::To, &["/w/b"], 7));
    let both = translator.translate(&rename(RenameMode::Both, &["/w/a", "/w/b"], 7));

    assert_eq!(from, vec![WatchEvent::new(WatchEventKind::Rename, "/w/a")]);
    assert_eq!(to, vec![WatchEvent::new(WatchEventKind::Create, "/w/b")]);
    assert!(both.is_empty(), "combined event repeated the halves: {both:?}");
}

#[test]
fn combined_rename_without_halves_is_kept() {
    let mut translator = EventTranslator::new();
    translator.translate(&rename(RenameMode::From, &["/w/x"], 1));

    assert_eq!(
        translator.translate(&rename(RenameMode::Both, &["/w/a", "/w/b"], 2)),
        vec![
            WatchEvent::new(WatchEventKind::Rename, "/w/a"),
            WatchEvent::new(WatchEventKind::Create, "/w/b"),
        ]
    );
    assert_eq!(
        translator.translate(&event(
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)),
            &["/w/c", "/w/d"]
        ))
        .len(),
        2
    );
}

//! Integration tests for editor crate

use cyclenotes_compiler_html::{
    export_static, find_all, parse_fragment, ExportOptions, ExportOutcome, Hydrator,
};
use cyclenotes_document::{
    deserialize, serialize, Document, ListType, Node, NodeKind, Poll, PollOption, User,
};
use cyclenotes_editor::{
    display, resolve, AttributionTracker, DisplayState, EditSession, KeyPress, Mutation,
    PayloadSource, ResolveOptions, TrackerOptions, ViewerOptions, DEFAULT_TEMPLATE_HEADING,
};
use std::cell::RefCell;
use std::rc::Rc;

fn dana() -> User {
    User::new("u-42", "Dana")
}

fn tracker_for(user: User) -> AttributionTracker {
    let mut tracker = AttributionTracker::new(TrackerOptions::default());
    tracker.set_current_user(user);
    tracker
}

fn exported_html(document: &Document) -> String {
    let json = serialize(document).unwrap();
    match export_static(&json, &ExportOptions::default()) {
        ExportOutcome::Exported(export) => export.html,
        ExportOutcome::Fallback(fallback) => panic!("export failed: {}", fallback.error),
    }
}

#[test]
fn test_round_trip_of_editor_document() -> anyhow::Result<()> {
    let document = Document::from_nodes(vec![
        Node::paragraph(vec![Node::text("Frame size "), Node::mention("Ivo")]),
        Node::list(
            ListType::Number,
            vec![Node::list_item(vec![Node::text("Fit")])],
        ),
        Node::poll(Poll::new("Color?", vec![PollOption::new("r", "Red")])),
    ]);

    let restored = deserialize(&serialize(&document)?)?;
    assert!(restored.content_eq(&document));
    Ok(())
}

#[test]
fn test_plain_text_preservation() {
    let state = resolve("These are existing notes", &ResolveOptions::default());

    assert_eq!(state.source, PayloadSource::PlainText);
    assert_eq!(state.document.len(), 1);
    match &state.document.children()[0].kind {
        NodeKind::Paragraph { children } => {
            assert_eq!(children.len(), 1);
            assert_eq!(children[0].text_content(), "These are existing notes");
        }
        other => panic!("expected paragraph, got {:?}", other),
    }
    assert!(!state.document.text_content().contains(DEFAULT_TEMPLATE_HEADING));
}

#[test]
fn test_html_without_json_degrades_to_template() {
    let document = Document::from_nodes(vec![
        Node::paragraph(vec![Node::text("Watch this")]),
        Node::youtube("abc123"),
    ]);
    let html = exported_html(&document);
    let without_script = &html[..html.find("<script").unwrap()];

    let state = resolve(without_script, &ResolveOptions::default());

    assert_eq!(state.source, PayloadSource::Template);
    assert_eq!(state.document.text_content(), DEFAULT_TEMPLATE_HEADING);
}

#[test]
fn test_html_with_json_recovers_losslessly() {
    let document = Document::from_nodes(vec![
        Node::paragraph(vec![Node::text("Watch this")]),
        Node::youtube("abc123"),
    ]);
    let html = exported_html(&document);

    let state = resolve(&html, &ResolveOptions::default());

    assert_eq!(state.source, PayloadSource::EmbeddedJson);
    assert!(state.document.content_eq(&document));
    let has_video = state.document.children().iter().any(|node| {
        matches!(&node.kind, NodeKind::YouTube { video_id } if video_id == "abc123")
    });
    assert!(has_video);
    assert!(!state.document.text_content().contains(DEFAULT_TEMPLATE_HEADING));
}

#[test]
fn test_dirty_tracking_after_insert() -> anyhow::Result<()> {
    let saved = Rc::new(RefCell::new(Vec::<String>::new()));
    let sink = {
        let saved = Rc::clone(&saved);
        move |json: String| saved.borrow_mut().push(json)
    };
    let mut session = EditSession::new(Document::new(), tracker_for(dana()), sink);

    let key = session
        .apply(Mutation::InsertNode {
            parent: None,
            index: 0,
            node: Node::paragraph(vec![Node::text("Inspect fork")]),
        })?
        .key;
    session.tracker_mut().mark_dirty(key.clone());

    let meta = session.tracker().meta();
    assert!(meta.dirty_keys.contains(&key));
    assert_eq!(meta.last_edited_by, Some(dana()));
    assert!(saved.borrow().is_empty());
    Ok(())
}

#[test]
fn test_repeated_edits_coalesce_into_one_stamp() -> anyhow::Result<()> {
    let mut session = EditSession::new(Document::new(), tracker_for(dana()), |_json: String| {});
    session.insert_text("a")?;
    session.insert_text("b")?;
    session.insert_text("c")?;

    let report = session.save()?;

    assert_eq!(report.stamps.stamped.len(), 1);
    assert!(report.stamps.failed.is_empty());
    Ok(())
}

#[test]
fn test_save_flow_calls_sink_once() -> anyhow::Result<()> {
    let saved = Rc::new(RefCell::new(Vec::<String>::new()));
    let sink = {
        let saved = Rc::clone(&saved);
        move |json: String| saved.borrow_mut().push(json)
    };
    let state = resolve("", &ResolveOptions::default());
    let mut session = EditSession::new(state.document, tracker_for(dana()), sink);

    for c in "New note content".chars() {
        session.handle_key(KeyPress::char(c))?;
    }
    session.handle_key(KeyPress::enter())?;

    let saved = saved.borrow();
    assert_eq!(saved.len(), 1);

    let value: serde_json::Value = serde_json::from_str(&saved[0])?;
    let paragraph = &value["root"]["children"][0];
    assert_eq!(paragraph["type"], "paragraph");
    let text: String = paragraph["children"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|child| child["text"].as_str())
        .collect();
    assert_eq!(text, "New note content");
    assert_eq!(paragraph["attribution"]["lastEditedBy"]["name"], "Dana");
    Ok(())
}

#[test]
fn test_deleted_block_does_not_block_save() -> anyhow::Result<()> {
    let mut session = EditSession::new(Document::new(), tracker_for(dana()), |_json: String| {});
    session.insert_text("keep")?;
    let doomed = session
        .apply(Mutation::InsertNode {
            parent: None,
            index: 1,
            node: Node::paragraph(vec![Node::text("drop")]),
        })?
        .key;
    session.tracker_mut().mark_dirty(doomed.clone());
    session.apply(Mutation::RemoveNode { key: doomed })?;

    let report = session.save()?;

    assert_eq!(report.stamps.stamped.len(), 1);
    assert_eq!(report.stamps.failed.len(), 1);
    assert!(deserialize(&report.payload)?.text_content() == "keep");
    Ok(())
}

#[test]
fn test_empty_input_shows_empty_message() {
    match display("", &ViewerOptions::default()) {
        DisplayState::Empty { message } => {
            assert_eq!(message, "No notes yet. Click 'Add Notes' to get started.");
            assert!(!message.contains(DEFAULT_TEMPLATE_HEADING));
        }
        other => panic!("expected empty state, got {:?}", other),
    }
}

#[test]
fn test_display_then_hydrate_poll() {
    let mut poll = Poll::new("Weekend ride?", vec![PollOption::new("y", "Yes"), PollOption::new("n", "No")]);
    poll.toggle_vote("n", "u-1");
    let json = serialize(&Document::from_nodes(vec![Node::poll(poll)])).unwrap();

    let export = match display(&json, &ViewerOptions::default()) {
        DisplayState::Static(export) => export,
        other => panic!("expected static export, got {:?}", other),
    };

    let mut nodes = parse_fragment(&export.html);
    let mut hydrator = Hydrator::new();
    hydrator.hydrate(&mut nodes);
    hydrator.hydrate(&mut nodes);
    assert_eq!(find_all(&nodes, &|el| el.has_attr("data-poll-widget")).len(), 1);

    hydrator.toggle_vote(&mut nodes, 0, "y", "u-2").unwrap();
    hydrator.toggle_vote(&mut nodes, 0, "y", "u-2").unwrap();
    let widget = hydrator.widget(0).unwrap();
    assert_eq!(widget.poll.total_votes(), 1);
    assert_eq!(widget.poll.options[1].votes.len(), 1);

    // Hydration never touches the canonical payload
    assert_eq!(deserialize(&json).unwrap().children().len(), 1);
}

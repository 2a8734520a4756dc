//! # Canonical Serializer / Deserializer
//!
//! The canonical JSON form is the single source of truth for persistence:
//!
//! ```text
//! {
//!   "root": { "type": "root", "version": 1, "children": [ ...nodes ] },
//!   "__meta": {                                   // only when attributed
//!     "attributions": { "<key>": AttributionRecord },
//!     "defaultAttribution": AttributionRecord | null
//!   }
//! }
//! ```
//!
//! Acceptance is deliberately permissive: any JSON object loads. Node shapes
//! are not deep-validated; missing or ill-typed fields fall back to defaults
//! and unknown node types are carried through verbatim. Fields of known
//! types that are not modelled land in [`Node::extra`] and are written back.

use crate::attribution::AttributionRecord;
use crate::datetime::parse_datetime;
use crate::document::Document;
use crate::error::{DeserializationError, DocumentError};
use crate::key_generator::KeyGenerator;
use crate::node::{DateTimeValue, Node, NodeKind, Poll, PollOption, TextFormat, TextRun, TextStyle};
use crate::registry::NodeType;
use chrono::DateTime;
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use std::collections::BTreeSet;
use tracing::{debug, warn};

pub const META_FIELD: &str = "__meta";
pub const ROOT_VERSION: u32 = 1;

/// Serialize a document to canonical JSON
pub fn serialize(document: &Document) -> Result<String, DocumentError> {
    Ok(serde_json::to_string(&to_value(document))?)
}

/// Serialize with indentation (for humans; same content as [`serialize`])
pub fn serialize_pretty(document: &Document) -> Result<String, DocumentError> {
    Ok(serde_json::to_string_pretty(&to_value(document))?)
}

pub fn to_value(document: &Document) -> Value {
    let children: Vec<Value> = document.children().iter().map(node_to_value).collect();

    let mut top = Map::new();
    top.insert(
        "root".to_string(),
        json!({ "type": NodeType::Root.name(), "version": ROOT_VERSION, "children": children }),
    );

    let mut attributions = Map::new();
    for child in document.children() {
        if let Some(record) = &child.attribution {
            attributions.insert(child.key.to_string(), record.to_value());
        }
    }

    if !attributions.is_empty() || document.default_attribution.is_some() {
        let default_attribution = document
            .default_attribution
            .as_ref()
            .map(AttributionRecord::to_value)
            .unwrap_or(Value::Null);
        top.insert(
            META_FIELD.to_string(),
            json!({ "attributions": attributions, "defaultAttribution": default_attribution }),
        );
    }

    Value::Object(top)
}

fn node_to_value(node: &Node) -> Value {
    let mut map = match &node.kind {
        NodeKind::Opaque { fields, .. } => fields.clone(),
        _ => {
            let mut map = node.extra.clone();
            map.insert("type".to_string(), Value::String(node.type_name().to_string()));
            map
        }
    };

    match &node.kind {
        NodeKind::Paragraph { .. } | NodeKind::Quote { .. } | NodeKind::LineBreak => {}
        NodeKind::Heading { tag, .. } => {
            map.insert("tag".to_string(), json!(tag));
        }
        NodeKind::List { list_type, start, .. } => {
            map.insert("listType".to_string(), json!(list_type));
            map.insert("start".to_string(), json!(start));
        }
        NodeKind::ListItem { value, checked, .. } => {
            map.insert("value".to_string(), json!(value));
            if let Some(checked) = checked {
                map.insert("checked".to_string(), json!(checked));
            }
        }
        NodeKind::ChecklistItem { checked, .. } => {
            map.insert("checked".to_string(), json!(checked));
        }
        NodeKind::Text(run) => {
            map.insert("text".to_string(), json!(run.text));
            map.insert("format".to_string(), json!(run.format));
            map.insert("style".to_string(), json!(run.style.to_css()));
        }
        NodeKind::Mention { mention_name } => {
            map.insert("mentionName".to_string(), json!(mention_name));
        }
        NodeKind::Hashtag { tag } => {
            map.insert("tag".to_string(), json!(tag));
        }
        NodeKind::DateTime(value) => {
            map.insert("raw".to_string(), json!(value.raw));
            map.insert("resolved".to_string(), json!(value.resolved_iso()));
        }
        NodeKind::Poll(poll) => {
            map.insert("question".to_string(), json!(poll.question));
            map.insert("options".to_string(), json!(poll.options));
        }
        NodeKind::YouTube { video_id } => {
            map.insert("videoID".to_string(), json!(video_id));
        }
        NodeKind::Opaque { .. } => {}
    }

    if let Some(children) = node.children() {
        map.insert(
            "children".to_string(),
            Value::Array(children.iter().map(node_to_value).collect()),
        );
    }

    if let Some(record) = &node.attribution {
        map.insert("attribution".to_string(), record.to_value());
    }

    Value::Object(map)
}

/// Cheap acceptance check: parses as JSON and is a non-null object
pub fn is_canonical(raw: &str) -> bool {
    matches!(serde_json::from_str::<Value>(raw), Ok(Value::Object(_)))
}

/// Deserialize canonical JSON into a fresh document
pub fn deserialize(raw: &str) -> Result<Document, DeserializationError> {
    deserialize_with_keys(raw, KeyGenerator::new())
}

pub fn deserialize_with_keys(
    raw: &str,
    keys: KeyGenerator,
) -> Result<Document, DeserializationError> {
    let value: Value = serde_json::from_str(raw)?;
    from_value(value, keys)
}

pub fn from_value(value: Value, keys: KeyGenerator) -> Result<Document, DeserializationError> {
    let mut top = match value {
        Value::Object(map) => map,
        other => return Err(DeserializationError::NotAnObject(json_kind(&other))),
    };

    let mut document = Document::with_keys(keys);

    if let Some(meta) = top.remove(META_FIELD) {
        document.default_attribution = meta
            .get("defaultAttribution")
            .and_then(AttributionRecord::from_value)
            .filter(|record| !record.is_empty());
    }

    let children = match top.remove("root") {
        Some(Value::Object(mut root)) => match root.remove("children") {
            Some(Value::Array(children)) => children,
            _ => Vec::new(),
        },
        _ => {
            debug!("Canonical payload has no root; loading empty document");
            Vec::new()
        }
    };

    let mut uids = KeyGenerator::from_seed("poll");
    for child in children {
        if let Some(node) = node_from_value(child, &mut uids) {
            document.append(node);
        }
    }

    Ok(document)
}

fn node_from_value(value: Value, uids: &mut KeyGenerator) -> Option<Node> {
    let Value::Object(mut map) = value else {
        warn!(found = json_kind(&value), "Skipping non-object node");
        return None;
    };

    let Some(type_name) = map.get("type").and_then(Value::as_str).map(str::to_string) else {
        warn!("Skipping node without a type");
        return None;
    };

    let Some(node_type) = NodeType::from_name(&type_name) else {
        debug!(node_type = %type_name, "Keeping unknown node type verbatim");
        return Some(Node::new(NodeKind::Opaque {
            type_name,
            fields: map,
        }));
    };

    let attribution = map
        .remove("attribution")
        .as_ref()
        .and_then(AttributionRecord::from_value)
        .filter(|record| !record.is_empty());

    let children = if node_type.is_container() {
        match map.remove("children") {
            Some(Value::Array(children)) => children
                .into_iter()
                .filter_map(|child| node_from_value(child, uids))
                .collect(),
            _ => Vec::new(),
        }
    } else {
        Vec::new()
    };

    let kind = match node_type {
        NodeType::Root | NodeType::Paragraph => NodeKind::Paragraph { children },
        NodeType::Heading => NodeKind::Heading {
            tag: read(&map, "tag", node_type),
            children,
        },
        NodeType::List => NodeKind::List {
            list_type: read(&map, "listType", node_type),
            start: read_or(&map, "start", 1, node_type),
            children,
        },
        NodeType::ListItem => NodeKind::ListItem {
            value: read_or(&map, "value", 1, node_type),
            checked: read_or(&map, "checked", None, node_type),
            children,
        },
        NodeType::ChecklistItem => NodeKind::ChecklistItem {
            checked: read(&map, "checked", node_type),
            children,
        },
        NodeType::Quote => NodeKind::Quote { children },
        NodeType::Text => NodeKind::Text(TextRun {
            text: read(&map, "text", node_type),
            format: TextFormat(read(&map, "format", node_type)),
            style: TextStyle::parse(&read::<String>(&map, "style", node_type)),
        }),
        NodeType::LineBreak => NodeKind::LineBreak,
        NodeType::Mention => NodeKind::Mention {
            mention_name: read(&map, "mentionName", node_type),
        },
        NodeType::Hashtag => NodeKind::Hashtag {
            tag: read(&map, "tag", node_type),
        },
        NodeType::DateTime => NodeKind::DateTime(read_datetime(&map)),
        NodeType::Poll => NodeKind::Poll(read_poll(&map, uids)),
        NodeType::YouTube => NodeKind::YouTube {
            video_id: read(&map, "videoID", node_type),
        },
    };

    map.remove("type");
    for field in modelled_fields(node_type) {
        map.remove(*field);
    }

    Some(Node {
        attribution,
        extra: map,
        ..Node::new(kind)
    })
}

/// Wire fields read into [`NodeKind`]; everything else is kept in `extra`
fn modelled_fields(node_type: NodeType) -> &'static [&'static str] {
    match node_type {
        NodeType::Heading | NodeType::Hashtag => &["tag"],
        NodeType::List => &["listType", "start"],
        NodeType::ListItem => &["value", "checked"],
        NodeType::ChecklistItem => &["checked"],
        NodeType::Text => &["text", "format", "style"],
        NodeType::Mention => &["mentionName"],
        NodeType::DateTime => &["raw", "resolved"],
        NodeType::Poll => &["question", "options"],
        NodeType::YouTube => &["videoID"],
        NodeType::Root
        | NodeType::Paragraph
        | NodeType::Quote
        | NodeType::LineBreak => &[],
    }
}

fn read<T: DeserializeOwned + Default>(map: &Map<String, Value>, field: &str, node_type: NodeType) -> T {
    read_or(map, field, T::default(), node_type)
}

fn read_or<T: DeserializeOwned>(
    map: &Map<String, Value>,
    field: &str,
    default: T,
    node_type: NodeType,
) -> T {
    match map.get(field) {
        None | Some(Value::Null) => default,
        Some(value) => serde_json::from_value(value.clone()).unwrap_or_else(|err| {
            warn!(node_type = %node_type, field, error = %err, "Defaulting malformed field");
            default
        }),
    }
}

fn read_datetime(map: &Map<String, Value>) -> DateTimeValue {
    let raw: String = read(map, "raw", NodeType::DateTime);
    let resolved = match map.get("resolved") {
        // Explicit null records an input that did not resolve
        Some(Value::Null) => None,
        Some(Value::String(iso)) => DateTime::parse_from_rfc3339(iso)
            .ok()
            .or_else(|| parse_datetime(&raw)),
        _ => parse_datetime(&raw),
    };
    DateTimeValue { raw, resolved }
}

fn read_poll(map: &Map<String, Value>, uids: &mut KeyGenerator) -> Poll {
    let question: String = read(map, "question", NodeType::Poll);

    let options = match map.get("options") {
        Some(Value::Array(options)) => options
            .iter()
            .filter_map(|option| read_poll_option(option, uids))
            .collect(),
        // Older payloads stored options as a JSON-encoded string
        Some(Value::String(encoded)) => match serde_json::from_str::<Vec<Value>>(encoded) {
            Ok(options) => options
                .iter()
                .filter_map(|option| read_poll_option(option, uids))
                .collect(),
            Err(err) => {
                warn!(error = %err, "Dropping unreadable poll options");
                Vec::new()
            }
        },
        _ => Vec::new(),
    };

    Poll { question, options }
}

fn read_poll_option(value: &Value, uids: &mut KeyGenerator) -> Option<PollOption> {
    let map = value.as_object()?;

    let uid = match map.get("uid").and_then(Value::as_str) {
        Some(uid) if !uid.is_empty() => uid.to_string(),
        _ => uids.next_uid(),
    };
    let text = map
        .get("text")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let votes: BTreeSet<String> = match map.get("votes") {
        Some(Value::Array(votes)) => votes
            .iter()
            .filter_map(|vote| match vote {
                Value::String(id) => Some(id.clone()),
                Value::Number(id) => Some(id.to_string()),
                _ => None,
            })
            .collect(),
        _ => BTreeSet::new(),
    };

    Some(PollOption { uid, text, votes })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribution::User;
    use crate::node::{HeadingTag, ListType};
    use chrono::{TimeZone, Utc};

    fn sample_document() -> Document {
        Document::from_nodes(vec![
            Node::heading(HeadingTag::H2, vec![Node::text("Service notes")]),
            Node::paragraph(vec![
                Node::styled_text(
                    "Rear hub",
                    TextFormat::default().with(TextFormat::BOLD),
                    TextStyle::parse("color: #c00;"),
                ),
                Node::text(" needs "),
                Node::mention("Sam"),
                Node::hashtag("overhaul"),
                Node::line_break(),
                Node::datetime("2026-10-20 10:00"),
            ]),
            Node::list(
                ListType::Check,
                vec![
                    Node::checklist_item(true, vec![Node::text("Bleed brakes")]),
                    Node::checklist_item(false, vec![Node::text("True wheel")]),
                ],
            ),
            Node::quote(vec![Node::text("Customer says it clicks")]),
            Node::poll(Poll::new(
                "Replace chain?",
                vec![PollOption::new("a", "Yes"), PollOption::new("b", "No")],
            )),
            Node::youtube("dQw4w9WgXcQ"),
        ])
    }

    #[test]
    fn test_round_trip_preserves_structure() {
        let mut doc = sample_document();
        let poll_key = doc.children()[4].key.clone();
        if let NodeKind::Poll(poll) = &mut doc.find_mut(&poll_key).unwrap().kind {
            poll.toggle_vote("a", "u1");
        }

        let json = serialize(&doc).unwrap();
        let restored = deserialize(&json).unwrap();

        assert!(doc.content_eq(&restored));
        assert_eq!(serialize(&restored).unwrap(), json);
    }

    #[test]
    fn test_wire_shape() {
        let doc = Document::from_nodes(vec![Node::paragraph(vec![Node::text("hi")])]);
        let value = to_value(&doc);

        assert_eq!(value["root"]["type"], "root");
        assert_eq!(value["root"]["children"][0]["type"], "paragraph");
        assert_eq!(value["root"]["children"][0]["children"][0]["text"], "hi");
        assert!(value.get(META_FIELD).is_none());
    }

    #[test]
    fn test_attribution_is_serialized_per_node_and_in_meta() {
        let mut doc = Document::from_nodes(vec![Node::paragraph(vec![Node::text("hi")])]);
        let key = doc.children()[0].key.clone();
        let at = Utc.with_ymd_and_hms(2026, 10, 15, 8, 0, 0).unwrap();
        doc.find_mut(&key).unwrap().attribution =
            Some(AttributionRecord::stamped(User::new("u1", "Dana"), at));

        let value = to_value(&doc);
        assert_eq!(value["root"]["children"][0]["attribution"]["lastEditedBy"]["name"], "Dana");
        assert_eq!(value[META_FIELD]["attributions"][key.as_str()]["lastEditedBy"]["id"], "u1");

        let restored = deserialize(&serde_json::to_string(&value).unwrap()).unwrap();
        assert!(doc.content_eq(&restored));
    }

    #[test]
    fn test_rejects_non_objects() {
        assert!(matches!(deserialize("not json"), Err(DeserializationError::InvalidJson(_))));
        assert!(matches!(deserialize("null"), Err(DeserializationError::NotAnObject("null"))));
        assert!(matches!(deserialize("[1,2]"), Err(DeserializationError::NotAnObject("array"))));
        assert!(!is_canonical("\"text\""));
        assert!(is_canonical("{}"));
    }

    #[test]
    fn test_permissive_shapes_load_with_defaults() {
        let doc = deserialize("{}").unwrap();
        assert!(doc.is_empty());

        let json = r#"{"root":{"children":[
            {"type":"heading","tag":7,"children":[{"type":"text"}]},
            {"type":"paragraph"},
            42,
            {"children":[]},
            {"type":"poll","question":"Q","options":[{"text":"only text"}]}
        ]}}"#;
        let doc = deserialize(json).unwrap();

        assert_eq!(doc.len(), 3);
        match &doc.children()[0].kind {
            NodeKind::Heading { tag, children } => {
                assert_eq!(*tag, HeadingTag::H1);
                assert_eq!(children.len(), 1);
            }
            other => panic!("Expected heading, got {:?}", other),
        }
        match &doc.children()[2].kind {
            NodeKind::Poll(poll) => {
                assert_eq!(poll.options.len(), 1);
                assert!(!poll.options[0].uid.is_empty());
                assert_eq!(poll.options[0].vote_count(), 0);
            }
            other => panic!("Expected poll, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_types_are_kept_verbatim() {
        let json = r#"{"root":{"type":"root","version":1,"children":[{"type":"table","rows":3,"children":[{"type":"text","text":"cell"}]}]}}"#;
        let doc = deserialize(json).unwrap();

        assert_eq!(doc.children()[0].type_name(), "table");
        let value = to_value(&doc);
        assert_eq!(value["root"]["children"][0]["rows"], 3);
        assert_eq!(value["root"]["children"][0]["children"][0]["text"], "cell");
    }

    #[test]
    fn test_unknown_type_keeps_attribution() {
        let json = r#"{"root":{"children":[{"type":"table","attribution":{"lastEditedBy":{"id":"u9","name":"Ivo"},"lastEditedAt":"2026-10-01T08:00:00.000Z"}}]}}"#;
        let doc = deserialize(json).unwrap();
        let value = to_value(&doc);

        assert_eq!(value["root"]["children"][0]["attribution"]["lastEditedBy"]["name"], "Ivo");
    }

    #[test]
    fn test_unmodelled_fields_are_written_back() {
        let json = r#"{"root":{"children":[
            {"type":"paragraph","format":"center","indent":2,"direction":"ltr","children":[
                {"type":"text","text":"Centered","detail":0,"mode":"normal"}
            ]}
        ]}}"#;
        let doc = deserialize(json).unwrap();

        let paragraph = &doc.children()[0];
        assert_eq!(paragraph.extra.get("format"), Some(&json!("center")));
        assert_eq!(paragraph.extra.get("indent"), Some(&json!(2)));
        assert!(!paragraph.extra.contains_key("children"));
        let text = &paragraph.children().unwrap()[0];
        assert!(!text.extra.contains_key("text"));
        assert_eq!(text.extra.get("mode"), Some(&json!("normal")));

        let value = to_value(&doc);
        assert_eq!(value["root"]["children"][0]["format"], "center");
        assert_eq!(value["root"]["children"][0]["indent"], 2);
        assert_eq!(value["root"]["children"][0]["children"][0]["detail"], 0);
    }

    #[test]
    fn test_datetime_resolution_survives() {
        let doc = Document::from_nodes(vec![Node::paragraph(vec![
            Node::datetime("2026-10-20"),
            Node::datetime("whenever"),
        ])]);
        let restored = deserialize(&serialize(&doc).unwrap()).unwrap();

        let leaves = restored.children()[0].children().unwrap();
        match (&leaves[0].kind, &leaves[1].kind) {
            (NodeKind::DateTime(resolved), NodeKind::DateTime(unresolved)) => {
                assert_eq!(resolved.resolved_iso().as_deref(), Some("2026-10-20T00:00:00.000Z"));
                assert!(unresolved.resolved.is_none());
                assert_eq!(unresolved.raw, "whenever");
            }
            other => panic!("Expected datetimes, got {:?}", other),
        }
    }
}

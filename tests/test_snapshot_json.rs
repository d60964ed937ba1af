//! Tests for converting JSON document snapshots, the input of the
//! `struct_to_html` binary.

use tagged_pdf_html::document::{ObjectModelProvider, SnapshotDocument};
use tagged_pdf_html::{render, ConversionOptions, Error};

const TWO_PAGE_SNAPSHOT: &str = r#"{
  "structure": {
    "elements": [
      {"struct_type": "Document", "children": [{"Element": 1}, {"Element": 2}, {"Element": 3}]},
      {"struct_type": "Heading", "page": 0, "children": [{"MarkedContent": {"mcid": 0}}]},
      {"struct_type": "P", "page": 0, "children": [{"MarkedContent": {"mcid": 1}}]},
      {"struct_type": "P", "page": 1, "id": "second",
       "attributes": [{"owner": "Layout", "entries": {"TextAlign": {"Name": "Center"}}}],
       "children": [{"MarkedContent": {"mcid": 0}}]}
    ],
    "root_children": [{"Element": 0}],
    "role_map": {"Heading": "H1"}
  },
  "pages": [
    {"operators": [
      "BeginText",
      {"BeginMarkedContentDict": {"tag": "H1", "properties": {"Dictionary": {"MCID": {"Integer": 0}}}}},
      {"ShowText": {"text": "Title"}},
      "EndMarkedContent",
      {"BeginMarkedContentDict": {"tag": "P", "properties": {"Dictionary": {"MCID": {"Integer": 1}}}}},
      {"ShowText": {"text": "First page"}},
      "EndMarkedContent",
      "EndText"
    ]},
    {"operators": [
      {"BeginMarkedContentDict": {"tag": "P", "properties": {"Dictionary": {"MCID": {"Integer": 0}}}}},
      {"ShowText": {"text": "Second page"}},
      "EndMarkedContent"
    ]}
  ]
}"#;

#[test]
fn test_snapshot_renders_across_pages() {
    let doc = SnapshotDocument::from_json(TWO_PAGE_SNAPSHOT).unwrap();
    assert!(doc.structure_tree().is_some());
    assert_eq!(doc.pages.len(), 2);

    let out = render(&doc, &ConversionOptions::default()).unwrap();
    assert_eq!(
        out.body,
        "<div data-pdf-se-type=\"Document\">\
         <h1 id=\"pdf-se-1\" data-pdf-se-type=\"H1\" data-pdf-se-type-original=\"Heading\">Title</h1>\
         <p id=\"pdf-se-2\" data-pdf-se-type=\"P\">First page</p>\
         <p id=\"second\" style=\"text-align: center\" data-pdf-se-type=\"P\">Second page</p>\
         </div>"
    );
}

#[test]
fn test_snapshot_content_index() {
    let doc = SnapshotDocument::from_json(TWO_PAGE_SNAPSHOT).unwrap();
    let out = render(&doc, &ConversionOptions::default()).unwrap();

    let ids: Vec<&str> = out.content_index.keys().map(String::as_str).collect();
    assert_eq!(ids, vec!["pdf-se-1", "pdf-se-2", "second"]);
    assert_eq!(out.content_index["second"][0].page, 1);

    let json: serde_json::Value = serde_json::to_value(&out.content_index).unwrap();
    assert_eq!(json["pdf-se-2"][0]["mcid"], 1);
}

#[test]
fn test_snapshot_without_structure() {
    let doc = SnapshotDocument::from_json(r#"{"pages": [{"operators": []}]}"#).unwrap();
    assert!(matches!(render(&doc, &ConversionOptions::default()), Err(Error::NotTagged)));
}

#[test]
fn test_malformed_snapshot_is_an_error() {
    assert!(SnapshotDocument::from_json("{\"structure\": 3}").is_err());
    assert!(SnapshotDocument::open("/nonexistent/snapshot.json").is_err());
}

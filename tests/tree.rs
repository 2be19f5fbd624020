use keyvalues::{Color, Document, Indent, Value, WriteOptions};
use rstest::rstest;

const SAMPLE: &str = r#"// light entity
entity
{
	"id" "7"
	"classname" "light"
	"_light" "255 200 40 300"
	"origin" "128 -64 16"
	connections
	{
		"OnTrigger" "door,Open,,0,-1"
		"OnTrigger" "door,Close,,5,-1"
	}
	editor { }
}
"#;

#[rstest]
fn written_tree_reparses_to_same_structure() {
    let doc = keyvalues::parse(SAMPLE).unwrap();
    let text = keyvalues::to_string(&doc, doc.root());
    let reparsed = keyvalues::parse(&text).unwrap();

    let keys = |doc: &Document| -> Vec<(String, Option<String>)> {
        doc.descendants(doc.root())
            .map(|id| {
                let node = &doc[id];
                (
                    node.key().to_string(),
                    node.value().map(|value| value.to_kv_string().into_owned()),
                )
            })
            .collect()
    };
    assert_eq!(keys(&doc), keys(&reparsed));
    assert_eq!(keyvalues::to_string(&reparsed, reparsed.root()), text);
}

#[rstest]
fn tree_json_view_equals_transcoder_output() {
    let doc = keyvalues::parse(SAMPLE).unwrap();
    let from_tree = keyvalues::to_json_value(&doc, doc.root());
    let from_bytes = keyvalues::json_from_key_values(SAMPLE.as_bytes()).unwrap();
    assert_eq!(from_tree, from_bytes);

    let serialized = serde_json::to_vec(&keyvalues::NodeRef::new(&doc, doc.root())).unwrap();
    assert_eq!(serialized, keyvalues::key_values_to_json(SAMPLE.as_bytes()));
}

#[rstest]
fn typed_values_are_read_from_strings() {
    let doc = keyvalues::parse(SAMPLE).unwrap();
    let entity = doc.find_child(doc.root(), "entity").unwrap();

    let id = doc.find_child(entity, "id").unwrap();
    assert_eq!(doc[id].to_int(), Some(7));
    assert_eq!(doc[id].to_float(), Some(7.0));

    let light = doc.find_child(entity, "_light").unwrap();
    assert_eq!(doc[light].to_color(), None);

    let classname = doc.find_child(entity, "classname").unwrap();
    assert_eq!(doc[classname].to_int(), None);
}

#[rstest]
fn edits_are_reflected_in_output() {
    let mut doc = keyvalues::parse(SAMPLE).unwrap();
    let entity = doc.find_child(doc.root(), "entity").unwrap();

    let classname = doc.find_child(entity, "classname").unwrap();
    let node = doc.get_mut(classname).unwrap();
    assert!(node.set_value("light_spot"));
    assert!(!node.set_value("light_spot"));
    assert!(!node.set_key("  classname  "));

    let connections = doc.find_child(entity, "connections").unwrap();
    assert!(doc.remove(connections));
    assert!(!doc.contains(connections));
    assert_eq!(doc.find_child(entity, "connections"), None);

    doc.add_leaf(entity, "rendercolor", Color::rgb(10, 20, 30)).unwrap();
    doc.add_leaf(entity, "brightness", Value::Float(1.5)).unwrap();

    let options = WriteOptions::new()
        .with_indent(Indent::Spaces(1))
        .with_write_comments(false);
    let text = keyvalues::to_string_with_options(&doc, doc.root(), &options);
    assert_eq!(
        text,
        concat!(
            "\"entity\"\n{\n",
            " \"id\" \"7\"\n",
            " \"classname\" \"light_spot\"\n",
            " \"_light\" \"255 200 40 300\"\n",
            " \"origin\" \"128 -64 16\"\n",
            " \"editor\"\n {\n }\n",
            " \"rendercolor\" \"10 20 30\"\n",
            " \"brightness\" \"1.5\"\n",
            "}\n",
        )
    );
}

#[rstest]
fn parse_into_appends_below_existing_nodes() {
    let mut doc = keyvalues::parse(r#"cameras { activecamera "-1" }"#).unwrap();
    let cameras = doc.find_child(doc.root(), "cameras").unwrap();
    keyvalues::parse_into("camera { position \"[0 0 0]\" }", &mut doc, cameras).unwrap();
    assert_eq!(doc.children(cameras).len(), 2);

    let before = doc.len();
    let err = keyvalues::parse_into("camera {", &mut doc, cameras).unwrap_err();
    assert_eq!(err.kind, keyvalues::ErrorKind::UnmatchedBrace);
    assert_eq!(doc.len(), before);
    assert_eq!(doc.children(cameras).len(), 2);
}

#[rstest]
fn writer_output_goes_to_io() {
    let doc = keyvalues::parse("a { b c }").unwrap();
    let mut out = Vec::new();
    keyvalues::to_writer(&mut out, &doc, doc.root()).unwrap();
    assert_eq!(out, keyvalues::to_vec(&doc, doc.root()));
    assert_eq!(out, b"\"a\"\n{\n\t\"b\" \"c\"\n}\n");
}

use keyvalues::{ErrorKind, ErrorStage, ParseOptions, Parser, Value};
use rstest::rstest;

const MAP: &str = r#"// exported by hammer
versioninfo
{
	"editorversion" "400"
	"mapversion" "12"
}
world
{
	"id" "1"
	"classname" "worldspawn"
	solid
	{
		"id" "2"
		side { "id" "3" "plane" "(0 0 0) (1 0 0) (0 1 0)" }
		side { "id" "4" "plane" "(0 0 1) (1 0 1) (0 1 1)" }
	}
}
"#;

#[rstest]
fn parses_a_map_file() {
    let doc = keyvalues::parse(MAP).unwrap();
    let root = doc.root();
    assert_eq!(doc.children(root).len(), 2);

    let info = doc.find_child(root, "versioninfo").unwrap();
    assert_eq!(doc[info].comment(), Some(" exported by hammer"));
    let version = doc.find_child(info, "mapversion").unwrap();
    assert_eq!(doc[version].to_int(), Some(12));

    let world = doc.find_child(root, "world").unwrap();
    let solid = doc.find_child(world, "solid").unwrap();
    let sides: Vec<_> = doc
        .children(solid)
        .iter()
        .filter(|id| doc[**id].key() == "side")
        .collect();
    assert_eq!(sides.len(), 2);
    let plane = doc.find_child(*sides[1], "plane").unwrap();
    assert_eq!(
        doc[plane].value().and_then(Value::as_str),
        Some("(0 0 1) (1 0 1) (0 1 1)")
    );
}

#[rstest]
#[case("key {", ErrorKind::UnmatchedBrace)]
#[case("a { b { c d }", ErrorKind::UnmatchedBrace)]
#[case("a { } }", ErrorKind::StackUnderflow)]
#[case("}", ErrorKind::StackUnderflow)]
#[case("{", ErrorKind::UnnamedNode)]
#[case("a 1 { }", ErrorKind::UnnamedNode)]
#[case("key }", ErrorKind::IncompleteNode)]
#[case("a 1 b", ErrorKind::IncompleteNode)]
#[case("", ErrorKind::NoContent)]
#[case("// nothing here", ErrorKind::NoContent)]
#[case("a \"open", ErrorKind::InvalidToken)]
#[case("a ;", ErrorKind::InvalidToken)]
fn rejects_malformed_documents(#[case] input: &str, #[case] kind: ErrorKind) {
    let err = keyvalues::parse(input).unwrap_err();
    assert_eq!(err.kind, kind);
    assert_eq!(err.stage, ErrorStage::Parse);
    assert!(err.location.is_some());
    assert!(!err.description().is_empty());
}

#[rstest]
fn quoted_escapes_are_resolved() {
    let doc = keyvalues::parse(r#""a" "line\nbreak" "b" "say \"hi\"" "c" "tab\there""#).unwrap();
    let root = doc.root();
    let value = |key: &str| {
        let id = doc.find_child(root, key).unwrap();
        doc[id].value().and_then(Value::as_str).map(str::to_string)
    };
    assert_eq!(value("a").as_deref(), Some("line\nbreak"));
    assert_eq!(value("b").as_deref(), Some("say \"hi\""));
    assert_eq!(value("c").as_deref(), Some("tab\there"));
}

#[rstest]
fn unquoted_and_quoted_tokens_mix() {
    let doc = keyvalues::parse("key \"quoted value\"\n\"quoted key\" bare_1").unwrap();
    let root = doc.root();
    let key = doc.find_child(root, "key").unwrap();
    assert_eq!(doc[key].value().and_then(Value::as_str), Some("quoted value"));
    let quoted = doc.find_child(root, "quoted key").unwrap();
    assert_eq!(doc[quoted].value().and_then(Value::as_str), Some("bare_1"));
}

#[rstest]
fn error_codes_and_titles_are_exposed() {
    let mut parser = Parser::new();
    let mut doc = keyvalues::Document::new();
    let root = doc.root();
    let err = parser.parse("key {", &mut doc, root).unwrap_err();
    assert_eq!(err.code(), ErrorKind::UnmatchedBrace.code());
    assert_eq!(err.title(), ErrorKind::UnmatchedBrace.title());
    assert_eq!(parser.last_error(), Some(&err));
    assert_eq!(err.line(), Some(1));
    assert_eq!(err.column(), Some(5));
}

#[rstest]
fn error_line_counts_crlf_input() {
    let err = keyvalues::parse("a 1\r\nb 2\r\nc {\r\n").unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnmatchedBrace);
    assert_eq!(err.line(), Some(4));
}

#[rstest]
fn byte_input_matches_text_input() {
    let from_bytes = keyvalues::from_slice(MAP.as_bytes()).unwrap();
    let from_reader = keyvalues::from_reader(MAP.as_bytes()).unwrap();
    let from_text = keyvalues::parse(MAP).unwrap();
    assert_eq!(
        keyvalues::to_string(&from_bytes, from_bytes.root()),
        keyvalues::to_string(&from_text, from_text.root())
    );
    assert_eq!(
        keyvalues::to_string(&from_reader, from_reader.root()),
        keyvalues::to_string(&from_text, from_text.root())
    );
}

#[rstest]
fn comments_can_be_ignored() {
    let options = ParseOptions::new().with_parse_comments(false);
    let doc = keyvalues::parse_with_options(MAP, &options).unwrap();
    let info = doc.find_child(doc.root(), "versioninfo").unwrap();
    assert_eq!(doc[info].comment(), None);
}

pub mod json;
pub(crate) mod writer;

use std::io::Write;

use crate::arena::{Document, NodeId};
use crate::{Error, ErrorStage, Result, WriteOptions};

use self::writer::Writer;

pub use self::json::{to_json_value, NodeRef};

/// Renders the children of `node` as KeyValues text.
pub fn to_string(document: &Document, node: NodeId, options: &WriteOptions) -> String {
    let mut writer = Writer::new(options.clone());
    write_children(&mut writer, document, node, 0);
    writer.finish()
}

pub fn to_vec(document: &Document, node: NodeId, options: &WriteOptions) -> Vec<u8> {
    to_string(document, node, options).into_bytes()
}

pub fn to_writer<W: Write>(
    mut writer: W,
    document: &Document,
    node: NodeId,
    options: &WriteOptions,
) -> Result<()> {
    let text = to_string(document, node, options);
    writer
        .write_all(text.as_bytes())
        .map_err(|err| Error::io(format!("write failed: {err}")).with_stage(ErrorStage::Write))
}

fn write_children(writer: &mut Writer, document: &Document, node: NodeId, depth: usize) {
    for &child in document.children(node) {
        let Some(entry) = document.get(child) else {
            continue;
        };
        if let Some(comment) = entry.comment() {
            writer.write_comment(comment, depth);
        }
        writer.write_key(entry.key(), depth);
        match entry.value() {
            // Children take precedence over a value set by hand on a container.
            Some(value) if !entry.is_container() => writer.write_value(&value.to_kv_string()),
            _ => {
                writer.open_container(depth);
                write_children(writer, document, child, depth + 1);
                writer.close_container(depth);
            }
        }
    }
}

pub mod arena;
pub mod constants;
pub mod decode;
pub mod encode;
pub mod error;
pub mod num;
pub mod options;
pub mod text;
pub mod transcode;
pub mod value;

use std::io::{Read, Write};

pub use crate::arena::{Descendants, Document, Node, NodeId};
pub use crate::decode::progress::{NoProgress, ParseControl, ProgressSink};
pub use crate::decode::Parser;
pub use crate::encode::{to_json_value, NodeRef};
pub use crate::error::{Error, ErrorKind, ErrorStage, Location};
pub use crate::options::{Indent, ParseOptions, WriteOptions};
pub use crate::transcode::{
    json_from_key_values, json_to_key_values, json_to_key_values_with_options,
    key_values_to_json, strip_disambiguation_prefix,
};
pub use crate::value::{Color, Value};

pub type Result<T> = std::result::Result<T, Error>;

pub fn parse(input: &str) -> Result<Document> {
    parse_with_options(input, &ParseOptions::default())
}

pub fn parse_with_options(input: &str, options: &ParseOptions) -> Result<Document> {
    decode::from_str(input, options)
}

/// Parses `input` into an existing container of `document`.
pub fn parse_into(input: &str, document: &mut Document, container: NodeId) -> Result<()> {
    decode::parse_into(input, document, container, &ParseOptions::default())
}

pub fn from_slice(input: &[u8]) -> Result<Document> {
    decode::from_slice(input, &ParseOptions::default())
}

pub fn from_reader<R: Read>(reader: R) -> Result<Document> {
    decode::from_reader(reader, &ParseOptions::default())
}

pub fn to_string(document: &Document, node: NodeId) -> String {
    to_string_with_options(document, node, &WriteOptions::default())
}

pub fn to_string_with_options(document: &Document, node: NodeId, options: &WriteOptions) -> String {
    encode::to_string(document, node, options)
}

pub fn to_vec(document: &Document, node: NodeId) -> Vec<u8> {
    encode::to_vec(document, node, &WriteOptions::default())
}

pub fn to_writer<W: Write>(writer: W, document: &Document, node: NodeId) -> Result<()> {
    to_writer_with_options(writer, document, node, &WriteOptions::default())
}

pub fn to_writer_with_options<W: Write>(
    writer: W,
    document: &Document,
    node: NodeId,
    options: &WriteOptions,
) -> Result<()> {
    encode::to_writer(writer, document, node, options)
}

//! On-disk snapshot of one revision's nodes
//!
//! Layout: `b"CGDG"` magic, `u32` format version, then the node collection.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use super::codec::{GraphDataInput, GraphDataOutput};
use super::externalizable::{read_nodes, write_nodes};
use crate::errors::{DepGraphError, Result};
use crate::features::node::Node;

const MAGIC: &[u8; 4] = b"CGDG";
pub const FORMAT_VERSION: u32 = 1;

pub fn write_graph<'n, W: Write>(
    writer: W,
    nodes: impl IntoIterator<Item = &'n Node>,
) -> Result<W> {
    let mut out = GraphDataOutput::new(writer);
    for byte in MAGIC {
        out.write_u8(*byte)?;
    }
    out.write_u32(FORMAT_VERSION)?;
    write_nodes(&mut out, nodes)?;
    out.flush()?;
    Ok(out.into_inner())
}

pub fn read_graph<R: Read>(reader: R) -> Result<Vec<Node>> {
    let mut input = GraphDataInput::new(reader);
    let mut magic = [0u8; 4];
    for byte in magic.iter_mut() {
        *byte = input.read_u8()?;
    }
    if &magic != MAGIC {
        return Err(DepGraphError::decode("not a dependency graph file"));
    }
    let version = input.read_u32()?;
    if version != FORMAT_VERSION {
        return Err(DepGraphError::decode(format!(
            "unsupported graph format version {version} (expected {FORMAT_VERSION})"
        )));
    }
    read_nodes(&mut input)
}

pub fn save_graph<'n>(path: impl AsRef<Path>, nodes: impl IntoIterator<Item = &'n Node>) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    write_graph(BufWriter::new(file), nodes)?;
    tracing::debug!(path = %path.display(), "graph saved");
    Ok(())
}

pub fn load_graph(path: impl AsRef<Path>) -> Result<Vec<Node>> {
    let path = path.as_ref();
    let nodes = read_graph(BufReader::new(File::open(path)?))?;
    tracing::debug!(path = %path.display(), nodes = nodes.len(), "graph loaded");
    Ok(nodes)
}

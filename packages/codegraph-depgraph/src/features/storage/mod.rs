//! Persistence of graph entities
//!
//! `codec` holds the binary primitives, `externalizable` the per-entity
//! read/write contract, `graph_file` whole-revision snapshots.

mod codec;
mod externalizable;
mod graph_file;

pub use codec::{GraphDataInput, GraphDataOutput};
pub use externalizable::{read_nodes, read_usages, write_nodes, write_usages, Externalizable};
pub use graph_file::{load_graph, read_graph, save_graph, write_graph, FORMAT_VERSION};

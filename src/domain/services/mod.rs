//! Domain Services
//!
//! Pure logic over the node store. No I/O.

mod forest_codec;
mod tree_builder;
mod view_projector;

pub use forest_codec::{
    decode, encode, RestoredForest, SerializedForest, SerializedNode, SerializedWindow,
    SNAPSHOT_VERSION,
};
pub use tree_builder::{BuildReport, BuildStats, TreeBuilder};
pub use view_projector::{SearchQuery, ViewProjector, VisibleNode};

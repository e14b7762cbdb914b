pub mod coord;
pub mod coordinates;
pub mod dispatch;
pub mod document;
pub mod error;
pub mod format;
pub mod legacy;
pub mod model;
pub mod parser;
pub mod tree;
pub mod writer;

pub use coord::CoordCodec;
pub use coordinates::CoordinatesCodec;
pub use dispatch::{read_all_blindly, read_all_from_geometry, write_all_to_geometry};
pub use document::{Document, NodeId};
pub use error::{CodecError, XmlError};
pub use format::DelimitedTextFormat;
#[allow(deprecated)]
pub use legacy::Coordinates;
pub use model::{LiveView, Tuple, TupleStore};
pub use parser::{parse_document, parse_str};
pub use tree::{ElementTree, GML_NAMESPACE, UNBOUNDED};
pub use writer::XmlWriter;

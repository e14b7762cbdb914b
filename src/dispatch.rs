//! Picks the coordinate encoding a geometry element uses.

use tracing::{debug, warn};

use crate::coord::CoordCodec;
use crate::coordinates::CoordinatesCodec;
use crate::error::{CodecError, Result};
use crate::format::DelimitedTextFormat;
use crate::model::TupleStore;
use crate::tree::{ElementTree, COORD, COORDINATES};

fn first_gml_child<T: ElementTree>(tree: &T, element: T::Node, local: &str) -> Option<T::Node> {
    tree.child_elements(element)
        .into_iter()
        .find(|&n| tree.is_gml_element(n, local))
}

fn no_coordinates<T: ElementTree>(tree: &T, geometry: T::Node) -> CodecError {
    let name = tree.local_name(geometry).unwrap_or("#text").to_string();
    warn!("No gml:coordinates or gml:coord under <{}>", name);
    CodecError::NoRecognizableCoordinates(name)
}

/// Reads the coordinates of `geometry` from its direct `gml:coordinates`
/// child, or failing that from the run of direct `gml:coord` children.
pub fn read_all_from_geometry<T: ElementTree>(
    tree: &T,
    geometry: T::Node,
    store: &mut TupleStore,
) -> Result<usize> {
    if let Some(coordinates) = first_gml_child(tree, geometry, COORDINATES) {
        return CoordinatesCodec::default().read(tree, coordinates, store);
    }
    if let Some(coord) = first_gml_child(tree, geometry, COORD) {
        return CoordCodec::new().read_all(tree, coord, store);
    }
    Err(no_coordinates(tree, geometry))
}

/// Reads every `gml:coordinates` element and every `gml:coord` run anywhere
/// below `root`, in that order.
///
/// A run is started only at a `gml:coord` whose parent differs from the
/// parent of the previous `gml:coord`, so siblings already consumed by a run
/// are not read twice. The first failing element aborts the scan.
pub fn read_all_blindly<T: ElementTree>(
    tree: &T,
    root: T::Node,
    store: &mut TupleStore,
) -> Result<usize> {
    let descendants = tree.descendants(root);
    let mut read = 0;

    let coordinates_codec = CoordinatesCodec::default();
    for &node in descendants
        .iter()
        .filter(|&&n| tree.is_gml_element(n, COORDINATES))
    {
        read += coordinates_codec.read(tree, node, store)?;
    }

    let coord_codec = CoordCodec::new();
    let mut last_parent = None;
    for &node in descendants.iter().filter(|&&n| tree.is_gml_element(n, COORD)) {
        let parent = tree.parent(node);
        if parent != last_parent {
            read += coord_codec.read_all(tree, node, store)?;
        }
        last_parent = parent;
    }

    debug!("Blind scan read {} tuples", read);
    Ok(read)
}

/// Writes every tuple of `store` into whichever encoding `geometry` already
/// carries: its direct `gml:coordinates` child, or its `gml:coord` run.
pub fn write_all_to_geometry<T: ElementTree>(
    tree: &mut T,
    store: &TupleStore,
    geometry: T::Node,
    format: DelimitedTextFormat,
) -> Result<()> {
    if let Some(coordinates) = first_gml_child(tree, geometry, COORDINATES) {
        return CoordinatesCodec::new(format).write(tree, store, coordinates);
    }
    if let Some(coord) = first_gml_child(tree, geometry, COORD) {
        return CoordCodec::with_format(format).write_range(tree, store, 0, store.count(), coord);
    }
    Err(no_coordinates(tree, geometry))
}

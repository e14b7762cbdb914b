//! Single-type API kept for callers of the older coordinate reader.
#![allow(deprecated)]

use crate::coord::CoordCodec;
use crate::coordinates::CoordinatesCodec;
use crate::dispatch;
use crate::error::Result;
use crate::format::DelimitedTextFormat;
use crate::model::TupleStore;
use crate::tree::{ElementTree, COORD, COORDINATES};

/// Tuples plus the text format used to write them back.
#[deprecated(note = "use CoordCodec, CoordinatesCodec and the dispatch functions")]
#[derive(Debug, Clone, Default)]
pub struct Coordinates {
    store: TupleStore,
    format: DelimitedTextFormat,
}

impl Coordinates {
    pub fn new(format: DelimitedTextFormat) -> Self {
        Self {
            store: TupleStore::new(),
            format,
        }
    }

    /// Limits the fractional digits written per coordinate.
    pub fn set_max_decimal_digits(&mut self, digits: Option<usize>) {
        self.format.set_max_decimal_digits(digits);
    }

    pub fn store(&self) -> &TupleStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut TupleStore {
        &mut self.store
    }

    pub fn into_store(self) -> TupleStore {
        self.store
    }

    /// Reads `element`, which may be a `gml:coordinates` element, the first
    /// `gml:coord` of a run, or any geometry holding one of them. The
    /// dimension is whatever the first tuple carries.
    pub fn scan<T: ElementTree>(&mut self, tree: &T, element: T::Node) -> Result<usize> {
        if tree.is_gml_element(element, COORDINATES) {
            CoordinatesCodec::default().read(tree, element, &mut self.store)
        } else if tree.is_gml_element(element, COORD) {
            CoordCodec::new().read_all(tree, element, &mut self.store)
        } else {
            dispatch::read_all_from_geometry(tree, element, &mut self.store)
        }
    }

    /// Writes the held tuples into `element`, chosen the same way as
    /// [`Coordinates::scan`].
    pub fn write<T: ElementTree>(&self, tree: &mut T, element: T::Node) -> Result<()> {
        if tree.is_gml_element(element, COORDINATES) {
            CoordinatesCodec::new(self.format).write(tree, &self.store, element)
        } else if tree.is_gml_element(element, COORD) {
            CoordCodec::with_format(self.format).write_range(
                tree,
                &self.store,
                0,
                self.store.count(),
                element,
            )
        } else {
            dispatch::write_all_to_geometry(tree, &self.store, element, self.format)
        }
    }
}

//! Element-per-axis encoding.
//!
//! ```xml
//! <gml:coord><gml:X>1.0</gml:X><gml:Y>2.0</gml:Y></gml:coord>
//! <gml:coord><gml:X>3.0</gml:X><gml:Y>4.0</gml:Y></gml:coord>
//! ```
//!
//! Consecutive `gml:coord` siblings form a run sharing one dimension.

use tracing::{debug, trace};

use crate::error::{CodecError, Result};
use crate::format::DelimitedTextFormat;
use crate::model::{Tuple, TupleStore};
use crate::tree::{ElementTree, AXES, COORD, UNBOUNDED};

#[derive(Debug, Clone, Copy, Default)]
pub struct CoordCodec {
    format: DelimitedTextFormat,
}

fn describe<T: ElementTree>(tree: &T, node: T::Node) -> String {
    match (tree.namespace_uri(node), tree.local_name(node)) {
        (Some(ns), Some(local)) => format!("{{{}}}{}", ns, local),
        (None, Some(local)) => local.to_string(),
        _ => "#text".to_string(),
    }
}

/// Next `gml:coord` sibling. Stops at the first element that is not one.
fn next_coord<T: ElementTree>(tree: &T, node: T::Node) -> Option<T::Node> {
    tree.next_element_sibling(node)
        .filter(|&n| tree.is_gml_element(n, COORD))
}

impl CoordCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Codec whose writes render numbers through `format` (only the digit cap
    /// matters here, separators do not apply to this encoding).
    pub fn with_format(format: DelimitedTextFormat) -> Self {
        Self { format }
    }

    /// Reads one `gml:coord` element into a tuple.
    pub fn read_one<T: ElementTree>(&self, tree: &T, element: T::Node) -> Result<Tuple> {
        self.read_tuple(tree, element, 0)
    }

    /// `index` is the position of `element` in its run, used in error reports.
    fn read_tuple<T: ElementTree>(
        &self,
        tree: &T,
        element: T::Node,
        index: usize,
    ) -> Result<Tuple> {
        let mut tuple = Vec::with_capacity(AXES.len());
        for child in tree.child_elements(element) {
            let axis = tuple.len();
            let Some(&expected) = AXES.get(axis) else {
                return Err(CodecError::TooManyCoordinates {
                    index,
                    expected: AXES.len(),
                    actual: tree.child_elements(element).len(),
                });
            };
            if !tree.is_gml_element(child, expected) {
                return Err(CodecError::MalformedCoord(format!(
                    "child {} is {}, expected gml:{}",
                    axis,
                    describe(tree, child),
                    expected
                )));
            }
            let text = tree.text_content(child);
            let value = text.trim().parse::<f64>().map_err(|_| {
                CodecError::MalformedCoord(format!(
                    "gml:{} holds '{}', which is not a number",
                    expected,
                    text.trim()
                ))
            })?;
            tuple.push(value);
        }
        if tuple.is_empty() {
            return Err(CodecError::MalformedCoord(
                "gml:coord has no gml:X child".to_string(),
            ));
        }
        trace!("read gml:coord {:?}", tuple);
        Ok(tuple)
    }

    /// Reads up to `max_count` tuples starting at `first` and following its
    /// `gml:coord` siblings. Returns the number of tuples read.
    ///
    /// Tuples are appended to `store` as they are read, so a failure leaves
    /// the tuples preceding the bad element in place.
    pub fn read_run<T: ElementTree>(
        &self,
        tree: &T,
        first: T::Node,
        max_count: usize,
        store: &mut TupleStore,
    ) -> Result<usize> {
        if max_count < 1 {
            return Err(CodecError::InvalidArgument(format!(
                "run length must be at least 1, got {}",
                max_count
            )));
        }

        let head = self.read_one(tree, first)?;
        let dimension = head.len();
        store.seed_or_append(vec![head])?;
        let mut read = 1;

        let mut current = first;
        while read < max_count {
            let Some(next) = next_coord(tree, current) else {
                break;
            };
            let tuple = self.read_tuple(tree, next, read)?;
            if tuple.len() != dimension {
                return Err(CodecError::DimensionMismatch {
                    expected: dimension,
                    actual: tuple.len(),
                });
            }
            store.live_view().push(tuple);
            read += 1;
            current = next;
        }

        debug!("read {} gml:coord tuples of dimension {}", read, dimension);
        Ok(read)
    }

    /// [`CoordCodec::read_run`] without a length limit.
    pub fn read_all<T: ElementTree>(
        &self,
        tree: &T,
        first: T::Node,
        store: &mut TupleStore,
    ) -> Result<usize> {
        self.read_run(tree, first, UNBOUNDED, store)
    }

    /// Overwrites the text of the existing axis children of `element`.
    pub fn write_one<T: ElementTree>(
        &self,
        tree: &mut T,
        tuple: &[f64],
        element: T::Node,
    ) -> Result<()> {
        let children = tree.child_elements(element);
        if children.len() < tuple.len() {
            return Err(CodecError::InsufficientChildren {
                needed: tuple.len(),
                found: children.len(),
            });
        }
        for (i, (&value, &child)) in tuple.iter().zip(children.iter()).enumerate() {
            let expected = AXES[i];
            if tree.local_name(child) != Some(expected) {
                return Err(CodecError::UnexpectedChild {
                    expected,
                    found: describe(tree, child),
                });
            }
            tree.clear_children(child);
            tree.append_text(child, &self.format.canonical_number(value));
        }
        Ok(())
    }

    /// Writes tuples `[start, end)` of `store` into `first` and the
    /// `gml:coord` siblings following it.
    pub fn write_range<T: ElementTree>(
        &self,
        tree: &mut T,
        store: &TupleStore,
        start: usize,
        end: usize,
        first: T::Node,
    ) -> Result<()> {
        let dimension = store.dimension().unwrap_or(0);
        if dimension == 0 || dimension > AXES.len() {
            return Err(CodecError::InvalidDimension(dimension));
        }
        if start > end {
            return Err(CodecError::InvalidArgument(format!(
                "range start {} is past its end {}",
                start, end
            )));
        }
        if store.count() < end {
            return Err(CodecError::InsufficientSource {
                requested: end,
                available: store.count(),
            });
        }

        let tuples = store.sequential_access_view(true);
        let mut target = Some(first);
        for (written, tuple) in tuples[start..end].iter().enumerate() {
            let Some(element) = target else {
                return Err(CodecError::InsufficientTargetElements {
                    written,
                    requested: end - start,
                });
            };
            self.write_one(tree, tuple, element)?;
            target = next_coord(tree, element);
        }

        debug!("wrote {} tuples into gml:coord elements", end - start);
        Ok(())
    }
}

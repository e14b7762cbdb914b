//! Delimited-text encoding.
//!
//! ```xml
//! <gml:coordinates cs="," ts=" " decimal=".">1.0,2.0 3.0,4.0</gml:coordinates>
//! ```
//!
//! Tuples are split on `ts` (a newline always separates tuples as well),
//! coordinates on `cs`, and `decimal` stands in for the decimal point.

use tracing::{debug, trace};

use crate::error::{CodecError, Result};
use crate::format::{
    DelimitedTextFormat, DEFAULT_COORDINATE_SEPARATOR, DEFAULT_DECIMAL, DEFAULT_TUPLE_SEPARATOR,
};
use crate::model::{Tuple, TupleStore};
use crate::tree::{ElementTree, ATTR_CS, ATTR_DECIMAL, ATTR_TS};

#[derive(Debug, Clone, Copy, Default)]
pub struct CoordinatesCodec {
    format: DelimitedTextFormat,
}

/// Coordinates of one tuple token. Empty parts are kept so that `1,,2` fails,
/// except that a run of whitespace `cs` counts as one separator.
fn parts(token: &str, cs: char) -> impl Iterator<Item = &str> {
    let collapse = cs.is_whitespace();
    token
        .split(cs)
        .map(str::trim)
        .filter(move |p| !(collapse && p.is_empty()))
}

fn parse_parts(token: &str, format: &DelimitedTextFormat) -> Result<Tuple> {
    parts(token, format.coordinate_separator())
        .map(|p| format.parse_number(p))
        .collect()
}

fn parse_tuple(
    token: &str,
    format: &DelimitedTextFormat,
    index: usize,
    dimension: usize,
) -> Result<Tuple> {
    let tuple = parse_parts(token, format)?;
    if tuple.len() < dimension {
        return Err(CodecError::TooFewCoordinates {
            index,
            expected: dimension,
            actual: tuple.len(),
        });
    }
    if tuple.len() > dimension {
        return Err(CodecError::TooManyCoordinates {
            index,
            expected: dimension,
            actual: tuple.len(),
        });
    }
    Ok(tuple)
}

/// Splits a text block into tuples according to `format`.
///
/// The text is split on `ts` and `cs` first; `decimal` is only mapped back to
/// a decimal point inside each coordinate.
pub fn parse_text(text: &str, format: &DelimitedTextFormat) -> Result<Vec<Tuple>> {
    format.ensure_valid()?;

    let ts = format.tuple_separator();
    let mut tokens = text
        .split(|c: char| c == ts || c == '\n')
        .map(str::trim)
        .filter(|t| !t.is_empty());

    let Some(first) = tokens.next() else {
        return Ok(Vec::new());
    };
    let head = parse_parts(first, format)?;
    let dimension = head.len();

    let mut tuples = vec![head];
    for (i, token) in tokens.enumerate() {
        tuples.push(parse_tuple(token, format, i + 1, dimension)?);
    }
    Ok(tuples)
}

/// Renders tuples as one text block according to `format`.
pub fn format_text(tuples: &[Tuple], format: &DelimitedTextFormat) -> String {
    let cs = format.coordinate_separator().to_string();
    let ts = format.tuple_separator().to_string();
    tuples
        .iter()
        .map(|t| {
            t.iter()
                .map(|&v| format.format_number(v))
                .collect::<Vec<_>>()
                .join(cs.as_str())
        })
        .collect::<Vec<_>>()
        .join(ts.as_str())
}

/// Sets `name` to `value` unless it is the default, in which case a stale
/// attribute is removed instead.
fn sync_attribute<T: ElementTree>(
    tree: &mut T,
    element: T::Node,
    name: &str,
    value: char,
    default: char,
) {
    let value = value.to_string();
    let existing = tree.attribute(element, None, name).map(str::to_string);
    if value == default.to_string() {
        if existing.is_some() {
            trace!("removing default-valued {} attribute", name);
            tree.remove_attribute(element, None, name);
        }
    } else if existing.as_deref() != Some(value.as_str()) {
        tree.set_attribute(element, None, name, &value);
    }
}

impl CoordinatesCodec {
    pub fn new(format: DelimitedTextFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> &DelimitedTextFormat {
        &self.format
    }

    /// Reads a `gml:coordinates` element, formatted by its own `cs`, `ts` and
    /// `decimal` attributes, into `store`. Returns the number of tuples read.
    pub fn read<T: ElementTree>(
        &self,
        tree: &T,
        element: T::Node,
        store: &mut TupleStore,
    ) -> Result<usize> {
        let format = DelimitedTextFormat::from_element(tree, element)?;
        let text = tree.text_content(element);
        let tuples = parse_text(&text, &format)?;
        let count = tuples.len();
        if count > 0 {
            store.seed_or_append(tuples)?;
        }
        debug!("read {} tuples from gml:coordinates", count);
        Ok(count)
    }

    /// Replaces the content of `element` with every tuple of `store` and
    /// brings its `cs`, `ts` and `decimal` attributes in line with the format.
    pub fn write<T: ElementTree>(
        &self,
        tree: &mut T,
        store: &TupleStore,
        element: T::Node,
    ) -> Result<()> {
        self.format.ensure_valid()?;

        let tuples = store.sequential_access_view(true);
        let text = format_text(&tuples, &self.format);

        tree.clear_children(element);
        tree.append_text(element, &text);

        sync_attribute(
            tree,
            element,
            ATTR_CS,
            self.format.coordinate_separator(),
            DEFAULT_COORDINATE_SEPARATOR,
        );
        sync_attribute(
            tree,
            element,
            ATTR_TS,
            self.format.tuple_separator(),
            DEFAULT_TUPLE_SEPARATOR,
        );
        sync_attribute(tree, element, ATTR_DECIMAL, self.format.decimal(), DEFAULT_DECIMAL);

        debug!("wrote {} tuples into gml:coordinates", tuples.len());
        Ok(())
    }
}

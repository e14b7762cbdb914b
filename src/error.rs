use thiserror::Error;

/// Errors raised while reading or writing coordinate tuples.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CodecError {
    #[error("malformed gml:coord element: {0}")]
    MalformedCoord(String),

    #[error("unexpected child <{found}> in gml:coord, expected <{expected}>")]
    UnexpectedChild {
        expected: &'static str,
        found: String,
    },

    #[error("gml:coord has {found} axis children, tuple needs {needed}")]
    InsufficientChildren { needed: usize, found: usize },

    #[error("coordinate tuple must have {expected} coordinates like its predecessor, found {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("tuple {index} has too few coordinates: expected {expected}, found {actual}")]
    TooFewCoordinates {
        index: usize,
        expected: usize,
        actual: usize,
    },

    #[error("tuple {index} has too many coordinates: expected at most {expected}, found {actual}")]
    TooManyCoordinates {
        index: usize,
        expected: usize,
        actual: usize,
    },

    #[error("cannot write tuples of dimension {0}, only 1 to 3 are supported")]
    InvalidDimension(usize),

    #[error("store holds {available} tuples, {requested} requested")]
    InsufficientSource { requested: usize, available: usize },

    #[error("ran out of gml:coord elements after writing {written} of {requested} tuples")]
    InsufficientTargetElements { written: usize, requested: usize },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid tuple at index {0}: a tuple needs at least one coordinate")]
    InvalidTupleType(usize),

    #[error("element <{0}> has neither gml:coordinates nor gml:coord children")]
    NoRecognizableCoordinates(String),

    #[error("cannot parse '{token}' as a number")]
    NumberFormat { token: String },
}

/// Errors raised while turning XML text into a [`crate::Document`] and back.
#[derive(Debug, Error)]
pub enum XmlError {
    #[error("XML read error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML attribute error: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    #[error("XML content is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("closing tag </{0}> does not match any open element")]
    UnbalancedEnd(String),

    #[error("element <{0}> is never closed")]
    Unclosed(String),

    #[error("document has more than one root element")]
    MultipleRoots,

    #[error("document has no root element")]
    NoRoot,
}

pub type Result<T, E = CodecError> = std::result::Result<T, E>;

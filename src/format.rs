use crate::error::{CodecError, Result};
use crate::tree::{ElementTree, ATTR_CS, ATTR_DECIMAL, ATTR_TS};

pub const DEFAULT_COORDINATE_SEPARATOR: char = ',';
pub const DEFAULT_TUPLE_SEPARATOR: char = ' ';
pub const DEFAULT_DECIMAL: char = '.';

/// Separators and decimal marker of a `gml:coordinates` text block.
///
/// Each setter accepts exactly one character. Distinctness of the three
/// characters is only checked by [`DelimitedTextFormat::is_valid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelimitedTextFormat {
    coordinate_separator: char,
    tuple_separator: char,
    decimal: char,
    max_decimal_digits: Option<usize>,
}

impl Default for DelimitedTextFormat {
    fn default() -> Self {
        Self {
            coordinate_separator: DEFAULT_COORDINATE_SEPARATOR,
            tuple_separator: DEFAULT_TUPLE_SEPARATOR,
            decimal: DEFAULT_DECIMAL,
            max_decimal_digits: None,
        }
    }
}

fn single_char(what: &str, value: &str) -> Result<char> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(CodecError::InvalidArgument(format!(
            "{} must be a single character, got '{}'",
            what, value
        ))),
    }
}

impl DelimitedTextFormat {
    pub fn new(coordinate_separator: &str, tuple_separator: &str, decimal: &str) -> Result<Self> {
        let mut format = Self::default();
        format.set_coordinate_separator(coordinate_separator)?;
        format.set_tuple_separator(tuple_separator)?;
        format.set_decimal(decimal)?;
        Ok(format)
    }

    /// Reads `cs`, `ts` and `decimal` from `element`, falling back to the
    /// defaults for missing attributes.
    pub fn from_element<T: ElementTree>(tree: &T, element: T::Node) -> Result<Self> {
        let mut format = Self::default();
        if let Some(cs) = tree.attribute(element, None, ATTR_CS) {
            format.set_coordinate_separator(cs)?;
        }
        if let Some(ts) = tree.attribute(element, None, ATTR_TS) {
            format.set_tuple_separator(ts)?;
        }
        if let Some(decimal) = tree.attribute(element, None, ATTR_DECIMAL) {
            format.set_decimal(decimal)?;
        }
        Ok(format)
    }

    pub fn with_max_decimal_digits(mut self, digits: Option<usize>) -> Self {
        self.max_decimal_digits = digits;
        self
    }

    pub fn coordinate_separator(&self) -> char {
        self.coordinate_separator
    }

    pub fn tuple_separator(&self) -> char {
        self.tuple_separator
    }

    pub fn decimal(&self) -> char {
        self.decimal
    }

    pub fn max_decimal_digits(&self) -> Option<usize> {
        self.max_decimal_digits
    }

    pub fn set_coordinate_separator(&mut self, value: &str) -> Result<()> {
        self.coordinate_separator = single_char("coordinate separator", value)?;
        Ok(())
    }

    pub fn set_tuple_separator(&mut self, value: &str) -> Result<()> {
        self.tuple_separator = single_char("tuple separator", value)?;
        Ok(())
    }

    pub fn set_decimal(&mut self, value: &str) -> Result<()> {
        self.decimal = single_char("decimal", value)?;
        Ok(())
    }

    pub fn set_max_decimal_digits(&mut self, digits: Option<usize>) {
        self.max_decimal_digits = digits;
    }

    pub fn is_valid(&self) -> bool {
        self.coordinate_separator != self.tuple_separator
            && self.coordinate_separator != self.decimal
            && self.tuple_separator != self.decimal
    }

    pub(crate) fn ensure_valid(&self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(CodecError::InvalidArgument(format!(
                "cs '{}', ts '{}' and decimal '{}' must be distinct",
                self.coordinate_separator, self.tuple_separator, self.decimal
            )))
        }
    }

    /// Canonical text of one coordinate, using `.` as the decimal point.
    ///
    /// With a digit cap the value is rounded and trailing zeros are dropped.
    pub fn canonical_number(&self, value: f64) -> String {
        match self.max_decimal_digits {
            Some(digits) if value.is_finite() => {
                let text = format!("{:.*}", digits, value);
                if text.contains('.') {
                    text.trim_end_matches('0').trim_end_matches('.').to_string()
                } else {
                    text
                }
            }
            _ => value.to_string(),
        }
    }

    /// Text of one coordinate as it appears in a `gml:coordinates` block,
    /// with the decimal point replaced by the decimal substitute.
    pub fn format_number(&self, value: f64) -> String {
        let text = self.canonical_number(value);
        if self.decimal == DEFAULT_DECIMAL {
            text
        } else {
            text.replace(DEFAULT_DECIMAL, &self.decimal.to_string())
        }
    }

    /// Parses one coordinate written with this format's decimal substitute.
    pub fn parse_number(&self, part: &str) -> Result<f64> {
        let parsed = if self.decimal == DEFAULT_DECIMAL {
            part.parse::<f64>()
        } else {
            part.replace(self.decimal, ".").parse::<f64>()
        };
        parsed.map_err(|_| CodecError::NumberFormat {
            token: part.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let format = DelimitedTextFormat::default();
        assert_eq!(format.coordinate_separator(), ',');
        assert_eq!(format.tuple_separator(), ' ');
        assert_eq!(format.decimal(), '.');
        assert_eq!(format.max_decimal_digits(), None);
        assert!(format.is_valid());
    }

    #[test]
    fn test_is_valid_requires_distinct_characters() {
        // cs == ts でも decimal とは異なるケース
        let format = DelimitedTextFormat::new(";", ";", ".").unwrap();
        assert!(!format.is_valid());

        assert!(!DelimitedTextFormat::new(",", " ", ",").unwrap().is_valid());
        assert!(!DelimitedTextFormat::new(":", ".", ".").unwrap().is_valid());
        assert!(DelimitedTextFormat::new(":", ";", ",").unwrap().is_valid());
    }

    #[test]
    fn test_setters_reject_multi_character_values() {
        let mut format = DelimitedTextFormat::default();
        assert!(matches!(
            format.set_coordinate_separator(";;"),
            Err(CodecError::InvalidArgument(_))
        ));
        assert!(format.set_tuple_separator("").is_err());
        assert!(DelimitedTextFormat::new(",", " ", "dot").is_err());
        // 失敗しても値は変わらない
        assert_eq!(format, DelimitedTextFormat::default());
    }

    #[test]
    fn test_format_and_parse_with_decimal_substitute() {
        let format = DelimitedTextFormat::new(".", " ", ",").unwrap();
        assert_eq!(format.format_number(1.5), "1,5");
        assert_eq!(format.canonical_number(1.5), "1.5");
        assert_eq!(format.parse_number("2,25").unwrap(), 2.25);
        assert_eq!(
            format.parse_number(""),
            Err(CodecError::NumberFormat {
                token: String::new()
            })
        );
    }

    #[test]
    fn test_format_number() {
        let format = DelimitedTextFormat::default();
        assert_eq!(format.format_number(1.0), "1");
        assert_eq!(format.format_number(-0.25), "-0.25");

        let capped = format.with_max_decimal_digits(Some(3));
        assert_eq!(capped.format_number(1.23456), "1.235");
        assert_eq!(capped.format_number(2.5), "2.5");
        assert_eq!(capped.format_number(7.0), "7");

        let zero = format.with_max_decimal_digits(Some(0));
        assert_eq!(zero.format_number(3.6), "4");
    }
}

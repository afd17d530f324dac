//! Property codec between flat domain values and tagged wire fields.
//!
//! # Responsibility
//! - Encode property descriptors into wire field fragments.
//! - Decode wire fields of a document back into domain values.
//!
//! # Invariants
//! - Both directions dispatch on `PropertyType` with exhaustive matches.
//! - Encoding is pure and never fails locally; malformed values surface as
//!   remote rejections.
//! - Decoding never mutates the document.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod decode;
pub mod encode;

pub use decode::{decode, parse_timestamp};
pub use encode::{encode, encode_all};

pub type CodecResult<T> = Result<T, CodecError>;

/// Errors raised while decoding a wire field.
#[derive(Debug)]
pub enum CodecError {
    FieldNotFound(String),
    UnknownType {
        field: String,
        tag: String,
    },
    Parse {
        field: String,
        value: String,
        source: chrono::ParseError,
    },
    InvalidShape {
        field: String,
        expected: &'static str,
    },
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FieldNotFound(field) => write!(f, "field not found: {field}"),
            Self::UnknownType { field, tag } => {
                write!(f, "field `{field}` has unknown type tag `{tag}`")
            }
            Self::Parse {
                field,
                value,
                source,
            } => write!(f, "field `{field}` has malformed timestamp `{value}`: {source}"),
            Self::InvalidShape { field, expected } => {
                write!(f, "field `{field}` is not shaped as {expected}")
            }
        }
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse { source, .. } => Some(source),
            Self::FieldNotFound(_) | Self::UnknownType { .. } | Self::InvalidShape { .. } => None,
        }
    }
}

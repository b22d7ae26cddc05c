// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error type shared by the codec, the type compiler and the dispatcher.

use crate::types::EncodingType;

/// Errors returned by contract compilation, encoding and decoding.
///
/// Compile-time variants (`UnsupportedType`, `IncompatibleEncoding`,
/// `DuplicateMemberOrder`, `IllegalProvidesOnSimpleEncoding`) are raised
/// before any byte is written and never leave a cache entry behind.
///
/// # Example
///
/// ```rust
/// use amqp_contract::{ByteBuffer, ContractSerializer, Error};
///
/// struct Plain;
/// impl amqp_contract::AmqpType for Plain {
///     fn shape() -> amqp_contract::types::TypeShape {
///         amqp_contract::types::TypeShape::opaque()
///     }
/// }
///
/// let serializer = ContractSerializer::new();
/// match serializer.resolve::<Plain>() {
///     Err(Error::UnsupportedType(name)) => assert!(name.ends_with("Plain")),
///     other => panic!("unexpected: {other:?}"),
/// }
/// ```
#[derive(Debug)]
pub enum Error {
    // ========================================================================
    // Compile Errors
    // ========================================================================
    /// No compilation rule matches the type.
    UnsupportedType(String),
    /// A derived type declares a different encoding kind than its base.
    IncompatibleEncoding {
        type_name: String,
        encoding: EncodingType,
        base_name: String,
        base_encoding: EncodingType,
    },
    /// Two merged members of a list-encoded type share an order value.
    DuplicateMemberOrder { type_name: String, order: i32 },
    /// Provided subtypes declared on an encoding without a descriptor.
    IllegalProvidesOnSimpleEncoding {
        type_name: String,
        encoding: EncodingType,
    },

    // ========================================================================
    // Data Errors
    // ========================================================================
    /// Wire data does not match the shape of the resolved descriptor.
    MalformedWireData(String),
    /// A value could not be reinterpreted as the requested type.
    InvalidCast { expected: String },
    /// Read past the end of the buffer.
    InsufficientData { offset: usize, needed: usize },
    /// Decode limit (nesting depth, collection length) exceeded.
    LimitExceeded(String),

    // ========================================================================
    // Other Errors
    // ========================================================================
    /// Configuration could not be loaded.
    Config(String),
}

impl Error {
    /// Cast failure towards `T`.
    pub fn cast<T: ?Sized>() -> Self {
        Error::InvalidCast {
            expected: std::any::type_name::<T>().to_string(),
        }
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Error::MalformedWireData(reason.into())
    }

    /// True for errors raised while compiling a contract.
    pub fn is_compile_error(&self) -> bool {
        matches!(
            self,
            Error::UnsupportedType(_)
                | Error::IncompatibleEncoding { .. }
                | Error::DuplicateMemberOrder { .. }
                | Error::IllegalProvidesOnSimpleEncoding { .. }
        )
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // Compile
            Error::UnsupportedType(name) => write!(f, "Unsupported type: {}", name),
            Error::IncompatibleEncoding {
                type_name,
                encoding,
                base_name,
                base_encoding,
            } => write!(
                f,
                "Incompatible encoding: {} uses {} but its base {} uses {}",
                type_name, encoding, base_name, base_encoding
            ),
            Error::DuplicateMemberOrder { type_name, order } => {
                write!(f, "Duplicate member order {} in {}", order, type_name)
            }
            Error::IllegalProvidesOnSimpleEncoding {
                type_name,
                encoding,
            } => write!(
                f,
                "Provided subtypes are not allowed on {} ({} has no descriptor)",
                type_name, encoding
            ),
            // Data
            Error::MalformedWireData(msg) => write!(f, "Malformed wire data: {}", msg),
            Error::InvalidCast { expected } => write!(f, "Invalid cast to {}", expected),
            Error::InsufficientData { offset, needed } => write!(
                f,
                "Insufficient data: needed {} bytes at offset {}",
                needed, offset
            ),
            Error::LimitExceeded(msg) => write!(f, "Decode limit exceeded: {}", msg),
            // Other
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::string::FromUtf8Error> for Error {
    fn from(e: std::string::FromUtf8Error) -> Self {
        Error::MalformedWireData(format!("invalid UTF-8: {}", e))
    }
}

/// Convenient alias for results using the crate `Error` type.
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_variants() {
        let err = Error::DuplicateMemberOrder {
            type_name: "Order".into(),
            order: 3,
        };
        assert_eq!(err.to_string(), "Duplicate member order 3 in Order");

        let err = Error::InsufficientData {
            offset: 4,
            needed: 8,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient data: needed 8 bytes at offset 4"
        );

        let err = Error::IncompatibleEncoding {
            type_name: "Derived".into(),
            encoding: EncodingType::DescribedMap,
            base_name: "Base".into(),
            base_encoding: EncodingType::DescribedList,
        };
        assert_eq!(
            err.to_string(),
            "Incompatible encoding: Derived uses described-map but its base Base uses described-list"
        );
    }

    #[test]
    fn test_cast_names_target_type() {
        match Error::cast::<u32>() {
            Error::InvalidCast { expected } => assert_eq!(expected, "u32"),
            other => panic!("unexpected error {:?}", other),
        }
        assert!(!Error::cast::<u32>().is_compile_error());
        assert!(Error::UnsupportedType("X".into()).is_compile_error());
    }
}

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Dynamic AMQP values.
//!
//! [`AmqpValue`] holds any value the AMQP 1.0 type system can express. It is
//! the payload of `object` members, the fallback used to skip unknown list
//! items and map entries, and the intermediate form of primitive decoding.

use super::buffer::ByteBuffer;
use super::constants::*;
use super::encoding::{self, length_u32, read_compound_header, read_descriptor_value};
use crate::config::DecodeLimits;
use crate::error::{Error, Result};
use std::fmt;

/// AMQP `symbol`: an ASCII identifier, encoded distinctly from `string`.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(pub String);

impl Symbol {
    pub fn new(value: impl Into<String>) -> Self {
        Symbol(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Symbol(value.to_string())
    }
}

impl From<String> for Symbol {
    fn from(value: String) -> Self {
        Symbol(value)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// AMQP `binary`: opaque bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Binary(pub Vec<u8>);

impl Binary {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Binary {
    fn from(value: Vec<u8>) -> Self {
        Binary(value)
    }
}

impl From<&[u8]> for Binary {
    fn from(value: &[u8]) -> Self {
        Binary(value.to_vec())
    }
}

/// AMQP `timestamp`: milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn from_millis(millis: i64) -> Self {
        Timestamp(millis)
    }

    pub fn millis(&self) -> i64 {
        self.0
    }
}

/// Descriptor of a described type: numeric code or symbolic name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Descriptor {
    Code(u64),
    Name(String),
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Descriptor::Code(code) => write!(f, "0x{:016x}", code),
            Descriptor::Name(name) => write!(f, "{}", name),
        }
    }
}

/// Any value of the AMQP 1.0 type system.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AmqpValue {
    #[default]
    Null,
    Bool(bool),
    UByte(u8),
    UShort(u16),
    UInt(u32),
    ULong(u64),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Char(char),
    Timestamp(i64),
    /// Decimal values are carried undecoded, in wire byte order.
    Decimal32([u8; 4]),
    Decimal64([u8; 8]),
    Decimal128([u8; 16]),
    Uuid([u8; 16]),
    Binary(Vec<u8>),
    String(String),
    Symbol(String),
    List(Vec<AmqpValue>),
    /// Key/value pairs in wire order.
    Map(Vec<(AmqpValue, AmqpValue)>),
    /// Homogeneous sequence sharing one element constructor.
    Array(Vec<AmqpValue>),
    Described(Descriptor, Box<AmqpValue>),
}

impl AmqpValue {
    pub fn is_null(&self) -> bool {
        matches!(self, AmqpValue::Null)
    }

    /// AMQP type name of the value, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            AmqpValue::Null => "null",
            AmqpValue::Bool(_) => "boolean",
            AmqpValue::UByte(_) => "ubyte",
            AmqpValue::UShort(_) => "ushort",
            AmqpValue::UInt(_) => "uint",
            AmqpValue::ULong(_) => "ulong",
            AmqpValue::Byte(_) => "byte",
            AmqpValue::Short(_) => "short",
            AmqpValue::Int(_) => "int",
            AmqpValue::Long(_) => "long",
            AmqpValue::Float(_) => "float",
            AmqpValue::Double(_) => "double",
            AmqpValue::Char(_) => "char",
            AmqpValue::Timestamp(_) => "timestamp",
            AmqpValue::Decimal32(_) => "decimal32",
            AmqpValue::Decimal64(_) => "decimal64",
            AmqpValue::Decimal128(_) => "decimal128",
            AmqpValue::Uuid(_) => "uuid",
            AmqpValue::Binary(_) => "binary",
            AmqpValue::String(_) => "string",
            AmqpValue::Symbol(_) => "symbol",
            AmqpValue::List(_) => "list",
            AmqpValue::Map(_) => "map",
            AmqpValue::Array(_) => "array",
            AmqpValue::Described(..) => "described",
        }
    }

    // ========================================================================
    // Encoding
    // ========================================================================

    /// Encode with the most compact constructor for each value.
    pub fn encode(&self, buf: &mut ByteBuffer) -> Result<()> {
        match self {
            AmqpValue::Null => encoding::write_null(buf),
            AmqpValue::Bool(v) => encoding::write_bool(buf, *v),
            AmqpValue::UByte(v) => encoding::write_ubyte(buf, *v),
            AmqpValue::UShort(v) => encoding::write_ushort(buf, *v),
            AmqpValue::UInt(v) => encoding::write_uint(buf, *v),
            AmqpValue::ULong(v) => encoding::write_ulong(buf, *v),
            AmqpValue::Byte(v) => encoding::write_byte(buf, *v),
            AmqpValue::Short(v) => encoding::write_short(buf, *v),
            AmqpValue::Int(v) => encoding::write_int(buf, *v),
            AmqpValue::Long(v) => encoding::write_long(buf, *v),
            AmqpValue::Float(v) => encoding::write_float(buf, *v),
            AmqpValue::Double(v) => encoding::write_double(buf, *v),
            AmqpValue::Char(v) => encoding::write_char(buf, *v),
            AmqpValue::Timestamp(v) => encoding::write_timestamp(buf, *v),
            AmqpValue::Decimal32(v) => write_fixed(buf, DECIMAL_32, v),
            AmqpValue::Decimal64(v) => write_fixed(buf, DECIMAL_64, v),
            AmqpValue::Decimal128(v) => write_fixed(buf, DECIMAL_128, v),
            AmqpValue::Uuid(v) => write_fixed(buf, UUID, v),
            AmqpValue::Binary(v) => encoding::write_binary(buf, v)?,
            AmqpValue::String(v) => encoding::write_string(buf, v)?,
            AmqpValue::Symbol(v) => encoding::write_symbol(buf, v)?,
            AmqpValue::List(items) => {
                let mut body = ByteBuffer::new();
                for item in items {
                    item.encode(&mut body)?;
                }
                encoding::write_list_frame(buf, items.len(), body.as_slice())?;
            }
            AmqpValue::Map(entries) => {
                let mut body = ByteBuffer::new();
                for (key, value) in entries {
                    key.encode(&mut body)?;
                    value.encode(&mut body)?;
                }
                encoding::write_map_frame(buf, entries.len() * 2, body.as_slice())?;
            }
            AmqpValue::Array(items) => {
                buf.write_u8(ARRAY_32);
                encode_array_body(buf, items)?;
            }
            AmqpValue::Described(descriptor, value) => {
                encoding::write_descriptor(buf, descriptor)?;
                value.encode(buf)?;
            }
        }
        Ok(())
    }

    /// Encode the value into a fresh byte vector.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = ByteBuffer::new();
        self.encode(&mut buf)?;
        Ok(buf.into_vec())
    }

    // ========================================================================
    // Decoding
    // ========================================================================

    /// Decode one value with the default limits.
    pub fn decode(buf: &mut ByteBuffer) -> Result<Self> {
        Self::decode_with(buf, &DecodeLimits::default())
    }

    /// Decode one value, enforcing `limits`.
    pub fn decode_with(buf: &mut ByteBuffer, limits: &DecodeLimits) -> Result<Self> {
        let code = buf.read_u8()?;
        Self::decode_body(buf, code, limits)
    }

    /// Decode the value whose constructor `code` was already consumed.
    pub(crate) fn decode_body(buf: &mut ByteBuffer, code: u8, limits: &DecodeLimits) -> Result<Self> {
        let value = match code {
            DESCRIBED => {
                buf.descend(limits.max_depth)?;
                let inner = read_described(buf, limits);
                buf.ascend();
                let (descriptor, value) = inner?;
                AmqpValue::Described(descriptor, Box::new(value))
            }
            NULL => AmqpValue::Null,
            BOOLEAN_TRUE => AmqpValue::Bool(true),
            BOOLEAN_FALSE => AmqpValue::Bool(false),
            BOOLEAN => match buf.read_u8()? {
                0 => AmqpValue::Bool(false),
                1 => AmqpValue::Bool(true),
                other => {
                    return Err(Error::malformed(format!("invalid boolean byte 0x{:02x}", other)))
                }
            },
            UBYTE => AmqpValue::UByte(buf.read_u8()?),
            USHORT => AmqpValue::UShort(buf.read_u16()?),
            UINT_0 => AmqpValue::UInt(0),
            SMALL_UINT => AmqpValue::UInt(u32::from(buf.read_u8()?)),
            UINT => AmqpValue::UInt(buf.read_u32()?),
            ULONG_0 => AmqpValue::ULong(0),
            SMALL_ULONG => AmqpValue::ULong(u64::from(buf.read_u8()?)),
            ULONG => AmqpValue::ULong(buf.read_u64()?),
            BYTE => AmqpValue::Byte(buf.read_i8()?),
            SHORT => AmqpValue::Short(buf.read_i16()?),
            SMALL_INT => AmqpValue::Int(i32::from(buf.read_i8()?)),
            INT => AmqpValue::Int(buf.read_i32()?),
            SMALL_LONG => AmqpValue::Long(i64::from(buf.read_i8()?)),
            LONG => AmqpValue::Long(buf.read_i64()?),
            FLOAT => AmqpValue::Float(f32::from_bits(buf.read_u32()?)),
            DOUBLE => AmqpValue::Double(f64::from_bits(buf.read_u64()?)),
            CHAR => {
                let raw = buf.read_u32()?;
                let c = char::from_u32(raw)
                    .ok_or_else(|| Error::malformed(format!("invalid char 0x{:08x}", raw)))?;
                AmqpValue::Char(c)
            }
            TIMESTAMP => AmqpValue::Timestamp(buf.read_i64()?),
            DECIMAL_32 => AmqpValue::Decimal32(read_fixed(buf)?),
            DECIMAL_64 => AmqpValue::Decimal64(read_fixed(buf)?),
            DECIMAL_128 => AmqpValue::Decimal128(read_fixed(buf)?),
            UUID => AmqpValue::Uuid(read_fixed(buf)?),
            BINARY_8 | BINARY_32 => AmqpValue::Binary(encoding::read_variable(buf, code)?),
            STRING_8 | STRING_32 => AmqpValue::String(encoding::read_text(buf, code)?),
            SYMBOL_8 | SYMBOL_32 => AmqpValue::Symbol(encoding::read_text(buf, code)?),
            LIST_0 | LIST_8 | LIST_32 => {
                let header = read_compound_header(buf, code, limits)?;
                buf.descend(limits.max_depth)?;
                let items = read_items(buf, header.count, limits);
                buf.ascend();
                let items = items?;
                header.finish(buf)?;
                AmqpValue::List(items)
            }
            MAP_8 | MAP_32 => {
                let header = read_compound_header(buf, code, limits)?;
                if header.count % 2 != 0 {
                    return Err(Error::malformed(format!(
                        "map holds an odd number of items ({})",
                        header.count
                    )));
                }
                buf.descend(limits.max_depth)?;
                let items = read_items(buf, header.count, limits);
                buf.ascend();
                let mut items = items?.into_iter();
                header.finish(buf)?;
                let mut entries = Vec::with_capacity(header.count / 2);
                while let (Some(key), Some(value)) = (items.next(), items.next()) {
                    entries.push((key, value));
                }
                AmqpValue::Map(entries)
            }
            ARRAY_8 | ARRAY_32 => {
                let header = read_compound_header(buf, code, limits)?;
                buf.descend(limits.max_depth)?;
                let items = read_array_elements(buf, header.count, limits);
                buf.ascend();
                let items = items?;
                header.finish(buf)?;
                AmqpValue::Array(items)
            }
            other => {
                return Err(Error::malformed(format!(
                    "unknown format code 0x{:02x} at offset {}",
                    other,
                    buf.offset().saturating_sub(1)
                )))
            }
        };
        Ok(value)
    }

    /// Decode a value from a byte slice, ignoring trailing bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::decode(&mut ByteBuffer::from(bytes))
    }
}

fn read_fixed<const N: usize>(buf: &mut ByteBuffer) -> Result<[u8; N]> {
    let mut bytes = [0u8; N];
    bytes.copy_from_slice(buf.read_bytes(N)?);
    Ok(bytes)
}

fn write_fixed(buf: &mut ByteBuffer, code: u8, bytes: &[u8]) {
    buf.write_u8(code);
    buf.write_bytes(bytes);
}

fn read_described(buf: &mut ByteBuffer, limits: &DecodeLimits) -> Result<(Descriptor, AmqpValue)> {
    let descriptor = read_descriptor_value(buf)?;
    let value = AmqpValue::decode_with(buf, limits)?;
    Ok((descriptor, value))
}

fn read_items(buf: &mut ByteBuffer, count: usize, limits: &DecodeLimits) -> Result<Vec<AmqpValue>> {
    let mut items = Vec::with_capacity(count.min(buf.remaining()));
    for _ in 0..count {
        items.push(AmqpValue::decode_with(buf, limits)?);
    }
    Ok(items)
}

fn read_array_elements(
    buf: &mut ByteBuffer,
    count: usize,
    limits: &DecodeLimits,
) -> Result<Vec<AmqpValue>> {
    let mut code = buf.read_u8()?;
    let descriptor = if code == DESCRIBED {
        let descriptor = read_descriptor_value(buf)?;
        code = buf.read_u8()?;
        Some(descriptor)
    } else {
        None
    };

    let mut items = Vec::with_capacity(count.min(buf.remaining()));
    for _ in 0..count {
        let value = AmqpValue::decode_body(buf, code, limits)?;
        items.push(match &descriptor {
            Some(d) => AmqpValue::Described(d.clone(), Box::new(value)),
            None => value,
        });
    }
    Ok(items)
}

// ============================================================================
// Array encoding (fixed-width element constructors)
// ============================================================================

fn encode_array_body(buf: &mut ByteBuffer, items: &[AmqpValue]) -> Result<()> {
    let mut body = ByteBuffer::new();
    match items.first() {
        None => body.write_u8(NULL),
        Some(first) => {
            write_element_constructor(&mut body, first)?;
            for item in items {
                if !same_element_type(first, item) {
                    return Err(Error::malformed(format!(
                        "array mixes {} and {} elements",
                        first.kind(),
                        item.kind()
                    )));
                }
                write_element_body(&mut body, item)?;
            }
        }
    }
    buf.write_u32(length_u32(body.len() + 4)?);
    buf.write_u32(length_u32(items.len())?);
    buf.write_bytes(body.as_slice());
    Ok(())
}

fn element_code(value: &AmqpValue) -> u8 {
    match value {
        AmqpValue::Null => NULL,
        AmqpValue::Bool(_) => BOOLEAN,
        AmqpValue::UByte(_) => UBYTE,
        AmqpValue::UShort(_) => USHORT,
        AmqpValue::UInt(_) => UINT,
        AmqpValue::ULong(_) => ULONG,
        AmqpValue::Byte(_) => BYTE,
        AmqpValue::Short(_) => SHORT,
        AmqpValue::Int(_) => INT,
        AmqpValue::Long(_) => LONG,
        AmqpValue::Float(_) => FLOAT,
        AmqpValue::Double(_) => DOUBLE,
        AmqpValue::Char(_) => CHAR,
        AmqpValue::Timestamp(_) => TIMESTAMP,
        AmqpValue::Decimal32(_) => DECIMAL_32,
        AmqpValue::Decimal64(_) => DECIMAL_64,
        AmqpValue::Decimal128(_) => DECIMAL_128,
        AmqpValue::Uuid(_) => UUID,
        AmqpValue::Binary(_) => BINARY_32,
        AmqpValue::String(_) => STRING_32,
        AmqpValue::Symbol(_) => SYMBOL_32,
        AmqpValue::List(_) => LIST_32,
        AmqpValue::Map(_) => MAP_32,
        AmqpValue::Array(_) => ARRAY_32,
        AmqpValue::Described(..) => DESCRIBED,
    }
}

fn same_element_type(a: &AmqpValue, b: &AmqpValue) -> bool {
    match (a, b) {
        (AmqpValue::Described(da, ia), AmqpValue::Described(db, ib)) => {
            da == db && same_element_type(ia, ib)
        }
        _ => element_code(a) == element_code(b),
    }
}

fn write_element_constructor(buf: &mut ByteBuffer, value: &AmqpValue) -> Result<()> {
    if let AmqpValue::Described(descriptor, inner) = value {
        encoding::write_descriptor(buf, descriptor)?;
        return write_element_constructor(buf, inner);
    }
    buf.write_u8(element_code(value));
    Ok(())
}

fn write_element_body(buf: &mut ByteBuffer, value: &AmqpValue) -> Result<()> {
    match value {
        AmqpValue::Null => {}
        AmqpValue::Bool(v) => buf.write_u8(u8::from(*v)),
        AmqpValue::UByte(v) => buf.write_u8(*v),
        AmqpValue::UShort(v) => buf.write_u16(*v),
        AmqpValue::UInt(v) => buf.write_u32(*v),
        AmqpValue::ULong(v) => buf.write_u64(*v),
        AmqpValue::Byte(v) => buf.write_i8(*v),
        AmqpValue::Short(v) => buf.write_i16(*v),
        AmqpValue::Int(v) => buf.write_i32(*v),
        AmqpValue::Long(v) => buf.write_i64(*v),
        AmqpValue::Float(v) => buf.write_u32(v.to_bits()),
        AmqpValue::Double(v) => buf.write_u64(v.to_bits()),
        AmqpValue::Char(v) => buf.write_u32(u32::from(*v)),
        AmqpValue::Timestamp(v) => buf.write_i64(*v),
        AmqpValue::Decimal32(v) => buf.write_bytes(v),
        AmqpValue::Decimal64(v) => buf.write_bytes(v),
        AmqpValue::Decimal128(v) | AmqpValue::Uuid(v) => buf.write_bytes(v),
        AmqpValue::Binary(v) => write_wide_variable(buf, v)?,
        AmqpValue::String(v) | AmqpValue::Symbol(v) => write_wide_variable(buf, v.as_bytes())?,
        AmqpValue::List(items) => {
            let mut body = ByteBuffer::new();
            for item in items {
                item.encode(&mut body)?;
            }
            buf.write_u32(length_u32(body.len() + 4)?);
            buf.write_u32(length_u32(items.len())?);
            buf.write_bytes(body.as_slice());
        }
        AmqpValue::Map(entries) => {
            let mut body = ByteBuffer::new();
            for (key, value) in entries {
                key.encode(&mut body)?;
                value.encode(&mut body)?;
            }
            buf.write_u32(length_u32(body.len() + 4)?);
            buf.write_u32(length_u32(entries.len() * 2)?);
            buf.write_bytes(body.as_slice());
        }
        AmqpValue::Array(items) => encode_array_body(buf, items)?,
        AmqpValue::Described(_, inner) => write_element_body(buf, inner)?,
    }
    Ok(())
}

fn write_wide_variable(buf: &mut ByteBuffer, bytes: &[u8]) -> Result<()> {
    buf.write_u32(length_u32(bytes.len())?);
    buf.write_bytes(bytes);
    Ok(())
}

// ============================================================================
// Conversions
// ============================================================================

macro_rules! impl_from_scalar {
    ($($type:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$type> for AmqpValue {
                fn from(value: $type) -> Self {
                    AmqpValue::$variant(value)
                }
            }
        )*
    };
}

impl_from_scalar!(
    bool => Bool,
    u8 => UByte,
    u16 => UShort,
    u32 => UInt,
    u64 => ULong,
    i8 => Byte,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    char => Char,
    String => String,
);

impl From<&str> for AmqpValue {
    fn from(value: &str) -> Self {
        AmqpValue::String(value.to_string())
    }
}

impl From<Symbol> for AmqpValue {
    fn from(value: Symbol) -> Self {
        AmqpValue::Symbol(value.0)
    }
}

impl From<Binary> for AmqpValue {
    fn from(value: Binary) -> Self {
        AmqpValue::Binary(value.0)
    }
}

impl From<Timestamp> for AmqpValue {
    fn from(value: Timestamp) -> Self {
        AmqpValue::Timestamp(value.0)
    }
}

impl From<Vec<AmqpValue>> for AmqpValue {
    fn from(value: Vec<AmqpValue>) -> Self {
        AmqpValue::List(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(value: &AmqpValue) -> AmqpValue {
        let bytes = value.to_bytes().unwrap();
        let mut buf = ByteBuffer::from(bytes);
        let decoded = AmqpValue::decode(&mut buf).unwrap();
        assert!(buf.is_eof(), "trailing bytes after {:?}", value);
        decoded
    }

    #[test]
    fn test_nested_structure_roundtrip() {
        let value = AmqpValue::Described(
            Descriptor::Name("test:envelope".into()),
            Box::new(AmqpValue::List(vec![
                AmqpValue::UInt(0),
                AmqpValue::String("hello".into()),
                AmqpValue::Null,
                AmqpValue::Map(vec![(
                    AmqpValue::Symbol("k".into()),
                    AmqpValue::Long(-1),
                )]),
                AmqpValue::Array(vec![AmqpValue::Int(1), AmqpValue::Int(300)]),
            ])),
        );
        assert_eq!(roundtrip(&value), value);
    }

    #[test]
    fn test_array_of_described_elements() {
        let d = Descriptor::Code(0x77);
        let value = AmqpValue::Array(vec![
            AmqpValue::Described(d.clone(), Box::new(AmqpValue::Symbol("a".into()))),
            AmqpValue::Described(d, Box::new(AmqpValue::Symbol("b".into()))),
        ]);
        assert_eq!(roundtrip(&value), value);
    }

    #[test]
    fn test_mixed_array_is_rejected() {
        let value = AmqpValue::Array(vec![AmqpValue::Int(1), AmqpValue::Long(1)]);
        assert!(matches!(value.to_bytes(), Err(Error::MalformedWireData(_))));
    }

    #[test]
    fn test_empty_array_roundtrip() {
        let value = AmqpValue::Array(Vec::new());
        assert_eq!(roundtrip(&value), value);
    }

    #[test]
    fn test_decode_accepts_wide_forms() {
        // uint written with the 4-byte form, boolean with the 0x56 form
        let mut buf = ByteBuffer::from(vec![UINT, 0, 0, 0, 5, BOOLEAN, 1]);
        assert_eq!(AmqpValue::decode(&mut buf).unwrap(), AmqpValue::UInt(5));
        assert_eq!(AmqpValue::decode(&mut buf).unwrap(), AmqpValue::Bool(true));
    }

    #[test]
    fn test_uuid_and_decimal_widths() {
        let uuid = AmqpValue::Uuid([0x5a; 16]);
        let bytes = uuid.to_bytes().unwrap();
        assert_eq!(bytes.len(), 17);
        assert_eq!(bytes[0], UUID);
        assert_eq!(roundtrip(&uuid), uuid);

        let values = [
            AmqpValue::Decimal32([1, 2, 3, 4]),
            AmqpValue::Decimal64([9; 8]),
            AmqpValue::Decimal128([7; 16]),
        ];
        for value in &values {
            assert_eq!(&roundtrip(value), value);
        }

        let array = AmqpValue::Array(vec![AmqpValue::Uuid([1; 16]), AmqpValue::Uuid([2; 16])]);
        assert_eq!(roundtrip(&array), array);
    }

    #[test]
    fn test_boolean_array_elements() {
        let array = AmqpValue::Array(vec![AmqpValue::Bool(true), AmqpValue::Bool(false)]);
        assert_eq!(roundtrip(&array), array);

        // array8 of the one-byte boolean form
        let mut buf = ByteBuffer::from(vec![ARRAY_8, 4, 2, BOOLEAN, 1, 0]);
        assert_eq!(AmqpValue::decode(&mut buf).unwrap(), array);
    }

    #[test]
    fn test_unknown_format_code() {
        let mut buf = ByteBuffer::from(vec![0x99]);
        assert!(matches!(
            AmqpValue::decode(&mut buf),
            Err(Error::MalformedWireData(_))
        ));
    }

    #[test]
    fn test_depth_limit_rejects_deep_nesting() {
        let mut value = AmqpValue::Null;
        for _ in 0..10 {
            value = AmqpValue::List(vec![value]);
        }
        let bytes = value.to_bytes().unwrap();
        let limits = DecodeLimits {
            max_depth: 4,
            ..DecodeLimits::default()
        };
        let mut buf = ByteBuffer::from(bytes);
        assert!(matches!(
            AmqpValue::decode_with(&mut buf, &limits),
            Err(Error::LimitExceeded(_))
        ));
    }

    #[test]
    fn test_list_size_mismatch_is_malformed() {
        // list8 declaring 5 bytes but holding a 1-byte item
        let mut buf = ByteBuffer::from(vec![LIST_8, 5, 1, NULL, NULL, NULL, NULL]);
        assert!(matches!(
            AmqpValue::decode(&mut buf),
            Err(Error::MalformedWireData(_))
        ));
    }
}

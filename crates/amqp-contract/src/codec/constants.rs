// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! AMQP 1.0 format codes (OASIS AMQP 1.0, Part 1: Types, Sec.1.6).

/// Constructor of a described type (descriptor follows).
pub const DESCRIBED: u8 = 0x00;

pub const NULL: u8 = 0x40;

pub const BOOLEAN_TRUE: u8 = 0x41;
pub const BOOLEAN_FALSE: u8 = 0x42;
pub const BOOLEAN: u8 = 0x56;

pub const UBYTE: u8 = 0x50;
pub const USHORT: u8 = 0x60;
pub const UINT_0: u8 = 0x43;
pub const SMALL_UINT: u8 = 0x52;
pub const UINT: u8 = 0x70;
pub const ULONG_0: u8 = 0x44;
pub const SMALL_ULONG: u8 = 0x53;
pub const ULONG: u8 = 0x80;

pub const BYTE: u8 = 0x51;
pub const SHORT: u8 = 0x61;
pub const SMALL_INT: u8 = 0x54;
pub const INT: u8 = 0x71;
pub const SMALL_LONG: u8 = 0x55;
pub const LONG: u8 = 0x81;

pub const FLOAT: u8 = 0x72;
pub const DOUBLE: u8 = 0x82;
/// UTF-32BE code point.
pub const CHAR: u8 = 0x73;
/// Milliseconds since the Unix epoch, signed 64-bit.
pub const TIMESTAMP: u8 = 0x83;
/// IEEE 754-2008 decimal floating point, kept as raw bytes.
pub const DECIMAL_32: u8 = 0x74;
pub const DECIMAL_64: u8 = 0x84;
pub const DECIMAL_128: u8 = 0x94;
/// RFC-4122 UUID, 16 bytes.
pub const UUID: u8 = 0x98;

pub const BINARY_8: u8 = 0xa0;
pub const BINARY_32: u8 = 0xb0;
pub const STRING_8: u8 = 0xa1;
pub const STRING_32: u8 = 0xb1;
pub const SYMBOL_8: u8 = 0xa3;
pub const SYMBOL_32: u8 = 0xb3;

pub const LIST_0: u8 = 0x45;
pub const LIST_8: u8 = 0xc0;
pub const LIST_32: u8 = 0xd0;
pub const MAP_8: u8 = 0xc1;
pub const MAP_32: u8 = 0xd1;
pub const ARRAY_8: u8 = 0xe0;
pub const ARRAY_32: u8 = 0xf0;

/// Human readable name of a format code, for error messages.
pub fn format_code_name(code: u8) -> &'static str {
    match code {
        DESCRIBED => "described",
        NULL => "null",
        BOOLEAN_TRUE | BOOLEAN_FALSE | BOOLEAN => "boolean",
        UBYTE => "ubyte",
        USHORT => "ushort",
        UINT_0 | SMALL_UINT | UINT => "uint",
        ULONG_0 | SMALL_ULONG | ULONG => "ulong",
        BYTE => "byte",
        SHORT => "short",
        SMALL_INT | INT => "int",
        SMALL_LONG | LONG => "long",
        FLOAT => "float",
        DOUBLE => "double",
        CHAR => "char",
        TIMESTAMP => "timestamp",
        DECIMAL_32 => "decimal32",
        DECIMAL_64 => "decimal64",
        DECIMAL_128 => "decimal128",
        UUID => "uuid",
        BINARY_8 | BINARY_32 => "binary",
        STRING_8 | STRING_32 => "string",
        SYMBOL_8 | SYMBOL_32 => "symbol",
        LIST_0 | LIST_8 | LIST_32 => "list",
        MAP_8 | MAP_32 => "map",
        ARRAY_8 | ARRAY_32 => "array",
        _ => "unknown",
    }
}

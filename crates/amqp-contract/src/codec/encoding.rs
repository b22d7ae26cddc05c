// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Low-level AMQP 1.0 encoding helpers.
//!
//! Writers always pick the most compact constructor for the value (`uint0`,
//! `smalluint`, `str8`, `list8`, ...). Compound values (list, map) are framed
//! from an already encoded body so that size and count are known up front.
//!
//! Readers for compound headers validate the declared size and count against
//! the remaining input and the configured [`DecodeLimits`].

use super::buffer::ByteBuffer;
use super::constants::*;
use super::value::Descriptor;
use crate::config::DecodeLimits;
use crate::error::{Error, Result};

pub fn write_null(buf: &mut ByteBuffer) {
    buf.write_u8(NULL);
}

pub fn write_bool(buf: &mut ByteBuffer, value: bool) {
    buf.write_u8(if value { BOOLEAN_TRUE } else { BOOLEAN_FALSE });
}

pub fn write_ubyte(buf: &mut ByteBuffer, value: u8) {
    buf.write_u8(UBYTE);
    buf.write_u8(value);
}

pub fn write_ushort(buf: &mut ByteBuffer, value: u16) {
    buf.write_u8(USHORT);
    buf.write_u16(value);
}

pub fn write_uint(buf: &mut ByteBuffer, value: u32) {
    match value {
        0 => buf.write_u8(UINT_0),
        1..=0xff => {
            buf.write_u8(SMALL_UINT);
            buf.write_u8(value as u8);
        }
        _ => {
            buf.write_u8(UINT);
            buf.write_u32(value);
        }
    }
}

pub fn write_ulong(buf: &mut ByteBuffer, value: u64) {
    match value {
        0 => buf.write_u8(ULONG_0),
        1..=0xff => {
            buf.write_u8(SMALL_ULONG);
            buf.write_u8(value as u8);
        }
        _ => {
            buf.write_u8(ULONG);
            buf.write_u64(value);
        }
    }
}

pub fn write_byte(buf: &mut ByteBuffer, value: i8) {
    buf.write_u8(BYTE);
    buf.write_i8(value);
}

pub fn write_short(buf: &mut ByteBuffer, value: i16) {
    buf.write_u8(SHORT);
    buf.write_i16(value);
}

pub fn write_int(buf: &mut ByteBuffer, value: i32) {
    if let Ok(small) = i8::try_from(value) {
        buf.write_u8(SMALL_INT);
        buf.write_i8(small);
    } else {
        buf.write_u8(INT);
        buf.write_i32(value);
    }
}

pub fn write_long(buf: &mut ByteBuffer, value: i64) {
    if let Ok(small) = i8::try_from(value) {
        buf.write_u8(SMALL_LONG);
        buf.write_i8(small);
    } else {
        buf.write_u8(LONG);
        buf.write_i64(value);
    }
}

pub fn write_float(buf: &mut ByteBuffer, value: f32) {
    buf.write_u8(FLOAT);
    buf.write_u32(value.to_bits());
}

pub fn write_double(buf: &mut ByteBuffer, value: f64) {
    buf.write_u8(DOUBLE);
    buf.write_u64(value.to_bits());
}

pub fn write_char(buf: &mut ByteBuffer, value: char) {
    buf.write_u8(CHAR);
    buf.write_u32(u32::from(value));
}

pub fn write_timestamp(buf: &mut ByteBuffer, millis: i64) {
    buf.write_u8(TIMESTAMP);
    buf.write_i64(millis);
}

pub fn write_binary(buf: &mut ByteBuffer, value: &[u8]) -> Result<()> {
    write_variable(buf, BINARY_8, BINARY_32, value)
}

pub fn write_string(buf: &mut ByteBuffer, value: &str) -> Result<()> {
    write_variable(buf, STRING_8, STRING_32, value.as_bytes())
}

pub fn write_symbol(buf: &mut ByteBuffer, value: &str) -> Result<()> {
    write_variable(buf, SYMBOL_8, SYMBOL_32, value.as_bytes())
}

fn write_variable(buf: &mut ByteBuffer, code8: u8, code32: u8, bytes: &[u8]) -> Result<()> {
    if let Ok(len) = u8::try_from(bytes.len()) {
        buf.write_u8(code8);
        buf.write_u8(len);
    } else {
        buf.write_u8(code32);
        buf.write_u32(length_u32(bytes.len())?);
    }
    buf.write_bytes(bytes);
    Ok(())
}

/// Write the described-type constructor followed by the descriptor.
pub fn write_descriptor(buf: &mut ByteBuffer, descriptor: &Descriptor) -> Result<()> {
    buf.write_u8(DESCRIBED);
    match descriptor {
        Descriptor::Code(code) => {
            write_ulong(buf, *code);
            Ok(())
        }
        Descriptor::Name(name) => write_symbol(buf, name),
    }
}

/// Frame an encoded list body holding `count` items.
pub fn write_list_frame(buf: &mut ByteBuffer, count: usize, body: &[u8]) -> Result<()> {
    if count == 0 {
        buf.write_u8(LIST_0);
        return Ok(());
    }
    write_compound(buf, LIST_8, LIST_32, count, body)
}

/// Frame an encoded map body holding `count` items (keys and values).
pub fn write_map_frame(buf: &mut ByteBuffer, count: usize, body: &[u8]) -> Result<()> {
    write_compound(buf, MAP_8, MAP_32, count, body)
}

fn write_compound(
    buf: &mut ByteBuffer,
    code8: u8,
    code32: u8,
    count: usize,
    body: &[u8],
) -> Result<()> {
    // size covers the count field plus the body
    match (u8::try_from(body.len() + 1), u8::try_from(count)) {
        (Ok(size), Ok(count)) => {
            buf.write_u8(code8);
            buf.write_u8(size);
            buf.write_u8(count);
        }
        _ => {
            buf.write_u8(code32);
            buf.write_u32(length_u32(body.len() + 4)?);
            buf.write_u32(length_u32(count)?);
        }
    }
    buf.write_bytes(body);
    Ok(())
}

pub(crate) fn length_u32(len: usize) -> Result<u32> {
    u32::try_from(len)
        .map_err(|_| Error::LimitExceeded(format!("length {} does not fit in 32 bits", len)))
}

/// True when the next value on the wire is the null marker.
pub fn peek_null(buf: &ByteBuffer) -> Result<bool> {
    Ok(buf.peek_u8()? == NULL)
}

/// Size and item count of a list or map, as declared on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompoundHeader {
    pub size: usize,
    pub count: usize,
    body_start: usize,
}

impl CompoundHeader {
    /// Check that exactly `size` bytes were consumed since the header.
    pub fn finish(&self, buf: &ByteBuffer) -> Result<()> {
        let consumed = buf.offset().saturating_sub(self.body_start);
        if consumed != self.size {
            return Err(Error::malformed(format!(
                "compound declared {} bytes but {} were consumed",
                self.size, consumed
            )));
        }
        Ok(())
    }
}

/// Read a list constructor and header.
pub fn read_list_header(buf: &mut ByteBuffer, limits: &DecodeLimits) -> Result<CompoundHeader> {
    let code = buf.read_u8()?;
    match code {
        LIST_0 | LIST_8 | LIST_32 => read_compound_header(buf, code, limits),
        other => Err(unexpected("list", other)),
    }
}

/// Read a map constructor and header. The count is the number of pairs times two.
pub fn read_map_header(buf: &mut ByteBuffer, limits: &DecodeLimits) -> Result<CompoundHeader> {
    let code = buf.read_u8()?;
    match code {
        MAP_8 | MAP_32 => {
            let header = read_compound_header(buf, code, limits)?;
            if header.count % 2 != 0 {
                return Err(Error::malformed(format!(
                    "map holds an odd number of items ({})",
                    header.count
                )));
            }
            Ok(header)
        }
        other => Err(unexpected("map", other)),
    }
}

/// Read the header of a compound whose format code was already consumed.
pub(crate) fn read_compound_header(
    buf: &mut ByteBuffer,
    code: u8,
    limits: &DecodeLimits,
) -> Result<CompoundHeader> {
    let (size, body_start, count) = match code {
        LIST_0 => return Ok(CompoundHeader {
            size: 0,
            count: 0,
            body_start: buf.offset(),
        }),
        LIST_8 | MAP_8 | ARRAY_8 => {
            let size = usize::from(buf.read_u8()?);
            let body_start = buf.offset();
            (size, body_start, usize::from(buf.read_u8()?))
        }
        LIST_32 | MAP_32 | ARRAY_32 => {
            let size = buf.read_u32()? as usize;
            let body_start = buf.offset();
            (size, body_start, buf.read_u32()? as usize)
        }
        other => return Err(unexpected("compound", other)),
    };
    if size > buf.remaining() + (buf.offset() - body_start) {
        return Err(Error::InsufficientData {
            offset: body_start,
            needed: size,
        });
    }
    if count > limits.max_collection_len {
        return Err(Error::LimitExceeded(format!(
            "{} items exceed the limit of {}",
            count, limits.max_collection_len
        )));
    }
    // list and map items take at least one byte, array elements may be empty
    if code != ARRAY_8 && code != ARRAY_32 && count > size {
        return Err(Error::malformed(format!(
            "{} items cannot fit in {} bytes",
            count, size
        )));
    }
    Ok(CompoundHeader {
        size,
        count,
        body_start,
    })
}

/// Read a described-type constructor and its descriptor.
pub fn read_descriptor(buf: &mut ByteBuffer) -> Result<Descriptor> {
    let code = buf.read_u8()?;
    if code != DESCRIBED {
        return Err(unexpected("described type", code));
    }
    read_descriptor_value(buf)
}

/// Read the descriptor following an already consumed `0x00` constructor.
pub(crate) fn read_descriptor_value(buf: &mut ByteBuffer) -> Result<Descriptor> {
    let code = buf.read_u8()?;
    match code {
        ULONG_0 => Ok(Descriptor::Code(0)),
        SMALL_ULONG => Ok(Descriptor::Code(u64::from(buf.read_u8()?))),
        ULONG => Ok(Descriptor::Code(buf.read_u64()?)),
        SYMBOL_8 | SYMBOL_32 => Ok(Descriptor::Name(read_text(buf, code)?)),
        other => Err(unexpected("descriptor", other)),
    }
}

/// Read a map key written as a symbol or a string.
pub fn read_key(buf: &mut ByteBuffer) -> Result<String> {
    let code = buf.read_u8()?;
    match code {
        SYMBOL_8 | SYMBOL_32 | STRING_8 | STRING_32 => read_text(buf, code),
        other => Err(unexpected("symbol key", other)),
    }
}

/// Read the body of a str8/str32/sym8/sym32 value.
pub(crate) fn read_text(buf: &mut ByteBuffer, code: u8) -> Result<String> {
    let bytes = read_variable(buf, code)?;
    Ok(String::from_utf8(bytes)?)
}

/// Read the body of a variable-width value (binary, string, symbol).
pub(crate) fn read_variable(buf: &mut ByteBuffer, code: u8) -> Result<Vec<u8>> {
    let len = match code {
        BINARY_8 | STRING_8 | SYMBOL_8 => usize::from(buf.read_u8()?),
        _ => buf.read_u32()? as usize,
    };
    Ok(buf.read_bytes(len)?.to_vec())
}

pub(crate) fn unexpected(expected: &str, code: u8) -> Error {
    Error::malformed(format!(
        "expected {}, found {} (0x{:02x})",
        expected,
        format_code_name(code),
        code
    ))
}

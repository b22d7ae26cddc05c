// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! AMQP 1.0 type-system codec.
//!
//! - [`ByteBuffer`]: growable buffer with a read cursor and a nesting counter.
//! - [`encoding`]: compact writers and validated compound header readers.
//! - [`AmqpValue`]: dynamic value covering the whole type system.
//! - [`PrimitiveRegistry`]: `TypeId` to scalar codec lookup.

pub mod buffer;
pub mod constants;
pub mod encoding;
pub mod registry;
pub mod value;

pub use buffer::ByteBuffer;
pub use registry::{Primitive, PrimitiveCodec, PrimitiveRegistry};
pub use value::{AmqpValue, Binary, Descriptor, Symbol, Timestamp};

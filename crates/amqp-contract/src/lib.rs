// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # amqp-contract - AMQP 1.0 described-type codec compiler
//!
//! Compiles Rust types annotated with wire-contract metadata into cached
//! encode/decode plans for the AMQP 1.0 type system (described lists and
//! maps, simple lists and maps, enums, containers, dynamic values).
//!
//! ## Quick Start
//!
//! ```rust
//! use amqp_contract::{AmqpContract, ByteBuffer, ContractSerializer, Result};
//!
//! #[derive(AmqpContract, Debug, Default, PartialEq)]
//! #[amqp(encoding = "list", name = "example:open", code = 0x0000_0000_0000_0010)]
//! struct Open {
//!     container_id: String,
//!     hostname: Option<String>,
//!     max_frame_size: Option<u32>,
//! }
//!
//! fn main() -> Result<()> {
//!     let serializer = ContractSerializer::new();
//!     let open = Open {
//!         container_id: "node-1".into(),
//!         hostname: None,
//!         max_frame_size: Some(65536),
//!     };
//!
//!     let mut buf = ByteBuffer::new();
//!     serializer.write_object(&mut buf, &open)?;
//!     let decoded: Open = serializer.read(&mut buf)?;
//!     assert_eq!(decoded, open);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------------+
//! |  serializer: ContractSerializer (write_object / read_object)        |
//! +---------------------------------------------------------------------+
//! |  TypeCompiler -> TypeCache (DashMap, get-or-insert) -> CompiledType |
//! +---------------------------------------------------------------------+
//! |  types: AmqpType -> TypeShape (contract, enum, nullable, ...)       |
//! +---------------------------------------------------------------------+
//! |  codec: ByteBuffer | encoding | AmqpValue | PrimitiveRegistry       |
//! +---------------------------------------------------------------------+
//! ```
//!
//! ## Modules Overview
//!
//! - [`serializer`] - dispatcher, compiler and type cache (start here)
//! - [`types`] - capability model and contract builders
//! - [`codec`] - AMQP 1.0 wire primitives
//! - [`config`] - decode limits and their sources

// Allow the derive macro to work inside this crate's tests
extern crate self as amqp_contract;

/// AMQP 1.0 wire primitives (buffer, encodings, dynamic values, registry).
pub mod codec;
/// Decode limits and serializer configuration.
pub mod config;
/// Error type and `Result` alias.
pub mod error;
/// Type compiler, compiled descriptors and the runtime dispatcher.
pub mod serializer;
/// Type capability model and contract metadata builders.
pub mod types;

pub use codec::{AmqpValue, Binary, ByteBuffer, Descriptor, Primitive, Symbol, Timestamp};
pub use config::SerializerConfig;
pub use error::{Error, Result};
pub use serializer::{
    default_serializer, deserialize, deserialize_as, from_bytes, serialize, to_bytes,
    CompiledType, ContractSerializer, Variant,
};
pub use types::{AmqpEnum, AmqpSerializable, AmqpType, EncodingType};

pub use amqp_contract_codegen::AmqpContract; // Derive macro (for #[derive(amqp_contract::AmqpContract)])

/// Crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// Round-trip and byte-exact encoding tests for every descriptor variant:
// described list/map, simple list/map, enums, nullable members, generic
// containers, dynamic values and self-describing types.

#![allow(clippy::unreadable_literal)]
#![allow(clippy::missing_panics_doc)]

use amqp_contract::codec::encoding;
use amqp_contract::types::{SerializableShape, TypeShape};
use amqp_contract::{
    AmqpContract, AmqpSerializable, AmqpType, AmqpValue, Binary, ByteBuffer, ContractSerializer,
    Descriptor, Error, Result, Symbol, Timestamp, Variant,
};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};

fn roundtrip<T: AmqpType + std::fmt::Debug + PartialEq>(value: &T) -> Vec<u8> {
    let serializer = ContractSerializer::new();
    let mut buf = ByteBuffer::new();
    serializer.write_object(&mut buf, value).unwrap();
    let bytes = buf.as_slice().to_vec();
    let decoded: T = serializer.read(&mut buf).unwrap();
    assert_eq!(&decoded, value);
    assert!(buf.is_eof(), "trailing bytes after decode");
    bytes
}

// -----------------------------------------------------------------------
// Fixtures
// -----------------------------------------------------------------------

#[derive(AmqpContract, Debug, Default, PartialEq)]
#[amqp(encoding = "list", name = "test:frame", code = 0x20)]
struct Frame {
    a: Option<u32>,
    b: Option<u32>,
    c: Option<u32>,
}

#[derive(AmqpContract, Debug, Default, PartialEq)]
#[amqp(encoding = "map", name = "test:props")]
struct Props {
    id: u32,
    label: Option<String>,
}

#[derive(AmqpContract, Debug, Default, PartialEq)]
#[amqp(encoding = "simple_map")]
struct Settings {
    #[amqp(name = "max-size")]
    max_size: u64,
    tags: Vec<String>,
}

#[derive(AmqpContract, Debug, Default, PartialEq)]
#[amqp(encoding = "simple_list")]
struct Pair {
    #[amqp(order = 9)]
    first: i32,
    #[amqp(order = 1)]
    second: i32,
}

#[derive(AmqpContract, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
enum Mode {
    #[default]
    Settled = 0,
    Unsettled = 1,
    Mixed = 2,
}

#[derive(AmqpContract, Debug, Default, PartialEq)]
#[amqp(encoding = "list", code = 0x21)]
struct Link {
    #[amqp(order = 2)]
    mode: Mode,
    #[amqp(order = 1)]
    name: String,
    #[amqp(order = 3)]
    fallback: Option<Mode>,
}

#[derive(AmqpContract, Debug, Default, PartialEq)]
#[amqp(encoding = "list", code = 0x22)]
struct Everything {
    flag: bool,
    small: u8,
    word: u16,
    int: i32,
    long: i64,
    ratio: f64,
    letter: char,
    text: String,
    symbol: Symbol,
    blob: Binary,
    at: Timestamp,
    list: Vec<u16>,
    map: BTreeMap<String, i64>,
    dynamic: AmqpValue,
    nested: Option<Frame>,
}

// -----------------------------------------------------------------------
// Described list
// -----------------------------------------------------------------------

#[test]
fn test_described_list_bytes() {
    let bytes = roundtrip(&Frame {
        a: Some(1),
        b: None,
        c: None,
    });
    assert_eq!(bytes, vec![0x00, 0x53, 0x20, 0xc0, 0x03, 0x01, 0x52, 0x01]);
}

#[test]
fn test_all_absent_members_write_empty_list() {
    let bytes = roundtrip(&Frame::default());
    assert_eq!(bytes, vec![0x00, 0x53, 0x20, 0x45]);
}

#[test]
fn test_absent_members_before_a_present_one_are_null() {
    let bytes = roundtrip(&Frame {
        a: None,
        b: None,
        c: Some(2),
    });
    assert_eq!(
        bytes,
        vec![0x00, 0x53, 0x20, 0xc0, 0x05, 0x03, 0x40, 0x40, 0x52, 0x02]
    );
}

#[test]
fn test_unknown_trailing_list_items_are_skipped() {
    let wire = AmqpValue::Described(
        Descriptor::Code(0x20),
        Box::new(AmqpValue::List(vec![
            AmqpValue::UInt(1),
            AmqpValue::Null,
            AmqpValue::Null,
            AmqpValue::String("added later".into()),
            AmqpValue::List(vec![AmqpValue::Bool(true)]),
        ])),
    );
    let bytes = wire.to_bytes().unwrap();
    let frame: Frame = ContractSerializer::new()
        .read(&mut ByteBuffer::from(bytes))
        .unwrap();
    assert_eq!(
        frame,
        Frame {
            a: Some(1),
            b: None,
            c: None
        }
    );
}

#[test]
fn test_unknown_uuid_and_decimal_members_are_skipped() {
    let wire = AmqpValue::Described(
        Descriptor::Code(0x20),
        Box::new(AmqpValue::List(vec![
            AmqpValue::UInt(3),
            AmqpValue::UInt(4),
            AmqpValue::Null,
            AmqpValue::Uuid([0xab; 16]),
            AmqpValue::Decimal64([0x30; 8]),
            AmqpValue::Decimal32([1, 2, 3, 4]),
            AmqpValue::Decimal128([0xff; 16]),
        ])),
    );
    let bytes = wire.to_bytes().unwrap();
    let mut buf = ByteBuffer::from(bytes);
    let frame: Frame = ContractSerializer::new().read(&mut buf).unwrap();
    assert_eq!(
        frame,
        Frame {
            a: Some(3),
            b: Some(4),
            c: None
        }
    );
    assert!(buf.is_eof());

    let wire = AmqpValue::Described(
        Descriptor::Name("test:props".into()),
        Box::new(AmqpValue::Map(vec![
            (AmqpValue::Symbol("trace-id".into()), AmqpValue::Uuid([7; 16])),
            (AmqpValue::Symbol("id".into()), AmqpValue::UInt(8)),
            (AmqpValue::Symbol("price".into()), AmqpValue::Decimal32([0; 4])),
        ])),
    );
    let props: Props = ContractSerializer::new()
        .read(&mut ByteBuffer::from(wire.to_bytes().unwrap()))
        .unwrap();
    assert_eq!(props.id, 8);
}

#[test]
fn test_members_sorted_by_order() {
    let link = Link {
        mode: Mode::Mixed,
        name: "l".into(),
        fallback: None,
    };
    let bytes = roundtrip(&link);
    // name (order 1) precedes mode (order 2); fallback omitted
    assert_eq!(
        bytes,
        vec![0x00, 0x53, 0x21, 0xc0, 0x06, 0x02, 0xa1, 0x01, b'l', 0x50, 0x02]
    );

    roundtrip(&Link {
        mode: Mode::Unsettled,
        name: String::new(),
        fallback: Some(Mode::Settled),
    });
}

#[test]
fn test_unknown_enum_value_is_malformed() {
    let wire = AmqpValue::Described(
        Descriptor::Code(0x21),
        Box::new(AmqpValue::List(vec![
            AmqpValue::String("x".into()),
            AmqpValue::UByte(9),
        ])),
    );
    let err = ContractSerializer::new()
        .read::<Link>(&mut ByteBuffer::from(wire.to_bytes().unwrap()))
        .unwrap_err();
    assert!(matches!(err, Error::MalformedWireData(_)));
}

#[test]
fn test_wrong_descriptor_is_malformed() {
    let wire = AmqpValue::Described(Descriptor::Code(0x99), Box::new(AmqpValue::List(vec![])));
    let err = ContractSerializer::new()
        .read::<Frame>(&mut ByteBuffer::from(wire.to_bytes().unwrap()))
        .unwrap_err();
    assert!(matches!(err, Error::MalformedWireData(_)));
}

// -----------------------------------------------------------------------
// Maps and simple encodings
// -----------------------------------------------------------------------

#[test]
fn test_described_map_uses_symbol_keys_and_skips_absent() {
    let bytes = roundtrip(&Props {
        id: 5,
        label: None,
    });
    let mut expected = vec![0x00, 0xa3, 10];
    expected.extend_from_slice(b"test:props");
    expected.extend_from_slice(&[0xc1, 0x07, 0x02, 0xa3, 0x02, b'i', b'd', 0x52, 0x05]);
    assert_eq!(bytes, expected);

    roundtrip(&Props {
        id: 0,
        label: Some("primary".into()),
    });
}

#[test]
fn test_unknown_map_keys_are_skipped() {
    let wire = AmqpValue::Described(
        Descriptor::Name("test:props".into()),
        Box::new(AmqpValue::Map(vec![
            (AmqpValue::Symbol("extra".into()), AmqpValue::Long(-1)),
            (AmqpValue::String("id".into()), AmqpValue::UInt(77)),
            (AmqpValue::Symbol("label".into()), AmqpValue::Null),
        ])),
    );
    let props: Props = ContractSerializer::new()
        .read(&mut ByteBuffer::from(wire.to_bytes().unwrap()))
        .unwrap();
    assert_eq!(
        props,
        Props {
            id: 77,
            label: None
        }
    );
}

#[test]
fn test_simple_map_has_no_descriptor() {
    let settings = Settings {
        max_size: 1 << 40,
        tags: vec!["a".into(), "b".into()],
    };
    let bytes = roundtrip(&settings);
    assert_eq!(bytes[0], 0xc1);

    let value = AmqpValue::from_bytes(&bytes).unwrap();
    let AmqpValue::Map(entries) = value else {
        panic!("expected a map, got {:?}", value);
    };
    assert_eq!(entries[0].0, AmqpValue::Symbol("max-size".into()));
}

#[test]
fn test_simple_list_keeps_declaration_order() {
    let bytes = roundtrip(&Pair {
        first: 1,
        second: 2,
    });
    assert_eq!(bytes, vec![0xc0, 0x05, 0x02, 0x54, 0x01, 0x54, 0x02]);
}

// -----------------------------------------------------------------------
// Every member kind
// -----------------------------------------------------------------------

#[test]
fn test_every_member_kind_roundtrips() {
    let mut map = BTreeMap::new();
    map.insert("neg".to_string(), -42);
    map.insert("big".to_string(), i64::MAX);

    let value = Everything {
        flag: true,
        small: 200,
        word: 65535,
        int: -70000,
        long: 1 << 50,
        ratio: 0.25,
        letter: 'λ',
        text: "héllo".into(),
        symbol: Symbol::new("amqp:accepted:list"),
        blob: Binary(vec![0, 1, 2, 255]),
        at: Timestamp::from_millis(1_700_000_000_000),
        list: vec![1, 300, 65535],
        map,
        dynamic: AmqpValue::List(vec![AmqpValue::Int(-1), AmqpValue::Null]),
        nested: Some(Frame {
            a: None,
            b: Some(3),
            c: None,
        }),
    };
    roundtrip(&value);
    roundtrip(&Everything::default());
}

#[test]
fn test_generic_containers_at_top_level() {
    roundtrip(&vec![Some(1u32), None, Some(3)]);

    let mut map = HashMap::new();
    map.insert(Symbol::new("k1"), vec![1i64, -1]);
    map.insert(Symbol::new("k2"), Vec::new());
    roundtrip(&map);

    let serializer = ContractSerializer::new();
    assert_eq!(
        serializer.resolve::<HashMap<Symbol, Vec<i64>>>().unwrap().variant(),
        Variant::GenericMap
    );
}

#[test]
fn test_narrower_wire_integers_are_widened() {
    let wire = AmqpValue::Described(
        Descriptor::Code(0x20),
        Box::new(AmqpValue::List(vec![
            AmqpValue::UByte(7),
            AmqpValue::UShort(600),
        ])),
    );
    let frame: Frame = ContractSerializer::new()
        .read(&mut ByteBuffer::from(wire.to_bytes().unwrap()))
        .unwrap();
    assert_eq!(frame.a, Some(7));
    assert_eq!(frame.b, Some(600));
}

// -----------------------------------------------------------------------
// Self-describing types
// -----------------------------------------------------------------------

#[derive(Debug, Default, PartialEq)]
struct Fingerprint([u8; 4]);

impl AmqpType for Fingerprint {
    fn shape() -> TypeShape {
        TypeShape::opaque().with_serializable(SerializableShape::of::<Self>())
    }
}

impl AmqpSerializable for Fingerprint {
    fn encode(&self, buf: &mut ByteBuffer) -> Result<()> {
        encoding::write_binary(buf, &self.0)
    }

    fn decode(&mut self, buf: &mut ByteBuffer) -> Result<()> {
        match AmqpValue::decode(buf)? {
            AmqpValue::Binary(bytes) if bytes.len() == 4 => {
                self.0.copy_from_slice(&bytes);
                Ok(())
            }
            other => Err(Error::MalformedWireData(format!(
                "fingerprint expects 4 bytes of binary, got {}",
                other.kind()
            ))),
        }
    }
}

#[derive(AmqpContract, Debug, Default, PartialEq)]
#[amqp(encoding = "list", code = 0x23)]
struct Signed {
    payload: String,
    fingerprint: Fingerprint,
}

#[test]
fn test_self_describing_member() {
    let bytes = roundtrip(&Signed {
        payload: "p".into(),
        fingerprint: Fingerprint([0xde, 0xad, 0xbe, 0xef]),
    });
    assert_eq!(
        &bytes[bytes.len() - 6..],
        &[0xa0, 0x04, 0xde, 0xad, 0xbe, 0xef]
    );
    assert_eq!(
        ContractSerializer::new()
            .resolve::<Fingerprint>()
            .unwrap()
            .variant(),
        Variant::AmqpSerializable
    );
}

// -----------------------------------------------------------------------
// Hooks and inheritance
// -----------------------------------------------------------------------

#[derive(AmqpContract, Debug, Default)]
#[amqp(
    encoding = "list",
    code = 0x24,
    before_encode = "on_before_encode",
    after_encode = "on_after_encode",
    before_decode = "on_before_decode",
    after_decode = "on_after_decode"
)]
struct Traced {
    value: u32,
    #[amqp(skip)]
    trace: RefCell<Vec<String>>,
}

impl Traced {
    fn on_before_encode(&self) {
        self.trace.borrow_mut().push("before_encode".into());
    }

    fn on_after_encode(&self) {
        self.trace.borrow_mut().push("after_encode".into());
    }

    fn on_before_decode(&mut self) {
        let value = self.value;
        self.trace.get_mut().push(format!("before_decode {}", value));
    }

    fn on_after_decode(&mut self) -> Result<()> {
        let value = self.value;
        self.trace.get_mut().push(format!("after_decode {}", value));
        if value == 13 {
            return Err(Error::MalformedWireData("13 is reserved".into()));
        }
        Ok(())
    }
}

#[test]
fn test_hooks_run_around_members() {
    let serializer = ContractSerializer::new();
    let traced = Traced {
        value: 42,
        trace: RefCell::default(),
    };
    let mut buf = ByteBuffer::new();
    serializer.write_object(&mut buf, &traced).unwrap();
    assert_eq!(
        *traced.trace.borrow(),
        vec!["before_encode".to_string(), "after_encode".to_string()]
    );

    let decoded: Traced = serializer.read(&mut buf).unwrap();
    assert_eq!(decoded.value, 42);
    assert_eq!(
        decoded.trace.into_inner(),
        vec!["before_decode 0".to_string(), "after_decode 42".to_string()]
    );
}

#[derive(AmqpContract, Debug, Default)]
#[amqp(
    encoding = "list",
    code = 0x25,
    before_encode = "first_check",
    before_encode = "second_check"
)]
struct DoubleHooked {
    value: u32,
    #[amqp(skip)]
    calls: RefCell<Vec<&'static str>>,
}

impl DoubleHooked {
    fn first_check(&self) {
        self.calls.borrow_mut().push("first");
    }

    fn second_check(&self) {
        self.calls.borrow_mut().push("second");
    }
}

#[test]
fn test_first_hook_of_a_role_wins() {
    let serializer = ContractSerializer::new();
    let value = DoubleHooked {
        value: 1,
        calls: RefCell::default(),
    };
    let mut buf = ByteBuffer::new();
    serializer.write_object(&mut buf, &value).unwrap();
    serializer.write_object(&mut buf, &value).unwrap();
    assert_eq!(*value.calls.borrow(), vec!["first", "first"]);
}

#[test]
fn test_hook_error_fails_decode() {
    let serializer = ContractSerializer::new();
    let mut buf = ByteBuffer::new();
    serializer
        .write_object(
            &mut buf,
            &Traced {
                value: 13,
                trace: RefCell::default(),
            },
        )
        .unwrap();
    let err = serializer.read::<Traced>(&mut buf).unwrap_err();
    assert!(matches!(err, Error::MalformedWireData(_)));
    assert_eq!(buf.offset(), 0);
}

#[derive(AmqpContract, Debug, Default, PartialEq)]
#[amqp(encoding = "list", code = 0x30, after_decode = "mark")]
struct Header {
    durable: bool,
    priority: u8,
    #[amqp(skip)]
    marked: bool,
}

impl Header {
    fn mark(&mut self) {
        self.marked = true;
    }
}

#[derive(AmqpContract, Debug, Default, PartialEq)]
#[amqp(encoding = "list", code = 0x31)]
struct ExtendedHeader {
    #[amqp(base)]
    header: Header,
    ttl: Option<u32>,
}

#[test]
fn test_base_members_come_first() {
    let serializer = ContractSerializer::new();
    let value = ExtendedHeader {
        header: Header {
            durable: true,
            priority: 4,
            marked: false,
        },
        ttl: Some(1000),
    };
    let mut buf = ByteBuffer::new();
    serializer.write_object(&mut buf, &value).unwrap();
    assert_eq!(
        buf.as_slice(),
        &[0x00, 0x53, 0x31, 0xc0, 0x09, 0x03, 0x41, 0x50, 0x04, 0x70, 0x00, 0x00, 0x03, 0xe8]
    );

    let decoded: ExtendedHeader = serializer.read(&mut buf).unwrap();
    assert_eq!(decoded.header.priority, 4);
    assert_eq!(decoded.ttl, Some(1000));
    // inherited after_decode hook ran on the embedded base
    assert!(decoded.header.marked);

    let compiled = serializer.resolve::<ExtendedHeader>().unwrap();
    let orders: Vec<(String, i32)> = compiled
        .members()
        .iter()
        .map(|m| (m.name.clone(), m.order))
        .collect();
    assert_eq!(
        orders,
        vec![
            ("durable".to_string(), 1),
            ("priority".to_string(), 2),
            ("ttl".to_string(), 3)
        ]
    );
}

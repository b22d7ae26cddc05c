// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// Concurrent first use: threads racing to compile the same type must all end
// up with the single published descriptor and produce identical bytes.

#![allow(clippy::missing_panics_doc)]

use amqp_contract::{AmqpContract, ByteBuffer, CompiledType, ContractSerializer};
use std::collections::BTreeMap;
use std::sync::{Arc, Barrier};
use std::thread;

const THREADS: usize = 8;

#[derive(AmqpContract, Debug, Default, PartialEq)]
#[amqp(encoding = "list", name = "test:transfer", code = 0x60)]
struct Transfer {
    handle: u32,
    delivery_id: Option<u32>,
    tag: Vec<u8>,
    settled: Option<bool>,
    properties: BTreeMap<String, String>,
    sections: Vec<Section>,
}

#[derive(AmqpContract, Debug, Default, PartialEq)]
#[amqp(encoding = "map", name = "test:section")]
struct Section {
    kind: String,
    body: Vec<u8>,
}

fn sample(i: u32) -> Transfer {
    let mut properties = BTreeMap::new();
    properties.insert("subject".to_string(), format!("s{}", i));
    Transfer {
        handle: i,
        delivery_id: Some(i * 10),
        tag: vec![1, 2, 3],
        settled: None,
        properties,
        sections: vec![Section {
            kind: "data".into(),
            body: vec![0; 16],
        }],
    }
}

#[test]
fn test_racing_compiles_publish_one_descriptor() {
    let serializer = ContractSerializer::new();
    let barrier = Barrier::new(THREADS);

    let results: Vec<(Arc<CompiledType>, Vec<u8>)> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                s.spawn(|| {
                    barrier.wait();
                    let compiled = serializer.resolve::<Transfer>().unwrap();
                    let mut buf = ByteBuffer::new();
                    serializer.write_object(&mut buf, &sample(1)).unwrap();
                    (compiled, buf.into_vec())
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let (first, bytes) = &results[0];
    for (compiled, other) in &results[1..] {
        assert!(Arc::ptr_eq(first, compiled));
        assert_eq!(bytes, other);
    }

    let cached = serializer.resolve::<Transfer>().unwrap();
    assert!(Arc::ptr_eq(first, &cached));
    assert_eq!(serializer.read::<Transfer>(&mut ByteBuffer::from(bytes.clone())).unwrap(), sample(1));
}

#[test]
fn test_parallel_roundtrips_share_the_cache() {
    let serializer = ContractSerializer::new();
    let barrier = Barrier::new(THREADS);

    thread::scope(|s| {
        for t in 0..THREADS as u32 {
            let serializer = &serializer;
            let barrier = &barrier;
            s.spawn(move || {
                barrier.wait();
                for i in 0..50 {
                    let value = sample(t * 100 + i);
                    let mut buf = ByteBuffer::new();
                    serializer.write_object(&mut buf, &value).unwrap();
                    let decoded: Transfer = serializer.read(&mut buf).unwrap();
                    assert_eq!(decoded, value);
                }
            });
        }
    });

    let stats = serializer.cache_stats();
    assert!(stats.hits > 0);
    assert!(serializer.is_compiled::<Section>());
}

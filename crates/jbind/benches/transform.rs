// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Transform Throughput Benchmark
//!
//! Measures parse and stringify over:
//! - Flat arrays of increasing element counts
//! - Arrays of polymorphic elements routed by discriminator
//! - Identity graphs with heavy reference sharing
//!
//! All documents are generated with a fixed seed so runs are comparable.

#![allow(clippy::uninlined_format_args)]
#![allow(clippy::cast_precision_loss)]

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use jbind::{
    ClassBuilder, Context, IdentityInfo, ObjectMapper, TypeInclude, TypeInfo, TypeRef,
    TypedObject, TypedValue,
};
use std::hint::black_box as bb;

fn event_mapper() -> ObjectMapper {
    let mapper = ObjectMapper::new();
    mapper
        .registry()
        .register(
            ClassBuilder::new("Event")
                .int_property("seq")
                .string_property("source")
                .int_property("level")
                .string_property("message")
                .bool_property("flag")
                .build()
                .expect("schema should build"),
        )
        .expect("registration should succeed");
    mapper.set_default_context(Context::new().with_root_type(TypeRef::array(TypeRef::class("Event"))));
    mapper
}

fn event_array(n: usize) -> String {
    fastrand::seed(7);
    let items: Vec<String> = (0..n)
        .map(|i| {
            format!(
                r#"{{"seq":{},"source":"node-{}","level":{},"message":"evt {} fired","flag":{}}}"#,
                i,
                fastrand::u32(0..16),
                fastrand::u32(0..8),
                i,
                i % 2 == 0
            )
        })
        .collect();
    format!("[{}]", items.join(","))
}

/// Benchmark decoding flat arrays of monomorphic objects
fn bench_parse_flat_arrays(c: &mut Criterion) {
    let mapper = event_mapper();
    let mut group = c.benchmark_group("parse_flat_array");

    for n in [16, 256, 4096] {
        let doc = event_array(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &doc, |b, doc| {
            b.iter(|| mapper.parse(bb(doc)).expect("parse should succeed"));
        });
    }

    group.finish();
}

/// Benchmark encoding the same graphs back to text
fn bench_stringify_flat_arrays(c: &mut Criterion) {
    let mapper = event_mapper();
    let mut group = c.benchmark_group("stringify_flat_array");

    for n in [16, 256, 4096] {
        let graph = mapper
            .parse(&event_array(n))
            .expect("parse should succeed");
        group.bench_with_input(BenchmarkId::from_parameter(n), &graph, |b, graph| {
            b.iter(|| mapper.stringify(bb(graph)).expect("stringify should succeed"));
        });
    }

    group.finish();
}

/// Benchmark discriminator routing across three subtypes
fn bench_polymorphic_routing(c: &mut Criterion) {
    let mapper = ObjectMapper::new();
    mapper
        .registry()
        .register(
            ClassBuilder::new("Shape")
                .type_info(TypeInfo::new(TypeInclude::Property))
                .subtype_named("Circle", "circle")
                .subtype_named("Rect", "rect")
                .subtype_named("Tri", "tri")
                .build()
                .expect("schema should build"),
        )
        .expect("registration should succeed");
    mapper
        .registry()
        .register(
            ClassBuilder::new("Circle")
                .extends("Shape")
                .float_property("r")
                .build()
                .expect("schema should build"),
        )
        .expect("registration should succeed");
    mapper
        .registry()
        .register(
            ClassBuilder::new("Rect")
                .extends("Shape")
                .float_property("w")
                .float_property("h")
                .build()
                .expect("schema should build"),
        )
        .expect("registration should succeed");
    mapper
        .registry()
        .register(
            ClassBuilder::new("Tri")
                .extends("Shape")
                .float_property("a")
                .build()
                .expect("schema should build"),
        )
        .expect("registration should succeed");
    mapper.set_default_context(Context::new().with_root_type(TypeRef::array(TypeRef::class("Shape"))));

    let mut group = c.benchmark_group("parse_polymorphic");
    for n in [64, 1024] {
        let items: Vec<String> = (0..n)
            .map(|i| match i % 3 {
                0 => format!(r#"{{"@type":"circle","r":{}.5}}"#, i),
                1 => format!(r#"{{"@type":"rect","w":{}.0,"h":2.0}}"#, i),
                _ => format!(r#"{{"@type":"tri","a":{}.25}}"#, i),
            })
            .collect();
        let doc = format!("[{}]", items.join(","));
        group.bench_with_input(BenchmarkId::from_parameter(n), &doc, |b, doc| {
            b.iter(|| mapper.parse(bb(doc)).expect("parse should succeed"));
        });
    }
    group.finish();
}

/// Benchmark reference collapse and restore around one shared instance
fn bench_identity_sharing(c: &mut Criterion) {
    let mapper = ObjectMapper::new();
    mapper
        .registry()
        .register(
            ClassBuilder::new("Peer")
                .int_property("id")
                .string_property("name")
                .identity(IdentityInfo::property("id"))
                .build()
                .expect("schema should build"),
        )
        .expect("registration should succeed");
    mapper.set_default_context(Context::new().with_root_type(TypeRef::array(TypeRef::class("Peer"))));

    let mut group = c.benchmark_group("identity_sharing");

    let mut doc = String::from(r#"[{"id":1,"name":"hub"}"#);
    for _ in 0..255 {
        doc.push_str(",1");
    }
    doc.push(']');
    group.bench_function("decode_shared", |b| {
        b.iter(|| mapper.parse(bb(&doc)).expect("parse should succeed"));
    });

    let hub = TypedObject::new("Peer")
        .with("id", 1)
        .with("name", "hub")
        .into_value();
    let graph = TypedValue::Array(vec![hub; 256]);
    group.bench_function("encode_shared", |b| {
        b.iter(|| mapper.stringify(bb(&graph)).expect("stringify should succeed"));
    });

    group.finish();
}

criterion_group!(
    transform_benches,
    bench_parse_flat_arrays,
    bench_stringify_flat_arrays,
    bench_polymorphic_routing,
    bench_identity_sharing
);
criterion_main!(transform_benches);

//! Benchmarks for value marshaling and store access.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use reg_store::{AccessRights, FromRegValue, RegValue, Registry, ValueType};

fn bench_encode(c: &mut Criterion) {
    let text = "The quick brown fox jumps over the lazy dog".to_string();
    let list: Vec<String> = (0..16).map(|i| format!("entry-{:02}", i)).collect();

    c.bench_function("encode_text", |b| {
        b.iter(|| black_box(RegValue::Text(text.clone()).into_tagged_bytes()))
    });

    c.bench_function("encode_text_list", |b| {
        b.iter(|| black_box(RegValue::TextList(list.clone()).into_tagged_bytes()))
    });
}

fn bench_decode(c: &mut Criterion) {
    let (text_tag, text_bytes) =
        RegValue::Text("The quick brown fox jumps over the lazy dog".to_string())
            .into_tagged_bytes();
    let list: Vec<String> = (0..16).map(|i| format!("entry-{:02}", i)).collect();
    let (list_tag, list_bytes) = RegValue::TextList(list).into_tagged_bytes();

    c.bench_function("decode_text", |b| {
        b.iter(|| black_box(String::from_reg_value(text_tag, &text_bytes).unwrap()))
    });

    c.bench_function("decode_text_list", |b| {
        b.iter(|| black_box(Vec::<String>::from_reg_value(list_tag, &list_bytes).unwrap()))
    });

    c.bench_function("decode_dynamic", |b| {
        b.iter(|| black_box(RegValue::from_tagged_bytes(ValueType::String, &text_bytes).unwrap()))
    });
}

fn bench_store(c: &mut Criterion) {
    let key = Registry::current_user()
        .create_subkey_with("Software\\bench_marshal", AccessRights::ALL)
        .unwrap();
    key.set_dword("counter", 1, false).unwrap();

    c.bench_function("store_set_dword", |b| {
        b.iter(|| key.set_dword("counter", black_box(2), false).unwrap())
    });

    c.bench_function("store_get_dword", |b| {
        b.iter(|| black_box(key.get_value("counter", 0i32).unwrap()))
    });
}

criterion_group!(benches, bench_encode, bench_decode, bench_store);
criterion_main!(benches);

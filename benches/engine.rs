//! Settings engine benchmarks: parse, render, reconstruct, toggle.

#![allow(clippy::semicolon_if_nothing_returned)]

use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::hint::black_box;

use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use cwatm_settings::{
    ConfigDocument, Display, EditSession, PendingEditCache, SectionId, reconstruct,
    resolve_placeholders,
};

/// A settings file with `sections` sections of `keys` lines each.
fn build_settings(sections: usize, keys: usize) -> String {
    let mut text = String::from("# generated settings\n");
    for s in 0..sections {
        let _ = writeln!(text, "[SECTION_{s}]");
        for k in 0..keys {
            match k % 4 {
                0 => {
                    let _ = writeln!(text, "flag{k} = True");
                }
                1 => {
                    let _ = writeln!(text, "# comment {k}");
                }
                2 => {
                    let _ = writeln!(text, "path{k} = $(FILE_PATHS:PathRoot)/maps/{s}_{k}.map");
                }
                _ => {
                    let _ = writeln!(text, "value{k} = {}", s * k);
                }
            }
        }
    }
    text
}

fn every_other(doc: &ConfigDocument) -> BTreeSet<SectionId> {
    doc.section_ids().into_iter().step_by(2).collect()
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for sections in [10usize, 100] {
        let text = build_settings(sections, 40);
        group.bench_with_input(BenchmarkId::new("sections", sections), &text, |b, text| {
            b.iter(|| ConfigDocument::parse(black_box(text)));
        });
    }
    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let doc = ConfigDocument::parse(&build_settings(100, 40));
    let none = BTreeSet::new();
    let half = every_other(&doc);

    c.bench_function("render_expanded", |b| {
        b.iter(|| Display::render(black_box(&doc), &none));
    });
    c.bench_function("render_half_collapsed", |b| {
        b.iter(|| Display::render(black_box(&doc), &half));
    });
}

fn bench_reconstruct(c: &mut Criterion) {
    let text = build_settings(100, 40);
    let doc = ConfigDocument::parse(&text);
    let collapsed = every_other(&doc);
    let display = Display::render(&doc, &collapsed).to_text();
    let mut cache = PendingEditCache::new();
    cache.store(&text);
    let empty = PendingEditCache::new();

    c.bench_function("reconstruct_from_cache", |b| {
        b.iter(|| reconstruct(black_box(&display), &collapsed, &cache, &doc));
    });
    c.bench_function("reconstruct_from_document", |b| {
        b.iter(|| reconstruct(black_box(&display), &collapsed, &empty, &doc));
    });
}

fn bench_toggle(c: &mut Criterion) {
    let text = build_settings(100, 40);

    c.bench_function("session_toggle target<10ms", |b| {
        b.iter_batched(
            || EditSession::from_text(&text, "bench.ini"),
            |mut session| {
                let _ = session.toggle("[SECTION_50]");
                session
            },
            BatchSize::SmallInput,
        );
    });

    c.bench_function("session_collapse_all", |b| {
        b.iter_batched(
            || EditSession::from_text(&text, "bench.ini"),
            |mut session| {
                let _ = session.collapse_all();
                session
            },
            BatchSize::LargeInput,
        );
    });
}

fn bench_placeholders(c: &mut Criterion) {
    let mut text = build_settings(20, 8);
    text.push_str("[FILE_PATHS]\nPathRoot = $(FILE_PATHS:Base)/cwatm\nBase = /data\n");

    c.bench_function("resolve_nested_placeholder", |b| {
        b.iter(|| resolve_placeholders(black_box("$(SECTION_3:path2)"), &text));
    });
}

criterion_group!(
    benches,
    bench_parse,
    bench_render,
    bench_reconstruct,
    bench_toggle,
    bench_placeholders
);
criterion_main!(benches);

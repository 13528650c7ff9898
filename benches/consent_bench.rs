use criterion::{black_box, criterion_group, criterion_main, Criterion};

use serde_json::json;
use story_consent::{select_foreground_color, validate, BackgroundSample};

fn bench_validate(c: &mut Criterion) {
    let raw = json!({
        "title": "Foo title.",
        "message": "Foo message about the consent.",
        "vendors": ["Item 1", "Item 2", "Item 3"],
        "onlyAccept": true,
        "externalLink": { "title": "Privacy settings", "href": "https://example.com" },
    });

    c.bench_function("validate_config", |b| {
        b.iter(|| validate(black_box(&raw)).unwrap())
    });
}

fn bench_contrast(c: &mut Criterion) {
    let colors = ["rgb(0, 0, 0)", "rgba(12, 200, 90, 0.4)", "#336699", "transparent"];

    c.bench_function("parse_and_select_foreground", |b| {
        b.iter(|| {
            for s in colors {
                let sample: BackgroundSample = black_box(s).parse().unwrap();
                black_box(select_foreground_color(sample));
            }
        })
    });
}

criterion_group!(benches, bench_validate, bench_contrast);
criterion_main!(benches);

// SPDX-License-Identifier: Apache-2.0

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use feedvault_model::{HiddenLabel, MonthKey, Post, RawPost};
use feedvault_query::{filter_posts, FeedCriteria, SortDirection};

fn synthetic_posts(count: usize) -> Vec<Post> {
    (0..count)
        .map(|i| {
            let month = MonthKey::from_year_month(2024, (i % 12) as u8 + 1).expect("month");
            let raw = RawPost {
                member: format!("m{}", i % 9),
                date: format!("{month}-{:02}T{:02}:00:00Z", i % 28 + 1, i % 24),
                translation: format!("translated post number {i} about tea"),
                original: Some(format!("原文 {i}")),
                tags: Some(vec![format!("tag{}", i % 5)]),
                hidden_label: Some(HiddenLabel::Many(vec![format!("L{}", i % 3)])),
                annotations: None,
            };
            let mut post = Post::stamp(raw, month);
            post.set_load_index(i);
            post
        })
        .collect()
}

fn bench_filter(c: &mut Criterion) {
    let posts = synthetic_posts(20_000);
    let unconstrained = FeedCriteria::default();
    let searched = FeedCriteria::default()
        .with_search("TEA")
        .with_hidden_label("L1")
        .with_sort(SortDirection::OldestFirst);
    c.bench_function("filter_unconstrained_20k", |b| {
        b.iter(|| filter_posts(black_box(&posts), black_box(&unconstrained)).len())
    });
    c.bench_function("filter_search_label_20k", |b| {
        b.iter(|| filter_posts(black_box(&posts), black_box(&searched)).len())
    });
}

criterion_group!(benches, bench_filter);
criterion_main!(benches);

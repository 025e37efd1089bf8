// SPDX-License-Identifier: Apache-2.0

use feedvault_model::{MonthKey, Post, RawPost};
use feedvault_query::{filter_posts, FeedCriteria, FeedView, SortDirection};

fn month(raw: &str) -> MonthKey {
    MonthKey::parse(raw).expect("month")
}

/// Stamps posts and assigns arrival order the way the aggregate store does.
fn collection(records: &[(&str, &str)]) -> Vec<Post> {
    records
        .iter()
        .enumerate()
        .map(|(index, (shard, json))| {
            let raw: RawPost = serde_json::from_str(json).expect("raw post");
            let mut post = Post::stamp(raw, month(shard));
            post.set_load_index(index);
            post
        })
        .collect()
}

fn translations(posts: &[&Post]) -> Vec<String> {
    posts.iter().map(|p| p.translation().to_string()).collect()
}

#[test]
fn identical_timestamps_break_ties_by_arrival() {
    let posts = collection(&[
        ("2024-01", r#"{"member":"m1","date":"2024-01-10T09:00:00Z","translation":"first"}"#),
        ("2024-01", r#"{"member":"m1","date":"2024-01-11T09:00:00Z","translation":"later day"}"#),
        ("2024-01", r#"{"member":"m2","date":"2024-01-10T09:00:00Z","translation":"second"}"#),
    ]);
    let newest = filter_posts(&posts, &FeedCriteria::default());
    assert_eq!(translations(&newest), vec!["later day", "second", "first"]);

    let oldest = filter_posts(
        &posts,
        &FeedCriteria::default().with_sort(SortDirection::OldestFirst),
    );
    assert_eq!(translations(&oldest), vec!["first", "second", "later day"]);
}

#[test]
fn filtering_twice_is_identical() {
    let posts = collection(&[
        ("2024-01", r#"{"member":"m1","date":"2024-01-10","translation":"a"}"#),
        ("2024-01", r#"{"member":"m1","date":"2024-01-10","translation":"b"}"#),
        ("2024-02", r#"{"member":"m2","date":"bogus","translation":"c"}"#),
    ]);
    let criteria = FeedCriteria::default().with_search("");
    let first: Vec<usize> = filter_posts(&posts, &criteria).iter().map(|p| p.load_index()).collect();
    let second: Vec<usize> = filter_posts(&posts, &criteria).iter().map(|p| p.load_index()).collect();
    assert_eq!(first, second);
}

#[test]
fn unparseable_dates_sort_to_the_oldest_end() {
    let posts = collection(&[
        ("2024-01", r#"{"member":"m1","date":"someday","translation":"undated"}"#),
        ("2024-01", r#"{"member":"m1","date":"2024-01-02T00:00:00Z","translation":"dated"}"#),
    ]);
    let newest = filter_posts(&posts, &FeedCriteria::default());
    assert_eq!(translations(&newest), vec!["dated", "undated"]);
    let oldest = filter_posts(
        &posts,
        &FeedCriteria::default().with_sort(SortDirection::OldestFirst),
    );
    assert_eq!(translations(&oldest), vec!["undated", "dated"]);
}

#[test]
fn search_matches_translation_or_original() {
    let posts = collection(&[
        ("2024-01", r#"{"member":"m1","date":"2024-01-01","translation":"hello","original":"ハロー"}"#),
        ("2024-01", r#"{"member":"m1","date":"2024-01-02","translation":"goodbye"}"#),
    ]);
    for needle in ["hello", "HeLLo", "ハロ", "ロー", "ﾊﾛｰ"] {
        let hits = filter_posts(&posts, &FeedCriteria::default().with_search(needle));
        assert_eq!(translations(&hits), vec!["hello"], "needle {needle}");
    }
    let none = filter_posts(&posts, &FeedCriteria::default().with_search("ハローワールド"));
    assert!(none.is_empty());
}

#[test]
fn hidden_label_scalar_and_list_both_match() {
    let posts = collection(&[
        ("2024-01", r#"{"member":"m1","date":"2024-01-01","translation":"scalar","hidden_label":"A"}"#),
        ("2024-01", r#"{"member":"m1","date":"2024-01-02","translation":"list","hidden_label":["A","B"]}"#),
        ("2024-01", r#"{"member":"m1","date":"2024-01-03","translation":"other","hidden_label":"B"}"#),
        ("2024-01", r#"{"member":"m1","date":"2024-01-04","translation":"none"}"#),
    ]);
    let hits = filter_posts(&posts, &FeedCriteria::default().with_hidden_label("A"));
    assert_eq!(translations(&hits), vec!["list", "scalar"]);
}

#[test]
fn constraints_combine_with_and() {
    let posts = collection(&[
        ("2024-01", r#"{"member":"m1","date":"2024-01-01","translation":"jan tea","tags":["tea"]}"#),
        ("2024-02", r#"{"member":"m1","date":"2024-02-01","translation":"feb tea","tags":["tea"]}"#),
        ("2024-02", r#"{"member":"m2","date":"2024-02-02","translation":"feb tea too","tags":["tea"]}"#),
        ("2024-02", r#"{"member":"m1","date":"2024-02-03","translation":"feb coffee","tags":["Tea"]}"#),
    ]);
    let criteria = FeedCriteria::default()
        .with_member("m1")
        .with_month(month("2024-02"))
        .with_tag("tea")
        .with_search("tea");
    let hits = filter_posts(&posts, &criteria);
    assert_eq!(translations(&hits), vec!["feb tea"]);
}

#[test]
fn posts_without_known_members_still_match() {
    let posts = collection(&[(
        "2024-01",
        r#"{"member":"ghost","date":"2024-01-01","translation":"orphan"}"#,
    )]);
    assert_eq!(filter_posts(&posts, &FeedCriteria::default()).len(), 1);
}

#[test]
fn feed_view_resolves_clamped_ranges() {
    let posts = collection(&[
        ("2024-01", r#"{"member":"m1","date":"2024-01-01","translation":"a"}"#),
        ("2024-01", r#"{"member":"m1","date":"2024-01-02","translation":"b"}"#),
        ("2024-01", r#"{"member":"m1","date":"2024-01-03","translation":"c"}"#),
    ]);
    let view = FeedView::build(&posts, &FeedCriteria::default());
    assert_eq!(view.positions(), &[2, 1, 0]);
    assert_eq!(translations(&view.resolve(&posts, 1..10)), vec!["b", "a"]);
    assert!(view.resolve(&posts, 5..9).is_empty());
}

// SPDX-License-Identifier: Apache-2.0

use feedvault_model::{MemberDirectory, MonthKey, Post};
use feedvault_query::{FeedCriteria, SortDirection};
use feedvault_runtime::{
    resolve_author, FeedCommand, FeedConfig, FeedRenderer, FeedRuntime, FeedSession,
};
use feedvault_store::{FakeShardSource, ShardLoader};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

fn m(s: &str) -> MonthKey {
    MonthKey::parse(s).expect("month")
}

#[derive(Default)]
struct Recorder {
    resets: Vec<Vec<String>>,
    appends: Vec<Vec<String>>,
    index_updates: Vec<(Vec<MonthKey>, Vec<String>)>,
    skipped: usize,
}

impl Recorder {
    fn shown(&mut self, members: &MemberDirectory, posts: &[&Post]) -> Vec<String> {
        let mut shown = Vec::new();
        for post in posts {
            match resolve_author(members, post) {
                Some(author) => shown.push(format!("{}: {}", author.name, post.translation())),
                None => self.skipped += 1,
            }
        }
        shown
    }
}

impl FeedRenderer for Recorder {
    fn reset(&mut self, members: &MemberDirectory, posts: &[&Post]) {
        let shown = self.shown(members, posts);
        self.resets.push(shown);
    }

    fn append(&mut self, members: &MemberDirectory, posts: &[&Post]) {
        let shown = self.shown(members, posts);
        self.appends.push(shown);
    }

    fn indexes_changed(&mut self, months: &[MonthKey], hidden_labels: &[String]) {
        self.index_updates
            .push((months.to_vec(), hidden_labels.to_vec()));
    }
}

fn shard(month: &str, posts: &[(u32, &str, &str)]) -> String {
    let records: Vec<serde_json::Value> = posts
        .iter()
        .map(|(day, member, tag)| {
            serde_json::json!({
                "member": member,
                "date": format!("{month}-{day:02}T08:00:00Z"),
                "translation": format!("{month}/{day}"),
                "tags": [tag],
                "hidden_label": if *tag == "tea" { serde_json::json!("drinks") } else { serde_json::json!(["misc", "drinks"]) },
            })
        })
        .collect();
    serde_json::to_string(&records).expect("shard json")
}

// Months 2024-01..=2024-09 with a sparse archive:
// 02: 2 posts, 04: 1, 05: 1, 06: empty array, 07: 2, 08: 1, others absent.
async fn archive(delay: Duration) -> Arc<FakeShardSource> {
    let fake = Arc::new(FakeShardSource::new().with_delay(delay));
    fake.put_members(r#"[{"id":"m1","name":"Aki","avatar":"a.png"},{"id":"m2","name":"Ren","avatar":"r.png","displayId":"@ren"}]"#)
        .await;
    fake.put_shard(m("2024-02"), &shard("2024-02", &[(3, "m1", "tea"), (9, "m2", "coffee")]))
        .await;
    fake.put_shard(m("2024-04"), &shard("2024-04", &[(1, "m2", "tea")]))
        .await;
    fake.put_shard(m("2024-05"), &shard("2024-05", &[(2, "ghost", "tea")]))
        .await;
    fake.put_shard(m("2024-06"), "[]").await;
    fake.put_shard(m("2024-07"), &shard("2024-07", &[(4, "m1", "coffee"), (5, "m1", "tea")]))
        .await;
    fake.put_shard(m("2024-08"), &shard("2024-08", &[(6, "m2", "tea")]))
        .await;
    fake
}

fn runtime(fake: Arc<FakeShardSource>) -> FeedRuntime {
    let config = FeedConfig {
        base_url: "https://archive.example.org".to_string(),
        ..FeedConfig::default()
    };
    FeedRuntime::new(ShardLoader::new(fake), config, m("2024-09"))
}

#[tokio::test]
async fn bootstrap_paints_empty_then_latest_months() {
    let fake = archive(Duration::ZERO).await;
    let rt = runtime(fake.clone());
    let mut session = FeedSession::new(30);
    let mut recorder = Recorder::default();

    let queue = rt.bootstrap(&mut session, &mut recorder).await;

    assert_eq!(recorder.resets.len(), 2);
    assert!(recorder.resets[0].is_empty());
    assert_eq!(
        recorder.resets[1],
        vec!["Ren: 2024-08/6", "Aki: 2024-07/5", "Aki: 2024-07/4"]
    );
    assert_eq!(recorder.skipped, 1);
    assert_eq!(
        session.distinct_months(),
        vec![m("2024-08"), m("2024-07"), m("2024-05")]
    );

    // 04 was loaded eagerly but trimmed away, so it is fetched again.
    assert_eq!(queue.remaining_months(), 4);
    assert_eq!(queue.remaining_batches(), 2);

    let keys = fake.fetched_keys().await;
    assert!(keys.contains(&"members.json".to_string()));
    for month in ["2024-04", "2024-05", "2024-06", "2024-07", "2024-08", "2024-09"] {
        assert!(keys.contains(&format!("data/{month}.json")), "{month} fetched");
    }
    assert!(!keys.contains(&"data/2024-03.json".to_string()));
}

#[tokio::test]
async fn backfill_loads_remaining_months_newest_first() {
    let fake = archive(Duration::ZERO).await;
    let rt = runtime(fake.clone());
    let mut session = FeedSession::new(30);
    let mut recorder = Recorder::default();

    let queue = rt.bootstrap(&mut session, &mut recorder).await;
    let before = fake.fetched_keys().await.len();
    rt.backfill_all(&mut session, &mut recorder, queue).await;

    let keys = fake.fetched_keys().await;
    let backfilled: Vec<&str> = keys[before..].iter().map(String::as_str).collect();
    assert_eq!(
        backfilled,
        ["data/2024-04.json", "data/2024-03.json", "data/2024-02.json", "data/2024-01.json"]
    );

    assert_eq!(session.store().len(), 7);
    let indexes: Vec<usize> = session.store().posts().iter().map(Post::load_index).collect();
    assert_eq!(indexes, (0..7).collect::<Vec<_>>());
    assert_eq!(
        session.distinct_months(),
        vec![m("2024-08"), m("2024-07"), m("2024-05"), m("2024-04"), m("2024-02")]
    );

    let (months, labels) = recorder.index_updates.last().expect("index update");
    assert_eq!(months.len(), 5);
    assert_eq!(labels, &vec!["drinks".to_string(), "misc".to_string()]);

    let stats = rt.loader().stats();
    assert_eq!(stats.shards_loaded, 7);
    assert_eq!(stats.records_loaded, 8);
}

#[tokio::test]
async fn run_serves_commands_while_backfilling() {
    let fake = archive(Duration::from_millis(5)).await;
    let rt = runtime(fake);
    let (tx, rx) = mpsc::channel(8);
    let mut recorder = Recorder::default();

    tx.send(FeedCommand::SetCriteria(
        FeedCriteria::default()
            .with_search("2024")
            .with_sort(SortDirection::OldestFirst),
    ))
    .await
    .expect("send criteria");
    tx.send(FeedCommand::ApplyTag("tea".to_string()))
        .await
        .expect("send tag");
    drop(tx);

    let session = rt.run(FeedSession::new(2), &mut recorder, rx).await;

    assert_eq!(session.store().len(), 7);
    assert_eq!(session.criteria().tag.as_deref(), Some("tea"));
    assert!(session.criteria().search_text.is_none());
    assert_eq!(session.criteria().sort, SortDirection::OldestFirst);

    let matched: Vec<&str> = session.matched().iter().map(|p| p.translation()).collect();
    assert_eq!(
        matched,
        ["2024-02/3", "2024-04/1", "2024-05/2", "2024-07/5", "2024-08/6"]
    );
    assert_eq!(session.visible().len(), 2);
}

#[tokio::test]
async fn more_appends_only_new_posts() {
    let fake = archive(Duration::ZERO).await;
    let rt = runtime(fake);
    let mut recorder = Recorder::default();
    let mut session = FeedSession::new(2);
    let queue = rt.bootstrap(&mut session, &mut recorder).await;
    rt.backfill_all(&mut session, &mut recorder, queue).await;
    assert_eq!(session.visible().len(), 2);

    for _ in 0..3 {
        FeedRuntime::handle_command(&mut session, &mut recorder, FeedCommand::More);
    }

    // The ghost-authored post is revealed but not shown.
    assert_eq!(
        recorder.appends,
        vec![
            vec!["Aki: 2024-07/4".to_string()],
            vec!["Ren: 2024-04/1".to_string(), "Ren: 2024-02/9".to_string()],
            vec!["Aki: 2024-02/3".to_string()],
        ]
    );
    assert_eq!(session.visible().len(), 7);
    assert!(session.pager().is_exhausted());

    FeedRuntime::handle_command(&mut session, &mut recorder, FeedCommand::More);
    assert_eq!(recorder.appends.len(), 3);
}

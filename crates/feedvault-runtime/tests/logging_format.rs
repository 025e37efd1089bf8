// SPDX-License-Identifier: Apache-2.0

use feedvault_model::MonthKey;
use feedvault_store::{FakeShardSource, ShardLoader};
use std::io;
use std::sync::{Arc, Mutex};
use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

#[derive(Clone, Default)]
struct CaptureSink(Arc<Mutex<Vec<u8>>>);

struct CaptureWriter(Arc<Mutex<Vec<u8>>>);

impl<'a> MakeWriter<'a> for CaptureSink {
    type Writer = CaptureWriter;

    fn make_writer(&'a self) -> Self::Writer {
        CaptureWriter(Arc::clone(&self.0))
    }
}

impl io::Write for CaptureWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .0
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "capture lock poisoned"))?;
        guard.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn shard_failure_is_logged_as_structured_warning() {
    let sink = CaptureSink::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(sink.clone())
        .json()
        .with_max_level(Level::WARN)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let fake = Arc::new(FakeShardSource::new());
    fake.fail_object("data/2024-03.json").await;
    let loader = ShardLoader::new(fake);
    let posts = loader
        .load_shard(MonthKey::parse("2024-03").expect("month"))
        .await;
    assert!(posts.is_empty());

    let bytes = sink.0.lock().expect("capture lock").clone();
    let text = String::from_utf8(bytes).expect("utf8 log output");
    let line = text
        .lines()
        .find(|l| l.contains("shard fetch failed"))
        .expect("warning line");
    let parsed: serde_json::Value = serde_json::from_str(line).expect("json log line");

    assert_eq!(parsed.get("level").and_then(|v| v.as_str()), Some("WARN"));
    let fields = parsed.get("fields").expect("fields object");
    assert_eq!(
        fields.get("month").and_then(|v| v.as_str()),
        Some("2024-03")
    );
    assert!(fields
        .get("error")
        .and_then(|v| v.as_str())
        .is_some_and(|e| e.contains("injected failure")));
}

#[tokio::test]
async fn missing_shard_is_logged_at_warn_level() {
    let sink = CaptureSink::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(sink.clone())
        .json()
        .with_max_level(Level::WARN)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let loader = ShardLoader::new(Arc::new(FakeShardSource::new()));
    let posts = loader
        .load_shard(MonthKey::parse("2024-05").expect("month"))
        .await;
    assert!(posts.is_empty());
    assert_eq!(loader.stats().shards_missing, 1);
    assert_eq!(loader.stats().shards_failed, 0);

    let bytes = sink.0.lock().expect("capture lock").clone();
    let text = String::from_utf8(bytes).expect("utf8 log output");
    let line = text
        .lines()
        .find(|l| l.contains("no shard for month"))
        .expect("missing shard line");
    let parsed: serde_json::Value = serde_json::from_str(line).expect("json log line");
    assert_eq!(parsed.get("level").and_then(|v| v.as_str()), Some("WARN"));
    assert_eq!(
        parsed
            .get("fields")
            .and_then(|f| f.get("month"))
            .and_then(|v| v.as_str()),
        Some("2024-05")
    );
}

#[test]
fn init_tracing_tolerates_repeat_calls() {
    feedvault_runtime::telemetry::init_tracing(true);
    feedvault_runtime::telemetry::init_tracing(false);
}

// SPDX-License-Identifier: Apache-2.0

use crate::config::FeedConfig;
use crate::plan::{BackfillQueue, LoadPlan};
use crate::render::FeedRenderer;
use crate::session::FeedSession;
use feedvault_model::{MonthKey, Post};
use feedvault_query::FeedCriteria;
use feedvault_store::ShardLoader;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::collections::BTreeSet;
use tokio::sync::mpsc;
use tracing::{debug, info};

type LoadedBatch = Vec<(MonthKey, Vec<Post>)>;

/// User input delivered to a running feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedCommand {
    SetCriteria(FeedCriteria),
    ApplyTag(String),
    More,
}

/// Drives one feed session: first paint, then back-fill interleaved with
/// user commands. Everything runs on the calling task, so every handler
/// finishes before the next one starts.
#[derive(Clone)]
pub struct FeedRuntime {
    loader: ShardLoader,
    config: FeedConfig,
    now: MonthKey,
}

impl FeedRuntime {
    #[must_use]
    pub fn new(loader: ShardLoader, config: FeedConfig, now: MonthKey) -> Self {
        Self {
            loader,
            config,
            now,
        }
    }

    #[must_use]
    pub fn loader(&self) -> &ShardLoader {
        &self.loader
    }

    #[must_use]
    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    #[must_use]
    pub fn plan(&self) -> LoadPlan {
        LoadPlan::build(
            self.config.start_month,
            self.now,
            self.config.eager_window_months,
        )
    }

    /// Renders the empty feed, loads members and the eager window together,
    /// trims to the retained months and renders again. Returns the months
    /// still to back-fill.
    pub async fn bootstrap<R>(&self, session: &mut FeedSession, renderer: &mut R) -> BackfillQueue
    where
        R: FeedRenderer + ?Sized,
    {
        renderer.reset(session.members(), &[]);

        let plan = self.plan();
        info!(
            backend = self.loader.backend_tag(),
            start = %plan.start(),
            now = %plan.now(),
            eager = plan.eager().len(),
            "feed bootstrap started"
        );
        let (members, eager) = tokio::join!(
            self.loader.load_members(),
            self.loader.load_shards(plan.eager())
        );

        let empty: BTreeSet<MonthKey> = eager
            .iter()
            .filter(|(_, posts)| posts.is_empty())
            .map(|(month, _)| *month)
            .collect();
        session.install_members(members);
        session.merge_batch(eager);
        session.trim_to_latest_months(self.config.retain_months);
        session.set_criteria(session.criteria().clone());

        let retained = session.store().loaded_months();
        let settled = plan.settled_after_trim(&empty, &retained);
        let queue = BackfillQueue::new(plan.backfill(&settled), self.config.backfill_batch_size);

        Self::render_all(session, renderer);
        info!(
            posts = session.store().len(),
            members = session.members().len(),
            backfill_months = queue.remaining_months(),
            "first paint ready"
        );
        queue
    }

    /// Loads every queued batch in turn without waiting for user input.
    pub async fn backfill_all<R>(
        &self,
        session: &mut FeedSession,
        renderer: &mut R,
        mut queue: BackfillQueue,
    ) where
        R: FeedRenderer + ?Sized,
    {
        while let Some(months) = queue.next_batch() {
            let batch = self.loader.load_shards(&months).await;
            Self::absorb_batch(session, renderer, batch);
        }
        info!(posts = session.store().len(), "back-fill complete");
    }

    /// Bootstraps, then serves `commands` while back-fill proceeds one batch
    /// at a time. Returns once back-fill is done and the channel is closed.
    pub async fn run<R>(
        &self,
        mut session: FeedSession,
        renderer: &mut R,
        mut commands: mpsc::Receiver<FeedCommand>,
    ) -> FeedSession
    where
        R: FeedRenderer + ?Sized,
    {
        let mut queue = self.bootstrap(&mut session, renderer).await;
        let mut in_flight = queue.next_batch().map(|months| self.fetch_batch(months));
        let mut commands_open = true;

        while commands_open || in_flight.is_some() {
            tokio::select! {
                command = commands.recv(), if commands_open => match command {
                    Some(command) => Self::handle_command(&mut session, renderer, command),
                    None => {
                        debug!("command channel closed");
                        commands_open = false;
                    }
                },
                Some(batch) = async {
                    match in_flight.as_mut() {
                        Some(fetch) => Some(fetch.await),
                        None => None,
                    }
                }, if in_flight.is_some() => {
                    Self::absorb_batch(&mut session, renderer, batch);
                    in_flight = queue.next_batch().map(|months| self.fetch_batch(months));
                    if in_flight.is_none() {
                        info!(posts = session.store().len(), "back-fill complete");
                    }
                }
            }
        }
        session
    }

    /// Applies one command and renders its effect.
    pub fn handle_command<R>(session: &mut FeedSession, renderer: &mut R, command: FeedCommand)
    where
        R: FeedRenderer + ?Sized,
    {
        match command {
            FeedCommand::SetCriteria(criteria) => {
                session.set_criteria(criteria);
                Self::render_visible(session, renderer);
            }
            FeedCommand::ApplyTag(tag) => {
                session.apply_tag(tag);
                Self::render_visible(session, renderer);
            }
            FeedCommand::More => {
                if let Some(range) = session.more() {
                    let revealed = session.resolve(range);
                    renderer.append(session.members(), &revealed);
                    session.finish_more();
                }
            }
        }
    }

    fn fetch_batch(&self, months: Vec<MonthKey>) -> BoxFuture<'static, LoadedBatch> {
        let loader = self.loader.clone();
        async move { loader.load_shards(&months).await }.boxed()
    }

    fn absorb_batch<R>(session: &mut FeedSession, renderer: &mut R, batch: LoadedBatch)
    where
        R: FeedRenderer + ?Sized,
    {
        let months: Vec<String> = batch.iter().map(|(m, _)| m.to_string()).collect();
        let added = session.merge_batch(batch);
        debug!(months = ?months, added, total = session.store().len(), "back-fill batch merged");
        if added > 0 {
            Self::render_all(session, renderer);
        }
    }

    fn render_visible<R>(session: &FeedSession, renderer: &mut R)
    where
        R: FeedRenderer + ?Sized,
    {
        renderer.reset(session.members(), &session.visible());
    }

    fn render_all<R>(session: &FeedSession, renderer: &mut R)
    where
        R: FeedRenderer + ?Sized,
    {
        Self::render_visible(session, renderer);
        renderer.indexes_changed(&session.distinct_months(), &session.distinct_hidden_labels());
    }
}

//! One feed instance's event loop.
//!
//! The reconciler and the highlight navigator both mutate the same feed
//! state, so their inputs (push changes, anchors, timer expiries) are
//! serialized through a single update queue and applied one at a time.
//! Comment submission runs outside that queue: it only takes the store
//! write lock for the optimistic insert, so the read path never waits on
//! persistence or notification dispatch.

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::FeedConfig;
use crate::error::FeedError;
use crate::events::FeedEvent;
use crate::highlight::{HighlightEffect, HighlightNavigator, HighlightPhase, TimerRequest};
use crate::models::{Anchor, TimelineEvent, UserEntry};
use crate::notify::{router, UserDirectory};
use crate::push::{PushChange, PushOp};
use crate::store::{Applied, CommentStore, FeedStore, NewComment, NotificationStore};

/// Inputs serialized through the update queue.
#[derive(Debug)]
pub enum FeedUpdate {
    Push(PushChange),
    Anchor(Anchor),
    HighlightTimer { generation: u64 },
}

/// Producer side of the update queue. Cheap to clone; hand one to the
/// push-channel consumer and one to the navigation layer.
#[derive(Clone)]
pub struct FeedHandle {
    update_tx: mpsc::UnboundedSender<FeedUpdate>,
}

impl FeedHandle {
    pub fn send(&self, update: FeedUpdate) -> Result<(), mpsc::error::SendError<FeedUpdate>> {
        self.update_tx.send(update)
    }

    pub fn push(&self, change: PushChange) -> Result<(), mpsc::error::SendError<FeedUpdate>> {
        self.send(FeedUpdate::Push(change))
    }

    pub fn anchor(&self, anchor: Anchor) -> Result<(), mpsc::error::SendError<FeedUpdate>> {
        self.send(FeedUpdate::Anchor(anchor))
    }
}

/// Outcome of a successful comment submission.
#[derive(Debug)]
pub struct SubmitReceipt {
    /// The optimistic local event already folded into the feed.
    pub comment: TimelineEvent,
    /// How many notifications the mention routing produced.
    pub routed: usize,
    /// Set when the notification batch failed to persist. The comment
    /// stands either way; retry policy belongs to the caller.
    pub dispatch_error: Option<FeedError>,
}

/// Comment submission, detached from the update loop so it can be in
/// flight while unrelated reconciler folds are applied.
pub struct CommentComposer<C, N, D> {
    store: Arc<RwLock<FeedStore>>,
    viewer: UserEntry,
    comments: Arc<C>,
    notifications: Arc<N>,
    directory: Arc<D>,
    events_tx: mpsc::UnboundedSender<FeedEvent>,
}

impl<C, N, D> Clone for CommentComposer<C, N, D> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            viewer: self.viewer.clone(),
            comments: self.comments.clone(),
            notifications: self.notifications.clone(),
            directory: self.directory.clone(),
            events_tx: self.events_tx.clone(),
        }
    }
}

impl<C, N, D> CommentComposer<C, N, D>
where
    C: CommentStore,
    N: NotificationStore,
    D: UserDirectory,
{
    /// Persist the comment, fold it into the feed optimistically, then
    /// route and dispatch mention notifications best-effort.
    ///
    /// A persist failure aborts before any mention work happens and is
    /// surfaced to the caller. A dispatch failure is carried in the
    /// receipt; the comment is already created and is not rolled back.
    pub fn submit_comment(&self, text: &str) -> Result<SubmitReceipt, FeedError> {
        let subject_id = self.store.read().subject_id().to_string();

        let record = self
            .comments
            .create_comment(&NewComment {
                subject_id: &subject_id,
                author_id: &self.viewer.id,
                text,
            })
            .map_err(FeedError::CommentPersist)?;

        let comment = TimelineEvent::new_comment(
            record.id.clone(),
            self.viewer.id.clone(),
            self.viewer.display_name.clone(),
            text,
            record.created_at,
        );

        // Optimistic insert; the push-channel echo of this id will be
        // ignored by the reconciler.
        self.store.write().apply(PushChange {
            op: PushOp::Insert,
            event: comment.clone(),
        });
        let _ = self.events_tx.send(FeedEvent::FeedChanged);

        let batch = router::route(&*self.directory, text, &record.id, &self.viewer, &subject_id);
        let routed = batch.len();
        let dispatch_error = if batch.is_empty() {
            None
        } else {
            match self.notifications.create_batch(&batch) {
                Ok(()) => None,
                Err(err) => {
                    tracing::error!(comment = %record.id, "notification dispatch failed: {err:#}");
                    Some(FeedError::NotificationDispatch(err))
                }
            }
        };

        Ok(SubmitReceipt {
            comment,
            routed,
            dispatch_error,
        })
    }
}

pub struct FeedRuntime<C, N, D> {
    store: Arc<RwLock<FeedStore>>,
    navigator: HighlightNavigator,
    viewer: UserEntry,
    comments: Arc<C>,
    notifications: Arc<N>,
    directory: Arc<D>,
    update_tx: mpsc::UnboundedSender<FeedUpdate>,
    update_rx: Option<mpsc::UnboundedReceiver<FeedUpdate>>,
    events_tx: mpsc::UnboundedSender<FeedEvent>,
    /// The single armed highlight timer, aborted when superseded.
    highlight_timer: Option<JoinHandle<()>>,
}

impl<C, N, D> FeedRuntime<C, N, D>
where
    C: CommentStore,
    N: NotificationStore,
    D: UserDirectory,
{
    pub fn new(
        subject_id: impl Into<String>,
        viewer: UserEntry,
        config: FeedConfig,
        comments: Arc<C>,
        notifications: Arc<N>,
        directory: Arc<D>,
    ) -> (Self, FeedHandle, mpsc::UnboundedReceiver<FeedEvent>) {
        let mut store = FeedStore::new(subject_id, &config);
        store.set_viewer(viewer.id.clone());

        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let runtime = Self {
            store: Arc::new(RwLock::new(store)),
            navigator: HighlightNavigator::new(&config),
            viewer,
            comments,
            notifications,
            directory,
            update_tx: update_tx.clone(),
            update_rx: Some(update_rx),
            events_tx,
            highlight_timer: None,
        };
        let handle = FeedHandle { update_tx };
        (runtime, handle, events_rx)
    }

    pub fn handle(&self) -> FeedHandle {
        FeedHandle {
            update_tx: self.update_tx.clone(),
        }
    }

    /// Shared read access to the feed state; never blocked by submission.
    pub fn store(&self) -> Arc<RwLock<FeedStore>> {
        self.store.clone()
    }

    pub fn composer(&self) -> CommentComposer<C, N, D> {
        CommentComposer {
            store: self.store.clone(),
            viewer: self.viewer.clone(),
            comments: self.comments.clone(),
            notifications: self.notifications.clone(),
            directory: self.directory.clone(),
            events_tx: self.events_tx.clone(),
        }
    }

    /// Replace the feed with a fresh merge of the given batches.
    pub fn load_batches(&self, batches: Vec<Vec<TimelineEvent>>) {
        self.store.write().load_batches(batches);
        let _ = self.events_tx.send(FeedEvent::FeedChanged);
    }

    /// Consume the update queue. The runtime keeps a sender for its own
    /// timer wakeups, so shells stop the loop by aborting the task that
    /// drives it.
    pub async fn run(mut self) {
        let Some(mut update_rx) = self.update_rx.take() else {
            return;
        };
        while let Some(update) = update_rx.recv().await {
            self.apply_update(update);
        }
    }

    /// Apply one queued update. Exposed so a shell with its own loop can
    /// drive the runtime directly.
    pub fn apply_update(&mut self, update: FeedUpdate) {
        match update {
            FeedUpdate::Push(change) => {
                let result = self.store.write().apply(change);
                if result.applied != Applied::Ignored {
                    let _ = self.events_tx.send(FeedEvent::FeedChanged);
                }
                if let Some(advisory) = result.advisory {
                    let _ = self.events_tx.send(FeedEvent::Advisory(advisory));
                }
            }
            FeedUpdate::Anchor(anchor) => {
                let effect = {
                    let mut store = self.store.write();
                    self.navigator.anchor_received(&anchor, &mut store)
                };
                self.apply_highlight_effect(effect);
            }
            FeedUpdate::HighlightTimer { generation } => {
                let effect = self.navigator.timer_elapsed(generation);
                self.apply_highlight_effect(effect);
            }
        }
    }

    fn apply_highlight_effect(&mut self, effect: HighlightEffect) {
        match effect {
            HighlightEffect::Begin {
                event_id,
                revealed,
                timer,
            } => {
                if revealed {
                    let _ = self.events_tx.send(FeedEvent::FeedChanged);
                }
                let _ = self.events_tx.send(FeedEvent::ScrollTo {
                    event_id: event_id.clone(),
                });
                let _ = self.events_tx.send(FeedEvent::HighlightChanged {
                    target: Some(event_id),
                    phase: HighlightPhase::Glow,
                });
                self.arm_timer(timer);
            }
            HighlightEffect::StartFade { timer } => {
                let _ = self.events_tx.send(FeedEvent::HighlightChanged {
                    target: self.navigator.target().map(|t| t.to_string()),
                    phase: HighlightPhase::Fading,
                });
                self.arm_timer(timer);
            }
            HighlightEffect::Cleared => {
                self.highlight_timer = None;
                let _ = self.events_tx.send(FeedEvent::HighlightChanged {
                    target: None,
                    phase: HighlightPhase::Idle,
                });
            }
            HighlightEffect::None => {}
        }
    }

    fn arm_timer(&mut self, request: TimerRequest) {
        // Last request wins: a pending timer for a superseded highlight is
        // cancelled here, and its generation guard covers the race where
        // it already fired.
        if let Some(pending) = self.highlight_timer.take() {
            pending.abort();
        }
        let update_tx = self.update_tx.clone();
        self.highlight_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(request.after).await;
            let _ = update_tx.send(FeedUpdate::HighlightTimer {
                generation: request.generation,
            });
        }));
    }
}

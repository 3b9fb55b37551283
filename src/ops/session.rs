//! A live board: evaluate, materialize, notify subscribers, and route moves
//! through the mutation engine with refresh suppression around them.

use std::time::Instant;

use indexmap::IndexSet;

use crate::io::store::TaskStore;
use crate::io::watcher::StoreEvent;
use crate::model::board::{Board, GroupField};
use crate::model::config::OrderingPolicy;
use crate::model::status::StatusConfig;
use crate::model::task::TaskRecord;
use crate::ops::board::{column_field, materialize};
use crate::ops::mutation::{MoveError, MoveOutcome, MutationEngine};
use crate::ops::query::{QueryError, TaskSource};
use crate::ops::refresh::RefreshCoordinator;
use crate::ops::status_map::StatusMapper;

/// What subscribers receive after each refresh
#[derive(Debug, Clone, Copy)]
pub enum BoardUpdate<'a> {
    Ready(&'a Board),
    QueryFailed(&'a QueryError),
}

type Subscriber = Box<dyn FnMut(BoardUpdate<'_>)>;
type Clock = Box<dyn Fn() -> Instant>;

pub struct BoardSession<Src: TaskSource, S: TaskStore> {
    source: Src,
    store: S,
    statuses: Option<StatusConfig>,
    policy: OrderingPolicy,
    coordinator: RefreshCoordinator,
    current: Option<Result<Board, QueryError>>,
    /// Column dimension of the last board built
    column_field: Option<GroupField>,
    subscribers: Vec<Subscriber>,
    /// Reads the time a move finished
    clock: Clock,
}

impl<Src: TaskSource, S: TaskStore> BoardSession<Src, S> {
    pub fn new(source: Src, store: S) -> Self {
        BoardSession {
            source,
            store,
            statuses: None,
            policy: OrderingPolicy::default(),
            coordinator: RefreshCoordinator::default(),
            current: None,
            column_field: None,
            subscribers: Vec::new(),
            clock: Box::new(Instant::now),
        }
    }

    pub fn with_statuses(mut self, statuses: Option<StatusConfig>) -> Self {
        self.statuses = statuses;
        self
    }

    pub fn with_policy(mut self, policy: OrderingPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_coordinator(mut self, coordinator: RefreshCoordinator) -> Self {
        self.coordinator = coordinator;
        self
    }

    pub fn with_clock(mut self, clock: impl Fn() -> Instant + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn source(&self) -> &Src {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut Src {
        &mut self.source
    }

    pub fn set_statuses(&mut self, statuses: Option<StatusConfig>) {
        self.statuses = statuses;
    }

    pub fn set_policy(&mut self, policy: OrderingPolicy) {
        self.policy = policy;
    }

    pub fn subscribe(&mut self, callback: impl FnMut(BoardUpdate<'_>) + 'static) {
        self.subscribers.push(Box::new(callback));
    }

    /// The last successfully built board
    pub fn board(&self) -> Option<&Board> {
        self.current.as_ref().and_then(|r| r.as_ref().ok())
    }

    /// The error of the last refresh, if it failed
    pub fn error(&self) -> Option<&QueryError> {
        self.current.as_ref().and_then(|r| r.as_ref().err())
    }

    /// Evaluate and materialize now, then notify every subscriber.
    pub fn refresh(&mut self) {
        let result = self.source.evaluate();
        let built = materialize(&result, &self.policy, self.statuses.as_ref());
        match &built {
            Ok(_) => self.column_field = column_field(&result),
            Err(e) => tracing::warn!(error = %e, "board query failed"),
        }
        let current = self.current.insert(built);
        let update = match current {
            Ok(board) => BoardUpdate::Ready(board),
            Err(e) => BoardUpdate::QueryFailed(e),
        };
        for subscriber in &mut self.subscribers {
            subscriber(update);
        }
    }

    /// Feed a change notification to the coordinator
    pub fn handle_event(&mut self, event: &StoreEvent, now: Instant) -> bool {
        self.coordinator.notify(event, now)
    }

    pub fn request_refresh(&mut self, now: Instant) {
        self.coordinator.request_refresh(now);
    }

    /// Run a refresh if one is due. Returns whether it ran.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.coordinator.poll(now) {
            self.refresh();
            true
        } else {
            false
        }
    }

    /// A task on the current board by id, or by a unique id prefix
    pub fn find_task(&self, id: &str) -> Result<TaskRecord, MoveError> {
        let board = self
            .board()
            .ok_or_else(|| MoveError::UnknownTask(id.to_string()))?;
        if let Some(task) = board.find_task(id) {
            return Ok(task.clone());
        }
        // tag boards list a task once per tag
        let mut matches: IndexSet<&str> = IndexSet::new();
        let mut first = None;
        for task in board.tasks() {
            if !id.is_empty() && task.id.starts_with(id) {
                matches.insert(task.id.as_str());
                first.get_or_insert(task);
            }
        }
        match (matches.len(), first) {
            (1, Some(task)) => Ok(task.clone()),
            (0, _) | (_, None) => Err(MoveError::UnknownTask(id.to_string())),
            _ => Err(MoveError::AmbiguousTask(id.to_string())),
        }
    }

    pub fn move_task(
        &mut self,
        id: &str,
        target: &str,
        now: Instant,
    ) -> Result<MoveOutcome, MoveError> {
        let task = self.find_task(id)?;
        self.apply_move(&task, target, now)
    }

    /// Move a task. Notifications are suppressed while the write is in
    /// flight and for the settle interval after it finishes; a corrective
    /// refresh is requested whatever the outcome. The target is a column key
    /// of the current board's column dimension.
    pub fn apply_move(
        &mut self,
        task: &TaskRecord,
        target: &str,
        now: Instant,
    ) -> Result<MoveOutcome, MoveError> {
        self.coordinator.begin_mutation();
        let mut engine = MutationEngine::new(&self.store, StatusMapper::new(self.statuses.as_ref()));
        if let Some(field) = self.column_field {
            engine = engine.with_column_field(field);
        }
        let outcome = engine.apply_move(task, target);
        let settled = (self.clock)().max(now);
        self.coordinator.end_mutation(settled);

        match &outcome {
            Ok(result) => tracing::debug!(id = %task.id, column = target, ?result, "move applied"),
            Err(e) => tracing::warn!(id = %task.id, column = target, error = %e, "move failed"),
        }
        self.coordinator.request_refresh(now);
        outcome
    }
}

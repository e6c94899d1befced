//! Priority-bounded cooperative task scheduling.
//!
//! Tasks live in one of two collections. The active list is scanned once per
//! tick in ascending priority order; the pending list holds tasks waiting to
//! join it. Anything a running task adds goes to pending, and anything it
//! removes is only marked, so the active list never changes shape while it is
//! being scanned.

use std::collections::HashMap;
use std::fmt;

use retromode_core::{EngineError, EngineResult, Prioritized, PriorityOrderedList, Tick};
use retromode_render::Compositor;

use crate::input::InputState;

/// One unit of per-tick work.
pub trait Task {
    /// Run for one tick. Returning `Ok(true)` retires the task once the
    /// current scan finishes.
    fn on_tick(&mut self, ctx: &mut TaskContext<'_>) -> EngineResult<bool>;
}

impl<F> Task for F
where
    F: FnMut(&mut TaskContext<'_>) -> EngineResult<bool>,
{
    fn on_tick(&mut self, ctx: &mut TaskContext<'_>) -> EngineResult<bool> {
        self(ctx)
    }
}

/// Fixes a closure's signature so it can be passed as a [`Task`] without
/// annotating its argument.
pub fn from_fn<F>(f: F) -> F
where
    F: FnMut(&mut TaskContext<'_>) -> EngineResult<bool>,
{
    f
}

/// What a running task can reach.
pub struct TaskContext<'a> {
    pub scheduler: &'a mut TaskScheduler,
    pub scene: &'a mut Compositor,
    pub input: &'a InputState,
    pub tick: Tick,
    current: TaskId,
}

impl TaskContext<'_> {
    /// Id of the task being run.
    pub fn current_task(&self) -> TaskId {
        self.current
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task#{}", self.0)
    }
}

/// Addresses a task either by id or by registered name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskRef<'a> {
    Id(TaskId),
    Name(&'a str),
}

impl From<TaskId> for TaskRef<'_> {
    fn from(id: TaskId) -> Self {
        TaskRef::Id(id)
    }
}

impl<'a> From<&'a str> for TaskRef<'a> {
    fn from(name: &'a str) -> Self {
        TaskRef::Name(name)
    }
}

impl<'a> From<&'a String> for TaskRef<'a> {
    fn from(name: &'a String) -> Self {
        TaskRef::Name(name)
    }
}

/// Snapshot of a registered task.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskInfo {
    pub id: TaskId,
    pub name: Option<String>,
    pub priority: f64,
    pub enabled: bool,
    /// Still waiting to join the active list.
    pub pending: bool,
}

struct TaskEntry {
    id: TaskId,
    name: Option<String>,
    priority: f64,
    enabled: bool,
    /// Removed or finished during a scan; dropped once the scan ends.
    retired: bool,
    /// Empty only while the task is running.
    task: Option<Box<dyn Task>>,
}

impl TaskEntry {
    fn info(&self, pending: bool) -> TaskInfo {
        TaskInfo {
            id: self.id,
            name: self.name.clone(),
            priority: self.priority,
            enabled: self.enabled,
            pending,
        }
    }
}

impl Prioritized for TaskEntry {
    fn priority(&self) -> f64 {
        self.priority
    }
}

impl fmt::Debug for TaskEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskEntry")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("priority", &self.priority)
            .field("enabled", &self.enabled)
            .field("retired", &self.retired)
            .finish()
    }
}

/// Drop `entry`'s name mapping if the name still points at it.
fn release_name(names: &mut HashMap<String, TaskId>, entry: &TaskEntry) {
    if let Some(name) = &entry.name {
        if names.get(name) == Some(&entry.id) {
            names.remove(name);
        }
    }
}

#[derive(Debug)]
pub struct TaskScheduler {
    active: PriorityOrderedList<TaskEntry>,
    pending: Vec<TaskEntry>,
    names: HashMap<String, TaskId>,
    priority_bound: f64,
    next_id: u64,
    scanning: bool,
}

impl Default for TaskScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskScheduler {
    /// An empty scheduler with no priority bound (NaN).
    pub fn new() -> Self {
        Self::with_priority_bound(f64::NAN)
    }

    pub fn with_priority_bound(priority_bound: f64) -> Self {
        Self {
            active: PriorityOrderedList::new(),
            pending: Vec::new(),
            names: HashMap::new(),
            priority_bound,
            next_id: 0,
            scanning: false,
        }
    }

    fn new_entry(&mut self, task: Box<dyn Task>, priority: f64) -> TaskEntry {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        TaskEntry {
            id,
            name: None,
            priority,
            enabled: true,
            retired: false,
            task: Some(task),
        }
    }

    fn enqueue(&mut self, entry: TaskEntry, defer: bool) -> TaskId {
        let id = entry.id;
        let priority = entry.priority;
        if defer || self.scanning {
            self.pending.push(entry);
            tracing::debug!(%id, priority, "task scheduled");
        } else {
            self.active.insert(entry);
            tracing::debug!(%id, priority, "task added");
        }
        id
    }

    /// Add a task to the active list. Called from a running task, the add
    /// is deferred until the current scan ends.
    pub fn add(&mut self, task: impl Task + 'static, priority: f64) -> TaskId {
        self.add_boxed(Box::new(task), priority)
    }

    pub fn add_boxed(&mut self, task: Box<dyn Task>, priority: f64) -> TaskId {
        let entry = self.new_entry(task, priority);
        self.enqueue(entry, false)
    }

    /// Queue a task to join the active list at the end of the next tick.
    pub fn schedule(&mut self, task: impl Task + 'static, priority: f64) -> TaskId {
        self.schedule_boxed(Box::new(task), priority)
    }

    pub fn schedule_boxed(&mut self, task: Box<dyn Task>, priority: f64) -> TaskId {
        let entry = self.new_entry(task, priority);
        self.enqueue(entry, true)
    }

    /// [`add`](Self::add), registering `name` for the new task.
    pub fn add_named(&mut self, name: &str, task: impl Task + 'static, priority: f64) -> TaskId {
        let id = self.add(task, priority);
        self.register_name(name, id);
        id
    }

    pub fn schedule_named(
        &mut self,
        name: &str,
        task: impl Task + 'static,
        priority: f64,
    ) -> TaskId {
        let id = self.schedule(task, priority);
        self.register_name(name, id);
        id
    }

    /// Point `name` at `id`. A name already in use moves to the new task;
    /// the old task stays registered, just unnamed. Empty names are ignored.
    fn register_name(&mut self, name: &str, id: TaskId) {
        if name.is_empty() {
            return;
        }
        if let Some(previous) = self.names.insert(name.to_string(), id) {
            if previous != id {
                if let Some(old) = self.entry_mut(previous) {
                    old.name = None;
                }
            }
        }
        if let Some(entry) = self.entry_mut(id) {
            entry.name = Some(name.to_string());
        }
    }

    fn entry_mut(&mut self, id: TaskId) -> Option<&mut TaskEntry> {
        self.active
            .iter_mut()
            .chain(self.pending.iter_mut())
            .find(|e| e.id == id && !e.retired)
    }

    fn resolve(&self, target: TaskRef<'_>) -> Option<TaskId> {
        match target {
            TaskRef::Id(id) => Some(id),
            TaskRef::Name(name) => self.names.get(name).copied(),
        }
    }

    /// Remove a task, active or pending. Returns `false` if nothing matched.
    /// During a scan the task is skipped from then on and dropped when the
    /// scan ends.
    pub fn remove<'a>(&mut self, target: impl Into<TaskRef<'a>>) -> bool {
        let Some(id) = self.resolve(target.into()) else {
            return false;
        };

        if let Some(index) = self.pending.iter().position(|e| e.id == id) {
            let entry = self.pending.remove(index);
            release_name(&mut self.names, &entry);
        } else if self.scanning {
            let Some(entry) = self.active.iter_mut().find(|e| e.id == id && !e.retired) else {
                return false;
            };
            entry.retired = true;
            release_name(&mut self.names, entry);
        } else {
            let Some(entry) = self.active.remove_first(|e| e.id == id) else {
                return false;
            };
            release_name(&mut self.names, &entry);
        }
        tracing::debug!(%id, "task removed");
        true
    }

    /// Disabled tasks keep their place but are skipped. Takes effect
    /// immediately, even mid-scan.
    pub fn set_enabled<'a>(&mut self, target: impl Into<TaskRef<'a>>, enabled: bool) -> bool {
        let Some(id) = self.resolve(target.into()) else {
            return false;
        };
        match self.entry_mut(id) {
            Some(entry) => {
                entry.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Tasks with a priority strictly above the bound are not run. NaN
    /// lifts the bound entirely and negative infinity stops every task
    /// with a real priority.
    pub fn set_priority_bound(&mut self, bound: f64) {
        self.priority_bound = bound;
    }

    pub fn priority_bound(&self) -> f64 {
        self.priority_bound
    }

    pub fn get_by_name(&self, name: &str) -> EngineResult<TaskInfo> {
        self.names
            .get(name)
            .and_then(|&id| self.info(id))
            .ok_or_else(|| EngineError::not_found(format!("no task named '{name}'")))
    }

    pub fn info(&self, id: TaskId) -> Option<TaskInfo> {
        if let Some(entry) = self.active.iter().find(|e| e.id == id && !e.retired) {
            return Some(entry.info(false));
        }
        self.pending
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.info(true))
    }

    pub fn contains<'a>(&self, target: impl Into<TaskRef<'a>>) -> bool {
        self.resolve(target.into())
            .is_some_and(|id| self.info(id).is_some())
    }

    /// Number of active tasks.
    pub fn len(&self) -> usize {
        self.active.iter().filter(|e| !e.retired).count()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0 && self.pending.is_empty()
    }

    /// Active task ids in execution order.
    pub fn active_ids(&self) -> Vec<TaskId> {
        self.active
            .iter()
            .filter(|e| !e.retired)
            .map(|e| e.id)
            .collect()
    }

    /// Whether a tick is in progress.
    pub fn is_running(&self) -> bool {
        self.scanning
    }

    /// Run one tick and return how many tasks ran.
    ///
    /// A task error aborts the scan. Tasks already marked for removal are
    /// still dropped, pending tasks stay pending, and the error is returned.
    pub fn tick(
        &mut self,
        scene: &mut Compositor,
        input: &InputState,
        tick: Tick,
    ) -> EngineResult<usize> {
        if self.scanning {
            return Err(EngineError::unsupported(
                "tick called from inside a running task",
            ));
        }

        self.scanning = true;
        let outcome = self.scan(scene, input, tick);
        self.scanning = false;

        let removed = self.purge_retired();
        let ran = outcome?;
        let merged = self.merge_pending();
        tracing::debug!(
            %tick,
            ran,
            removed,
            merged,
            active = self.active.len(),
            "scheduler tick"
        );
        Ok(ran)
    }

    fn scan(
        &mut self,
        scene: &mut Compositor,
        input: &InputState,
        tick: Tick,
    ) -> EngineResult<usize> {
        let mut ran = 0;
        let mut index = 0;
        while let Some(entry) = self.active.get_mut(index) {
            index += 1;
            // Comparisons with NaN are false, so a NaN bound never stops here.
            if entry.priority > self.priority_bound {
                break;
            }
            if !entry.enabled || entry.retired {
                continue;
            }
            let Some(mut task) = entry.task.take() else {
                continue;
            };
            let id = entry.id;
            tracing::trace!(%id, priority = entry.priority, "running task");

            let outcome = task.on_tick(&mut TaskContext {
                scheduler: &mut *self,
                scene: &mut *scene,
                input,
                tick,
                current: id,
            });

            // Entries never move during a scan, so the slot is where we left it.
            if let Some(entry) = self.active.get_mut(index - 1) {
                entry.task = Some(task);
                if let Ok(true) = outcome {
                    entry.retired = true;
                }
            }
            if let Err(err) = outcome {
                tracing::warn!(%id, error = %err, "task failed, aborting tick");
                return Err(err);
            }
            ran += 1;
        }
        Ok(ran)
    }

    fn purge_retired(&mut self) -> usize {
        let before = self.active.len();
        let names = &mut self.names;
        self.active.retain(|e| {
            if e.retired {
                release_name(names, e);
            }
            !e.retired
        });
        before - self.active.len()
    }

    fn merge_pending(&mut self) -> usize {
        let pending = std::mem::take(&mut self.pending);
        let merged = pending.len();
        self.active.extend(pending);
        merged
    }
}

use crate::agent::AgentId;
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::info;

/// Cancellable polling tasks keyed by agent.
///
/// At most one agent is polled at a time: arming a key aborts every other
/// live task first.
pub struct PollSchedule {
    handles: Mutex<HashMap<AgentId, JoinHandle<()>>>,
}

impl PollSchedule {
    pub fn new() -> Self {
        Self {
            handles: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<AgentId, JoinHandle<()>>> {
        self.handles.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Agent whose polling task is still live, if any.
    pub fn polling(&self) -> Option<AgentId> {
        self.lock()
            .iter()
            .find(|(_, handle)| !handle.is_finished())
            .map(|(id, _)| *id)
    }

    pub fn is_polling(&self, agent_id: AgentId) -> bool {
        self.lock()
            .get(&agent_id)
            .map_or(false, |handle| !handle.is_finished())
    }

    /// Track `handle` as the polling task for `agent_id`, aborting any others.
    pub fn arm(&self, agent_id: AgentId, handle: JoinHandle<()>) {
        let mut handles = self.lock();
        for (id, old) in handles.drain() {
            old.abort();
            info!(agent_id = %id, "Aborted polling task before re-arming");
        }
        handles.insert(agent_id, handle);
    }

    /// Stop polling `agent_id`. Returns true when a task was cancelled.
    pub fn cancel(&self, agent_id: AgentId) -> bool {
        match self.lock().remove(&agent_id) {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    /// Stop every polling task.
    pub fn cancel_all(&self) {
        for (_, handle) in self.lock().drain() {
            handle.abort();
        }
    }
}

impl Default for PollSchedule {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for PollSchedule {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

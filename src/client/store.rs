use crate::client::api::{ClientError, TaskApi};
use crate::domain::task::{CreateTask, Task, UpdateTask};
use tracing::{debug, instrument};

/// In-memory task array for the signed-in user.
///
/// Synchronized by re-fetching on sign-in ([`refresh`](Self::refresh)) and by
/// optimistically replacing or removing entries after each mutation succeeds.
/// Failures surface the server-provided message as a transient error state;
/// there is no retry anywhere.
pub struct TaskStore<A: TaskApi> {
    api: A,
    tasks: Vec<Task>,
    error: Option<String>,
}

impl<A: TaskApi> TaskStore<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            tasks: Vec::new(),
            error: None,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Message from the most recent failed operation, cleared on the next
    /// successful one.
    pub fn last_error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Replaces the whole array with a fresh server fetch.
    #[instrument(skip(self))]
    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        let result = self.api.list_tasks().await;
        let tasks = self.record(result)?;
        debug!(count = tasks.len(), "Refreshed task list");
        self.tasks = tasks;
        Ok(())
    }

    /// Creates a task and prepends the stored copy. An empty title is
    /// rejected before any network call.
    #[instrument(skip(self, req))]
    pub async fn create(&mut self, req: CreateTask) -> Result<(), ClientError> {
        if req.title.trim().is_empty() {
            let err = ClientError::Validation("Title is required".to_string());
            self.error = Some(err.to_string());
            return Err(err);
        }

        let result = self.api.create_task(&req).await;
        let task = self.record(result)?;
        self.tasks.insert(0, task);
        Ok(())
    }

    /// Updates a task and replaces the matching entry with the server's copy.
    #[instrument(skip(self, req), fields(task_id = id))]
    pub async fn update(&mut self, id: &str, req: UpdateTask) -> Result<(), ClientError> {
        let result = self.api.update_task(id, &req).await;
        let updated = self.record(result)?;
        if let Some(entry) = self.tasks.iter_mut().find(|t| t.id == id) {
            *entry = updated;
        }
        Ok(())
    }

    /// Deletes a task and removes the matching entry once the server confirms.
    #[instrument(skip(self), fields(task_id = id))]
    pub async fn remove(&mut self, id: &str) -> Result<(), ClientError> {
        let result = self.api.delete_task(id).await;
        self.record(result)?;
        self.tasks.retain(|t| t.id != id);
        Ok(())
    }

    /// Empties the array on sign-out.
    pub fn clear(&mut self) {
        self.tasks.clear();
        self.error = None;
    }

    fn record<T>(&mut self, result: Result<T, ClientError>) -> Result<T, ClientError> {
        match result {
            Ok(value) => {
                self.error = None;
                Ok(value)
            }
            Err(err) => {
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }
}

use crate::domain::repository::TaskRepository;
use crate::domain::task::Task;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument, trace};

#[derive(Clone)]
pub struct InMemoryTaskRepository {
    storage: Arc<RwLock<HashMap<String, Task>>>,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryTaskRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    #[instrument(skip(self, task), fields(task_id = %task.id, user_id = %task.user_id))]
    async fn save(&self, task: Task) -> Result<()> {
        let mut storage = self.storage.write().await;
        storage.insert(task.id.clone(), task);
        debug!("Task saved to memory storage");
        Ok(())
    }

    #[instrument(skip(self), fields(task_id = id))]
    async fn find_by_id(&self, id: &str) -> Result<Option<Task>> {
        let storage = self.storage.read().await;
        let task = storage.get(id).cloned();
        trace!(found = task.is_some(), "Looked up task by id");
        Ok(task)
    }

    #[instrument(skip(self), fields(user_id = user_id))]
    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Task>> {
        let storage = self.storage.read().await;
        let tasks: Vec<Task> = storage
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        debug!(count = tasks.len(), "Collected tasks for user");
        Ok(tasks)
    }

    #[instrument(skip(self, task), fields(task_id = %task.id))]
    async fn update(&self, task: Task) -> Result<()> {
        let mut storage = self.storage.write().await;
        storage.insert(task.id.clone(), task);
        debug!("Task updated in memory storage");
        Ok(())
    }

    #[instrument(skip(self), fields(task_id = id))]
    async fn delete(&self, id: &str) -> Result<()> {
        let mut storage = self.storage.write().await;
        storage.remove(id);
        debug!("Task removed from memory storage");
        Ok(())
    }
}

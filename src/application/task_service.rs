use crate::domain::error::DomainError;
use crate::domain::repository::TaskRepository;
use crate::domain::task::{CreateTask, Task, UpdateTask};
use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

pub struct TaskService<R: TaskRepository> {
    repository: Arc<R>,
}

impl<R: TaskRepository> TaskService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Lists the caller's tasks, newest first.
    #[instrument(skip(self), fields(user_id = user_id))]
    pub async fn list_tasks(&self, user_id: &str) -> Result<Vec<Task>> {
        let mut tasks = self.repository.find_by_user(user_id).await?;
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        info!(count = tasks.len(), "Listed tasks for user");
        Ok(tasks)
    }

    #[instrument(skip(self, req), fields(user_id = user_id))]
    pub async fn create_task(&self, user_id: &str, req: CreateTask) -> Result<Task> {
        if req.title.trim().is_empty() {
            warn!("Rejected task with empty title");
            return Err(DomainError::Validation("Title is required".to_string()).into());
        }

        let task = Task {
            id: Uuid::new_v4().to_string(),
            title: req.title,
            description: req.description,
            status: req.status,
            priority: req.priority,
            due_date: req.due_date,
            user_id: user_id.to_string(),
            created_at: Utc::now(),
        };
        self.repository.save(task.clone()).await?;

        info!(task_id = %task.id, "Task created");
        Ok(task)
    }

    #[instrument(skip(self), fields(user_id = user_id, task_id = id))]
    pub async fn get_task(&self, user_id: &str, id: &str) -> Result<Task> {
        self.load_owned(user_id, id).await
    }

    /// Field-level update: fields omitted from the request keep their stored
    /// values.
    #[instrument(skip(self, req), fields(user_id = user_id, task_id = id))]
    pub async fn update_task(&self, user_id: &str, id: &str, req: UpdateTask) -> Result<Task> {
        let mut task = self.load_owned(user_id, id).await?;

        if let Some(title) = req.title {
            if title.trim().is_empty() {
                warn!("Rejected update with empty title");
                return Err(DomainError::Validation("Title is required".to_string()).into());
            }
            task.title = title;
        }
        if let Some(description) = req.description {
            task.description = Some(description);
        }
        if let Some(status) = req.status {
            task.status = status;
        }
        if let Some(priority) = req.priority {
            task.priority = priority;
        }
        if let Some(due_date) = req.due_date {
            task.due_date = Some(due_date);
        }

        self.repository.update(task.clone()).await?;

        info!(task_id = %task.id, "Task updated");
        Ok(task)
    }

    #[instrument(skip(self), fields(user_id = user_id, task_id = id))]
    pub async fn delete_task(&self, user_id: &str, id: &str) -> Result<()> {
        let task = self.load_owned(user_id, id).await?;
        self.repository.delete(&task.id).await?;

        info!(task_id = %task.id, "Task deleted");
        Ok(())
    }

    /// Ownership guard shared by every single-task operation: absent tasks
    /// are not-found, tasks owned by someone else are not-authorized.
    async fn load_owned(&self, user_id: &str, id: &str) -> Result<Task> {
        let task = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound("Task not found".to_string()))?;

        if !task.is_owned_by(user_id) {
            warn!(
                task_id = %task.id,
                owner = %task.user_id,
                caller = user_id,
                "Ownership check failed"
            );
            return Err(DomainError::Unauthorized("Not authorized".to_string()).into());
        }

        Ok(task)
    }
}

//! Derived views over the in-memory task array: aggregate statistics and the
//! filtered-and-sorted list projection. Pure and stateless, recomputed from
//! scratch on every relevant input change.

use crate::domain::task::{Priority, Task, TaskStatus};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;

/// Dashboard aggregates over the full task array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub high_priority: usize,
    /// Due date strictly in the past and not completed. Undated tasks are
    /// never overdue.
    pub overdue: usize,
    /// completed / total as a rounded percentage; 0 for an empty list.
    pub completion_rate: u32,
}

impl TaskStats {
    pub fn compute(tasks: &[Task], now: DateTime<Utc>) -> Self {
        let total = tasks.len();
        let completed = tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Completed)
            .count();
        let pending = tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Pending)
            .count();
        let in_progress = tasks
            .iter()
            .filter(|t| t.status == TaskStatus::InProgress)
            .count();
        let high_priority = tasks
            .iter()
            .filter(|t| t.priority == Priority::High)
            .count();
        let overdue = tasks
            .iter()
            .filter(|t| match t.due_date {
                Some(due) => t.status != TaskStatus::Completed && due < now,
                None => false,
            })
            .count();

        let completion_rate = if total > 0 {
            ((completed as f64 / total as f64) * 100.0).round() as u32
        } else {
            0
        };

        Self {
            total,
            completed,
            pending,
            in_progress,
            high_priority,
            overdue,
            completion_rate,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    CreatedAt,
    DueDate,
    Priority,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    fn apply(&self, ord: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    }
}

/// Filter and sort settings for the task list view. The default shows
/// everything, newest first.
#[derive(Debug, Clone, Default)]
pub struct TaskQuery {
    /// Case-insensitive substring match against title and description.
    pub search: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub sort_field: SortField,
    pub direction: SortDirection,
}

impl TaskQuery {
    /// Produces the filtered-and-sorted projection of the task array.
    pub fn apply(&self, tasks: &[Task]) -> Vec<Task> {
        let term = self.search.as_ref().map(|s| s.to_lowercase());

        let mut filtered: Vec<Task> = tasks
            .iter()
            .filter(|t| match &term {
                Some(term) if !term.is_empty() => {
                    t.title.to_lowercase().contains(term)
                        || t.description
                            .as_ref()
                            .is_some_and(|d| d.to_lowercase().contains(term))
                }
                _ => true,
            })
            .filter(|t| self.status.is_none_or(|s| t.status == s))
            .filter(|t| self.priority.is_none_or(|p| t.priority == p))
            .cloned()
            .collect();

        filtered.sort_by(|a, b| self.compare(a, b));
        filtered
    }

    fn compare(&self, a: &Task, b: &Task) -> Ordering {
        match self.sort_field {
            SortField::CreatedAt => self.direction.apply(a.created_at.cmp(&b.created_at)),
            SortField::DueDate => match (a.due_date, b.due_date) {
                // Undated tasks go last ascending, first descending.
                (None, None) => Ordering::Equal,
                (None, Some(_)) => match self.direction {
                    SortDirection::Asc => Ordering::Greater,
                    SortDirection::Desc => Ordering::Less,
                },
                (Some(_), None) => match self.direction {
                    SortDirection::Asc => Ordering::Less,
                    SortDirection::Desc => Ordering::Greater,
                },
                (Some(x), Some(y)) => self.direction.apply(x.cmp(&y)),
            },
            SortField::Priority => self
                .direction
                .apply(a.priority.rank().cmp(&b.priority.rank())),
        }
    }
}

/// Newest tasks by creation time, for the dashboard's recent list.
pub fn recent_tasks(tasks: &[Task], limit: usize) -> Vec<Task> {
    let mut sorted: Vec<Task> = tasks.to_vec();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    sorted.truncate(limit);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    struct TaskFixture {
        title: &'static str,
        description: Option<&'static str>,
        status: TaskStatus,
        priority: Priority,
        due_in_days: Option<i64>,
        created_offset_mins: i64,
    }

    impl Default for TaskFixture {
        fn default() -> Self {
            Self {
                title: "Task",
                description: None,
                status: TaskStatus::Pending,
                priority: Priority::Medium,
                due_in_days: None,
                created_offset_mins: 0,
            }
        }
    }

    fn make_task(fixture: TaskFixture) -> Task {
        Task {
            id: uuid::Uuid::new_v4().to_string(),
            title: fixture.title.to_string(),
            description: fixture.description.map(str::to_string),
            status: fixture.status,
            priority: fixture.priority,
            due_date: fixture.due_in_days.map(|d| base_time() + Duration::days(d)),
            user_id: "u-1".to_string(),
            created_at: base_time() + Duration::minutes(fixture.created_offset_mins),
        }
    }

    #[test]
    fn test_stats_for_empty_list_are_all_zero() {
        let stats = TaskStats::compute(&[], base_time());
        assert_eq!(stats.total, 0);
        assert_eq!(stats.completion_rate, 0);
        assert_eq!(stats.overdue, 0);
    }

    #[test]
    fn test_stats_counts_per_status_and_priority() {
        let tasks = vec![
            make_task(TaskFixture {
                status: TaskStatus::Completed,
                ..TaskFixture::default()
            }),
            make_task(TaskFixture {
                status: TaskStatus::InProgress,
                priority: Priority::High,
                ..TaskFixture::default()
            }),
            make_task(TaskFixture::default()),
        ];

        let stats = TaskStats::compute(&tasks, base_time());
        assert_eq!(stats.total, 3);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.in_progress, 1);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.high_priority, 1);
        assert_eq!(stats.completion_rate, 33);
    }

    #[test]
    fn test_overdue_excludes_completed_and_undated() {
        let tasks = vec![
            // Past due, still pending: overdue
            make_task(TaskFixture {
                due_in_days: Some(-1),
                ..TaskFixture::default()
            }),
            // Past due but completed: not overdue
            make_task(TaskFixture {
                due_in_days: Some(-1),
                status: TaskStatus::Completed,
                ..TaskFixture::default()
            }),
            // Future due date: not overdue
            make_task(TaskFixture {
                due_in_days: Some(1),
                ..TaskFixture::default()
            }),
            // No due date: never overdue
            make_task(TaskFixture::default()),
        ];

        let stats = TaskStats::compute(&tasks, base_time());
        assert_eq!(stats.overdue, 1);
    }

    #[test]
    fn test_completion_rate_rounds() {
        let tasks = vec![
            make_task(TaskFixture {
                status: TaskStatus::Completed,
                ..TaskFixture::default()
            }),
            make_task(TaskFixture {
                status: TaskStatus::Completed,
                ..TaskFixture::default()
            }),
            make_task(TaskFixture::default()),
        ];
        // 2/3 = 66.67 rounds to 67
        assert_eq!(TaskStats::compute(&tasks, base_time()).completion_rate, 67);
    }

    #[test]
    fn test_search_matches_title_and_description_case_insensitive() {
        let tasks = vec![
            make_task(TaskFixture {
                title: "Buy GROCERIES",
                ..TaskFixture::default()
            }),
            make_task(TaskFixture {
                title: "Other",
                description: Some("stop by the grocery store"),
                ..TaskFixture::default()
            }),
            make_task(TaskFixture {
                title: "Unrelated",
                ..TaskFixture::default()
            }),
        ];

        let query = TaskQuery {
            search: Some("grocer".to_string()),
            ..TaskQuery::default()
        };
        assert_eq!(query.apply(&tasks).len(), 2);
    }

    #[test]
    fn test_status_filter_yields_exact_subset() {
        let tasks = vec![
            make_task(TaskFixture {
                status: TaskStatus::Completed,
                ..TaskFixture::default()
            }),
            make_task(TaskFixture::default()),
            make_task(TaskFixture {
                status: TaskStatus::Completed,
                ..TaskFixture::default()
            }),
        ];

        let query = TaskQuery {
            status: Some(TaskStatus::Completed),
            ..TaskQuery::default()
        };
        let result = query.apply(&tasks);
        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|t| t.status == TaskStatus::Completed));
    }

    #[test]
    fn test_priority_filter() {
        let tasks = vec![
            make_task(TaskFixture {
                priority: Priority::High,
                ..TaskFixture::default()
            }),
            make_task(TaskFixture {
                priority: Priority::Low,
                ..TaskFixture::default()
            }),
        ];

        let query = TaskQuery {
            priority: Some(Priority::High),
            ..TaskQuery::default()
        };
        assert_eq!(query.apply(&tasks).len(), 1);
    }

    #[test]
    fn test_default_sort_is_created_desc() {
        let tasks = vec![
            make_task(TaskFixture {
                title: "older",
                created_offset_mins: 0,
                ..TaskFixture::default()
            }),
            make_task(TaskFixture {
                title: "newer",
                created_offset_mins: 10,
                ..TaskFixture::default()
            }),
        ];

        let result = TaskQuery::default().apply(&tasks);
        assert_eq!(result[0].title, "newer");
        assert_eq!(result[1].title, "older");
    }

    #[test]
    fn test_due_date_asc_puts_undated_last() {
        let tasks = vec![
            make_task(TaskFixture {
                title: "undated",
                ..TaskFixture::default()
            }),
            make_task(TaskFixture {
                title: "later",
                due_in_days: Some(5),
                ..TaskFixture::default()
            }),
            make_task(TaskFixture {
                title: "sooner",
                due_in_days: Some(1),
                ..TaskFixture::default()
            }),
        ];

        let query = TaskQuery {
            sort_field: SortField::DueDate,
            direction: SortDirection::Asc,
            ..TaskQuery::default()
        };
        let result = query.apply(&tasks);
        let titles: Vec<&str> = result.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["sooner", "later", "undated"]);
    }

    #[test]
    fn test_due_date_desc_puts_undated_first() {
        let tasks = vec![
            make_task(TaskFixture {
                title: "sooner",
                due_in_days: Some(1),
                ..TaskFixture::default()
            }),
            make_task(TaskFixture {
                title: "undated",
                ..TaskFixture::default()
            }),
            make_task(TaskFixture {
                title: "later",
                due_in_days: Some(5),
                ..TaskFixture::default()
            }),
        ];

        let query = TaskQuery {
            sort_field: SortField::DueDate,
            direction: SortDirection::Desc,
            ..TaskQuery::default()
        };
        let result = query.apply(&tasks);
        let titles: Vec<&str> = result.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["undated", "later", "sooner"]);
    }

    #[test]
    fn test_priority_sort_uses_rank() {
        let tasks = vec![
            make_task(TaskFixture {
                title: "medium",
                ..TaskFixture::default()
            }),
            make_task(TaskFixture {
                title: "high",
                priority: Priority::High,
                ..TaskFixture::default()
            }),
            make_task(TaskFixture {
                title: "low",
                priority: Priority::Low,
                ..TaskFixture::default()
            }),
        ];

        let query = TaskQuery {
            sort_field: SortField::Priority,
            direction: SortDirection::Desc,
            ..TaskQuery::default()
        };
        let result = query.apply(&tasks);
        let titles: Vec<&str> = result.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["high", "medium", "low"]);
    }

    #[test]
    fn test_recent_tasks_takes_newest_first() {
        let tasks: Vec<Task> = (0..7)
            .map(|i| {
                make_task(TaskFixture {
                    created_offset_mins: i,
                    ..TaskFixture::default()
                })
            })
            .collect();

        let recent = recent_tasks(&tasks, 5);
        assert_eq!(recent.len(), 5);
        assert!(
            recent
                .windows(2)
                .all(|pair| pair[0].created_at >= pair[1].created_at)
        );
        assert_eq!(recent[0].created_at, base_time() + Duration::minutes(6));
    }

    #[test]
    fn test_filters_compose() {
        let tasks = vec![
            make_task(TaskFixture {
                title: "report draft",
                status: TaskStatus::Completed,
                priority: Priority::High,
                ..TaskFixture::default()
            }),
            make_task(TaskFixture {
                title: "report review",
                status: TaskStatus::Pending,
                priority: Priority::High,
                ..TaskFixture::default()
            }),
            make_task(TaskFixture {
                title: "groceries",
                status: TaskStatus::Completed,
                priority: Priority::High,
                ..TaskFixture::default()
            }),
        ];

        let query = TaskQuery {
            search: Some("report".to_string()),
            status: Some(TaskStatus::Completed),
            priority: Some(Priority::High),
            ..TaskQuery::default()
        };
        let result = query.apply(&tasks);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].title, "report draft");
    }
}

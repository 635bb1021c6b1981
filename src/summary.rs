use crate::task::Task;

pub fn active(tasks: &[Task]) -> Vec<&Task> {
  tasks.iter().filter(|task| !task.is_deleted()).collect()
}

pub fn deleted_count(tasks: &[Task]) -> usize {
  tasks.iter().filter(|task| task.is_deleted()).count()
}

/// Counts important tasks that are not deleted.
pub fn important_count(tasks: &[Task]) -> usize {
  tasks
    .iter()
    .filter(|task| !task.is_deleted() && task.is_important())
    .count()
}

/// Counts completed tasks that are not deleted.
pub fn completed_count(tasks: &[Task]) -> usize {
  tasks
    .iter()
    .filter(|task| !task.is_deleted() && task.is_completed())
    .count()
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
  pub total: usize,
  pub deleted: usize,
  pub important: usize,
  pub completed: usize,
}

impl Summary {
  pub fn of(tasks: &[Task]) -> Self {
    Self {
      total: active(tasks).len(),
      deleted: deleted_count(tasks),
      important: important_count(tasks),
      completed: completed_count(tasks),
    }
  }
}

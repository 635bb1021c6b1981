use chrono::NaiveDateTime;

use crate::{
  error::{Error, Result},
  task::Task,
  traits::Indexable,
};

/// Every way the task collection can change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
  Create {
    id: uuid::Uuid,
    title: String,
    start_time: NaiveDateTime,
    end_time: NaiveDateTime,
  },
  Delete(uuid::Uuid),
  ToggleCompleted(uuid::Uuid),
  ToggleImportant(uuid::Uuid),
  /// Overwrites the stored record with the same id.
  Update(Task),
}

impl Action {
  pub fn name(&self) -> &'static str {
    match self {
      Action::Create { .. } => "create",
      Action::Delete(_) => "delete",
      Action::ToggleCompleted(_) => "toggle completed",
      Action::ToggleImportant(_) => "toggle important",
      Action::Update(_) => "update",
    }
  }
}

/// Computes the collection that follows `action`. The input is left untouched.
pub fn apply(tasks: &[Task], action: Action) -> Result<Vec<Task>> {
  match action {
    Action::Create {
      id,
      title,
      start_time,
      end_time,
    } => {
      let title = title.trim();
      if title.is_empty() {
        return Err(Error::Validation("title must not be empty".to_owned()));
      }
      if position_by_id(tasks, id).is_some() {
        return Err(Error::Validation(format!("id {} is already in use", id)));
      }

      let mut next = tasks.to_vec();
      next.push(Task::new(id, title, start_time, end_time));
      Ok(next)
    }
    Action::Delete(id) => modify(tasks, id, |task| task.mark_deleted()),
    Action::ToggleCompleted(id) => modify(tasks, id, |task| {
      task.set_completed(!task.is_completed())
    }),
    Action::ToggleImportant(id) => modify(tasks, id, |task| {
      task.set_important(!task.is_important())
    }),
    Action::Update(replacement) => {
      modify(tasks, replacement.id(), move |task| *task = replacement)
    }
  }
}

fn modify<F>(tasks: &[Task], id: uuid::Uuid, change: F) -> Result<Vec<Task>>
where
  F: FnOnce(&mut Task),
{
  let position = position_by_id(tasks, id).ok_or(Error::NotFound(id))?;
  let mut next = tasks.to_vec();
  change(&mut next[position]);
  Ok(next)
}

fn position_by_id(tasks: &[Task], id: uuid::Uuid) -> Option<usize> {
  tasks.iter().position(|task| task.id() == id)
}

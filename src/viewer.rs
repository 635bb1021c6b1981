use std::{cell::RefCell, collections::HashMap, rc::Rc};

use chrono::NaiveDateTime;
use colored::{Color, Colorize};

use crate::{
  duration_fmt::format_time_left,
  store::TaskStore,
  summary::Summary,
  task::Task,
  traits::{shorten_id, Indexable},
};

const PROGRESS_BAR_WIDTH: usize = 10;
const LINE_INDENT: usize = 2;

struct ViewColors {}
impl ViewColors {
  const ID: Color = Color::BrightBlack;
  const TITLE_IMPORTANT: Color = Color::BrightYellow;
  const DONE_MARK: Color = Color::Green;
  const PROGRESS_PLENTY: Color = Color::Green;
  const PROGRESS_RUNNING_OUT: Color = Color::Yellow;
  const PROGRESS_OVER: Color = Color::Red;
  const TIME: Color = Color::Cyan;
}

pub struct Viewer {
  store: Rc<RefCell<TaskStore>>,
}

impl Viewer {
  pub fn new(store: Rc<RefCell<TaskStore>>) -> Self {
    Self { store }
  }

  pub fn print_tasks(&self, show_deleted: bool) {
    let store = self.store.borrow();
    let now = store.now();
    let percentages = HashMap::new();
    for line in task_lines(store.tasks(), show_deleted, now, &percentages) {
      println!("{}", line);
    }
    println!();
    self.print_summary();
  }

  /// Renders the active tasks using the latest ticker readings where present.
  pub fn print_board(&self, percentages: &HashMap<uuid::Uuid, u8>) {
    let store = self.store.borrow();
    println!("{}", "".clear());
    for line in task_lines(store.tasks(), false, store.now(), percentages) {
      println!("{}", line);
    }
    println!();
    println!("{}", format_summary(&store.summary()));
  }

  pub fn print_task(&self, task: &Task) {
    let now = self.store.borrow().now();
    println!("{}", format_task(task, now, task.time_left_percentage(now)));
  }

  pub fn print_summary(&self) {
    println!("{}", format_summary(&self.store.borrow().summary()));
  }
}

fn task_lines(
  tasks: &[Task],
  show_deleted: bool,
  now: NaiveDateTime,
  percentages: &HashMap<uuid::Uuid, u8>,
) -> Vec<String> {
  let shown: Vec<&Task> = tasks
    .iter()
    .filter(|task| show_deleted || !task.is_deleted())
    .collect();
  if shown.is_empty() {
    return vec!["No tasks yet. Add one with `todos add <title>`".dimmed().to_string()];
  }

  shown
    .into_iter()
    .map(|task| {
      let percentage = percentages
        .get(&task.id())
        .copied()
        .unwrap_or_else(|| task.time_left_percentage(now));
      format_task(task, now, percentage)
    })
    .collect()
}

pub fn format_task(task: &Task, now: NaiveDateTime, percentage: u8) -> String {
  let done_mark = match task.is_completed() {
    true => "[x]".color(ViewColors::DONE_MARK),
    false => "[ ]".normal(),
  };
  let star = match task.is_important() {
    true => "*".color(ViewColors::TITLE_IMPORTANT).bold(),
    false => " ".normal(),
  };

  let mut title = task.title().normal();
  if task.is_important() {
    title = title.bold();
  }
  if task.is_completed() {
    title = title.strikethrough().dimmed();
  }
  if task.is_deleted() {
    title = title.italic().dimmed();
  }

  let window = format!(
    "{} to {}",
    task.start_time().format("%d %b %H:%M"),
    task.end_time().format("%d %b %H:%M")
  );

  format!(
    "{indent}{id}  {done} {star} {progress}  {title}  {window} {left}{deleted}",
    indent = " ".repeat(LINE_INDENT),
    id = shorten_id(task.id()).color(ViewColors::ID),
    done = done_mark,
    star = star,
    progress = format_progress(percentage),
    title = title,
    window = window.color(ViewColors::TIME),
    left = time_left_note(task, now).dimmed(),
    deleted = match task.is_deleted() {
      true => " (deleted)".dimmed().to_string(),
      false => String::new(),
    },
  )
}

pub fn format_progress(percentage: u8) -> String {
  let percentage = percentage.min(100);
  let filled = (percentage as usize * PROGRESS_BAR_WIDTH + 50) / 100;
  let bar = format!(
    "[{}{}] {:>3}%",
    "#".repeat(filled),
    "-".repeat(PROGRESS_BAR_WIDTH - filled),
    percentage
  );
  let color = match percentage {
    0 => ViewColors::PROGRESS_OVER,
    1..=25 => ViewColors::PROGRESS_RUNNING_OUT,
    _ => ViewColors::PROGRESS_PLENTY,
  };
  bar.color(color).to_string()
}

fn time_left_note(task: &Task, now: NaiveDateTime) -> String {
  let left = task.time_left(now);
  if left <= chrono::Duration::zero() {
    return "(time's up)".to_owned();
  }
  format!("({} left)", format_time_left(left))
}

pub fn format_summary(summary: &Summary) -> String {
  format!(
    "{indent}Total: {total}  Deleted: {deleted}  Important: {important}  Completed: {completed}",
    indent = " ".repeat(LINE_INDENT),
    total = summary.total.to_string().bold(),
    deleted = summary.deleted.to_string().bold(),
    important = summary.important.to_string().bold(),
    completed = summary.completed.to_string().bold(),
  )
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::time::parse_datetime;

  fn at(input: &str) -> NaiveDateTime {
    parse_datetime(input, chrono::NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()).unwrap()
  }

  fn task() -> Task {
    Task::new(
      uuid::Uuid::from_u128(0xdfcf_0000_0000_0000_0000_0000_0000_d73b),
      "Buy milk",
      at("2025-01-01T00:00"),
      at("2025-01-01T10:00"),
    )
  }

  #[test]
  fn progress_bar() {
    colored::control::set_override(false);
    assert_eq!(format_progress(50), "[#####-----]  50%");
    assert_eq!(format_progress(100), "[##########] 100%");
    assert_eq!(format_progress(0), "[----------]   0%");
  }

  #[test]
  fn progress_bar_caps_out_of_range_input() {
    colored::control::set_override(false);
    assert_eq!(format_progress(200), "[##########] 100%");
    assert_eq!(format_progress(u8::MAX), format_progress(100));
  }

  #[test]
  fn task_line() {
    colored::control::set_override(false);
    let line = format_task(&task(), at("2025-01-01T05:00"), 50);
    assert_eq!(
      line,
      "  dfcf..d73b  [ ]   [#####-----]  50%  Buy milk  01 Jan 00:00 to 01 Jan 10:00 (5h 00m left)"
    );
  }

  #[test]
  fn expired_task_line() {
    colored::control::set_override(false);
    let mut task = task();
    task.set_completed(true);
    let line = format_task(&task, at("2025-01-01T11:00"), 0);
    assert!(line.contains("[x]"));
    assert!(line.ends_with("(time's up)"));
  }

  #[test]
  fn empty_list_hint() {
    colored::control::set_override(false);
    let lines = task_lines(&[], false, at("2025-01-01T05:00"), &HashMap::new());
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("No tasks yet"));
  }

  #[test]
  fn summary_line() {
    colored::control::set_override(false);
    let summary = Summary {
      total: 3,
      deleted: 1,
      important: 2,
      completed: 0,
    };
    assert_eq!(
      format_summary(&summary),
      "  Total: 3  Deleted: 1  Important: 2  Completed: 0"
    );
  }
}

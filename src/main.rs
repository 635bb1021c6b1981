use std::{cell::RefCell, collections::HashMap, rc::Rc, sync::Arc};

use chrono::NaiveDateTime;
use log::{debug, warn};

use todos::{
  clock::{LocalClock, RandomIds},
  storage::JsonFileStorage,
  ticker::{ProgressBoard, ProgressTicker},
  time::parse_datetime,
  viewer::Viewer,
  Config, Error, Outcome, Result, TaskStore,
};

fn cli() -> clap::Command<'static> {
  let time_args = || {
    [
      clap::Arg::new("start").long("start").takes_value(true),
      clap::Arg::new("end").long("end").takes_value(true),
    ]
  };

  clap::Command::new("todos")
    .about("Tasks with a time window, kept on this machine")
    .arg_required_else_help(true)
    .subcommand(
      clap::Command::new("add")
        .arg(
          clap::Arg::new("title")
            .required(true)
            .index(1)
            .multiple_values(true),
        )
        .args(&time_args()),
    )
    .subcommand(clap::Command::new("done").arg(clap::Arg::new("id").required(true).index(1)))
    .subcommand(clap::Command::new("important").arg(clap::Arg::new("id").required(true).index(1)))
    .subcommand(clap::Command::new("rm").arg(clap::Arg::new("id").required(true).index(1)))
    .subcommand(
      clap::Command::new("edit")
        .arg(clap::Arg::new("id").required(true).index(1))
        .arg(clap::Arg::new("title").long("title").takes_value(true))
        .args(&time_args()),
    )
    .subcommand(clap::Command::new("list").arg(clap::Arg::new("all").long("all")))
    .subcommand(clap::Command::new("stat"))
    .subcommand(clap::Command::new("watch"))
    .subcommand(
      clap::Command::new("completions").arg(
        clap::Arg::new("shell")
          .required(true)
          .index(1)
          .value_parser(clap::value_parser!(clap_complete::Shell)),
      ),
    )
}

fn main() {
  env_logger::init();
  let matches = cli().get_matches();

  if let Some(("completions", command_matches)) = matches.subcommand() {
    if let Some(shell) = command_matches.get_one::<clap_complete::Shell>("shell") {
      clap_complete::generate(*shell, &mut cli(), "todos", &mut std::io::stdout());
    }
    return;
  }

  if let Err(err) = run(&matches) {
    eprintln!("{}", err);
    std::process::exit(1);
  }
}

fn run(matches: &clap::ArgMatches) -> Result<()> {
  let config = Config::new()?;
  let store = Rc::new(RefCell::new(open_store(&config)?));
  let viewer = Viewer::new(Rc::clone(&store));

  match matches.subcommand() {
    Some(("add", command_matches)) => {
      let title = command_matches
        .values_of("title")
        .map(|words| words.collect::<Vec<_>>().join(" "))
        .unwrap_or_default();
      let today = store.borrow().now().date();
      let start_time = parse_time_arg(command_matches, "start", today)?;
      let end_time = parse_time_arg(command_matches, "end", today)?;

      let task = store.borrow_mut().create(&title, start_time, end_time)?;
      println!("task added:");
      viewer.print_task(&task);
    }

    Some(("done", command_matches)) => {
      let id = resolve_id(&store.borrow(), command_matches)?;
      let outcome = store.borrow_mut().toggle_completed(id)?;
      report(&viewer, &store.borrow(), id, outcome);
    }

    Some(("important", command_matches)) => {
      let id = resolve_id(&store.borrow(), command_matches)?;
      let outcome = store.borrow_mut().toggle_important(id)?;
      report(&viewer, &store.borrow(), id, outcome);
    }

    Some(("rm", command_matches)) => {
      let id = resolve_id(&store.borrow(), command_matches)?;
      let outcome = store.borrow_mut().delete(id)?;
      report(&viewer, &store.borrow(), id, outcome);
    }

    Some(("edit", command_matches)) => {
      let id = resolve_id(&store.borrow(), command_matches)?;
      let today = store.borrow().now().date();
      let mut task = match store.borrow().task_by_id(id) {
        Some(task) => task.clone(),
        None => return Err(Error::NotFound(id)),
      };

      if let Some(title) = command_matches.value_of("title") {
        if title.trim().is_empty() {
          return Err(Error::Validation("title must not be empty".to_owned()));
        }
        task.set_title(title.trim());
      }
      let start_time = parse_time_arg(command_matches, "start", today)?.unwrap_or(task.start_time());
      let end_time = parse_time_arg(command_matches, "end", today)?.unwrap_or(task.end_time());
      task.set_window(start_time, end_time);

      let outcome = store.borrow_mut().update(task)?;
      report(&viewer, &store.borrow(), id, outcome);
    }

    Some(("list", command_matches)) => {
      viewer.print_tasks(command_matches.is_present("all"));
    }

    Some(("stat", _)) => {
      viewer.print_summary();
    }

    Some(("watch", _)) => {
      watch(&config, &store, &viewer);
    }

    Some((subcmd, _)) => println!("unknown subcommand {}", subcmd),
    None => println!("subcommand not found"),
  };

  Ok(())
}

fn open_store(config: &Config) -> Result<TaskStore> {
  let storage = JsonFileStorage::new(&config.storage_dir_path)?;
  TaskStore::open(
    &config.storage_key,
    Box::new(storage),
    Arc::new(LocalClock),
    Box::new(RandomIds),
  )
}

/// Redraws on every ticker reading and at least once per refresh interval, picking up
/// edits made from other terminals even while no task is watched.
fn watch(config: &Config, store: &Rc<RefCell<TaskStore>>, viewer: &Viewer) -> ! {
  let (ticker, updates) = ProgressTicker::new(store.borrow().clock(), config.refresh_interval());
  let mut board = ProgressBoard::new(ticker, updates);
  let mut percentages: HashMap<uuid::Uuid, u8> = HashMap::new();

  board.sync(store.borrow().tasks());
  viewer.print_board(&percentages);

  loop {
    for update in board.next_updates(config.refresh_interval()) {
      percentages.insert(update.id, update.percentage);
    }

    match open_store(config) {
      Ok(reloaded) => *store.borrow_mut() = reloaded,
      Err(err) => warn!("keeping previous tasks, reload failed: {}", err),
    }
    board.sync(store.borrow().tasks());
    percentages.retain(|id, _| board.is_watching(*id));
    debug!("watching {} tasks", board.len());

    viewer.print_board(&percentages);
  }
}

fn parse_time_arg(
  matches: &clap::ArgMatches,
  name: &str,
  today: chrono::NaiveDate,
) -> Result<Option<NaiveDateTime>> {
  match matches.value_of(name) {
    Some(raw) => parse_datetime(raw, today)
      .map(Some)
      .map_err(|err| Error::Validation(format!("can't parse --{} {:?}: {}", name, raw, err))),
    None => Ok(None),
  }
}

fn resolve_id(store: &TaskStore, matches: &clap::ArgMatches) -> Result<uuid::Uuid> {
  let raw = matches.value_of("id").unwrap_or_default();
  store
    .resolve_id(raw)
    .ok_or_else(|| Error::Validation(format!("no task matches id: {}", raw)))
}

fn report(viewer: &Viewer, store: &TaskStore, id: uuid::Uuid, outcome: Outcome) {
  match (outcome, store.task_by_id(id)) {
    (Outcome::Applied, Some(task)) => viewer.print_task(task),
    _ => println!("task with id: {} not found", id),
  }
}

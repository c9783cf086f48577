use clap::{CommandFactory, Parser};
use std::io::{self, BufRead};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use tracker_cli::cli::{
    Cli, Command, ConfigOverrideTarget, parse_config_override, parse_flag_value,
};
use tracker_cli::render;
use tracker_core::config::{
    ConfigOverrides, Palette, load_config_with_fallback, merge_overrides, palette_for_theme,
};
use tracker_core::lifecycle::StatusAction;
use tracker_core::model::parse_date;
use tracker_core::storage::{FileStore, default_store_dir};
use tracker_core::{
    AppError, DateProvider, FixedClock, NewTask, SystemClock, Task, TaskStatus, TaskStore,
};

struct Session {
    store: TaskStore<FileStore, Box<dyn DateProvider>>,
    palette: Palette,
}

fn init_tracing() {
    // Only persistence warnings by default; RUST_LOG widens it.
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|raw| {
            let raw = raw.trim();
            if raw.is_empty() {
                return None;
            }
            EnvFilter::try_new(raw).ok()
        })
        .unwrap_or_else(|| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn collect_overrides(raw_overrides: &[String]) -> Result<ConfigOverrides, AppError> {
    let mut overrides = ConfigOverrides::default();
    for raw in raw_overrides {
        let parsed = parse_config_override(raw).map_err(AppError::invalid_input)?;
        match parsed.target {
            ConfigOverrideTarget::Theme => overrides.theme = Some(parsed.value),
            ConfigOverrideTarget::RequireSchedule => {
                let value = parse_flag_value(&parsed.value).map_err(AppError::invalid_input)?;
                overrides.require_schedule = Some(value);
            }
        }
    }
    Ok(overrides)
}

fn open_session(cli: &Cli) -> Result<Session, AppError> {
    let loaded = load_config_with_fallback();
    if let Some(err) = loaded.error {
        eprintln!("WARNING: using default configuration: {}", err);
    }
    let config = merge_overrides(&loaded.config, &collect_overrides(&cli.config_override)?);

    let clock: Box<dyn DateProvider> = match cli.today.as_deref() {
        Some(raw) => Box::new(FixedClock::new(parse_date(raw)?)),
        None => Box::new(SystemClock),
    };

    let slot = FileStore::new(default_store_dir(config.store_dir.as_deref())?);
    debug!(dir = %slot.dir().display(), "opening task store");
    let store = TaskStore::open(slot, clock, config.store_options());

    Ok(Session {
        store,
        palette: palette_for_theme(config.theme.as_deref()),
    })
}

fn print_updated(session: &Session, verb: &str, task: &Task, json: bool) -> Result<(), AppError> {
    if json {
        println!("{}", render::to_json(task)?);
    } else {
        println!(
            "{verb} task: {} ({}) [{}]",
            task.description,
            task.id,
            render::status_text(task.status, &session.palette)
        );
    }
    Ok(())
}

fn print_task_list(tasks: &[Task], empty_message: &str, json: bool) -> Result<(), AppError> {
    if json {
        println!("{}", render::to_json(tasks)?);
    } else if tasks.is_empty() {
        println!("{empty_message}");
    } else {
        println!("{}", render::task_table(tasks));
    }
    Ok(())
}

fn set_status(
    session: &mut Session,
    id: u64,
    status: TaskStatus,
    json: bool,
) -> Result<(), AppError> {
    let task = session.store.set_status(id, status)?;
    print_updated(session, "Updated", &task, json)
}

fn run_command(session: &mut Session, command: Command, json: bool) -> Result<(), AppError> {
    let mutates = command.mutates();

    match command {
        Command::Add {
            description,
            start,
            end,
            comment,
        } => {
            let task = session.store.add(NewTask {
                description: description.unwrap_or_default(),
                start_time: start,
                end_time: end,
                comment,
            })?;
            print_updated(session, "Added", &task, json)?;
        }
        Command::Start { id } => set_status(session, id, StatusAction::Start.target(), json)?,
        Command::Done { id } => set_status(session, id, StatusAction::Complete.target(), json)?,
        Command::Reopen { id } => set_status(session, id, StatusAction::Reopen.target(), json)?,
        Command::Status { id, status } => set_status(session, id, status.parse()?, json)?,
        Command::Comment { id, text } => {
            let task = session.store.set_comment(id, &text)?;
            print_updated(session, "Commented", &task, json)?;
        }
        Command::Delete { id } => {
            let task = session.store.remove(id)?;
            print_updated(session, "Deleted", &task, json)?;
        }
        Command::Show { id } => {
            let task = session.store.get(id)?;
            if json {
                println!("{}", render::to_json(task)?);
            } else {
                println!("{}", render::task_details(task, &session.palette));
            }
        }
        Command::Today => {
            print_task_list(&session.store.today_view(), render::EMPTY_TODAY, json)?
        }
        Command::List => print_task_list(session.store.snapshot(), render::EMPTY_LIST, json)?,
        Command::History => {
            let days = session.store.history_view();
            if json {
                println!("{}", render::to_json(&days)?);
            } else {
                println!("{}", render::history_text(&days));
            }
        }
        Command::Shell => return Err(AppError::invalid_input("already in a shell session")),
    }

    if mutates && let Some(err) = session.store.persist_error() {
        eprintln!("WARNING: changes kept in memory but not saved: {}", err);
    }

    Ok(())
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

/// Splits a shell line on whitespace, honouring double quotes and `\"`.
fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escape = false;
    let mut quoted = false;

    for ch in line.chars() {
        if escape {
            if ch != '"' && ch != '\\' {
                current.push('\\');
            }
            current.push(ch);
            escape = false;
            continue;
        }

        match ch {
            '\\' if in_quotes => escape = true,
            '"' => {
                in_quotes = !in_quotes;
                quoted = true;
            }
            ch if ch.is_whitespace() && !in_quotes => {
                if !current.is_empty() || quoted {
                    args.push(std::mem::take(&mut current));
                }
                quoted = false;
            }
            ch => current.push(ch),
        }
    }

    if in_quotes {
        return Err(AppError::invalid_input("unterminated quote in command"));
    }

    if !current.is_empty() || quoted {
        args.push(current);
    }

    Ok(args)
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

fn run_shell_line(session: &mut Session, line: &str) -> Result<(), AppError> {
    let args = split_command_line(line)?;
    if args.is_empty() {
        return Ok(());
    }

    let argv = std::iter::once("tracker".to_string()).chain(args);
    let cli = Cli::try_parse_from(argv).map_err(normalize_parse_error)?;
    if cli.today.is_some() || !cli.config_override.is_empty() {
        return Err(AppError::invalid_input(
            "--today and --config-override apply when the session starts",
        ));
    }

    run_command(session, cli.command, cli.json)
}

fn run_interactive(session: &mut Session) -> Result<(), AppError> {
    let mut input = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();

    loop {
        input.clear();
        let bytes = stdin_lock.read_line(&mut input)?;
        if bytes == 0 {
            break;
        }

        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        if line == "help" || line == "?" {
            print_help();
            continue;
        }

        if let Err(err) = run_shell_line(session, line) {
            eprintln!("ERROR: {}", err);
        }
    }

    Ok(())
}

fn fail(err: AppError) -> ! {
    eprintln!("ERROR: {}", err);
    std::process::exit(1);
}

fn main() {
    init_tracing();

    let cli = if std::env::args_os().len() <= 1 {
        Cli {
            command: Command::Shell,
            json: false,
            today: None,
            config_override: Vec::new(),
        }
    } else {
        Cli::try_parse().unwrap_or_else(|err| {
            // --help and --version land here too
            if !err.use_stderr() {
                err.exit();
            }
            fail(normalize_parse_error(err))
        })
    };

    let mut session = open_session(&cli).unwrap_or_else(|err| fail(err));

    let result = match cli.command {
        Command::Shell => run_interactive(&mut session),
        command => run_command(&mut session, command, cli.json),
    };

    if let Err(err) = result {
        fail(err);
    }
}

use std::io::{self, BufRead};
use std::str::FromStr;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::{
    parse_key, parse_keys, Admission, ApplicationError, Session, ThreadPacer,
};
use crate::cli::args::{Cli, Commands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::{output, render};
use crate::config::Settings;
use crate::domain::Viewport;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    if let Some(Commands::Completion { shell }) = &cli.command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(*shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    let settings = load_settings(cli)?;
    let mut session = build_session(cli, settings);

    match &cli.command {
        Some(Commands::Show) | None => _show(&session),
        Some(Commands::Insert { keys, instant }) => _insert(&mut session, keys, *instant),
        Some(Commands::Search { key }) => _search(&mut session, key),
        Some(Commands::Layout { viewport }) => _layout(&session, *viewport),
        Some(Commands::Repl) => _repl(&mut session),
        Some(Commands::Info) => _info(&session),
        Some(Commands::Completion { .. }) => Ok(()),
    }
}

fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(delay) = cli.delay_ms {
        settings.animation.step_delay_ms = delay;
    }
    if let Some(seed) = &cli.seed {
        let parsed = parse_keys(seed);
        if parsed.keys.is_empty() {
            return Err(CliError::InvalidArgs(format!(
                "--seed contains no numeric keys: {:?}",
                seed
            )));
        }
        settings.sample = parsed.keys.iter().map(|k| k.value()).collect();
    }
    Ok(settings)
}

fn build_session(cli: &Cli, settings: Settings) -> Session {
    if cli.empty {
        Session::new(settings)
    } else {
        Session::with_sample(settings)
    }
}

#[instrument(skip(session))]
fn _show(session: &Session) -> CliResult<()> {
    render::print_tree(session);
    render::print_stats(session);
    Ok(())
}

#[instrument(skip(session))]
fn _insert(session: &mut Session, raw: &str, instant: bool) -> CliResult<()> {
    let parsed = parse_keys(raw);
    debug!("insert: {} key(s), {} discarded", parsed.keys.len(), parsed.discarded);
    if parsed.keys.is_empty() {
        output::warning(&format!("no numeric keys in {:?}", raw));
        return Ok(());
    }

    if instant {
        if let Some(summary) = session.insert_instant(&parsed.keys) {
            if let Some(notice) = session.trace().last() {
                output::success(notice);
            }
            debug!("instant insert summary: {:?}", summary);
        }
        render::print_tree(session);
        render::print_stats(session);
        return Ok(());
    }

    match session.begin_insert(parsed.keys) {
        Admission::Admitted => {
            session.play(&mut ThreadPacer, render::print_frame);
            render::print_stats(session);
        }
        Admission::Busy => output::warning("animation already running"),
        Admission::NothingToDo => {}
    }
    Ok(())
}

#[instrument(skip(session))]
fn _search(session: &mut Session, raw: &str) -> CliResult<()> {
    let Some(target) = parse_key(raw) else {
        output::warning(&format!("not a number: {:?}", raw));
        return Ok(());
    };
    match session.begin_search(target) {
        Admission::Admitted => {
            session.play(&mut ThreadPacer, render::print_frame);
            render::print_tree(session);
            render::print_stats(session);
        }
        Admission::Busy => output::warning("animation already running"),
        Admission::NothingToDo => {}
    }
    Ok(())
}

#[instrument(skip(session))]
fn _layout(session: &Session, viewport: Option<Viewport>) -> CliResult<()> {
    render::print_layout(session, viewport);
    Ok(())
}

#[instrument(skip(session))]
fn _info(session: &Session) -> CliResult<()> {
    output::header("Settings");
    match crate::config::global_config_path() {
        Some(path) => output::action("Global config", &path.display()),
        None => output::action("Global config", "(no config directory)"),
    }
    output::info(&session.settings().to_toml()?);
    Ok(())
}

/// One line of interactive input.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplCommand {
    Insert(String),
    Instant(String),
    Search(String),
    Show,
    Layout(Option<Viewport>),
    Reset,
    Clear,
    Help,
    Quit,
    Empty,
}

impl FromStr for ReplCommand {
    type Err = CliError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };
        let needs_arg = |what: &str| {
            if rest.is_empty() {
                Err(CliError::Usage(format!("usage: {} <{}>", verb, what)))
            } else {
                Ok(rest.to_string())
            }
        };
        match verb.to_ascii_lowercase().as_str() {
            "" => Ok(Self::Empty),
            "insert" | "i" => needs_arg("keys").map(Self::Insert),
            "instant" => needs_arg("keys").map(Self::Instant),
            "search" | "s" => needs_arg("key").map(Self::Search),
            "show" => Ok(Self::Show),
            "layout" if rest.is_empty() => Ok(Self::Layout(None)),
            "layout" => rest
                .parse::<Viewport>()
                .map(|v| Self::Layout(Some(v)))
                .map_err(|e| CliError::InvalidArgs(e.to_string())),
            "reset" => Ok(Self::Reset),
            "clear" => Ok(Self::Clear),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            other => Err(CliError::Usage(format!(
                "unknown command '{}', try 'help'",
                other
            ))),
        }
    }
}

const REPL_HELP: &str = "\
insert <k1,k2,..>   animated insert
instant <k1,k2,..>  insert without animation
search <k>          animated search
show                tree and statistics
layout [WxH]        coordinates, optional fit scale
reset               restore the sample tree
clear               clear trace and highlights
quit                leave";

#[instrument(skip(session))]
fn _repl(session: &mut Session) -> CliResult<()> {
    output::header("bstviz interactive session, 'help' for commands");
    render::print_tree(session);
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        output::prompt("bst>");
        let Some(line) = lines.next() else {
            break;
        };
        let line = line.map_err(|e| ApplicationError::io("read stdin", e))?;
        let command = match line.parse::<ReplCommand>() {
            Ok(command) => command,
            Err(e) => {
                output::error(&e);
                continue;
            }
        };
        debug!("repl: {:?}", command);
        match command {
            ReplCommand::Insert(keys) => _insert(session, &keys, false)?,
            ReplCommand::Instant(keys) => _insert(session, &keys, true)?,
            ReplCommand::Search(key) => _search(session, &key)?,
            ReplCommand::Show => _show(session)?,
            ReplCommand::Layout(viewport) => _layout(session, viewport)?,
            ReplCommand::Reset => {
                if session.reset() {
                    output::success("tree reset to sample");
                    render::print_tree(session);
                } else {
                    output::failure("cannot reset while an animation is running");
                }
            }
            ReplCommand::Clear => {
                session.clear_trace();
                output::success("trace cleared");
            }
            ReplCommand::Help => output::info(REPL_HELP),
            ReplCommand::Quit => break,
            ReplCommand::Empty => {}
        }
    }
    Ok(())
}

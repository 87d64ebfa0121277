// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Recstack-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Recstack and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Recstack CLI entrypoint.
//!
//! Each invocation opens the store (migrating older records if present), applies one command,
//! and writes the registry back. Diagnostics go to stderr, filtered by `RECSTACK_LOG`.

use std::error::Error;

use recstack::app::App;
use recstack::clock::{Clock, SystemClock};
use recstack::model::NodeId;
use recstack::query;
use recstack::store::{DirStore, KeyValueStore, LoadSource, StoreError, WriteDurability};

const DEFAULT_STORE_DIR: &str = ".recstack";
const STORE_ENV: &str = "RECSTACK_STORE";
const LOG_ENV: &str = "RECSTACK_LOG";

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [--store <dir>] [--durable-writes] <command>\n\nCommands:\n  show                          current node, breadcrumbs, tokens, stats\n  answer <text> [--question <text>]\n                                save the current node and list its tokens\n  dive <token>                  open a sub-question for <token>\n  back                          return to the parent\n  jump <index>                  jump to breadcrumb <index>\n  open <node-id>                reopen an existing child of the current node\n  sessions                      list sessions, most recent first\n  new                           start a new session\n  switch <session-id>           make another session current\n  delete <session-id>           delete a session\n  reset                         restart the current session from a fresh root\n  clear-all                     delete every session and legacy record\n  export                        print the current tree as an outline\n  edges                         print parent -> child edges\n  schema                        print the JSON Schema of the stored record\n\n--store defaults to ${STORE_ENV}, else ./{DEFAULT_STORE_DIR}.\n--durable-writes opts into slower, best-effort durable persistence (fsync/sync where supported)."
    );
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Show,
    Answer {
        answer: String,
        question: Option<String>,
    },
    Dive(String),
    Back,
    Jump(usize),
    Open(NodeId),
    Sessions,
    New,
    Switch(String),
    Delete(String),
    Reset,
    ClearAll,
    Export,
    Edges,
    Schema,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    store_dir: Option<String>,
    durable_writes: bool,
    command: Option<Command>,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--store" => {
                if options.store_dir.is_some() {
                    return Err(());
                }
                options.store_dir = Some(args.next().ok_or(())?);
            }
            "--durable-writes" => {
                if options.durable_writes {
                    return Err(());
                }
                options.durable_writes = true;
            }
            _ if arg.starts_with('-') => return Err(()),
            _ => {
                options.command = Some(parse_command(&arg, &mut args)?);
                break;
            }
        }
    }

    if args.next().is_some() {
        return Err(());
    }

    Ok(options)
}

fn parse_command(name: &str, args: &mut impl Iterator<Item = String>) -> Result<Command, ()> {
    let command = match name {
        "show" => Command::Show,
        "answer" => {
            let mut answer = None;
            let mut question = None;
            while let Some(arg) = args.next() {
                if arg == "--question" {
                    if question.is_some() {
                        return Err(());
                    }
                    question = Some(args.next().ok_or(())?);
                } else if answer.is_none() {
                    answer = Some(arg);
                } else {
                    return Err(());
                }
            }
            Command::Answer {
                answer: answer.ok_or(())?,
                question,
            }
        }
        "dive" => Command::Dive(args.next().ok_or(())?),
        "back" => Command::Back,
        "jump" => Command::Jump(args.next().ok_or(())?.parse().map_err(|_| ())?),
        "open" => Command::Open(args.next().ok_or(())?.parse().map_err(|_| ())?),
        "sessions" => Command::Sessions,
        "new" => Command::New,
        "switch" => Command::Switch(args.next().ok_or(())?),
        "delete" => Command::Delete(args.next().ok_or(())?),
        "reset" => Command::Reset,
        "clear-all" => Command::ClearAll,
        "export" => Command::Export,
        "edges" => Command::Edges,
        "schema" => Command::Schema,
        _ => return Err(()),
    };
    Ok(command)
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn show<S: KeyValueStore, C: Clock>(app: &App<S, C>) {
    let session = app.session();
    let current = session.current();
    let crumbs = query::breadcrumbs(session)
        .into_iter()
        .map(|crumb| {
            if crumb.active {
                format!("[{}] *{}*", crumb.index, crumb.label)
            } else {
                format!("[{}] {}", crumb.index, crumb.label)
            }
        })
        .collect::<Vec<_>>();
    let stats = query::stats(session);

    println!("session:  {}", session.id());
    println!("path:     {}", crumbs.join(" > "));
    println!("node:     {}", current.id());
    println!("question: {}", current.question());
    println!("answer:   {}", current.answer());

    let tokens = query::candidate_tokens(session);
    if !tokens.is_empty() {
        println!("tokens:   {}", tokens.join(" "));
    }
    for child in query::resolved_children(session) {
        println!("resolved: {} {} -> {}", child.id(), child.question(), child.answer());
    }
    println!(
        "depth {} | nodes {} | max depth {}",
        stats.current_depth, stats.total_nodes, stats.max_depth_reached
    );
}

fn run(options: CliOptions, command: Command) -> Result<(), Box<dyn Error>> {
    if command == Command::Schema {
        let schema = recstack::store::current_record_schema();
        println!("{}", serde_json::to_string_pretty(&schema)?);
        return Ok(());
    }

    let dir = options
        .store_dir
        .or_else(|| std::env::var(STORE_ENV).ok())
        .unwrap_or_else(|| DEFAULT_STORE_DIR.to_owned());
    let mut store = DirStore::new(dir);
    if options.durable_writes {
        store = store.with_durability(WriteDurability::Durable);
    }

    let (mut app, report) = App::open(store, SystemClock)?;
    for corrupt in &report.corrupt {
        eprintln!("warning: {corrupt}");
    }
    match report.source {
        LoadSource::MigratedFromTree => eprintln!("note: migrated single-tree record to sessions"),
        LoadSource::RecoveredFromStack { recovered_nodes } => eprintln!(
            "note: recovered {recovered_nodes} node(s) from legacy stack; abandoned branches are lost"
        ),
        LoadSource::Current | LoadSource::Fresh => {}
    }
    let deferred = report.write_error;
    if let Some(err) = &deferred {
        eprintln!("warning: loaded state could not be written back: {err}");
    }

    finish(dispatch(&mut app, command), deferred)
}

/// The command's own error wins; otherwise a write failure from opening the store still fails
/// the invocation once the command has run.
fn finish(
    outcome: Result<(), Box<dyn Error>>,
    deferred: Option<StoreError>,
) -> Result<(), Box<dyn Error>> {
    outcome?;
    match deferred {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}

fn dispatch<S: KeyValueStore, C: Clock>(
    app: &mut App<S, C>,
    command: Command,
) -> Result<(), Box<dyn Error>> {
    match command {
        Command::Show => show(app),
        Command::Answer { answer, question } => {
            let tokens = app.answer(question.as_deref().unwrap_or(""), &answer)?;
            println!("{}", tokens.join(" "));
        }
        Command::Dive(token) => {
            let node_id = app.dive(&token)?;
            println!("{node_id}");
        }
        Command::Back => {
            let node_id = app.back()?;
            println!("{node_id}");
        }
        Command::Jump(index) => {
            let node_id = app.jump(index)?;
            println!("{node_id}");
        }
        Command::Open(child_id) => {
            let node_id = app.open_child(child_id)?;
            println!("{node_id}");
        }
        Command::Sessions => {
            for summary in query::session_list(app.registry()) {
                let marker = if summary.is_current { '*' } else { ' ' };
                println!(
                    "{marker} {} created={} nodes={} max_depth={} {}",
                    summary.id,
                    summary.created,
                    summary.node_count,
                    summary.max_depth_reached,
                    summary.root_question
                );
            }
        }
        Command::New => {
            let session_id = app.new_session()?;
            println!("{session_id}");
        }
        Command::Switch(session_id) => {
            app.switch_session(&session_id)?;
            println!("{}", app.session().id());
        }
        Command::Delete(session_id) => {
            let outcome = app.delete_session(&session_id)?;
            println!("{}", outcome.current);
        }
        Command::Reset => app.reset_current_session()?,
        Command::ClearAll => app.clear_all()?,
        Command::Export => print!("{}", query::export_text(app.session())),
        Command::Edges => {
            for edge in query::edges(app.session()) {
                println!("{} -> {}", edge.parent, edge.child);
            }
        }
        Command::Schema => {}
    }

    Ok(())
}

fn main() {
    let mut args = std::env::args();
    let program = args.next().unwrap_or_else(|| "recstack".to_owned());

    let mut options = match parse_options(args) {
        Ok(options) => options,
        Err(()) => {
            print_usage(&program);
            std::process::exit(2);
        }
    };
    let Some(command) = options.command.take() else {
        print_usage(&program);
        std::process::exit(2);
    };

    init_tracing();

    if let Err(err) = run(options, command) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

use std::collections::HashSet;
use std::io::{self, BufRead, Read, Write};

use anyhow::anyhow;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::cli::Invocation;
use crate::codec;
use crate::config::Config;
use crate::events::{App, Event, Transition};
use crate::render::Renderer;
use crate::store::KvStore;
use crate::task::TaskItem;
use crate::theme::Theme;

pub fn known_command_names() -> Vec<&'static str> {
    vec![
        "add", "list", "done", "delete", "move", "count", "theme", "export", "import", "help",
        "version",
    ]
}

pub fn expand_command_abbrev<'a>(token: &'a str, known: &[&'a str]) -> Option<&'a str> {
    if known.contains(&token) {
        return Some(token);
    }

    let mut matches = known.iter().copied().filter(|name| name.starts_with(token));
    let first = matches.next()?;
    if matches.next().is_some() { None } else { Some(first) }
}

#[instrument(skip(app, cfg, renderer, inv))]
pub fn dispatch<S: KvStore>(
    app: &mut App<S>,
    cfg: &Config,
    renderer: &mut Renderer,
    inv: Invocation,
) -> anyhow::Result<()> {
    debug!(command = %inv.command, args = ?inv.command_args, "dispatching command");

    match inv.command.as_str() {
        "add" => cmd_add(app, cfg, &inv.command_args),
        "list" => cmd_list(app, renderer, &inv.command_args),
        "done" => cmd_done(app, &inv.command_args),
        "delete" => cmd_delete(app, cfg, &inv.command_args),
        "move" => cmd_move(app, &inv.command_args),
        "count" => cmd_count(app),
        "theme" => cmd_theme(app, &inv.command_args),
        "export" => cmd_export(app),
        "import" => cmd_import(app),
        "help" => cmd_help(),
        "version" => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => Err(anyhow!("unknown command: {other}")),
    }
}

// Splits `category:<value>` modifiers out of free text, taskwarrior-style.
fn split_text_and_category(args: &[String]) -> (String, Option<String>) {
    let mut words = Vec::new();
    let mut category = None;

    for arg in args {
        if let Some((key, value)) = arg.split_once(':')
            && matches!(key.to_ascii_lowercase().as_str(), "category" | "cat")
        {
            category = Some(value.to_string());
            continue;
        }
        words.push(arg.clone());
    }

    (words.join(" "), category)
}

fn resolve_position<S: KvStore>(app: &App<S>, token: &str) -> anyhow::Result<Option<Uuid>> {
    let position: usize = token
        .parse()
        .map_err(|_| anyhow!("expected a task number, got: {token}"))?;
    if position == 0 {
        return Err(anyhow!("task numbers start at 1"));
    }
    Ok(app.list.ref_at(position - 1))
}

#[instrument(skip(app, cfg, args))]
fn cmd_add<S: KvStore>(app: &mut App<S>, cfg: &Config, args: &[String]) -> anyhow::Result<()> {
    info!("command add");

    let (text, category) = split_text_and_category(args);
    let category = category
        .or_else(|| cfg.get("default.category"))
        .unwrap_or_else(|| "other".to_string());

    match app.handle(Event::Added { text, category })? {
        Transition::Rejected(err) => Err(err.into()),
        _ => {
            println!("Created task {}.", app.list.len());
            Ok(())
        }
    }
}

#[instrument(skip(app, renderer, args))]
fn cmd_list<S: KvStore>(
    app: &mut App<S>,
    renderer: &mut Renderer,
    args: &[String],
) -> anyhow::Result<()> {
    info!("command list");

    let (search, category) = split_text_and_category(args);
    app.handle(Event::SearchChanged(search))?;
    app.handle(Event::CategoryChanged(category.unwrap_or_default()))?;

    let visible: HashSet<Uuid> = app.visible_items().iter().map(|task| task.id).collect();
    let rows: Vec<(usize, &TaskItem)> = app
        .list
        .items()
        .iter()
        .enumerate()
        .filter(|(_, task)| visible.contains(&task.id))
        .map(|(index, task)| (index + 1, task))
        .collect();

    renderer.print_task_table(&rows, app.list.counts(), app.theme)?;
    Ok(())
}

#[instrument(skip(app, args))]
fn cmd_done<S: KvStore>(app: &mut App<S>, args: &[String]) -> anyhow::Result<()> {
    info!("command done");

    let token = args.first().ok_or_else(|| anyhow!("done requires a task number"))?;
    let Some(id) = resolve_position(app, token)? else {
        println!("No task {token}.");
        return Ok(());
    };

    app.handle(Event::Toggled(id))?;
    let completed = app.list.get(id).is_some_and(|task| task.completed);
    if completed {
        println!("Completed task {token}.");
    } else {
        println!("Reopened task {token}.");
    }
    Ok(())
}

#[instrument(skip(app, cfg, args))]
fn cmd_delete<S: KvStore>(app: &mut App<S>, cfg: &Config, args: &[String]) -> anyhow::Result<()> {
    info!("command delete");

    let token = args
        .first()
        .ok_or_else(|| anyhow!("delete requires a task number"))?;
    let Some(id) = resolve_position(app, token)? else {
        println!("No task {token}.");
        return Ok(());
    };

    app.handle(Event::DeleteRequested(id))?;
    let Some(pending) = app.list.pending_delete() else {
        println!("No task {token}.");
        return Ok(());
    };

    let confirmed = if cfg.get_bool("confirmation").unwrap_or(true) {
        ask_confirmation(&format!(
            "Permanently delete task {token} '{}'? (yes/no) ",
            pending.text
        ))?
    } else {
        true
    };

    if confirmed {
        app.handle(Event::DeleteConfirmed)?;
        println!("Deleted task {token}.");
    } else {
        app.handle(Event::DeleteCancelled)?;
        println!("Deletion cancelled.");
    }
    Ok(())
}

fn ask_confirmation(prompt: &str) -> anyhow::Result<bool> {
    print!("{prompt}");
    io::stdout().flush()?;

    let mut answer = String::new();
    let read = io::stdin().lock().read_line(&mut answer)?;
    if read == 0 {
        // EOF on stdin counts as declining.
        warn!("no confirmation input, treating as no");
        return Ok(false);
    }

    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}

#[instrument(skip(app, args))]
fn cmd_move<S: KvStore>(app: &mut App<S>, args: &[String]) -> anyhow::Result<()> {
    info!("command move");

    let usage = || anyhow!("usage: move <n> end | move <n> before <m>");
    let token = args.first().ok_or_else(usage)?;
    let Some(item) = resolve_position(app, token)? else {
        println!("No task {token}.");
        return Ok(());
    };

    let before = match args.get(1).map(String::as_str) {
        Some("end") => None,
        Some("before") => {
            let anchor_token = args.get(2).ok_or_else(usage)?;
            match resolve_position(app, anchor_token)? {
                Some(anchor) => Some(anchor),
                None => {
                    println!("No task {anchor_token}.");
                    return Ok(());
                }
            }
        }
        _ => return Err(usage()),
    };

    match app.handle(Event::Reordered { item, before })? {
        Transition::Changed => println!("Moved task {token}."),
        _ => println!("Task {token} not moved."),
    }
    Ok(())
}

#[instrument(skip(app))]
fn cmd_count<S: KvStore>(app: &App<S>) -> anyhow::Result<()> {
    let (completed, total) = app.list.counts();
    println!("{completed}/{total} completed");
    Ok(())
}

#[instrument(skip(app, args))]
fn cmd_theme<S: KvStore>(app: &mut App<S>, args: &[String]) -> anyhow::Result<()> {
    info!("command theme");

    let target = match args.first().map(String::as_str) {
        None => {
            println!("Theme is {}.", app.theme.as_str());
            return Ok(());
        }
        Some("toggle") => app.theme.toggled(),
        Some("light") => Theme::Light,
        Some("dark") => Theme::Dark,
        Some(other) => return Err(anyhow!("unknown theme: {other}")),
    };

    if target != app.theme {
        app.handle(Event::ThemeToggled)?;
    }
    println!("Theme set to {}.", app.theme.as_str());
    Ok(())
}

#[instrument(skip(app))]
fn cmd_export<S: KvStore>(app: &App<S>) -> anyhow::Result<()> {
    println!("{}", codec::items_to_json(app.list.items())?);
    Ok(())
}

#[instrument(skip(app))]
fn cmd_import<S: KvStore>(app: &mut App<S>) -> anyhow::Result<()> {
    info!("command import");

    let mut raw = String::new();
    io::stdin().lock().read_to_string(&mut raw)?;

    let items = codec::items_from_json(&raw)?;
    let count = items.len();
    app.replace_items(items)?;

    println!("Imported {count} task(s).");
    Ok(())
}

fn cmd_help() -> anyhow::Result<()> {
    println!("usage: taskify <command> [args]");
    println!();
    println!("  add <text> [category:<c>]     append a task");
    println!("  list [search] [category:<c>]  show matching tasks");
    println!("  done <n>                      toggle completion");
    println!("  delete <n>                    delete after confirmation");
    println!("  move <n> end                  move a task to the end");
    println!("  move <n> before <m>           move a task before another");
    println!("  count                         completed/total");
    println!("  theme [light|dark|toggle]     show or change the theme");
    println!("  export                        print tasks as JSON");
    println!("  import                        replace tasks from JSON on stdin");
    println!();
    println!(
        "built-in categories: {}",
        crate::task::BUILTIN_CATEGORIES.join(", ")
    );
    Ok(())
}

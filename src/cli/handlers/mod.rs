use std::path::{Path, PathBuf};

use tracing::info;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io;
use crate::model::config::Config;
use crate::model::profile::{ScopeProfile, builtin_profiles, default_profile, find_profile, select_profile};
use crate::model::task::TaskRecord;
use crate::model::task_list::TaskList;
use crate::ops::scan::{CommentScanner, ScanOptions, footer_line};
use crate::ops::search::{Filter, MatchOptions};
use crate::parse::parse_task;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let config = config_io::read_config(cli.config.as_deref())?;
    let file = cli
        .file
        .clone()
        .unwrap_or_else(|| config_io::expand_home(&config.todo_file));
    let json = cli.json;

    let command = cli
        .command
        .unwrap_or(Commands::List(ListArgs::default()));

    match command {
        // Scan may not touch the task file at all
        Commands::Scan(args) => cmd_scan(args, &config, json),

        // Read commands
        Commands::List(args) => {
            let list = TaskList::load_or_new(&file)?;
            let shown = list.filter_terms(&args.terms);
            print_tasks(&list, &shown, json)
        }
        Commands::Done => {
            let list = TaskList::load_or_new(&file)?;
            let shown = list.filter_by(Filter::Complete(true), None)?;
            print_tasks(&list, &shown, json)
        }
        Commands::Listpri(args) => {
            let list = TaskList::load_or_new(&file)?;
            let shown = list
                .filter_terms(&args.terms)
                .filter_priorities(args.priorities.as_deref().unwrap_or(""))?;
            print_tasks(&list, &shown, json)
        }
        Commands::Search(args) => cmd_search(args, &config, &file, json),
        Commands::Contexts => {
            let list = TaskList::load_or_new(&file)?;
            print_tags(list.contexts().into_iter(), json)
        }
        Commands::Projects => {
            let list = TaskList::load_or_new(&file)?;
            print_tags(list.projects().into_iter(), json)
        }

        // Write commands
        Commands::Add(args) => cmd_add(args, &config, &file, json),
        Commands::Check(args) => modify_tasks(&config, &file, &args.indices, json, |t| {
            t.set_complete(true)
        }),
        Commands::Uncheck(args) => modify_tasks(&config, &file, &args.indices, json, |t| {
            t.set_complete(false)
        }),
        Commands::Toggle(args) => {
            modify_tasks(&config, &file, &args.indices, json, |t| t.toggle())
        }
        Commands::Pri(args) => modify_tasks(&config, &file, &[args.index], json, |t| {
            t.set_priority(&args.priority.to_ascii_uppercase())
        }),
        Commands::Depri(args) => {
            modify_tasks(&config, &file, &args.indices, json, |t| t.clear_priority())
        }
        Commands::Append(args) => modify_tasks(&config, &file, &[args.index], json, |t| {
            t.append_text(&args.text.join(" "))
        }),
        Commands::Prepend(args) => modify_tasks(&config, &file, &[args.index], json, |t| {
            t.prepend_text(&args.text.join(" "))
        }),
        Commands::Replace(args) => cmd_replace(args, &config, &file, json),
        Commands::Rm(args) => cmd_rm(args, &config, &file),
        Commands::Sort => {
            let mut list = TaskList::load_or_new(&file)?;
            if list.sort() {
                list.persist()?;
                println!("Sorted {} tasks", list.len());
            } else {
                println!("Already sorted");
            }
            Ok(())
        }
        Commands::Dedup => {
            let mut list = TaskList::load_or_new(&file)?;
            let removed = list.deduplicate();
            save(&mut list, &config, removed > 0)?;
            println!("Removed {} duplicate task(s)", removed);
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Check a 1-based task number against the list.
fn check_number(list: &TaskList, number: usize) -> Result<(), Box<dyn std::error::Error>> {
    if number == 0 || number > list.len() {
        return Err(format!("no task {} (the list has {} tasks)", number, list.len()).into());
    }
    Ok(())
}

/// Validate every number up front, then return them sorted and unique.
fn check_numbers(
    list: &TaskList,
    numbers: &[usize],
) -> Result<Vec<usize>, Box<dyn std::error::Error>> {
    for &number in numbers {
        check_number(list, number)?;
    }
    let mut numbers = numbers.to_vec();
    numbers.sort_unstable();
    numbers.dedup();
    Ok(numbers)
}

/// 1-based position of `task` in `list`, after a save may have sorted it.
fn number_of(list: &TaskList, task: &TaskRecord, fallback: usize) -> usize {
    list.iter()
        .position(|t| t == task)
        .map(|i| i + 1)
        .unwrap_or(fallback)
}

/// Rewrite the file if anything changed, sorting first when configured.
fn save(list: &mut TaskList, config: &Config, changed: bool) -> CmdResult {
    let sorted = config.keep_sorted && list.sort();
    if changed || sorted {
        list.persist()?;
    }
    Ok(())
}

/// Pair each task of `subset` with its 1-based number in `list`.
///
/// `subset` must keep the order of `list`, which every filter does.
fn number_subset<'a>(list: &TaskList, subset: &'a TaskList) -> Vec<(usize, &'a TaskRecord)> {
    let mut numbered = Vec::with_capacity(subset.len());
    let mut all = list.iter().enumerate();
    for task in subset {
        if let Some((i, _)) = all.by_ref().find(|(_, t)| *t == task) {
            numbered.push((i + 1, task));
        }
    }
    numbered
}

fn print_tasks(list: &TaskList, shown: &TaskList, json: bool) -> CmdResult {
    let numbered = number_subset(list, shown);
    if json {
        let items: Vec<TaskJson> = numbered
            .iter()
            .map(|(n, t)| task_to_json(Some(*n), t))
            .collect();
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else {
        for line in format_numbered(&numbered) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn print_task(number: usize, task: &TaskRecord, json: bool) -> CmdResult {
    if json {
        println!("{}", serde_json::to_string_pretty(&task_to_json(Some(number), task))?);
    } else {
        println!("{}: {}", number, task);
    }
    Ok(())
}

fn print_tags<'a>(tags: impl Iterator<Item = &'a str>, json: bool) -> CmdResult {
    let tags: Vec<&str> = tags.collect();
    if json {
        println!("{}", serde_json::to_string_pretty(&tags)?);
    } else {
        for tag in tags {
            println!("{}", tag);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_search(args: SearchArgs, config: &Config, file: &Path, json: bool) -> CmdResult {
    let list = TaskList::load_or_new(file)?;
    let query = args.query.as_str();
    let filter = match args.target {
        SearchTarget::Message => Filter::Message(query),
        SearchTarget::Priority => Filter::Priority(query),
        SearchTarget::Context => Filter::Context(query.trim_start_matches('@')),
        SearchTarget::Project => Filter::Project(query.trim_start_matches('+')),
        SearchTarget::Keyword => Filter::Keyword(query),
    };
    let options = MatchOptions {
        strict: args.strict || config.search.strict,
        case_sensitive: args.case_sensitive || config.search.case_sensitive,
    };
    let shown = list.filter_by(filter, Some(options))?;
    print_tasks(&list, &shown, json)
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_add(args: AddArgs, config: &Config, file: &Path, json: bool) -> CmdResult {
    let mut list = TaskList::load_or_new(file)?;
    let mut task = parse_task(&args.text.join(" "))?;
    if (args.date || config.prepend_date) && task.created_date().is_none() {
        task.stamp_created(chrono::Local::now().date_naive())?;
    }

    let number = match args.index {
        Some(number) => {
            if number == 0 || number > list.len() + 1 {
                return Err(format!(
                    "cannot insert at {} (the list has {} tasks)",
                    number,
                    list.len()
                )
                .into());
            }
            list.insert_at(number - 1, task.clone())?;
            number
        }
        None => list.append(task.clone()) + 1,
    };
    save(&mut list, config, true)?;

    print_task(number_of(&list, &task, number), &task, json)
}

/// Load, change the numbered tasks, save, and print them. Nothing is
/// written if any number is out of range or any change fails.
fn modify_tasks<F>(
    config: &Config,
    file: &Path,
    numbers: &[usize],
    json: bool,
    mut change: F,
) -> CmdResult
where
    F: FnMut(&mut TaskRecord) -> Result<(), crate::model::task::TaskError>,
{
    let mut list = TaskList::load_or_new(file)?;
    let numbers = check_numbers(&list, numbers)?;

    let mut changed = false;
    let mut updated = Vec::with_capacity(numbers.len());
    for &number in &numbers {
        let task = list
            .safe_get_mut(number)
            .ok_or_else(|| format!("no task {}", number))?;
        let before = task.clone();
        change(task)?;
        changed |= task.to_string() != before.to_string();
        updated.push((number, task.clone()));
    }

    save(&mut list, config, changed)?;
    for (number, task) in &updated {
        print_task(number_of(&list, task, *number), task, json)?;
    }
    Ok(())
}

fn cmd_replace(args: TextArgs, config: &Config, file: &Path, json: bool) -> CmdResult {
    let mut list = TaskList::load_or_new(file)?;
    check_number(&list, args.index)?;
    let replacement = parse_task(&args.text.join(" "))?;

    let task = list
        .safe_get_mut(args.index)
        .ok_or_else(|| format!("no task {}", args.index))?;
    let changed = *task != replacement;
    *task = replacement.clone();

    save(&mut list, config, changed)?;
    print_task(number_of(&list, &replacement, args.index), &replacement, json)
}

fn cmd_rm(args: IndexArgs, config: &Config, file: &Path) -> CmdResult {
    let mut list = TaskList::load_or_new(file)?;
    let numbers = check_numbers(&list, &args.indices)?;

    // Highest first so the remaining numbers stay valid
    let mut removed = Vec::with_capacity(numbers.len());
    for &number in numbers.iter().rev() {
        let task = list
            .safe_pop(number)
            .ok_or_else(|| format!("no task {}", number))?;
        removed.push((number, task));
    }
    save(&mut list, config, true)?;

    for (number, task) in removed.iter().rev() {
        println!("Removed {}: {}", number, task);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Scan
// ---------------------------------------------------------------------------

fn cmd_scan(args: ScanArgs, config: &Config, json: bool) -> CmdResult {
    let root = args.path.unwrap_or_else(|| PathBuf::from("."));

    // Configured profiles shadow built-ins of the same name
    let mut profiles: Vec<ScopeProfile> = config.profiles.clone();
    profiles.extend(
        builtin_profiles()
            .into_iter()
            .filter(|b| !config.profiles.iter().any(|p| p.name == b.name)),
    );
    let fallback = default_profile();
    let profile = match args.profile.as_deref() {
        Some("default") => &fallback,
        Some(name) => find_profile(&profiles, name)
            .ok_or_else(|| format!("unknown profile: {}", name))?,
        None => select_profile(&root, &profiles, &fallback),
    };
    info!(profile = %profile.name, root = %root.display(), "selected scan profile");

    let scanner = CommentScanner::new(&root, profile, ScanOptions::from(&config.scan))?;
    let report = scanner.scan()?;

    if let Some(into) = args.into {
        let mut list = TaskList::load_or_new(&into)?;
        let before = list.clone();
        list.extend(report.tasks.iter().cloned());
        let changed = list != before;
        save(&mut list, config, changed)?;
        println!(
            "Merged {} task(s) into {}",
            report.tasks.len(),
            into.display()
        );
    } else if json {
        let output = ScanJson {
            profile: profile.name.clone(),
            tasks: report.tasks.iter().map(|t| task_to_json(None, t)).collect(),
            errors: report.errors.iter().map(soft_error_to_json).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    } else {
        for task in &report.tasks {
            println!("{}", task);
        }
        println!("{}", footer_line(profile));
    }

    for line in format_soft_errors(&report.errors) {
        eprintln!("{}", line);
    }
    Ok(())
}

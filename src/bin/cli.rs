use schedule_engine::calendar;
use schedule_engine::logging::init_logging;
use schedule_engine::snapshot::schedule_rows;
use schedule_engine::{
    Dependency, EngineConfig, ProjectTask, Task, apply_date_updates,
    calculate_critical_path_detailed, cascade_changes, detect_employee_conflicts,
    ensure_dependency_no_cycle, get_all_employee_conflicts, load_tasks_from_csv,
    load_tasks_from_json, save_schedule_to_csv, save_schedule_to_json, save_tasks_to_json,
    validate_dependency_no_cycle,
};
use std::collections::HashMap;
use std::io::{self, Write};

const LOCAL_PROJECT: &str = "local";

fn render_row<'a>(widths: &[usize], cells: impl Iterator<Item = &'a str>) -> String {
    let mut line = String::from("|");
    for (ci, cell) in cells.enumerate() {
        line.push(' ');
        line.push_str(cell);
        line.push_str(&" ".repeat(widths[ci].saturating_sub(cell.len())));
        line.push_str(" |");
    }
    line
}

fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (ci, cell) in row.iter().enumerate() {
            if cell.len() > widths[ci] {
                widths[ci] = cell.len();
            }
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&render_row(&widths, headers.iter().copied()));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in rows {
        out.push_str(&render_row(&widths, row.iter().map(String::as_str)));
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn render_tasks(tasks: &[Task]) -> String {
    let rows: Vec<Vec<String>> = tasks
        .iter()
        .map(|task| {
            let deps = task
                .dependencies
                .iter()
                .map(|dep| {
                    format!(
                        "{}:{}:{}",
                        dep.predecessor_id, dep.dependency_type, dep.lag_days
                    )
                })
                .collect::<Vec<_>>()
                .join(";");
            let assignees = task
                .assignments
                .iter()
                .map(|a| a.employee_id.as_str())
                .collect::<Vec<_>>()
                .join(",");
            vec![
                task.id.clone(),
                task.name.clone(),
                task.start_date.to_string(),
                task.end_date.to_string(),
                task.duration_days.to_string(),
                deps,
                assignees,
            ]
        })
        .collect();
    render_table(
        &["id", "name", "start", "end", "days", "dependencies", "assigned"],
        &rows,
    )
}

fn print_help() {
    println!(
        "Commands:\n  help                                   Show this help\n  show                                   Show loaded tasks\n  load <json|csv> <path>                 Load a task snapshot\n  save <path>                            Save tasks as a JSON snapshot\n  critical                               Compute the CPM schedule\n  cascade <id>                           Propagate <id>'s dates to its successors\n  move <id> <start> <end>                Set dates (YYYY-MM-DD) and cascade\n  link <pred> <succ> [FS|SS|FF|SF] [lag] Add a dependency and cascade\n  validate <pred> <succ>                 Check a dependency for cycles\n  conflicts <employee> <start> <end> [exclude_id]\n                                         Bookings overlapping a range\n  conflicts-all <employee>               All overlapping pairs for an employee\n  export <json|csv> <path>               Write the computed schedule\n  config show                            Show engine configuration\n  config load <json_path>                Load engine configuration\n  quit|exit                              Exit"
    );
}

fn print_config(config: &EngineConfig) {
    println!("Dependency policy  : {}", config.dependency_type_policy.as_str());
    println!("Validate snapshots : {}", config.validate_snapshots);
    println!("Max conflict tasks : {}", config.max_conflict_scan_tasks);
}

fn print_critical(tasks: &[Task]) {
    let result = calculate_critical_path_detailed(tasks);
    println!("Schedule ({})", result.summary().to_cli_summary());
    let rows: Vec<Vec<String>> = schedule_rows(&result, tasks)
        .into_iter()
        .map(|row| {
            vec![
                row.task_id,
                row.early_start.to_string(),
                row.early_finish.to_string(),
                row.late_start.to_string(),
                row.late_finish.to_string(),
                row.total_float.to_string(),
                row.free_float.to_string(),
                if row.is_critical { "yes" } else { "" }.to_string(),
            ]
        })
        .collect();
    print!(
        "{}",
        render_table(&["id", "es", "ef", "ls", "lf", "tf", "ff", "critical"], &rows)
    );
}

/// Cascade from `task_id` and apply the result to `tasks`.
fn cascade_and_apply(tasks: &mut Vec<Task>, task_id: &str) {
    let changes = cascade_changes(task_id, tasks);
    if changes.is_empty() {
        println!("No successor dates changed.");
        return;
    }
    for change in &changes {
        println!(
            "  {}: {} -> {}",
            change.task_id, change.previous, change.updated
        );
    }
    let updates: HashMap<_, _> = changes
        .into_iter()
        .map(|change| (change.task_id, change.updated))
        .collect();
    *tasks = apply_date_updates(tasks, &updates);
    println!("Updated {} task(s).", updates.len());
}

fn load_config() -> EngineConfig {
    match EngineConfig::default().with_env_overrides() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Ignoring environment overrides: {}", e);
            EngineConfig::default()
        }
    }
}

fn main() {
    init_logging(Some("warn"));
    let mut config = load_config();
    let mut tasks: Vec<Task> = Vec::new();

    println!("Schedule Engine (CLI) - type 'help' for commands\n");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "show" => print!("{}", render_tasks(&tasks)),
            "load" => {
                let fmt = parts.next();
                let path = parts.next();
                let loaded = match (fmt, path) {
                    (Some("json"), Some(path)) => load_tasks_from_json(path, &config),
                    (Some("csv"), Some(path)) => load_tasks_from_csv(path, &config),
                    _ => {
                        println!("Usage: load <json|csv> <path>");
                        continue;
                    }
                };
                match loaded {
                    Ok(loaded) => {
                        tasks = loaded;
                        println!("Loaded {} task(s).", tasks.len());
                        print!("{}", render_tasks(&tasks));
                    }
                    Err(e) => println!("Error loading tasks: {}", e),
                }
            }
            "save" => match parts.next() {
                Some(path) => match save_tasks_to_json(&tasks, path) {
                    Ok(_) => println!("Tasks saved to {}.", path),
                    Err(e) => println!("Error saving tasks: {}", e),
                },
                None => println!("Usage: save <path>"),
            },
            "critical" => print_critical(&tasks),
            "cascade" => match parts.next() {
                Some(id) if tasks.iter().any(|task| task.id == id) => {
                    cascade_and_apply(&mut tasks, id)
                }
                Some(id) => println!("Task {} not found.", id),
                None => println!("Usage: cascade <id>"),
            },
            "move" => {
                let id = parts.next();
                let start_s = parts.next();
                let end_s = parts.next();
                match (id, start_s, end_s) {
                    (Some(id), Some(start_s), Some(end_s)) => {
                        let (start, end) =
                            match (calendar::parse_date(start_s), calendar::parse_date(end_s)) {
                                (Ok(start), Ok(end)) if start <= end => (start, end),
                                (Ok(_), Ok(_)) => {
                                    println!("Start date must not be after end date");
                                    continue;
                                }
                                (Err(e), _) | (_, Err(e)) => {
                                    println!("Invalid date: {}", e);
                                    continue;
                                }
                            };
                        let Some(task) = tasks.iter_mut().find(|task| task.id == id) else {
                            println!("Task {} not found.", id);
                            continue;
                        };
                        task.start_date = start;
                        task.end_date = end;
                        task.duration_days = calendar::duration_between(start, end);
                        println!("Moved {} to {}..{}.", id, start, end);
                        cascade_and_apply(&mut tasks, id);
                    }
                    _ => println!("Usage: move <id> <YYYY-MM-DD> <YYYY-MM-DD>"),
                }
            }
            "link" => {
                let pred = parts.next();
                let succ = parts.next();
                let (Some(pred), Some(succ)) = (pred, succ) else {
                    println!("Usage: link <pred> <succ> [FS|SS|FF|SF] [lag]");
                    continue;
                };
                let code = parts.next().unwrap_or("");
                let dependency_type = match config.parse_dependency_type(code) {
                    Ok(v) => v,
                    Err(e) => {
                        println!("Error: {}", e);
                        continue;
                    }
                };
                let lag_days: i64 = match parts.next().map(str::parse::<i64>).transpose() {
                    Ok(v) => v.unwrap_or(0),
                    Err(_) => {
                        println!("Invalid lag");
                        continue;
                    }
                };
                if let Err(e) = ensure_dependency_no_cycle(pred, succ, &tasks) {
                    println!("Error: {}", e);
                    continue;
                }
                if let Some(task) = tasks.iter_mut().find(|task| task.id == succ) {
                    task.dependencies
                        .push(Dependency::new(pred, dependency_type, lag_days));
                }
                println!("Linked {} -> {} ({} {:+}).", pred, succ, dependency_type, lag_days);
                cascade_and_apply(&mut tasks, pred);
            }
            "validate" => match (parts.next(), parts.next()) {
                (Some(pred), Some(succ)) => {
                    if validate_dependency_no_cycle(pred, succ, &tasks) {
                        println!("Dependency {} -> {} is valid.", pred, succ);
                    } else {
                        println!("Dependency {} -> {} would create a cycle.", pred, succ);
                    }
                }
                _ => println!("Usage: validate <pred> <succ>"),
            },
            "conflicts" => {
                let employee = parts.next();
                let start_s = parts.next();
                let end_s = parts.next();
                let exclude = parts.next();
                match (employee, start_s, end_s) {
                    (Some(employee), Some(start_s), Some(end_s)) => {
                        let (start, end) =
                            match (calendar::parse_date(start_s), calendar::parse_date(end_s)) {
                                (Ok(start), Ok(end)) => (start, end),
                                (Err(e), _) | (_, Err(e)) => {
                                    println!("Invalid date: {}", e);
                                    continue;
                                }
                            };
                        let conflicts =
                            detect_employee_conflicts(employee, start, end, &tasks, exclude);
                        if conflicts.is_empty() {
                            println!("No conflicts for {}.", employee);
                            continue;
                        }
                        let rows: Vec<Vec<String>> = conflicts
                            .into_iter()
                            .map(|c| {
                                vec![
                                    c.task_id,
                                    c.task_name,
                                    c.start_date.to_string(),
                                    c.end_date.to_string(),
                                    c.overlap_days.to_string(),
                                ]
                            })
                            .collect();
                        print!(
                            "{}",
                            render_table(&["id", "name", "start", "end", "overlap"], &rows)
                        );
                    }
                    _ => println!("Usage: conflicts <employee> <start> <end> [exclude_id]"),
                }
            }
            "conflicts-all" => match parts.next() {
                Some(employee) => {
                    let assigned = tasks
                        .iter()
                        .filter(|task| task.is_assigned_to(employee))
                        .count();
                    if assigned > config.max_conflict_scan_tasks {
                        println!(
                            "{} has {} tasks; limit is {}.",
                            employee, assigned, config.max_conflict_scan_tasks
                        );
                        continue;
                    }
                    let entries: Vec<ProjectTask> = tasks
                        .iter()
                        .cloned()
                        .map(|task| ProjectTask::new(LOCAL_PROJECT, LOCAL_PROJECT, task))
                        .collect();
                    let pairs = get_all_employee_conflicts(employee, &entries);
                    if pairs.is_empty() {
                        println!("No conflicts for {}.", employee);
                        continue;
                    }
                    let rows: Vec<Vec<String>> = pairs
                        .into_iter()
                        .map(|pair| {
                            vec![
                                pair.first.task_id,
                                pair.second.task_id,
                                pair.overlap_days.to_string(),
                            ]
                        })
                        .collect();
                    print!("{}", render_table(&["first", "second", "overlap"], &rows));
                }
                None => println!("Usage: conflicts-all <employee>"),
            },
            "export" => {
                let fmt = parts.next();
                let path = parts.next();
                let result = calculate_critical_path_detailed(&tasks);
                let saved = match (fmt, path) {
                    (Some("json"), Some(path)) => save_schedule_to_json(&result, &tasks, path),
                    (Some("csv"), Some(path)) => save_schedule_to_csv(&result, &tasks, path),
                    _ => {
                        println!("Usage: export <json|csv> <path>");
                        continue;
                    }
                };
                match saved {
                    Ok(_) => println!("Schedule exported to {}.", path.unwrap_or_default()),
                    Err(e) => println!("Error exporting schedule: {}", e),
                }
            }
            "config" => match parts.next() {
                Some("show") | None => print_config(&config),
                Some("load") => match parts.next() {
                    Some(path) => match EngineConfig::from_json_file(path) {
                        Ok(loaded) => {
                            config = loaded;
                            println!("Config loaded from {}.", path);
                            print_config(&config);
                        }
                        Err(e) => println!("Error loading config: {}", e),
                    },
                    None => println!("Usage: config load <json_path>"),
                },
                Some(other) => {
                    println!("Unknown config command '{}'.", other);
                    println!("Usage: config show|load <json_path>");
                }
            },
            other => {
                println!("Unknown command '{}'. Type 'help'.", other);
            }
        }
    }
}

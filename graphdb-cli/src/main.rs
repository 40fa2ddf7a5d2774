//! Interactive shell for the embedded graph database. Grounded on
//! `ADBMS/kk.py`'s `run_cli`: the command surface, argument validation, and
//! error messages all mirror it — `shlex` replaces `shlex.split`, `rustyline`
//! replaces the bare `input()` loop, and `tabled` replaces `tabulate`.

use clap::Parser;
use colored::Colorize;
use graphdb::config::Config;
use graphdb::engine::GraphEngine;
use graphdb::value::Value;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::collections::HashMap;
use tabled::{Table, Tabled};
use uuid::Uuid;

#[derive(Parser)]
#[clap(version = "0.1.0", author = "GraphDB Contributors")]
struct Cli {
    #[clap(short, long, default_value = "config.toml")]
    config: String,
}

const NAME_PATTERN_HELP: &str = "must contain only letters, numbers, underscores, or hyphens";

const USAGE: &str = "Commands: create_db <name>, delete_db <name>, rename_db <old> <new>, list_dbs, use_db <name>, \
backup_db <name> <file>, restore_db <name> <file>, export_db <name> <file>, import_db <name> <file> [merge], \
add [key=value ...], connect <id1> <id2> [label=<label> weight=<weight>], \
disconnect <id1> <id2>, show <id>, update <id> [key=value ...], delete <id>, find <name>, \
query WHERE <condition> [CAST] [CASE_SENSITIVE] (supports =, >, <, >=, <=, !=, IN, CONTAINS, REGEX, AND, OR, edge.<property>), \
create_index <attribute>, drop_index <attribute>, list_indexes, \
list, path <id1> <id2>, begin, commit, rollback, stop, quit";

fn main() {
    let cli = Cli::parse();
    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(_) => Config::default(),
    };
    if let Err(e) = graphdb::utils::logging::init(&config) {
        eprintln!("{}", format!("failed to initialize logging: {e}").red());
    }

    let mut engine = match GraphEngine::open(&config) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("{}", format!("Error: {e}").red());
            std::process::exit(1);
        }
    };

    println!("Welcome to the Graph Database CLI!");
    println!("{USAGE}");

    let mut rl = DefaultEditor::new().expect("failed to start line editor");
    loop {
        match rl.readline("Enter command: ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    println!("{}", "Error: No command entered.".red());
                    continue;
                }
                let _ = rl.add_history_entry(line);
                if !dispatch(&mut engine, line) {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}", format!("readline error: {e}").red());
                break;
            }
        }
    }

    graphdb::utils::logging::shutdown();
}

/// Parses and runs one command line. Returns `false` when the CLI should
/// exit (the `quit` command).
fn dispatch(engine: &mut GraphEngine, line: &str) -> bool {
    let parts = match shlex::split(line) {
        Some(parts) if !parts.is_empty() => parts,
        Some(_) => {
            println!("{}", "Error: No command entered.".red());
            return true;
        }
        None => {
            println!("{}", "Error: Invalid command syntax".red());
            return true;
        }
    };
    let command = parts[0].to_lowercase();
    let args = &parts[1..];

    let result = run_command(engine, &command, args);
    match result {
        Ok(ControlFlow::Continue) => true,
        Ok(ControlFlow::Quit) => {
            println!("Exiting CLI...");
            false
        }
        Err(e) => {
            println!("{}", format!("Error: {e}").red());
            true
        }
    }
}

enum ControlFlow {
    Continue,
    Quit,
}

fn run_command(engine: &mut GraphEngine, command: &str, args: &[String]) -> Result<ControlFlow, String> {
    match command {
        "quit" => return Ok(ControlFlow::Quit),
        "create_db" => {
            let name = one_arg(args, "create_db requires exactly one database name")?;
            validate_name(name)?;
            engine.create_database(name).map_err(|e| e.to_string())?;
            println!("Created database '{name}'");
        }
        "delete_db" => {
            let name = one_arg(args, "delete_db requires exactly one database name")?;
            validate_name(name)?;
            engine.delete_database(name).map_err(|e| e.to_string())?;
            println!("Deleted database '{name}'");
        }
        "rename_db" => {
            let (old, new) = two_args(args, "rename_db requires old and new database names")?;
            validate_name(old)?;
            validate_name(new)?;
            engine.rename_database(old, new).map_err(|e| e.to_string())?;
            println!("Renamed database '{old}' to '{new}'");
        }
        "list_dbs" => {
            no_args(args, "list_dbs takes no arguments")?;
            let dbs = engine.list_databases();
            if dbs.is_empty() {
                println!("No databases exist");
            } else {
                println!("Databases: {}", dbs.join(", "));
            }
        }
        "use_db" => {
            let name = one_arg(args, "use_db requires exactly one database name")?;
            validate_name(name)?;
            engine.use_database(name).map_err(|e| e.to_string())?;
            println!("Switched to database '{name}'");
        }
        "backup_db" => {
            let (name, file) = two_args(args, "backup_db requires a database name and backup file")?;
            validate_name(name)?;
            validate_json_extension(file, "Backup file")?;
            engine.backup_database(name, file).map_err(|e| e.to_string())?;
        }
        "restore_db" => {
            let (name, file) = two_args(args, "restore_db requires a database name and backup file")?;
            validate_name(name)?;
            validate_json_extension(file, "Backup file")?;
            engine.restore_database(name, file).map_err(|e| e.to_string())?;
        }
        "export_db" => {
            let (name, file) = two_args(args, "export_db requires a database name and export file")?;
            validate_name(name)?;
            validate_json_extension(file, "Export file")?;
            engine.export_database(name, file).map_err(|e| e.to_string())?;
        }
        "import_db" => {
            if args.len() < 2 {
                return Err("import_db requires a database name and import file".to_string());
            }
            let name = &args[0];
            let file = &args[1];
            let merge = args.get(2).is_some_and(|a| a.eq_ignore_ascii_case("merge"));
            validate_name(name)?;
            validate_json_extension(file, "Import file")?;
            engine.import_database(name, file, merge).map_err(|e| e.to_string())?;
        }
        _ if engine.current_database_name().is_none() => {
            println!("Error: No database selected. Use 'use_db <name>' to select a database first.");
        }
        "create_index" => {
            let attr = one_arg(args, "create_index requires exactly one attribute name")?;
            validate_name(attr)?;
            engine.create_index(attr).map_err(|e| e.to_string())?;
            println!("Created index on attribute '{attr}'");
        }
        "drop_index" => {
            let attr = one_arg(args, "drop_index requires exactly one attribute name")?;
            validate_name(attr)?;
            engine.drop_index(attr).map_err(|e| e.to_string())?;
            println!("Dropped index on attribute '{attr}'");
        }
        "list_indexes" => {
            no_args(args, "list_indexes takes no arguments")?;
            let indexes = engine.list_indexes().map_err(|e| e.to_string())?;
            if indexes.is_empty() {
                println!("No indexes exist");
            } else {
                println!("Indexes: {}", indexes.join(", "));
            }
        }
        "add" => {
            if args.is_empty() {
                return Err("add requires at least one key=value pair".to_string());
            }
            let value = parse_attrs(args)?;
            let id = engine.add_node(value).map_err(|e| e.to_string())?;
            println!("Added node with ID: {id}");
        }
        "connect" => {
            if args.len() < 2 {
                return Err("connect requires at least two node IDs".to_string());
            }
            let a = parse_uuid(&args[0])?;
            let b = parse_uuid(&args[1])?;
            let (label, weight) = parse_edge_props(&args[2..])?;
            engine.add_edge(a, b, label, weight).map_err(|e| e.to_string())?;
            println!("Connected {}... and {}...", short(&args[0]), short(&args[1]));
        }
        "disconnect" => {
            let (a, b) = two_args(args, "disconnect requires exactly two node IDs")?;
            let a_id = parse_uuid(a)?;
            let b_id = parse_uuid(b)?;
            engine.delete_edge(a_id, b_id).map_err(|e| e.to_string())?;
            println!("Disconnected {}... and {}...", short(a), short(b));
        }
        "show" => {
            let id_str = one_arg(args, "show requires exactly one node ID")?;
            let id = parse_uuid(id_str)?;
            let value = engine.get_value(id).map_err(|e| e.to_string())?;
            if value.is_empty() {
                println!("Node {}... not found", short(id_str));
            } else {
                println!("Node {id_str}: {}", format_attrs(&value));
            }
        }
        "update" => {
            if args.len() < 2 {
                return Err("update requires a node ID and at least one key=value pair".to_string());
            }
            let id = parse_uuid(&args[0])?;
            let value = parse_attrs(&args[1..])?;
            engine.update_node(id, value).map_err(|e| e.to_string())?;
            println!("Updated node {}...", short(&args[0]));
        }
        "delete" => {
            let id_str = one_arg(args, "delete requires exactly one node ID")?;
            let id = parse_uuid(id_str)?;
            engine.delete_node(id).map_err(|e| e.to_string())?;
            println!("Deleted node {}...", short(id_str));
        }
        "find" => {
            let name = one_arg(args, "find requires exactly one name")?;
            if name.is_empty() {
                return Err("Name cannot be empty".to_string());
            }
            let matches = engine.find_by_name(name).map_err(|e| e.to_string())?;
            if matches.is_empty() {
                println!("No nodes found with name '{name}'");
            } else {
                println!("Found nodes with name '{name}':");
                for id in matches {
                    let value = engine.get_value(id).map_err(|e| e.to_string())?;
                    println!("ID {id}: {}", format_attrs(&value));
                }
            }
        }
        "query" => {
            if args.is_empty() {
                return Err("query requires a WHERE clause".to_string());
            }
            let (query_str, cast_non_strings, case_sensitive) = strip_query_flags(args);
            let results = engine
                .query(&query_str, cast_non_strings, case_sensitive)
                .map_err(|e| e.to_string())?;
            if results.is_empty() {
                println!("No nodes match query '{query_str}'");
            } else {
                let suffix = if case_sensitive { " (case-sensitive)" } else { "" };
                println!("Query results for '{query_str}'{suffix}:");
                for (id, value) in results {
                    println!("ID {id}: {}", format_attrs(&value));
                }
            }
        }
        "list" => {
            no_args(args, "list takes no arguments")?;
            let nodes = engine.list_all_nodes().map_err(|e| e.to_string())?;
            if nodes.is_empty() {
                println!("Database is empty");
            } else {
                print_table(engine, &nodes);
            }
        }
        "path" => {
            let (a, b) = two_args(args, "path requires exactly two node IDs")?;
            let a_id = parse_uuid(a)?;
            let b_id = parse_uuid(b)?;
            match engine.find_path(a_id, b_id).map_err(|e| e.to_string())? {
                Some(path) => {
                    let labels: Vec<String> = path
                        .iter()
                        .map(|id| {
                            engine
                                .get_value(*id)
                                .ok()
                                .and_then(|v| v.get("name").map(|v| v.stringify()))
                                .unwrap_or_else(|| "N/A".to_string())
                        })
                        .collect();
                    println!("Path from {}... to {}...: {}", short(a), short(b), labels.join(" -> "));
                }
                None => println!("No path found between {}... and {}...", short(a), short(b)),
            }
        }
        "begin" => {
            no_args(args, "begin takes no arguments")?;
            engine.begin().map_err(|e| e.to_string())?;
            println!("Transaction started.");
        }
        "commit" => {
            no_args(args, "commit takes no arguments")?;
            engine.commit().map_err(|e| e.to_string())?;
            println!("Transaction committed. Last change is now permanent.");
        }
        "rollback" => {
            no_args(args, "rollback takes no arguments")?;
            engine.rollback().map_err(|e| e.to_string())?;
            println!("Rollback completed.");
        }
        "stop" => {
            no_args(args, "stop takes no arguments")?;
            engine.stop().map_err(|e| e.to_string())?;
            println!("Transaction stopped.");
        }
        _ => {
            println!("Invalid command. Use: {USAGE}");
        }
    }
    Ok(ControlFlow::Continue)
}

fn one_arg<'a>(args: &'a [String], err: &str) -> Result<&'a str, String> {
    if args.len() != 1 {
        return Err(err.to_string());
    }
    Ok(&args[0])
}

fn two_args<'a>(args: &'a [String], err: &str) -> Result<(&'a str, &'a str), String> {
    if args.len() != 2 {
        return Err(err.to_string());
    }
    Ok((&args[0], &args[1]))
}

fn no_args(args: &[String], err: &str) -> Result<(), String> {
    if !args.is_empty() {
        return Err(err.to_string());
    }
    Ok(())
}

fn validate_name(name: &str) -> Result<(), String> {
    let ok = !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if ok {
        Ok(())
    } else {
        Err(format!("Name {NAME_PATTERN_HELP}"))
    }
}

fn validate_json_extension(file: &str, label: &str) -> Result<(), String> {
    if file.ends_with(".json") {
        Ok(())
    } else {
        Err(format!("{label} must have a .json extension"))
    }
}

fn parse_uuid(s: &str) -> Result<Uuid, String> {
    Uuid::parse_str(s).map_err(|_| "Node ID must be a valid UUID".to_string())
}

fn short(id: &str) -> &str {
    &id[..id.len().min(8)]
}

fn parse_attrs(args: &[String]) -> Result<HashMap<String, Value>, String> {
    let mut value = HashMap::new();
    for arg in args {
        let Some((key, val)) = arg.split_once('=') else {
            return Err(format!("Invalid argument '{arg}'. Must be key=value"));
        };
        if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
            return Err(format!("Invalid argument '{arg}'. Must be key=value"));
        }
        if let Some(existing) = value.get(key) {
            println!("Warning: Key '{key}' already set to '{existing:?}'. Overwriting with '{val}'.");
        }
        value.insert(key.to_string(), Value::parse_token(val));
    }
    Ok(value)
}

fn parse_edge_props(args: &[String]) -> Result<(Option<String>, Option<f64>), String> {
    let mut label = None;
    let mut weight = None;
    for arg in args {
        if let Some(v) = arg.strip_prefix("label=") {
            if v.is_empty() {
                return Err("Label cannot be empty".to_string());
            }
            label = Some(v.to_string());
        } else if let Some(v) = arg.strip_prefix("weight=") {
            weight = Some(v.parse::<f64>().map_err(|_| "Weight must be a number".to_string())?);
        } else {
            return Err("Connect arguments must be label=<label> or weight=<weight>".to_string());
        }
    }
    Ok((label, weight))
}

/// Strips a trailing `CAST`, `CASE_SENSITIVE`, or `CAST CASE_SENSITIVE`
/// suffix from the raw argument list, the way `kk.py`'s `query` branch does.
fn strip_query_flags(args: &[String]) -> (String, bool, bool) {
    let mut cast_non_strings = false;
    let mut case_sensitive = false;
    let mut words = args.to_vec();

    if words.len() >= 2
        && words[words.len() - 2].eq_ignore_ascii_case("cast")
        && words[words.len() - 1].eq_ignore_ascii_case("case_sensitive")
    {
        cast_non_strings = true;
        case_sensitive = true;
        words.truncate(words.len() - 2);
    } else if let Some(last) = words.last() {
        if last.eq_ignore_ascii_case("cast") {
            cast_non_strings = true;
            words.pop();
        } else if last.eq_ignore_ascii_case("case_sensitive") {
            case_sensitive = true;
            words.pop();
        }
    }
    (words.join(" "), cast_non_strings, case_sensitive)
}

fn format_attrs(value: &HashMap<String, Value>) -> String {
    let mut entries: Vec<String> = value.iter().map(|(k, v)| format!("{k}: {v}")).collect();
    entries.sort();
    format!("{{{}}}", entries.join(", "))
}

#[derive(Tabled)]
struct NodeRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Attributes")]
    attributes: String,
    #[tabled(rename = "Edges")]
    edges: String,
}

fn print_table(engine: &GraphEngine, nodes: &HashMap<Uuid, HashMap<String, Value>>) {
    println!("\nAll Nodes in Database:");
    let mut ids: Vec<&Uuid> = nodes.keys().collect();
    ids.sort();
    let rows: Vec<NodeRow> = ids
        .into_iter()
        .map(|id| {
            let attrs = nodes.get(id).map(format_attrs).unwrap_or_else(|| "None".to_string());
            let neighbors = engine.get_edges(*id).unwrap_or_default();
            let edges = if neighbors.is_empty() {
                "None".to_string()
            } else {
                let mut parts: Vec<String> = neighbors
                    .iter()
                    .map(|(neighbor, props)| {
                        let label = props.label.as_deref().unwrap_or("None");
                        let weight =
                            props.weight.map(|w| w.to_string()).unwrap_or_else(|| "None".to_string());
                        format!("{}... ({label} {weight})", short(&neighbor.to_string()))
                    })
                    .collect();
                parts.sort();
                parts.join(", ")
            };
            NodeRow { id: format!("{}...", short(&id.to_string())), attributes: attrs, edges }
        })
        .collect();
    println!("{}", Table::new(rows));
}

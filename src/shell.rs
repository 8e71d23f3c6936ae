//! Shell commands
//!
//! Parses one line of interactive input into a command and runs it against a
//! registry. Output comes back as lines of text; reading input and printing
//! is left to the caller.

use crate::error::RegistryError;
use crate::layout::Layout;
use crate::record::{Record, RecordOrder, SortKey};
use crate::registry::Registry;
use crate::sort::Algorithm;
use crate::validate::{validate_id, validate_name};

/// A parsed shell command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add { id: i64, name: String, attributes: Vec<String> },
    Remove { id: i64 },
    Find { id: i64 },
    Update { id: i64, name: Option<String>, attributes: Vec<String> },
    List,
    ListSorted { order: RecordOrder, algorithm: Option<Algorithm> },
    Sort { order: RecordOrder, algorithm: Option<Algorithm> },
    Search { key: SortKey },
    Save,
    Help,
    Quit,
}

/// What the caller should do after a command
#[derive(Debug, PartialEq, Eq)]
pub enum ShellResult {
    Output(Vec<String>),
    Save,
    Quit,
}

pub const HELP: &[&str] = &[
    "add <id> <name> [attributes...]   add a record (alias: itemadd)",
    "remove <id>                       remove a record",
    "find <id>                         look up a record by id",
    "update <id> <name|-> [attrs...]   change name and/or attributes",
    "list                              list records, newest first (alias: itemslist)",
    "list sorted [id|name] [algorithm] list a sorted copy",
    "sort [id|name] [algorithm]        build the sorted snapshot used by search",
    "search id <id> | search name <n>  binary search the sorted snapshot",
    "save                              write records to the data file",
    "help                              show this help",
    "exit                              save and quit",
    "linked kinds (appointments, links, enrollments) are edited with the",
    "  clinic, network and courses commands",
];

/// Split a line on whitespace, keeping double-quoted runs together
pub fn tokenize(line: &str) -> Result<Vec<String>, String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut pending = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                pending = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if pending {
                    tokens.push(std::mem::take(&mut current));
                    pending = false;
                }
            }
            c => {
                current.push(c);
                pending = true;
            }
        }
    }
    if in_quotes {
        return Err("unterminated quote".to_string());
    }
    if pending {
        tokens.push(current);
    }
    Ok(tokens)
}

fn parse_id(token: Option<&String>) -> Result<i64, String> {
    let token = token.ok_or("missing id")?;
    token
        .parse()
        .map_err(|_| format!("'{}' is not a valid id", token))
}

fn parse_sort_args(args: &[String]) -> Result<(RecordOrder, Option<Algorithm>), String> {
    let order = args
        .first()
        .map(|s| s.parse::<RecordOrder>())
        .transpose()?
        .unwrap_or_default();
    let algorithm = args.get(1).map(|s| s.parse::<Algorithm>()).transpose()?;
    Ok((order, algorithm))
}

/// Parse one line of input. Command names are case-insensitive.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let tokens = tokenize(line)?;
    let (head, args) = tokens.split_first().ok_or("empty command")?;

    match head.to_ascii_lowercase().as_str() {
        "add" | "itemadd" => {
            let id = parse_id(args.first())?;
            let name = args.get(1).ok_or("missing name")?.clone();
            Ok(Command::Add {
                id,
                name,
                attributes: args[2..].to_vec(),
            })
        }
        "remove" | "delete" => Ok(Command::Remove { id: parse_id(args.first())? }),
        "find" => Ok(Command::Find { id: parse_id(args.first())? }),
        "update" => {
            let id = parse_id(args.first())?;
            let name = args
                .get(1)
                .filter(|n| n.as_str() != "-")
                .cloned();
            Ok(Command::Update {
                id,
                name,
                attributes: args.get(2..).map(<[String]>::to_vec).unwrap_or_default(),
            })
        }
        "list" | "itemslist" => match args.first().map(String::as_str) {
            None => Ok(Command::List),
            Some("sorted") => {
                let (order, algorithm) = parse_sort_args(&args[1..])?;
                Ok(Command::ListSorted { order, algorithm })
            }
            Some(other) => Err(format!("unknown list option '{}'", other)),
        },
        "sort" => {
            let (order, algorithm) = parse_sort_args(args)?;
            Ok(Command::Sort { order, algorithm })
        }
        "search" => {
            let kind = args.first().ok_or("search needs 'id' or 'name'")?;
            let value = args.get(1).ok_or("missing search key")?;
            let key = match kind.parse::<RecordOrder>()? {
                RecordOrder::Id => SortKey::Id(parse_id(Some(value))?),
                RecordOrder::Name => SortKey::Name(value.clone()),
            };
            Ok(Command::Search { key })
        }
        "save" => Ok(Command::Save),
        "help" => Ok(Command::Help),
        "exit" | "quit" => Ok(Command::Quit),
        other => Err(format!("unknown command '{}'", other)),
    }
}

fn render(records: &[Record]) -> Vec<String> {
    if records.is_empty() {
        return vec!["No records.".to_string()];
    }
    records.iter().map(ToString::to_string).collect()
}

/// Refuse edits that would bypass the reference checks of linked kinds:
/// adding or updating a record that points elsewhere, or removing one that
/// others point at.
fn check_linked(layout: Layout, command: &Command) -> Result<(), RegistryError> {
    let refused = match command {
        Command::Add { .. } | Command::Update { .. } => layout.has_references(),
        Command::Remove { .. } => layout.is_referenced(),
        _ => false,
    };
    match layout.owner() {
        Some(owner) if refused => Err(RegistryError::PreconditionViolated(format!(
            "{} records are linked to other files; use the '{}' command",
            layout, owner
        ))),
        _ => Ok(()),
    }
}

/// Run a command against a registry
pub fn execute(registry: &mut Registry, command: Command) -> Result<ShellResult, RegistryError> {
    check_linked(registry.layout(), &command)?;
    let lines = match command {
        Command::Add { id, name, attributes } => {
            let raw: Vec<&str> = attributes.iter().map(String::as_str).collect();
            let fields = registry.layout().parse_fields(&raw)?;
            let record = Record::with_attributes(validate_id(id)?, validate_name(&name)?, fields);
            let line = format!("Added {}", record);
            registry.add(record)?;
            vec![line]
        }
        Command::Remove { id } => {
            let removed = registry.remove(id)?;
            vec![format!("Removed {}", removed)]
        }
        Command::Find { id } => vec![registry.find_exact(id)?.to_string()],
        Command::Update { id, name, attributes } => {
            let fields = if attributes.is_empty() {
                None
            } else {
                let raw: Vec<&str> = attributes.iter().map(String::as_str).collect();
                Some(registry.layout().parse_fields(&raw)?)
            };
            let name = name.map(|n| validate_name(&n)).transpose()?;
            vec![format!("Updated {}", registry.update(id, name, fields)?)]
        }
        Command::List => render(&registry.records()),
        Command::ListSorted { order, algorithm } => {
            let algorithm = algorithm.unwrap_or(registry.algorithm());
            render(&registry.list_sorted(order, algorithm))
        }
        Command::Sort { order, algorithm } => {
            let algorithm = algorithm.unwrap_or(registry.algorithm());
            let snapshot = registry.build_snapshot_with(order, algorithm);
            vec![format!(
                "Sorted {} records by {:?} with {} sort",
                snapshot.len(),
                order,
                algorithm
            )]
        }
        Command::Search { key } => vec![registry.find_sorted_key(&key)?.to_string()],
        Command::Save => return Ok(ShellResult::Save),
        Command::Help => HELP.iter().map(|s| s.to_string()).collect(),
        Command::Quit => return Ok(ShellResult::Quit),
    };
    Ok(ShellResult::Output(lines))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(registry: &mut Registry, line: &str) -> Result<Vec<String>, RegistryError> {
        match execute(registry, parse_command(line).unwrap())? {
            ShellResult::Output(lines) => Ok(lines),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_tokenize_quotes() {
        assert_eq!(
            tokenize("add 3 \"King Faisal\"  Kigali 10").unwrap(),
            vec!["add", "3", "King Faisal", "Kigali", "10"]
        );
        assert_eq!(tokenize("find \"\"").unwrap(), vec!["find", ""]);
        assert!(tokenize("add \"open").is_err());
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command("FIND 4").unwrap(), Command::Find { id: 4 });
        assert_eq!(
            parse_command("list sorted name quick").unwrap(),
            Command::ListSorted {
                order: RecordOrder::Name,
                algorithm: Some(Algorithm::Quick)
            }
        );
        assert_eq!(
            parse_command("update 2 - 7 01-01-2024").unwrap(),
            Command::Update {
                id: 2,
                name: None,
                attributes: vec!["7".into(), "01-01-2024".into()]
            }
        );
        assert!(parse_command("find x").is_err());
        assert!(parse_command("frobnicate").is_err());
        assert!(parse_command("   ").is_err());
    }

    #[test]
    fn test_item_session() {
        let mut registry = Registry::new(Layout::Item);
        run(&mut registry, "itemadd 2 Laptop 5 01-05-2025").unwrap();
        run(&mut registry, "itemadd 1 Chair 12 02-05-2025").unwrap();

        let err = run(&mut registry, "itemadd 1 Desk 1 02-05-2025").unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateKey { id: 1 }));

        let err = run(&mut registry, "itemadd 3 Desk 1 31-02-2025").unwrap_err();
        assert!(matches!(err, RegistryError::InvalidDate(_)));

        let sorted = run(&mut registry, "list sorted name").unwrap();
        assert!(sorted[0].starts_with("1: Chair"));

        let err = run(&mut registry, "search name Laptop").unwrap_err();
        assert!(matches!(err, RegistryError::PreconditionViolated(_)));

        run(&mut registry, "sort name insertion").unwrap();
        let found = run(&mut registry, "search name Laptop").unwrap();
        assert!(found[0].starts_with("2: Laptop"));
    }

    #[test]
    fn test_linked_kinds_refuse_unchecked_edits() {
        let mut appointments = Registry::new(Layout::Appointment);
        let err = run(&mut appointments, "add 100 appt 999 888 01-01-2025").unwrap_err();
        assert!(matches!(err, RegistryError::PreconditionViolated(ref m) if m.contains("clinic")));
        assert!(appointments.is_empty());

        let mut hospitals = Registry::new(Layout::Hospital);
        run(&mut hospitals, "add 1 CHUK Kigali 250").unwrap();
        let err = run(&mut hospitals, "remove 1").unwrap_err();
        assert!(matches!(err, RegistryError::PreconditionViolated(ref m) if m.contains("network")));
        assert_eq!(run(&mut hospitals, "find 1").unwrap(), vec!["1: CHUK, Kigali, 250"]);
    }

    #[test]
    fn test_save_and_quit() {
        let mut registry = Registry::default();
        assert_eq!(execute(&mut registry, Command::Save).unwrap(), ShellResult::Save);
        assert_eq!(execute(&mut registry, Command::Quit).unwrap(), ShellResult::Quit);
        assert_eq!(run(&mut registry, "list").unwrap(), vec!["No records."]);
    }
}

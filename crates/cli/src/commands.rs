//! Command decoding and execution.
//!
//! One command per line, integer arguments separated by whitespace:
//!
//! ```text
//! add <id>            create a node (the first one bootstraps the ring)
//! drop <id>           remove a node and relink its neighbours
//! join <from> <to>    link <from> into the ring through member <to>
//! fix <id>            refresh the whole finger table of <id>
//! stab <id>           run one stabilize round on <id>
//! list                print all ids in ascending order
//! show <id>           print successor, predecessor and fingers of <id>
//! lookup <from> <t>   route target <t> starting at <from>
//! ring                print the successor walk from the smallest id
//! end                 release every node and stop
//! ```

use chord_core::{Chord, NodeId, RingDirectory, RingNode, RingTopology};

/// A decoded command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Add(u64),
    Drop(u64),
    Join { from: u64, to: u64 },
    Fix(u64),
    Stab(u64),
    List,
    Show(u64),
    Lookup { from: u64, target: u64 },
    Ring,
    End,
}

/// Outcome of a command that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// Text to print.
    Output(String),
    /// Succeeded without anything to print.
    Silent,
    /// Stop reading commands.
    End,
}

/// Why a line could not be decoded or executed.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("{command} expects {expected} parameters not {actual}")]
    Syntax {
        command: String,
        expected: usize,
        actual: usize,
    },

    #[error("invalid integer {0}")]
    InvalidInteger(String),

    #[error("unknown command {0}")]
    UnknownCommand(String),

    #[error(transparent)]
    Ring(#[from] chord_core::Error),
}

impl Command {
    /// Decodes one line. Blank lines decode to `None`.
    pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
        let mut tokens = line.split_whitespace();
        let name = match tokens.next() {
            Some(name) => name,
            None => return Ok(None),
        };
        // trailing arguments after `end` are ignored
        if name == "end" {
            return Ok(Some(Command::End));
        }
        let args = tokens.map(parse_integer).collect::<Result<Vec<_>, _>>()?;

        let expected = match name {
            "add" | "drop" | "fix" | "stab" | "show" => 1,
            "join" | "lookup" => 2,
            "list" | "ring" => 0,
            _ => return Err(CommandError::UnknownCommand(name.to_string())),
        };
        if args.len() != expected {
            return Err(CommandError::Syntax {
                command: name.to_string(),
                expected,
                actual: args.len(),
            });
        }

        let command = match (name, args.as_slice()) {
            ("add", &[id]) => Command::Add(id),
            ("drop", &[id]) => Command::Drop(id),
            ("fix", &[id]) => Command::Fix(id),
            ("stab", &[id]) => Command::Stab(id),
            ("show", &[id]) => Command::Show(id),
            ("join", &[from, to]) => Command::Join { from, to },
            ("lookup", &[from, target]) => Command::Lookup { from, target },
            ("list", _) => Command::List,
            _ => Command::Ring,
        };
        Ok(Some(command))
    }

    /// Runs the command against the directory.
    pub fn execute(&self, directory: &mut RingDirectory) -> Result<CommandResult, CommandError> {
        let result = match *self {
            Command::Add(id) => {
                let id = directory.add(id)?;
                CommandResult::Output(format!("< Added node {id}"))
            }
            Command::Drop(id) => {
                directory.remove(id)?;
                CommandResult::Silent
            }
            Command::Join { from, to } => {
                let from = directory.resolve(from)?;
                let to = directory.resolve(to)?;
                directory.join(from, to)?;
                CommandResult::Silent
            }
            Command::Fix(id) => {
                let id = directory.resolve(id)?;
                directory.fix_fingers(id)?;
                CommandResult::Silent
            }
            Command::Stab(id) => {
                let id = directory.resolve(id)?;
                directory.stabilize(id)?;
                CommandResult::Silent
            }
            Command::List => {
                let ids = directory.list()?;
                CommandResult::Output(format!("Nodes: {}", join_ids(&ids, ", ")))
            }
            Command::Show(id) => CommandResult::Output(render_node(directory.show(id)?)),
            Command::Lookup { from, target } => {
                let from = directory.resolve(from)?;
                let target = directory.space().check(target)?;
                let route = directory.lookup(from, target)?;
                CommandResult::Output(format!(
                    "< Lookup {target} from {from}: node {} ({} hops)",
                    route.owner, route.hops
                ))
            }
            Command::Ring => CommandResult::Output(render_ring(directory)?),
            Command::End => CommandResult::End,
        };
        Ok(result)
    }
}

/// Arguments are plain unsigned decimals; signs and overflow are rejected.
fn parse_integer(token: &str) -> Result<u64, CommandError> {
    if !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CommandError::InvalidInteger(token.to_string()));
    }
    token
        .parse()
        .map_err(|_| CommandError::InvalidInteger(token.to_string()))
}

fn join_ids(ids: &[NodeId], separator: &str) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(separator)
}

fn render_pointer(pointer: Option<NodeId>) -> String {
    pointer.map_or_else(|| "None".to_string(), |id| id.to_string())
}

fn render_node(node: &RingNode) -> String {
    let fingers: Vec<NodeId> = node.finger().iter().collect();
    format!(
        "< Node {}: suc {}, pre {}: finger {}",
        node.id(),
        render_pointer(node.successor()),
        render_pointer(node.predecessor()),
        join_ids(&fingers, ",")
    )
}

fn render_ring(directory: &RingDirectory) -> Result<String, CommandError> {
    let ids = directory.list()?;
    let topology = RingTopology::new(directory);
    let walk = topology.successor_walk(ids[0])?;

    let mut path = join_ids(&walk.path, " -> ");
    if walk.closed {
        path.push_str(&format!(" -> {}", ids[0]));
    }
    let state = if topology.is_consistent() {
        "consistent"
    } else {
        "inconsistent"
    };
    Ok(format!("< Ring: {path} ({state})"))
}

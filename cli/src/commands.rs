/**
 * @file commands.rs
 * @date 19/10/2026
 * @brief Line commands of the interactive front end.
 */
use circuit_board::{BoxStore, CircuitError, DeviceKind, Direction, Workbench};
use thiserror::Error;

pub const HELP: &str = "\
create <type> <name> [pins] [outputs]   add a device, see devicetypes
connect <a> <b> [pin] [pin]             wire a to b, optionally picking the pins
disconnect <a> <b>                      remove the cables from a to b
delete <name>                           remove a device and its cables
show <input|output> <name> <pin>        print the value of a pin
switch <name> on|off                    flip a switch
power <name> on|off                     turn a power source on or off
junction <name> connectall <names...>   wire one junction output to each device
box <name> bindinput <target> <target pin> <box pin>
box <name> bindoutput <target> <target pin> <box pin>
box <name> save|load                    persist or restore a circuit box
list [type]                             list the devices
devicetypes                             list the device types
help                                    print this message
exit                                    leave";

const DEVICE_TYPES: [&str; 9] = [
    "switch",
    "powersource",
    "inverter",
    "andgate",
    "orgate",
    "nandgate",
    "norgate",
    "junction",
    "circuitbox",
];

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Unknown command {0}, type help for the list of commands")]
    UnknownCommand(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("Invalid device type {0}")]
    UnknownType(String),

    #[error("Expected a number, got {0}")]
    InvalidNumber(String),

    #[error("Expected on or off, got {0}")]
    InvalidState(String),

    #[error("Expected input or output, got {0}")]
    InvalidDirection(String),

    #[error(transparent)]
    Circuit(#[from] CircuitError),
}

pub type Result<T> = core::result::Result<T, CommandError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Create {
        name: String,
        kind: DeviceKind,
    },
    Connect {
        source: String,
        target: String,
    },
    ConnectToInput {
        source: String,
        target: String,
        input: usize,
    },
    ConnectPins {
        source: String,
        output: usize,
        target: String,
        input: usize,
    },
    Disconnect {
        source: String,
        target: String,
    },
    Delete(String),
    Show {
        direction: Direction,
        name: String,
        index: usize,
    },
    Switch {
        name: String,
        on: bool,
    },
    Power {
        name: String,
        on: bool,
    },
    ConnectAll {
        junction: String,
        targets: Vec<String>,
    },
    Bind {
        circuit_box: String,
        direction: Direction,
        target: String,
        target_pin: usize,
        box_pin: usize,
    },
    Save(String),
    Load(String),
    List(Option<String>),
    DeviceTypes,
    Help,
    Exit,
}

impl Command {
    /// Parse one input line, `None` for a blank one.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let words = line.split_whitespace().collect::<Vec<_>>();
        let Some(first) = words.first() else {
            return Ok(None);
        };

        let command = match (first.to_lowercase().as_str(), &words[1..]) {
            ("create", [kind, name, counts @ ..]) if counts.len() <= 2 => Command::Create {
                name: name.to_string(),
                kind: parse_kind(kind, name, counts)?,
            },
            ("create", _) => return Err(CommandError::Usage("create <type> <name> [pins] [outputs]")),

            ("connect", [source, target]) => Command::Connect {
                source: source.to_string(),
                target: target.to_string(),
            },
            ("connect", [source, target, input]) => Command::ConnectToInput {
                source: source.to_string(),
                target: target.to_string(),
                input: parse_number(input)?,
            },
            ("connect", [source, target, output, input]) => Command::ConnectPins {
                source: source.to_string(),
                output: parse_number(output)?,
                target: target.to_string(),
                input: parse_number(input)?,
            },
            ("connect", _) => return Err(CommandError::Usage("connect <a> <b> [pin] [pin]")),

            ("disconnect", [source, target]) => Command::Disconnect {
                source: source.to_string(),
                target: target.to_string(),
            },
            ("disconnect", _) => return Err(CommandError::Usage("disconnect <a> <b>")),

            ("delete", [name]) => Command::Delete(name.to_string()),
            ("delete", _) => return Err(CommandError::Usage("delete <name>")),

            ("show", [direction, name, index]) => Command::Show {
                direction: parse_direction(direction)?,
                name: name.to_string(),
                index: parse_number(index)?,
            },
            ("show", _) => return Err(CommandError::Usage("show <input|output> <name> <pin>")),

            ("switch", [name, state]) => Command::Switch {
                name: name.to_string(),
                on: parse_state(state)?,
            },
            ("switch", _) => return Err(CommandError::Usage("switch <name> on|off")),

            ("power", [name, state]) => Command::Power {
                name: name.to_string(),
                on: parse_state(state)?,
            },
            ("power", _) => return Err(CommandError::Usage("power <name> on|off")),

            ("junction", [junction, action, targets @ ..])
                if action.eq_ignore_ascii_case("connectall") && !targets.is_empty() =>
            {
                Command::ConnectAll {
                    junction: junction.to_string(),
                    targets: targets.iter().map(|t| t.to_string()).collect(),
                }
            }
            ("junction", _) => {
                return Err(CommandError::Usage("junction <name> connectall <names...>"))
            }

            ("box", [circuit_box, action, rest @ ..]) => {
                parse_box_action(circuit_box, &action.to_lowercase(), rest)?
            }
            ("box", _) => return Err(CommandError::Usage("box <name> <action> ...")),

            ("list", []) => Command::List(None),
            ("list", [kind]) => {
                let kind = kind.to_lowercase();
                if !DEVICE_TYPES.contains(&kind.as_str()) {
                    return Err(CommandError::UnknownType(kind));
                }
                Command::List(Some(kind))
            }
            ("list", _) => return Err(CommandError::Usage("list [type]")),

            ("devicetypes", []) => Command::DeviceTypes,
            ("help", []) => Command::Help,
            ("exit" | "quit", []) => Command::Exit,

            (other, _) => return Err(CommandError::UnknownCommand(other.to_string())),
        };

        Ok(Some(command))
    }
}

fn parse_box_action(circuit_box: &str, action: &str, rest: &[&str]) -> Result<Command> {
    let direction = match action {
        "save" | "load" if !rest.is_empty() => {
            return Err(CommandError::Usage("box <name> save|load"));
        }
        "save" => return Ok(Command::Save(circuit_box.to_string())),
        "load" => return Ok(Command::Load(circuit_box.to_string())),
        "bindinput" => Direction::Input,
        "bindoutput" => Direction::Output,
        _ => return Err(CommandError::Usage("box <name> bindinput|bindoutput|save|load ...")),
    };

    let [target, target_pin, box_pin] = rest else {
        return Err(CommandError::Usage(
            "box <name> bindinput|bindoutput <target> <target pin> <box pin>",
        ));
    };

    Ok(Command::Bind {
        circuit_box: circuit_box.to_string(),
        direction,
        target: target.to_string(),
        target_pin: parse_number(target_pin)?,
        box_pin: parse_number(box_pin)?,
    })
}

fn parse_kind(kind: &str, name: &str, counts: &[&str]) -> Result<DeviceKind> {
    let counts = counts
        .iter()
        .map(|count| parse_number(count))
        .collect::<Result<Vec<_>>>()?;

    let kind = kind.to_lowercase();
    let pins = |usage| counts.first().copied().ok_or(CommandError::Usage(usage));

    Ok(match kind.as_str() {
        "switch" => DeviceKind::switch(),
        "powersource" => DeviceKind::PowerSource,
        "inverter" => DeviceKind::Inverter,
        "andgate" => DeviceKind::AndGate(pins("create andgate <name> <inputs>")?),
        "orgate" => DeviceKind::OrGate(pins("create orgate <name> <inputs>")?),
        "nandgate" => DeviceKind::NandGate(pins("create nandgate <name> <inputs>")?),
        "norgate" => DeviceKind::NorGate(pins("create norgate <name> <inputs>")?),
        "junction" => DeviceKind::Junction(pins("create junction <name> <outputs>")?),
        "circuitbox" => match counts.as_slice() {
            [inputs, outputs] => DeviceKind::circuit_box(name, *inputs, *outputs),
            _ => {
                return Err(CommandError::Usage(
                    "create circuitbox <name> <inputs> <outputs>",
                ))
            }
        },
        _ => return Err(CommandError::UnknownType(kind)),
    })
}

fn parse_number(word: &str) -> Result<usize> {
    word.parse()
        .map_err(|_| CommandError::InvalidNumber(word.to_string()))
}

fn parse_state(word: &str) -> Result<bool> {
    match word.to_lowercase().as_str() {
        "on" => Ok(true),
        "off" => Ok(false),
        _ => Err(CommandError::InvalidState(word.to_string())),
    }
}

fn parse_direction(word: &str) -> Result<Direction> {
    match word.to_lowercase().as_str() {
        "input" => Ok(Direction::Input),
        "output" => Ok(Direction::Output),
        _ => Err(CommandError::InvalidDirection(word.to_string())),
    }
}

/// A workbench together with the directory its boxes are kept in.
pub struct Session {
    bench: Workbench,
    store: BoxStore,
}

impl Session {
    pub fn new(store: BoxStore) -> Self {
        Self {
            bench: Workbench::new(),
            store,
        }
    }

    /// Run a command, returning what should be printed.
    pub fn execute(&mut self, command: Command) -> Result<String> {
        let bench = &mut self.bench;

        let message = match command {
            Command::Create { name, kind } => {
                let type_name = kind.name();
                bench.create(&name, kind)?;
                format!("{type_name} {name} added")
            }
            Command::Connect { source, target } => {
                bench.connect(&source, &target)?;
                format!("Connected {source} to {target}")
            }
            Command::ConnectToInput {
                source,
                target,
                input,
            } => {
                bench.connect_to_input(&source, &target, input)?;
                format!("Connected {source} to input {input} of {target}")
            }
            Command::ConnectPins {
                source,
                output,
                target,
                input,
            } => {
                bench.connect_pins(&source, output, &target, input)?;
                format!("Connected output {output} of {source} to input {input} of {target}")
            }
            Command::Disconnect { source, target } => {
                bench.disconnect(&source, &target)?;
                format!("Disconnected {source} from {target}")
            }
            Command::Delete(name) => {
                bench.delete(&name)?;
                format!("{name} deleted")
            }
            Command::Show {
                direction,
                name,
                index,
            } => bench.show(direction, &name, index)?.to_string(),
            Command::Switch { name, on } => {
                bench.switch(&name, on)?;
                format!("{name} switched {}", if on { "on" } else { "off" })
            }
            Command::Power { name, on } => {
                bench.power(&name, on)?;
                format!("{name} powered {}", if on { "on" } else { "off" })
            }
            Command::ConnectAll { junction, targets } => {
                bench.connect_all(&junction, &targets)?;
                format!("Connected {junction} to {}", targets.join(", "))
            }
            Command::Bind {
                circuit_box,
                direction,
                target,
                target_pin,
                box_pin,
            } => {
                match direction {
                    Direction::Input => {
                        bench.bind_input_pin(&circuit_box, &target, target_pin, box_pin)?
                    }
                    Direction::Output => {
                        bench.bind_output_pin(&circuit_box, &target, target_pin, box_pin)?
                    }
                }
                format!("Bound {direction} {box_pin} of {circuit_box} to {target}")
            }
            Command::Save(name) => {
                let path = bench.save(&name, &self.store)?;
                format!("{name} saved to {}", path.display())
            }
            Command::Load(name) => {
                bench.load(&name, &self.store)?;
                format!("{name} loaded")
            }
            Command::List(filter) => {
                let mut lines = bench
                    .list()
                    .map(|(name, kind)| (name, kind.name().to_lowercase()))
                    .filter(|(_, kind)| filter.as_ref().is_none_or(|f| f == kind))
                    .map(|(name, kind)| format!("{name}: {kind}"))
                    .collect::<Vec<_>>();

                if filter.is_none() {
                    let saved = self.store.list()?;
                    if !saved.is_empty() {
                        lines.push(format!("saved boxes: {}", saved.join(", ")));
                    }
                }

                lines.join("\n")
            }
            Command::DeviceTypes => DEVICE_TYPES.join("\n"),
            Command::Help => HELP.to_string(),
            Command::Exit => String::new(),
        };

        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(session: &mut Session, line: &str) -> Result<String> {
        let command = Command::parse(line)?.expect("blank line");
        session.execute(command)
    }

    fn temp_session(name: &str) -> Session {
        let dir = std::env::temp_dir().join(format!("digisim_{name}_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        Session::new(BoxStore::new(dir))
    }

    #[test]
    fn test_parse() {
        assert_eq!(Command::parse("   ").unwrap(), None);
        assert_eq!(
            Command::parse("create AndGate g 3").unwrap(),
            Some(Command::Create {
                name: "g".into(),
                kind: DeviceKind::AndGate(3),
            })
        );
        assert_eq!(
            Command::parse("connect a b 1 0").unwrap(),
            Some(Command::ConnectPins {
                source: "a".into(),
                output: 1,
                target: "b".into(),
                input: 0,
            })
        );
        assert_eq!(
            Command::parse("junction j connectall a b").unwrap(),
            Some(Command::ConnectAll {
                junction: "j".into(),
                targets: vec!["a".into(), "b".into()],
            })
        );
        assert_eq!(
            Command::parse("box b bindoutput g 0 1").unwrap(),
            Some(Command::Bind {
                circuit_box: "b".into(),
                direction: Direction::Output,
                target: "g".into(),
                target_pin: 0,
                box_pin: 1,
            })
        );
        assert_eq!(Command::parse("exit").unwrap(), Some(Command::Exit));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(Command::parse("fly"), Err(CommandError::UnknownCommand(_))));
        assert!(matches!(Command::parse("create andgate g"), Err(CommandError::Usage(_))));
        assert!(matches!(Command::parse("create lamp l"), Err(CommandError::UnknownType(_))));
        assert!(matches!(Command::parse("show input g x"), Err(CommandError::InvalidNumber(_))));
        assert!(matches!(Command::parse("show side g 0"), Err(CommandError::InvalidDirection(_))));
        assert!(matches!(Command::parse("switch s maybe"), Err(CommandError::InvalidState(_))));
        assert!(matches!(Command::parse("box b save now"), Err(CommandError::Usage(_))));
        assert!(matches!(Command::parse("list lamp"), Err(CommandError::UnknownType(_))));
    }

    #[test]
    fn test_session() {
        let mut session = temp_session("session");

        for line in [
            "create switch s",
            "create inverter i",
            "create andgate g 2",
            "create powersource p",
            "create junction j 1",
            "connect s i",
            "connect i g",
            "connect p j",
            "connect j g",
            "switch s on",
        ] {
            run(&mut session, line).unwrap();
        }

        assert_eq!(run(&mut session, "show output g 0").unwrap(), "false");
        run(&mut session, "power p on").unwrap();
        assert_eq!(run(&mut session, "show output g 0").unwrap(), "true");

        // errors keep the session going
        assert!(matches!(
            run(&mut session, "connect s nowhere"),
            Err(CommandError::Circuit(CircuitError::UnknownName(_)))
        ));
        assert!(matches!(
            run(&mut session, "show output g 1"),
            Err(CommandError::Circuit(CircuitError::PinNotFound { .. }))
        ));

        assert_eq!(run(&mut session, "list switch").unwrap(), "s: switch");
        run(&mut session, "delete s").unwrap();
        assert_eq!(run(&mut session, "list switch").unwrap(), "");
    }

    #[test]
    fn test_box_commands() {
        let mut session = temp_session("box");

        for line in [
            "create nandgate n 2",
            "create circuitbox nand 2 1",
            "box nand bindinput n 0 0",
            "box nand bindinput n 1 1",
            "box nand bindoutput n 0 0",
            "box nand save",
            "delete nand",
            "delete n",
            "box nand load",
            "create powersource a",
            "create powersource b",
            "connect a nand",
            "connect b nand",
            "power a on",
        ] {
            run(&mut session, line).unwrap();
        }

        assert_eq!(run(&mut session, "show output nand 0").unwrap(), "true");
        run(&mut session, "power b on").unwrap();
        assert_eq!(run(&mut session, "show output nand 0").unwrap(), "false");

        let listing = run(&mut session, "list").unwrap();
        assert!(listing.contains("nand: circuitbox"));
        assert!(listing.contains("saved boxes: nand"));

        std::fs::remove_dir_all(session.store.dir()).unwrap();
    }
}

use bfile::EditorError;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// The closed set of commands the editor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    /// `exec <args...>`: run a shell command.
    Exec,
    /// `list [from] [to]`: show lines under their virtual numbers.
    List,
    /// `listr [from] [to]`: show lines under their positions in the file.
    ListR,
    /// `pushf <from> <offset>`: renumber lines forward.
    PushF,
    /// `pushb <from> <offset>`: renumber lines backward.
    PushB,
    Save,
    Quit,
}

impl CommandKind {
    pub const ALL: [CommandKind; 7] = [
        CommandKind::Exec,
        CommandKind::List,
        CommandKind::ListR,
        CommandKind::PushF,
        CommandKind::PushB,
        CommandKind::Save,
        CommandKind::Quit,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CommandKind::Exec => "exec",
            CommandKind::List => "list",
            CommandKind::ListR => "listr",
            CommandKind::PushF => "pushf",
            CommandKind::PushB => "pushb",
            CommandKind::Save => "save",
            CommandKind::Quit => "quit",
        }
    }
}

impl FromStr for CommandKind {
    type Err = EditorError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        CommandKind::ALL
            .into_iter()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| EditorError::UnknownCommand(name.to_string()))
    }
}

pub fn check_arity(kind: CommandKind, args: &[String], allowed: &[usize]) -> Result<(), EditorError> {
    if allowed.contains(&args.len()) {
        Ok(())
    } else {
        Err(EditorError::ArityError {
            command: kind.name().to_string(),
            given: args.len(),
        })
    }
}

pub fn parse_number(arg: &str) -> Result<i64, EditorError> {
    arg.parse()
        .map_err(|_| EditorError::MalformedArgument(arg.to_string()))
}

/// `<from> <offset>` for the push commands.
pub fn parse_shift(kind: CommandKind, args: &[String]) -> Result<(i64, i64), EditorError> {
    check_arity(kind, args, &[2])?;
    Ok((parse_number(&args[0])?, parse_number(&args[1])?))
}

/// No arguments lists everything, one lists a single line, two an inclusive range.
pub fn parse_range(
    kind: CommandKind,
    args: &[String],
) -> Result<Option<RangeInclusive<i64>>, EditorError> {
    match args {
        [] => Ok(None),
        [line] => {
            let line = parse_number(line)?;
            Ok(Some(line..=line))
        }
        [from, to] => Ok(Some(parse_number(from)?..=parse_number(to)?)),
        _ => Err(EditorError::ArityError {
            command: kind.name().to_string(),
            given: args.len(),
        }),
    }
}

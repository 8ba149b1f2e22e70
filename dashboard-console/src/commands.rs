/// One line of operator input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    List,
    /// 1-based row number as shown in the table.
    Show(usize),
    Close,
    Fix(usize),
    Approve,
    Reject,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  list        redraw the incident table
  show <n>    inspect incident #n (pauses refresh)
  close       close the detail view
  fix <n>     ask the backend for a fix for incident #n
  approve     run the proposed fix
  reject      discard the proposed fix
  help        this text
  quit        leave the dashboard";

pub fn parse_command(line: &str) -> Result<Command, String> {
    let mut parts = line.split_whitespace();
    let Some(word) = parts.next() else {
        return Err("empty command".into());
    };
    let arg = parts.next();
    if parts.next().is_some() {
        return Err(format!("too many arguments for '{word}'"));
    }

    let command = match (word.to_ascii_lowercase().as_str(), arg) {
        ("list" | "ls", None) => Command::List,
        ("show" | "open", Some(n)) => Command::Show(row_number(n)?),
        ("close", None) => Command::Close,
        ("fix", Some(n)) => Command::Fix(row_number(n)?),
        ("approve" | "yes" | "y", None) => Command::Approve,
        ("reject" | "no" | "n", None) => Command::Reject,
        ("help" | "?", None) => Command::Help,
        ("quit" | "exit" | "q", None) => Command::Quit,
        ("show" | "open" | "fix", None) => return Err(format!("'{word}' needs an incident number")),
        (_, Some(_)) if is_known(word) => return Err(format!("'{word}' takes no argument")),
        _ => return Err(format!("unknown command '{word}' (try 'help')")),
    };
    Ok(command)
}

fn is_known(word: &str) -> bool {
    matches!(
        word.to_ascii_lowercase().as_str(),
        "list" | "ls" | "close" | "approve" | "yes" | "y" | "reject" | "no" | "n" | "help" | "?"
            | "quit" | "exit" | "q"
    )
}

fn row_number(text: &str) -> Result<usize, String> {
    match text.trim_start_matches('#').parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("'{text}' is not an incident number")),
    }
}

//! Chat command parsing.
//!
//! Commands arrive as message text such as `/add Alice 1990-04-10 3`. In group
//! chats Telegram may append the bot name (`/add@my_bot`), which is ignored.

/// Arguments of `/add`. The date is validated by the handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddArgs {
    pub name: String,
    pub date: String,
    pub days_before: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    /// `None` when required arguments are missing.
    Add(Option<AddArgs>),
    List,
    /// `None` when no id or name was given.
    Remove(Option<String>),
    ImportLocal,
    TestNow,
}

impl Command {
    /// Parse message text. Returns `None` for plain text and unknown commands.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let rest = text.strip_prefix('/')?;
        let (head, args) = match rest.split_once(char::is_whitespace) {
            Some((head, args)) => (head, args.trim()),
            None => (rest, ""),
        };
        let name = head.split('@').next().unwrap_or(head).to_lowercase();

        let command = match name.as_str() {
            "start" | "help" => Command::Start,
            "add" => Command::Add(parse_add_args(args)),
            "list" => Command::List,
            "remove" => Command::Remove(Some(args.to_string()).filter(|a| !a.is_empty())),
            "import_local" => Command::ImportLocal,
            "test_now" => Command::TestNow,
            _ => return None,
        };
        Some(command)
    }
}

/// `<name> <date> [days_before]`. Anything unparseable as days counts as 0.
fn parse_add_args(args: &str) -> Option<AddArgs> {
    let parts = split_max(args, 3);
    if parts.len() < 2 {
        return None;
    }
    let days_before = parts
        .get(2)
        .and_then(|raw| raw.parse::<i64>().ok())
        .unwrap_or(0);
    Some(AddArgs {
        name: parts[0].to_string(),
        date: parts[1].to_string(),
        days_before,
    })
}

/// Split on whitespace into at most `n` pieces; the last piece keeps the remainder.
fn split_max(text: &str, n: usize) -> Vec<&str> {
    let mut parts = Vec::with_capacity(n);
    let mut rest = text.trim();
    while !rest.is_empty() {
        if parts.len() + 1 == n {
            parts.push(rest);
            break;
        }
        match rest.split_once(char::is_whitespace) {
            Some((head, tail)) => {
                parts.push(head);
                rest = tail.trim_start();
            }
            None => {
                parts.push(rest);
                break;
            }
        }
    }
    parts
}

use crate::server::AppState;

/// Prefix marking a chat message as a bot command.
pub const COMMAND_PREFIX: &str = "$$";

/// Every command the bot understands. Adding a variant here forces the
/// match arms below to cover it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Help,
    Jpy,
    Reddit,
}

impl Command {
    /// All commands, in the order `help` lists them.
    pub const ALL: [Command; 3] = [Command::Help, Command::Jpy, Command::Reddit];

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "help" => Some(Command::Help),
            "jpy" => Some(Command::Jpy),
            "reddit" => Some(Command::Reddit),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Command::Help => "help",
            Command::Jpy => "jpy",
            Command::Reddit => "reddit",
        }
    }

    /// Executes the command. Never fails: external-API errors are logged by
    /// the clients and surface to the user as an empty result.
    pub async fn run(self, state: &AppState, args: &[&str]) -> String {
        match self {
            Command::Help => help(),
            Command::Jpy => state.finance.exchange_rates().await,
            Command::Reddit => state.reddit.hot(args).await,
        }
    }
}

fn help() -> String {
    let mut usage = String::from("hookbot command list\n");
    for command in Command::ALL {
        usage.push_str(command.name());
        usage.push('\n');
    }
    usage
}

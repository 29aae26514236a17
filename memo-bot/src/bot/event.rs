use crate::{notes::OwnerId, telegram::Update};

/// A decoded chat command, independent of the transport payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub owner_id: OwnerId,
    /// Where the reply goes.
    pub chat_id: i64,
    pub command: String,
    pub args: Vec<String>,
}

impl InboundEvent {
    pub fn new(owner_id: OwnerId, command: impl Into<String>, args: &[&str]) -> Self {
        Self {
            owner_id,
            chat_id: owner_id,
            command: command.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// `None` for anything that is not a `/command` sent by a user to this bot.
    pub fn from_update(update: &Update, bot_username: Option<&str>) -> Option<Self> {
        let message = update.message.as_ref()?;
        let owner_id = message.from.as_ref()?.id;
        let (command, args) = parse_command(message.text.as_deref()?, bot_username)?;

        Some(Self {
            owner_id,
            chat_id: message.chat.id,
            command,
            args,
        })
    }
}

fn parse_command(text: &str, bot_username: Option<&str>) -> Option<(String, Vec<String>)> {
    let mut tokens = text.split_whitespace();
    let head = tokens.next()?.strip_prefix('/')?;

    let name = match head.split_once('@') {
        Some((name, addressee)) => {
            if let Some(me) = bot_username {
                if !addressee.eq_ignore_ascii_case(me.trim_start_matches('@')) {
                    return None;
                }
            }
            name
        }
        None => head,
    };
    if name.is_empty() {
        return None;
    }

    Some((name.to_owned(), tokens.map(str::to_owned).collect()))
}

use std::fmt;

/// Bot identity. Many [`Recipient`]s may share one bot.
#[derive(Clone, PartialEq, Eq)]
pub struct Bot {
    pub name: String,
    pub token: String,
    pub is_default: bool,
}

impl Bot {
    pub fn new(name: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            token: token.into(),
            is_default: false,
        }
    }

    pub fn default_bot(mut self, is_default: bool) -> Self {
        self.is_default = is_default;
        self
    }
}

impl fmt::Debug for Bot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bot")
            .field("name", &self.name)
            .field("token", &"<redacted>")
            .field("is_default", &self.is_default)
            .finish()
    }
}

/// Destination of a send: which bot, which chat, and whether to pin.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Recipient {
    pub bot: Bot,
    pub chat_id: String,
    pub pin_all_message: bool,
}

impl Recipient {
    pub fn new(bot: Bot, chat_id: impl Into<String>) -> Self {
        Self {
            bot,
            chat_id: chat_id.into(),
            pin_all_message: false,
        }
    }

    pub fn pin_all_message(mut self, pin: bool) -> Self {
        self.pin_all_message = pin;
        self
    }
}

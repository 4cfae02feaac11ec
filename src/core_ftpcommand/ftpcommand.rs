use crate::constants::{GET_CMD, LIST_CMD};

#[derive(Eq, Hash, PartialEq, Debug, Clone, Copy)]
pub enum FtpCommand {
    LIST,
    GET,
    UNKNOWN,
}

impl FtpCommand {
    /// `-l` must match exactly; any message containing `-g` is a GET.
    pub fn from_message(message: &str) -> FtpCommand {
        if message == LIST_CMD {
            FtpCommand::LIST
        } else if message.contains(GET_CMD) {
            FtpCommand::GET
        } else {
            FtpCommand::UNKNOWN
        }
    }

    /// The token echoed back as acknowledgment.
    pub fn token(&self) -> Option<&'static str> {
        match self {
            FtpCommand::LIST => Some(LIST_CMD),
            FtpCommand::GET => Some(GET_CMD),
            FtpCommand::UNKNOWN => None,
        }
    }
}

use crate::constants::MAX_CLIENT_ARGS;
use crate::core_error::SessionError;

/// Space-separated tokens of one message, at most `MAX_CLIENT_ARGS` of them.
///
/// Built fresh for every message; the caller decides which arity the
/// current phase needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandArgs {
    tokens: Vec<String>,
}

impl CommandArgs {
    /// Splits on single spaces, skipping empty tokens. More tokens than
    /// the splitter holds make the message malformed.
    pub fn split(message: &str) -> Result<Self, SessionError> {
        let tokens: Vec<String> = message
            .split(' ')
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .collect();

        if tokens.len() > MAX_CLIENT_ARGS {
            return Err(SessionError::MalformedMessage(format!(
                "expected at most {} arguments, got {}",
                MAX_CLIENT_ARGS,
                tokens.len()
            )));
        }

        Ok(Self { tokens })
    }

    /// Both tokens, when exactly two are present.
    pub fn pair(&self) -> Result<(&str, &str), SessionError> {
        match self.tokens.as_slice() {
            [first, second] => Ok((first.as_str(), second.as_str())),
            other => Err(SessionError::MalformedMessage(format!(
                "expected {} arguments, got {}",
                MAX_CLIENT_ARGS,
                other.len()
            ))),
        }
    }
}

#[cfg(test)]
impl CommandArgs {
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.tokens.get(index).map(String::as_str)
    }
}

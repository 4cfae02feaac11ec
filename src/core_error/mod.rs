pub mod error;

pub use error::{ClientError, FrameError, ServerError, SessionError};

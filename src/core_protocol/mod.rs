// Message framing and argument parsing shared by both connections
pub mod args;
pub mod framer;

pub use args::CommandArgs;
pub use framer::{receive_message, send_message, FrameLimits};

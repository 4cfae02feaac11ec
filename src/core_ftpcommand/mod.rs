// Here's the list of the commands implemented
pub mod ftpcommand;
pub mod get;
pub mod list;

pub use ftpcommand::FtpCommand;

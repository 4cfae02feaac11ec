pub mod data_channel;
pub mod network;

#[cfg(test)]
mod test_session;

use crate::core_client::client::{ClientOptions, Request};
use crate::core_error::ClientError;
use clap::{ArgGroup, Parser};

/// Command-line arguments of the client
#[derive(Parser, Debug)]
#[command(
    name = "ftclient",
    version,
    about = "Lists or fetches files from a transfer server over a separate data connection."
)]
#[command(group(ArgGroup::new("request").required(true).args(["list", "get"])))]
pub struct ClientCli {
    /// Host name of the server
    pub server_host: String,

    /// Control port of the server
    #[arg(value_parser = clap::value_parser!(u16).range(1..))]
    pub server_port: u16,

    /// List the server's directory, receiving it on DATA_PORT
    #[arg(short = 'l', value_name = "DATA_PORT", value_parser = clap::value_parser!(u16).range(1..))]
    pub list: Option<u16>,

    /// Fetch FILENAME, receiving it on DATA_PORT
    #[arg(short = 'g', num_args = 2, value_names = ["FILENAME", "DATA_PORT"])]
    pub get: Option<Vec<String>>,

    /// Host name the server connects back to (defaults to this machine's name)
    #[arg(long)]
    pub data_host: Option<String>,

    /// Enable verbose mode
    #[arg(short, long)]
    pub verbose: bool,
}

impl ClientCli {
    pub fn request(&self) -> Result<Request, ClientError> {
        if let Some(data_port) = self.list {
            return Ok(Request::List { data_port });
        }

        match self.get.as_deref() {
            Some([filename, data_port]) => {
                if filename.contains(' ') {
                    return Err(ClientError::InvalidRequest(format!(
                        "file names cannot contain spaces: {:?}",
                        filename
                    )));
                }
                let data_port = match data_port.parse::<u16>() {
                    Ok(port) if port > 0 => port,
                    _ => {
                        return Err(ClientError::InvalidRequest(format!(
                            "{:?} is not a valid data port",
                            data_port
                        )))
                    }
                };
                Ok(Request::Get {
                    filename: filename.clone(),
                    data_port,
                })
            }
            _ => Err(ClientError::InvalidRequest(
                "one of -l or -g is required".to_string(),
            )),
        }
    }

    pub fn options(&self) -> Result<ClientOptions, ClientError> {
        let data_host = match &self.data_host {
            Some(host) => host.clone(),
            None => hostname::get()?.to_string_lossy().into_owned(),
        };
        Ok(ClientOptions::new(
            &self.server_host,
            self.server_port,
            &data_host,
        ))
    }
}

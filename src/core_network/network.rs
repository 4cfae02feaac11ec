use crate::config::Config;
use crate::constants::ACCEPT_RETRY_DELAY;
use crate::core_error::{ServerError, SessionError};
use crate::session::{Session, SessionSettings, SessionState};
use log::{debug, error, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinSet;

type SessionOutcome = (SocketAddr, Result<SessionState, SessionError>);

/// Binds the listening socket once, at startup.
pub async fn bind_listener(config: &Config) -> Result<TcpListener, ServerError> {
    let addr = config.server.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::BindFailure {
            addr: addr.clone(),
            source,
        })?;

    match listener.local_addr() {
        Ok(local) => info!("Server open on {}", local),
        Err(_) => info!("Server open on {}", addr),
    }
    Ok(listener)
}

/// Accepts control connections forever, one task per session.
///
/// Finished sessions are reaped without blocking after every spawn. An
/// accept error is logged and the loop pauses before trying again. Only
/// process termination stops it.
pub async fn start_server(listener: TcpListener, config: Arc<Config>) {
    let mut sessions: JoinSet<SessionOutcome> = JoinSet::new();

    loop {
        let (socket, addr) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                back_off_after_accept_failure(e).await;
                reap_sessions(&mut sessions);
                continue;
            }
        };
        info!("Connection from {}", addr);

        let settings = SessionSettings {
            root_dir: config.server.root_dir.clone(),
            limits: config.server.frame_limits(),
        };
        sessions.spawn(handle_connection(socket, addr, settings));

        reap_sessions(&mut sessions);
    }
}

/// Runs one session to completion inside its task and reports the result
/// there; nothing but the outcome leaves the task.
pub async fn handle_connection(
    socket: TcpStream,
    addr: SocketAddr,
    settings: SessionSettings,
) -> SessionOutcome {
    let outcome = Session::new(socket, addr, settings).run().await;
    match &outcome {
        Ok(state) => debug!("Session {} ended in {:?}", addr, state),
        Err(e @ SessionError::FileNotFound(_)) => warn!("Session {} aborted: {}", addr, e),
        Err(e) => error!("Session {} aborted: {}", addr, e),
    }
    info!("Connection closed for {}", addr);
    (addr, outcome)
}

/// Errors such as EMFILE repeat on every call until a session ends and
/// frees its sockets, so the next attempt waits.
async fn back_off_after_accept_failure(err: std::io::Error) {
    error!(
        "{}; retrying in {} ms",
        ServerError::AcceptFailure(err),
        ACCEPT_RETRY_DELAY.as_millis()
    );
    tokio::time::sleep(ACCEPT_RETRY_DELAY).await;
}

fn reap_sessions(sessions: &mut JoinSet<SessionOutcome>) -> usize {
    let mut reaped = 0;
    while let Some(joined) = sessions.try_join_next() {
        reaped += 1;
        if let Err(e) = joined {
            error!("Session task failed: {}", e);
        }
    }
    if reaped > 0 {
        debug!("Reaped {} finished sessions, {} still running", reaped, sessions.len());
    }
    reaped
}

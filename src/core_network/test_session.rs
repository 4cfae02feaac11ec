// End-to-end sessions against a real listener on the loopback interface

use crate::config::Config;
use crate::constants::{FILE_NOT_FOUND, UNKNOWN_COMMAND};
use crate::core_network::network::{bind_listener, start_server};
use crate::core_protocol::{receive_message, send_message, FrameLimits};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

const CLIENT_LIMITS: FrameLimits = FrameLimits {
    max_message_size: 8 * 1024 * 1024,
    fragment_size: 64 * 1024,
};
const WAIT: Duration = Duration::from_secs(5);
const SHORT_WAIT: Duration = Duration::from_millis(300);

fn test_config(root: &Path) -> Config {
    let mut config = Config::default();
    config.server.listen_address = "127.0.0.1".to_string();
    config.server.listen_port = 0;
    config.server.root_dir = root.to_path_buf();
    config
}

async fn start_test_server(config: Config) -> SocketAddr {
    let listener = bind_listener(&config).await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(start_server(listener, Arc::new(config)));
    addr
}

/// Sends one framed request and returns the framed reply.
async fn exchange(control: &mut TcpStream, request: &str) -> String {
    send_message(control, request.as_bytes()).await.unwrap();
    let reply = timeout(WAIT, receive_message(control, CLIENT_LIMITS))
        .await
        .unwrap()
        .unwrap()
        .into_complete()
        .unwrap();
    String::from_utf8(reply).unwrap()
}

/// True once the server has closed its side of the control connection.
async fn control_closed(control: &mut TcpStream) -> bool {
    let message = timeout(WAIT, receive_message(control, CLIENT_LIMITS))
        .await
        .unwrap()
        .unwrap();
    !message.is_complete() && message.body().is_empty()
}

/// Runs a full request the way the command-line client does and returns
/// the acknowledgment plus the payload received on the data connection.
async fn fetch(server: SocketAddr, request: &str) -> (String, Option<Vec<u8>>) {
    let mut control = TcpStream::connect(server).await.unwrap();
    let reply = exchange(&mut control, request).await;
    if reply != "-l" && reply != "-g" {
        return (reply, None);
    }

    let data_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let data_port = data_listener.local_addr().unwrap().port();
    send_message(&mut control, format!("127.0.0.1 {}", data_port).as_bytes())
        .await
        .unwrap();

    let (mut data, _) = timeout(WAIT, data_listener.accept())
        .await
        .unwrap()
        .unwrap();
    let payload = timeout(WAIT, receive_message(&mut data, CLIENT_LIMITS))
        .await
        .unwrap()
        .unwrap()
        .into_complete()
        .unwrap();

    assert!(control_closed(&mut control).await);
    (reply, Some(payload))
}

fn patterned_bytes(len: usize, seed: usize) -> Vec<u8> {
    // Consecutive bytes always differ, so "||" never appears.
    (0..len).map(|i| ((i + seed) % 251) as u8).collect()
}

#[tokio::test]
async fn test_list_returns_every_entry() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("alpha.txt"), b"a").unwrap();
    std::fs::write(dir.path().join("beta.bin"), b"b").unwrap();
    std::fs::create_dir(dir.path().join("nested")).unwrap();
    let server = start_test_server(test_config(dir.path())).await;

    let (reply, payload) = fetch(server, "-l").await;
    assert_eq!(reply, "-l");

    let listing = String::from_utf8(payload.unwrap()).unwrap();
    let mut names: Vec<&str> = listing.lines().collect();
    names.sort_unstable();
    assert_eq!(names, vec![".", "..", "alpha.txt", "beta.bin", "nested"]);
}

#[tokio::test]
async fn test_get_delivers_exact_file_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let sizes = [0usize, 1, 1023, 1024, 70_000, 1_048_576];
    for (i, size) in sizes.iter().enumerate() {
        std::fs::write(dir.path().join(format!("file{}", i)), patterned_bytes(*size, i)).unwrap();
    }
    let server = start_test_server(test_config(dir.path())).await;

    for (i, size) in sizes.iter().enumerate() {
        let (reply, payload) = fetch(server, &format!("-g file{}", i)).await;
        assert_eq!(reply, "-g");
        let payload = payload.unwrap();
        assert_eq!(payload.len(), *size);
        assert_eq!(payload, patterned_bytes(*size, i));
    }
}

#[tokio::test]
async fn test_get_missing_file_reports_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let server = start_test_server(test_config(dir.path())).await;

    let mut control = TcpStream::connect(server).await.unwrap();
    let reply = exchange(&mut control, "-g missing.txt").await;
    assert_eq!(reply, FILE_NOT_FOUND);
    assert!(control_closed(&mut control).await);
}

#[tokio::test]
async fn test_unknown_command_ends_session() {
    let dir = tempfile::tempdir().unwrap();
    let server = start_test_server(test_config(dir.path())).await;

    for request in ["-x", "LIST", "-l extra"] {
        let mut control = TcpStream::connect(server).await.unwrap();
        let reply = exchange(&mut control, request).await;
        assert_eq!(reply, UNKNOWN_COMMAND);
        assert!(control_closed(&mut control).await);
    }
}

#[tokio::test]
async fn test_get_without_filename_closes_silently() {
    let dir = tempfile::tempdir().unwrap();
    let server = start_test_server(test_config(dir.path())).await;

    let mut control = TcpStream::connect(server).await.unwrap();
    send_message(&mut control, b"-g").await.unwrap();
    assert!(control_closed(&mut control).await);
}

#[tokio::test]
async fn test_malformed_address_never_opens_data_connection() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("notes.txt"), b"notes").unwrap();
    let server = start_test_server(test_config(dir.path())).await;

    let data_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let data_port = data_listener.local_addr().unwrap().port();

    for address in [
        format!("127.0.0.1 {} extra", data_port),
        "127.0.0.1".to_string(),
        "127.0.0.1 not-a-port".to_string(),
    ] {
        let mut control = TcpStream::connect(server).await.unwrap();
        assert_eq!(exchange(&mut control, "-g notes.txt").await, "-g");
        send_message(&mut control, address.as_bytes()).await.unwrap();

        assert!(control_closed(&mut control).await);
        assert!(timeout(SHORT_WAIT, data_listener.accept()).await.is_err());
    }

    // The dispatcher keeps serving.
    let (reply, payload) = fetch(server, "-g notes.txt").await;
    assert_eq!(reply, "-g");
    assert_eq!(payload.unwrap(), b"notes");
}

#[tokio::test]
async fn test_unreachable_data_address_does_not_stop_server() {
    let dir = tempfile::tempdir().unwrap();
    let server = start_test_server(test_config(dir.path())).await;

    let closed_port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let mut control = TcpStream::connect(server).await.unwrap();
    assert_eq!(exchange(&mut control, "-l").await, "-l");
    send_message(&mut control, format!("127.0.0.1 {}", closed_port).as_bytes())
        .await
        .unwrap();
    assert!(control_closed(&mut control).await);

    let (reply, _) = fetch(server, "-l").await;
    assert_eq!(reply, "-l");
}

#[tokio::test]
async fn test_oversized_request_closes_session() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path());
    config.server.max_message_size = 1024;
    config.server.fragment_size = 256;
    let server = start_test_server(config).await;

    let mut control = TcpStream::connect(server).await.unwrap();
    control.write_all(&[b'a'; 4096]).await.unwrap();
    assert!(control_closed(&mut control).await);

    let (reply, _) = fetch(server, "-l").await;
    assert_eq!(reply, "-l");
}

#[tokio::test]
async fn test_incomplete_request_closes_session() {
    let dir = tempfile::tempdir().unwrap();
    let server = start_test_server(test_config(dir.path())).await;

    let mut control = TcpStream::connect(server).await.unwrap();
    control.write_all(b"-l").await.unwrap();
    control.shutdown().await.unwrap();
    assert!(control_closed(&mut control).await);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_sessions_receive_their_own_files() {
    let dir = tempfile::tempdir().unwrap();
    let clients = 5;
    for i in 0..clients {
        std::fs::write(
            dir.path().join(format!("client{}.dat", i)),
            patterned_bytes(100_000 + i * 997, i),
        )
        .unwrap();
    }
    let server = start_test_server(test_config(dir.path())).await;

    let mut handles = Vec::new();
    for i in 0..clients {
        handles.push(tokio::spawn(async move {
            let (reply, payload) = fetch(server, &format!("-g client{}.dat", i)).await;
            (i, reply, payload)
        }));
    }

    for handle in handles {
        let (i, reply, payload) = handle.await.unwrap();
        assert_eq!(reply, "-g");
        assert_eq!(payload.unwrap(), patterned_bytes(100_000 + i * 997, i));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_stalled_session_does_not_block_others() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("ready.txt"), b"ready").unwrap();
    let server = start_test_server(test_config(dir.path())).await;

    // Connects and never sends a command.
    let mut stalled = TcpStream::connect(server).await.unwrap();

    // Acknowledged but never sends its data address.
    let mut half_done = TcpStream::connect(server).await.unwrap();
    assert_eq!(exchange(&mut half_done, "-l").await, "-l");

    let (reply, payload) = timeout(WAIT, fetch(server, "-g ready.txt")).await.unwrap();
    assert_eq!(reply, "-g");
    assert_eq!(payload.unwrap(), b"ready");

    stalled.shutdown().await.unwrap();
    half_done.shutdown().await.unwrap();
}

use std::io::Write;
use std::net::TcpListener;
use std::thread;

use jarlift_core::{DeployError, ExitStatusPolicy, RemoteConfig, RemoteExecutor};

use super::*;

fn remote_config(port: u16, password: Option<&str>) -> RemoteConfig {
    RemoteConfig {
        host: "127.0.0.1".to_string(),
        port,
        username: "root".to_string(),
        password: password.map(str::to_string),
    }
}

fn unused_local_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("must bind ephemeral port");
    listener
        .local_addr()
        .expect("listener must have an address")
        .port()
}

#[test]
fn disconnect_without_connect_is_a_no_op() {
    let mut session = SshSession::new(&remote_config(22, Some("pw")));
    assert!(!session.is_connected());
    session.disconnect();
    session.disconnect();
    assert!(!session.is_connected());
}

#[test]
fn execute_before_connect_is_an_execution_error() {
    let mut session = SshSession::new(&remote_config(22, Some("pw")));
    let err = session
        .execute("uname -a")
        .expect_err("unconnected session must not execute");
    match err {
        DeployError::Execution { command, reason } => {
            assert_eq!(command, "uname -a");
            assert!(reason.contains("not connected"), "unexpected reason: {reason}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn connect_without_password_fails_before_dialing() {
    let mut session = SshSession::new(&remote_config(unused_local_port(), None));
    let err = session.connect().expect_err("missing password must fail");
    assert_eq!(err.code(), "connection-failed");
    assert!(err.to_string().contains("no password configured"));
    assert!(!session.is_connected());
}

#[test]
fn connect_to_closed_port_is_a_connection_error() {
    let port = unused_local_port();
    let mut session = SshSession::new(&remote_config(port, Some("pw")));
    let err = session.connect().expect_err("closed port must fail");
    match err {
        DeployError::Connection {
            host,
            port: err_port,
            reason,
        } => {
            assert_eq!(host, "127.0.0.1");
            assert_eq!(err_port, port);
            assert!(reason.starts_with("tcp connect failed"), "unexpected reason: {reason}");
        }
        other => panic!("unexpected error: {other}"),
    }
    session.disconnect();
}

#[test]
fn connect_to_non_ssh_peer_fails_handshake() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("must bind ephemeral port");
    let port = listener
        .local_addr()
        .expect("listener must have an address")
        .port();
    let peer = thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let _ = stream.write_all(b"HTTP/1.1 400 Bad Request\r\n\r\n");
        }
    });

    let mut session = SshSession::new(&remote_config(port, Some("pw")));
    let err = session.connect().expect_err("non-ssh peer must fail");
    assert_eq!(err.code(), "connection-failed");
    assert!(!session.is_connected());

    peer.join().expect("peer thread must finish");
}

#[test]
fn stderr_is_captured_only_when_exit_status_is_required() {
    let session = SshSession::new(&remote_config(22, Some("pw")));
    assert!(!session.captures_stderr());

    let session = SshSession::new(&remote_config(22, Some("pw")))
        .with_exit_status_policy(ExitStatusPolicy::Require);
    assert!(session.captures_stderr());

    let session = SshSession::new(&remote_config(22, Some("pw")))
        .with_exit_status_policy(ExitStatusPolicy::Ignore);
    assert!(!session.captures_stderr());
}

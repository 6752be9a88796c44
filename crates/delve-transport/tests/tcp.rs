//! Integration tests for the line-framed TCP transport.

use delve_transport::{Connection, TcpConnection, TcpTransport, Transport, TransportError};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

/// Binds on an ephemeral port, connects one raw client, returns both ends.
async fn pair(max_frame: Option<usize>) -> (TcpConnection, TcpStream) {
    let mut transport = TcpTransport::bind("127.0.0.1:0").await.expect("bind");
    if let Some(max) = max_frame {
        transport = transport.with_max_frame(max);
    }
    let addr = transport.local_addr().expect("local addr");

    let server = tokio::spawn(async move { transport.accept().await.expect("accept") });
    let client = TcpStream::connect(addr).await.expect("connect");
    let conn = server.await.expect("accept task");
    (conn, client)
}

#[tokio::test]
async fn test_send_appends_newline() {
    let (conn, client) = pair(None).await;

    conn.send(b"4242").await.expect("send");
    conn.send(b"{\"status\":\"ok\"}").await.expect("send");

    let mut lines = BufReader::new(client).lines();
    assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("4242"));
    assert_eq!(
        lines.next_line().await.unwrap().as_deref(),
        Some("{\"status\":\"ok\"}")
    );
}

#[tokio::test]
async fn test_recv_splits_frames_and_strips_crlf() {
    let (conn, mut client) = pair(None).await;

    client
        .write_all(b"{\"type\":\"get_state\"}\r\n\n{\"type\":\"enter_room\"}\n")
        .await
        .unwrap();

    let first = conn.recv().await.unwrap().expect("frame");
    assert_eq!(first, b"{\"type\":\"get_state\"}");
    // The blank line in between is skipped, not surfaced as an empty frame.
    let second = conn.recv().await.unwrap().expect("frame");
    assert_eq!(second, b"{\"type\":\"enter_room\"}");
}

#[tokio::test]
async fn test_recv_returns_none_on_eof() {
    let (conn, client) = pair(None).await;
    drop(client);

    let result = conn.recv().await.expect("eof is not an error");
    assert!(result.is_none());
}

#[tokio::test]
async fn test_recv_unterminated_frame_before_eof_is_delivered() {
    let (conn, mut client) = pair(None).await;
    client.write_all(b"{\"type\":\"get_state\"}").await.unwrap();
    client.shutdown().await.unwrap();

    let frame = conn.recv().await.unwrap().expect("frame");
    assert_eq!(frame, b"{\"type\":\"get_state\"}");
    assert!(conn.recv().await.unwrap().is_none());
}

#[tokio::test]
async fn test_recv_oversize_frame_is_rejected() {
    let (conn, mut client) = pair(Some(8)).await;
    client.write_all(b"0123456789abcdef\n").await.unwrap();

    let result = conn.recv().await;
    assert!(
        matches!(result, Err(TransportError::FrameTooLarge { max: 8 })),
        "got {result:?}"
    );
}

#[tokio::test]
async fn test_recv_frame_exactly_at_limit_is_accepted() {
    let (conn, mut client) = pair(Some(8)).await;
    client.write_all(b"01234567\n").await.unwrap();

    let frame = conn.recv().await.unwrap().expect("frame");
    assert_eq!(frame, b"01234567");
}

//! Integration tests for the WebSocket transport.
//!
//! A real tokio-tungstenite client talks to the server side over
//! loopback, so these exercise the handshake and framing end to end.

#[cfg(feature = "websocket")]
mod websocket {
    use delve_transport::{Connection, Transport, WebSocketTransport};
    use futures_util::{SinkExt, StreamExt};
    use tokio_tungstenite::tungstenite::Message;

    type ClientWs = tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >;

    /// Binds on an ephemeral port, connects one client, and returns both ends.
    async fn pair() -> (delve_transport::WebSocketConnection, ClientWs) {
        let mut transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport.local_addr().expect("local addr");

        let server = tokio::spawn(async move {
            transport.accept().await.expect("should accept")
        });
        let (client, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
            .await
            .expect("client should connect");
        let conn = server.await.expect("accept task");
        (conn, client)
    }

    #[tokio::test]
    async fn test_websocket_send_arrives_as_text_frame() {
        let (conn, mut client) = pair().await;
        assert!(conn.id().into_inner() > 0);

        conn.send(br#"{"status":"ok"}"#).await.expect("send");

        let msg = client.next().await.unwrap().unwrap();
        assert!(msg.is_text(), "JSON should travel as a text frame");
        assert_eq!(msg.into_data().as_ref(), br#"{"status":"ok"}"#);
    }

    #[tokio::test]
    async fn test_websocket_recv_accepts_text_and_binary() {
        let (conn, mut client) = pair().await;

        client
            .send(Message::text(r#"{"type":"get_state"}"#.to_owned()))
            .await
            .unwrap();
        client
            .send(Message::binary(b"raw".to_vec()))
            .await
            .unwrap();

        let first = conn.recv().await.expect("recv").expect("frame");
        assert_eq!(first, br#"{"type":"get_state"}"#);
        let second = conn.recv().await.expect("recv").expect("frame");
        assert_eq!(second, b"raw");
    }

    #[tokio::test]
    async fn test_websocket_recv_returns_none_on_client_close() {
        let (conn, mut client) = pair().await;

        client.send(Message::Close(None)).await.unwrap();

        let result = conn.recv().await.expect("recv should not error");
        assert!(result.is_none(), "should return None on client close");
    }
}

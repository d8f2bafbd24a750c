//! Integration tests for the WebSocket transport.
//!
//! A real listener and a real `tokio-tungstenite` client exchange frames
//! over loopback.

#[cfg(feature = "websocket")]
mod websocket {
    use std::sync::Arc;
    use std::time::Duration;

    use faceguess_transport::{
        Connection, Transport, TransportError, WebSocketConnection, WebSocketTransport,
    };
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpStream;
    use futures_util::{SinkExt, StreamExt};
    use tokio_tungstenite::tungstenite::Message;

    type ClientWs = tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >;

    /// Binds on an OS-assigned port, connects one client, and returns both ends.
    async fn pair() -> (WebSocketConnection, ClientWs) {
        let mut transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport.local_addr().expect("local addr");

        let server = tokio::spawn(async move {
            let incoming = transport.accept().await.expect("should accept");
            incoming.upgrade().await.expect("should upgrade")
        });

        let (client, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
            .await
            .expect("client should connect");
        let conn = server.await.expect("accept task");
        (conn, client)
    }

    #[tokio::test]
    async fn test_send_goes_out_as_text_frame() {
        let (conn, mut client) = pair().await;
        assert!(conn.id().into_inner() > 0);

        conn.send(br#"{"event":"gameCreated"}"#).await.unwrap();

        let msg = client.next().await.unwrap().unwrap();
        match msg {
            Message::Text(text) => assert_eq!(text.as_str(), r#"{"event":"gameCreated"}"#),
            other => panic!("expected text frame, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_recv_accepts_text_and_binary() {
        let (conn, mut client) = pair().await;

        client.send(Message::text("hello")).await.unwrap();
        client
            .send(Message::Binary(b"bytes".to_vec().into()))
            .await
            .unwrap();

        assert_eq!(conn.recv().await.unwrap().unwrap(), b"hello");
        assert_eq!(conn.recv().await.unwrap().unwrap(), b"bytes");
    }

    #[tokio::test]
    async fn test_send_while_recv_is_pending() {
        let (conn, mut client) = pair().await;
        let conn = Arc::new(conn);

        // Park a reader on the connection, then send from another task.
        let reader = {
            let conn = Arc::clone(&conn);
            tokio::spawn(async move { conn.recv().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        tokio::time::timeout(Duration::from_secs(2), conn.send(b"ping"))
            .await
            .expect("send must not wait for the pending recv")
            .unwrap();
        let msg = client.next().await.unwrap().unwrap();
        assert_eq!(msg.into_data().as_ref(), b"ping");

        client.send(Message::text("pong")).await.unwrap();
        let got = reader.await.unwrap().unwrap().unwrap();
        assert_eq!(got, b"pong");
    }

    #[tokio::test]
    async fn test_recv_returns_none_on_client_close() {
        let (conn, mut client) = pair().await;

        client.send(Message::Close(None)).await.unwrap();

        let result = conn.recv().await.expect("recv should not error");
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_send_rejects_non_utf8() {
        let (conn, _client) = pair().await;
        let err = conn.send(&[0xff, 0xfe]).await.unwrap_err();
        assert!(matches!(err, TransportError::NotText));
    }

    #[tokio::test]
    async fn test_close_sends_close_frame() {
        let (conn, mut client) = pair().await;
        conn.close().await.unwrap();

        let msg = client.next().await.unwrap().unwrap();
        assert!(matches!(msg, Message::Close(_)));
    }

    #[tokio::test]
    async fn test_accept_does_not_wait_for_upgrade_request() {
        let mut transport = WebSocketTransport::bind("127.0.0.1:0").await.unwrap();
        let addr = transport.local_addr().unwrap();

        // A peer that connects and never speaks.
        let silent = TcpStream::connect(addr).await.unwrap();
        let incoming = tokio::time::timeout(Duration::from_secs(2), transport.accept())
            .await
            .expect("accept must return before any handshake bytes arrive")
            .unwrap();
        assert_eq!(incoming.peer_addr(), silent.local_addr().unwrap());
    }

    #[tokio::test]
    async fn test_upgrade_rejects_non_websocket_peer() {
        let mut transport = WebSocketTransport::bind("127.0.0.1:0").await.unwrap();
        let addr = transport.local_addr().unwrap();

        let mut raw = TcpStream::connect(addr).await.unwrap();
        let incoming = transport.accept().await.unwrap();
        raw.write_all(b"hello there\r\n\r\n").await.unwrap();

        let err = incoming.upgrade().await.err().expect("upgrade should fail");
        assert!(matches!(err, TransportError::UpgradeFailed(_)));
    }
}

//! Integration tests for the WebSocket transport.
//!
//! These spin up a real listener on an OS-assigned port and talk to it
//! with a `tokio-tungstenite` client.

#[cfg(feature = "websocket")]
mod websocket {
    use std::time::Duration;

    use futures_util::{SinkExt, StreamExt};
    use roomcast_transport::{Connection, Transport, WebSocketTransport};
    use tokio_tungstenite::tungstenite::Message;

    type ClientWs = tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >;

    async fn connect_client(addr: &str) -> ClientWs {
        let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
            .await
            .expect("client should connect");
        ws
    }

    /// Binds on port 0 and returns the transport plus its real address.
    async fn bind_any() -> (WebSocketTransport, String) {
        let transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport.local_addr().expect("local addr").to_string();
        (transport, addr)
    }

    #[tokio::test]
    async fn test_websocket_accept_and_exchange_text() {
        let (mut transport, addr) = bind_any().await;
        let server = tokio::spawn(async move {
            transport.accept().await.expect("should accept")
        });

        let mut client = connect_client(&addr).await;
        let conn = server.await.expect("task should complete");
        assert!(conn.id().into_inner() > 0);

        conn.send(r#"{"event":"hello"}"#).await.expect("send");
        let msg = client.next().await.unwrap().unwrap();
        assert_eq!(msg, Message::text(r#"{"event":"hello"}"#));

        client
            .send(Message::text("from client"))
            .await
            .unwrap();
        let received = conn.recv().await.expect("recv").expect("data");
        assert_eq!(received, b"from client");

        conn.close().await.expect("close should succeed");
    }

    #[tokio::test]
    async fn test_websocket_binary_frames_are_received() {
        let (mut transport, addr) = bind_any().await;
        let server = tokio::spawn(async move { transport.accept().await.unwrap() });

        let mut client = connect_client(&addr).await;
        let conn = server.await.unwrap();

        client
            .send(Message::Binary(b"{}".to_vec().into()))
            .await
            .unwrap();
        let received = conn.recv().await.unwrap().unwrap();
        assert_eq!(received, b"{}");
    }

    #[tokio::test]
    async fn test_websocket_recv_returns_none_on_client_close() {
        let (mut transport, addr) = bind_any().await;
        let server = tokio::spawn(async move { transport.accept().await.unwrap() });

        let mut client = connect_client(&addr).await;
        let conn = server.await.unwrap();

        client.send(Message::Close(None)).await.unwrap();

        let result = conn.recv().await.expect("recv should not error");
        assert!(result.is_none(), "should return None on client close");
    }

    #[tokio::test]
    async fn test_websocket_send_is_not_blocked_by_pending_recv() {
        // A reader parked in recv() must not hold up writers.
        let (mut transport, addr) = bind_any().await;
        let server = tokio::spawn(async move { transport.accept().await.unwrap() });

        let mut client = connect_client(&addr).await;
        let conn = std::sync::Arc::new(server.await.unwrap());

        let reader = std::sync::Arc::clone(&conn);
        let pending = tokio::spawn(async move { reader.recv().await });
        tokio::time::sleep(Duration::from_millis(10)).await;

        tokio::time::timeout(Duration::from_secs(1), conn.send("ping"))
            .await
            .expect("send must not wait on recv")
            .expect("send");
        let msg = client.next().await.unwrap().unwrap();
        assert_eq!(msg, Message::text("ping"));

        pending.abort();
    }

    #[tokio::test]
    async fn test_connection_ids_are_unique() {
        let (mut transport, addr) = bind_any().await;
        let server = tokio::spawn(async move {
            let a = transport.accept().await.unwrap();
            let b = transport.accept().await.unwrap();
            (a, b)
        });

        let _c1 = connect_client(&addr).await;
        let _c2 = connect_client(&addr).await;
        let (a, b) = server.await.unwrap();

        assert_ne!(a.id(), b.id());
    }

    #[tokio::test]
    async fn test_websocket_silent_tcp_peer_does_not_block_accept() {
        let (mut transport, addr) = bind_any().await;
        let _silent = tokio::net::TcpStream::connect(&addr)
            .await
            .expect("tcp connect");
        let server = tokio::spawn(async move { transport.accept().await.unwrap() });

        let (_client, conn) = tokio::time::timeout(Duration::from_secs(3), async {
            let client = connect_client(&addr).await;
            (client, server.await.unwrap())
        })
        .await
        .expect("accept should not wait on a peer that never upgrades");

        assert!(conn.id().into_inner() > 0);
    }

    #[tokio::test]
    async fn test_websocket_pong_resets_idle_for() {
        let (mut transport, addr) = bind_any().await;
        let server = tokio::spawn(async move { transport.accept().await.unwrap() });

        let mut client = connect_client(&addr).await;
        let conn = server.await.unwrap();

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(conn.idle_for() >= Duration::from_millis(300));

        conn.ping().await.expect("ping");
        // Polling the client reads the ping and flushes its pong.
        tokio::spawn(async move { while client.next().await.is_some() {} });
        // recv consumes the pong but only returns for data frames.
        let _ = tokio::time::timeout(Duration::from_millis(100), conn.recv()).await;

        assert!(conn.idle_for() < Duration::from_millis(250));
    }
}

#![allow(dead_code)]

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

async fn read_request_head(socket: &mut tokio::net::TcpStream) {
    let mut received = Vec::new();
    let mut buf = [0_u8; 1024];
    loop {
        let read = socket.read(&mut buf).await.expect("read");
        if read == 0 {
            break;
        }
        received.extend_from_slice(&buf[..read]);
        if received.windows(4).any(|window| window == b"\r\n\r\n") {
            break;
        }
    }
}

/// Serves one response whose body is written as the given HTTP chunks.
pub async fn spawn_chunked_server(content_type: &'static str, chunks: Vec<&'static str>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");
        read_request_head(&mut socket).await;

        let headers = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: {content_type}\r\nTransfer-Encoding: chunked\r\n\r\n"
        );
        socket.write_all(headers.as_bytes()).await.expect("headers");
        for chunk in chunks {
            socket
                .write_all(format!("{:X}\r\n", chunk.len()).as_bytes())
                .await
                .expect("chunk len");
            socket.write_all(chunk.as_bytes()).await.expect("chunk data");
            socket.write_all(b"\r\n").await.expect("chunk end");
        }
        socket.write_all(b"0\r\n\r\n").await.expect("eof");
        let _ = socket.shutdown().await;
    });

    format!("http://{}", addr)
}

/// Accepts a connection, reads the request and never answers.
pub async fn spawn_silent_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                read_request_head(&mut socket).await;
                tokio::time::sleep(std::time::Duration::from_secs(30)).await;
                drop(socket);
            });
        }
    });

    format!("http://{}", addr)
}

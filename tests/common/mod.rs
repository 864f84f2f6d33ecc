//! Shared fixtures for the pipeline integration tests.
//!
//! `serve_once()` stands up a throwaway HTTP endpoint on localhost that
//! answers a single request with a canned status and body, standing in for
//! the market listing provider.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Serve exactly one HTTP response and return the URL to request.
pub async fn serve_once(status: &str, body: &str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );

    tokio::spawn(async move {
        if let Ok((mut socket, _)) = listener.accept().await {
            let mut buf = vec![0u8; 8192];
            let _ = socket.read(&mut buf).await;
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    format!("http://{}/api/v3/coins/markets", addr)
}

/// URL on a port nothing listens on.
pub async fn closed_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/api/v3/coins/markets", addr)
}

/// Three-coin provider response.
pub fn three_coin_body() -> String {
    serde_json::json!([
        {
            "id": "bitcoin",
            "symbol": "btc",
            "name": "Bitcoin",
            "current_price": 50000,
            "market_cap": 900000000000u64,
            "total_volume": 25000000000u64,
            "price_change_percentage_24h": 2.5
        },
        {
            "id": "ethereum",
            "symbol": "eth",
            "name": "Ethereum",
            "current_price": 3000,
            "market_cap": 400000000000u64,
            "total_volume": 12000000000u64,
            "price_change_percentage_24h": -1.1
        },
        {
            "id": "tether",
            "symbol": "usdt",
            "name": "Tether",
            "current_price": 1,
            "market_cap": 90000000000u64,
            "total_volume": 40000000000u64,
            "price_change_percentage_24h": 0.0
        }
    ])
    .to_string()
}

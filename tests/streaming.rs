//! End-to-end tests over loopback TCP

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use framecast::protocol::encode_selection;
use framecast::{
    ChannelRegistry, FrameClient, FrameServer, MemorySource, RegistryConfig, ServerConfig,
};

const INTERVAL: Duration = Duration::from_millis(20);

async fn start_server(
    registry: Arc<ChannelRegistry>,
    config: ServerConfig,
) -> (SocketAddr, Arc<FrameServer>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = Arc::new(FrameServer::with_registry(config.bind(addr), registry));

    let serving = Arc::clone(&server);
    tokio::spawn(async move { serving.serve(listener).await });

    (addr, server)
}

fn registry_with(frames: Vec<String>, capacity: usize) -> Arc<ChannelRegistry> {
    let registry = Arc::new(ChannelRegistry::new(
        1,
        RegistryConfig::default().buffer_capacity(capacity),
    ));
    registry
        .spawn_producer(0, MemorySource::from_frames("test", frames))
        .unwrap();
    registry
}

async fn read_frame(client: &mut FrameClient) -> String {
    let frame = tokio::time::timeout(Duration::from_secs(5), client.next_frame())
        .await
        .expect("timed out waiting for a frame")
        .unwrap()
        .expect("server closed the stream");
    String::from_utf8(frame.to_vec()).unwrap()
}

async fn expect_closed_without_data(mut stream: TcpStream) {
    let mut received = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut received))
        .await
        .expect("server did not close the connection")
        .unwrap();
    assert!(received.is_empty(), "unexpected data: {:?}", received);
}

#[tokio::test]
async fn test_looping_source_end_to_end() {
    let registry = registry_with(vec!["A".into(), "B".into(), "C".into()], 100);
    let config = ServerConfig::default().frame_interval(INTERVAL);
    let (addr, _server) = start_server(registry, config).await;

    let mut client = FrameClient::connect(addr, 0).await.unwrap();

    let start = Instant::now();
    let mut seen = Vec::new();
    for _ in 0..7 {
        seen.push(read_frame(&mut client).await);
    }

    assert_eq!(seen, ["A\n", "B\n", "C\n", "A\n", "B\n", "C\n", "A\n"]);
    // Six pauses between seven frames
    assert!(start.elapsed() >= INTERVAL * 6);
}

#[tokio::test]
async fn test_raw_wire_format() {
    let registry = registry_with(vec!["ab\ncd".into()], 4);
    let config = ServerConfig::default().frame_interval(INTERVAL);
    let (addr, _server) = start_server(registry, config).await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(&[0, 0, 0, 0]).await.unwrap();

    let mut buf = vec![0u8; 14];
    stream.read_exact(&mut buf).await.unwrap();
    assert_eq!(&buf, b"ab\ncd\n\x0cab\ncd\n\x0c");
}

#[tokio::test]
async fn test_invalid_channel_closes_connection() {
    let registry = registry_with(vec!["A".into()], 4);
    let config = ServerConfig::default().frame_interval(INTERVAL);
    let (addr, server) = start_server(registry, config).await;

    for requested in [1, -1] {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(&encode_selection(requested)).await.unwrap();
        expect_closed_without_data(stream).await;
    }

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(server.stats().invalid_selections, 2);
}

#[tokio::test]
async fn test_selection_timeout_closes_connection() {
    let registry = registry_with(vec!["A".into()], 4);
    let config = ServerConfig::default()
        .frame_interval(INTERVAL)
        .selection_timeout(Duration::from_millis(100));
    let (addr, _server) = start_server(registry, config).await;

    let stream = TcpStream::connect(addr).await.unwrap();
    expect_closed_without_data(stream).await;
}

#[tokio::test]
async fn test_clients_on_one_channel_share_frames() {
    let frames: Vec<String> = (0..1000).map(|i| i.to_string()).collect();
    let registry = registry_with(frames, 4);
    let config = ServerConfig::default().frame_interval(INTERVAL);
    let (addr, _server) = start_server(registry, config).await;

    let first = FrameClient::connect(addr, 0).await.unwrap();
    let second = FrameClient::connect(addr, 0).await.unwrap();

    let read_numbers = |mut client: FrameClient| async move {
        let mut numbers = Vec::new();
        for _ in 0..15 {
            let frame = read_frame(&mut client).await;
            numbers.push(frame.trim().parse::<u32>().unwrap());
        }
        numbers
    };

    let (a, b) = tokio::join!(read_numbers(first), read_numbers(second));

    // Each client sees its share in source order
    assert!(a.windows(2).all(|w| w[0] < w[1]));
    assert!(b.windows(2).all(|w| w[0] < w[1]));

    // No frame reaches both clients
    let mut all: Vec<u32> = a.iter().chain(b.iter()).copied().collect();
    all.sort_unstable();
    all.dedup();
    assert_eq!(all.len(), 30);

    // The clients take turns rather than one draining the channel first
    let last_a = *a.last().unwrap();
    let last_b = *b.last().unwrap();
    assert!(b.iter().any(|&n| n < last_a));
    assert!(a.iter().any(|&n| n < last_b));
}

#[tokio::test]
async fn test_disconnect_leaves_other_sessions_running() {
    let frames: Vec<String> = (0..1000).map(|i| i.to_string()).collect();
    let registry = registry_with(frames, 4);
    let config = ServerConfig::default().frame_interval(INTERVAL);
    let (addr, server) = start_server(Arc::clone(&registry), config).await;

    let mut leaving = FrameClient::connect(addr, 0).await.unwrap();
    let mut staying = FrameClient::connect(addr, 0).await.unwrap();

    read_frame(&mut leaving).await;
    read_frame(&mut staying).await;
    drop(leaving);

    for _ in 0..5 {
        read_frame(&mut staying).await;
    }

    // The dropped session notices on its next write
    let deadline = Instant::now() + Duration::from_secs(5);
    while server.stats().active_connections != 1 && Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(server.stats().active_connections, 1);
    assert_eq!(registry.channel_stats(0).unwrap().active_sessions, 1);
    assert!(registry.channel_stats(0).unwrap().has_producer);
}

#[tokio::test]
async fn test_connection_limit_rejects_extra_clients() {
    let registry = registry_with(vec!["A".into()], 4);
    let config = ServerConfig::default()
        .frame_interval(INTERVAL)
        .max_connections(1);
    let (addr, server) = start_server(registry, config).await;

    let mut admitted = FrameClient::connect(addr, 0).await.unwrap();
    assert_eq!(read_frame(&mut admitted).await, "A\n");

    // Closed before the selection is even read
    let rejected = TcpStream::connect(addr).await.unwrap();
    expect_closed_without_data(rejected).await;
    assert_eq!(server.stats().rejected_connections, 1);

    // The admitted client keeps streaming
    assert_eq!(read_frame(&mut admitted).await, "A\n");
}

#[tokio::test]
async fn test_file_channels_until_shutdown() {
    let path = std::env::temp_dir().join(format!("framecast-e2e-{}.txt", std::process::id()));
    tokio::fs::write(&path, "---FRAME---\n o\n/|\\\n---FRAME---\n\\o/\n |\n---FRAME---\n")
        .await
        .unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let config = ServerConfig::with_addr(addr)
        .frame_interval(INTERVAL)
        .channel(&path);
    let server = Arc::new(FrameServer::new(config).unwrap());

    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let serving = Arc::clone(&server);
    let task = tokio::spawn(async move {
        serving
            .serve_until(listener, async {
                let _ = stop_rx.await;
            })
            .await
    });

    let mut client = FrameClient::connect(addr, 0).await.unwrap();
    assert_eq!(read_frame(&mut client).await, " o\n/|\\\n");
    assert_eq!(read_frame(&mut client).await, "\\o/\n |\n");
    assert_eq!(read_frame(&mut client).await, " o\n/|\\\n");
    assert!(server.registry().channel_stats(0).unwrap().has_producer);

    stop_tx.send(()).unwrap();
    let result = tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("server did not stop")
        .unwrap();
    assert!(result.is_ok());

    // The channel is free again for the next serve
    assert!(!server.registry().channel_stats(0).unwrap().has_producer);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let serving = Arc::clone(&server);
    tokio::spawn(async move { serving.serve(listener).await });

    let mut client = FrameClient::connect(addr, 0).await.unwrap();
    read_frame(&mut client).await;
    assert!(server.registry().channel_stats(0).unwrap().has_producer);

    tokio::fs::remove_file(&path).await.unwrap();
}

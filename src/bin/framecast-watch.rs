//! Terminal viewer for a frame server channel
//!
//! Run with: framecast-watch -a ADDRESS -p PORT -ch CHANNEL
//!
//! Each received frame replaces the previous one on screen.

use std::io::Write;

use framecast::FrameClient;

const CLEAR_SCREEN: &[u8] = b"\x1b[2J\x1b[H";

fn print_usage() {
    eprintln!("Usage: framecast-watch -a ADDRESS -p PORT -ch CHANNEL");
    eprintln!();
    eprintln!("  -a ADDRESS  Server address (default 127.0.0.1)");
    eprintln!("  -p PORT     Server port (default 12345)");
    eprintln!("  -ch CHANNEL Channel index, starting at 0 (default 0)");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }

    let mut address = "127.0.0.1".to_string();
    let mut port = framecast::protocol::constants::DEFAULT_PORT;
    let mut channel = 0i32;

    let mut iter = args.iter();
    while let Some(flag) = iter.next() {
        let Some(value) = iter.next() else {
            eprintln!("Error: missing value for {}", flag);
            print_usage();
            std::process::exit(1);
        };
        match flag.as_str() {
            "-a" => address = value.clone(),
            "-p" => port = value.parse()?,
            "-ch" => channel = value.parse()?,
            _ => {
                eprintln!("Error: unknown argument {}", flag);
                print_usage();
                std::process::exit(1);
            }
        }
    }

    // Logs go to stderr so they do not mix with frames
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("framecast=info".parse()?),
        )
        .init();

    let mut client = FrameClient::connect((address.as_str(), port), channel).await?;
    tracing::info!(address = %address, port = port, channel = channel, "Connected");

    let mut stdout = std::io::stdout();
    let mut frames = 0u64;
    while let Some(frame) = client.next_frame().await? {
        stdout.write_all(CLEAR_SCREEN)?;
        stdout.write_all(&frame)?;
        stdout.flush()?;
        frames += 1;
    }

    tracing::info!(frames = frames, "Server closed the connection");
    Ok(())
}

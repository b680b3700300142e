//! Frame streaming server
//!
//! Run with: framecast-server -p PORT -s COUNT -ch1 FILE [-ch2 FILE] ...
//!
//! Examples:
//!   framecast-server -p 12345 -s 1 -ch1 demos/stickman.txt
//!   framecast-server -p 12345 -s 2 -ch1 demos/stickman.txt -ch2 other.txt
//!
//! Watch a channel with:
//!   framecast-watch -a 127.0.0.1 -p 12345 -ch 0

use std::path::PathBuf;

use framecast::{FrameServer, ServerConfig};

struct Args {
    port: u16,
    stream_count: usize,
    files: Vec<Option<PathBuf>>,
}

fn print_usage() {
    eprintln!("Usage: framecast-server -p PORT -s COUNT -ch1 FILE [-ch2 FILE] ...");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -p PORT     Port to listen on (default 12345)");
    eprintln!("  -s COUNT    Number of channels to serve (default 1)");
    eprintln!("  -chN FILE   Frame file for channel N (1-based)");
    eprintln!();
    eprintln!("Frames in FILE are separated by lines starting with ---FRAME---");
}

fn parse_args(args: &[String]) -> Result<Args, String> {
    let mut parsed = Args {
        port: framecast::protocol::constants::DEFAULT_PORT,
        stream_count: 1,
        files: Vec::new(),
    };

    let mut iter = args.iter();
    while let Some(flag) = iter.next() {
        let mut value = || {
            iter.next()
                .ok_or_else(|| format!("Missing value for {}", flag))
        };

        if flag == "-p" {
            let v = value()?;
            parsed.port = v.parse().map_err(|_| format!("Invalid port: {}", v))?;
        } else if flag == "-s" {
            let v = value()?;
            parsed.stream_count = v
                .parse()
                .map_err(|_| format!("Invalid stream count: {}", v))?;
        } else if let Some(n) = flag.strip_prefix("-ch") {
            let index = n
                .parse::<usize>()
                .ok()
                .filter(|&n| n >= 1)
                .ok_or_else(|| format!("Invalid channel flag: {}", flag))?;
            let path = PathBuf::from(value()?);
            if parsed.files.len() < index {
                parsed.files.resize(index, None);
            }
            parsed.files[index - 1] = Some(path);
        } else {
            return Err(format!("Unknown argument: {}", flag));
        }
    }

    if parsed.stream_count == 0 {
        return Err("Stream count must be at least 1".into());
    }

    Ok(parsed)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.is_empty() || args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }

    let args = match parse_args(&args) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    };

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("framecast=debug".parse()?)
                .add_directive("framecast_server=debug".parse()?),
        )
        .init();

    let mut config = ServerConfig::default().port(args.port);
    for i in 0..args.stream_count {
        match args.files.get(i).cloned().flatten() {
            Some(path) => config = config.channel(path),
            None => {
                eprintln!("Error: no frame file given for channel {} (-ch{})", i + 1, i + 1);
                std::process::exit(1);
            }
        }
    }

    let server = FrameServer::new(config)?;
    server
        .run_until(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    let stats = server.stats();
    tracing::info!(
        connections = stats.total_connections,
        rejected = stats.rejected_connections,
        invalid_selections = stats.invalid_selections,
        uptime_secs = stats.uptime.as_secs(),
        "Server stopped"
    );

    Ok(())
}

use std::io::{BufRead, BufReader, Write};
use std::net::TcpStream;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;

/// Periodically fetches the temperature attribute and prints it
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Address of the attribute service
    #[arg(long, default_value = "127.0.0.1:1620")]
    addr: String,
    /// Seconds between polls
    #[arg(long, default_value_t = 3)]
    interval: u64,
}

fn main() {
    let args = Args::parse();
    let interval = Duration::from_secs(args.interval);
    loop {
        let start = Instant::now();
        match fetch_temperature(&args.addr) {
            Ok(value) => {
                print!("Temperature: {value}\r");
                let _ = std::io::stdout().flush();
            }
            Err(e) => eprintln!("Failed to read temperature: {e}"),
        }
        let elapsed = start.elapsed();
        if elapsed < interval {
            thread::sleep(interval - elapsed);
        }
    }
}

fn fetch_temperature(addr: &str) -> std::io::Result<String> {
    let mut stream = TcpStream::connect(addr)?;
    stream.set_read_timeout(Some(Duration::from_secs(2)))?;
    stream.write_all(b"get temperature\n")?;
    let mut reply = String::new();
    BufReader::new(stream).read_line(&mut reply)?;
    let reply = reply.trim();
    if let Some(reason) = reply.strip_prefix("err ") {
        return Err(std::io::Error::other(reason.to_string()));
    }
    Ok(reply.to_string())
}

//! Line-oriented attribute transport.
//!
//! Requests are `get <attribute>` or `set <attribute> <value>`, one per
//! line; replies are the value, `ok`, or `err <reason>`. The transport
//! carries no protocol logic of its own; everything funnels through the
//! controller lock.

use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::Duration;

use crate::control::{Attribute, Controller};

#[derive(Debug, PartialEq, Eq)]
pub enum Request {
    Get(Attribute),
    Set(Attribute, String),
}

pub fn parse_request(line: &str) -> Result<Request, String> {
    let mut parts = line.split_whitespace();
    match parts.next() {
        Some("get") => {
            let attribute = parts
                .next()
                .ok_or_else(|| "usage: get <attribute>".to_string())?
                .parse::<Attribute>()
                .map_err(|e| e.to_string())?;
            if parts.next().is_some() {
                return Err("usage: get <attribute>".into());
            }
            Ok(Request::Get(attribute))
        }
        Some("set") => {
            let attribute = parts
                .next()
                .ok_or_else(|| "usage: set <attribute> <value>".to_string())?
                .parse::<Attribute>()
                .map_err(|e| e.to_string())?;
            let value = parts
                .next()
                .ok_or_else(|| "usage: set <attribute> <value>".to_string())?;
            if parts.next().is_some() {
                return Err("usage: set <attribute> <value>".into());
            }
            Ok(Request::Set(attribute, value.to_string()))
        }
        Some(verb) => Err(format!("unknown request: {verb}")),
        None => Err("empty request".into()),
    }
}

pub fn service_thread(listen: String, running: Arc<AtomicBool>, controller: Arc<Controller>) {
    log::info!("[NET] Attribute service starting on {listen}");
    let listener = match TcpListener::bind(&listen) {
        Ok(listener) => listener,
        Err(e) => {
            log::error!("[NET] Failed to bind {listen}: {e}");
            return;
        }
    };
    if let Err(e) = listener.set_nonblocking(true) {
        log::error!("[NET] Failed to configure listener: {e}");
        return;
    }
    while running.load(Ordering::Relaxed) {
        match listener.accept() {
            Ok((stream, peer)) => {
                log::info!("[NET] Client connected: {peer}");
                if let Err(e) = handle_client(stream, &running, &controller) {
                    log::warn!("[NET] Client {peer} dropped: {e}");
                } else {
                    log::info!("[NET] Client disconnected: {peer}");
                }
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock => {
                std::thread::sleep(Duration::from_millis(100));
            }
            Err(e) => {
                log::error!("[NET] Accept failed: {e}");
                std::thread::sleep(Duration::from_secs(1));
            }
        }
    }
    log::info!("[NET] Attribute service exiting");
}

fn handle_client(
    stream: TcpStream,
    running: &AtomicBool,
    controller: &Controller,
) -> std::io::Result<()> {
    stream.set_nonblocking(false)?;
    stream.set_read_timeout(Some(Duration::from_secs(1)))?;
    let mut writer = stream.try_clone()?;
    let mut reader = BufReader::new(stream);
    let mut line = String::new();
    while running.load(Ordering::Relaxed) {
        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {
                let reply = respond(controller, line.trim());
                writer.write_all(reply.as_bytes())?;
                writer.write_all(b"\n")?;
                writer.flush()?;
            }
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

fn respond(controller: &Controller, line: &str) -> String {
    log::debug!("[NET] Request: {line}");
    match parse_request(line) {
        Ok(Request::Get(attribute)) => match controller.get(attribute) {
            Ok(value) => value,
            Err(e) => format!("err {e}"),
        },
        Ok(Request::Set(attribute, value)) => match controller.set(attribute, &value) {
            Ok(()) => "ok".into(),
            Err(e) => format!("err {e}"),
        },
        Err(reason) => format!("err {reason}"),
    }
}

#[cfg(test)]
mod tests {
    use super::{Request, parse_request};
    use crate::control::Attribute;

    #[test]
    fn parses_get_and_set() {
        assert_eq!(
            parse_request("get temperature").unwrap(),
            Request::Get(Attribute::Temperature)
        );
        assert_eq!(
            parse_request("set clk_pin 48").unwrap(),
            Request::Set(Attribute::ClkPin, "48".into())
        );
    }

    #[test]
    fn rejects_malformed_requests() {
        assert!(parse_request("").is_err());
        assert!(parse_request("get").is_err());
        assert!(parse_request("get temperature now").is_err());
        assert!(parse_request("set dq_pin").is_err());
        assert!(parse_request("set dq_pin 49 50").is_err());
        assert!(parse_request("delete dq_pin").is_err());
        assert!(parse_request("get humidity").is_err());
    }
}

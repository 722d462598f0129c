//! chatwire CLI
//!
//! Usage: `chatwire-client <room> [config.yaml]`
//! - Each stdin line is sent as a chat message
//! - `/typing N`, `/read ID...`, `/ping`, `/quit`
//! - Inbound events are printed to stdout

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::Duration;
use tracing_subscriber::{fmt, EnvFilter};

use chatwire_client::config::{self, ClientConfig};
use chatwire_client::{ClientEvent, EventKind, MessagingClient, SendOptions};

enum Command<'a> {
    Say(&'a str),
    Typing(u64),
    Read(Vec<&'a str>),
    Ping,
    Quit,
}

fn parse_command(line: &str) -> Option<Command<'_>> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Some(Command::Say(line));
    };

    let mut parts = rest.split_whitespace();
    match parts.next()? {
        "typing" => Some(Command::Typing(parts.next().and_then(|n| n.parse().ok()).unwrap_or(0))),
        "read" => Some(Command::Read(parts.collect())),
        "ping" => Some(Command::Ping),
        "quit" => Some(Command::Quit),
        _ => Some(Command::Say(line)),
    }
}

fn print_event(event: &ClientEvent) {
    match event {
        ClientEvent::Message(env) => {
            println!("[{}] {}: {}", env.message_type(), env.sender.name, env.body.text().unwrap_or_default());
        }
        ClientEvent::Typing(env) => println!("* {} is typing", env.sender.name),
        ClientEvent::ReadReceipt(env) => println!("* read by {}", env.sender.name),
        ClientEvent::Connect { room } => println!("* connected to {room}"),
        ClientEvent::Disconnect(reason) => println!("* disconnected: {reason:?}"),
        ClientEvent::Error(e) => println!("! {} ({})", e.message, e.code.as_deref().unwrap_or("-")),
    }
}

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let mut args = std::env::args().skip(1);
    let Some(room) = args.next() else {
        eprintln!("usage: chatwire-client <room> [config.yaml]");
        std::process::exit(2);
    };

    let cfg = match args.next() {
        Some(path) => config::load_from_file(&path).expect("config load failed"),
        None => ClientConfig::default(),
    };

    let client = MessagingClient::new(cfg).expect("client init failed");
    for kind in EventKind::ALL {
        client.on(kind, print_event);
    }

    tracing::info!(%room, user = %client.identity().id, "chatwire-client starting");
    if let Err(e) = client.connect(&room).await {
        // auto-reconnect may still bring the session up
        tracing::error!(%room, error = %e, "initial connect failed");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        match parse_command(&line) {
            Some(Command::Say(text)) => {
                client.send_message(text, SendOptions::default());
            }
            Some(Command::Typing(n)) => client.send_typing_status(n),
            Some(Command::Read(ids)) => client.send_read_receipt(ids),
            Some(Command::Ping) => client.send_ping(),
            Some(Command::Quit) => break,
            None => {}
        }
    }

    client.disconnect();
    // let the close frame go out
    tokio::time::sleep(Duration::from_millis(200)).await;
}

//! Console client for manual testing against a running game server
//!
//! Usage:
//! ```bash
//! # Host a new room
//! cargo run --example console_client Alice localhost
//!
//! # Join an existing room
//! cargo run --example console_client Bob localhost r-1
//! ```
//!
//! Commands read from stdin:
//! - `move <x> <y>`
//! - `start [black|white|random]`
//! - `chat <message>`
//! - `leave`
//! - `quit`

use othello_net_client::{
    ClientConfig, ConnectRequest, FirstTurn, SessionController, SessionEvent, View,
};
use othello_net_protocol::close_codes;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let name = args.next().unwrap_or_else(|| "Player".to_string());
    let network = args.next().unwrap_or_else(|| "localhost".to_string());
    let request = match args.next() {
        Some(room) => ConnectRequest::guest(name, network, room),
        None => ConnectRequest::host(name, network),
    };

    let (mut controller, mut events) = match SessionController::new(ClientConfig::default()) {
        Ok(pair) => pair,
        Err(e) => {
            eprintln!("Failed to create controller: {}", e);
            return;
        }
    };

    println!("Connecting as {}...", request.name);
    if let Err(e) = controller.connect(request).await {
        eprintln!("Connect failed: {}", e);
        return;
    }
    println!("Waiting for an opponent");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            _ = controller.process_next() => {}

            line = lines.next_line() => {
                match line {
                    Ok(Some(line)) => {
                        if !run_command(&mut controller, line.trim()).await {
                            break;
                        }
                    }
                    _ => break,
                }
            }
        }

        if !print_events(&controller, &mut events) {
            break;
        }
    }

    controller.request_leave(close_codes::NORMAL).await;
}

/// Returns false when the user asked to quit
async fn run_command(controller: &mut SessionController, line: &str) -> bool {
    let mut parts = line.splitn(2, ' ');
    let command = parts.next().unwrap_or_default();
    let rest = parts.next().unwrap_or_default().trim();

    match command {
        "move" => {
            let coords: Vec<u8> = rest
                .split_whitespace()
                .filter_map(|s| s.parse().ok())
                .collect();
            match coords.as_slice() {
                [x, y] => controller.request_move(*x, *y).await,
                _ => println!("usage: move <x> <y>"),
            }
        }
        "start" => {
            let choice = match rest {
                "white" => FirstTurn::White,
                "random" => FirstTurn::Random,
                _ => FirstTurn::Black,
            };
            let first = controller.set_first_turn(choice);
            println!("{} moves first", first);
            controller.request_start().await;
        }
        "chat" => controller.send_chat(rest).await,
        "leave" => {
            controller.request_leave(close_codes::NORMAL).await;
        }
        "quit" => return false,
        "" => {}
        other => println!("unknown command: {}", other),
    }

    true
}

/// Prints pending UI events; returns false once the session is over
fn print_events(
    controller: &SessionController,
    events: &mut mpsc::UnboundedReceiver<SessionEvent>,
) -> bool {
    let mut running = true;

    while let Ok(event) = events.try_recv() {
        match event {
            SessionEvent::Navigate(View::Game) => {
                let session = controller.session();
                println!(
                    "Game started in room {}: you are {:?} against {}",
                    session.room_id(),
                    session.self_color(),
                    session.opponent_identity()
                );
            }
            SessionEvent::Navigate(View::Home) => {
                println!("Session ended");
                running = false;
            }
            SessionEvent::Notice(notice) => println!("! {}", notice),
            SessionEvent::Chat { from, message } => println!("<{}> {}", from, message),
            SessionEvent::Rooms(rooms) => {
                for room in rooms {
                    println!("room {}: {} vs {}", room.id, room.black, room.white);
                }
            }
        }
    }

    running
}

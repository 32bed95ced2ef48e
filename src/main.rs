use minefield::{Event, Session, Settings, terminal};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

async fn print_board(session: &Session) {
    let board = session.board();
    let board = board.lock().await;
    println!("{}", terminal::render_board(&board));
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let settings = Settings::from_env();
    info!("Loaded settings: {:?}", settings);

    let mut session = Session::start(&settings);
    println!("{}\n", terminal::HELP);
    print_board(&session).await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                error!("Failed to read input: {}", e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        if line.trim() == "help" {
            println!("{}", terminal::HELP);
            continue;
        }

        let command = match terminal::parse_line(&line) {
            Ok(command) => command,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };

        match session.apply(command).await {
            Ok(Event::Quit) => {
                println!("{}", terminal::describe(&Event::Quit));
                return;
            }
            Ok(event) => {
                print_board(&session).await;
                let message = terminal::describe(&event);
                if !message.is_empty() {
                    println!("{message}");
                }
            }
            Err(e) => println!("{e}"),
        }
    }

    if let Err(e) = session.apply(minefield::Command::Quit).await {
        error!("Failed to close session: {}", e);
    }
}

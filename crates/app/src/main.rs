mod args;
mod console;

use std::io;
use std::sync::Arc;

use services::{Clock, GenerationError, OpenAiCompletionClient, QuizGenerator, QuizService};
use storage::Storage;
use tracing_subscriber::EnvFilter;

use crate::args::{Command, print_usage};
use crate::console::{Console, print_history};

fn init_tracing() {
    // Logs go to stderr so they never interleave with the quiz on stdout.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    init_tracing();

    let argv: Vec<String> = std::env::args().skip(1).collect();
    let cmd = Command::parse(argv, std::env::var("TUTOR_HISTORY_PATH").ok()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    match cmd {
        Command::Help => {
            print_usage();
            Ok(())
        }
        Command::History(args) => {
            let storage = Storage::json(&args.history_path);
            let mut stdout = io::stdout().lock();
            print_history(&mut stdout, storage.history.as_ref(), args.topic.as_ref()).await
        }
        Command::Quiz(args) => {
            let client = OpenAiCompletionClient::from_env()?;
            if !client.enabled() {
                return Err(GenerationError::Disabled.into());
            }
            tracing::info!(model = client.model(), "completion client ready");

            let document = std::fs::read(&args.file).map_err(|e| {
                io::Error::new(e.kind(), format!("cannot read {}: {e}", args.file.display()))
            })?;

            let storage = Storage::json(&args.history_path);
            let service = QuizService::new(
                Clock::system(),
                QuizGenerator::new(Arc::new(client)),
                storage.history,
            );

            let mut console = Console::new(io::stdin().lock(), io::stdout().lock());
            console
                .run_quiz(&service, &document, args.difficulty)
                .await
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

mod app;
mod gemini;
mod models;
mod tui;
mod ui;

use std::time::Duration;

use app::App;
use color_eyre::eyre::Result;
use crossterm::event::{self, Event};
use gemini::{GeminiClient, GenerationError};
use models::QuizQuestion;
use tokio::sync::mpsc;

type GenerationOutcome = Result<Vec<QuizQuestion>, GenerationError>;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    env_logger::init();
    dotenvy::dotenv().ok();

    // Missing credential is fatal before the terminal is touched.
    let client = GeminiClient::from_env()?;

    let mut terminal = tui::init()?;
    let mut app = App::new();

    let res = run_app(&mut terminal, &mut app, client).await;

    tui::restore()?; // Ensure terminal is restored properly

    res
}

async fn run_app(terminal: &mut tui::Tui, app: &mut App, client: GeminiClient) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<GenerationOutcome>();

    while !app.exit {
        terminal.draw(|frame| ui::render(app, frame))?;
        app.tick();

        if event::poll(Duration::from_millis(16))? {
            if let Event::Key(key) = event::read()? {
                if let Some(request) = app.handle_key_event(key) {
                    spawn_generation(&client, &tx, request);
                }
            }
        }

        while let Ok(outcome) = rx.try_recv() {
            app.finish_generation(outcome);
        }
    }
    Ok(())
}

fn spawn_generation(
    client: &GeminiClient,
    tx: &mpsc::UnboundedSender<GenerationOutcome>,
    request: app::QuestionRequest,
) {
    let client = client.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let outcome = client.generate_questions(&request.missed_ids).await;
        let _ = tx.send(outcome);
    });
}

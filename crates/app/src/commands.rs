use chrono::Local;
use thiserror::Error;
use tracing::{info, warn};

use crate::cli::{Command, FilterArgs};
use crate::orchestrator::{Orchestrator, SessionError};
use crate::render;
use crate::shell::{self, ShellError};
use crate::state::AppState;
use ioa_core::CoreError;
use ioa_infra::api::SearchApiClient;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("invalid filter: {0}")]
    Filter(#[from] CoreError),
    #[error("session error: {0}")]
    Session(#[from] SessionError),
    #[error("search failed: {0}")]
    SearchFailed(String),
    #[error("shell error: {0}")]
    Shell(#[from] ShellError),
}

pub async fn run(command: Command, state: &AppState) -> Result<(), CommandError> {
    match command {
        Command::Search {
            query,
            filters,
            page,
            details,
        } => {
            let mut session = open_session(state, &filters)?;
            session.submit_search(&query).await;
            ensure_loaded(&session)?;
            if page > 1 {
                session.change_page(page).await?;
                ensure_loaded(&session)?;
            }
            print!("{}", render::results(session.state()));
            if let Some(id) = details {
                match session.state().records.iter().find(|tweet| tweet.tweetid == id) {
                    Some(tweet) => print!("\n{}", render::details(tweet)),
                    None => warn!(tweetid = %id, "tweet not on this page"),
                }
            }
        }
        Command::Insights { query, filters } => {
            let mut session = open_session(state, &filters)?;
            session.submit_search(&query).await;
            match &session.state().insights {
                Some(insights) if !insights.is_empty() => print!("{}", render::insights(insights)),
                _ => println!("No insights available"),
            }
        }
        Command::Export {
            query,
            filters,
            output,
        } => {
            let mut session = open_session(state, &filters)?;
            session.submit_search(&query).await;
            ensure_loaded(&session)?;
            session.stage_export().await;
            let dir = output.unwrap_or_else(|| state.config.export_dir.clone());
            let today = Local::now().date_naive();
            match session.export_csv(&dir, today).await? {
                Some(path) => println!("{}", path.display()),
                None => println!("Nothing to export"),
            }
        }
        Command::Suggestions => {
            let mut session = new_session(state);
            session.start().await;
            for tag in &session.state().hashtag_suggestions {
                println!("#{tag}");
            }
        }
        Command::Shell => {
            let session = new_session(state);
            shell::run(session, &state.config.export_dir).await?;
        }
    }
    Ok(())
}

fn new_session(state: &AppState) -> Orchestrator<SearchApiClient> {
    Orchestrator::new(state.api.clone(), state.config.export_page_delay)
        .with_export_max_pages(state.config.export_max_pages)
}

fn open_session(
    state: &AppState,
    filters: &FilterArgs,
) -> Result<Orchestrator<SearchApiClient>, CommandError> {
    let mut session = new_session(state);
    for field in filters.to_fields()? {
        session.change_filter(field)?;
    }
    info!(criteria = ?session.state().criteria, "filters staged");
    Ok(session)
}

fn ensure_loaded(session: &Orchestrator<SearchApiClient>) -> Result<(), CommandError> {
    match &session.state().error {
        Some(message) => {
            print!("{}", render::results(session.state()));
            Err(CommandError::SearchFailed(message.clone()))
        }
        None => Ok(()),
    }
}

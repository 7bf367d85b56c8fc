//! Interactive search session: filters are staged with their own commands
//! and only take effect on the next `search`.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Config, EditMode, Editor};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::orchestrator::{Orchestrator, SearchBackend, SessionError};
use crate::render;
use ioa_core::domain::search::CriteriaField;
use ioa_core::types::date_range::parse_date;
use ioa_core::types::sort::SortOrder;
use ioa_core::CoreError;

const HISTORY_FILE: &str = ".ioa_search_history";

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("readline error: {0}")]
    Readline(#[from] ReadlineError),
    #[error("{0}")]
    Session(#[from] SessionError),
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("{0}")]
    Usage(String),
}

#[derive(Debug, PartialEq, Eq)]
enum ShellCommand {
    Search(String),
    Page(u32),
    Next,
    Prev,
    Filter(CriteriaField),
    Filters,
    Clear,
    Show(String),
    Insights,
    Export(Option<PathBuf>),
    Suggest,
    Help,
    Quit,
}

pub async fn run<B: SearchBackend>(
    mut session: Orchestrator<B>,
    export_dir: &Path,
) -> Result<(), ShellError> {
    let config = Config::builder()
        .history_ignore_space(true)
        .history_ignore_dups(true)?
        .edit_mode(EditMode::Emacs)
        .build();
    let mut rl: Editor<(), DefaultHistory> = Editor::with_config(config)?;
    let history_path = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(HISTORY_FILE);
    let _ = rl.load_history(&history_path);

    session.start().await;
    info!(
        suggestions = session.state().hashtag_suggestions.len(),
        "shell session started"
    );
    println!("ioa-search shell. Type 'help' for commands, 'quit' to exit.");

    loop {
        match rl.readline(&prompt(&session)) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                rl.add_history_entry(line)?;
                debug!(command = %line, "shell command");
                match execute(&mut session, line, export_dir).await {
                    Ok(true) => {}
                    Ok(false) => break,
                    Err(err) => eprintln!("Error: {err}"),
                }
            }
            Err(ReadlineError::Interrupted) => println!("^C"),
            Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        }
    }

    if let Err(err) = rl.save_history(&history_path) {
        warn!(error = %err, "failed to save shell history");
    }
    Ok(())
}

fn prompt<B: SearchBackend>(session: &Orchestrator<B>) -> String {
    let state = session.state();
    if state.total_pages() > 0 {
        format!("ioa [{}/{}]> ", state.page, state.total_pages())
    } else {
        "ioa> ".to_string()
    }
}

async fn execute<B: SearchBackend>(
    session: &mut Orchestrator<B>,
    line: &str,
    export_dir: &Path,
) -> Result<bool, ShellError> {
    match parse_command(line)? {
        ShellCommand::Search(query) => {
            session.submit_search(&query).await;
            print!("{}", render::results(session.state()));
        }
        ShellCommand::Page(page) => {
            session.change_page(page).await?;
            print!("{}", render::results(session.state()));
        }
        ShellCommand::Next => {
            let page = session.state().page.saturating_add(1);
            session.change_page(page).await?;
            print!("{}", render::results(session.state()));
        }
        ShellCommand::Prev => {
            let page = session.state().page.saturating_sub(1);
            session.change_page(page).await?;
            print!("{}", render::results(session.state()));
        }
        ShellCommand::Filter(field) => {
            session.change_filter(field)?;
            print_filters(session);
        }
        ShellCommand::Filters => print_filters(session),
        ShellCommand::Clear => session.clear_search(),
        ShellCommand::Show(id) => {
            match session.state().records.iter().find(|tweet| tweet.tweetid == id) {
                Some(tweet) => print!("{}", render::details(tweet)),
                None => println!("No tweet {id} on this page"),
            }
        }
        ShellCommand::Insights => {
            session.fetch_query_insights().await;
            match &session.state().insights {
                Some(insights) if !insights.is_empty() => print!("{}", render::insights(insights)),
                _ => println!("No insights available"),
            }
        }
        ShellCommand::Export(dir) => {
            let dir = dir.unwrap_or_else(|| export_dir.to_path_buf());
            let pages = session.state().total_pages();
            if pages > 0 {
                println!("Fetching {pages} page(s) for export...");
            }
            session.stage_export().await;
            match session.export_csv(&dir, today()).await? {
                Some(path) => println!("Exported to {}", path.display()),
                None => println!("Nothing to export"),
            }
        }
        ShellCommand::Suggest => {
            let tags = &session.state().hashtag_suggestions;
            if tags.is_empty() {
                println!("No suggestions loaded");
            } else {
                let tags: Vec<String> = tags.iter().map(|tag| format!("#{tag}")).collect();
                println!("{}", tags.join(" "));
            }
        }
        ShellCommand::Help => print_help(),
        ShellCommand::Quit => return Ok(false),
    }
    Ok(true)
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn parse_command(input: &str) -> Result<ShellCommand, ShellError> {
    let input = input.trim();
    let (head, rest) = input.split_once(char::is_whitespace).unwrap_or((input, ""));
    let rest = rest.trim();
    let command = match head {
        "search" | "s" | "/" => ShellCommand::Search(rest.to_string()),
        "page" | "p" => {
            let page = rest
                .parse()
                .map_err(|_| ShellError::Usage(format!("invalid page: {rest}")))?;
            ShellCommand::Page(page)
        }
        "next" | "n" => ShellCommand::Next,
        "prev" => ShellCommand::Prev,
        "lang" => ShellCommand::Filter(CriteriaField::Language(optional(rest))),
        "from" => ShellCommand::Filter(CriteriaField::StartDate(optional_date(rest)?)),
        "to" => ShellCommand::Filter(CriteriaField::EndDate(optional_date(rest)?)),
        "sort" => ShellCommand::Filter(CriteriaField::Sort(rest.parse::<SortOrder>()?)),
        "tag" => ShellCommand::Filter(CriteriaField::AddHashtag(required(rest, "tag")?)),
        "untag" => ShellCommand::Filter(CriteriaField::RemoveHashtag(required(rest, "untag")?)),
        "filters" | "f" => ShellCommand::Filters,
        "clear" => ShellCommand::Clear,
        "show" => ShellCommand::Show(required(rest, "show")?),
        "insights" | "i" => ShellCommand::Insights,
        "export" => ShellCommand::Export(optional(rest).map(PathBuf::from)),
        "suggest" => ShellCommand::Suggest,
        "help" | "h" | "?" => ShellCommand::Help,
        "quit" | "exit" | "q" => ShellCommand::Quit,
        other => {
            return Err(ShellError::Usage(format!(
                "unknown command: {other}. Type 'help' for available commands."
            )));
        }
    };
    Ok(command)
}

/// `-` or nothing clears the value.
fn optional(value: &str) -> Option<String> {
    match value {
        "" | "-" => None,
        other => Some(other.to_string()),
    }
}

fn optional_date(value: &str) -> Result<Option<NaiveDate>, ShellError> {
    Ok(optional(value).as_deref().map(parse_date).transpose()?)
}

fn required(value: &str, command: &str) -> Result<String, ShellError> {
    if value.is_empty() {
        return Err(ShellError::Usage(format!("{command} needs an argument")));
    }
    Ok(value.to_string())
}

fn print_filters<B: SearchBackend>(session: &Orchestrator<B>) {
    let criteria = &session.state().criteria;
    let range = &criteria.date_range;
    let date = |value: Option<NaiveDate>| value.map_or_else(|| "-".to_string(), |d| d.to_string());
    println!("  language  {}", criteria.language.as_deref().unwrap_or("all"));
    println!("  from      {}", date(range.start()));
    println!("  to        {}", date(range.end()));
    if range.query_bounds().is_none() && !range.is_empty() {
        println!("            (date filter applies once both ends are set)");
    }
    println!("  sort      {}", criteria.sort);
    println!("  hashtags  {}", criteria.hashtags().join(", "));
}

fn print_help() {
    println!("Commands:");
    println!("  search <text>     submit a search (empty text matches everything)");
    println!("  page <n> | next | prev");
    println!("  lang <code|->     stage a language filter");
    println!("  from <date|->     stage a start date (YYYY-MM-DD)");
    println!("  to <date|->       stage an end date (YYYY-MM-DD)");
    println!("  sort <key>        default, accuracy, time, retweets, likes");
    println!("  tag <tag> | untag <tag>");
    println!("  filters           show staged filters");
    println!("  clear             clear the query text");
    println!("  show <tweetid>    full details for a tweet on this page");
    println!("  insights          charts for the current query");
    println!("  export [dir]      fetch every page of the last search and write CSV");
    println!("  suggest           popular hashtags");
    println!("  quit");
}

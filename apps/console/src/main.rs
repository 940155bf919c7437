use std::{collections::BTreeSet, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{navigation_for, AssetBrowser, BrowserEvent, HttpAssetDirectory, Session};
use shared::{
    domain::{AssetId, AssetState, CategoryId, SortField},
    protocol::{AssetPage, LoginRequest},
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast::error::RecvError,
};

mod config;

#[derive(Parser, Debug)]
struct Args {
    /// Backend base URL; falls back to console.toml / CONSOLE__SERVER_URL.
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    username: Option<String>,
    #[arg(long)]
    password: String,
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Search(String),
    Page(u32),
    States(BTreeSet<AssetState>),
    Categories(BTreeSet<CategoryId>),
    Sort(SortField),
    Open(AssetId),
    Close,
    Refresh,
    Quit,
}

fn parse_state(token: &str) -> Result<AssetState, String> {
    match token.to_ascii_lowercase().as_str() {
        "assigned" => Ok(AssetState::Assigned),
        "available" => Ok(AssetState::Available),
        "unavailable" => Ok(AssetState::Unavailable),
        "waiting" => Ok(AssetState::WaitingForRecycling),
        "recycled" => Ok(AssetState::Recycled),
        other => Err(format!("unknown state '{other}'")),
    }
}

fn parse_sort_field(token: &str) -> Result<SortField, String> {
    match token.to_ascii_lowercase().as_str() {
        "code" => Ok(SortField::AssetCode),
        "name" => Ok(SortField::Name),
        "category" => Ok(SortField::Category),
        "state" => Ok(SortField::State),
        other => Err(format!("unknown sort column '{other}'")),
    }
}

fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };
    match verb {
        "search" => Ok(Command::Search(rest.to_string())),
        "page" => rest
            .parse::<u32>()
            .map(Command::Page)
            .map_err(|_| format!("invalid page '{rest}'")),
        "states" => {
            if rest.is_empty() {
                return Ok(Command::States(BTreeSet::new()));
            }
            rest.split(',')
                .map(|token| parse_state(token.trim()))
                .collect::<Result<BTreeSet<_>, _>>()
                .map(Command::States)
        }
        "categories" => {
            if rest.is_empty() {
                return Ok(Command::Categories(BTreeSet::new()));
            }
            rest.split(',')
                .map(|token| {
                    token
                        .trim()
                        .parse::<i64>()
                        .map(CategoryId)
                        .map_err(|_| format!("invalid category id '{token}'"))
                })
                .collect::<Result<BTreeSet<_>, _>>()
                .map(Command::Categories)
        }
        "sort" => parse_sort_field(rest).map(Command::Sort),
        "open" => rest
            .parse::<i64>()
            .map(|id| Command::Open(AssetId(id)))
            .map_err(|_| format!("invalid asset id '{rest}'")),
        "close" => Ok(Command::Close),
        "refresh" => Ok(Command::Refresh),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(format!("unknown command '{other}'")),
    }
}

fn render_page(page: &AssetPage, current_page: u32) {
    if page.items.is_empty() {
        println!("No assets to display.");
        return;
    }
    println!(
        "{:<12} {:<32} {:<16} {}",
        "Asset Code", "Asset Name", "Category", "State"
    );
    for asset in &page.items {
        println!(
            "{:<12} {:<32} {:<16} {}",
            asset.asset_code,
            asset.name,
            asset.category.name,
            asset.state.label()
        );
    }
    println!("page {current_page} of {}", page.pagination.total_pages);
}

/// A lagged event stream skips missed events but keeps delivering; only a
/// closed stream ends the loop.
fn recoverable_recv_error(err: &RecvError) -> bool {
    matches!(err, RecvError::Lagged(_))
}

async fn handle_command(browser: &Arc<AssetBrowser>, command: Command) -> Result<bool> {
    match command {
        Command::Search(text) => browser.set_search(text).await,
        Command::Page(page) => {
            if let Err(err) = browser.set_page(page).await {
                println!("{err}");
            }
        }
        Command::States(states) => browser.set_selected_states(states).await,
        Command::Categories(ids) => browser.set_selected_category_ids(ids).await,
        Command::Sort(field) => browser.toggle_sort(field).await,
        Command::Open(asset_id) => match browser.open_asset(asset_id).await {
            Ok(detail) => {
                println!("{} — {}", detail.summary.asset_code, detail.summary.name);
                println!("  category:  {}", detail.summary.category.name);
                println!("  state:     {}", detail.summary.state.label());
                if let Some(spec) = &detail.specification {
                    println!("  spec:      {spec}");
                }
                println!("  installed: {}", detail.installed_date.date_naive());
                if let Some(location) = &detail.location {
                    println!("  location:  {location}");
                }
            }
            Err(err) => println!("failed to load asset: {err}"),
        },
        Command::Close => browser.close_asset().await,
        Command::Refresh => browser.refresh().await,
        Command::Quit => return Ok(false),
    }
    Ok(true)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();
    let settings = config::load_settings();

    let server_url = args.server_url.unwrap_or(settings.server_url);
    let username = args
        .username
        .or(settings.username)
        .context("no username given (flag --username or console.toml)")?;

    let directory = Arc::new(HttpAssetDirectory::new(&server_url)?);
    let session = Session::new();
    let profile = directory
        .login(&LoginRequest {
            username,
            password: args.password,
        })
        .await
        .context("sign-in failed")?;
    session.sign_in(profile.clone()).await;
    println!("Signed in as {}", profile.full_name);

    println!("Navigation:");
    for entry in navigation_for(profile.account_type) {
        println!("  {:<24} {}", entry.title, entry.path);
    }

    let browser = AssetBrowser::new(directory.clone());
    match browser.categories().await {
        Ok(categories) => {
            println!("Categories:");
            for category in categories {
                println!("  {:>3}  {}", category.id.0, category.name);
            }
        }
        Err(err) => tracing::warn!(%err, "failed to load categories"),
    }

    let mut events = browser.subscribe_events();
    browser.refresh().await;

    println!("commands: search <text> | page <n> | states <s,..> | categories <id,..> | sort <column> | open <id> | close | refresh | quit");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            event = events.recv() => {
                let event = match event {
                    Ok(event) => event,
                    Err(err) if recoverable_recv_error(&err) => {
                        tracing::warn!(%err, "event stream lagged; skipping missed events");
                        continue;
                    }
                    Err(_) => break,
                };
                match event {
                    BrowserEvent::PageLoaded { query, page } => render_page(&page, query.page),
                    BrowserEvent::FetchFailed { message, .. } => {
                        let snapshot = browser.snapshot().await;
                        println!("fetch failed ({message}); showing previous results");
                        render_page(&snapshot.page, snapshot.query.page());
                    }
                    BrowserEvent::SelectionChanged(_) => {}
                }
            }
            line = lines.next_line() => {
                let Ok(Some(line)) = line else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_command(&line) {
                    Ok(command) => {
                        if !handle_command(&browser, command).await? {
                            break;
                        }
                    }
                    Err(message) => println!("{message}"),
                }
            }
        }
    }

    session.sign_out().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_filter_commands() {
        assert_eq!(
            parse_command("states assigned, available"),
            Ok(Command::States(BTreeSet::from([
                AssetState::Assigned,
                AssetState::Available
            ])))
        );
        assert_eq!(
            parse_command("categories 2,9"),
            Ok(Command::Categories(BTreeSet::from([
                CategoryId(2),
                CategoryId(9)
            ])))
        );
    }

    #[test]
    fn empty_filter_argument_clears_the_filter() {
        assert_eq!(parse_command("states"), Ok(Command::States(BTreeSet::new())));
    }

    #[test]
    fn search_keeps_the_raw_text() {
        assert_eq!(
            parse_command("search thinkpad t14"),
            Ok(Command::Search("thinkpad t14".to_string()))
        );
    }

    #[test]
    fn rejects_unknown_input() {
        assert!(parse_command("page three").is_err());
        assert!(parse_command("sort weight").is_err());
        assert!(parse_command("frobnicate").is_err());
    }

    #[tokio::test]
    async fn lagged_event_stream_recovers_and_closed_stream_ends() {
        let (tx, mut rx) = tokio::sync::broadcast::channel(1);
        tx.send(1).expect("send");
        tx.send(2).expect("send");

        let err = rx.recv().await.expect_err("receiver overran");
        assert!(recoverable_recv_error(&err));
        // After the lag, delivery resumes with the retained event.
        assert_eq!(rx.recv().await.expect("caught up"), 2);

        drop(tx);
        let err = rx.recv().await.expect_err("stream closed");
        assert!(!recoverable_recv_error(&err));
    }
}

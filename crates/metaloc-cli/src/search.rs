//! `search` command: one-shot or interactive searches against an interface.

use std::io::Write as _;

use clap::Args;
use metaloc_api::render::{card_text, results_html};
use metaloc_api::{
    MetalocatorClient, SearchDefaults, SearchOutcome, SearchParams, SearchSession,
    SlidingWindowLimiter, StatusLevel, StatusMessage,
};
use metaloc_core::AppConfig;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
Enter search fields as key=value pairs, for example:
  postal_code=29401 radius=10 limit=5 keyword=coffee shop
Commands: clear, usage, help, quit";

#[derive(Debug, Args)]
pub(crate) struct SearchArgs {
    /// Postal code to search around
    #[arg(long)]
    pub(crate) postal_code: Option<String>,
    /// Search radius in miles (defaults to `default_radius`)
    #[arg(long, value_parser = parse_radius)]
    pub(crate) radius: Option<f64>,
    /// Maximum number of results (defaults to `default_limit`)
    #[arg(long, value_parser = parse_limit)]
    pub(crate) limit: Option<u32>,
    /// Keyword filter
    #[arg(long)]
    pub(crate) keyword: Option<String>,
    /// Print results as HTML cards instead of text
    #[arg(long)]
    pub(crate) html: bool,
    /// Read searches from stdin until `quit`
    #[arg(long)]
    pub(crate) interactive: bool,
}

impl SearchArgs {
    fn params(&self) -> SearchParams {
        SearchParams {
            postal_code: self.postal_code.clone(),
            radius: self.radius,
            limit: self.limit,
            keyword: self.keyword.clone(),
        }
    }
}

/// One line of interactive input.
#[derive(Debug, PartialEq)]
enum Input {
    Search(SearchParams),
    Clear,
    Usage,
    Help,
    Quit,
    Blank,
}

pub(crate) async fn run_search(config: &AppConfig, args: &SearchArgs) -> anyhow::Result<()> {
    let item_id = config.require_item_id()?;
    let client = MetalocatorClient::from_config(config)
        .map_err(|e| anyhow::anyhow!("failed to build MetaLocator client: {e}"))?;
    let defaults = SearchDefaults {
        radius: config.default_radius,
        limit: config.default_limit,
    };
    let mut session = SearchSession::new(
        client,
        item_id,
        defaults,
        SlidingWindowLimiter::per_minute(config.rate_limit_per_minute),
    );

    if args.interactive {
        return run_interactive(&mut session, args.html).await;
    }

    let outcome = session.search(&args.params()).await;
    if outcome.status.level == StatusLevel::Error {
        anyhow::bail!("{}", outcome.status.text);
    }
    print_outcome(&outcome, args.html);
    Ok(())
}

async fn run_interactive(
    session: &mut SearchSession<MetalocatorClient>,
    html: bool,
) -> anyhow::Result<()> {
    println!("{HELP}");
    println!("{}", session.rate_limit_usage());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("search> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_input(&line) {
            Ok(Input::Search(params)) => {
                let outcome = session.search(&params).await;
                print_outcome(&outcome, html);
                println!("{}", session.rate_limit_usage());
            }
            Ok(Input::Clear) => print_status(&session.clear()),
            Ok(Input::Usage) => println!("{}", session.rate_limit_usage()),
            Ok(Input::Help) => println!("{HELP}"),
            Ok(Input::Quit) => break,
            Ok(Input::Blank) => {}
            Err(message) => print_status(&StatusMessage::new(StatusLevel::Error, message)),
        }
    }

    Ok(())
}

fn print_status(status: &StatusMessage) {
    println!("[{}] {}", status.level, status.text);
}

fn print_outcome(outcome: &SearchOutcome, html: bool) {
    print_status(&outcome.status);
    if outcome.results.is_empty() {
        return;
    }
    if html {
        println!("{}", results_html(&outcome.results));
    } else {
        for (i, location) in outcome.results.iter().enumerate() {
            println!("{}", card_text(location, i + 1));
        }
    }
}

/// Parse one interactive line.
///
/// Fields are `key=value` pairs separated by whitespace; a word without `=`
/// continues the previous value, so `keyword=coffee shop` keeps the space.
fn parse_input(line: &str) -> Result<Input, String> {
    let line = line.trim();
    match line.to_ascii_lowercase().as_str() {
        "" => return Ok(Input::Blank),
        "clear" => return Ok(Input::Clear),
        "usage" | "rate" => return Ok(Input::Usage),
        "help" | "?" => return Ok(Input::Help),
        "quit" | "exit" => return Ok(Input::Quit),
        _ => {}
    }

    let mut fields: Vec<(String, String)> = Vec::new();
    for word in line.split_whitespace() {
        if let Some((key, value)) = word.split_once('=') {
            fields.push((key.to_ascii_lowercase(), value.to_owned()));
        } else if let Some((_, value)) = fields.last_mut() {
            value.push(' ');
            value.push_str(word);
        } else {
            return Err(format!("Expected key=value, got '{word}'. Type 'help' for usage."));
        }
    }

    let mut params = SearchParams::default();
    for (key, value) in fields {
        match key.as_str() {
            "postal_code" | "postal" | "zip" => params.postal_code = Some(value),
            "radius" => params.radius = Some(parse_radius(&value)?),
            "limit" => params.limit = Some(parse_limit(&value)?),
            "keyword" => params.keyword = Some(value),
            other => return Err(format!("Unknown field '{other}'. Type 'help' for usage.")),
        }
    }

    Ok(Input::Search(params))
}

/// A finite, positive radius in miles.
pub(crate) fn parse_radius(value: &str) -> Result<f64, String> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|r| r.is_finite() && *r > 0.0)
        .ok_or_else(|| format!("Invalid radius '{value}'."))
}

/// A result limit of at least one.
pub(crate) fn parse_limit(value: &str) -> Result<u32, String> {
    value
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|l| *l > 0)
        .ok_or_else(|| format!("Invalid limit '{value}'."))
}

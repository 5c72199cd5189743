//! Interactive converter session
//!
//! Reads one command per line and keeps a [`ConverterStore`] up to date. Market
//! data requests run as background tasks and report back over a channel, so the
//! session keeps accepting input while prices load.

use super::markets::{display_as_table, resolve_instrument};
use super::{panel, ui};
use crate::core::market::{self, InstrumentList};
use crate::core::{ConverterStore, FetchError, FetchTicket, FiatOption, MarketDataProvider};
use anyhow::Result;
use chrono::Local;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info};

const HELP: &str = "\
Commands:
  amount <value>   set the fiat amount (digits and one decimal point)
  fiat <code>      switch fiat currency and reload prices
  coin <id|symbol> select the cryptocurrency to convert into
  list             show the loaded cryptocurrencies
  refresh          reload prices
  retry            retry after a failed load
  swap             swap conversion direction (fiat to crypto only)
  help             show this help
  quit             leave the session";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Amount(String),
    Fiat(String),
    Coin(String),
    List,
    Refresh,
    Retry,
    Swap,
    Help,
    Quit,
    Unknown(String),
}

impl SessionCommand {
    /// Parses a line of input. Blank lines yield `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let command = match word.to_lowercase().as_str() {
            "amount" | "a" => SessionCommand::Amount(rest.to_string()),
            "fiat" | "f" => SessionCommand::Fiat(rest.to_string()),
            "coin" | "c" => SessionCommand::Coin(rest.to_string()),
            "list" | "ls" => SessionCommand::List,
            "refresh" | "r" => SessionCommand::Refresh,
            "retry" => SessionCommand::Retry,
            "swap" => SessionCommand::Swap,
            "help" | "?" => SessionCommand::Help,
            "quit" | "exit" | "q" => SessionCommand::Quit,
            _ => SessionCommand::Unknown(line.to_string()),
        };
        Some(command)
    }
}

#[derive(Debug)]
struct FetchOutcome {
    request_id: u64,
    result: Result<InstrumentList, FetchError>,
}

/// Result of applying one command.
#[derive(Debug, PartialEq, Eq)]
pub enum Step {
    Continue {
        fetch: Option<FetchTicket>,
        rerender: bool,
    },
    Quit,
}

impl Step {
    fn render() -> Self {
        Step::Continue {
            fetch: None,
            rerender: true,
        }
    }

    fn silent() -> Self {
        Step::Continue {
            fetch: None,
            rerender: false,
        }
    }
}

/// Applies a command to the store, writing any direct feedback to `out`.
pub fn apply<W: Write>(
    store: &mut ConverterStore,
    command: SessionCommand,
    out: &mut W,
) -> Result<Step> {
    let step = match command {
        SessionCommand::Amount(text) => {
            // rejected edits keep the previous amount
            store.on_amount_input(&text);
            Step::render()
        }
        SessionCommand::Fiat(code) => match FiatOption::find(&code) {
            Some(fiat) => Step::Continue {
                fetch: store.on_fiat_change(fiat),
                rerender: true,
            },
            None => {
                writeln!(
                    out,
                    "{}",
                    ui::style_text(&format!("Unsupported currency: {code}"), ui::StyleType::Error)
                )?;
                Step::silent()
            }
        },
        SessionCommand::Coin(query) => {
            let id = resolve_instrument(store.instruments(), &query).map(|i| i.id.clone());
            match id {
                Some(id) => {
                    store.on_instrument_select(&id);
                    Step::render()
                }
                None => {
                    writeln!(
                        out,
                        "{}",
                        ui::style_text(
                            &format!("Unknown cryptocurrency: {query}"),
                            ui::StyleType::Error
                        )
                    )?;
                    Step::silent()
                }
            }
        }
        SessionCommand::List => {
            writeln!(
                out,
                "{}",
                display_as_table(
                    store.instruments(),
                    store.fiat(),
                    store.selected().map(|i| i.id.as_str())
                )
            )?;
            Step::silent()
        }
        SessionCommand::Refresh | SessionCommand::Retry => {
            let fetch = store.request_refresh();
            if fetch.is_none() {
                writeln!(
                    out,
                    "{}",
                    ui::style_text("Already loading prices...", ui::StyleType::Subtle)
                )?;
            }
            Step::Continue {
                fetch,
                rerender: fetch.is_some(),
            }
        }
        SessionCommand::Swap => {
            store.on_swap();
            writeln!(
                out,
                "{}",
                ui::style_text(
                    "Conversion runs from fiat to crypto only.",
                    ui::StyleType::Subtle
                )
            )?;
            Step::silent()
        }
        SessionCommand::Help => {
            writeln!(out, "{HELP}")?;
            Step::silent()
        }
        SessionCommand::Quit => Step::Quit,
        SessionCommand::Unknown(line) => {
            writeln!(
                out,
                "{}",
                ui::style_text(
                    &format!("Unknown command: {line} (type `help`)"),
                    ui::StyleType::Error
                )
            )?;
            Step::silent()
        }
    };
    Ok(step)
}

fn dispatch(
    provider: &Arc<dyn MarketDataProvider>,
    ticket: FetchTicket,
    tx: &mpsc::UnboundedSender<FetchOutcome>,
) {
    let provider = Arc::clone(provider);
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = market::fetch_instruments(provider.as_ref(), ticket.fiat.code).await;
        // receiver is gone once the session ended
        let _ = tx.send(FetchOutcome {
            request_id: ticket.request_id,
            result,
        });
    });
}

fn render<W: Write>(store: &ConverterStore, out: &mut W) -> Result<()> {
    writeln!(out, "\n{}\n", panel::render(&store.view()))?;
    out.flush()?;
    Ok(())
}

/// Runs a session reading commands from `input` until `quit` or end of input.
///
/// At end of input the session still waits for an outstanding request so the
/// final state reflects it. Returns the final store.
pub async fn run<R, W>(
    provider: Arc<dyn MarketDataProvider>,
    fiat: &'static FiatOption,
    amount: &str,
    input: R,
    out: &mut W,
) -> Result<ConverterStore>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<FetchOutcome>();
    let mut store = ConverterStore::new(fiat, amount);

    dispatch(&provider, store.start(), &tx);
    render(&store, out)?;

    let mut lines = input.lines();
    let mut input_open = true;

    loop {
        if !input_open && !store.is_loading() {
            break;
        }

        tokio::select! {
            line = lines.next_line(), if input_open => {
                let Some(line) = line? else {
                    debug!("Input closed");
                    input_open = false;
                    continue;
                };
                let Some(command) = SessionCommand::parse(&line) else {
                    continue;
                };
                match apply(&mut store, command, out)? {
                    Step::Quit => break,
                    Step::Continue { fetch, rerender } => {
                        if let Some(ticket) = fetch {
                            dispatch(&provider, ticket, &tx);
                        }
                        if rerender {
                            render(&store, out)?;
                        }
                    }
                }
            }
            Some(outcome) = rx.recv() => {
                let applied = match outcome.result {
                    Ok(instruments) => {
                        store.on_fetch_complete(outcome.request_id, instruments, Local::now())
                    }
                    Err(e) => {
                        info!(error = %e, "Market data request failed");
                        store.on_fetch_error(outcome.request_id, e)
                    }
                };
                if applied {
                    render(&store, out)?;
                }
            }
        }
    }

    Ok(store)
}

/// Runs a session on the process's stdin and stdout.
pub async fn run_stdio(
    provider: Arc<dyn MarketDataProvider>,
    fiat: &'static FiatOption,
    amount: &str,
) -> Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(stdout, "{HELP}")?;
    let stdin = BufReader::new(tokio::io::stdin());
    run(provider, fiat, amount, stdin, &mut stdout).await?;
    Ok(())
}

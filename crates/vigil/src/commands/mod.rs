//! Command dispatch: bridges CLI args -> dashboard pollers -> output formatting.

pub mod alerts;
pub mod config_cmd;
pub mod hosts;
pub mod jobs;
pub mod logs;
pub mod reports;
pub mod summary;

use std::sync::Arc;

use tabled::Tabled;
use tokio_stream::StreamExt;
use vigil_core::{CoreError, Dashboard, Domain, ListQuery, Poller, Searchable, WebhookSource};

use crate::cli::{Command, GlobalOpts, ListArgs, OutputFormat};
use crate::error::CliError;
use crate::output;

/// A configured dashboard plus the profile it was built from.
pub struct Session {
    pub dashboard: Dashboard,
    pub profile: String,
}

impl Session {
    /// Convert a core error, naming this profile in auth failures.
    pub fn fail(&self, err: CoreError) -> CliError {
        match err {
            CoreError::Unauthorized => CliError::AuthFailed {
                profile: self.profile.clone(),
            },
            other => other.into(),
        }
    }
}

/// Dispatch a webhook-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Alerts(args) => alerts::handle(session, args, global).await,
        Command::Hosts(args) => hosts::handle(session, args, global).await,
        Command::Reports(args) => reports::handle(session, args, global).await,
        Command::Jobs(args) => jobs::handle(session, args, global).await,
        Command::Logs(args) => logs::handle(session, args, global).await,
        Command::Summary => summary::handle(session, global).await,
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "config and completions are handled before dispatch".into(),
        )),
    }
}

// ── Shared list handling ─────────────────────────────────────────────

/// How one domain's records become table rows and plain-text ids.
pub struct ListView<'a, D: Domain, R> {
    pub filter: Box<dyn Fn(&D::Record) -> bool + 'a>,
    pub to_row: fn(&Arc<D::Record>) -> R,
    pub id: fn(&Arc<D::Record>) -> String,
}

impl<D, R> ListView<'_, D, R>
where
    D: Domain,
    D::Record: Searchable,
    R: Tabled,
{
    fn render(
        &self,
        query: &ListQuery,
        snapshot: &[Arc<D::Record>],
        format: OutputFormat,
    ) -> Result<String, CliError> {
        let page = query.apply(snapshot, &self.filter);
        let body = output::render_list(format, &page.items, self.to_row, self.id)?;
        if format == OutputFormat::Table {
            Ok(format!("{body}\n{}", output::page_footer(&page)))
        } else {
            Ok(body)
        }
    }
}

/// Fetch once and print, or keep polling with `--watch`.
pub async fn run_list<D, R>(
    session: &Session,
    poller: &Poller<D, WebhookSource>,
    args: &ListArgs,
    view: &ListView<'_, D, R>,
    global: &GlobalOpts,
) -> Result<(), CliError>
where
    D: Domain,
    D::Record: Searchable,
    R: Tabled,
{
    let query = ListQuery {
        search: args.search.clone(),
        page: args.page,
        page_size: args.page_size,
    };

    if !args.watch {
        poller.try_refresh().await.map_err(|e| session.fail(e))?;
        let out = view.render(&query, &poller.snapshot(), global.output)?;
        output::print_output(&out, global.quiet);
        return Ok(());
    }

    watch(poller, &query, view, global).await
}

/// Start the poller and redraw on every published change until Ctrl-C.
async fn watch<D, R>(
    poller: &Poller<D, WebhookSource>,
    query: &ListQuery,
    view: &ListView<'_, D, R>,
    global: &GlobalOpts,
) -> Result<(), CliError>
where
    D: Domain,
    D::Record: Searchable,
    R: Tabled,
{
    let table = global.output == OutputFormat::Table;
    let color = output::should_color(global.color);
    let mut snapshots = poller.stream().into_stream();
    let mut connection = poller.connection();
    let mut drawn = false;

    poller.start();

    let draw = |snapshot: &[Arc<D::Record>]| -> Result<(), CliError> {
        let out = view.render(query, snapshot, global.output)?;
        if table {
            output::clear_screen();
        }
        output::print_output(&out, global.quiet);
        if table && !global.quiet {
            eprintln!(
                "{} · {}",
                poller.name(),
                output::connection_line(&poller.connection_state(), color)
            );
        }
        Ok(())
    };

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            next = snapshots.next() => {
                let Some(snapshot) = next else { break };
                draw(&snapshot)?;
                drawn = true;
            }
            changed = connection.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = connection.borrow_and_update().clone();
                if !drawn && state.is_connected {
                    // An empty first fetch publishes no data change.
                    draw(&poller.snapshot())?;
                    drawn = true;
                } else if table && !global.quiet {
                    eprintln!("{} · {}", poller.name(), output::connection_line(&state, color));
                }
            }
        }
    }

    poller.stop();
    Ok(())
}

/// `2025-01-08 12:30` or `-`.
pub fn format_time(at: Option<chrono::DateTime<chrono::Utc>>) -> String {
    at.map_or_else(|| "-".into(), |t| t.format("%Y-%m-%d %H:%M").to_string())
}

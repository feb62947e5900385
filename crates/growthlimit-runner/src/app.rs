//! The terminal event loop.
//!
//! Input lines and catalog responses arrive on one channel and are handled
//! one at a time, so the session is only ever touched from this loop.

use crate::config::{NeighborhoodInfo, SessionConfig};
use crate::intent::{Command, HELP_TEXT};
use crate::loader::{spawn_loader, CatalogResponse, LoaderHandle};
use crate::notice::{Notice, NoticeKind};
use crate::session::{Effect, Session};
use crate::view::MapView;
use crate::{Result, RunnerError};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use parcel_geo::CatalogSource;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Events handled by the loop.
#[derive(Debug)]
pub enum SessionEvent {
    /// A line typed by the user.
    Input(String),
    /// No more input will arrive.
    InputClosed,
    /// The loader finished a request.
    CatalogArrived(CatalogResponse),
}

/// A running session bound to an output stream.
pub struct App<W: Write> {
    session: Session,
    view: MapView,
    loader: Option<LoaderHandle>,
    events: Receiver<SessionEvent>,
    neighborhoods: Vec<NeighborhoodInfo>,
    out: W,
}

impl<W: Write> App<W> {
    /// Start the loader and return the app with the sender input should be
    /// delivered on.
    pub fn new(
        config: &SessionConfig,
        source: Arc<dyn CatalogSource>,
        out: W,
    ) -> Result<(Self, Sender<SessionEvent>)> {
        let (event_tx, events) = crossbeam_channel::unbounded();
        let loader = spawn_loader(source, event_tx.clone())?;
        let app = Self {
            session: Session::new(config)?,
            view: MapView::new(&config.catalog.score_property),
            loader: Some(loader),
            events,
            neighborhoods: config.neighborhoods.clone(),
            out,
        };
        Ok((app, event_tx))
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn view(&self) -> &MapView {
        &self.view
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    /// Handle events until the user quits or input closes.
    pub fn run(&mut self) -> Result<()> {
        writeln!(self.out, "Development limit: {} acres", self.session.ledger().budget())?;
        writeln!(self.out, "Type 'help' for commands.")?;
        while let Ok(event) = self.events.recv() {
            if !self.handle_event(event)? {
                break;
            }
        }
        self.shutdown();
        Ok(())
    }

    /// Handle the next queued event, waiting up to `timeout`.
    ///
    /// Returns `Ok(false)` when the timeout passed with nothing queued or the
    /// event ended the session.
    pub fn process_next(&mut self, timeout: Duration) -> Result<bool> {
        match self.events.recv_timeout(timeout) {
            Ok(event) => self.handle_event(event),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => Ok(false),
        }
    }

    /// Handle one event. Returns `Ok(false)` when the session should end.
    pub fn handle_event(&mut self, event: SessionEvent) -> Result<bool> {
        match event {
            SessionEvent::Input(line) => self.handle_line(&line),
            SessionEvent::InputClosed => Ok(false),
            SessionEvent::CatalogArrived(response) => {
                let effects = self.session.catalog_arrived(response);
                self.apply(effects)?;
                Ok(true)
            }
        }
    }

    fn handle_line(&mut self, line: &str) -> Result<bool> {
        let command = match Command::parse(line) {
            Ok(Some(command)) => command,
            Ok(None) => return Ok(true),
            Err(RunnerError::InvalidCommand(reason)) => {
                self.show_notice(&Notice::with_detail(NoticeKind::InvalidCommand, reason))?;
                return Ok(true);
            }
            Err(err) => return Err(err),
        };
        debug!(command = %command.to_command_string(), "command");

        match command {
            Command::Intent(intent) => {
                let effects = self.session.dispatch(intent);
                self.apply(effects)?;
            }
            Command::List => self.show_selection()?,
            Command::Parcels => self.show_parcels()?,
            Command::Neighborhoods => self.show_neighborhoods()?,
            Command::Help => writeln!(self.out, "{}", HELP_TEXT)?,
            Command::Quit => return Ok(false),
        }
        Ok(true)
    }

    fn apply(&mut self, effects: Vec<Effect>) -> Result<()> {
        for effect in effects {
            match effect {
                Effect::Fetch(request) => {
                    writeln!(self.out, "Loading {}...", request.neighborhood)?;
                    let queued = self.loader.as_ref().map_or(false, |l| l.request(request));
                    if !queued {
                        return Err(RunnerError::Io(io::Error::new(
                            io::ErrorKind::BrokenPipe,
                            "catalog loader stopped",
                        )));
                    }
                }
                Effect::Notice(notice) => self.show_notice(&notice)?,
                Effect::CatalogShown => {
                    if let Some(catalog) = self.session.catalog() {
                        self.view.render_catalog(catalog);
                        writeln!(
                            self.out,
                            "Loaded {} parcels for {} ({} acres)",
                            catalog.len(),
                            catalog.neighborhood(),
                            catalog.total_acreage()
                        )?;
                    }
                }
                Effect::CatalogCleared => {
                    self.view.clear();
                    writeln!(self.out, "Map cleared")?;
                }
                Effect::Highlight(parcel, highlight) => {
                    self.view.set_highlight(&parcel, highlight);
                    writeln!(
                        self.out,
                        "{}: {} ({})",
                        parcel,
                        highlight.as_str(),
                        highlight.fill_color()
                    )?;
                }
                Effect::SelectionChanged => self.show_selection()?,
                Effect::BudgetShown(budget) => {
                    writeln!(self.out, "Development limit: {} acres", budget)?;
                }
                Effect::Exported(summary) => {
                    writeln!(
                        self.out,
                        "Exported {} parcel(s), {} acres, to {}",
                        summary.features,
                        summary.total_acreage,
                        summary.path.display()
                    )?;
                }
            }
        }
        Ok(())
    }

    fn show_notice(&mut self, notice: &Notice) -> Result<()> {
        if let Some(detail) = &notice.detail {
            debug!(kind = ?notice.kind, detail = %detail, "notice");
        }
        writeln!(self.out, "! {}", notice.message())?;
        Ok(())
    }

    fn show_selection(&mut self) -> Result<()> {
        let snapshot = self.session.ledger().snapshot();
        for line in self.view.sidebar_lines(&snapshot) {
            writeln!(self.out, "  {}", line)?;
        }
        writeln!(self.out, "{}", self.view.summary_line(&snapshot))?;
        Ok(())
    }

    fn show_parcels(&mut self) -> Result<()> {
        let Some(catalog) = self.session.catalog() else {
            writeln!(self.out, "No neighborhood loaded")?;
            return Ok(());
        };
        writeln!(self.out, "{}: {} parcels", catalog.neighborhood(), catalog.len())?;
        for line in self.view.layer_lines(catalog) {
            writeln!(self.out, "  {}", line)?;
        }
        Ok(())
    }

    fn show_neighborhoods(&mut self) -> Result<()> {
        if self.neighborhoods.is_empty() {
            writeln!(self.out, "No neighborhoods configured")?;
            return Ok(());
        }
        for info in &self.neighborhoods {
            let mut line = format!("{} ({})", info.id, info.display_name());
            if let Some(population) = info.population_2020 {
                line.push_str(&format!(", population 2020: {}", population));
            }
            if let Some(vacant) = info.vacant_land_2023 {
                line.push_str(&format!(", vacant land 2023: {} acres", vacant));
            }
            writeln!(self.out, "  {}", line)?;
        }
        Ok(())
    }

    fn shutdown(&mut self) {
        if let Some(loader) = self.loader.take() {
            loader.shutdown();
        }
    }

    /// Stop the loader and hand back the output stream.
    pub fn finish(mut self) -> W {
        self.shutdown();
        self.out
    }
}

//! # growthlimit-runner
//!
//! Interactive parcel selection under a development limit.
//!
//! A [`Session`] owns the selection ledger and the neighborhood catalog on
//! the map. User [`Intent`]s and loader responses go in; [`Effect`]s come
//! out for the front end to render. [`App`] drives a session from terminal
//! input, fetching catalogs on a background [loader](spawn_loader) thread.
//!
//! ```no_run
//! use growthlimit_runner::{App, SessionConfig, SessionEvent};
//!
//! let config = SessionConfig::load("growthlimit.yaml")?;
//! let source = config.build_source()?;
//! let (mut app, input) = App::new(&config, source, std::io::stdout())?;
//! input.send(SessionEvent::Input("neighborhood Hough".into())).ok();
//! input.send(SessionEvent::InputClosed).ok();
//! app.run()?;
//! # Ok::<(), growthlimit_runner::RunnerError>(())
//! ```

mod app;
mod config;
mod error;
mod intent;
mod loader;
mod metrics_export;
mod notice;
mod session;
mod view;

pub use app::{App, SessionEvent};
pub use config::{CatalogConfig, NeighborhoodInfo, SessionConfig, DEFAULT_SCORE_PROPERTY};
pub use error::{Result, RunnerError};
pub use intent::{Command, Intent, HELP_TEXT};
pub use loader::{spawn_loader, CatalogResponse, FetchRequest, LoaderCommand, LoaderHandle};
pub use metrics_export::{HistogramSummary, InMemoryRecorder};
pub use notice::{Notice, NoticeKind};
pub use session::{Effect, Session};
pub use view::{Highlight, MapView};

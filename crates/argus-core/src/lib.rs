pub mod dispatcher;
pub mod domain;
pub mod engine;
pub mod error;
pub mod events;
pub mod matcher;
pub mod models;
pub mod retry;
pub mod testutil;
pub mod throttle;
pub mod traits;

pub use dispatcher::{DispatcherConfig, DispatcherHandle, NotificationDispatcher};
pub use domain::{Domain, SeenDomains};
pub use engine::{DiscoveryEngine, EngineConfig};
pub use error::AppError;
pub use events::{DiscoveryEvent, EventReporter, TracingReporter};
pub use matcher::ProviderMatcher;
pub use models::{CandidateEntry, MatchResult, ResultsPage, RunSummary};
pub use traits::{Fetcher, Notifier, ResultSink, SearchProvider};

pub mod config;
pub mod corpus;
pub mod deprecation;
pub mod detection;
pub mod embedding;
pub mod error;
pub mod format;
pub mod index;
pub mod registry;
pub mod schema;
pub mod search;
pub mod server;
pub mod source;
pub mod tools;
pub mod tracing;
pub mod types;
pub mod worker;

pub use config::Config;
pub use corpus::{ApiEntry, Category, Corpus};
pub use error::{DocsError, Result};
pub use index::{ApiLookup, DocsIndex};
pub use server::DocsServer;
pub use types::{MatchSource, PracticeResult, SearchResult};
pub use worker::DocState;

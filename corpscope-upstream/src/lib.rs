//! Corpscope Upstream - External API clients
//!
//! Thin clients for the financial-disclosure API, the generative-AI API and
//! the news RSS feed, sharing one HTTP transport with a bounded retry
//! policy. Each client comes in three flavors behind a common trait: the
//! real network client, a disabled variant used when no credentials are
//! configured, and a scripted variant for tests and offline development.

#![warn(missing_docs)]
#![warn(clippy::missing_errors_doc)]

pub mod disclosure;
pub mod errors;
pub mod generative;
pub mod news;
pub mod transport;

// Re-export main types
pub use disclosure::{
    DartClient, DisabledDisclosure, DisclosureProvider, DisclosureService, ScriptedDisclosure,
};
pub use errors::UpstreamError;
pub use generative::{
    DisabledGenerator, GeminiClient, GenerateReply, ScriptedGenerator, TextGenerator,
    generate_json,
};
pub use news::{NewsFetcher, NewsItem, NewsProvider, ScriptedNews};
pub use transport::HttpTransport;

/// Convenience type alias for Results with UpstreamError.
pub type Result<T> = std::result::Result<T, UpstreamError>;

pub mod cache;
pub mod config;
pub mod crawl;
pub mod error;
pub mod graph;
pub mod tmdb;

pub use config::Config;
pub use crawl::{build_coactor_network, expand_graph, CrawlPlan, CrawlReport};
pub use error::{CoactorError, Result};
pub use graph::{Edge, Graph, Node};
pub use tmdb::{CastMember, Credit, CreditsSource, DateWindow, TmdbClient};

mod error;
mod quote;
mod resolver;
mod symbol;

pub mod provider;
pub mod render;

pub use error::{ProviderError, ResolveError};
pub use quote::{Basic, HomeMajor, Majors, Quote, StockItem, parse_number};
pub use resolver::Resolver;
pub use symbol::{INDEX_KEYWORD, Symbol, SymbolKind};

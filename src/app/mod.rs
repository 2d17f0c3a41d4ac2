pub mod errors;
pub mod indexer;

pub use errors::AppError;
pub use indexer::Indexer;

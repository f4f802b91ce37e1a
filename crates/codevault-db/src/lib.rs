pub mod pool;
pub mod repos;
pub mod search;

// Re-export commonly used items
pub use pool::{create_pool, run_migrations};
pub use repos::is_unique_violation;
pub use repos::snippet::{NewSnippet, SnippetEdit, SnippetRepo, SnippetRow};
pub use repos::tag::{TagRepo, TagRow};
pub use repos::user::{NewUser, UserRepo, UserRow};
pub use search::{SearchHit, SearchRepo, TRIGRAM_SIMILARITY_FLOOR};

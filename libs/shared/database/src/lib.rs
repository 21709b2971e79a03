pub mod memory;
pub mod state;
pub mod store;
pub mod supabase;

pub use memory::MemoryStore;
pub use state::{connect_store, AppState};
pub use store::{Collection, DocumentStore};
pub use supabase::SupabaseClient;

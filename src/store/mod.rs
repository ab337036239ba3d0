pub mod content;

pub use content::{ContentStore, StoredObject};

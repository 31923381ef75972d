pub mod contacts;
pub mod history;

pub use contacts::{ContactBook, ContactStoreError};
pub use history::{HistoryError, HistoryLog};

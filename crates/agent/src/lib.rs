//! Rule-based chat command interpreter: intent classification, entity
//! extraction and dispatch for Portuguese personal-finance messages.

pub mod dispatch;
pub mod extract;
pub mod intent;

pub use dispatch::{handle_message, Action, CommandResult};
pub use extract::{
    extract_date, extract_description, extract_entities, extract_record_id, extract_value,
    ExtractedEntities,
};
pub use intent::{classify, Intent};

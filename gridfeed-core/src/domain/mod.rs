//! Domain types shared by the parsers, the client and the CLI.

pub mod choices;
pub mod record;

pub use choices::{DataKind, Frequency, Market, ParseChoiceError};
pub use record::{Measurement, Record, RecordTags, BA_NAME};

//! Concrete control kinds.

mod choice;
mod date_time;
mod file_load;
mod label;
mod list_view;
mod name_value;
mod number;
mod progress;
mod text;

pub use choice::{CheckBox, ComboBox, NO_SELECTION};
pub use date_time::{DateField, TimeField, format_date, parse_date};
pub use file_load::{FileLoad, TICK_INTERVAL as UPLOAD_TICK_INTERVAL, UploadOutcome};
pub use label::{Label, Line};
pub use list_view::{ListButton, ListView, Row};
pub use name_value::NameValue;
pub use number::NumberBox;
pub use progress::Progress;
pub use text::{SUGGESTION_LIMIT, SmartTextBox, TextBox};

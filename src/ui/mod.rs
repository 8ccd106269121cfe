//! Terminal output for the `kraken` binary

pub mod icons;
pub mod output;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{dim, error, header, info, success, warn};
pub use table::{tables_table, TableBuilder};
pub use theme::{theme, Theme};

mod export;
mod model;
mod store;

pub use export::{render_export, ExportFormat, EXPORT_FILENAME};
pub use model::*;
pub use store::NoteStore;

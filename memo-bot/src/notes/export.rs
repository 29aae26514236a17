use serde::Deserialize;

use super::ExportGroups;

pub const EXPORT_FILENAME: &str = "your_notes.txt";

#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    /// `[tag] content` per line.
    #[default]
    Flat,
    /// `Tag: x` headers followed by `- content` lines.
    Grouped,
}

pub fn render_export(groups: &ExportGroups, format: ExportFormat) -> String {
    let mut out = String::new();
    match format {
        ExportFormat::Flat => {
            for (tag, contents) in groups {
                for content in contents {
                    out.push_str(&format!("[{tag}] {content}\n"));
                }
            }
        }
        ExportFormat::Grouped => {
            for (i, (tag, contents)) in groups.iter().enumerate() {
                if i > 0 {
                    out.push('\n');
                }
                out.push_str(&format!("Tag: {tag}\n"));
                for content in contents {
                    out.push_str(&format!("- {content}\n"));
                }
            }
        }
    }
    out
}

//! Image enumeration: turns the feed's record map into download tasks.
//!
//! Records are visited in the map's iteration order. Each record that carries a
//! string under the image field yields one [`Task`] named `<n><ext>`, where `n`
//! counts emitted tasks from 1 and `ext` comes from
//! [`image_extension`](crate::utils::image_extension). Records without the field
//! are skipped and do not advance the counter.

use crate::types::Task;
use crate::utils::numbered_filename;
use serde_json::{Map, Value};
use std::path::Path;

/// Field holding the image URL in each record
pub const DEFAULT_IMAGE_FIELD: &str = "dhd";

/// Enumerate tasks using the default image field
pub fn locate(records: &Map<String, Value>, destination_dir: &Path) -> Vec<Task> {
    locate_field(records, destination_dir, DEFAULT_IMAGE_FIELD)
}

/// Enumerate tasks reading image URLs from `field`
pub fn locate_field(records: &Map<String, Value>, destination_dir: &Path, field: &str) -> Vec<Task> {
    ImageLocator::new(records, field)
        .map(|(index, url)| Task::new(url, destination_dir.join(numbered_filename(index, url))))
        .collect()
}

/// Iterator over `(index, url)` pairs of eligible records, index starting at 1
pub struct ImageLocator<'a> {
    records: serde_json::map::Iter<'a>,
    field: &'a str,
    next_index: usize,
}

impl<'a> ImageLocator<'a> {
    /// Create a locator over `records`
    pub fn new(records: &'a Map<String, Value>, field: &'a str) -> Self {
        Self {
            records: records.iter(),
            field,
            next_index: 1,
        }
    }
}

impl<'a> Iterator for ImageLocator<'a> {
    type Item = (usize, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        for (key, record) in self.records.by_ref() {
            let Some(value) = record.get(self.field) else {
                continue;
            };

            match value.as_str() {
                Some(url) => {
                    let index = self.next_index;
                    self.next_index += 1;
                    tracing::debug!(key = %key, index, url, "Found image URL");
                    return Some((index, url));
                }
                None => {
                    tracing::warn!(
                        key = %key,
                        field = self.field,
                        "Image field is not a string, skipping record"
                    );
                }
            }
        }
        None
    }
}

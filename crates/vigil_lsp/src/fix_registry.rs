//! Per-document index of fixes reported by the last analysis.

use std::collections::HashMap;

use parking_lot::Mutex;
use tower_lsp::lsp_types::{Range, Url};
use vigil_registry::Fix;

use crate::conversion::{range_contains, range_key};

#[derive(Debug)]
struct RangeFixes {
    range: Range,
    fixes: Vec<Fix>,
}

/// Fixes keyed by document, then by violation range.
///
/// Each accepted analysis of a document replaces all of its fixes, so
/// nothing survives past the next analysis.
#[derive(Debug, Default)]
pub struct FixRegistry {
    documents: Mutex<HashMap<Url, HashMap<String, RangeFixes>>>,
}

impl FixRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every fix registered for `uri`.
    pub fn clear(&self, uri: &Url) {
        self.documents.lock().remove(uri);
    }

    /// Replaces every fix of `uri` with `fixes` in one step.
    pub fn replace(&self, uri: &Url, fixes: impl IntoIterator<Item = (Range, Fix)>) {
        let mut ranges = HashMap::new();
        for (range, fix) in fixes {
            insert_fix(&mut ranges, range, fix);
        }

        let mut documents = self.documents.lock();
        if ranges.is_empty() {
            documents.remove(uri);
        } else {
            documents.insert(uri.clone(), ranges);
        }
    }

    /// Registers `fix` for the violation at `range`.
    ///
    /// A fix structurally equal to one already registered for the exact same
    /// range is not added again. Distinct ranges are never merged.
    pub fn register(&self, uri: &Url, range: Range, fix: Fix) {
        let mut documents = self.documents.lock();
        insert_fix(documents.entry(uri.clone()).or_default(), range, fix);
    }

    /// Returns every fix whose registered range contains `query`.
    pub fn fixes_for_range(&self, uri: &Url, query: &Range) -> Vec<Fix> {
        let documents = self.documents.lock();
        let Some(ranges) = documents.get(uri) else {
            return Vec::new();
        };

        let mut matching: Vec<&RangeFixes> = ranges
            .values()
            .filter(|entry| range_contains(&entry.range, query))
            .collect();
        // Stable output order regardless of map iteration order.
        matching.sort_by_key(|entry| {
            (
                entry.range.start.line,
                entry.range.start.character,
                entry.range.end.line,
                entry.range.end.character,
            )
        });

        matching
            .into_iter()
            .flat_map(|entry| entry.fixes.iter().cloned())
            .collect()
    }

    /// Returns the number of fixes registered for `uri`.
    pub fn count(&self, uri: &Url) -> usize {
        self.documents
            .lock()
            .get(uri)
            .map(|ranges| ranges.values().map(|entry| entry.fixes.len()).sum())
            .unwrap_or(0)
    }
}

fn insert_fix(ranges: &mut HashMap<String, RangeFixes>, range: Range, fix: Fix) {
    let entry = ranges
        .entry(range_key(&range))
        .or_insert_with(|| RangeFixes {
            range,
            fixes: Vec::new(),
        });

    if !entry.fixes.contains(&fix) {
        entry.fixes.push(fix);
    }
}

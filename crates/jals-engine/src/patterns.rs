//! Pattern analysis over the operation history.

use std::collections::HashMap;

use jals_types::{HistoryEntry, OperationPattern};

/// Count operations by name.
///
/// One frequency pattern per distinct operation, ordered by the
/// operation's first appearance in `history`.
pub fn analyze_operation_patterns(history: &[HistoryEntry]) -> Vec<OperationPattern> {
    let mut patterns: Vec<OperationPattern> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for entry in history {
        match index.get(entry.operation.as_str()) {
            Some(&i) => patterns[i].frequency += 1,
            None => {
                index.insert(entry.operation.as_str(), patterns.len());
                patterns.push(OperationPattern::frequency(entry.operation.clone(), 1));
            }
        }
    }

    patterns
}

//! Nested comment tree construction.
//!
//! The backend delivers comments as a flat list ordered by ascending
//! creation time. [`build_tree`] turns that list into a rooted forest,
//! preserving input order among siblings.

use std::collections::{HashMap, HashSet};

use crate::models::CommentRecord;

/// A comment with its replies, nested to unbounded depth.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentNode {
    pub record: CommentRecord,
    pub replies: Vec<CommentNode>,
}

impl CommentNode {
    /// Total number of records in this subtree, including the node itself.
    #[must_use]
    pub fn subtree_len(&self) -> usize {
        1 + self.replies.iter().map(Self::subtree_len).sum::<usize>()
    }
}

/// Build an ordered forest from a flat, order-stamped comment list.
///
/// A record with no parent reference, or whose parent id does not appear in
/// the input, becomes a root (orphan-becomes-root). Otherwise it is appended
/// to its parent's replies. Both root and reply sequences keep the relative
/// input order; nothing is re-sorted by timestamp.
///
/// Pure and O(n): one pass groups records under their parent id, a second
/// pass wires the links recursively.
#[must_use]
pub fn build_tree(records: Vec<CommentRecord>) -> Vec<CommentNode> {
    let known_ids: HashSet<String> = records.iter().map(|r| r.id.clone()).collect();

    let mut roots: Vec<CommentRecord> = Vec::new();
    let mut children: HashMap<String, Vec<CommentRecord>> = HashMap::new();
    for record in records {
        match record.parent_comment_id.as_deref() {
            Some(parent_id) if known_ids.contains(parent_id) => {
                children
                    .entry(parent_id.to_string())
                    .or_default()
                    .push(record);
            }
            _ => roots.push(record),
        }
    }

    roots
        .into_iter()
        .map(|record| attach_replies(record, &mut children))
        .collect()
}

fn attach_replies(
    record: CommentRecord,
    children: &mut HashMap<String, Vec<CommentRecord>>,
) -> CommentNode {
    let replies = children
        .remove(&record.id)
        .unwrap_or_default()
        .into_iter()
        .map(|child| attach_replies(child, children))
        .collect();
    CommentNode { record, replies }
}

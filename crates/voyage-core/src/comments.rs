//! Comment threading.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::storage::types::{Comment, CommentThread};

/// Group a flat comment list into top-level threads with nested replies.
///
/// Input order is preserved at every level, so passing comments oldest first
/// yields threads and replies oldest first. Replies whose parent is not in
/// the list are dropped.
pub fn comment_threads(comments: Vec<Comment>) -> Vec<CommentThread> {
    let known: HashSet<Uuid> = comments.iter().map(|c| c.id).collect();

    let mut roots = Vec::new();
    let mut children: HashMap<Uuid, Vec<Comment>> = HashMap::new();
    for comment in comments {
        match comment.parent_comment_id {
            None => roots.push(comment),
            Some(parent) if known.contains(&parent) => {
                children.entry(parent).or_default().push(comment);
            }
            Some(_) => {}
        }
    }

    roots
        .into_iter()
        .map(|comment| build_thread(comment, &mut children))
        .collect()
}

fn build_thread(comment: Comment, children: &mut HashMap<Uuid, Vec<Comment>>) -> CommentThread {
    let replies = children
        .remove(&comment.id)
        .unwrap_or_default()
        .into_iter()
        .map(|reply| build_thread(reply, children))
        .collect();
    CommentThread { comment, replies }
}

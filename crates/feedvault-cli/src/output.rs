// SPDX-License-Identifier: Apache-2.0

use feedvault_model::{Member, MemberDirectory, MonthKey, Post};
use feedvault_runtime::{resolve_author, FeedRenderer};
use serde::Serialize;

#[derive(Serialize)]
struct PostLine<'a> {
    author: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    display_id: Option<&'a str>,
    #[serde(flatten)]
    post: &'a Post,
}

/// Keeps the rendered form of whatever is currently on screen. `reset`
/// replaces it, `append` extends it, so after a run the buffer matches the
/// session's visible posts minus those with an unknown author.
#[derive(Debug, Default)]
pub struct PageBuffer {
    json: bool,
    blocks: Vec<String>,
    skipped: usize,
}

impl PageBuffer {
    #[must_use]
    pub fn new(json: bool) -> Self {
        Self {
            json,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn blocks(&self) -> &[String] {
        &self.blocks
    }

    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    fn push_all(&mut self, members: &MemberDirectory, posts: &[&Post]) {
        for post in posts {
            match resolve_author(members, post) {
                Some(author) => {
                    let block = if self.json {
                        post_json(author, post)
                    } else {
                        post_text(author, post)
                    };
                    self.blocks.push(block);
                }
                None => self.skipped += 1,
            }
        }
    }
}

impl FeedRenderer for PageBuffer {
    fn reset(&mut self, members: &MemberDirectory, posts: &[&Post]) {
        self.blocks.clear();
        self.skipped = 0;
        self.push_all(members, posts);
    }

    fn append(&mut self, members: &MemberDirectory, posts: &[&Post]) {
        self.push_all(members, posts);
    }
}

fn post_json(author: &Member, post: &Post) -> String {
    let line = PostLine {
        author: &author.name,
        display_id: author.display_id.as_deref(),
        post,
    };
    serde_json::to_string(&line).unwrap_or_else(|e| format!("{{\"error\":\"{e}\"}}"))
}

fn post_text(author: &Member, post: &Post) -> String {
    let mut out = format!("[{}] {}", post.date(), author.name);
    if let Some(display_id) = author.display_id.as_deref().filter(|d| !d.is_empty()) {
        out.push(' ');
        out.push_str(display_id);
    }
    out.push_str("\n  ");
    out.push_str(post.translation());
    if let Some(original) = post.original().filter(|o| !o.is_empty()) {
        out.push_str("\n  > ");
        out.push_str(original);
    }
    if !post.tags().is_empty() {
        let tags: Vec<String> = post.tags().iter().map(|t| format!("#{t}")).collect();
        out.push_str("\n  ");
        out.push_str(&tags.join(" "));
    }
    let labels: Vec<&str> = post.hidden_labels().into_iter().collect();
    if !labels.is_empty() {
        out.push_str("\n  (");
        out.push_str(&labels.join(", "));
        out.push(')');
    }
    out
}

pub fn month_lines(months: &[MonthKey], json: bool) -> Vec<String> {
    if json {
        let keys: Vec<String> = months.iter().map(ToString::to_string).collect();
        return vec![serde_json::to_string(&keys).unwrap_or_else(|_| "[]".to_string())];
    }
    months.iter().map(ToString::to_string).collect()
}

pub fn label_lines(labels: &[String], json: bool) -> Vec<String> {
    if json {
        return vec![serde_json::to_string(labels).unwrap_or_else(|_| "[]".to_string())];
    }
    labels.to_vec()
}

pub fn member_lines(members: &MemberDirectory, json: bool) -> Vec<String> {
    members
        .iter()
        .map(|m| {
            if json {
                serde_json::to_string(m).unwrap_or_else(|_| format!("{{\"id\":\"{}\"}}", m.id))
            } else {
                match m.display_id.as_deref() {
                    Some(display_id) => format!("{}\t{}\t{}", m.id, m.name, display_id),
                    None => format!("{}\t{}", m.id, m.name),
                }
            }
        })
        .collect()
}

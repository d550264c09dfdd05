//! Directory tree rendering from a flat path list.

use std::collections::BTreeMap;

/// One directory level: subdirectories by name, then file names.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub name: String,
    pub children: BTreeMap<String, TreeNode>,
    pub files: Vec<String>,
}

impl TreeNode {
    fn named(name: &str) -> Self {
        Self { name: name.to_string(), ..Self::default() }
    }

    /// Build a tree from `/`-separated relative paths; the last segment of each
    /// path is a file, every earlier segment a directory.
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut root = TreeNode::default();
        for path in paths {
            let mut parts: Vec<&str> = path.as_ref().split('/').filter(|p| !p.is_empty()).collect();
            let Some(file) = parts.pop() else {
                continue;
            };
            let mut node = &mut root;
            for dir in parts {
                node = node.children.entry(dir.to_string()).or_insert_with(|| TreeNode::named(dir));
            }
            node.files.push(file.to_string());
        }
        root.sort();
        root
    }

    fn sort(&mut self) {
        self.files.sort();
        for child in self.children.values_mut() {
            child.sort();
        }
    }
}

/// Render paths as a box-drawing tree. The root itself is not listed.
pub fn render_tree<I, S>(paths: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let root = TreeNode::from_paths(paths);
    let mut lines = Vec::new();
    render_node(&root, "", &mut lines);
    lines.join("\n")
}

fn render_node(node: &TreeNode, prefix: &str, lines: &mut Vec<String>) {
    let total = node.children.len() + node.files.len();

    // Directories first (BTreeMap keeps them sorted), then files.
    for (idx, child) in node.children.values().enumerate() {
        let is_last = idx + 1 == total;
        let connector = if is_last { "└── " } else { "├── " };
        lines.push(format!("{prefix}{connector}{}", child.name));
        let extension = if is_last { "    " } else { "│   " };
        render_node(child, &format!("{prefix}{extension}"), lines);
    }

    let offset = node.children.len();
    for (idx, file) in node.files.iter().enumerate() {
        let is_last = offset + idx + 1 == total;
        let connector = if is_last { "└── " } else { "├── " };
        lines.push(format!("{prefix}{connector}{file}"));
    }
}

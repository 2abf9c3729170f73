use colored::Colorize;
use supports_color::Stream;

use crate::filesystem::FilesystemNode;

pub fn stdout_supports_color() -> bool {
    supports_color::on(Stream::Stdout).is_some()
}

/// Renders the tree in the puzzle's listing notation, one node per line,
/// indented by two spaces per level.
pub fn render_tree(root: &FilesystemNode, colorize: bool) -> String {
    let mut output = String::new();
    render_node(root, 0, colorize, &mut output);
    output
}

fn render_node(node: &FilesystemNode, depth: usize, colorize: bool, output: &mut String) {
    let line = node.to_string();
    let line = if colorize && node.is_directory() {
        line.blue().bold().to_string()
    } else {
        line
    };
    output.push_str(&format!("{:indent$}- {}\n", "", line, indent = depth * 2));

    for child in node.children() {
        render_node(child, depth + 1, colorize, output);
    }
}

//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use colored::Colorize;
use itertools::Itertools;

use crate::application::services::Detection;
use crate::domain::{Projection, Tree};
use crate::tree_traits::TreeRender;

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print warning (yellow "Warning:" prefix) to stderr
pub fn warning(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "Warning".yellow(), msg);
}

/// Print success status (green checkmark)
pub fn success(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{} {}", "✓".green(), msg);
}

/// Print section header (cyan bold)
pub fn header(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

/// Print plain output (no color, for data such as JSON)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}

/// Print the tree; closed groups stay collapsed unless `show_all`.
pub fn tree(tree: &Tree, show_all: bool) {
    print!("{}", tree.to_term_tree(show_all));
}

/// Print checked leaves and bound values as two sections.
pub fn projection(projection: &Projection) {
    header("Selected");
    if projection.checked_leaf_ids.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for id in &projection.checked_leaf_ids {
        println!("  {}", id.green());
    }
    header("Values");
    if projection.values.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for (id, value) in &projection.values {
        println!("  {} = {}", id, value.to_string().yellow());
    }
}

/// Print one line per detection: label, confidence and box.
pub fn detections(kept: &[Detection], total: usize) {
    header(&format!("{} of {} detections kept", kept.len(), total));
    for d in kept {
        println!("  {:<16} {:>5.2}  {:?}", d.label, d.confidence, d.bbox);
    }
    if !kept.is_empty() {
        println!("  {}", label_summary(kept).dimmed());
    }
}

/// Per-label counts, alphabetical: `aircraft: 2, vessels: 1`.
fn label_summary(kept: &[Detection]) -> String {
    kept.iter()
        .counts_by(|d| d.label.to_lowercase())
        .into_iter()
        .sorted()
        .map(|(label, n)| format!("{label}: {n}"))
        .join(", ")
}

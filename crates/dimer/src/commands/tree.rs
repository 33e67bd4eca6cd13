//! `dimer tree` command implementation.

use dimer_api::{HttpClient, TreeCategory, Version};

use super::Context;
use crate::error::CliError;
use crate::output::Output;

/// Execute the tree command.
pub(crate) async fn execute<C: HttpClient + 'static>(
    ctx: &Context<C>,
    output: &Output,
) -> Result<(), CliError> {
    let version = ctx.version()?;
    output.info(&format!(
        "Zone {} version {}",
        version.zone_slug(),
        version.no()
    ));

    let tree = version.tree(false).await?;
    for line in tree_lines(&tree, &version, output) {
        output.result(&line);
    }
    Ok(())
}

/// Category headings with one line per document and its URL.
fn tree_lines<C: HttpClient>(
    tree: &[TreeCategory],
    version: &Version<C>,
    output: &Output,
) -> Vec<String> {
    let mut lines = Vec::new();
    for category in tree {
        lines.push(output.heading(&category.category));
        for doc in &category.docs {
            let title = doc.title.as_deref().unwrap_or(&doc.permalink);
            let url = version.make_url(&doc.permalink);
            lines.push(format!("  {title}  {}", output.muted(&url)));
        }
    }
    lines
}

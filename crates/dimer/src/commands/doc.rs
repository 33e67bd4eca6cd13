//! `dimer doc` command implementation.

use clap::Args;
use dimer_api::{Doc, HttpClient, Version};
use dimer_tree::{Html, HtmlFactory, TreeRenderer};
use tracing::debug;

use super::Context;
use crate::error::CliError;
use crate::output::Output;
use crate::render::html_renderer;

/// Redirect hops followed before giving up.
const MAX_REDIRECTS: usize = 5;

/// Arguments for the doc command.
#[derive(Args)]
pub(crate) struct DocArgs {
    /// Document permalink.
    permalink: String,

    /// Print the redirect target instead of following it.
    #[arg(long)]
    no_follow: bool,
}

impl DocArgs {
    /// Execute the doc command.
    pub(crate) async fn execute<C: HttpClient + 'static>(
        self,
        ctx: &Context<C>,
        output: &Output,
    ) -> Result<(), CliError> {
        let version = ctx.version()?;
        let doc = fetch_doc(&version, &self.permalink, !self.no_follow, output).await?;

        if let Some(target) = doc.redirect.as_deref().filter(|_| doc.is_redirect()) {
            output.result(&version.make_url(target));
            return Ok(());
        }

        let renderer = html_renderer(&ctx.config.render);
        output.result(render_doc(&doc, &renderer)?.as_str());
        Ok(())
    }
}

/// Fetch `permalink`, following redirects when `follow` is set.
async fn fetch_doc<C: HttpClient>(
    version: &Version<C>,
    permalink: &str,
    follow: bool,
    output: &Output,
) -> Result<Doc, CliError> {
    let mut doc = version.doc(permalink).await?;
    let mut hops = 0;

    while follow && doc.is_redirect() {
        if hops == MAX_REDIRECTS {
            return Err(CliError::Validation(format!(
                "{permalink}: more than {MAX_REDIRECTS} redirects"
            )));
        }
        let target = doc.redirect.take().unwrap_or_default();
        debug!(from = permalink, to = %target, hop = hops + 1, "following redirect");
        output.warning(&format!("Redirected to {target}"));
        doc = version.doc(&target).await?;
        hops += 1;
    }
    Ok(doc)
}

/// Render the content tree of `doc` to HTML.
fn render_doc(doc: &Doc, renderer: &TreeRenderer<HtmlFactory>) -> Result<Html, CliError> {
    let content = doc.content.as_ref().ok_or_else(|| {
        let name = doc.permalink.as_deref().unwrap_or("document");
        CliError::Validation(format!("{name} has no content"))
    })?;
    Ok(renderer.render_tree(content)?)
}

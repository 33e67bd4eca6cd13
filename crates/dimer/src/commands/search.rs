//! `dimer search` command implementation.

use clap::Args;
use dimer_api::{HttpClient, SearchHit, Version, VersionKey};

use super::Context;
use crate::error::CliError;
use crate::output::Output;
use crate::render::TermFactory;

/// Arguments for the search command.
#[derive(Args)]
pub(crate) struct SearchArgs {
    /// Search query.
    query: String,

    /// Maximum number of hits per version (overrides config).
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Search the default version of every zone.
    #[arg(long)]
    all_zones: bool,
}

impl SearchArgs {
    /// Execute the search command.
    pub(crate) async fn execute<C: HttpClient + 'static>(
        self,
        ctx: &Context<C>,
        output: &Output,
    ) -> Result<(), CliError> {
        let limit = ctx.config.search.limit;
        let factory = TermFactory::new();
        if !self.all_zones {
            let version = ctx.version()?;
            let hits = version.search(&self.query, limit).await?.unwrap_or_default();
            print_hits(&hits, &version, &factory, output);
            return Ok(());
        }

        let keys = default_versions(ctx, output);
        for result in ctx.session.search_all(&keys, &self.query, limit).await {
            let heading = format!("{} {}", result.key.zone_slug, result.key.version_no);
            output.result(&output.heading(&heading));
            match result.hits {
                Ok(hits) => {
                    let version = ctx.session.version(&result.key)?;
                    print_hits(&hits.unwrap_or_default(), &version, &factory, output);
                }
                Err(err) => output.error(&format!("  {err}")),
            }
        }
        Ok(())
    }
}

/// Default version of every zone. Zones without one are reported and skipped.
fn default_versions<C: HttpClient + 'static>(ctx: &Context<C>, output: &Output) -> Vec<VersionKey> {
    let zones = ctx.session.dimer().zones().unwrap_or_default();
    zones
        .iter()
        .filter_map(|zone| {
            let key = ctx
                .session
                .dimer()
                .closest_zone_and_version(Some(zone.slug.as_str()), None);
            if let Err(err) = &key {
                output.warning(&format!("Skipping zone {}: {err}", zone.slug));
            }
            key.ok()
        })
        .collect()
}

fn print_hits<C: HttpClient>(
    hits: &[SearchHit],
    version: &Version<C>,
    factory: &TermFactory,
    output: &Output,
) {
    if hits.is_empty() {
        output.warning("  No results");
        return;
    }
    for line in hit_lines(hits, version, factory, output) {
        output.result(&line);
    }
}

/// Title, URL and first excerpt of every hit.
fn hit_lines<C: HttpClient>(
    hits: &[SearchHit],
    version: &Version<C>,
    factory: &TermFactory,
    output: &Output,
) -> Vec<String> {
    let mut lines = Vec::new();
    for hit in hits {
        let mut title = format!("  {}", factory.line(&hit.title));
        if let Some(permalink) = hit.permalink() {
            title.push_str("  ");
            title.push_str(&output.muted(&version.make_url(permalink)));
        }
        lines.push(title);

        if let Some(excerpt) = hit.excerpt() {
            lines.push(format!("    {}", factory.line(excerpt)));
        }
    }
    lines
}

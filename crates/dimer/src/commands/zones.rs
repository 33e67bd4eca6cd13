//! `dimer zones` command implementation.

use dimer_api::{HttpClient, ZoneEntry};

use super::Context;
use crate::output::Output;

/// Execute the zones command.
pub(crate) fn execute<C: HttpClient + 'static>(ctx: &Context<C>, output: &Output) {
    let zones = ctx.session.dimer().zones().unwrap_or_default();
    if zones.is_empty() {
        output.warning("No zones published");
        return;
    }
    for line in zone_lines(zones, output) {
        output.result(&line);
    }
}

/// One heading per zone followed by its versions.
fn zone_lines(zones: &[ZoneEntry], output: &Output) -> Vec<String> {
    let mut lines = Vec::new();
    for zone in zones {
        let heading = match &zone.name {
            Some(name) => format!("{} ({name})", zone.slug),
            None => zone.slug.clone(),
        };
        lines.push(output.heading(&heading));

        for version in &zone.versions {
            let mut line = format!("  {}", version.no);
            if let Some(name) = version.name.as_deref().filter(|name| *name != version.no) {
                line.push_str(&format!(" {name}"));
            }
            if version.default {
                line.push_str(&output.muted(" [default]"));
            }
            lines.push(line);
        }
    }
    lines
}

//! `dimer url` command implementation.

use clap::Args;
use dimer_api::HttpClient;

use super::Context;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the url command.
#[derive(Args)]
pub(crate) struct UrlArgs {
    /// Document permalinks.
    #[arg(required = true)]
    permalinks: Vec<String>,
}

impl UrlArgs {
    /// Execute the url command.
    pub(crate) fn execute<C: HttpClient + 'static>(
        &self,
        ctx: &Context<C>,
        output: &Output,
    ) -> Result<(), CliError> {
        let version = ctx.version()?;
        for permalink in &self.permalinks {
            output.result(&version.make_url(permalink));
        }
        Ok(())
    }
}

use anyhow::Result;

use crate::cli::{BedsArgs, OutputFormat};
use crate::client::{BedQuery, HimsClient};
use crate::output::print_beds;

pub async fn list(client: &HimsClient, args: &BedsArgs, format: OutputFormat) -> Result<()> {
    let query = BedQuery {
        service: args.service.as_deref(),
        status: args.status,
        available_only: args.available,
    };
    let beds = client.beds(&query).await?;
    print_beds(&beds, format)
}

use anyhow::Result;
use tracing::info;

use crate::cli::ClassifyArgs;
use crate::extract::{ExtractOptions, ReportExtractor};
use crate::util::read_input;

pub fn run(args: ClassifyArgs) -> Result<()> {
    let text = read_input(&args.input)?;
    let extractor = ReportExtractor::new(ExtractOptions::current(None, args.min_chars))?;

    let kind = extractor.classify(&text);
    info!(
        input = %args.input.display(),
        chars = text.chars().count(),
        kind = kind.as_str(),
        "classified report"
    );
    println!("{}", kind.as_str());

    Ok(())
}

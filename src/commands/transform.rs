use std::sync::Arc;

use htmlstage::config::Config;
use htmlstage::transform::builtin;
use htmlstage::{Aggregate, Page, Transformer};

use super::write_output;
use crate::TransformArgs;

pub async fn run(args: &TransformArgs) -> Result<(), anyhow::Error> {
    let config = Config::load_from_arg(args.config_file.as_deref())?;

    let aggregate = Arc::new(Aggregate::new());
    let mut transformer = Transformer::new();
    transformer.set_benchmarks(aggregate.clone());
    builtin::configure(&mut transformer, &config)?;

    let content = tokio::fs::read_to_string(&args.input).await?;
    let page = Page::new(
        args.input.display().to_string(),
        args.output_path.clone(),
        args.url.clone(),
    );

    // Rewriting is CPU-bound; keep it off the async workers
    let output = tokio::task::spawn_blocking(move || {
        transformer.run(&page.output_path, content, &page)
    })
    .await??;

    write_output(args.out.as_deref(), &output).await?;

    for (label, stat) in aggregate.snapshot() {
        tracing::debug!(count = stat.count, total = ?stat.total, "{label}");
    }
    if args.timings {
        let timings: serde_json::Map<String, serde_json::Value> = aggregate
            .snapshot()
            .into_iter()
            .map(|(label, stat)| Ok((label, serde_json::to_value(stat)?)))
            .collect::<Result<_, serde_json::Error>>()?;
        eprintln!("{}", serde_json::to_string_pretty(&timings)?);
    }

    Ok(())
}

use htmlstage::chain::builtin;
use htmlstage::config::Config;
use htmlstage::{Page, run_all};

use super::write_output;
use crate::RenderArgs;

pub async fn run(args: &RenderArgs) -> Result<(), anyhow::Error> {
    let config = Config::load_from_arg(args.config_file.as_deref())?;

    // Transforms named on the command line replace the configured chain
    let names = if args.transforms.is_empty() {
        &config.transforms
    } else {
        &args.transforms
    };
    let transforms = builtin::from_names(names, &config.processing)?;

    let content = tokio::fs::read_to_string(&args.input).await?;
    let page = Page::new(
        args.input.display().to_string(),
        args.output_path.clone(),
        args.url.clone(),
    );

    let output = run_all(
        content,
        &page,
        &transforms,
        args.extension_override.as_deref(),
    )
    .await?;

    tracing::debug!(transforms = transforms.len(), "rendered transforms");
    write_output(args.out.as_deref(), &output).await?;

    Ok(())
}

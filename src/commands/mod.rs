pub mod render;
pub mod transform;

use std::path::Path;

use tokio::io::AsyncWriteExt;

/// Write command output to a file, or to stdout when no file is given.
async fn write_output(out: Option<&Path>, content: &str) -> Result<(), anyhow::Error> {
    match out {
        Some(path) => {
            tokio::fs::write(path, content).await?;
            tracing::info!("Wrote {}", path.display());
        }
        None => {
            let mut stdout = tokio::io::stdout();
            stdout.write_all(content.as_bytes()).await?;
            stdout.flush().await?;
        }
    }
    Ok(())
}

use crate::client::exporters::event_writer::EventWriter;
use crate::client::InsightsSink;
use crate::config::Config;
use anyhow::{Context, Result};
use serde_json::Value;
use std::future::Future;
use std::path::Path;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

pub async fn run(config: &Config, input: Option<&Path>) -> Result<()> {
    let sink = InsightsSink::new(config).context("failed to initialize Insights sink")?;

    let forwarded = match input {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("failed to open input {:?}", path))?;
            forward_lines(&sink, BufReader::new(file), tokio::signal::ctrl_c()).await
        }
        None => {
            forward_lines(
                &sink,
                BufReader::new(tokio::io::stdin()),
                tokio::signal::ctrl_c(),
            )
            .await
        }
    };

    // flush whatever is buffered even when reading failed
    sink.on_shutdown().await;

    let forwarded = forwarded?;
    info!("Forwarded {} events", forwarded);
    Ok(())
}

/// Feeds each JSON object line to the sink until end of input or until
/// `shutdown` resolves. Returns how many events were handed over.
pub async fn forward_lines<R, W, S>(sink: &InsightsSink<W>, reader: R, shutdown: S) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: EventWriter,
    S: Future,
{
    let mut lines = reader.lines();
    let mut forwarded = 0;
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown requested, stopping input");
                break;
            }
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read input")? else {
                    debug!("End of input");
                    break;
                };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                match serde_json::from_str::<Value>(line) {
                    Ok(Value::Object(event)) => {
                        sink.on_event(&event).await;
                        forwarded += 1;
                    }
                    Ok(_) => warn!("Skipping input line that is not a JSON object"),
                    Err(e) => warn!("Skipping unparsable input line: {}", e),
                }
            }
        }
    }

    Ok(forwarded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::exporters::testing::RecordingWriter;
    use std::future::pending;

    #[tokio::test]
    async fn forwards_object_lines_and_skips_the_rest() {
        let writer = RecordingWriter::new();
        let config = Config {
            batch_enabled: false,
            ..Config::new("284929", "key")
        };
        let sink = InsightsSink::with_writer(&config, writer.clone()).unwrap();
        let input = b"{\"message\":\"a\"}\n\nnot json\n[1,2]\n{\"message\":\"b\"}\n";

        let forwarded = forward_lines(&sink, &input[..], pending::<()>()).await.unwrap();

        assert_eq!(forwarded, 2);
        assert_eq!(writer.payloads().len(), 2);
    }

    #[tokio::test]
    async fn stops_when_shutdown_resolves() {
        let writer = RecordingWriter::new();
        let sink = InsightsSink::with_writer(&Config::new("284929", "key"), writer.clone()).unwrap();
        let (_tx, rx) = tokio::io::duplex(64);

        let forwarded = forward_lines(&sink, BufReader::new(rx), async {}).await.unwrap();

        assert_eq!(forwarded, 0);
        assert!(writer.payloads().is_empty());
    }
}

use anyhow::anyhow;
use clap::Parser;
use docsearch::cli::{Cli, TerminalSink};
use docsearch::config::UserConfig;
use docsearch::controller::QueryController;
use docsearch::loader::{IndexFuture, spawn_index_load};
use docsearch::render::{RenderOutcome, RenderTask};
use futures::future::OptionFuture;
use std::io::Stdout;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::{JoinHandle, LocalSet};

type Controller = QueryController<TerminalSink<Stdout>, UserConfig>;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    docsearch::tracing::init(cli.verbose);

    let settings = cli.settings();
    let preferences = cli.preferences()?;
    let controller = QueryController::new(TerminalSink::stdout(), preferences, &settings)?;

    // Load in the background so queries can be accepted (and queued) meanwhile.
    let index = spawn_index_load(cli.index.clone());

    let local = LocalSet::new();
    local
        .run_until(async move {
            if cli.query.is_empty() {
                interactive(controller, index).await
            } else {
                one_shot(controller, index, &cli.query.join(" ")).await
            }
        })
        .await
}

/// Run a single query once the index is loaded.
async fn one_shot(mut controller: Controller, index: IndexFuture, query: &str) -> anyhow::Result<()> {
    if let Some(task) = controller.submit_when_ready(index, query).await? {
        task.run().await;
    }
    Ok(())
}

/// Treat every stdin line as a new submission until EOF.
async fn interactive(mut controller: Controller, index: IndexFuture) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut index = Some(index);
    let mut render: Option<JoinHandle<RenderOutcome>> = None;

    loop {
        tokio::select! {
            Some(loaded) = OptionFuture::from(index.as_mut()), if index.is_some() => {
                index = None;
                let loaded = loaded.map_err(|e| anyhow!(e))?;
                if let Some(task) = controller.on_index_ready(loaded)? {
                    render = Some(spawn_render(task));
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if let Some(task) = controller.submit(line.trim()) {
                    render = Some(spawn_render(task));
                }
            }
        }
    }

    // EOF: finish loading for a still-queued query, then let the last render complete.
    if let Some(index) = index
        && controller.state().queued_query.is_some()
    {
        let loaded = index.await.map_err(|e| anyhow!(e))?;
        if let Some(task) = controller.on_index_ready(loaded)? {
            render = Some(spawn_render(task));
        }
    }
    if let Some(render) = render {
        render.await?;
    }
    Ok(())
}

fn spawn_render(task: RenderTask<TerminalSink<Stdout>>) -> JoinHandle<RenderOutcome> {
    tokio::task::spawn_local(task.run())
}

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use roulette_core::{GoalEvent, HistoryHook, WinnerQuery};
use tokio::fs;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tracing::{debug, error, info, warn};

use crate::config::ServerConfig;
use crate::protocol::{
    DaemonRequest, DaemonResponse, ErrorCode, ErrorResponse, GoalRequest, HistoryResponse,
    MarblesResponse, RecordedResponse, RequestBody, ResetResponse, ResponseBody,
    WinCountsRequest, WinCountsResponse,
};

pub struct BiasServer {
    config: ServerConfig,
    hook: Arc<HistoryHook>,
}

impl BiasServer {
    pub fn new(config: ServerConfig, hook: HistoryHook) -> Self {
        Self {
            config,
            hook: Arc::new(hook),
        }
    }

    pub async fn run(&self) -> Result<()> {
        self.prepare_socket_path().await?;
        if self.config.socket_path.exists() {
            fs::remove_file(&self.config.socket_path)
                .await
                .with_context(|| {
                    format!(
                        "failed to cleanup stale socket {}",
                        self.config.socket_path.display()
                    )
                })?;
        }

        let listener = UnixListener::bind(&self.config.socket_path).with_context(|| {
            format!(
                "failed to bind unix socket at {}",
                self.config.socket_path.display()
            )
        })?;
        info!(
            "roulette bias daemon listening on {}",
            self.config.socket_path.display()
        );

        loop {
            let (stream, _) = listener.accept().await?;
            let hook = self.hook.clone();
            tokio::spawn(async move {
                if let Err(error) = handle_connection(stream, hook).await {
                    warn!("connection closed with error: {error:#}");
                }
            });
        }
    }

    async fn prepare_socket_path(&self) -> Result<()> {
        if let Some(parent) = Path::new(&self.config.socket_path).parent() {
            fs::create_dir_all(parent).await.with_context(|| {
                format!("failed to create socket directory {}", parent.display())
            })?;
        }
        Ok(())
    }
}

async fn handle_connection(stream: UnixStream, hook: Arc<HistoryHook>) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let response = tokio::task::spawn_blocking({
            let hook = hook.clone();
            move || process_line(&line, &hook)
        })
        .await
        .context("request handler panicked")?;
        let payload = serde_json::to_string(&response)?;
        writer.write_all(payload.as_bytes()).await?;
        writer.write_all(b"\n").await?;
    }
    Ok(())
}

fn process_line(line: &str, hook: &HistoryHook) -> DaemonResponse {
    match serde_json::from_str::<DaemonRequest>(line) {
        Ok(request) => handle_request(request, hook),
        Err(error) => {
            error!("invalid request JSON: {error}");
            DaemonResponse {
                id: String::new(),
                body: ResponseBody::Error(ErrorResponse {
                    code: ErrorCode::InvalidRequest,
                    message: format!("invalid JSON payload: {error}"),
                }),
            }
        }
    }
}

/// What the remote widget reported about the winner alongside its goal event.
struct ReportedWinner<'a> {
    goal: &'a GoalRequest,
}

impl WinnerQuery for ReportedWinner<'_> {
    fn winner_name(&self) -> Option<String> {
        self.goal.winner_name.clone()
    }

    fn winners(&self) -> Vec<String> {
        self.goal.winners.clone()
    }
}

fn handle_request(request: DaemonRequest, hook: &HistoryHook) -> DaemonResponse {
    let id = request.id;
    let body = match request.body {
        RequestBody::Ping => ResponseBody::Pong,
        RequestBody::SetMarbles(payload) => {
            let tokens = match payload.settings {
                Some(settings) => hook.adjust_entrants_with(payload.tokens, &settings),
                None => hook.adjust_entrants(payload.tokens),
            };
            ResponseBody::Marbles(MarblesResponse { tokens })
        }
        RequestBody::Goal(goal) => {
            let event = GoalEvent::new(goal.detail.clone());
            let winner = hook.record_goal(&event, &ReportedWinner { goal: &goal });
            debug!(winner = ?winner, "goal handled");
            ResponseBody::Recorded(RecordedResponse { winner })
        }
        RequestBody::History => ResponseBody::History(HistoryResponse {
            entries: hook.store().get_history(),
        }),
        RequestBody::WinCounts(WinCountsRequest { window_days }) => {
            let window_days = window_days.unwrap_or_else(|| hook.settings().window_days);
            let counts = hook
                .store()
                .build_win_count_map(window_days)
                .into_iter()
                .collect();
            ResponseBody::WinCounts(WinCountsResponse {
                window_days,
                counts,
            })
        }
        RequestBody::Reset => ResponseBody::Reset(ResetResponse {
            message: hook.reset(),
        }),
    };
    DaemonResponse { id, body }
}

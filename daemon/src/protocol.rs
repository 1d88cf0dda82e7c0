use std::collections::BTreeMap;

use roulette_core::{BiasSettings, WinEntry};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonRequest {
    #[serde(default)]
    pub id: String,
    #[serde(flatten)]
    pub body: RequestBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RequestBody {
    SetMarbles(SetMarblesRequest),
    Goal(GoalRequest),
    History,
    WinCounts(WinCountsRequest),
    Reset,
    Ping,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonResponse {
    #[serde(default)]
    pub id: String,
    #[serde(flatten)]
    pub body: ResponseBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseBody {
    Marbles(MarblesResponse),
    Recorded(RecordedResponse),
    History(HistoryResponse),
    WinCounts(WinCountsResponse),
    Reset(ResetResponse),
    Pong,
    Error(ErrorResponse),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidRequest,
}

/// Entrant tokens about to be handed to the wheel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetMarblesRequest {
    pub tokens: Vec<String>,
    /// Current UI values; the daemon's configured settings apply when absent.
    #[serde(default)]
    pub settings: Option<BiasSettings>,
}

/// A "goal" signal plus whatever the widget can answer about the winner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalRequest {
    #[serde(default)]
    pub detail: Value,
    #[serde(default)]
    pub winner_name: Option<String>,
    #[serde(default)]
    pub winners: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WinCountsRequest {
    #[serde(default)]
    pub window_days: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarblesResponse {
    pub tokens: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedResponse {
    pub winner: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub entries: Vec<WinEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WinCountsResponse {
    pub window_days: i64,
    pub counts: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetResponse {
    pub message: String,
}

//! Session list and results structures

use serde::{Deserialize, Serialize};

/// The `SessionInfo` block: every session of the event
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct SessionInfoData {
    /// Current session number
    pub current_session_num: Option<i32>,
    /// List of sessions
    pub sessions: Vec<Session>,
}

/// Individual session data
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct Session {
    /// Session number
    pub session_num: i32,
    /// Session laps ("unlimited" or number)
    pub session_laps: String,
    /// Session time ("unlimited" or time)
    pub session_time: String,
    /// Number of laps to average for qualifying
    pub session_num_laps_to_avg: Option<i32>,
    /// Session type
    pub session_type: String,
    /// Session name
    pub session_name: Option<String>,
    /// Session track rubber state
    pub session_track_rubber_state: Option<String>,
    /// Final positions, when the session produced results
    pub results_positions: Option<Vec<ResultPosition>>,
    /// Fastest lap of the session
    pub results_fastest_lap: Option<Vec<FastestLap>>,
    /// Results average lap time
    pub results_average_lap_time: Option<f64>,
    /// Number of caution flags
    pub results_num_caution_flags: Option<i32>,
    /// Number of caution laps
    pub results_num_caution_laps: Option<i32>,
    /// Number of lead changes
    pub results_num_lead_changes: Option<i32>,
    /// Laps complete
    pub results_laps_complete: Option<i32>,
    /// Whether results are official
    pub results_official: Option<i32>,
}

/// One car's classification in a session
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct ResultPosition {
    pub position: Option<i32>,
    pub class_position: Option<i32>,
    pub car_idx: Option<i32>,
    pub lap: Option<i32>,
    pub time: Option<f64>,
    pub fastest_lap: Option<i32>,
    pub fastest_time: Option<f64>,
    pub last_time: Option<f64>,
    pub laps_led: Option<i32>,
    pub laps_complete: Option<i32>,
    pub incidents: Option<i32>,
    pub reason_out_str: Option<String>,
}

/// Session fastest lap entry
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct FastestLap {
    pub car_idx: Option<i32>,
    pub fastest_lap: Option<i32>,
    pub fastest_time: Option<f64>,
}

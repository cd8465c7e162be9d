//! Weekend and track information
//!
//! Track details, weather and the session identifiers used to group recordings.

use serde::{Deserialize, Serialize};

/// Weekend and track information from the session YAML
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct WeekendInfo {
    /// Track name
    pub track_name: String,
    /// Track ID
    #[serde(rename = "TrackID")]
    pub track_id: Option<i32>,
    /// Track length, e.g. "5.43 km"
    pub track_length: String,
    /// Track display name
    pub track_display_name: String,
    /// Track configuration name
    pub track_config_name: Option<String>,
    /// Track city
    pub track_city: Option<String>,
    /// Track country
    pub track_country: Option<String>,
    /// Track type (road course, oval, etc.)
    pub track_type: Option<String>,
    /// Track number of turns
    pub track_num_turns: Option<i32>,
    /// Track pit speed limit
    pub track_pit_speed_limit: Option<String>,
    /// Track weather type (Static, Dynamic)
    pub track_weather_type: Option<String>,
    /// Track skies condition
    pub track_skies: Option<String>,
    /// Track surface temperature, e.g. "41.38 C"
    pub track_surface_temp: Option<String>,
    /// Track air temperature
    pub track_air_temp: Option<String>,
    /// Track air pressure
    pub track_air_pressure: Option<String>,
    /// Track wind velocity
    pub track_wind_vel: Option<String>,
    /// Track wind direction
    pub track_wind_dir: Option<String>,
    /// Track relative humidity
    pub track_relative_humidity: Option<String>,
    /// Track fog level percentage
    pub track_fog_level: Option<String>,
    /// Track precipitation percentage
    pub track_precipitation: Option<String>,
    /// Series ID
    #[serde(rename = "SeriesID")]
    pub series_id: Option<i32>,
    /// Season ID
    #[serde(rename = "SeasonID")]
    pub season_id: Option<i32>,
    /// Session ID, shared by every split of an event
    #[serde(rename = "SessionID")]
    pub session_id: Option<i32>,
    /// Sub-session ID, unique per split; groups the files of one recording
    #[serde(rename = "SubSessionID")]
    pub sub_session_id: Option<i32>,
    /// League ID
    #[serde(rename = "LeagueID")]
    pub league_id: Option<i32>,
    /// Official session flag
    pub official: Option<i32>,
    /// Race week number
    pub race_week: Option<i32>,
    /// Event type (Test, Practice, Race, ...)
    pub event_type: Option<String>,
    /// Category (Road, Oval, etc.)
    pub category: Option<String>,
    /// Simulation mode (full, replay)
    pub sim_mode: Option<String>,
    /// Team racing enabled
    pub team_racing: Option<i32>,
    /// Number of car classes
    pub num_car_classes: Option<i32>,
    /// Number of car types
    pub num_car_types: Option<i32>,
    /// Build version
    pub build_version: Option<String>,
    /// Weekend options
    pub weekend_options: Option<WeekendOptions>,
    /// Telemetry options
    pub telemetry_options: Option<TelemetryOptions>,
}

/// Telemetry recording options
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct TelemetryOptions {
    /// Path of the file iRacing is writing this telemetry to
    pub telemetry_disk_file: Option<String>,
}

/// Weekend session options
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct WeekendOptions {
    pub num_starters: Option<i32>,
    pub starting_grid: Option<String>,
    pub qualify_scoring: Option<String>,
    pub course_cautions: Option<String>,
    pub standing_start: Option<i32>,
    pub restarts: Option<String>,
    pub weather_type: Option<String>,
    pub skies: Option<String>,
    pub weather_temp: Option<String>,
    pub time_of_day: Option<String>,
    /// Simulated calendar date of the session
    pub date: Option<String>,
    pub is_fixed_setup: Option<i32>,
    pub incident_limit: Option<String>,
    pub fast_repairs_limit: Option<String>,
}

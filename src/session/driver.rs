//! Driver information structures

use serde::{Deserialize, Serialize};

/// The recording driver's car details plus the list of every car in the session
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct DriverInfo {
    /// Car index of the driver who recorded the file
    pub driver_car_idx: Option<i32>,
    /// Driver user ID
    #[serde(rename = "DriverUserID")]
    pub driver_user_id: Option<i32>,
    /// Pace car index
    pub pace_car_idx: Option<i32>,
    /// Idle RPM
    #[serde(rename = "DriverCarIdleRPM")]
    pub driver_car_idle_rpm: Option<f64>,
    /// Redline RPM
    pub driver_car_red_line: Option<f64>,
    /// Fuel density (kg per liter)
    pub driver_car_fuel_kg_per_ltr: Option<f64>,
    /// Fuel tank capacity (liters)
    pub driver_car_fuel_max_ltr: Option<f64>,
    /// Maximum fuel fill fraction
    pub driver_car_max_fuel_pct: Option<f64>,
    /// Number of forward gears
    pub driver_car_gear_num_forward: Option<i32>,
    /// Shift light first RPM
    #[serde(rename = "DriverCarSLFirstRPM")]
    pub driver_car_sl_first_rpm: Option<f64>,
    /// Shift light shift RPM
    #[serde(rename = "DriverCarSLShiftRPM")]
    pub driver_car_sl_shift_rpm: Option<f64>,
    /// Shift light last RPM
    #[serde(rename = "DriverCarSLLastRPM")]
    pub driver_car_sl_last_rpm: Option<f64>,
    /// Shift light blink RPM
    #[serde(rename = "DriverCarSLBlinkRPM")]
    pub driver_car_sl_blink_rpm: Option<f64>,
    /// Car version
    pub driver_car_version: Option<String>,
    /// Estimated lap time
    pub driver_car_est_lap_time: Option<f64>,
    /// Setup name
    pub driver_setup_name: Option<String>,
    /// Setup modified flag
    pub driver_setup_is_modified: Option<i32>,
    /// Incident count
    pub driver_incident_count: Option<i32>,
    /// Every car in the session
    pub drivers: Vec<Driver>,
}

/// One car entry from the `Drivers` list
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct Driver {
    /// Car index number
    pub car_idx: i32,
    /// Driver name
    pub user_name: String,
    /// Driver abbreviation
    pub abbrev_name: Option<String>,
    /// Driver initials
    pub initials: Option<String>,
    /// User ID
    #[serde(rename = "UserID")]
    pub user_id: Option<i32>,
    /// Team ID
    #[serde(rename = "TeamID")]
    pub team_id: Option<i32>,
    /// Team name
    pub team_name: Option<String>,
    /// Car number (display)
    pub car_number: Option<String>,
    /// Car number raw
    pub car_number_raw: Option<i32>,
    /// Car path (directory name)
    pub car_path: Option<String>,
    /// Car class ID
    #[serde(rename = "CarClassID")]
    pub car_class_id: Option<i32>,
    /// Car ID
    #[serde(rename = "CarID")]
    pub car_id: Option<i32>,
    /// Car screen name
    pub car_screen_name: Option<String>,
    /// Car screen name short
    pub car_screen_name_short: Option<String>,
    /// Car class short name
    pub car_class_short_name: Option<String>,
    /// Car class estimated lap time
    pub car_class_est_lap_time: Option<f64>,
    /// Whether this is the pace car
    pub car_is_pace_car: Option<i32>,
    /// Whether this is AI
    #[serde(rename = "CarIsAI")]
    pub car_is_ai: Option<i32>,
    /// iRating
    pub i_rating: Option<i32>,
    /// License level
    pub lic_level: Option<i32>,
    /// License string (display)
    pub lic_string: Option<String>,
    /// Whether this entry is a spectator
    pub is_spectator: Option<i32>,
    /// Current driver incident count
    pub cur_driver_incident_count: Option<i32>,
    /// Team incident count
    pub team_incident_count: Option<i32>,
}

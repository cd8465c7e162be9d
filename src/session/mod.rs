//! # Session Information
//!
//! Each IBT file embeds the simulator's session YAML: track and weather, the list of
//! sessions with their results, every car in the event and the recording car's setup.
//! Tick decoding does not depend on it; the pipeline hands it to each processor unchanged
//! and multi-file runs use its sub-session ID to group recordings.
//!
//! ```rust
//! use ibtstream::SessionInfo;
//!
//! let yaml = "WeekendInfo:\n  TrackName: spa\n  SubSessionID: 71234567\n";
//! let session = SessionInfo::parse(yaml)?;
//! assert_eq!(session.weekend_info.track_name, "spa");
//! assert_eq!(session.sub_session_id(), Some(71234567));
//! # Ok::<(), ibtstream::TelemetryError>(())
//! ```

use serde::{Deserialize, Serialize};

pub mod driver;
pub mod session_data;
pub mod weekend;
pub mod yaml;

pub use driver::{Driver, DriverInfo};
pub use session_data::{FastestLap, ResultPosition, Session, SessionInfoData};
pub use weekend::{TelemetryOptions, WeekendInfo, WeekendOptions};
pub use yaml::read_session_info;

/// Session information parsed from an IBT file's YAML block
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct SessionInfo {
    /// Weekend and track information
    pub weekend_info: WeekendInfo,
    /// Session list and results
    pub session_info: SessionInfoData,
    /// Recording car and the list of every car
    pub driver_info: DriverInfo,
    /// Car setup, kept as raw YAML since its shape differs per car
    pub car_setup: Option<serde_yaml_ng::Value>,
}

impl SessionInfo {
    /// Parse cleaned session YAML.
    pub fn parse(yaml: &str) -> crate::Result<Self> {
        serde_yaml_ng::from_str(yaml)
            .map_err(|e| crate::TelemetryError::parse("session info", e.to_string()))
    }

    /// The driver who recorded the file, `None` when spectating or not listed.
    pub fn driver(&self) -> Option<&Driver> {
        let idx = self.driver_info.driver_car_idx?;
        self.driver_info.drivers.iter().find(|d| d.car_idx == idx)
    }

    /// Sub-session identifier grouping every file recorded in one session.
    pub fn sub_session_id(&self) -> Option<i32> {
        self.weekend_info.sub_session_id
    }

    /// The session the recording ended in.
    pub fn current_session(&self) -> Option<&Session> {
        let num = self.session_info.current_session_num?;
        self.session_info.sessions.iter().find(|s| s.session_num == num)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, Result};

    const SAMPLE: &str = r#"
WeekendInfo:
 TrackName: roadatlanta full
 TrackID: 127
 TrackLength: 4.02 km
 TrackDisplayName: Michelin Raceway Road Atlanta
 TrackSurfaceTemp: 41.38 C
 SessionID: 0
 SubSessionID: 71234567
 EventType: Race
 WeekendOptions:
  NumStarters: 20
  Date: 2024-06-24
 TelemetryOptions:
  TelemetryDiskFile: ""
SessionInfo:
 CurrentSessionNum: 2
 Sessions:
 - SessionNum: 0
   SessionLaps: unlimited
   SessionTime: 600.0000 sec
   SessionType: Practice
 - SessionNum: 2
   SessionLaps: 12
   SessionTime: unlimited
   SessionType: Race
   ResultsPositions:
   - Position: 1
     ClassPosition: 0
     CarIdx: 4
     Lap: 12
     Time: 1102.5
     FastestLap: 7
     FastestTime: 86.412
     LapsComplete: 12
     Incidents: 2
     ReasonOutStr: Running
   ResultsFastestLap:
   - CarIdx: 4
     FastestLap: 7
     FastestTime: 86.412
DriverInfo:
 DriverCarIdx: 4
 DriverUserID: 123456
 DriverCarRedLine: 7500.000
 Drivers:
 - CarIdx: 0
   UserName: Pace Car
   CarIsPaceCar: 1
 - CarIdx: 4
   UserName: Jane Doe
   CarNumber: "44"
   IRating: 2750
CarSetup:
 UpdateCount: 3
 Tires:
  LeftFront:
   ColdPressure: 152 kPa
"#;

    #[test]
    fn parses_representative_session_yaml() -> Result<()> {
        let session = SessionInfo::parse(SAMPLE).context("parsing sample session")?;

        assert_eq!(session.weekend_info.track_id, Some(127));
        assert_eq!(session.weekend_info.track_surface_temp.as_deref(), Some("41.38 C"));
        assert_eq!(session.sub_session_id(), Some(71234567));
        assert_eq!(
            session.weekend_info.weekend_options.as_ref().and_then(|o| o.num_starters),
            Some(20)
        );

        assert_eq!(session.session_info.sessions.len(), 2);
        let race = session.current_session().context("current session")?;
        assert_eq!(race.session_type, "Race");
        let results = race.results_positions.as_ref().context("race results")?;
        assert_eq!(results[0].car_idx, Some(4));
        assert_eq!(results[0].reason_out_str.as_deref(), Some("Running"));

        let setup = session.car_setup.as_ref().context("car setup")?;
        assert_eq!(setup["Tires"]["LeftFront"]["ColdPressure"].as_str(), Some("152 kPa"));
        Ok(())
    }

    #[test]
    fn driver_resolves_recording_car() -> Result<()> {
        let session = SessionInfo::parse(SAMPLE)?;
        let driver = session.driver().context("recording driver")?;
        assert_eq!(driver.user_name, "Jane Doe");
        assert_eq!(driver.i_rating, Some(2750));
        Ok(())
    }

    #[test]
    fn driver_is_none_when_not_listed() -> Result<()> {
        let session = SessionInfo::parse("DriverInfo:\n DriverCarIdx: 9\n Drivers: []\n")?;
        assert!(session.driver().is_none());
        assert!(SessionInfo::default().driver().is_none());
        Ok(())
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        let err = SessionInfo::parse("WeekendInfo: [unclosed").unwrap_err();
        assert!(err.to_string().starts_with("invalid session info detected"), "{err}");
    }
}

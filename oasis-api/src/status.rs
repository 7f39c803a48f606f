//! Status and error code tables plus the status-line codec
//!
//! The integer→symbol mappings here are part of the device wire contract and
//! are reproduced exactly. Unrecognized codes never fail: they fall closed to
//! the `Unknown` variant so a firmware update can never stop a poll loop.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Operating status reported by the device
///
/// The device reports status as an integer in a fixed 11-value table. Codes
/// outside the table map to `Unknown` carrying the raw value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceStatus {
    /// Device is starting up
    Booting,
    /// Idle, nothing playing
    Stopped,
    /// Re-centering the ball before a job
    Centering,
    /// Drawing a track
    Playing,
    /// Playback is paused
    Paused,
    /// Low-power sleep mode
    Sleeping,
    /// Device reports a fault; see the error code
    Error,
    /// Applying a software update
    Updating,
    /// Downloading a track file
    Downloading,
    /// Busy with an internal job
    Busy,
    /// Live drawing mode (app-driven)
    Live,
    /// Code outside the known table
    Unknown(u8),
}

impl DeviceStatus {
    /// Translate a raw wire code
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => DeviceStatus::Booting,
            2 => DeviceStatus::Stopped,
            3 => DeviceStatus::Centering,
            4 => DeviceStatus::Playing,
            5 => DeviceStatus::Paused,
            6 => DeviceStatus::Sleeping,
            9 => DeviceStatus::Error,
            11 => DeviceStatus::Updating,
            13 => DeviceStatus::Downloading,
            14 => DeviceStatus::Busy,
            15 => DeviceStatus::Live,
            other => DeviceStatus::Unknown(other),
        }
    }

    /// Raw wire code for this status
    pub fn code(&self) -> u8 {
        match self {
            DeviceStatus::Booting => 0,
            DeviceStatus::Stopped => 2,
            DeviceStatus::Centering => 3,
            DeviceStatus::Playing => 4,
            DeviceStatus::Paused => 5,
            DeviceStatus::Sleeping => 6,
            DeviceStatus::Error => 9,
            DeviceStatus::Updating => 11,
            DeviceStatus::Downloading => 13,
            DeviceStatus::Busy => 14,
            DeviceStatus::Live => 15,
            DeviceStatus::Unknown(code) => *code,
        }
    }

    /// Whether this status means the device cannot accept mutating commands
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            DeviceStatus::Centering
                | DeviceStatus::Updating
                | DeviceStatus::Downloading
                | DeviceStatus::Busy
                | DeviceStatus::Live
        )
    }
}

/// Device error code
///
/// 0 means no error; 1–18 name specific hardware, network and update
/// failures. A non-zero code is only meaningful while the status is `Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    None,
    FlashRead,
    WifiStart,
    DnsSetup,
    FileOpenWrite,
    UpgradeMemory,
    UpgradeFailed,
    VersionDownload,
    UpgradeFileRead,
    UpgradeDownloadStart,
    JobDownloadStart,
    FolderOpen,
    FileDelete,
    JobFileOpen,
    PowerAdapter,
    IpUpdate,
    CenteringFailed,
    DeviceFault,
    JobDownload,
    Unknown(u8),
}

impl ErrorCode {
    /// Translate a raw wire code
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => ErrorCode::None,
            1 => ErrorCode::FlashRead,
            2 => ErrorCode::WifiStart,
            3 => ErrorCode::DnsSetup,
            4 => ErrorCode::FileOpenWrite,
            5 => ErrorCode::UpgradeMemory,
            6 => ErrorCode::UpgradeFailed,
            7 => ErrorCode::VersionDownload,
            8 => ErrorCode::UpgradeFileRead,
            9 => ErrorCode::UpgradeDownloadStart,
            10 => ErrorCode::JobDownloadStart,
            11 => ErrorCode::FolderOpen,
            12 => ErrorCode::FileDelete,
            13 => ErrorCode::JobFileOpen,
            14 => ErrorCode::PowerAdapter,
            15 => ErrorCode::IpUpdate,
            16 => ErrorCode::CenteringFailed,
            17 => ErrorCode::DeviceFault,
            18 => ErrorCode::JobDownload,
            other => ErrorCode::Unknown(other),
        }
    }

    /// Raw wire code for this error
    pub fn code(&self) -> u8 {
        match self {
            ErrorCode::None => 0,
            ErrorCode::FlashRead => 1,
            ErrorCode::WifiStart => 2,
            ErrorCode::DnsSetup => 3,
            ErrorCode::FileOpenWrite => 4,
            ErrorCode::UpgradeMemory => 5,
            ErrorCode::UpgradeFailed => 6,
            ErrorCode::VersionDownload => 7,
            ErrorCode::UpgradeFileRead => 8,
            ErrorCode::UpgradeDownloadStart => 9,
            ErrorCode::JobDownloadStart => 10,
            ErrorCode::FolderOpen => 11,
            ErrorCode::FileDelete => 12,
            ErrorCode::JobFileOpen => 13,
            ErrorCode::PowerAdapter => 14,
            ErrorCode::IpUpdate => 15,
            ErrorCode::CenteringFailed => 16,
            ErrorCode::DeviceFault => 17,
            ErrorCode::JobDownload => 18,
            ErrorCode::Unknown(code) => *code,
        }
    }

    /// Human-readable description, matching the vendor's wording
    pub fn description(&self) -> String {
        match self {
            ErrorCode::None => "None".to_string(),
            ErrorCode::FlashRead => {
                "Error has occurred while reading the flash memory".to_string()
            }
            ErrorCode::WifiStart => "Error while starting the Wifi".to_string(),
            ErrorCode::DnsSetup => {
                "Error when starting DNS settings for your machine".to_string()
            }
            ErrorCode::FileOpenWrite => "Failed to open the file to write".to_string(),
            ErrorCode::UpgradeMemory => {
                "Not enough memory to perform the upgrade".to_string()
            }
            ErrorCode::UpgradeFailed => {
                "Error while trying to upgrade your system".to_string()
            }
            ErrorCode::VersionDownload => {
                "Error while trying to download the new version of the software".to_string()
            }
            ErrorCode::UpgradeFileRead => {
                "Error while reading the upgrading file".to_string()
            }
            ErrorCode::UpgradeDownloadStart => {
                "Failed to start downloading the upgrade file".to_string()
            }
            ErrorCode::JobDownloadStart => {
                "Error while starting downloading the job file".to_string()
            }
            ErrorCode::FolderOpen => "Error while opening the file folder".to_string(),
            ErrorCode::FileDelete => "Failed to delete a file".to_string(),
            ErrorCode::JobFileOpen => "Error while opening the job file".to_string(),
            ErrorCode::PowerAdapter => "You have wrong power adapter".to_string(),
            ErrorCode::IpUpdate => {
                "Failed to update the device IP on Oasis Server".to_string()
            }
            ErrorCode::CenteringFailed => {
                "Your device failed centering itself".to_string()
            }
            ErrorCode::DeviceFault => {
                "There appears to be an issue with your Oasis Device".to_string()
            }
            ErrorCode::JobDownload => "Error while downloading the job file".to_string(),
            ErrorCode::Unknown(code) => format!("Unknown error ({code})"),
        }
    }
}

/// LED effect names indexed by wire code
pub const LED_EFFECTS: [&str; 42] = [
    "Solid",
    "Rainbow",
    "Glitter",
    "Confetti",
    "Sinelon",
    "BPM",
    "Juggle",
    "Theater",
    "Color Wipe",
    "Sparkle",
    "Comet",
    "Follow Ball",
    "Follow Rainbow",
    "Chasing Comet",
    "Gradient Follow",
    "Cumulative Fill",
    "Multi Comets A",
    "Rainbow Chaser",
    "Twinkle Lights",
    "Tennis Game",
    "Breathing Exercise 4-7-8",
    "Cylon Scanner",
    "Palette Mode",
    "Aurora Flow",
    "Colorful Drops",
    "Color Snake",
    "Flickering Candles",
    "Digital Rain",
    "Center Explosion",
    "Rainbow Plasma",
    "Comet Race",
    "Color Waves",
    "Meteor Storm",
    "Firefly Flicker",
    "Ripple",
    "Jelly Bean",
    "Forest Rain",
    "Multi Comets",
    "Multi Comets with Background",
    "Rainbow Fill",
    "White Red Comet",
    "Color Comets",
];

/// Name of an LED effect code, if known
pub fn led_effect_name(code: u8) -> Option<&'static str> {
    LED_EFFECTS.get(usize::from(code)).copied()
}

/// Valid autoplay (wait-after) option codes
pub const AUTOPLAY_OPTIONS: [u8; 9] = [0, 1, 2, 3, 4, 5, 6, 7, 8];

/// One parsed `GETSTATUS` response
///
/// Field order follows the wire line. Older firmware omits the trailing
/// autoclean field; the parser handles both layouts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub status_code: u8,
    pub error_code: u8,
    pub ball_speed: u16,
    pub playlist: Vec<u32>,
    pub playlist_index: usize,
    pub progress: u32,
    pub led_effect: u8,
    pub led_color_id: String,
    pub led_speed: i16,
    pub brightness: u16,
    pub color: Option<String>,
    pub busy: bool,
    pub download_progress: u8,
    pub max_brightness: u16,
    pub wifi_connected: bool,
    pub repeat_playlist: bool,
    pub autoplay: String,
    pub autoclean: bool,
}

impl StatusUpdate {
    /// Translated status enumeration
    pub fn status(&self) -> DeviceStatus {
        DeviceStatus::from_code(self.status_code)
    }

    /// Translated error enumeration
    pub fn error(&self) -> ErrorCode {
        ErrorCode::from_code(self.error_code)
    }
}

fn parse_num<T: FromStr + Default>(value: &str) -> T {
    value.trim().parse().unwrap_or_default()
}

fn parse_bit(value: &str) -> bool {
    value.trim() == "1"
}

impl FromStr for StatusUpdate {
    type Err = ApiError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let values: Vec<&str> = raw.trim().split(';').collect();
        if values.len() < 17 {
            return Err(ApiError::Protocol(format!(
                "status line has {} fields, expected at least 17",
                values.len()
            )));
        }
        // Firmware with the autoclean field reports 18+ fields; everything
        // from the busy flag onward shifts accordingly.
        let shift = values.len().saturating_sub(18);

        let playlist: Vec<u32> = values[3]
            .split(',')
            .filter(|track| !track.is_empty())
            .map(parse_num)
            .collect();
        let playlist_index = usize::min(parse_num(values[4]), playlist.len());

        Ok(StatusUpdate {
            status_code: parse_num(values[0]),
            error_code: parse_num(values[1]),
            ball_speed: parse_num(values[2]),
            playlist,
            playlist_index,
            progress: parse_num(values[5]),
            led_effect: parse_num(values[6]),
            led_color_id: values[7].to_string(),
            led_speed: parse_num(values[8]),
            brightness: parse_num(values[9]),
            color: values[10]
                .contains('#')
                .then(|| values[10].to_string()),
            busy: parse_bit(values[11 + shift]),
            download_progress: parse_num(values[12 + shift]),
            max_brightness: parse_num(values[13 + shift]),
            wifi_connected: parse_bit(values[14 + shift]),
            repeat_playlist: parse_bit(values[15 + shift]),
            autoplay: values[16 + shift].to_string(),
            autoclean: if values.len() > 17 {
                parse_bit(values[17 + shift])
            } else {
                false
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0, DeviceStatus::Booting)]
    #[case(2, DeviceStatus::Stopped)]
    #[case(3, DeviceStatus::Centering)]
    #[case(4, DeviceStatus::Playing)]
    #[case(5, DeviceStatus::Paused)]
    #[case(6, DeviceStatus::Sleeping)]
    #[case(9, DeviceStatus::Error)]
    #[case(11, DeviceStatus::Updating)]
    #[case(13, DeviceStatus::Downloading)]
    #[case(14, DeviceStatus::Busy)]
    #[case(15, DeviceStatus::Live)]
    fn test_status_code_map(#[case] code: u8, #[case] expected: DeviceStatus) {
        assert_eq!(DeviceStatus::from_code(code), expected);
        assert_eq!(expected.code(), code);
    }

    #[rstest]
    #[case(1)]
    #[case(7)]
    #[case(8)]
    #[case(10)]
    #[case(12)]
    #[case(42)]
    #[case(255)]
    fn test_status_code_fallback(#[case] code: u8) {
        assert_eq!(DeviceStatus::from_code(code), DeviceStatus::Unknown(code));
        assert_eq!(DeviceStatus::Unknown(code).code(), code);
    }

    #[rstest]
    #[case(DeviceStatus::Centering)]
    #[case(DeviceStatus::Updating)]
    #[case(DeviceStatus::Downloading)]
    #[case(DeviceStatus::Busy)]
    #[case(DeviceStatus::Live)]
    fn test_busy_statuses(#[case] status: DeviceStatus) {
        assert!(status.is_busy());
    }

    #[rstest]
    #[case(DeviceStatus::Booting)]
    #[case(DeviceStatus::Stopped)]
    #[case(DeviceStatus::Playing)]
    #[case(DeviceStatus::Paused)]
    #[case(DeviceStatus::Sleeping)]
    #[case(DeviceStatus::Error)]
    #[case(DeviceStatus::Unknown(42))]
    fn test_non_busy_statuses(#[case] status: DeviceStatus) {
        assert!(!status.is_busy());
    }

    #[test]
    fn test_error_code_round_trip() {
        for code in 0..=18u8 {
            let error = ErrorCode::from_code(code);
            assert_ne!(error, ErrorCode::Unknown(code));
            assert_eq!(error.code(), code);
        }
    }

    #[test]
    fn test_error_code_fallback() {
        let error = ErrorCode::from_code(99);
        assert_eq!(error, ErrorCode::Unknown(99));
        assert_eq!(error.description(), "Unknown error (99)");
    }

    #[test]
    fn test_error_code_descriptions() {
        assert_eq!(ErrorCode::from_code(0).description(), "None");
        assert_eq!(
            ErrorCode::from_code(14).description(),
            "You have wrong power adapter"
        );
        assert_eq!(
            ErrorCode::from_code(18).description(),
            "Error while downloading the job file"
        );
    }

    #[test]
    fn test_led_effect_name() {
        assert_eq!(led_effect_name(0), Some("Solid"));
        assert_eq!(led_effect_name(41), Some("Color Comets"));
        assert_eq!(led_effect_name(42), None);
    }

    #[test]
    fn test_parse_status_line() {
        let line = "4;0;300;63,12,5;1;2500;1;0;10;150;#ff0000;0;0;200;1;1;0;0";
        let update: StatusUpdate = line.parse().unwrap();

        assert_eq!(update.status(), DeviceStatus::Playing);
        assert_eq!(update.error(), ErrorCode::None);
        assert_eq!(update.ball_speed, 300);
        assert_eq!(update.playlist, vec![63, 12, 5]);
        assert_eq!(update.playlist_index, 1);
        assert_eq!(update.progress, 2500);
        assert_eq!(update.led_effect, 1);
        assert_eq!(update.led_speed, 10);
        assert_eq!(update.brightness, 150);
        assert_eq!(update.color.as_deref(), Some("#ff0000"));
        assert!(!update.busy);
        assert_eq!(update.max_brightness, 200);
        assert!(update.wifi_connected);
        assert!(update.repeat_playlist);
        assert!(!update.autoclean);
    }

    #[test]
    fn test_parse_status_line_without_autoclean() {
        // 17 fields, pre-autoclean firmware
        let line = "2;0;300;;0;0;0;0;0;100;0;1;50;200;1;0;0";
        let update: StatusUpdate = line.parse().unwrap();

        assert_eq!(update.status(), DeviceStatus::Stopped);
        assert!(update.playlist.is_empty());
        assert!(update.busy);
        assert_eq!(update.download_progress, 50);
        assert!(!update.autoclean);
    }

    #[test]
    fn test_parse_status_line_unknown_codes() {
        // Unknown status and error codes still parse
        let line = "77;99;300;;0;0;0;0;0;100;0;0;0;200;1;0;0;0";
        let update: StatusUpdate = line.parse().unwrap();

        assert_eq!(update.status(), DeviceStatus::Unknown(77));
        assert_eq!(update.error(), ErrorCode::Unknown(99));
    }

    #[test]
    fn test_parse_status_line_clamps_index() {
        let line = "4;0;300;63;9;0;0;0;0;100;0;0;0;200;1;0;0;0";
        let update: StatusUpdate = line.parse().unwrap();
        assert_eq!(update.playlist_index, 1);
    }

    #[test]
    fn test_parse_status_line_too_short() {
        let result = "4;0;300".parse::<StatusUpdate>();
        assert!(matches!(result, Err(ApiError::Protocol(_))));
    }
}

//! Device command encoding
//!
//! Every recognized mutating operation, encoded as the single query parameter
//! the device expects. Range checks happen here, before any request is built.

use crate::error::ApiError;
use crate::status::AUTOPLAY_OPTIONS;

/// Lowest ball speed the device accepts
pub const BALL_SPEED_MIN: u16 = 100;
/// Highest ball speed the device accepts
pub const BALL_SPEED_MAX: u16 = 400;
/// Lowest LED animation speed
pub const LED_SPEED_MIN: i16 = -90;
/// Highest LED animation speed
pub const LED_SPEED_MAX: i16 = 90;

/// A mutating device operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Play,
    Pause,
    Stop,
    Sleep,
    Reboot,
    Upgrade { beta: bool },
    /// Select the queue entry at `index` as the current track
    ChangeTrack { index: usize },
    /// Replace the device queue with `ids`
    SetQueue { ids: Vec<u32> },
    /// Append `ids` to the device queue
    AppendToQueue { ids: Vec<u32> },
    /// Move a queue entry from one position to another
    MoveTrack { from: usize, to: usize },
    SetBallSpeed { speed: u16 },
    SetLed {
        effect: u8,
        color: String,
        speed: i16,
        brightness: u16,
        max_brightness: u16,
    },
    SetRepeat { repeat: bool },
    SetAutoplay { option: u8 },
    SetAutoclean { enabled: bool },
}

impl Command {
    /// Query parameter name and value for this command
    pub fn query_param(&self) -> (&'static str, String) {
        match self {
            Command::Play => ("CMDPLAY", String::new()),
            Command::Pause => ("CMDPAUSE", String::new()),
            Command::Stop => ("CMDSTOP", String::new()),
            Command::Sleep => ("CMDSLEEP", String::new()),
            Command::Reboot => ("CMDBOOT", String::new()),
            Command::Upgrade { beta } => ("CMDUPGRADE", u8::from(*beta).to_string()),
            Command::ChangeTrack { index } => ("CMDCHANGETRACK", index.to_string()),
            Command::SetQueue { ids } => ("WRIJOBLIST", csv(ids)),
            Command::AppendToQueue { ids } => ("ADDJOBLIST", csv(ids)),
            Command::MoveTrack { from, to } => ("MOVEJOB", format!("{from};{to}")),
            Command::SetBallSpeed { speed } => ("WRIOASISSPEED", speed.to_string()),
            Command::SetLed {
                effect,
                color,
                speed,
                brightness,
                ..
            } => (
                "WRILED",
                format!("{effect};0;{color};{speed};{brightness}"),
            ),
            Command::SetRepeat { repeat } => ("WRIREPEATJOB", u8::from(*repeat).to_string()),
            Command::SetAutoplay { option } => ("WRIWAITAFTER", option.to_string()),
            Command::SetAutoclean { enabled } => {
                ("WRIAUTOCLEAN", u8::from(*enabled).to_string())
            }
        }
    }

    /// Check parameter ranges against what the device accepts
    pub fn validate(&self) -> Result<(), ApiError> {
        match self {
            Command::SetBallSpeed { speed } => {
                if !(BALL_SPEED_MIN..=BALL_SPEED_MAX).contains(speed) {
                    return Err(ApiError::InvalidParameter(format!(
                        "ball speed {speed} out of range {BALL_SPEED_MIN}..={BALL_SPEED_MAX}"
                    )));
                }
            }
            Command::SetLed {
                effect,
                speed,
                brightness,
                max_brightness,
                ..
            } => {
                if crate::status::led_effect_name(*effect).is_none() {
                    return Err(ApiError::InvalidParameter(format!(
                        "unknown led effect {effect}"
                    )));
                }
                if !(LED_SPEED_MIN..=LED_SPEED_MAX).contains(speed) {
                    return Err(ApiError::InvalidParameter(format!(
                        "led speed {speed} out of range {LED_SPEED_MIN}..={LED_SPEED_MAX}"
                    )));
                }
                if brightness > max_brightness {
                    return Err(ApiError::InvalidParameter(format!(
                        "brightness {brightness} exceeds device maximum {max_brightness}"
                    )));
                }
            }
            Command::SetAutoplay { option } => {
                if !AUTOPLAY_OPTIONS.contains(option) {
                    return Err(ApiError::InvalidParameter(format!(
                        "unknown autoplay option {option}"
                    )));
                }
            }
            _ => {}
        }
        Ok(())
    }
}

fn csv(ids: &[u32]) -> String {
    ids.iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_param_encoding() {
        assert_eq!(Command::Play.query_param(), ("CMDPLAY", String::new()));
        assert_eq!(Command::Sleep.query_param(), ("CMDSLEEP", String::new()));
        assert_eq!(
            Command::SetQueue { ids: vec![63, 12] }.query_param(),
            ("WRIJOBLIST", "63,12".to_string())
        );
        assert_eq!(
            Command::AppendToQueue { ids: vec![5] }.query_param(),
            ("ADDJOBLIST", "5".to_string())
        );
        assert_eq!(
            Command::MoveTrack { from: 3, to: 1 }.query_param(),
            ("MOVEJOB", "3;1".to_string())
        );
        assert_eq!(
            Command::Upgrade { beta: true }.query_param(),
            ("CMDUPGRADE", "1".to_string())
        );
    }

    #[test]
    fn test_set_queue_empty_clears() {
        assert_eq!(
            Command::SetQueue { ids: vec![] }.query_param(),
            ("WRIJOBLIST", String::new())
        );
    }

    #[test]
    fn test_led_encoding() {
        let command = Command::SetLed {
            effect: 1,
            color: "#00ff00".to_string(),
            speed: -10,
            brightness: 120,
            max_brightness: 200,
        };
        assert_eq!(
            command.query_param(),
            ("WRILED", "1;0;#00ff00;-10;120".to_string())
        );
        assert!(command.validate().is_ok());
    }

    #[test]
    fn test_ball_speed_validation() {
        assert!(Command::SetBallSpeed { speed: 100 }.validate().is_ok());
        assert!(Command::SetBallSpeed { speed: 400 }.validate().is_ok());
        assert!(matches!(
            Command::SetBallSpeed { speed: 99 }.validate(),
            Err(ApiError::InvalidParameter(_))
        ));
        assert!(matches!(
            Command::SetBallSpeed { speed: 401 }.validate(),
            Err(ApiError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_led_validation() {
        let out_of_range = Command::SetLed {
            effect: 0,
            color: "#ffffff".to_string(),
            speed: 91,
            brightness: 0,
            max_brightness: 200,
        };
        assert!(matches!(
            out_of_range.validate(),
            Err(ApiError::InvalidParameter(_))
        ));

        let too_bright = Command::SetLed {
            effect: 0,
            color: "#ffffff".to_string(),
            speed: 0,
            brightness: 250,
            max_brightness: 200,
        };
        assert!(matches!(
            too_bright.validate(),
            Err(ApiError::InvalidParameter(_))
        ));

        let bad_effect = Command::SetLed {
            effect: 99,
            color: "#ffffff".to_string(),
            speed: 0,
            brightness: 0,
            max_brightness: 200,
        };
        assert!(matches!(
            bad_effect.validate(),
            Err(ApiError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_autoplay_validation() {
        assert!(Command::SetAutoplay { option: 0 }.validate().is_ok());
        assert!(matches!(
            Command::SetAutoplay { option: 9 }.validate(),
            Err(ApiError::InvalidParameter(_))
        ));
    }
}

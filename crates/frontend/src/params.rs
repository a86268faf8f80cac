//! Parameters forwarded to the pose estimator

use std::collections::HashMap;

use contracts::{REG_STRATEGY_KEY, REG_STRATEGY_VISUAL};
use tracing::warn;

/// Force visual-only registration; stereo odometry supports nothing else.
///
/// Returns `true` if a configured value had to be replaced.
pub fn enforce_visual_registration(parameters: &mut HashMap<String, String>) -> bool {
    let previous = parameters.insert(
        REG_STRATEGY_KEY.to_string(),
        REG_STRATEGY_VISUAL.to_string(),
    );
    match previous {
        Some(value) if value != REG_STRATEGY_VISUAL => {
            warn!(
                key = REG_STRATEGY_KEY,
                ignored = %value,
                "stereo odometry works only with visual registration, value ignored"
            );
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_inserted_silently() {
        let mut params = HashMap::new();
        assert!(!enforce_visual_registration(&mut params));
        assert_eq!(params.get(REG_STRATEGY_KEY).map(String::as_str), Some("0"));
    }

    #[test]
    fn test_other_strategy_replaced() {
        let mut params = HashMap::from([
            (REG_STRATEGY_KEY.to_string(), "1".to_string()),
            ("Vis/MaxFeatures".to_string(), "600".to_string()),
        ]);
        assert!(enforce_visual_registration(&mut params));
        assert_eq!(params[REG_STRATEGY_KEY], "0");
        assert_eq!(params["Vis/MaxFeatures"], "600");
    }

    #[test]
    fn test_visual_strategy_kept() {
        let mut params = HashMap::from([(REG_STRATEGY_KEY.to_string(), "0".to_string())]);
        assert!(!enforce_visual_registration(&mut params));
    }
}

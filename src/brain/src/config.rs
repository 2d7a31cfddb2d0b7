use serde::{Deserialize, Serialize};

/// Which goal color the robot shoots at. The complement is the own goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TargetGoalColor {
    #[default]
    Blue,
    Purple,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GameplayStatus {
    Enabled,
    #[default]
    Disabled,
}

/// Read-only configuration. Missing keys fall back to defaults, never fail.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RobotConfig {
    #[serde(default)]
    pub global: GlobalConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default = "default_id")]
    pub field_id: String,
    #[serde(default = "default_id")]
    pub robot_id: String,
    #[serde(rename = "target goal color", default)]
    pub target_goal_color: TargetGoalColor,
    #[serde(rename = "gameplay status", default)]
    pub gameplay_status: GameplayStatus,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        GlobalConfig {
            field_id: default_id(),
            robot_id: default_id(),
            target_goal_color: TargetGoalColor::default(),
            gameplay_status: GameplayStatus::default(),
        }
    }
}

fn default_id() -> String {
    String::from("A")
}

impl RobotConfig {
    pub fn is_enabled(&self) -> bool {
        self.global.gameplay_status == GameplayStatus::Enabled
    }

    /// True when the configured target is the blue goal.
    pub fn targets_blue(&self) -> bool {
        self.global.target_goal_color == TargetGoalColor::Blue
    }

    pub fn enabled() -> Self {
        RobotConfig {
            global: GlobalConfig {
                gameplay_status: GameplayStatus::Enabled,
                ..GlobalConfig::default()
            },
        }
    }
}

//! Device profiles: viewport, pixel density and User-Agent presets.
//!
//! Sites vary their layout (and sometimes their content) by User-Agent, so the
//! viewport and the identification string are always chosen together.

use serde::{Deserialize, Serialize};

use crate::browser::Viewport;

/// Chrome version advertised in generated User-Agent strings.
const CHROME_VERSION: &str = "131.0.0.0";

/// Device the browser tab pretends to be.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceProfile {
    #[default]
    Desktop,
    Tablet,
    Mobile,
}

impl DeviceProfile {
    /// Viewport used by tabs opened with this profile.
    pub fn viewport(&self) -> Viewport {
        match self {
            DeviceProfile::Desktop => Viewport {
                width: 1920,
                height: 1080,
                device_scale_factor: 1.0,
                mobile: false,
            },
            DeviceProfile::Tablet => Viewport {
                width: 768,
                height: 1024,
                device_scale_factor: 2.0,
                mobile: true,
            },
            DeviceProfile::Mobile => Viewport {
                width: 375,
                height: 812,
                device_scale_factor: 3.0,
                mobile: true,
            },
        }
    }

    /// A realistic User-Agent for this profile.
    pub fn user_agent(&self) -> String {
        generate_user_agent(*self, CHROME_VERSION)
    }
}

/// Generates a User-Agent string for a profile and Chrome version.
pub fn generate_user_agent(profile: DeviceProfile, chrome_version: &str) -> String {
    match profile {
        DeviceProfile::Desktop => format!(
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{} Safari/537.36",
            chrome_version
        ),
        DeviceProfile::Tablet => format!(
            "Mozilla/5.0 (Linux; Android 13; SM-X700) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{} Safari/537.36",
            chrome_version
        ),
        DeviceProfile::Mobile => format!(
            "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{} Mobile Safari/537.36",
            chrome_version
        ),
    }
}

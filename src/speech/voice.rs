use serde::{Deserialize, Serialize};

/// How an assistant sounds when its replies are spoken
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceProfile {
    /// BCP 47 language tag
    pub language: String,
    pub rate: f32,
    pub pitch: f32,
    /// Installed voice names to try first, in order (substring match)
    #[serde(default)]
    pub preferred_voices: Vec<String>,
}

impl VoiceProfile {
    /// English voice used by the tutor
    pub fn tutor() -> Self {
        Self {
            language: "en-US".to_string(),
            rate: 0.95,
            pitch: 1.08,
            preferred_voices: vec![
                "Microsoft Emma".to_string(),
                "Google US English".to_string(),
                "Microsoft Zira".to_string(),
            ],
        }
    }

    /// Spanish voice used by the pronunciation coach
    pub fn coach() -> Self {
        Self {
            language: "es-ES".to_string(),
            rate: 1.0,
            pitch: 1.0,
            preferred_voices: vec![
                "Microsoft Helena".to_string(),
                "Google español".to_string(),
                "Microsoft Laura".to_string(),
            ],
        }
    }
}

/// A synthesis voice installed on the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstalledVoice {
    pub name: String,
    pub language: String,
}

/// Best-effort voice choice: preferred names, then exact language, then
/// anything that calls itself female, then whatever comes first.
pub fn pick_voice<'a>(voices: &'a [InstalledVoice], profile: &VoiceProfile) -> Option<&'a InstalledVoice> {
    profile
        .preferred_voices
        .iter()
        .find_map(|pref| voices.iter().find(|v| v.name.contains(pref.as_str())))
        .or_else(|| voices.iter().find(|v| v.language == profile.language))
        .or_else(|| {
            voices
                .iter()
                .find(|v| v.name.to_lowercase().contains("female"))
        })
        .or_else(|| voices.first())
}

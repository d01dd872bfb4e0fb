//! Core enums used throughout the application.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// MP3 bitrate for the transcoded intermediate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Bitrate {
    Kbps96,
    Kbps128,
    Kbps192,
    #[default]
    Kbps320,
}

impl Bitrate {
    /// All selectable bitrates, lowest first.
    pub const ALL: [Bitrate; 4] = [
        Bitrate::Kbps96,
        Bitrate::Kbps128,
        Bitrate::Kbps192,
        Bitrate::Kbps320,
    ];

    /// Bitrate in kilobits per second.
    pub fn kbps(&self) -> u32 {
        match self {
            Bitrate::Kbps96 => 96,
            Bitrate::Kbps128 => 128,
            Bitrate::Kbps192 => 192,
            Bitrate::Kbps320 => 320,
        }
    }
}

impl TryFrom<u32> for Bitrate {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Bitrate::ALL
            .into_iter()
            .find(|b| b.kbps() == value)
            .ok_or_else(|| format!("unsupported bitrate {value} (expected 96, 128, 192 or 320)"))
    }
}

impl From<Bitrate> for u32 {
    fn from(value: Bitrate) -> Self {
        value.kbps()
    }
}

impl FromStr for Bitrate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_end_matches('k').trim_end_matches("kbps").trim();
        let value: u32 = trimmed
            .parse()
            .map_err(|_| format!("invalid bitrate '{s}'"))?;
        Bitrate::try_from(value)
    }
}

impl fmt::Display for Bitrate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} kbps", self.kbps())
    }
}

/// Separation model (weights) passed to the separator with `-n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SeparationModel {
    /// 4 stems, fast.
    #[default]
    #[serde(rename = "htdemucs")]
    Htdemucs,
    /// 4 stems, fine-tuned.
    #[serde(rename = "htdemucs_ft")]
    HtdemucsFt,
    /// 6 stems: drums, bass, vocals, guitar, piano, other.
    #[serde(rename = "htdemucs_6s")]
    Htdemucs6s,
    /// 4 stems, fastest.
    #[serde(rename = "mdx")]
    Mdx,
    /// 4 stems, highest quality.
    #[serde(rename = "mdx_extra_q")]
    MdxExtraQ,
}

impl SeparationModel {
    pub const ALL: [SeparationModel; 5] = [
        SeparationModel::Htdemucs,
        SeparationModel::HtdemucsFt,
        SeparationModel::Htdemucs6s,
        SeparationModel::Mdx,
        SeparationModel::MdxExtraQ,
    ];

    /// Identifier understood by the separation tool.
    pub fn id(&self) -> &'static str {
        match self {
            SeparationModel::Htdemucs => "htdemucs",
            SeparationModel::HtdemucsFt => "htdemucs_ft",
            SeparationModel::Htdemucs6s => "htdemucs_6s",
            SeparationModel::Mdx => "mdx",
            SeparationModel::MdxExtraQ => "mdx_extra_q",
        }
    }

    /// Human-readable description for pickers.
    pub fn description(&self) -> &'static str {
        match self {
            SeparationModel::Htdemucs => "htdemucs (4 stems, fast)",
            SeparationModel::HtdemucsFt => "htdemucs_ft (4 stems, fine-tuned)",
            SeparationModel::Htdemucs6s => {
                "htdemucs_6s (6 stems: drums, bass, vocals, guitar, piano, other)"
            }
            SeparationModel::Mdx => "mdx (4 stems, fastest)",
            SeparationModel::MdxExtraQ => "mdx_extra_q (4 stems, highest quality)",
        }
    }

    /// Stem names produced in full (non two-stem) mode.
    pub fn stem_names(&self) -> &'static [&'static str] {
        match self {
            SeparationModel::Htdemucs6s => &["drums", "bass", "other", "vocals", "guitar", "piano"],
            _ => &["drums", "bass", "other", "vocals"],
        }
    }
}

impl FromStr for SeparationModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SeparationModel::ALL
            .into_iter()
            .find(|m| m.id() == s.trim())
            .ok_or_else(|| {
                let known: Vec<&str> = SeparationModel::ALL.iter().map(|m| m.id()).collect();
                format!("unknown model '{}' (expected one of: {})", s, known.join(", "))
            })
    }
}

impl fmt::Display for SeparationModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Encoding of the separated stem files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StemFormat {
    /// 16-bit PCM WAV.
    Wav16,
    /// 24-bit PCM WAV.
    Wav24,
    /// 32-bit float WAV.
    #[default]
    WavFloat,
    /// FLAC (24-bit).
    Flac,
    /// MP3 at the job bitrate.
    Mp3,
}

impl StemFormat {
    pub const ALL: [StemFormat; 5] = [
        StemFormat::Wav16,
        StemFormat::Wav24,
        StemFormat::WavFloat,
        StemFormat::Flac,
        StemFormat::Mp3,
    ];

    /// Config/CLI name of the format.
    pub fn name(&self) -> &'static str {
        match self {
            StemFormat::Wav16 => "wav16",
            StemFormat::Wav24 => "wav24",
            StemFormat::WavFloat => "wav_float",
            StemFormat::Flac => "flac",
            StemFormat::Mp3 => "mp3",
        }
    }
}

impl FromStr for StemFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StemFormat::ALL
            .into_iter()
            .find(|f| f.name() == s.trim())
            .ok_or_else(|| format!("unknown stem format '{s}'"))
    }
}

impl fmt::Display for StemFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Position of a job in the pipeline state machine.
///
/// Transitions are linear: each stage only ever moves forward, ending in
/// `Done` or `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    #[default]
    Acquiring,
    Analyzing,
    Transcoding,
    Separating,
    Relocating,
    Done,
    Failed,
}

impl Stage {
    /// Whether the job has reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Done | Stage::Failed)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Acquiring => "Acquiring",
            Stage::Analyzing => "Analyzing",
            Stage::Transcoding => "Transcoding",
            Stage::Separating => "Separating",
            Stage::Relocating => "Relocating",
            Stage::Done => "Done",
            Stage::Failed => "Failed",
        };
        f.write_str(name)
    }
}

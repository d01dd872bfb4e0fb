//! Source separation command building.
//!
//! The separation model itself is an external tool (demucs compatible).
//! This module only decides how it is invoked and where its output lands.

mod writer;

use std::path::{Path, PathBuf};

pub use writer::StemWriter;

use crate::config::ToolSettings;
use crate::models::{Bitrate, SeparationModel};
use crate::process::CommandSpec;

/// Stem kept separate in two-stem mode.
pub const TWO_STEM_TARGET: &str = "vocals";

/// Builds separator invocations.
#[derive(Debug, Clone)]
pub struct Separator {
    program: String,
    prefix_args: Vec<String>,
}

impl Separator {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            prefix_args: Vec::new(),
        }
    }

    /// Arguments placed before the input, e.g. `-m demucs` for a Python
    /// interpreter.
    pub fn with_prefix_args(mut self, args: Vec<String>) -> Self {
        self.prefix_args = args;
        self
    }

    pub fn from_settings(tools: &ToolSettings) -> Self {
        Self::new(&tools.separator).with_prefix_args(tools.separator_args.clone())
    }

    /// `<program> [prefix] <input> -o <root> -n <model> [--two-stems vocals] [writer flags]`
    pub fn command(
        &self,
        input: &Path,
        output_root: &Path,
        model: SeparationModel,
        two_stems: bool,
        writer: &dyn StemWriter,
        bitrate: Bitrate,
    ) -> CommandSpec {
        let mut spec = CommandSpec::new("demucs", &self.program)
            .args(self.prefix_args.iter().cloned())
            .arg(input.to_string_lossy())
            .arg("-o")
            .arg(output_root.to_string_lossy())
            .arg("-n")
            .arg(model.id());

        if two_stems {
            spec = spec.arg("--two-stems").arg(TWO_STEM_TARGET);
        }

        spec.args(writer.separator_args(bitrate))
            .env("PYTHONUNBUFFERED", "1")
    }
}

/// Directory the separator writes stems for `input` into:
/// `<output_root>/<model>/<input file stem>`.
pub fn output_subtree(output_root: &Path, model: SeparationModel, input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    output_root.join(model.id()).join(stem)
}

/// Stem names the separator produces for a job.
pub fn expected_stems(model: SeparationModel, two_stems: bool) -> Vec<String> {
    if two_stems {
        vec![TWO_STEM_TARGET.to_string(), format!("no_{}", TWO_STEM_TARGET)]
    } else {
        model.stem_names().iter().map(|s| s.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StemFormat;

    #[test]
    fn builds_full_separation_command() {
        let spec = Separator::new("demucs").command(
            Path::new("/tmp/job/song_320k.mp3"),
            Path::new("/tmp/job/separated"),
            SeparationModel::Htdemucs,
            false,
            &StemFormat::WavFloat,
            Bitrate::Kbps320,
        );

        assert_eq!(
            spec.args,
            vec![
                "/tmp/job/song_320k.mp3",
                "-o",
                "/tmp/job/separated",
                "-n",
                "htdemucs",
                "--float32"
            ]
        );
        assert!(!spec.has_arg("--two-stems"));
        assert!(spec.env.contains(&("PYTHONUNBUFFERED".to_string(), "1".to_string())));
    }

    #[test]
    fn two_stem_mode_and_prefix_args() {
        let tools = ToolSettings {
            separator: "python3".to_string(),
            separator_args: vec!["-m".to_string(), "demucs".to_string()],
            ..ToolSettings::default()
        };
        let spec = Separator::from_settings(&tools).command(
            Path::new("in.mp3"),
            Path::new("out"),
            SeparationModel::MdxExtraQ,
            true,
            &StemFormat::Wav16,
            Bitrate::Kbps128,
        );

        assert_eq!(spec.program, "python3");
        assert_eq!(&spec.args[..3], &["-m", "demucs", "in.mp3"]);
        assert_eq!(spec.arg_after("-n"), Some("mdx_extra_q"));
        assert_eq!(spec.arg_after("--two-stems"), Some("vocals"));
    }

    #[test]
    fn subtree_uses_input_stem() {
        let subtree = output_subtree(
            Path::new("/tmp/job/separated"),
            SeparationModel::Htdemucs6s,
            Path::new("/tmp/job/song_320k.mp3"),
        );
        assert_eq!(subtree, PathBuf::from("/tmp/job/separated/htdemucs_6s/song_320k"));
    }

    #[test]
    fn expected_stem_names() {
        assert_eq!(expected_stems(SeparationModel::Htdemucs, true), vec!["vocals", "no_vocals"]);
        assert_eq!(expected_stems(SeparationModel::Htdemucs, false).len(), 4);
        assert_eq!(expected_stems(SeparationModel::Htdemucs6s, false).len(), 6);
    }
}

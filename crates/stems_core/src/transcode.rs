//! Fixed-bitrate MP3 transcoding.

use std::path::Path;

use crate::models::Bitrate;
use crate::process::CommandSpec;

/// Builds ffmpeg MP3 encode commands.
#[derive(Debug, Clone)]
pub struct Transcoder {
    program: String,
}

impl Transcoder {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// `ffmpeg -hide_banner -y -i <in> -vn -c:a libmp3lame -b:a <kbps>k <out>`
    pub fn command(&self, input: &Path, output: &Path, bitrate: Bitrate) -> CommandSpec {
        CommandSpec::new("ffmpeg", &self.program)
            .args(["-hide_banner", "-y", "-i"])
            .arg(input.to_string_lossy())
            .args(["-vn", "-c:a", "libmp3lame", "-b:a"])
            .arg(format!("{}k", bitrate.kbps()))
            .arg(output.to_string_lossy())
    }
}

impl Default for Transcoder {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

/// File name of the transcoded MP3: `<title>_<kbps>k.mp3`.
pub fn mp3_file_name(title: &str, bitrate: Bitrate) -> String {
    format!("{}_{}k.mp3", title, bitrate.kbps())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_encode_command() {
        let spec = Transcoder::default().command(
            Path::new("/tmp/job/song.wav"),
            Path::new("/tmp/job/song_128k.mp3"),
            Bitrate::Kbps128,
        );

        assert_eq!(
            spec.display(),
            "ffmpeg -hide_banner -y -i /tmp/job/song.wav -vn -c:a libmp3lame -b:a 128k /tmp/job/song_128k.mp3"
        );
    }

    #[test]
    fn mp3_name_includes_bitrate() {
        assert_eq!(mp3_file_name("song", Bitrate::Kbps320), "song_320k.mp3");
        assert_eq!(mp3_file_name("My_Song", Bitrate::Kbps96), "My_Song_96k.mp3");
    }
}

//! Video to image frame extraction
//!
//! For a directory of paired ring-capture recordings, drop the incomplete ones
//! and keep the first frame of every complete one as a JPEG.

use clap::ValueEnum;
use glob::glob;
use log::{error, info};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{Error, Result};
use crate::utils::{create_progress_bar, write_atomically};

/// Decodes the first frame of a video into encoded image bytes.
pub trait FrameDecoder {
    fn first_frame(&self, video: &Path) -> Result<Vec<u8>>;
}

/// Decoder backed by the `ffmpeg` command line tool.
#[derive(Debug, Clone)]
pub struct FfmpegDecoder {
    program: PathBuf,
}

impl Default for FfmpegDecoder {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl FfmpegDecoder {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl FrameDecoder for FfmpegDecoder {
    fn first_frame(&self, video: &Path) -> Result<Vec<u8>> {
        let decode_error = |message: String| Error::Decode {
            path: video.to_path_buf(),
            message,
        };

        let output = Command::new(&self.program)
            .args(["-v", "error", "-nostdin", "-i"])
            .arg(video)
            .args(["-frames:v", "1", "-f", "image2pipe", "-c:v", "mjpeg", "-"])
            .output()
            .map_err(|e| decode_error(format!("failed to run {}: {e}", self.program.display())))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(decode_error(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            )));
        }
        if output.stdout.is_empty() {
            return Err(decode_error("no decodable frame".to_string()));
        }
        Ok(output.stdout)
    }
}

/// How output images are named.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum NamingScheme {
    /// `<prefix><i>.jpg`, counting over the sorted complete recordings
    Sequential,
    /// `<prefix><recording stem>.jpg`
    SourceStem,
}

#[derive(Debug, Clone)]
pub struct FrameExtractorConfig {
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    pub incomplete_suffix: String,
    pub complete_suffix: String,
    pub prefix: String,
    pub naming: NamingScheme,
}

impl FrameExtractorConfig {
    pub fn new(source_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            output_dir: output_dir.into(),
            incomplete_suffix: "_1.mp4".to_string(),
            complete_suffix: "_0.mp4".to_string(),
            prefix: "img_1_".to_string(),
            naming: NamingScheme::Sequential,
        }
    }

    fn output_name(&self, index: usize, video: &Path) -> String {
        match self.naming {
            NamingScheme::Sequential => format!("{}{}.jpg", self.prefix, index),
            NamingScheme::SourceStem => {
                let file_name = video
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let stem = file_name
                    .strip_suffix(self.complete_suffix.as_str())
                    .unwrap_or(&file_name);
                format!("{}{}.jpg", self.prefix, sanitize_filename::sanitize(stem))
            }
        }
    }
}

/// What a run did, path by path.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExtractionReport {
    pub removed: Vec<PathBuf>,
    pub written: Vec<PathBuf>,
    pub failed: Vec<PathBuf>,
}

pub struct FrameExtractor<D> {
    config: FrameExtractorConfig,
    decoder: D,
}

impl<D: FrameDecoder> FrameExtractor<D> {
    pub fn new(config: FrameExtractorConfig, decoder: D) -> Self {
        Self { config, decoder }
    }

    /// Remove incomplete recordings, then extract the first frame of every
    /// complete one. A recording that fails to decode is logged and skipped.
    pub fn run(&self) -> Result<ExtractionReport> {
        let mut report = ExtractionReport::default();

        for path in files_with_suffix(&self.config.source_dir, &self.config.incomplete_suffix)? {
            fs::remove_file(&path).map_err(|e| Error::io(&path, e))?;
            report.removed.push(path);
        }
        info!("Removed {} incomplete recordings", report.removed.len());

        let videos = files_with_suffix(&self.config.source_dir, &self.config.complete_suffix)?;
        fs::create_dir_all(&self.config.output_dir)
            .map_err(|e| Error::io(&self.config.output_dir, e))?;

        let pb = create_progress_bar(videos.len() as u64, "Frames");
        for (index, video) in videos.into_iter().enumerate() {
            let out = self
                .config
                .output_dir
                .join(self.config.output_name(index, &video));
            match self.extract_one(&video, &out) {
                Ok(()) => report.written.push(out),
                Err(e) => {
                    error!("Error: {}: {}", video.display(), e);
                    report.failed.push(video);
                }
            }
            pb.inc(1);
        }
        pb.finish_with_message("Frame extraction complete");

        Ok(report)
    }

    fn extract_one(&self, video: &Path, out: &Path) -> Result<()> {
        let frame = self.decoder.first_frame(video)?;
        if frame.is_empty() {
            return Err(Error::Decode {
                path: video.to_path_buf(),
                message: "decoder returned an empty frame".to_string(),
            });
        }
        write_atomically(out, &frame)
    }
}

/// Regular files directly inside `dir` whose name ends with `suffix`, sorted.
fn files_with_suffix(dir: &Path, suffix: &str) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(Error::MissingDirectory(dir.to_path_buf()));
    }
    let pattern = format!(
        "{}/*{}",
        glob::Pattern::escape(&dir.to_string_lossy()),
        glob::Pattern::escape(suffix)
    );
    let entries = glob(&pattern).map_err(|e| Error::Walk {
        path: dir.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| {
            let path = e.path().to_path_buf();
            Error::io(path, e.into())
        })?;
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

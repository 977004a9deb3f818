use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use glam::{Mat4, Vec3};
use log::{info, warn};
use serde::Serialize;

use crate::error::ExportError;
use crate::figure::LineFigureRenderer;
use crate::projection::{Projection, WorldSpace};
use crate::session::{FrameSnapshot, PlaybackSession};
use crate::skeleton::landmark::Landmark;
use strum::IntoEnumIterator;

/// Indices of the frames written by an image export: every `step`-th frame from the first.
pub fn sample_indices(total: usize, max_frames: usize) -> Vec<usize> {
    let step = (total / max_frames.max(1)).max(1);
    (0..total).step_by(step).collect()
}

/// Render evenly sampled frames as line figures into `pose_{index:04}.png` files.
pub fn export_frame_images(
    session: &PlaybackSession,
    renderer: &LineFigureRenderer,
    output_dir: &Path,
    max_frames: usize,
) -> Result<Vec<PathBuf>, ExportError> {
    let indices = sample_indices(session.sequence().total_count(), max_frames);
    info!("Exporting {} images to {output_dir:?}", indices.len());
    let written = render_frames(session, renderer, output_dir, indices, |index| {
        format!("pose_{index:04}.png")
    })?;
    info!("Saved {} images", written.len());
    Ok(written)
}

fn render_frames(
    session: &PlaybackSession,
    renderer: &LineFigureRenderer,
    output_dir: &Path,
    indices: impl IntoIterator<Item = usize>,
    file_name: impl Fn(usize) -> String,
) -> Result<Vec<PathBuf>, ExportError> {
    fs::create_dir_all(output_dir)?;
    let mut canvas = renderer.blank_surface();
    let mut written = Vec::new();
    for index in indices {
        let Some(snapshot) = session.snapshot_at(index) else {
            continue;
        };
        renderer.draw(&mut canvas, &snapshot);
        let path = output_dir.join(file_name(index));
        canvas.save(&path)?;
        written.push(path);
    }
    if written.is_empty() {
        return Err(ExportError::NothingExported);
    }
    Ok(written)
}

pub const FFMPEG: &str = "ffmpeg";

/// What a video export left on disk.
#[derive(Debug)]
pub struct VideoExport {
    pub frames_dir: PathBuf,
    pub frames: Vec<PathBuf>,
    /// `None` when the encoder was missing or failed; the frames are kept either way
    pub video: Option<PathBuf>,
}

/// `output` with an `.mp4` extension appended unless it already has one.
pub fn video_path(output: &Path) -> PathBuf {
    if output.extension().is_some_and(|extension| extension == "mp4") {
        output.to_path_buf()
    } else {
        let mut name = output.as_os_str().to_owned();
        name.push(".mp4");
        PathBuf::from(name)
    }
}

/// Render every `sample_rate`-th frame to `frame_{index:05}.png` beside the video, then encode them.
pub fn export_video(
    session: &PlaybackSession,
    renderer: &LineFigureRenderer,
    output: &Path,
    sample_rate: usize,
    encoder: &str,
) -> Result<VideoExport, ExportError> {
    let video = video_path(output);
    let stem = video
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let frames_dir = video.with_file_name(format!("{stem}_frames"));
    let total = session.sequence().total_count();
    let indices = (0..total).step_by(sample_rate.max(1));
    let frames = render_frames(session, renderer, &frames_dir, indices, |index| {
        format!("frame_{index:05}.png")
    })?;
    info!("Rendered {} video frames to {frames_dir:?}", frames.len());
    let fps = session.scheduler().frames_per_second();
    let video = match encode_video(encoder, &frames_dir, fps, &video) {
        Ok(()) => {
            info!("Video saved to {video:?}");
            Some(video)
        }
        Err(ExportError::Io(error)) if error.kind() == io::ErrorKind::NotFound => {
            warn!("{encoder} not found, frames kept in {frames_dir:?}");
            None
        }
        Err(error) => {
            warn!("{error}, frames kept in {frames_dir:?}");
            None
        }
    };
    Ok(VideoExport {
        frames_dir,
        frames,
        video,
    })
}

fn encode_video(encoder: &str, frames_dir: &Path, fps: u32, video: &Path) -> Result<(), ExportError> {
    let output = Command::new(encoder)
        .arg("-y")
        .args(["-framerate", &fps.to_string()])
        .args(["-pattern_type", "glob", "-i"])
        .arg(frames_dir.join("frame_*.png"))
        .args(["-c:v", "libx264", "-pix_fmt", "yuv420p", "-crf", "23"])
        .arg(video)
        .output()?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let last_line = stderr.lines().last().unwrap_or_default().trim().to_string();
        return Err(ExportError::Encoder(format!("{encoder} exited with {}: {last_line}", output.status)));
    }
    Ok(())
}

#[derive(Serialize)]
struct RigAnimation {
    fps: f64,
    seed_frames: usize,
    total_frames: usize,
    frames: Vec<RigFrame>,
}

#[derive(Serialize)]
struct RigFrame {
    frame: usize,
    provenance: &'static str,
    joints: Vec<JointExport>,
    bones: Vec<BoneExport>,
}

#[derive(Serialize)]
struct JointExport {
    name: String,
    position: [f32; 3],
}

#[derive(Serialize)]
struct BoneExport {
    name: String,
    length: f32,
    /// Column-major transform of a unit cylinder along +Y
    matrix: [f32; 16],
}

/// Collects world-space frames and writes them as one timestamped JSON file.
pub struct RigExporter {
    output_dir: PathBuf,
    fps: f64,
    seed_frames: usize,
    total_frames: usize,
    frames: Vec<RigFrame>,
}

impl RigExporter {
    pub fn new<P: Into<PathBuf>>(output_dir: P, fps: f64, seed_frames: usize, total_frames: usize) -> Self {
        Self {
            output_dir: output_dir.into(),
            fps,
            seed_frames,
            total_frames,
            frames: Vec::new(),
        }
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn capture_frame(&mut self, snapshot: &FrameSnapshot) {
        let world = WorldSpace.project(&snapshot.skeleton);
        let joints = Landmark::iter()
            .map(|landmark| JointExport {
                name: landmark.to_string(),
                position: world.joint(landmark).to_array(),
            })
            .collect();
        let bones = world
            .bones
            .iter()
            .filter(|bone| !bone.is_degenerate())
            .map(|bone| BoneExport {
                name: bone.spec.name(),
                length: bone.length,
                matrix: Mat4::from_scale_rotation_translation(
                    Vec3::new(1.0, bone.length, 1.0),
                    bone.orientation,
                    bone.midpoint,
                )
                .to_cols_array(),
            })
            .collect();
        self.frames.push(RigFrame {
            frame: snapshot.index,
            provenance: snapshot.provenance.label(),
            joints,
            bones,
        });
    }

    /// Write everything captured so far, returning the file written.
    pub fn save(&mut self) -> Result<PathBuf, ExportError> {
        if self.frames.is_empty() {
            return Err(ExportError::NothingExported);
        }
        fs::create_dir_all(&self.output_dir)?;
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let path = self
            .output_dir
            .join(format!("rig_animation_{timestamp}.json"));
        let animation = RigAnimation {
            fps: self.fps,
            seed_frames: self.seed_frames,
            total_frames: self.total_frames,
            frames: std::mem::take(&mut self.frames),
        };
        let json = serde_json::to_string_pretty(&animation)?;
        let mut file = File::create(&path)?;
        file.write_all(json.as_bytes())?;
        info!("Saved {} rig frames to {path:?}", animation.frames.len());
        Ok(path)
    }
}

/// Capture every frame of the session and write the rig animation.
pub fn export_rig_animation(session: &PlaybackSession, output_dir: &Path) -> Result<PathBuf, ExportError> {
    let sequence = session.sequence();
    let mut exporter = RigExporter::new(
        output_dir,
        session.scheduler().frames_per_second() as f64,
        sequence.seed_count(),
        sequence.total_count(),
    );
    for snapshot in (0..sequence.total_count()).filter_map(|index| session.snapshot_at(index)) {
        exporter.capture_frame(&snapshot);
    }
    exporter.save()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PlaybackConfig, RenderConfig};
    use crate::figure::load_font;
    use crate::skeleton::landmark::POSE_DIMENSION;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("pose_playback_{name}_{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    fn session(total: usize) -> PlaybackSession {
        let mut pose = vec![0.0; POSE_DIMENSION];
        pose[Landmark::LeftKnee.index() * 3 + 1] = 0.5;
        let json = serde_json::json!({
            "seed_frames": 2, "generated_frames": total - 2, "total_frames": total,
            "pose_dimension": 99, "poses": vec![pose; total],
        })
        .to_string();
        PlaybackSession::from_json(&json, &PlaybackConfig::default()).unwrap()
    }

    #[test]
    fn test_sample_indices() {
        assert_eq!(sample_indices(132, 50), (0..132).step_by(2).collect::<Vec<_>>());
        assert_eq!(sample_indices(10, 50), (0..10).collect::<Vec<_>>());
        assert_eq!(sample_indices(100, 10), vec![0, 10, 20, 30, 40, 50, 60, 70, 80, 90]);
        assert_eq!(sample_indices(5, 0), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_export_frame_images() {
        let dir = scratch("images");
        let renderer = LineFigureRenderer::new(RenderConfig::default(), load_font(None));
        let written = export_frame_images(&session(6), &renderer, &dir, 3).unwrap();
        let names: Vec<_> = written
            .iter()
            .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["pose_0000.png", "pose_0002.png", "pose_0004.png"]);
        let image = image::open(&written[1]).unwrap();
        assert_eq!((image.width(), image.height()), (800, 600));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_video_path() {
        assert_eq!(video_path(Path::new("output")), PathBuf::from("output.mp4"));
        assert_eq!(video_path(Path::new("out/dance.mp4")), PathBuf::from("out/dance.mp4"));
        assert_eq!(video_path(Path::new("dance.v1")), PathBuf::from("dance.v1.mp4"));
    }

    #[test]
    fn test_video_frames_kept_without_encoder() {
        let dir = scratch("video");
        let renderer = LineFigureRenderer::new(RenderConfig::default(), load_font(None));
        let export = export_video(
            &session(7),
            &renderer,
            &dir.join("dance"),
            3,
            "pose-playback-missing-encoder",
        )
        .unwrap();
        assert!(export.video.is_none());
        assert_eq!(export.frames_dir, dir.join("dance_frames"));
        let names: Vec<_> = export
            .frames
            .iter()
            .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["frame_00000.png", "frame_00003.png", "frame_00006.png"]);
        assert!(export.frames.iter().all(|path| path.exists()));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_rig_animation_file() {
        let dir = scratch("rig");
        let path = export_rig_animation(&session(3), &dir).unwrap();
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("rig_animation_") && name.ends_with(".json"));
        let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["fps"], 10.0);
        assert_eq!(json["seed_frames"], 2);
        let frames = json["frames"].as_array().unwrap();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0]["provenance"], "SEED");
        assert_eq!(frames[2]["provenance"], "GENERATED");
        assert_eq!(frames[0]["joints"].as_array().unwrap().len(), 33);
        let bones = frames[0]["bones"].as_array().unwrap();
        // only the two bones touching the knee have length
        assert_eq!(bones.len(), 2);
        let matrix: Vec<f64> = bones[0]["matrix"]
            .as_array()
            .unwrap()
            .iter()
            .map(|value| value.as_f64().unwrap())
            .collect();
        assert_eq!(matrix.len(), 16);
        assert!((matrix[15] - 1.0).abs() < 1e-6);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_empty_exporter_refuses_to_save() {
        let mut exporter = RigExporter::new(scratch("empty"), 10.0, 0, 0);
        assert!(matches!(exporter.save(), Err(ExportError::NothingExported)));
    }
}

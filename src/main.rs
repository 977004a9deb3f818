use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use log::{error, info};
use winit::dpi::PhysicalSize;
use winit::event_loop::EventLoop;
use winit::window::Window;

use pose_playback::application::Application;
use pose_playback::config::PlayerConfig;
use pose_playback::export::{export_frame_images, export_rig_animation, export_video, FFMPEG};
use pose_playback::figure::{load_font, LineFigureRenderer};
use pose_playback::session::PlaybackSession;
use pose_playback::{PlayerEvent, View};

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum Mode {
    /// Play the sequence in a window
    #[default]
    Window,
    /// Write sampled frames as PNG line figures
    Images,
    /// Render frames and encode them into an MP4 with ffmpeg
    Video,
    /// Write every frame as a rig animation JSON file
    Rig,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Pose sequence JSON document
    poses: PathBuf,

    #[arg(long, value_enum, default_value_t)]
    mode: Mode,

    /// Initial view in the window: line or mesh
    #[arg(long, default_value_t)]
    view: View,

    /// Playback frames per second
    #[arg(long)]
    fps: Option<u32>,

    /// Directory for exported files, or the video file in video mode
    #[arg(long, default_value = "output")]
    output: PathBuf,

    /// Upper bound on images written, sampled evenly
    #[arg(long, default_value_t = 50)]
    max_frames: usize,

    /// Render every Nth frame into a video
    #[arg(long, default_value_t = 1)]
    sample_rate: usize,

    /// TrueType font for frame text
    #[arg(long)]
    font: Option<PathBuf>,

    /// Player configuration JSON
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!("{error}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => PlayerConfig::load(path)?,
        None => PlayerConfig::default(),
    };
    if let Some(fps) = args.fps {
        let playback = &mut config.playback;
        playback.frames_per_second = fps;
        playback.min_frames_per_second = playback.min_frames_per_second.min(fps);
        playback.max_frames_per_second = playback.max_frames_per_second.max(fps);
        config.validate()?;
    }
    let session = PlaybackSession::load(&args.poses, &config.playback)?;
    match args.mode {
        Mode::Window => run_window(args, config, session),
        Mode::Images => {
            let renderer = LineFigureRenderer::new(config.render, load_font(args.font.as_deref()));
            let written = export_frame_images(&session, &renderer, &args.output, args.max_frames)?;
            session.end();
            info!("Images saved to {:?}", args.output);
            println!("{} images written to {}", written.len(), args.output.display());
            Ok(())
        }
        Mode::Video => {
            let renderer = LineFigureRenderer::new(config.render, load_font(args.font.as_deref()));
            let export = export_video(&session, &renderer, &args.output, args.sample_rate, FFMPEG)?;
            session.end();
            match export.video {
                Some(video) => println!("Video written to {}", video.display()),
                None => println!(
                    "{} frames kept in {}, install ffmpeg to encode them",
                    export.frames.len(),
                    export.frames_dir.display()
                ),
            }
            Ok(())
        }
        Mode::Rig => {
            let path = export_rig_animation(&session, &args.output)?;
            session.end();
            println!("Rig animation written to {}", path.display());
            Ok(())
        }
    }
}

fn run_window(args: Args, config: PlayerConfig, session: PlaybackSession) -> Result<(), Box<dyn Error>> {
    let event_loop = EventLoop::<PlayerEvent>::with_user_event().build()?;
    let radio = event_loop.create_proxy();
    let window_attributes = Window::default_attributes()
        .with_title(format!("Pose Playback: {}", args.poses.display()))
        .with_inner_size(PhysicalSize::new(config.window.width, config.window.height));
    let font = load_font(args.font.as_deref());
    let mut app = Application::new(
        window_attributes,
        session,
        config.render,
        font,
        args.view,
        radio,
    );
    event_loop.run_app(&mut app)?;
    Ok(())
}

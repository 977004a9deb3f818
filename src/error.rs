use std::fmt;
use std::io;

/// Why a single pose vector cannot be turned into a skeleton
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VectorFault {
    /// The vector does not hold exactly three coordinates per landmark
    Length { expected: usize, actual: usize },
    /// A coordinate is NaN or infinite
    NonFinite { coordinate: usize },
}

impl fmt::Display for VectorFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VectorFault::Length { expected, actual } => {
                write!(f, "expected {expected} coordinates, found {actual}")
            }
            VectorFault::NonFinite { coordinate } => {
                write!(f, "coordinate {coordinate} is not a finite number")
            }
        }
    }
}

impl std::error::Error for VectorFault {}

/// Inconsistencies in a pose document detected before playback starts
#[derive(Debug, Clone, PartialEq)]
pub enum Malformation {
    PoseDimension { declared: usize, expected: usize },
    FrameTotals { seed: usize, generated: usize, total: usize },
    FrameCount { declared: usize, actual: usize },
    Frame { index: usize, fault: VectorFault },
}

impl fmt::Display for Malformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Malformation::PoseDimension { declared, expected } => {
                write!(f, "pose_dimension is {declared}, expected {expected}")
            }
            Malformation::FrameTotals { seed, generated, total } => write!(
                f,
                "total_frames {total} is not seed_frames {seed} + generated_frames {generated}"
            ),
            Malformation::FrameCount { declared, actual } => {
                write!(f, "total_frames is {declared} but poses holds {actual}")
            }
            Malformation::Frame { index, fault } => write!(f, "frame {index}: {fault}"),
        }
    }
}

/// Error types that can occur while loading a pose sequence
#[derive(Debug)]
pub enum PoseError {
    /// The document declares no frames at all
    EmptySequence,
    /// Counts or vectors in the document do not add up
    MalformedSequence(Malformation),
    /// The document could not be read
    Io(io::Error),
    /// The document is not valid JSON of the expected shape
    Json(serde_json::Error),
    /// The playback settings cannot drive a scheduler
    Config(ConfigError),
}

impl fmt::Display for PoseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoseError::EmptySequence => write!(f, "Pose sequence has no frames"),
            PoseError::MalformedSequence(malformation) => {
                write!(f, "Malformed pose sequence: {malformation}")
            }
            PoseError::Io(error) => write!(f, "Unable to read pose document: {error}"),
            PoseError::Json(error) => write!(f, "Unable to parse pose document: {error}"),
            PoseError::Config(error) => write!(f, "Unable to play: {error}"),
        }
    }
}

impl std::error::Error for PoseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PoseError::Io(error) => Some(error),
            PoseError::Json(error) => Some(error),
            PoseError::Config(error) => Some(error),
            _ => None,
        }
    }
}

impl From<Malformation> for PoseError {
    fn from(malformation: Malformation) -> Self {
        PoseError::MalformedSequence(malformation)
    }
}

impl From<io::Error> for PoseError {
    fn from(error: io::Error) -> Self {
        PoseError::Io(error)
    }
}

impl From<ConfigError> for PoseError {
    fn from(error: ConfigError) -> Self {
        PoseError::Config(error)
    }
}

impl From<serde_json::Error> for PoseError {
    fn from(error: serde_json::Error) -> Self {
        PoseError::Json(error)
    }
}

/// Problems with the optional player configuration file
#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Json(serde_json::Error),
    /// A value is outside the range the renderers can work with
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(error) => write!(f, "Unable to read config: {error}"),
            ConfigError::Json(error) => write!(f, "Unable to parse config: {error}"),
            ConfigError::Invalid(reason) => write!(f, "Invalid config: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<io::Error> for ConfigError {
    fn from(error: io::Error) -> Self {
        ConfigError::Io(error)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(error: serde_json::Error) -> Self {
        ConfigError::Json(error)
    }
}

/// Failures while writing images or rig animation files
#[derive(Debug)]
pub enum ExportError {
    Io(io::Error),
    Image(image::ImageError),
    Json(serde_json::Error),
    /// No frame of the sequence could be reconstructed
    NothingExported,
    /// The video encoder ran but did not succeed
    Encoder(String),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Io(error) => write!(f, "Unable to write export: {error}"),
            ExportError::Image(error) => write!(f, "Unable to encode image: {error}"),
            ExportError::Json(error) => write!(f, "Unable to serialize rig animation: {error}"),
            ExportError::NothingExported => write!(f, "No frames could be exported"),
            ExportError::Encoder(reason) => write!(f, "Video encoding failed: {reason}"),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExportError::Io(error) => Some(error),
            ExportError::Image(error) => Some(error),
            ExportError::Json(error) => Some(error),
            ExportError::NothingExported | ExportError::Encoder(_) => None,
        }
    }
}

impl From<io::Error> for ExportError {
    fn from(error: io::Error) -> Self {
        ExportError::Io(error)
    }
}

impl From<image::ImageError> for ExportError {
    fn from(error: image::ImageError) -> Self {
        ExportError::Image(error)
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(error: serde_json::Error) -> Self {
        ExportError::Json(error)
    }
}

/// The window could not be given a GPU context
#[derive(Debug)]
pub enum RenderError {
    Surface(wgpu::CreateSurfaceError),
    Adapter(wgpu::RequestAdapterError),
    Device(wgpu::RequestDeviceError),
    /// The adapter offers no configuration for the window surface
    Unsupported,
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::Surface(error) => write!(f, "Unable to create surface: {error}"),
            RenderError::Adapter(error) => write!(f, "No suitable adapter: {error}"),
            RenderError::Device(error) => write!(f, "Unable to create device: {error}"),
            RenderError::Unsupported => write!(f, "Surface not supported by adapter"),
        }
    }
}

impl std::error::Error for RenderError {}

use crate::track::PointId;

/// Every failure in the sandbox degrades to a rejected operation: state is
/// left as it was and the caller gets one of these.
#[derive(Debug)]
pub enum SandboxError {
    SelfConnectingSegment,
    PointNotFound(PointId),
    SegmentNotFound(usize),
    AlreadyControl(PointId),
    AlreadyAnchor(PointId),
    PositionTaken(PointId),
    WrongSegmentCount { point: PointId, expected: usize, found: usize },
    NoSelection,
    EmptyTrack,
    NoTrackLoaded,
    TrackNotInLibrary(String),
    SimulationAlreadyRunning,
    SimulationNotRunning,
    Json(serde_json::Error),
    Io(std::io::Error),
}

impl SandboxError {
    /// Rejections of graph edits, as opposed to lifecycle or I/O problems.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            SandboxError::SelfConnectingSegment
                | SandboxError::PointNotFound(_)
                | SandboxError::SegmentNotFound(_)
                | SandboxError::AlreadyControl(_)
                | SandboxError::AlreadyAnchor(_)
                | SandboxError::PositionTaken(_)
                | SandboxError::WrongSegmentCount { .. }
                | SandboxError::NoSelection
                | SandboxError::EmptyTrack
        )
    }
}

impl std::fmt::Display for SandboxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SandboxError::SelfConnectingSegment => write!(f, "Cannot connect segment to itself"),
            SandboxError::PointNotFound(id) => write!(f, "Point {id} not found in track"),
            SandboxError::SegmentNotFound(index) => write!(f, "Segment {index} not found in track"),
            SandboxError::AlreadyControl(id) => write!(f, "Point {id} is already a control point"),
            SandboxError::AlreadyAnchor(id) => write!(f, "Point {id} is already an anchor"),
            SandboxError::PositionTaken(id) => write!(f, "Point {id} already sits at that position"),
            SandboxError::WrongSegmentCount {
                point,
                expected,
                found,
            } => write!(
                f,
                "Point {point} belongs to {found} segment(s), expected exactly {expected}"
            ),
            SandboxError::NoSelection => write!(f, "No point selected"),
            SandboxError::EmptyTrack => write!(f, "Track has no segments"),
            SandboxError::NoTrackLoaded => write!(f, "No track loaded"),
            SandboxError::TrackNotInLibrary(id) => write!(f, "Track {id} not found in library"),
            SandboxError::SimulationAlreadyRunning => write!(f, "Simulator already running"),
            SandboxError::SimulationNotRunning => write!(f, "Simulator is not running"),
            SandboxError::Json(e) => write!(f, "JSON error: {e}"),
            SandboxError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for SandboxError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SandboxError::Json(e) => Some(e),
            SandboxError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for SandboxError {
    fn from(e: serde_json::Error) -> Self {
        SandboxError::Json(e)
    }
}

impl From<std::io::Error> for SandboxError {
    fn from(e: std::io::Error) -> Self {
        SandboxError::Io(e)
    }
}

pub type Result<T> = std::result::Result<T, SandboxError>;

/// Session replay playback engine
/// Virtual-time clock, visible-window resolution, and the controller
/// that ties them to a recording
///
/// The engine is synchronous and single-threaded: hosts own the timer
/// and drive it through `PlaybackController::tick`. Every operation is
/// total — out-of-range input clamps, degenerate recordings no-op —
/// so nothing here returns a `Result`.

mod clock;
pub use clock::*;

mod resolver;
pub use resolver::*;

mod controller;
pub use controller::*;

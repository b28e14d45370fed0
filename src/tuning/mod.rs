//! Tuning of resolved notes: cents, playback pitch and readouts

pub mod cents;
pub mod display;
pub mod playback;

pub use cents::{annotation_fingerings, calc_cents_offset, read_tuning_annotations, TuningAnnotations};
pub use display::{cents_display, steps_display, DisplayText};
pub use playback::{plan_playback, PlaybackPlan};

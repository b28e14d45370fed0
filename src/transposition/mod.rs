//! Moving notes between spellings and tidying accidentals afterwards

pub mod cleanup;
pub mod navigator;
pub mod transpose;

pub use cleanup::cleanup_bar;
pub use navigator::{choose_next_note, Direction};
pub use transpose::{
    explicit_accidentals_for_entry, force_explicit_accidentals_after, make_accidentals_explicit,
    plan_transpose, TransposePlan,
};

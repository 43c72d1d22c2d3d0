//! Text extraction from agent results.
//!
//! Every entry point here is total: callers always get a string back, with
//! a fixed placeholder standing in when nothing usable was found.

pub mod analysis;
pub mod json_block;
pub mod text;
pub mod voice;

pub use analysis::{extract_analysis_text, extract_body_part, extract_transcript};
pub use json_block::find_json_object;
pub use text::extract_text;
pub use voice::{
    extract_patient_info, format_analysis_markdown, guess_sex_from_name, layout_voice_analysis,
    remove_large_gaps, PatientInfo, Sex,
};

pub mod options;
pub mod submit;

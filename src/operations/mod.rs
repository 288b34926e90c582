//! Operations module wraps client calls for the command line

pub mod submit;

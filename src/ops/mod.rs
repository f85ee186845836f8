//! High-level operations.
//!
//! This module contains the implementation of py2win commands.

pub mod bdist;
pub mod clean;
pub mod doctor;
pub mod wheel;

pub use bdist::{run, BuildEnv, BuildOptions, BuildOutput, EmbedDistribution};
pub use clean::{clean, CleanOptions};
pub use doctor::{doctor, format_report, DoctorOptions, DoctorReport};
pub use wheel::build_project_wheel;

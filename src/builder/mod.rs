//! Distribution build stages.
//!
//! Each stage mutates the working directory in place: [`runtime`] lays down
//! the embedded interpreter, [`installer`] runs pip inside it, [`launcher`]
//! compiles one executable per entry point with a [`toolchain`], and
//! [`package`] zips the result.

pub mod installer;
pub mod launcher;
pub mod package;
pub mod runtime;
pub mod toolchain;

pub use launcher::LauncherBuilder;
pub use runtime::RuntimeSpec;
pub use toolchain::{
    detect_toolchain, CommandSpec, GccToolchain, MsvcToolchain, Toolchain, ToolchainPlatform,
};

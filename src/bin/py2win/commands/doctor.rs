//! `py2win doctor` command

use anyhow::Result;

use crate::cli::DoctorArgs;
use py2win::core::host::default_python;
use py2win::ops::{doctor, format_report, DoctorOptions};
use py2win::util::{GlobalContext, SystemRunner};

pub fn execute(args: DoctorArgs, verbose: bool) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let (_, config) = super::load_project(&ctx, None)?;

    let options = DoctorOptions {
        python: args
            .python
            .or(config.build.python)
            .unwrap_or_else(default_python),
        toolchain: config.toolchain,
    };

    let report = doctor(&options, &mut SystemRunner);
    print!("{}", format_report(&report, verbose));

    Ok(())
}

#![forbid(unsafe_code)]
// SPDX-License-Identifier: Apache-2.0 OR MIT
//! `lithos-tmpl` binary.

use std::process::ExitCode;

use lithos_tmpl::{logging, Args};

fn main() -> ExitCode {
    let args = Args::parse_compat();
    logging::init(args.log_level());

    match lithos_tmpl::run(&args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = ?err, "run failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

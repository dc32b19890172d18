//! `version` command.

use edi_telemetry::build_info;

pub(crate) fn print() {
    println!("{}", build_info());
}

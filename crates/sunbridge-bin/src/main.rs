// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! sunbridge - RS485 solar inverter session manager
//!
//! Main binary entry point.

use sunbridge_bin::{commands, error::report_error_and_exit, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    if let Err(e) = commands::execute(cli).await {
        report_error_and_exit(e);
    }
}

// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `version` command.

use crate::cli::Cli;
use crate::error::BinResult;

/// Executes the `version` command to display version information.
pub fn version(_cli: &Cli) -> BinResult<()> {
    println!("sunbridge - RS485 solar inverter session manager");
    println!();
    println!("Version Information:");
    println!("  sunbridge-bin:    {}", env!("CARGO_PKG_VERSION"));
    println!("  sunbridge-core:   {}", sunbridge_core::VERSION);
    println!("  sunbridge-yasdi:  {}", sunbridge_yasdi::VERSION);
    println!("  sunbridge-config: {}", sunbridge_config::VERSION);
    println!();
    println!("Build Information:");
    println!("  Target:  {}", std::env::consts::ARCH);
    println!("  OS:      {}", std::env::consts::OS);
    println!("  Library: {}", sunbridge_yasdi::DEFAULT_LIBRARY);
    println!();
    println!("License: PolyForm Noncommercial License 1.0.0");
    println!("Copyright (c) 2025 Sylvex. All rights reserved.");

    Ok(())
}

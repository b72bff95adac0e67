// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Generates `env_vars.rs`: one `&str` constant per environment variable the
//! client reads, so every lookup goes through a checked name.

use std::fmt::Write as _;

const ENV_VARS: &[(&str, &str)] = &[
    ("FITSYNC_STATE_DIR", "State directory holding config.toml and queue.jsonl"),
    ("FITSYNC_TOKEN", "Identity token; overrides the config file"),
    ("XDG_STATE_HOME", "Base for the default state directory"),
    ("RUST_LOG", "Log filter; overrides --verbose"),
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut generated = String::new();
    for (name, doc) in ENV_VARS {
        writeln!(generated, "/// {doc}.")?;
        writeln!(generated, "pub const {name}: &str = {name:?};")?;
    }

    let out_dir = std::path::PathBuf::from(std::env::var("OUT_DIR")?);
    std::fs::write(out_dir.join("env_vars.rs"), generated)?;
    println!("cargo:rerun-if-changed=build.rs");
    Ok(())
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! JSONL (JSON Lines) file utilities.
//!
//! Durable storage for JSON-serializable records, one record per line.
//! Appends are fsynced before returning. Rewrites go to a sibling temp file
//! that is fsynced and renamed over the original, so a crash mid-rewrite
//! leaves either the old or the new contents, never a torn file.
//!
//! An append cut short by a crash or a full disk can still leave a partial
//! last line. [`repair_tail`] and every [`append`] strip such a fragment
//! before new records land, so later lines never run into it.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::Result;

/// Appends a record to a JSONL file with fsync for durability.
pub fn append<T: Serialize>(path: &Path, record: &T) -> Result<()> {
    let mut line = serde_json::to_string(record)?;
    line.push('\n');

    let mut file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .read(true)
        .write(true)
        .open(path)?;
    repair_open_tail(&mut file)?;
    file.seek(SeekFrom::End(0))?;
    file.write_all(line.as_bytes())?;
    file.sync_all()?;

    Ok(())
}

/// Repairs an unterminated last line.
///
/// A trailing record that is complete JSON gets its missing newline; a
/// partial one is truncated away. Returns `true` if the file changed.
pub fn repair_tail(path: &Path) -> Result<bool> {
    let mut file = match OpenOptions::new().read(true).write(true).open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e.into()),
    };
    let repaired = repair_open_tail(&mut file)?;
    if repaired {
        file.sync_all()?;
    }
    Ok(repaired)
}

fn repair_open_tail(file: &mut File) -> Result<bool> {
    let len = file.seek(SeekFrom::End(0))?;
    if len == 0 {
        return Ok(false);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    if last[0] == b'\n' {
        return Ok(false);
    }

    let mut contents = Vec::new();
    file.seek(SeekFrom::Start(0))?;
    file.read_to_end(&mut contents)?;
    let start = contents
        .iter()
        .rposition(|&b| b == b'\n')
        .map_or(0, |i| i + 1);

    if serde_json::from_slice::<serde_json::Value>(&contents[start..]).is_ok() {
        file.seek(SeekFrom::End(0))?;
        file.write_all(b"\n")?;
    } else {
        file.set_len(start as u64)?;
    }
    Ok(true)
}

/// Reads all records from a JSONL file.
///
/// Skips blank lines and returns an empty vec if the file doesn't exist.
pub fn read_all<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut records = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(serde_json::from_str(&line)?);
    }

    Ok(records)
}

/// Atomically replaces the file's contents with `records`.
pub fn write_all<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    let tmp = temp_path(path);

    {
        let mut writer = BufWriter::new(File::create(&tmp)?);
        for record in records {
            let json = serde_json::to_string(record)?;
            writeln!(writer, "{json}")?;
        }
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
    }

    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }

    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
#[path = "jsonl_tests.rs"]
mod tests;

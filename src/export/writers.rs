/*!
 * Serializers for the export formats.
 *
 * - text: one `<script>.txt` per script under its category folder
 * - bson: one `script.bson` document mapping script -> UTF-8 bytes
 * - zst: the same mapping as MessagePack, zstd-compressed into `script.zst`
 */

use bson::spec::BinarySubtype;
use bson::{Binary, Bson, Document};
use chrono::Local;
use indexmap::IndexMap;
use log::{info, warn};
use serde_bytes::ByteBuf;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use super::ExportUnit;
use super::retry::RetryPolicy;
use super::routing;
use crate::errors::ExportError;

/// zstd level used for the compressed container
const ZSTD_LEVEL: i32 = 22;

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ExportError + '_ {
    move |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Move an existing export folder aside and create every category folder.
///
/// Returns where the previous folder went, if there was one.
pub fn prepare_text_root(root: &Path) -> Result<Option<PathBuf>, ExportError> {
    let mut moved = None;
    if root.exists() {
        let stamp = Local::now().format("%Y-%m-%d %H%M%S");
        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "export".to_string());
        let target = root.with_file_name(format!("{} ({})", name, stamp));
        fs::rename(root, &target).map_err(io_error(root))?;
        info!("Previous export moved to {:?}", target);
        moved = Some(target);
    }

    for category in routing::categories() {
        let dir = routing::category_dir(root, category);
        fs::create_dir_all(&dir).map_err(io_error(&dir))?;
    }
    Ok(moved)
}

/// Text file of `unit` under `root`
pub fn text_path(root: &Path, unit: &ExportUnit) -> PathBuf {
    let stem = Path::new(&unit.script)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| unit.script.clone());
    routing::category_dir(root, routing::route(&unit.script)).join(format!("{}.txt", stem))
}

fn append_lines(path: &Path, lines: &[String]) -> std::io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = BufWriter::new(file);
    for line in lines {
        writeln!(writer, "{}", line)?;
    }
    writer.flush()
}

/// Append one script's lines to its text file, retrying on failure.
///
/// Returns false when every attempt failed.
pub async fn write_text_unit(root: &Path, unit: &ExportUnit, retry: &RetryPolicy) -> bool {
    let path = text_path(root, unit);
    match retry.run(|_| append_lines(&path, &unit.lines)).await {
        Ok(()) => {
            info!("Writing: {}", unit.script);
            true
        }
        Err(e) => {
            warn!("Could not write {:?}: {}", path, e);
            false
        }
    }
}

/// Write every unit into a single BSON document
pub fn write_bson(path: &Path, units: &[ExportUnit]) -> Result<(), ExportError> {
    let mut document = Document::new();
    for unit in units {
        document.insert(
            unit.script.clone(),
            Bson::Binary(Binary {
                subtype: BinarySubtype::Generic,
                bytes: unit.text().into_bytes(),
            }),
        );
    }

    let file = create_file(path)?;
    let mut writer = BufWriter::new(file);
    document.to_writer(&mut writer)?;
    writer.flush().map_err(io_error(path))
}

/// Write every unit as zstd-compressed MessagePack
pub fn write_zst(path: &Path, units: &[ExportUnit]) -> Result<(), ExportError> {
    let scripts: IndexMap<&str, ByteBuf> = units
        .iter()
        .map(|unit| (unit.script.as_str(), ByteBuf::from(unit.text().into_bytes())))
        .collect();
    let packed = rmp_serde::to_vec(&scripts)?;

    let file = create_file(path)?;
    let mut encoder = zstd::stream::write::Encoder::new(file, ZSTD_LEVEL).map_err(io_error(path))?;
    encoder.write_all(&packed).map_err(io_error(path))?;
    encoder.finish().map_err(io_error(path))?;
    Ok(())
}

fn create_file(path: &Path) -> Result<File, ExportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error(parent))?;
    }
    File::create(path).map_err(io_error(path))
}

/*============================================================
  Synavera Project: Syn-Pak
  Module: synpak_core::apply
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1
  ------------------------------------------------------------
  Purpose:
    Atomically commit a verified artifact to local storage:
    embed the manifest, replace a packaged file or a
    directory tree, and persist host-side state.

  Security / Safety Notes:
    Archive extraction rejects entries that escape the
    destination. No privilege escalation; operator paths only.

  Dependencies:
    zip for archive embed/extract, serde_json for the
    embedded manifest.

  Operational Scope:
    Runs only after the downloader has verified the artifact
    hash. No rollback is attempted once the filesystem swap
    has begun; that limitation is documented, not patched.

  Revision History:
    2025-11-12 COD  Authored atomic apply stage.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Artifact made self-describing before the swap
    - Atomic replace where the platform supports it
    - Explicit, non-silent failure modes
============================================================*/

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::error::{Result, SynpakError};
use crate::manifest::{PackManifest, EMBEDDED_MANIFEST_NAME};

/// Write the updated manifest into the packaged artifact so it is
/// self-describing before the filesystem swap commits it.
pub fn embed_manifest(artifact: &NamedTempFile, manifest: &PackManifest) -> Result<()> {
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .open(artifact.path())
        .map_err(|err| {
            SynpakError::Filesystem(format!(
                "Failed to reopen artifact {}: {err}",
                artifact.path().display()
            ))
        })?;

    let mut writer = ZipWriter::new_append(file).map_err(|err| {
        SynpakError::Filesystem(format!(
            "Failed to open artifact {} as archive: {err}",
            artifact.path().display()
        ))
    })?;
    writer
        .start_file(EMBEDDED_MANIFEST_NAME, SimpleFileOptions::default())
        .map_err(|err| {
            SynpakError::Filesystem(format!("Failed to add embedded manifest entry: {err}"))
        })?;

    let payload = serde_json::to_vec_pretty(manifest)
        .map_err(|err| SynpakError::Serialization(format!("Failed to encode manifest: {err}")))?;
    writer
        .write_all(&payload)
        .map_err(|err| SynpakError::Filesystem(format!("Failed to write embedded manifest: {err}")))?;
    writer
        .finish()
        .map_err(|err| SynpakError::Filesystem(format!("Failed to finish artifact archive: {err}")))?;
    Ok(())
}

/// Replace a single packaged file with the verified artifact.
///
/// Callers release any handle held on the existing destination
/// before this runs; the move itself is a rename (atomic where the
/// platform supports it) with a copy fallback for cross-device
/// destinations.
pub fn replace_file(artifact: NamedTempFile, destination: &Path) -> Result<()> {
    if let Some(parent) = destination.parent() {
        std::fs::create_dir_all(parent).map_err(|err| {
            SynpakError::Filesystem(format!(
                "Failed to create destination directory {}: {err}",
                parent.display()
            ))
        })?;
    }

    match artifact.persist(destination) {
        Ok(_) => Ok(()),
        Err(persist_err) => {
            // Rename across filesystems fails; fall back to a copy.
            let tmp = persist_err.file;
            std::fs::copy(tmp.path(), destination).map_err(|err| {
                SynpakError::Filesystem(format!(
                    "Failed to copy artifact onto {}: {err}",
                    destination.display()
                ))
            })?;
            Ok(())
        }
    }
}

/// Replace a directory tree with the artifact's contents.
///
/// The existing tree is deleted first; the temp artifact is removed
/// once extraction completes.
pub fn replace_tree(artifact: NamedTempFile, destination: &Path) -> Result<()> {
    if destination.exists() {
        std::fs::remove_dir_all(destination).map_err(|err| {
            SynpakError::Filesystem(format!(
                "Failed to clear destination tree {}: {err}",
                destination.display()
            ))
        })?;
    }
    std::fs::create_dir_all(destination).map_err(|err| {
        SynpakError::Filesystem(format!(
            "Failed to create destination tree {}: {err}",
            destination.display()
        ))
    })?;

    extract_archive(artifact.path(), destination)?;
    // Dropping the NamedTempFile removes the temp artifact.
    Ok(())
}

fn extract_archive(archive_path: &Path, destination: &Path) -> Result<()> {
    let file = File::open(archive_path).map_err(|err| {
        SynpakError::Filesystem(format!(
            "Failed to open artifact {}: {err}",
            archive_path.display()
        ))
    })?;
    let mut archive = ZipArchive::new(file).map_err(|err| {
        SynpakError::Filesystem(format!(
            "Failed to read artifact {} as archive: {err}",
            archive_path.display()
        ))
    })?;

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(|err| {
            SynpakError::Filesystem(format!("Failed to read archive entry {index}: {err}"))
        })?;
        let relative = entry.enclosed_name().ok_or_else(|| {
            SynpakError::Filesystem(format!(
                "Archive entry {} escapes the destination",
                entry.name()
            ))
        })?;
        let target = destination.join(relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&target).map_err(|err| {
                SynpakError::Filesystem(format!(
                    "Failed to create directory {}: {err}",
                    target.display()
                ))
            })?;
            continue;
        }

        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).map_err(|err| {
                SynpakError::Filesystem(format!(
                    "Failed to create directory {}: {err}",
                    parent.display()
                ))
            })?;
        }
        let mut out = File::create(&target).map_err(|err| {
            SynpakError::Filesystem(format!("Failed to create {}: {err}", target.display()))
        })?;
        std::io::copy(&mut entry, &mut out).map_err(|err| {
            SynpakError::Filesystem(format!("Failed to extract {}: {err}", target.display()))
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn artifact_with(entries: &[(&str, &[u8])]) -> NamedTempFile {
        let mut writer = ZipWriter::new(std::io::Cursor::new(Vec::new()));
        for (name, data) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(data).unwrap();
        }
        let bytes = writer.finish().unwrap().into_inner();

        let mut tmp = NamedTempFile::new().unwrap();
        tmp.as_file_mut().write_all(&bytes).unwrap();
        tmp.as_file_mut().flush().unwrap();
        tmp
    }

    #[test]
    fn embedded_manifest_is_readable_from_the_artifact() {
        let artifact = artifact_with(&[("pack.mcmeta", b"{}")]);
        let manifest = PackManifest {
            version: "v2".into(),
            version_number: "1.1".into(),
            last_update_timestamp: 7,
        };

        embed_manifest(&artifact, &manifest).unwrap();

        let mut archive = ZipArchive::new(File::open(artifact.path()).unwrap()).unwrap();
        let entry = archive.by_name(EMBEDDED_MANIFEST_NAME).unwrap();
        let embedded: PackManifest = serde_json::from_reader(entry).unwrap();
        assert_eq!(embedded, manifest);
    }

    #[test]
    fn replace_file_swaps_the_destination_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("pack.zip");
        std::fs::write(&destination, b"stale").unwrap();

        let mut artifact = NamedTempFile::new_in(dir.path()).unwrap();
        artifact.as_file_mut().write_all(b"fresh").unwrap();

        replace_file(artifact, &destination).unwrap();

        assert_eq!(std::fs::read(&destination).unwrap(), b"fresh");
    }

    #[test]
    fn replace_tree_clears_stale_content_and_extracts() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("pack");
        std::fs::create_dir_all(&destination).unwrap();
        std::fs::write(destination.join("stale.txt"), b"old").unwrap();

        let artifact = artifact_with(&[
            ("pack.mcmeta", b"{}"),
            ("assets/sound.ogg", b"data"),
        ]);
        let temp_path = artifact.path().to_path_buf();

        replace_tree(artifact, &destination).unwrap();

        assert!(!destination.join("stale.txt").exists());
        assert_eq!(std::fs::read(destination.join("pack.mcmeta")).unwrap(), b"{}");
        assert_eq!(
            std::fs::read(destination.join("assets").join("sound.ogg")).unwrap(),
            b"data"
        );
        assert!(!temp_path.exists());
    }
}

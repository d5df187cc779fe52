//! Archive validation and extraction.

use std::fs::File;
use std::io;
use std::path::Path;

use log::debug;
use zip::ZipArchive;

use crate::backend::error::{Result, UpdateError};

/// Check that `path` opens as a structurally valid ZIP archive.
///
/// Runs right after download so a truncated or spoofed file fails with a
/// distinct error instead of a broken install.
pub fn validate_archive(path: &Path) -> Result<()> {
    let file = File::open(path)
        .map_err(|err| UpdateError::fs(format!("cannot open {}", path.display()), err))?;
    ZipArchive::new(file).map_err(|err| UpdateError::CorruptArchive(err.to_string()))?;
    Ok(())
}

/// Extract every entry of the archive into `dest`.
///
/// Entries whose resolved path would escape `dest` abort the extraction.
/// Unix permission bits are carried over when the entry records them.
pub fn extract_zip(archive_path: &Path, dest: &Path) -> Result<()> {
    let file = File::open(archive_path)
        .map_err(|err| UpdateError::fs(format!("cannot open {}", archive_path.display()), err))?;
    let mut zip = ZipArchive::new(file).map_err(|err| UpdateError::CorruptArchive(err.to_string()))?;

    for index in 0..zip.len() {
        let mut entry = zip
            .by_index(index)
            .map_err(|err| UpdateError::CorruptArchive(err.to_string()))?;
        let Some(relative) = entry.enclosed_name() else {
            return Err(UpdateError::CorruptArchive(format!(
                "entry {:?} escapes the install directory",
                entry.name()
            )));
        };
        let outpath = dest.join(relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&outpath).map_err(|err| {
                UpdateError::fs(format!("cannot create directory {}", outpath.display()), err)
            })?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            std::fs::create_dir_all(parent).map_err(|err| {
                UpdateError::fs(format!("cannot create directory {}", parent.display()), err)
            })?;
        }
        let mut outfile = File::create(&outpath)
            .map_err(|err| UpdateError::fs(format!("cannot create {}", outpath.display()), err))?;
        io::copy(&mut entry, &mut outfile)
            .map_err(|err| UpdateError::fs(format!("cannot write {}", outpath.display()), err))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                let _ =
                    std::fs::set_permissions(&outpath, std::fs::Permissions::from_mode(mode));
            }
        }
    }

    debug!("extracted {} entries into {}", zip.len(), dest.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
        let file = File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default();
        for (name, content) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(content).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn extracts_nested_entries() {
        let temp = tempfile::tempdir().unwrap();
        let archive = temp.path().join("nested.zip");
        let dest = temp.path().join("out");
        write_zip(&archive, &[("saves/slot1/data.bin", b"state")]);

        std::fs::create_dir_all(&dest).unwrap();
        extract_zip(&archive, &dest).unwrap();

        assert_eq!(
            std::fs::read(dest.join("saves/slot1/data.bin")).unwrap(),
            b"state"
        );
    }

    #[test]
    fn rejects_entries_escaping_the_destination() {
        let temp = tempfile::tempdir().unwrap();
        let archive = temp.path().join("escape.zip");
        let dest = temp.path().join("out");
        write_zip(&archive, &[("../evil.txt", b"pwned")]);

        std::fs::create_dir_all(&dest).unwrap();
        let err = extract_zip(&archive, &dest).unwrap_err();

        assert!(matches!(err, UpdateError::CorruptArchive(_)));
        assert!(!temp.path().join("evil.txt").exists());
    }

    #[test]
    fn validate_rejects_non_archive_bytes() {
        let temp = tempfile::tempdir().unwrap();
        let bogus = temp.path().join("bogus.zip");
        std::fs::write(&bogus, b"plain text, no central directory").unwrap();

        let err = validate_archive(&bogus).unwrap_err();
        assert!(matches!(err, UpdateError::CorruptArchive(_)));
    }

    #[test]
    fn validate_accepts_a_real_archive() {
        let temp = tempfile::tempdir().unwrap();
        let archive = temp.path().join("fine.zip");
        write_zip(&archive, &[("readme.txt", b"hello")]);

        validate_archive(&archive).unwrap();
    }
}

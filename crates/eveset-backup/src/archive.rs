//! Zip archive writing and reading for profile snapshots.
//!
//! Every entry is stored as `<profile>/<relative path>` with `/` separators.

use crate::error::{BackupError, Result};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Seek, Write};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Regular files under `root`, relative to it, in file-name order.
/// Symlinks and special files are skipped.
pub fn collect_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| BackupError::io("reading profile", io::Error::from(e)))?;
        if !entry.file_type().is_file() {
            continue;
        }
        if let Ok(rel) = entry.path().strip_prefix(root) {
            files.push(rel.to_path_buf());
        }
    }

    Ok(files)
}

/// Archive entry name for `rel` inside `profile_name`
pub fn entry_name(profile_name: &str, rel: &Path) -> String {
    let mut name = String::from(profile_name);
    for component in rel.components() {
        if let Component::Normal(part) = component {
            name.push('/');
            name.push_str(&part.to_string_lossy());
        }
    }
    name
}

/// Write `files` (relative to `source_dir`) into a new deflated archive at `dest`.
pub fn write_archive(
    source_dir: &Path,
    profile_name: &str,
    files: &[PathBuf],
    dest: &Path,
) -> Result<()> {
    let context = "creating backup";
    let file = File::create(dest).map_err(|e| BackupError::io(context, e))?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for rel in files {
        let name = entry_name(profile_name, rel);
        debug!("Adding {}", name);

        zip.start_file(name, options)
            .map_err(|e| BackupError::zip(context, e))?;
        let mut source =
            File::open(source_dir.join(rel)).map_err(|e| BackupError::io(context, e))?;
        io::copy(&mut source, &mut zip).map_err(|e| BackupError::io(context, e))?;
    }

    let mut writer = zip.finish().map_err(|e| BackupError::zip(context, e))?;
    writer.flush().map_err(|e| BackupError::io(context, e))?;
    Ok(())
}

/// Open an archive for reading
pub fn open_archive(path: &Path, context: &'static str) -> Result<ZipArchive<BufReader<File>>> {
    let file = File::open(path).map_err(|e| BackupError::io(context, e))?;
    ZipArchive::new(BufReader::new(file)).map_err(|e| BackupError::zip(context, e))
}

/// Number of file (non-directory) entries, read from the central directory only
pub fn count_file_entries<R: Read + Seek>(zip: &ZipArchive<R>) -> usize {
    zip.file_names().filter(|name| !name.ends_with('/')).count()
}

/// Shared first path component when every file entry sits beneath it.
///
/// Archives made by this crate always have one (the profile folder), so a
/// restore can drop it and land files directly in the target folder.
pub fn common_root<R: Read + Seek>(zip: &ZipArchive<R>) -> Option<String> {
    let mut root: Option<&str> = None;

    for name in zip.file_names().filter(|name| !name.ends_with('/')) {
        let (first, rest) = name.split_once('/')?;
        if first.is_empty() || rest.is_empty() {
            return None;
        }
        match root {
            None => root = Some(first),
            Some(existing) if existing == first => {}
            Some(_) => return None,
        }
    }

    root.map(str::to_string)
}

/// Extract every entry into `dest`, dropping `strip` from the front of each path.
///
/// Entries that would escape `dest` are skipped. Every file is read to the end
/// so its checksum is verified. Returns the number of files written.
pub fn extract_archive<R: Read + Seek>(
    zip: &mut ZipArchive<R>,
    dest: &Path,
    strip: Option<&str>,
) -> Result<usize> {
    let context = "restoring backup";
    let mut restored = 0;

    for index in 0..zip.len() {
        let mut entry = zip
            .by_index(index)
            .map_err(|e| BackupError::zip(context, e))?;

        let Some(enclosed) = entry.enclosed_name().map(|p| p.to_path_buf()) else {
            warn!("Skipping unsafe archive entry: {}", entry.name());
            continue;
        };

        let rel = match strip {
            Some(prefix) => enclosed
                .strip_prefix(prefix)
                .map(Path::to_path_buf)
                .unwrap_or(enclosed),
            None => enclosed,
        };
        if rel.as_os_str().is_empty() {
            continue;
        }

        let out = dest.join(&rel);
        if entry.is_dir() {
            fs::create_dir_all(&out).map_err(|e| BackupError::io(context, e))?;
            continue;
        }

        if let Some(parent) = out.parent() {
            fs::create_dir_all(parent).map_err(|e| BackupError::io(context, e))?;
        }
        let mut file = File::create(&out).map_err(|e| BackupError::io(context, e))?;
        let name = entry.name().to_string();
        let expected = entry.size();
        let written = copy_entry(&mut entry, &mut file, &name, context)?;
        check_size(&name, written, expected)?;
        restored += 1;
    }

    Ok(restored)
}

const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Stream one entry into `out` through a fixed buffer.
///
/// Read failures (bad CRC, truncated data) mean the archive is corrupted;
/// write failures are reported as IO errors under `context`.
fn copy_entry<R: Read, W: Write>(
    entry: &mut R,
    out: &mut W,
    name: &str,
    context: &'static str,
) -> Result<u64> {
    let mut buf = vec![0u8; COPY_BUFFER_SIZE];
    let mut total = 0u64;

    loop {
        let n = match entry.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(BackupError::corrupted(format!("{}: {}", name, e))),
        };
        out.write_all(&buf[..n])
            .map_err(|e| BackupError::io(context, e))?;
        total += n as u64;
    }

    out.flush().map_err(|e| BackupError::io(context, e))?;
    Ok(total)
}

/// The header's uncompressed size must match what the entry actually held
fn check_size(name: &str, actual: u64, declared: u64) -> Result<()> {
    if actual != declared {
        return Err(BackupError::corrupted(format!(
            "{}: size mismatch (header says {} bytes, found {})",
            name, declared, actual
        )));
    }
    Ok(())
}

/// Decompress every entry and discard the output, surfacing CRC and format errors
pub fn verify_entries<R: Read + Seek>(zip: &mut ZipArchive<R>) -> Result<usize> {
    let mut files = 0;

    for index in 0..zip.len() {
        let mut entry = zip
            .by_index(index)
            .map_err(|e| BackupError::zip("reading backup", e))?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().to_string();
        let expected = entry.size();
        let read = copy_entry(&mut entry, &mut io::sink(), &name, "reading backup")?;
        check_size(&name, read, expected)?;
        files += 1;
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_profile(temp: &TempDir) -> PathBuf {
        let profile = temp.path().join("settings_Default");
        fs::create_dir_all(profile.join("subdir")).unwrap();
        fs::write(profile.join("core_user_123.dat"), b"user").unwrap();
        fs::write(profile.join("subdir/core_char_456.dat"), b"char").unwrap();
        profile
    }

    #[test]
    fn test_entry_name_uses_forward_slashes() {
        let rel = Path::new("subdir").join("nested").join("core_char_456.dat");
        assert_eq!(
            entry_name("settings_Default", &rel),
            "settings_Default/subdir/nested/core_char_456.dat"
        );
    }

    #[test]
    fn test_collect_files_sorted_and_relative() {
        let temp = TempDir::new().unwrap();
        let profile = sample_profile(&temp);

        let files = collect_files(&profile).unwrap();
        assert_eq!(
            files,
            vec![
                PathBuf::from("core_user_123.dat"),
                Path::new("subdir").join("core_char_456.dat"),
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_collect_files_skips_symlinks() {
        let temp = TempDir::new().unwrap();
        let profile = sample_profile(&temp);
        std::os::unix::fs::symlink(
            profile.join("core_user_123.dat"),
            profile.join("link.dat"),
        )
        .unwrap();

        let files = collect_files(&profile).unwrap();
        assert!(!files.contains(&PathBuf::from("link.dat")));
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_write_then_extract_with_strip() {
        let temp = TempDir::new().unwrap();
        let profile = sample_profile(&temp);
        let files = collect_files(&profile).unwrap();
        let archive = temp.path().join("out.zip");
        write_archive(&profile, "settings_Default", &files, &archive).unwrap();

        let mut zip = open_archive(&archive, "reading backup").unwrap();
        assert_eq!(count_file_entries(&zip), 2);
        assert_eq!(common_root(&zip).as_deref(), Some("settings_Default"));

        let dest = temp.path().join("restored");
        let count = extract_archive(&mut zip, &dest, Some("settings_Default")).unwrap();
        assert_eq!(count, 2);
        assert_eq!(fs::read(dest.join("core_user_123.dat")).unwrap(), b"user");
        assert_eq!(
            fs::read(dest.join("subdir/core_char_456.dat")).unwrap(),
            b"char"
        );
        assert!(!dest.join("settings_Default").exists());
    }

    #[test]
    fn test_common_root_requires_shared_folder() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("mixed.zip");
        let mut zip = ZipWriter::new(File::create(&path).unwrap());
        let options = SimpleFileOptions::default();
        zip.start_file("a/one.txt", options).unwrap();
        zip.write_all(b"1").unwrap();
        zip.start_file("top.txt", options).unwrap();
        zip.write_all(b"2").unwrap();
        zip.finish().unwrap();

        let zip = open_archive(&path, "reading backup").unwrap();
        assert_eq!(common_root(&zip), None);
    }

    /// Rewrites the uncompressed size of every header in a single-entry stored archive
    fn inflate_declared_size(path: &Path, size: u32) {
        let mut bytes = fs::read(path).unwrap();
        let patch = |bytes: &mut Vec<u8>, signature: u32, offset: usize| {
            let at = bytes
                .windows(4)
                .position(|w| w == signature.to_le_bytes())
                .unwrap();
            bytes[at + offset..at + offset + 4].copy_from_slice(&size.to_le_bytes());
        };
        patch(&mut bytes, 0x0403_4b50, 22);
        patch(&mut bytes, 0x0201_4b50, 24);
        fs::write(path, bytes).unwrap();
    }

    fn stored_archive(path: &Path, name: &str, payload: &[u8]) {
        let mut zip = ZipWriter::new(File::create(path).unwrap());
        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        zip.start_file(name, stored).unwrap();
        zip.write_all(payload).unwrap();
        zip.finish().unwrap();
    }

    #[test]
    fn test_copy_entry_streams_large_content() {
        let payload = vec![7u8; COPY_BUFFER_SIZE * 3 + 11];
        let mut out = Vec::new();
        let copied =
            copy_entry(&mut payload.as_slice(), &mut out, "big.dat", "restoring backup").unwrap();
        assert_eq!(copied, payload.len() as u64);
        assert_eq!(out, payload);
    }

    #[test]
    fn test_extract_rejects_inflated_declared_size() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("inflated.zip");
        stored_archive(&path, "settings_Default/core_user_1.dat", b"hello world");
        inflate_declared_size(&path, 0x7FFF_FF00);

        let dest = temp.path().join("dest");
        let mut zip = open_archive(&path, "reading backup").unwrap();
        let err = extract_archive(&mut zip, &dest, Some("settings_Default")).unwrap_err();
        assert!(matches!(err, BackupError::Corrupted { .. }));

        let mut zip = open_archive(&path, "reading backup").unwrap();
        let err = verify_entries(&mut zip).unwrap_err();
        assert!(matches!(err, BackupError::Corrupted { .. }));
    }

    #[test]
    fn test_extract_skips_escaping_entries() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("evil.zip");
        let mut zip = ZipWriter::new(File::create(&path).unwrap());
        let options = SimpleFileOptions::default();
        zip.start_file("../escape.txt", options).unwrap();
        zip.write_all(b"x").unwrap();
        zip.start_file("safe/ok.txt", options).unwrap();
        zip.write_all(b"y").unwrap();
        zip.finish().unwrap();

        let dest = temp.path().join("dest");
        let mut zip = open_archive(&path, "reading backup").unwrap();
        let count = extract_archive(&mut zip, &dest, None).unwrap();

        assert_eq!(count, 1);
        assert!(dest.join("safe/ok.txt").exists());
        assert!(!temp.path().join("escape.txt").exists());
    }
}

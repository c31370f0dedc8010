use crate::core::copier::ByteCopier;
use crate::utils::error::{KclError, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zip::write::{FileOptions, ZipWriter};
use zip::ZipArchive;

/// Archives the content of `dir` into `zip_file`. Entry names are relative
/// to `dir` and use `/`. Entry data is copied in chunks of `buffer_size`
/// bytes. Returns the number of files stored.
pub fn zip_dir<P: AsRef<Path>, Q: AsRef<Path>>(
    zip_file: P,
    dir: Q,
    buffer_size: usize,
) -> Result<usize> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(KclError::InvalidValueError {
            field: "dir".to_string(),
            value: dir.display().to_string(),
            reason: "not a directory".to_string(),
        });
    }

    let mut zip = ZipWriter::new(File::create(zip_file.as_ref())?);
    let copier = ByteCopier::new().with_buffer_size(buffer_size);
    let mut count = 0;
    for entry in WalkDir::new(dir).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| KclError::wrap(e, format!("cannot walk {}", dir.display())))?;
        let name = entry_name(dir, entry.path())?;
        if entry.file_type().is_dir() {
            zip.add_directory::<_, ()>(name, FileOptions::default())?;
            continue;
        }
        tracing::debug!("Adding {} to archive", name);
        zip.start_file::<_, ()>(name, FileOptions::default())?;
        let mut reader = BufReader::new(File::open(entry.path())?);
        copier.copy(&mut reader, &mut zip)?;
        count += 1;
    }
    zip.finish()?;

    tracing::info!(
        "Archived {} files from {} into {}",
        count,
        dir.display(),
        zip_file.as_ref().display()
    );
    Ok(count)
}

fn entry_name(base: &Path, path: &Path) -> Result<String> {
    let relative = path
        .strip_prefix(base)
        .map_err(|e| KclError::wrap(e, format!("{} is outside of {}", path.display(), base.display())))?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(parts.join("/"))
}

/// Extracts `zip_file` below `dest`. Entries whose names would escape
/// `dest` make the whole call fail. Returns the extracted file paths.
pub fn unzip<P: AsRef<Path>, Q: AsRef<Path>>(
    zip_file: P,
    dest: Q,
    buffer_size: usize,
) -> Result<Vec<PathBuf>> {
    let dest = dest.as_ref();
    let mut archive = ZipArchive::new(BufReader::new(File::open(zip_file.as_ref())?))?;
    let copier = ByteCopier::new().with_buffer_size(buffer_size);
    let mut extracted = Vec::new();

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let relative = entry
            .enclosed_name()
            .ok_or_else(|| KclError::InvalidValueError {
                field: "entry".to_string(),
                value: entry.name().to_string(),
                reason: "entry escapes the target directory".to_string(),
            })?;
        let target = dest.join(relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&target)?;
            continue;
        }
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&target)?;
        copier.copy(&mut entry, &mut out)?;
        extracted.push(target);
    }

    tracing::info!(
        "Extracted {} files from {} into {}",
        extracted.len(),
        zip_file.as_ref().display(),
        dest.display()
    );
    Ok(extracted)
}

pub fn list_entries<P: AsRef<Path>>(zip_file: P) -> Result<Vec<String>> {
    let archive = ZipArchive::new(BufReader::new(File::open(zip_file)?))?;
    Ok(archive.file_names().map(str::to_string).collect())
}

/// True when the file can be opened as a zip archive.
pub fn is_valid_zip<P: AsRef<Path>>(path: P) -> bool {
    match File::open(path) {
        Ok(file) => ZipArchive::new(BufReader::new(file)).is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::copier::DEFAULT_BUFFER_SIZE;
    use std::io::Write;
    use tempfile::TempDir;

    fn sample_tree(base: &Path) {
        std::fs::create_dir_all(base.join("docs/deep")).unwrap();
        std::fs::write(base.join("readme.txt"), "hello").unwrap();
        std::fs::write(base.join("docs/a.txt"), "alpha").unwrap();
        std::fs::write(base.join("docs/deep/b.bin"), [0u8, 1, 2, 255]).unwrap();
    }

    #[test]
    fn test_zip_and_unzip_directory() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("source");
        sample_tree(&source);
        let zip_path = temp_dir.path().join("out.zip");

        let count = zip_dir(&zip_path, &source, DEFAULT_BUFFER_SIZE).unwrap();
        assert_eq!(count, 3);
        assert!(is_valid_zip(&zip_path));

        let mut names = list_entries(&zip_path).unwrap();
        names.sort();
        assert!(names.contains(&"docs/deep/b.bin".to_string()));
        assert!(names.contains(&"readme.txt".to_string()));

        let target = temp_dir.path().join("target");
        let extracted = unzip(&zip_path, &target, 3).unwrap();
        assert_eq!(extracted.len(), 3);
        assert_eq!(std::fs::read_to_string(target.join("docs/a.txt")).unwrap(), "alpha");
        assert_eq!(
            std::fs::read(target.join("docs/deep/b.bin")).unwrap(),
            vec![0u8, 1, 2, 255]
        );
    }

    #[test]
    fn test_zip_dir_rejects_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("plain.txt");
        std::fs::write(&file, "x").unwrap();
        assert!(zip_dir(temp_dir.path().join("x.zip"), &file, DEFAULT_BUFFER_SIZE).is_err());
    }

    #[test]
    fn test_unzip_refuses_escaping_entries() {
        let temp_dir = TempDir::new().unwrap();
        let zip_path = temp_dir.path().join("evil.zip");
        let mut zip = ZipWriter::new(File::create(&zip_path).unwrap());
        zip.start_file::<_, ()>("../evil.txt", FileOptions::default())
            .unwrap();
        zip.write_all(b"boom").unwrap();
        zip.finish().unwrap();

        let target = temp_dir.path().join("target");
        assert!(unzip(&zip_path, &target, DEFAULT_BUFFER_SIZE).is_err());
        assert!(!temp_dir.path().join("evil.txt").exists());
    }

    #[test]
    fn test_invalid_zip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("not.zip");
        std::fs::write(&path, "plain text").unwrap();
        assert!(!is_valid_zip(&path));
        assert!(!is_valid_zip(temp_dir.path().join("missing.zip")));
        assert!(list_entries(&path).is_err());
    }
}

//! Unpacks a user-supplied `*.tar.gz` into a content-addressed cache
//! directory and parses its `DESCRIPTION`, producing an extra root for the
//! resolver plus a `name -> directory` mapping for the install engine.

use crate::error::TarballError;
use md5::{Digest, Md5};
use pkgr_desc::PackageDesc;
use std::path::{Path, PathBuf};

/// One unpacked source tarball, ready to feed into resolution.
#[derive(Debug, Clone)]
pub struct IngestedTarball {
    pub name: String,
    pub dir: PathBuf,
    pub desc: PackageDesc,
}

/// Unpack `archive_path` under `cache_root/<hash>/`, skipping extraction if
/// an identical archive (by content hash) was already unpacked there.
pub fn ingest(archive_path: &Path, cache_root: &Path) -> Result<IngestedTarball, TarballError> {
    let bytes =
        std::fs::read(archive_path).map_err(|source| TarballError::Io { path: archive_path.to_path_buf(), source })?;
    if bytes.is_empty() {
        return Err(TarballError::EmptyArchive(archive_path.to_path_buf()));
    }

    let dest = cache_root.join(content_hash(&bytes));
    if !dest.exists() {
        unpack(&bytes, &dest, archive_path)?;
    }

    let top_level = top_level_dir(&dest)?;
    let description_path = top_level.join("DESCRIPTION");
    let body = std::fs::read_to_string(&description_path)
        .map_err(|_| TarballError::MissingDescription(top_level.clone()))?;
    let mut desc =
        pkgr_desc::parse_description(&body).map_err(|source| TarballError::Desc { path: description_path, source })?;
    let name = desc.name.clone();
    desc.repo_origin = None;

    Ok(IngestedTarball { name, dir: top_level, desc })
}

/// First 8 bytes (16 hex chars) of the MD5 of the archive's full contents.
fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Md5::new();
    hasher.update(bytes);
    hex::encode(&hasher.finalize()[..8])
}

fn unpack(bytes: &[u8], dest: &Path, source_path: &Path) -> Result<(), TarballError> {
    std::fs::create_dir_all(dest).map_err(|source| TarballError::Io { path: dest.to_path_buf(), source })?;
    let decoder = flate2::read::GzDecoder::new(bytes);
    let mut archive = tar::Archive::new(decoder);
    archive
        .unpack(dest)
        .map_err(|source| TarballError::Corrupt { path: source_path.to_path_buf(), source })
}

/// The alphabetically-first top-level directory entry, which R source
/// tarballs always extract into exactly one of.
fn top_level_dir(dest: &Path) -> Result<PathBuf, TarballError> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dest)
        .map_err(|source| TarballError::Io { path: dest.to_path_buf(), source })?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    entries.sort();
    entries.into_iter().next().ok_or_else(|| TarballError::EmptyArchive(dest.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn make_tarball(dir: &Path, pkg_name: &str) -> PathBuf {
        let archive_path = dir.join("pkg.tar.gz");
        let file = std::fs::File::create(&archive_path).unwrap();
        let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        let mut builder = tar::Builder::new(encoder);

        let description = format!("Package: {pkg_name}\nVersion: 1.0.0\nDepends: R (>= 3.5.0)\n");
        let mut header = tar::Header::new_gnu();
        header.set_size(description.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, format!("{pkg_name}/DESCRIPTION"), description.as_bytes()).unwrap();
        builder.into_inner().unwrap().finish().unwrap();
        archive_path
    }

    #[test]
    fn ingests_a_well_formed_tarball() {
        let src_dir = tempfile::tempdir().unwrap();
        let cache_dir = tempfile::tempdir().unwrap();
        let archive = make_tarball(src_dir.path(), "mypkg");

        let ingested = ingest(&archive, cache_dir.path()).unwrap();
        assert_eq!(ingested.name, "mypkg");
        assert_eq!(ingested.desc.version, "1.0.0");
        assert!(ingested.dir.ends_with("mypkg"));
    }

    #[test]
    fn empty_archive_is_fatal() {
        let src_dir = tempfile::tempdir().unwrap();
        let cache_dir = tempfile::tempdir().unwrap();
        let archive_path = src_dir.path().join("empty.tar.gz");
        std::fs::File::create(&archive_path).unwrap().write_all(b"").unwrap();

        let result = ingest(&archive_path, cache_dir.path());
        assert!(matches!(result, Err(TarballError::EmptyArchive(_))));
    }

    #[test]
    fn corrupt_gzip_is_fatal() {
        let src_dir = tempfile::tempdir().unwrap();
        let cache_dir = tempfile::tempdir().unwrap();
        let archive_path = src_dir.path().join("corrupt.tar.gz");
        std::fs::File::create(&archive_path).unwrap().write_all(b"not a gzip file").unwrap();

        let result = ingest(&archive_path, cache_dir.path());
        assert!(matches!(result, Err(TarballError::Corrupt { .. })));
    }

    #[test]
    fn identical_archive_is_not_reunpacked() {
        let src_dir = tempfile::tempdir().unwrap();
        let cache_dir = tempfile::tempdir().unwrap();
        let archive = make_tarball(src_dir.path(), "mypkg");

        let first = ingest(&archive, cache_dir.path()).unwrap();
        // Tamper with the unpacked DESCRIPTION to prove a second ingest of
        // the same bytes does not re-extract over it.
        std::fs::write(first.dir.join("DESCRIPTION"), "Package: mypkg\nVersion: 9.9.9\n").unwrap();

        let second = ingest(&archive, cache_dir.path()).unwrap();
        assert_eq!(second.desc.version, "9.9.9");
    }
}

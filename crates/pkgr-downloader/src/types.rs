//! Cache-path resolution for a download job.

use pkgr_core::HostOs;
use pkgr_repo::SourceType;
use pkgr_resolver::PkgDl;
use std::path::{Path, PathBuf};

/// One artifact fetch: the package selected by resolution plus the
/// on-disk destination it must land at.
#[derive(Debug, Clone)]
pub struct DownloadJob {
    pub name: String,
    pub url: String,
    pub dest: PathBuf,
    pub expected_md5: Option<String>,
}

/// The outcome of a completed download run: every job's final artifact
/// path, keyed by package name.
pub type DownloadedArtifacts = pkgr_core::AHashMap<String, PathBuf>;

/// Build the cache destination `<cacheDir>/<repoName>/<sourceType>/<name>_<version>.<ext>`
/// for one selected package.
#[must_use]
pub fn job_for(pkg: &PkgDl, cache_dir: &Path) -> DownloadJob {
    let ext = match pkg.source_type {
        SourceType::Source => "tar.gz",
        SourceType::Binary => HostOs::current().binary_extension(),
    };
    let filename = format!("{}_{}.{ext}", pkg.desc.name, pkg.desc.version);
    let dest = cache_dir.join(&pkg.repo.name).join(pkg.source_type.tag()).join(filename);
    let url = artifact_url(pkg);

    DownloadJob { name: pkg.desc.name.clone(), url, dest, expected_md5: None }
}

fn artifact_url(pkg: &PkgDl) -> String {
    let base = pkg.repo.url.trim_end_matches('/');
    let segment = match pkg.source_type {
        SourceType::Source => "src/contrib".to_string(),
        SourceType::Binary => {
            let os = HostOs::current();
            let platform_segment = os.binary_url_segment().unwrap_or("unknown");
            format!("bin/{platform_segment}/contrib")
        }
    };
    let ext = match pkg.source_type {
        SourceType::Source => "tar.gz",
        SourceType::Binary => HostOs::current().binary_extension(),
    };
    format!("{base}/{segment}/{}_{}.{ext}", pkg.desc.name, pkg.desc.version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pkgr_desc::PackageDesc;
    use pkgr_repo::RepoUrl;
    use std::path::PathBuf;

    fn pkg_dl(source_type: SourceType) -> PkgDl {
        PkgDl {
            desc: PackageDesc {
                name: "dplyr".to_string(),
                version: "1.1.4".to_string(),
                depends: Vec::new(),
                imports: Vec::new(),
                suggests: Vec::new(),
                linking_to: Vec::new(),
                repo_origin: None,
            },
            repo: RepoUrl { name: "cran".to_string(), url: "https://cran.r-project.org".to_string() },
            source_type,
            cache_path: None,
        }
    }

    #[test]
    fn source_destination_uses_tar_gz() {
        let job = job_for(&pkg_dl(SourceType::Source), &PathBuf::from("/cache"));
        assert_eq!(job.dest, PathBuf::from("/cache/cran/source/dplyr_1.1.4.tar.gz"));
        assert!(job.url.ends_with("/src/contrib/dplyr_1.1.4.tar.gz"));
    }

    #[test]
    fn destination_path_is_stable_regardless_of_trailing_slash() {
        let mut pkg = pkg_dl(SourceType::Source);
        pkg.repo.url.push('/');
        let job = job_for(&pkg, &PathBuf::from("/cache"));
        assert!(job.url.ends_with("/src/contrib/dplyr_1.1.4.tar.gz"));
        assert!(!job.url.contains("//src"));
    }
}

//! `InstallArgs` maps onto the flags `R CMD INSTALL` accepts.

/// Flags forwarded to `<RPath> CMD INSTALL`.
#[derive(Debug, Clone, Default)]
pub struct InstallArgs {
    pub clean: bool,
    pub preclean: bool,
    pub no_configure: bool,
    pub build: bool,
    pub install_tests: bool,
    pub no_multiarch: bool,
    pub with_keep_source: bool,
    pub byte_compile: bool,
    pub no_test_load: bool,
    pub no_clean_on_error: bool,
    pub library: String,
}

impl InstallArgs {
    /// Render to the flag list passed to the installer child process.
    #[must_use]
    pub fn to_flags(&self) -> Vec<String> {
        let mut flags = Vec::new();
        if self.clean {
            flags.push("--clean".to_string());
        }
        if self.preclean {
            flags.push("--preclean".to_string());
        }
        if self.no_configure {
            flags.push("--no-configure".to_string());
        }
        if self.build {
            flags.push("--build".to_string());
        }
        if self.install_tests {
            flags.push("--install-tests".to_string());
        }
        if self.no_multiarch {
            flags.push("--no-multiarch".to_string());
        }
        if self.with_keep_source {
            flags.push("--with-keep.source".to_string());
        }
        if self.byte_compile {
            flags.push("--byte-compile".to_string());
        }
        if self.no_test_load {
            flags.push("--no-test-load".to_string());
        }
        if self.no_clean_on_error {
            flags.push("--no-clean-on-error".to_string());
        }
        if !self.library.is_empty() {
            flags.push(format!("--library={}", self.library));
        }
        flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_boolean_and_string_flags() {
        let args = InstallArgs {
            clean: true,
            byte_compile: true,
            library: "/opt/lib".to_string(),
            ..Default::default()
        };
        let flags = args.to_flags();
        assert_eq!(flags, vec!["--clean", "--byte-compile", "--library=/opt/lib"]);
    }

    #[test]
    fn empty_args_render_no_flags() {
        assert!(InstallArgs::default().to_flags().is_empty());
    }
}

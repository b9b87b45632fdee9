//! Pack an application directory

use anyhow::{bail, Result};
use batis_apps::{pack_tarball, PackOptions, UnpackedDirVerifier};

use super::report_problems;
use crate::cli::PackArgs;
use crate::output;

pub fn run(args: PackArgs) -> Result<()> {
    if !args.directory.is_dir() {
        bail!("Not a directory: {}", args.directory.display());
    }

    let problems = problems_before_packing(&args);
    if !problems.is_empty() {
        report_problems(&problems, &args.directory.display().to_string());
    }

    let options = PackOptions {
        output: args.output,
        name: args.name,
        install_script: !args.no_install_script,
    };
    let tarball = pack_tarball(&args.directory, &options)?;
    output::success(&format!("Created {}", tarball.display()));
    Ok(())
}

/// Problems that stop packing; none when `--no-verify` is given
fn problems_before_packing(args: &PackArgs) -> Vec<String> {
    if args.no_verify {
        return Vec::new();
    }
    output::info(&format!("Verifying {}", args.directory.display()));
    UnpackedDirVerifier::new(&args.directory).verify()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn args(directory: &Path, no_verify: bool) -> PackArgs {
        PackArgs {
            directory: directory.to_path_buf(),
            name: None,
            output: None,
            no_verify,
            no_install_script: false,
        }
    }

    #[test]
    fn test_broken_directory_is_refused() {
        let temp = TempDir::new().unwrap();
        let problems = problems_before_packing(&args(temp.path(), false));
        assert!(!problems.is_empty());
        assert_eq!(problems[0], "No batis_info subdirectory");
    }

    #[test]
    fn test_no_verify_skips_checks() {
        let temp = TempDir::new().unwrap();
        assert!(problems_before_packing(&args(temp.path(), true)).is_empty());
    }

    #[test]
    fn test_valid_directory_packs() {
        let temp = TempDir::new().unwrap();
        let app = temp.path().join("viewer");
        fs::create_dir_all(app.join("batis_info")).unwrap();
        fs::write(
            app.join("batis_info/metadata.json"),
            r#"{"name": "Viewer", "byline": "Looks at things"}"#,
        )
        .unwrap();

        assert!(problems_before_packing(&args(&app, false)).is_empty());

        let mut args = args(&app, false);
        args.output = Some(temp.path().join("viewer.app.tar.gz"));
        run(args).unwrap();
        assert!(temp.path().join("viewer.app.tar.gz").is_file());
    }
}

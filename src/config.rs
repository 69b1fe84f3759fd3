/*!
 * Configuration handling for wixgen
 */

use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser};
use tracing::warn;

use crate::ensure;
use crate::error::Result;
use crate::path::slash_join;
use crate::report::ReportFormat;
use crate::types::ProductInfo;
use crate::walker::WalkOrder;

/// License text the WiX UI expects next to the generated document
pub const LICENSE_FILE: &str = "License.rtf";

/// Command-line arguments for wixgen
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "wixgen",
    version = env!("CARGO_PKG_VERSION"),
    about = "Generate a WiX installer description from a build directory",
    long_about = "Walks a build output directory and writes a WiX source file whose directory structure mirrors it, turning every file into a component with a fresh GUID."
)]
pub struct Args {
    /// Build directory to package
    #[clap(default_value = "./build")]
    pub build_dir: String,

    /// Installer directory holding License.rtf and the app icon
    #[clap(default_value = "./installer")]
    pub installer_dir: String,

    /// Output file (default: <INSTALLER_DIR>/<APP_NAME>_<APP_VERSION>_installer.wxs)
    #[clap(long, short)]
    pub output: Option<String>,

    /// Application name
    #[clap(long, default_value = "app_name")]
    pub app_name: String,

    /// Application version
    #[clap(long, default_value = "0.0.42")]
    pub app_version: String,

    /// Manufacturer name
    #[clap(long, default_value = "Acme Corporation")]
    pub manufacturer: String,

    /// Primary executable inside the build directory (default: <APP_NAME>.exe)
    #[clap(long)]
    pub main_executable: Option<String>,

    /// Product code
    #[clap(long, default_value = "D74B625D-BD2B-48E8-9095-498A1B4755B4")]
    pub product_id: String,

    /// Upgrade code, keep it stable across versions
    #[clap(long, default_value = "292360CB-7605-4567-9FA0-99490FA71BC0")]
    pub upgrade_code: String,

    /// GUID of the primary executable component
    #[clap(long, default_value = "8D469269-11D2-4945-8BF1-AE2AF5047C35")]
    pub main_component_guid: String,

    /// GUID of the program menu component
    #[clap(long, default_value = "2A4E1D9D-26AF-4938-9126-774756326C90")]
    pub menu_component_guid: String,

    /// Comma-separated list of patterns to ignore
    #[clap(long, value_delimiter = ',')]
    pub ignore_patterns: Vec<String>,

    /// Do not skip OS metadata files such as Thumbs.db or .DS_Store
    #[clap(long)]
    pub no_default_ignore: bool,

    /// Order in which sibling directories and files are listed
    #[clap(long, value_enum, default_value_t = WalkOrder::default())]
    pub order: WalkOrder,

    /// Descend into symlinked directories
    #[clap(long)]
    pub follow_links: bool,

    /// Summary printed after generation
    #[clap(long, value_enum, default_value_t = ReportFormat::default())]
    pub report: ReportFormat,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[clap(long, short, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Build directory to package
    pub build_dir: PathBuf,

    /// Directory holding the license and icon resources
    pub installer_dir: PathBuf,

    /// Output WiX file path
    pub output_file: PathBuf,

    /// Product identity for the document preamble
    pub product: ProductInfo,

    /// Patterns to ignore
    pub ignore_patterns: Vec<String>,

    /// Whether the built-in ignore list applies
    pub default_ignore: bool,

    /// Sibling ordering during the walk
    pub order: WalkOrder,

    /// Whether symlinked directories are descended into
    pub follow_links: bool,

    /// Report format
    pub report: ReportFormat,

    /// Log verbosity
    pub verbose: u8,
}

impl Config {
    /// Create configuration from command-line arguments
    pub fn from_args(args: Args) -> Self {
        let output_file = match args.output {
            Some(output) => PathBuf::from(output),
            None => {
                let file_name = format!("{}_{}_installer.wxs", args.app_name, args.app_version);
                PathBuf::from(slash_join([args.installer_dir.as_str(), file_name.as_str()]))
            }
        };
        let main_executable = args
            .main_executable
            .unwrap_or_else(|| format!("{}.exe", args.app_name));

        Self {
            build_dir: PathBuf::from(&args.build_dir),
            installer_dir: PathBuf::from(&args.installer_dir),
            output_file,
            product: ProductInfo {
                app_name: args.app_name,
                app_version: args.app_version,
                manufacturer: args.manufacturer,
                product_id: args.product_id,
                upgrade_code: args.upgrade_code,
                main_component_guid: args.main_component_guid,
                menu_component_guid: args.menu_component_guid,
                main_executable,
                build_dir: slash_join([args.build_dir.as_str()]),
            },
            ignore_patterns: args.ignore_patterns,
            default_ignore: !args.no_default_ignore,
            order: args.order,
            follow_links: args.follow_links,
            report: args.report,
            verbose: args.verbose,
        }
    }

    /// Validate the configuration
    ///
    /// Missing resources that only the WiX toolset reads are reported as
    /// warnings.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.build_dir.is_dir(),
            PathNotFound,
            "Build directory not found: {}",
            self.build_dir.display()
        );

        if let Some(parent) = self.output_file.parent() {
            ensure!(
                parent == Path::new("") || parent.is_dir(),
                PathNotFound,
                "Output directory not found: {}",
                parent.display()
            );
        }

        ensure!(
            !self.product.app_name.trim().is_empty(),
            Config,
            "Application name must not be empty"
        );
        ensure!(
            !self.product.app_version.trim().is_empty(),
            Config,
            "Application version must not be empty"
        );

        let main_executable = self.build_dir.join(&self.product.main_executable);
        if !main_executable.is_file() {
            warn!(path = %main_executable.display(), "primary executable not found");
        }
        for resource in [LICENSE_FILE.to_string(), self.product.icon_name()] {
            let path = self.installer_dir.join(&resource);
            if !path.is_file() {
                warn!(path = %path.display(), "installer resource not found");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn parse(args: &[&str]) -> Config {
        let argv = std::iter::once("wixgen").chain(args.iter().copied());
        Config::from_args(Args::parse_from(argv))
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[]);

        assert_eq!(
            config.output_file,
            PathBuf::from("./installer/app_name_0.0.42_installer.wxs")
        );
        assert_eq!(config.product.main_executable, "app_name.exe");
        assert_eq!(config.product.build_dir, "./build");
        assert_eq!(config.product.full_name(), "app_name 0.0.42");
        assert_eq!(config.order, WalkOrder::Sorted);
        assert!(config.default_ignore);
        assert_eq!(config.report, ReportFormat::Table);
    }

    #[test]
    fn test_explicit_arguments() {
        let config = parse(&[
            "out\\bin",
            "pkg",
            "--app-name",
            "viewer",
            "--app-version",
            "2.1",
            "--ignore-patterns",
            "*.pdb,*.ilk",
            "--order",
            "native",
            "--no-default-ignore",
            "-vv",
        ]);

        assert_eq!(config.output_file, PathBuf::from("pkg/viewer_2.1_installer.wxs"));
        assert_eq!(config.product.main_executable, "viewer.exe");
        assert_eq!(config.product.build_dir, "out/bin");
        assert_eq!(config.ignore_patterns, ["*.pdb", "*.ilk"]);
        assert_eq!(config.order, WalkOrder::Native);
        assert!(!config.default_ignore);
        assert_eq!(config.verbose, 2);
    }

    #[test]
    fn test_validate() {
        let temp = tempdir().unwrap();
        let build = temp.path().join("build");
        fs::create_dir(&build).unwrap();

        let mut config = parse(&[]);
        config.build_dir = build;
        config.output_file = temp.path().join("app.wxs");
        assert!(config.validate().is_ok());

        config.output_file = temp.path().join("missing").join("app.wxs");
        assert!(config.validate().is_err());

        config.output_file = temp.path().join("app.wxs");
        config.product.app_version = " ".to_string();
        assert!(config.validate().is_err());

        config.product.app_version = "1.0".to_string();
        config.build_dir = temp.path().join("nope");
        assert!(config.validate().is_err());
    }
}

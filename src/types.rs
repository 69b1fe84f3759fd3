/*!
 * Core types and data structures for wixgen
 */

use crate::path::NormalizedPath;

/// One directory of the build tree together with the files directly inside it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryVisit {
    /// Full path of the directory, root included
    pub path: NormalizedPath,
    /// Names of regular files directly inside the directory
    pub files: Vec<String>,
}

impl DirectoryVisit {
    /// Create a visit from a path and its file names
    pub fn new(path: impl Into<NormalizedPath>, files: Vec<String>) -> Self {
        Self {
            path: path.into(),
            files,
        }
    }
}

/// A nested `Directory` element that is currently open in the output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerFrame {
    /// Running discriminator, 1 for the first container of a run
    pub index: u64,
    /// Identifier written to the `Id` attribute
    pub id: String,
    /// Directory name written to the `Name` attribute
    pub name: String,
    /// Nesting depth of the element in the document
    pub depth: usize,
}

/// One file turned into an installable component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafRecord {
    /// Component identifier, also used as the file identifier
    pub component_id: String,
    /// Freshly generated component GUID
    pub instance_token: String,
    /// Source path of the file as referenced by the installer
    pub source: String,
}

/// Product identity written into the document preamble
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductInfo {
    /// Application name
    pub app_name: String,
    /// Application version
    pub app_version: String,
    /// Manufacturer name, also the name of the program files subfolder
    pub manufacturer: String,
    /// Fixed product code
    pub product_id: String,
    /// Fixed upgrade code
    pub upgrade_code: String,
    /// GUID of the primary executable component
    pub main_component_guid: String,
    /// GUID of the program menu component
    pub menu_component_guid: String,
    /// File name of the primary executable inside the build root
    pub main_executable: String,
    /// Build directory as referenced by `$(var.BuildDir)`
    pub build_dir: String,
}

impl ProductInfo {
    /// Name shown to users, e.g. `app_name 0.0.42`
    pub fn full_name(&self) -> String {
        format!("{} {}", self.app_name, self.app_version)
    }

    /// Icon resource expected next to the generated document
    pub fn icon_name(&self) -> String {
        format!("{}.ico", self.app_name)
    }
}

/*!
 * WiX document writer
 *
 * The preamble and postamble are fixed template text with the product
 * identity filled in. Between them the writer acts as the markup sink for the
 * reconciler, so directories and components are written as the walk goes.
 */

use std::io::Write;

use quick_xml::events::{BytesDecl, BytesEnd, BytesPI, BytesStart, Event};
use quick_xml::Writer;

use crate::config::LICENSE_FILE;
use crate::error::Result;
use crate::reconciler::MarkupSink;
use crate::types::{ContainerFrame, LeafRecord, ProductInfo};

/// Component pre-registered for the primary executable
pub const MAIN_COMPONENT_ID: &str = "MainExecutable";

/// Component owning the program menu folder
pub const MENU_COMPONENT_ID: &str = "ProgramMenuDir";

/// Directory the build root is installed into
pub const ROOT_CONTAINER_ID: &str = "INSTALLDIR";

/// Depth of the root container element: Wix, Product, TARGETDIR,
/// ProgramFilesFolder and the manufacturer folder enclose it
pub const ROOT_DEPTH: usize = 5;

const WIX_NAMESPACE: &str = "http://schemas.microsoft.com/wix/2006/wi";
const FULL_NAME_VAR: &str = "$(var.FullAppName)";

/// Turn arbitrary text into a valid WiX identifier
///
/// Identifiers may only hold ASCII letters, digits, underscores and periods,
/// and must not start with a digit or period.
pub fn wix_id(text: &str) -> String {
    let mut id: String = text
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if !id.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') {
        id.insert(0, '_');
    }
    id
}

/// Ordered component references for the feature section
///
/// The primary executable comes first, then every traversed component, then
/// the program menu component.
pub fn manifest_entries(ledger: &[String]) -> Vec<String> {
    let mut entries = Vec::with_capacity(ledger.len() + 2);
    entries.push(MAIN_COMPONENT_ID.to_string());
    entries.extend(ledger.iter().cloned());
    entries.push(MENU_COMPONENT_ID.to_string());
    entries
}

/// Writer for a WiX installer source document
pub struct WixWriter<W: Write> {
    writer: Writer<W>,
    product: ProductInfo,
}

impl<W: Write> WixWriter<W> {
    /// Create a new WiX writer indenting with four spaces
    pub fn new(inner: W, product: ProductInfo) -> Self {
        Self {
            writer: Writer::new_with_indent(inner, b' ', 4),
            product,
        }
    }

    /// The container the preamble leaves open for the build root
    pub fn root_frame(&self) -> ContainerFrame {
        ContainerFrame {
            index: 0,
            id: ROOT_CONTAINER_ID.to_string(),
            name: FULL_NAME_VAR.to_string(),
            depth: ROOT_DEPTH,
        }
    }

    /// Write everything up to and including the primary executable component
    pub fn write_preamble(&mut self) -> Result<()> {
        let product = self.product.clone();
        let app_name = product.app_name.as_str();
        let icon = product.icon_name();

        self.writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        self.start("Wix", &[("xmlns", WIX_NAMESPACE)])?;

        self.define("AppName", app_name)?;
        self.define("AppVersion", &product.app_version)?;
        self.define("FullAppName", "$(var.AppName) $(var.AppVersion)")?;
        self.define("BuildDir", &product.build_dir)?;

        self.start(
            "Product",
            &[
                ("Name", FULL_NAME_VAR),
                ("Manufacturer", &product.manufacturer),
                ("Id", &product.product_id),
                ("UpgradeCode", &product.upgrade_code),
                ("Language", "1033"),
                ("Codepage", "1252"),
                ("Version", "$(var.AppVersion)"),
            ],
        )?;
        let comments = format!(
            "comment like \"{} is a registered trademark of {}\"",
            app_name, product.manufacturer
        );
        self.empty(
            "Package",
            &[
                ("Id", "*"),
                ("Keywords", "Installer"),
                ("Description", "$(var.FullAppName) Installer"),
                ("Comments", &comments),
                ("Manufacturer", &product.manufacturer),
                ("InstallerVersion", "100"),
                ("Languages", "1033"),
                ("Compressed", "yes"),
                ("SummaryCodepage", "1252"),
            ],
        )?;
        let cabinet = format!("{}.cab", wix_id(app_name));
        self.empty(
            "Media",
            &[("Id", "1"), ("Cabinet", &cabinet), ("EmbedCab", "yes")],
        )?;
        self.empty(
            "Property",
            &[("Id", "WIXUI_INSTALLDIR"), ("Value", ROOT_CONTAINER_ID)],
        )?;
        self.empty("UIRef", &[("Id", "WixUI_InstallDir")])?;
        self.empty("UIRef", &[("Id", "WixUI_ErrorProgressText")])?;
        self.empty(
            "WixVariable",
            &[("Id", "WixUILicenseRtf"), ("Value", LICENSE_FILE)],
        )?;

        self.start("Directory", &[("Id", "TARGETDIR"), ("Name", "SourceDir")])?;
        self.start("Directory", &[("Id", "ProgramFilesFolder")])?;
        self.start(
            "Directory",
            &[
                ("Id", &wix_id(&product.manufacturer)),
                ("Name", &product.manufacturer),
            ],
        )?;
        self.start(
            "Directory",
            &[("Id", ROOT_CONTAINER_ID), ("Name", FULL_NAME_VAR)],
        )?;

        self.start(
            "Component",
            &[
                ("Id", MAIN_COMPONENT_ID),
                ("Guid", &product.main_component_guid),
            ],
        )?;
        let main_source = format!("$(var.BuildDir)/{}", product.main_executable);
        self.start(
            "File",
            &[
                ("Id", &wix_id(&product.main_executable)),
                ("Source", &main_source),
                ("KeyPath", "yes"),
            ],
        )?;
        for (prefix, folder) in [("startmenu", "ProgramMenuDir"), ("desktop", "DesktopFolder")] {
            let id = wix_id(&format!("{}_{}", prefix, app_name));
            self.empty(
                "Shortcut",
                &[
                    ("Id", &id),
                    ("Directory", folder),
                    ("Name", FULL_NAME_VAR),
                    ("WorkingDirectory", ROOT_CONTAINER_ID),
                    ("Icon", &icon),
                    ("IconIndex", "0"),
                    ("Advertise", "yes"),
                ],
            )?;
        }
        self.end("File")?;
        self.end("Component")?;

        Ok(())
    }

    /// Write the remaining skeleton and the feature listing `ledger`
    ///
    /// Expects the root container to be closed already.
    pub fn write_postamble(&mut self, ledger: &[String]) -> Result<()> {
        let product = self.product.clone();
        let icon = product.icon_name();

        // manufacturer folder, ProgramFilesFolder
        self.end("Directory")?;
        self.end("Directory")?;

        self.start(
            "Directory",
            &[("Id", "ProgramMenuFolder"), ("Name", "Programs")],
        )?;
        self.start(
            "Directory",
            &[("Id", MENU_COMPONENT_ID), ("Name", FULL_NAME_VAR)],
        )?;
        self.start(
            "Component",
            &[
                ("Id", MENU_COMPONENT_ID),
                ("Guid", &product.menu_component_guid),
            ],
        )?;
        self.empty(
            "RemoveFolder",
            &[("Id", MENU_COMPONENT_ID), ("On", "uninstall")],
        )?;
        self.empty(
            "RegistryValue",
            &[
                ("Root", "HKCU"),
                ("Key", "Software\\[Manufacturer]\\[ProductName]"),
                ("Type", "string"),
                ("Value", ""),
                ("KeyPath", "yes"),
            ],
        )?;
        self.end("Component")?;
        self.end("Directory")?;
        self.end("Directory")?;
        self.empty(
            "Directory",
            &[("Id", "DesktopFolder"), ("Name", "Desktop")],
        )?;
        // TARGETDIR
        self.end("Directory")?;

        self.start(
            "Feature",
            &[
                ("Id", "Complete"),
                ("Title", FULL_NAME_VAR),
                ("Description", "The complete package."),
                ("Display", "expand"),
                ("Level", "1"),
                ("ConfigurableDirectory", ROOT_CONTAINER_ID),
            ],
        )?;
        for id in manifest_entries(ledger) {
            self.empty("ComponentRef", &[("Id", &id)])?;
        }
        self.end("Feature")?;

        self.empty("Icon", &[("Id", &icon), ("SourceFile", &icon)])?;
        self.end("Product")?;
        self.end("Wix")?;

        self.writer.get_mut().write_all(b"\n")?;
        Ok(())
    }

    /// Flush and return the underlying writer
    pub fn finish(mut self) -> Result<W> {
        self.writer.get_mut().flush()?;
        Ok(self.writer.into_inner())
    }

    fn define(&mut self, name: &str, value: &str) -> Result<()> {
        let content = format!("define {} = \"{}\"", name, value);
        self.writer.write_event(Event::PI(BytesPI::new(content)))?;
        Ok(())
    }

    fn start(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<()> {
        let tag = BytesStart::new(name).with_attributes(attributes.iter().copied());
        self.writer.write_event(Event::Start(tag))?;
        Ok(())
    }

    fn empty(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<()> {
        let tag = BytesStart::new(name).with_attributes(attributes.iter().copied());
        self.writer.write_event(Event::Empty(tag))?;
        Ok(())
    }

    fn end(&mut self, name: &str) -> Result<()> {
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }
}

impl<W: Write> MarkupSink for WixWriter<W> {
    fn open_container(&mut self, frame: &ContainerFrame) -> Result<()> {
        self.start("Directory", &[("Id", &frame.id), ("Name", &frame.name)])
    }

    fn close_container(&mut self, _frame: &ContainerFrame) -> Result<()> {
        self.end("Directory")
    }

    fn leaf(&mut self, record: &LeafRecord) -> Result<()> {
        self.start(
            "Component",
            &[
                ("Id", &record.component_id),
                ("Guid", &record.instance_token),
            ],
        )?;
        self.empty(
            "File",
            &[
                ("Id", &record.component_id),
                ("Source", &record.source),
                ("KeyPath", "yes"),
                ("Checksum", "yes"),
            ],
        )?;
        self.end("Component")
    }
}

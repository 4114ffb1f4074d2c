//! External PDF viewers: page-jump command lines, detection and launching.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::str::FromStr;

use schemars::JsonSchema;
use serde::Serialize;

use crate::config::Config;
use crate::error::{NavigatorError, Result};

/// Application name Acrobat is opened with on macOS.
const ACROBAT_MAC_APP: &str = "Adobe Acrobat Reader DC";

/// Operating system family, which decides viewer programs and detection order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    MacOs,
    Linux,
    Windows,
}

impl Platform {
    /// Platform this binary was built for. Non-mac, non-Windows targets are
    /// treated as Linux.
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::MacOs
        } else if cfg!(target_os = "windows") {
            Platform::Windows
        } else {
            Platform::Linux
        }
    }
}

/// The supported viewers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ViewerKind {
    Skim,
    Zathura,
    Evince,
    #[serde(rename = "sumatrapdf")]
    SumatraPdf,
    Acrobat,
}

impl FromStr for ViewerKind {
    type Err = NavigatorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skim" => Ok(ViewerKind::Skim),
            "zathura" => Ok(ViewerKind::Zathura),
            "evince" => Ok(ViewerKind::Evince),
            "sumatrapdf" | "sumatra" => Ok(ViewerKind::SumatraPdf),
            "acrobat" => Ok(ViewerKind::Acrobat),
            other => Err(NavigatorError::ViewerUnavailable(format!(
                "unsupported PDF reader '{}' (supported: skim, zathura, evince, sumatrapdf, acrobat)",
                other
            ))),
        }
    }
}

impl fmt::Display for ViewerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ViewerKind::Skim => "skim",
            ViewerKind::Zathura => "zathura",
            ViewerKind::Evince => "evince",
            ViewerKind::SumatraPdf => "sumatrapdf",
            ViewerKind::Acrobat => "acrobat",
        };
        f.write_str(name)
    }
}

/// How to tell whether a viewer is installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe {
    /// An executable looked up on `PATH`.
    Program(&'static str),
    /// A macOS application bundle name, without the `.app` suffix.
    AppBundle(&'static str),
}

impl ViewerKind {
    /// Auto-detection order for `platform`.
    pub fn candidates(platform: Platform) -> &'static [ViewerKind] {
        match platform {
            Platform::MacOs => &[ViewerKind::Skim, ViewerKind::Acrobat],
            Platform::Linux => &[ViewerKind::Zathura, ViewerKind::Evince, ViewerKind::Acrobat],
            Platform::Windows => &[ViewerKind::SumatraPdf, ViewerKind::Acrobat],
        }
    }

    /// Installation probe on `platform`.
    pub fn probe(self, platform: Platform) -> Probe {
        match (self, platform) {
            (ViewerKind::Skim, _) => Probe::AppBundle("Skim"),
            (ViewerKind::Zathura, _) => Probe::Program("zathura"),
            (ViewerKind::Evince, _) => Probe::Program("evince"),
            (ViewerKind::SumatraPdf, _) => Probe::Program("SumatraPDF"),
            (ViewerKind::Acrobat, Platform::MacOs) => Probe::AppBundle(ACROBAT_MAC_APP),
            (ViewerKind::Acrobat, Platform::Windows) => Probe::Program("AcroRd32.exe"),
            (ViewerKind::Acrobat, Platform::Linux) => Probe::Program("acroread"),
        }
    }

    /// Page number as the viewer expects it, from a 1-indexed `page`.
    ///
    /// Evince's `--page-index` counts from zero; the others count from one.
    pub fn page_argument(self, page: u32) -> u32 {
        match self {
            ViewerKind::Evince => page.saturating_sub(1),
            ViewerKind::Skim
            | ViewerKind::Zathura
            | ViewerKind::SumatraPdf
            | ViewerKind::Acrobat => page,
        }
    }

    /// Whether the viewer honours the page on `platform`.
    pub fn supports_page_jump(self, platform: Platform) -> bool {
        !matches!((self, platform), (ViewerKind::Acrobat, Platform::MacOs))
    }
}

/// A located viewer ready to build command lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewer {
    pub kind: ViewerKind,
    pub platform: Platform,
    /// Executable, or application name/path for macOS bundles.
    pub executable: PathBuf,
}

/// A concrete process invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct ViewerCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl Viewer {
    /// Command line opening `file` at 1-indexed `page`.
    pub fn command(&self, file: &Path, page: u32) -> ViewerCommand {
        let file = file.display().to_string();
        let executable = self.executable.display().to_string();
        let page = self.kind.page_argument(page).to_string();

        let (program, args) = match (self.kind, self.platform) {
            (ViewerKind::Skim, _) => ("open".to_string(), vec![format!("skim://{}#{}", file, page)]),
            (ViewerKind::Zathura, _) => (executable, vec!["--page".to_string(), page, file]),
            (ViewerKind::Evince, _) => (executable, vec!["--page-index".to_string(), page, file]),
            (ViewerKind::SumatraPdf, _) => (executable, vec!["-page".to_string(), page, file]),
            (ViewerKind::Acrobat, Platform::MacOs) => {
                ("open".to_string(), vec!["-a".to_string(), executable, file])
            }
            (ViewerKind::Acrobat, _) => (executable, vec![format!("/A page={}", page), file]),
        };

        ViewerCommand { program, args }
    }
}

/// Locates and starts viewer processes.
pub trait Launcher: Send + Sync {
    /// Where `probe` is installed, if anywhere.
    fn locate(&self, probe: &Probe) -> Option<PathBuf>;

    /// Start `command` without waiting for it to finish.
    fn spawn(&self, command: &ViewerCommand) -> Result<()>;
}

/// [`Launcher`] backed by the real system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLauncher;

impl Launcher for SystemLauncher {
    fn locate(&self, probe: &Probe) -> Option<PathBuf> {
        match probe {
            Probe::Program(program) => which::which(program).ok(),
            Probe::AppBundle(name) => {
                let bundle = format!("{}.app", name);
                let mut roots = vec![PathBuf::from("/Applications")];
                if let Some(home) = dirs::home_dir() {
                    roots.push(home.join("Applications"));
                }
                roots
                    .into_iter()
                    .map(|root| root.join(&bundle))
                    .find(|path| path.exists())
            }
        }
    }

    fn spawn(&self, command: &ViewerCommand) -> Result<()> {
        // stdout carries the MCP transport, so the child must not inherit it.
        let mut child = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| NavigatorError::ViewerLaunchFailed {
                viewer: command.program.clone(),
                reason: e.to_string(),
            })?;

        let program = command.program.clone();
        std::thread::spawn(move || match child.wait() {
            Ok(status) if !status.success() => {
                tracing::warn!(program = %program, %status, "Viewer exited with failure")
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(program = %program, error = %e, "Failed to wait for viewer"),
        });

        Ok(())
    }
}

/// Picks the viewer from the configuration, or detects one.
#[derive(Debug, Clone)]
pub struct ViewerResolver {
    platform: Platform,
    pdf_reader: Option<String>,
    reader_path: Option<PathBuf>,
}

impl ViewerResolver {
    pub fn new(config: &Config, platform: Platform) -> Self {
        Self {
            platform,
            pdf_reader: config.pdf_reader.clone(),
            reader_path: config.reader_path.clone(),
        }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Resolve the viewer to use.
    ///
    /// A configured `pdf_reader` is used as-is and fails if unknown or not
    /// installed; without one, the platform candidates are tried in order.
    pub fn resolve(&self, launcher: &dyn Launcher) -> Result<Viewer> {
        match &self.pdf_reader {
            Some(name) => {
                let kind: ViewerKind = name.parse()?;
                self.locate(kind, launcher).ok_or_else(|| {
                    NavigatorError::ViewerUnavailable(format!(
                        "configured reader '{}' could not be found",
                        kind
                    ))
                })
            }
            None => ViewerKind::candidates(self.platform)
                .iter()
                .find_map(|&kind| self.locate(kind, launcher))
                .ok_or_else(|| {
                    NavigatorError::ViewerUnavailable(
                        "no supported PDF reader found; set pdf_reader in the config file"
                            .to_string(),
                    )
                }),
        }
    }

    fn locate(&self, kind: ViewerKind, launcher: &dyn Launcher) -> Option<Viewer> {
        let executable = match (&self.reader_path, kind, self.platform) {
            // Skim is driven through its URL scheme.
            (_, ViewerKind::Skim, _) => launcher.locate(&kind.probe(self.platform))?,
            // Acrobat on macOS is addressed by application name.
            (Some(app), ViewerKind::Acrobat, Platform::MacOs) => app.clone(),
            (None, ViewerKind::Acrobat, Platform::MacOs) => {
                launcher.locate(&kind.probe(self.platform))?;
                PathBuf::from(ACROBAT_MAC_APP)
            }
            // Absolute paths and bare names on PATH are both accepted.
            (Some(path), _, _) => match which::which(path) {
                Ok(found) => found,
                Err(e) => {
                    tracing::debug!(path = %path.display(), viewer = %kind, error = %e, "reader_path not found");
                    return None;
                }
            },
            (None, _, _) => launcher.locate(&kind.probe(self.platform))?,
        };

        Some(Viewer {
            kind,
            platform: self.platform,
            executable,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Launcher that finds only the listed probes and never spawns.
    struct FakeLauncher(Vec<Probe>);

    impl Launcher for FakeLauncher {
        fn locate(&self, probe: &Probe) -> Option<PathBuf> {
            self.0.contains(probe).then(|| match probe {
                Probe::Program(p) => PathBuf::from("/usr/bin").join(p),
                Probe::AppBundle(a) => PathBuf::from("/Applications").join(format!("{}.app", a)),
            })
        }

        fn spawn(&self, _command: &ViewerCommand) -> Result<()> {
            Ok(())
        }
    }

    fn viewer(kind: ViewerKind, platform: Platform, executable: &str) -> Viewer {
        Viewer {
            kind,
            platform,
            executable: PathBuf::from(executable),
        }
    }

    fn config(reader: Option<&str>, path: Option<&str>) -> Config {
        Config {
            pdf_reader: reader.map(String::from),
            reader_path: path.map(PathBuf::from),
            ..Config::default()
        }
    }

    #[test]
    fn test_skim_uses_url_scheme_with_one_indexed_page() {
        let cmd = viewer(ViewerKind::Skim, Platform::MacOs, "/Applications/Skim.app")
            .command(Path::new("/docs/a.pdf"), 5);
        assert_eq!(cmd.program, "open");
        assert_eq!(cmd.args, vec!["skim:///docs/a.pdf#5"]);
    }

    #[test]
    fn test_zathura_receives_page_unchanged() {
        let cmd = viewer(ViewerKind::Zathura, Platform::Linux, "/usr/bin/zathura")
            .command(Path::new("/docs/a.pdf"), 5);
        assert_eq!(cmd.program, "/usr/bin/zathura");
        assert_eq!(cmd.args, vec!["--page", "5", "/docs/a.pdf"]);
    }

    #[test]
    fn test_evince_receives_zero_indexed_page() {
        let cmd = viewer(ViewerKind::Evince, Platform::Linux, "/usr/bin/evince")
            .command(Path::new("/docs/a.pdf"), 5);
        assert_eq!(cmd.args, vec!["--page-index", "4", "/docs/a.pdf"]);

        let first = viewer(ViewerKind::Evince, Platform::Linux, "evince")
            .command(Path::new("/docs/a.pdf"), 1);
        assert_eq!(first.args[1], "0");
    }

    #[test]
    fn test_sumatra_page_flag() {
        let cmd = viewer(ViewerKind::SumatraPdf, Platform::Windows, "SumatraPDF")
            .command(Path::new("C:\\docs\\a.pdf"), 7);
        assert_eq!(cmd.program, "SumatraPDF");
        assert_eq!(cmd.args, vec!["-page", "7", "C:\\docs\\a.pdf"]);
    }

    #[test]
    fn test_acrobat_open_action() {
        let win = viewer(ViewerKind::Acrobat, Platform::Windows, "AcroRd32.exe")
            .command(Path::new("a.pdf"), 3);
        assert_eq!(win.program, "AcroRd32.exe");
        assert_eq!(win.args, vec!["/A page=3", "a.pdf"]);

        let linux = viewer(ViewerKind::Acrobat, Platform::Linux, "acroread")
            .command(Path::new("a.pdf"), 3);
        assert_eq!(linux.args, vec!["/A page=3", "a.pdf"]);
    }

    #[test]
    fn test_acrobat_on_mac_opens_by_app_name() {
        let cmd = viewer(ViewerKind::Acrobat, Platform::MacOs, ACROBAT_MAC_APP)
            .command(Path::new("/docs/a.pdf"), 3);
        assert_eq!(cmd.program, "open");
        assert_eq!(cmd.args, vec!["-a", ACROBAT_MAC_APP, "/docs/a.pdf"]);
        assert!(!ViewerKind::Acrobat.supports_page_jump(Platform::MacOs));
    }

    #[test]
    fn test_parse_viewer_names() {
        assert_eq!("Skim".parse::<ViewerKind>().unwrap(), ViewerKind::Skim);
        assert_eq!("sumatra".parse::<ViewerKind>().unwrap(), ViewerKind::SumatraPdf);
        assert_eq!("SumatraPDF".parse::<ViewerKind>().unwrap(), ViewerKind::SumatraPdf);
        let err = "okular".parse::<ViewerKind>().unwrap_err();
        assert!(matches!(err, NavigatorError::ViewerUnavailable(_)));
    }

    #[test]
    fn test_resolve_configured_viewer() {
        let resolver = ViewerResolver::new(&config(Some("evince"), None), Platform::Linux);
        let launcher = FakeLauncher(vec![Probe::Program("evince"), Probe::Program("zathura")]);
        let viewer = resolver.resolve(&launcher).unwrap();
        assert_eq!(viewer.kind, ViewerKind::Evince);
        assert_eq!(viewer.executable, PathBuf::from("/usr/bin/evince"));
    }

    #[test]
    fn test_resolve_configured_viewer_missing() {
        let resolver = ViewerResolver::new(&config(Some("zathura"), None), Platform::Linux);
        let err = resolver.resolve(&FakeLauncher(vec![])).unwrap_err();
        assert!(matches!(err, NavigatorError::ViewerUnavailable(_)));
    }

    #[test]
    fn test_resolve_unknown_viewer() {
        let resolver = ViewerResolver::new(&config(Some("okular"), None), Platform::Linux);
        let launcher = FakeLauncher(vec![Probe::Program("zathura")]);
        assert!(matches!(
            resolver.resolve(&launcher),
            Err(NavigatorError::ViewerUnavailable(_))
        ));
    }

    #[test]
    fn test_auto_detect_follows_platform_order() {
        let resolver = ViewerResolver::new(&config(None, None), Platform::Linux);
        let launcher = FakeLauncher(vec![Probe::Program("evince"), Probe::Program("acroread")]);
        assert_eq!(resolver.resolve(&launcher).unwrap().kind, ViewerKind::Evince);

        let mac = ViewerResolver::new(&config(None, None), Platform::MacOs);
        let launcher = FakeLauncher(vec![Probe::AppBundle("Skim")]);
        assert_eq!(mac.resolve(&launcher).unwrap().kind, ViewerKind::Skim);
    }

    #[test]
    fn test_auto_detect_nothing_installed() {
        let resolver = ViewerResolver::new(&config(None, None), Platform::Windows);
        assert!(matches!(
            resolver.resolve(&FakeLauncher(vec![])),
            Err(NavigatorError::ViewerUnavailable(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_reader_path_override() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let exe = dir.path().join("my-zathura");
        std::fs::write(&exe, b"#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&exe, std::fs::Permissions::from_mode(0o755)).unwrap();

        let resolver = ViewerResolver::new(
            &config(Some("zathura"), exe.to_str()),
            Platform::Linux,
        );
        let viewer = resolver.resolve(&FakeLauncher(vec![])).unwrap();
        assert_eq!(viewer.executable, exe);
        assert_eq!(viewer.command(Path::new("a.pdf"), 2).program, exe.display().to_string());
    }

    #[test]
    fn test_reader_path_override_missing() {
        let resolver = ViewerResolver::new(
            &config(Some("zathura"), Some("/nonexistent/zathura")),
            Platform::Linux,
        );
        let launcher = FakeLauncher(vec![Probe::Program("zathura")]);
        assert!(resolver.resolve(&launcher).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_reader_path_bare_name_is_looked_up_on_path() {
        let expected = which::which("sh").unwrap();
        let resolver = ViewerResolver::new(&config(Some("zathura"), Some("sh")), Platform::Linux);

        let viewer = resolver.resolve(&FakeLauncher(vec![])).unwrap();
        assert_eq!(viewer.kind, ViewerKind::Zathura);
        assert_eq!(viewer.executable, expected);
    }
}

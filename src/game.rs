use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, collections::BTreeSet, path::PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OperatingSystem {
    Unknown,
    Linux,
    Windows,
}

impl Default for OperatingSystem {
    fn default() -> Self {
        OperatingSystem::Unknown
    }
}

impl OperatingSystem {
    pub fn as_str(self) -> &'static str {
        match self {
            OperatingSystem::Unknown => "Unknown",
            OperatingSystem::Linux => "Linux",
            OperatingSystem::Windows => "Windows",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "linux" => Some(OperatingSystem::Linux),
            "windows" | "win" => Some(OperatingSystem::Windows),
            "unknown" => Some(OperatingSystem::Unknown),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Architecture {
    Unknown,
    X64,
    X86,
}

impl Default for Architecture {
    fn default() -> Self {
        Architecture::Unknown
    }
}

impl Architecture {
    pub fn as_str(self) -> &'static str {
        match self {
            Architecture::Unknown => "Unknown",
            Architecture::X64 => "X64",
            Architecture::X86 => "X86",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Architecture::Unknown => "Unknown",
            Architecture::X64 => "x64",
            Architecture::X86 => "x86",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "x64" | "x86_64" | "amd64" => Some(Architecture::X64),
            "x86" | "i386" | "i686" => Some(Architecture::X86),
            "unknown" => Some(Architecture::Unknown),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnityScriptingBackend {
    Il2Cpp,
    Mono,
    Unknown,
}

impl Default for UnityScriptingBackend {
    fn default() -> Self {
        UnityScriptingBackend::Unknown
    }
}

impl UnityScriptingBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            UnityScriptingBackend::Il2Cpp => "Il2Cpp",
            UnityScriptingBackend::Mono => "Mono",
            UnityScriptingBackend::Unknown => "Unknown",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            UnityScriptingBackend::Il2Cpp => "IL2CPP",
            UnityScriptingBackend::Mono => "Mono",
            UnityScriptingBackend::Unknown => "Unknown",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "il2cpp" => Some(UnityScriptingBackend::Il2Cpp),
            "mono" => Some(UnityScriptingBackend::Mono),
            "unknown" => Some(UnityScriptingBackend::Unknown),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameEngineBrand {
    Unity,
    Unreal,
    Godot,
}

impl GameEngineBrand {
    pub fn as_str(self) -> &'static str {
        match self {
            GameEngineBrand::Unity => "Unity",
            GameEngineBrand::Unreal => "Unreal",
            GameEngineBrand::Godot => "Godot",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameEngineVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    #[serde(default)]
    pub suffix: Option<String>,
    pub display: String,
}

impl GameEngineVersion {
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
            suffix: None,
            display: format!("{major}.{minor}.{patch}"),
        }
    }

    /// Numeric comparison on major, minor, patch. Suffix and display text are ignored.
    pub fn cmp_numeric(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
            .then(self.patch.cmp(&other.patch))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameEngine {
    pub brand: GameEngineBrand,
    #[serde(default)]
    pub version: Option<GameEngineVersion>,
}

impl GameEngine {
    pub fn label(&self) -> String {
        match &self.version {
            Some(version) => format!("{} {}", self.brand.as_str(), version.display),
            None => self.brand.as_str().to_string(),
        }
    }
}

/// A game found on disk by the scanner backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub discriminator: Option<String>,
    #[serde(default)]
    pub full_path: PathBuf,
    #[serde(default)]
    pub architecture: Architecture,
    #[serde(default)]
    pub scripting_backend: UnityScriptingBackend,
    #[serde(default)]
    pub operating_system: OperatingSystem,
    #[serde(default)]
    pub installed_mods: Vec<String>,
    #[serde(default)]
    pub engine: Option<GameEngine>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
}

impl Game {
    pub fn display_name(&self) -> String {
        match self.discriminator.as_deref() {
            Some(discriminator) if !discriminator.trim().is_empty() => {
                format!("{} ({discriminator})", self.name)
            }
            _ => self.name.clone(),
        }
    }

    pub fn engine_version(&self) -> Option<&GameEngineVersion> {
        self.engine.as_ref().and_then(|engine| engine.version.as_ref())
    }
}

/// A game owned on the storefront, installed or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnedGame {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub installed: bool,
    #[serde(default)]
    pub os_list: BTreeSet<OperatingSystem>,
    pub engine: GameEngineBrand,
    #[serde(default)]
    pub release_date: i32,
}

impl OwnedGame {
    pub fn supports_linux(&self) -> bool {
        self.os_list.contains(&OperatingSystem::Linux)
    }
}

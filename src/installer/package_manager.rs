//! Supported package managers

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    #[default]
    Npm,
    Pnpm,
    Yarn,
}

impl PackageManager {
    /// Executable name
    pub fn program(&self) -> &'static str {
        match self {
            PackageManager::Npm => "npm",
            PackageManager::Pnpm => "pnpm",
            PackageManager::Yarn => "yarn",
        }
    }

    /// Arguments installing `package` into the working directory
    pub fn install_args(&self, package: &str) -> Vec<String> {
        let subcommand = match self {
            PackageManager::Npm => "install",
            PackageManager::Pnpm | PackageManager::Yarn => "add",
        };
        vec![subcommand.to_string(), package.to_string()]
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}

impl FromStr for PackageManager {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "npm" => Ok(PackageManager::Npm),
            "pnpm" => Ok(PackageManager::Pnpm),
            "yarn" => Ok(PackageManager::Yarn),
            other => Err(format!("Unknown package manager: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_args() {
        assert_eq!(PackageManager::Npm.install_args("x"), vec!["install", "x"]);
        assert_eq!(PackageManager::Pnpm.install_args("x"), vec!["add", "x"]);
        assert_eq!(PackageManager::Yarn.install_args("x"), vec!["add", "x"]);
    }

    #[test]
    fn test_parse() {
        assert_eq!("PNPM".parse::<PackageManager>(), Ok(PackageManager::Pnpm));
        assert!("bun".parse::<PackageManager>().is_err());
    }
}

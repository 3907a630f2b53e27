/*
[INPUT]:  Static target lists, optionally the service's `/api/systems` answer
[OUTPUT]: Distribution and architecture choices, package name suggestions
[POS]:    Form data - selectable targets and autocomplete source
[UPDATE]: When the service adds distributions or the common package lists change
*/

use pkgbundle_adapter::{SystemType, SystemsResponse};

/// Minimum query length before suggestions are offered
pub const MIN_SUGGEST_CHARS: usize = 2;

/// Architecture that lets the service pick
pub const AUTO_ARCH: &str = "auto";

const BUILTIN_ARCHES: [&str; 3] = [AUTO_ARCH, "x86_64", "aarch64"];

const RPM_DISTRIBUTIONS: [(&str, &str); 6] = [
    ("centos7", "CentOS 7"),
    ("centos8", "CentOS 8"),
    ("rhel7", "RHEL 7"),
    ("rhel8", "RHEL 8"),
    ("rhel9", "RHEL 9"),
    ("fedora", "Fedora"),
];

const DEB_DISTRIBUTIONS: [(&str, &str); 7] = [
    ("ubuntu18", "Ubuntu 18.04"),
    ("ubuntu20", "Ubuntu 20.04"),
    ("ubuntu22", "Ubuntu 22.04"),
    ("ubuntu24", "Ubuntu 24.04"),
    ("debian10", "Debian 10"),
    ("debian11", "Debian 11"),
    ("debian12", "Debian 12"),
];

const RPM_COMMON_PACKAGES: &[&str] = &[
    "bash",
    "coreutils",
    "vim-minimal",
    "nano",
    "curl",
    "wget",
    "git",
    "nginx",
    "docker-ce",
    "podman",
    "python3",
    "python3-pip",
    "nodejs",
    "golang",
    "java-11-openjdk",
    "mysql",
    "postgresql",
    "redis",
    "httpd",
    "tomcat",
    "openssh-server",
];

const DEB_COMMON_PACKAGES: &[&str] = &[
    "bash",
    "coreutils",
    "vim",
    "nano",
    "curl",
    "wget",
    "git",
    "nginx",
    "docker.io",
    "podman",
    "python3",
    "python3-pip",
    "nodejs",
    "golang",
    "openjdk-11-jre",
    "mysql-server",
    "postgresql",
    "redis-server",
    "apache2",
    "openssh-server",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionOption {
    pub id: String,
    pub name: String,
    /// Architectures besides `auto`; empty means the built-in list
    pub arch: Vec<String>,
}

impl DistributionOption {
    fn builtin(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            arch: Vec::new(),
        }
    }
}

/// Selectable targets per system type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    rpm: Vec<DistributionOption>,
    deb: Vec<DistributionOption>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Catalog {
    pub fn builtin() -> Self {
        Self {
            rpm: RPM_DISTRIBUTIONS
                .iter()
                .map(|(id, name)| DistributionOption::builtin(id, name))
                .collect(),
            deb: DEB_DISTRIBUTIONS
                .iter()
                .map(|(id, name)| DistributionOption::builtin(id, name))
                .collect(),
        }
    }

    /// Catalog advertised by the service; a system type it omits keeps the built-in list
    pub fn from_systems(systems: &SystemsResponse) -> Self {
        let mut catalog = Self::builtin();
        for system_type in SystemType::ALL {
            let Some(entries) = systems.0.get(system_type.as_str()) else {
                continue;
            };
            if entries.is_empty() {
                continue;
            }
            let options = entries
                .iter()
                .map(|entry| DistributionOption {
                    id: entry.id.clone(),
                    name: entry.name.clone(),
                    arch: entry.arch.clone(),
                })
                .collect();
            match system_type {
                SystemType::Rpm => catalog.rpm = options,
                SystemType::Deb => catalog.deb = options,
            }
        }
        catalog
    }

    pub fn distributions(&self, system_type: SystemType) -> &[DistributionOption] {
        match system_type {
            SystemType::Rpm => &self.rpm,
            SystemType::Deb => &self.deb,
        }
    }

    /// Distribution selected when switching to `system_type`
    pub fn first_distribution(&self, system_type: SystemType) -> Option<&DistributionOption> {
        self.distributions(system_type).first()
    }

    pub fn find(&self, system_type: SystemType, id: &str) -> Option<&DistributionOption> {
        self.distributions(system_type)
            .iter()
            .find(|option| option.id == id)
    }

    /// Architecture choices for a distribution, always starting with `auto`
    pub fn arches(&self, system_type: SystemType, distribution: &str) -> Vec<String> {
        let advertised = self
            .find(system_type, distribution)
            .map(|option| option.arch.as_slice())
            .unwrap_or(&[]);
        if advertised.is_empty() {
            return BUILTIN_ARCHES.iter().map(|arch| arch.to_string()).collect();
        }
        std::iter::once(AUTO_ARCH.to_string())
            .chain(
                advertised
                    .iter()
                    .filter(|arch| arch.as_str() != AUTO_ARCH)
                    .cloned(),
            )
            .collect()
    }
}

pub fn common_packages(system_type: SystemType) -> &'static [&'static str] {
    match system_type {
        SystemType::Rpm => RPM_COMMON_PACKAGES,
        SystemType::Deb => DEB_COMMON_PACKAGES,
    }
}

/// Case-insensitive prefix match over the common packages, in catalog order
pub fn suggest(system_type: SystemType, query: &str) -> Vec<&'static str> {
    let query = query.trim().to_lowercase();
    if query.chars().count() < MIN_SUGGEST_CHARS {
        return Vec::new();
    }
    common_packages(system_type)
        .iter()
        .copied()
        .filter(|name| name.to_lowercase().starts_with(&query))
        .collect()
}

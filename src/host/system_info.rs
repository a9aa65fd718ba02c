// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Host telemetry attached to login records.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sysinfo::{CpuRefreshKind, MemoryRefreshKind, Networks, RefreshKind, System};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemDetails {
    pub cpu: CpuDetails,
    pub os: OsDetails,
    pub memory: MemoryDetails,
    pub network: Vec<NetworkInterface>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuDetails {
    pub manufacturer: String,
    pub brand: String,
    /// MHz
    pub speed: u64,
    pub cores: usize,
    pub physical_cores: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OsDetails {
    pub platform: String,
    pub distro: Option<String>,
    pub release: Option<String>,
    pub kernel: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryDetails {
    pub total_bytes: u64,
    pub available_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInterface {
    pub iface: String,
    pub mac: String,
}

#[derive(Debug, Clone, Error)]
pub enum HostError {
    #[error("Failed to collect system information: {0}")]
    Collection(String),
}

#[async_trait]
pub trait SystemInfoProvider: Send + Sync {
    async fn collect(&self) -> Result<SystemDetails, HostError>;
}

/// Reads the local machine through `sysinfo`.
#[derive(Debug, Clone, Default)]
pub struct SysinfoProvider;

impl SysinfoProvider {
    fn snapshot() -> SystemDetails {
        let system = System::new_with_specifics(
            RefreshKind::new()
                .with_cpu(CpuRefreshKind::everything())
                .with_memory(MemoryRefreshKind::everything()),
        );

        let cpus = system.cpus();
        let first = cpus.first();
        let cpu = CpuDetails {
            manufacturer: first.map(|c| c.vendor_id().to_string()).unwrap_or_default(),
            brand: first.map(|c| c.brand().trim().to_string()).unwrap_or_default(),
            speed: first.map(|c| c.frequency()).unwrap_or_default(),
            cores: cpus.len(),
            physical_cores: system.physical_core_count(),
        };

        let os = OsDetails {
            platform: std::env::consts::OS.to_string(),
            distro: System::name(),
            release: System::os_version(),
            kernel: System::kernel_version(),
        };

        let memory = MemoryDetails {
            total_bytes: system.total_memory(),
            available_bytes: system.available_memory(),
        };

        let networks = Networks::new_with_refreshed_list();
        let mut network: Vec<NetworkInterface> = networks
            .iter()
            .map(|(name, data)| NetworkInterface {
                iface: name.clone(),
                mac: data.mac_address().to_string(),
            })
            .collect();
        network.sort_by(|a, b| a.iface.cmp(&b.iface));

        SystemDetails {
            cpu,
            os,
            memory,
            network,
        }
    }
}

#[async_trait]
impl SystemInfoProvider for SysinfoProvider {
    async fn collect(&self) -> Result<SystemDetails, HostError> {
        tokio::task::spawn_blocking(Self::snapshot)
            .await
            .map_err(|e| HostError::Collection(e.to_string()))
    }
}

/// Returns the same details on every call.
#[derive(Debug, Clone)]
pub struct StaticSystemInfo(pub SystemDetails);

impl StaticSystemInfo {
    pub fn sample() -> Self {
        Self(SystemDetails {
            cpu: CpuDetails {
                manufacturer: "GenuineIntel".to_string(),
                brand: "Intel(R) Xeon(R) CPU".to_string(),
                speed: 2400,
                cores: 8,
                physical_cores: Some(4),
            },
            os: OsDetails {
                platform: "linux".to_string(),
                distro: Some("Ubuntu".to_string()),
                release: Some("22.04".to_string()),
                kernel: Some("6.5.0".to_string()),
            },
            memory: MemoryDetails {
                total_bytes: 32 * 1024 * 1024 * 1024,
                available_bytes: 16 * 1024 * 1024 * 1024,
            },
            network: vec![NetworkInterface {
                iface: "eth0".to_string(),
                mac: "02:42:ac:11:00:02".to_string(),
            }],
        })
    }
}

#[async_trait]
impl SystemInfoProvider for StaticSystemInfo {
    async fn collect(&self) -> Result<SystemDetails, HostError> {
        Ok(self.0.clone())
    }
}

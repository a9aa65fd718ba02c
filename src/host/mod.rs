// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod system_info;

pub use system_info::{
    CpuDetails, HostError, MemoryDetails, NetworkInterface, OsDetails, StaticSystemInfo,
    SysinfoProvider, SystemDetails, SystemInfoProvider,
};

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use ethers::prelude::*;

// Reward token deployed on the development chain. Only mint is bound.
abigen!(
    VolunteerToken,
    r#"[
        function mint(address to, uint256 amount)
    ]"#
);

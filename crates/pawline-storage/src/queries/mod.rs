// SPDX-FileCopyrightText: 2026 Pawline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules, one per entity.

pub mod audit;
pub mod bookings;
pub mod directory;
pub mod events;
pub mod metrics;
pub mod numbers;
pub mod offers;
pub mod overrides;
pub mod threads;
pub mod windows;

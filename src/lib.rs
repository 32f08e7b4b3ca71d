// Copyright (c) 2024 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Voice assistant skill to control a Decora WiFi light switch.

pub mod bus;
pub mod cloud;
pub mod dispatcher;
pub mod intent;
pub mod notifier;
pub mod resolver;
pub mod resources;
pub mod skill;
pub mod util;

pub mod configuration;
pub mod errors;
pub mod startup;

pub use skill::*;
pub use startup::*;

// Copyright (c) 2024 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Actix message handlers.

mod bus_connection;
mod inbound;
mod intent;
mod login;
mod settings;

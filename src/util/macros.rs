// Copyright (c) 2023 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

/// Return an error from a handler with an [`actix::AtomicResponse`] result.
macro_rules! return_atomic_err {
    ($result:expr) => {
        return actix::AtomicResponse::new(Box::pin(actix::fut::result(Err($result))));
    };
}

/// Return a value from a handler with an [`actix::AtomicResponse`] result.
macro_rules! return_atomic_ok {
    ($result:expr) => {
        return actix::AtomicResponse::new(Box::pin(actix::fut::result(Ok($result))));
    };
}

pub(crate) use return_atomic_err;
pub(crate) use return_atomic_ok;

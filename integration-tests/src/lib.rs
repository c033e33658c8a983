//! Test problems shared by the integration tests.

pub mod permeation;

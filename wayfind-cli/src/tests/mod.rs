//! Shared test harness modules for the wayfind CLI.

use super::*;

mod helpers;
mod steps;
mod unit;

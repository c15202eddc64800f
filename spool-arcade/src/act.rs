//! Action for [DodgeEnv](crate::DodgeEnv)
use serde::{Deserialize, Serialize};
use spool_core::Act;
use strum::EnumIter;

/// Action for [DodgeEnv](crate::DodgeEnv) and [DodgeMachine](crate::DodgeMachine).
///
/// The discriminant is the value recorded in the machine RAM.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, EnumIter)]
#[repr(u8)]
pub enum DodgeAction {
    Noop = 0,
    Left = 1,
    Right = 2,
}

impl Act for DodgeAction {}

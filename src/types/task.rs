//! Task platforms and completion records
//!
//! A task completion is an immutable audit entry; the 24-hour cooldown per
//! `(account, platform, level)` is derived from the latest completion.

use super::account::AccountId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// E-commerce platforms tasks can be performed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Shopee,
    Lazada,
    Tiki,
    Taobao,
}

impl Platform {
    /// All supported platforms, in catalog order
    pub const ALL: [Platform; 4] = [
        Platform::Shopee,
        Platform::Lazada,
        Platform::Tiki,
        Platform::Taobao,
    ];

    /// Human-readable platform name
    pub fn name(&self) -> &'static str {
        match self {
            Platform::Shopee => "Shopee",
            Platform::Lazada => "Lazada",
            Platform::Tiki => "Tiki",
            Platform::Taobao => "Taobao",
        }
    }
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "shopee" => Ok(Platform::Shopee),
            "lazada" => Ok(Platform::Lazada),
            "tiki" => Ok(Platform::Tiki),
            "taobao" => Ok(Platform::Taobao),
            other => Err(format!("unknown platform: {}", other)),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Platform::Shopee => "shopee",
            Platform::Lazada => "lazada",
            Platform::Tiki => "tiki",
            Platform::Taobao => "taobao",
        };
        write!(f, "{}", s)
    }
}

/// A completed task and the commission it awarded
///
/// Created in one step together with the commission credit; never mutated
/// afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskCompletion {
    /// Completion ID
    pub id: u64,

    /// Account that performed the task
    pub account: AccountId,

    /// Platform the task ran on
    pub platform: Platform,

    /// Task level, 1-5
    pub level: u8,

    /// Commission credited for this completion, per the rate table
    pub commission: Decimal,

    /// Completion instant; anchors the cooldown window
    pub completed_at: DateTime<Utc>,
}

use serde::{Deserialize, Serialize};

use crate::revenue::classify::{Movement, MovementGrid};
use crate::series::max_and_mean;
use crate::types::{MaybeMoney, Money};

/// Per-month counts and magnitudes of upgrade, downgrade and churn events.
///
/// Downgrade and churn magnitudes are signed (<= 0). Their `max_*` series
/// report the largest movement by size, i.e. the most negative value. A month
/// without events is null; zero is never used as "no events".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventStats {
    pub upgrade_count: Vec<usize>,
    pub downgrade_count: Vec<usize>,
    pub max_upgrade: Vec<MaybeMoney>,
    pub avg_upgrade: Vec<MaybeMoney>,
    pub max_downgrade: Vec<MaybeMoney>,
    pub avg_downgrade: Vec<MaybeMoney>,
    pub max_churn: Vec<MaybeMoney>,
    pub avg_churn: Vec<MaybeMoney>,
}

pub fn build_event_stats(grid: &MovementGrid) -> EventStats {
    let n = grid.num_months();
    let mut stats = EventStats {
        upgrade_count: Vec::with_capacity(n),
        downgrade_count: Vec::with_capacity(n),
        max_upgrade: Vec::with_capacity(n),
        avg_upgrade: Vec::with_capacity(n),
        max_downgrade: Vec::with_capacity(n),
        avg_downgrade: Vec::with_capacity(n),
        max_churn: Vec::with_capacity(n),
        avg_churn: Vec::with_capacity(n),
    };

    for movements in grid.iter_months() {
        let mut upgrades: Vec<Money> = Vec::new();
        let mut downgrades: Vec<Money> = Vec::new();
        let mut churns: Vec<Money> = Vec::new();
        for movement in movements {
            match *movement {
                Movement::Upgrade(v) => upgrades.push(v),
                Movement::Downgrade(v) => downgrades.push(v),
                Movement::Churn(v) => churns.push(v),
                Movement::New(_) | Movement::Flat => {}
            }
        }

        stats.upgrade_count.push(upgrades.len());
        stats.downgrade_count.push(downgrades.len());

        let (max, avg) = max_and_mean(upgrades);
        stats.max_upgrade.push(max);
        stats.avg_upgrade.push(avg);

        let (max, avg) = largest_loss_and_mean(downgrades);
        stats.max_downgrade.push(max);
        stats.avg_downgrade.push(avg);

        let (max, avg) = largest_loss_and_mean(churns);
        stats.max_churn.push(max);
        stats.avg_churn.push(avg);
    }

    stats
}

/// Most negative value and mean of non-positive movements.
fn largest_loss_and_mean(values: Vec<Money>) -> (MaybeMoney, MaybeMoney) {
    let (max, mean) = max_and_mean(values.into_iter().map(|v| -v));
    (max.map(|v| -v), mean.map(|v| -v))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

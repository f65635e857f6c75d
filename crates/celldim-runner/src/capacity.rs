//! Per-technology capacity and frequency reuse rules.

use celldim_common::Technology;

/// Erlang load factor applied to each GSM traffic channel.
pub const GSM_CHANNEL_LOAD_FACTOR: f64 = 0.9;

/// Most traffic channels a GSM cell is given.
pub const GSM_MAX_CHANNELS: u32 = 8;

/// Code-limited capacity ceiling of a UMTS cell.
pub const UMTS_MAX_CAPACITY: f64 = 64.0;

/// Resource-block-limited capacity ceiling of an LTE cell.
pub const LTE_MAX_CAPACITY: f64 = 200.0;

/// GSM switches from a 4-cell to a 7-cell reuse pattern above this QoS.
pub const GSM_HIGH_QOS_THRESHOLD_PCT: f64 = 80.0;

/// Capacity of a single cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellCapacity {
    /// Traffic channels for GSM, equal to the capacity for UMTS and LTE.
    pub channels_per_cell: u32,
    /// Users served by one cell.
    pub capacity_per_cell: f64,
}

/// Capacity and reuse rules for a [`Technology`].
pub trait TechnologyExt {
    /// Capacity of one cell for a traffic demand in percent.
    fn cell_capacity(&self, traffic_demand_pct: f64) -> CellCapacity;

    /// Frequency reuse cluster size for a QoS requirement in percent.
    fn cluster_size(&self, qos_pct: f64) -> u32;

    /// True when equipment cost scales with the number of channels.
    fn bills_per_channel(&self) -> bool;
}

impl TechnologyExt for Technology {
    fn cell_capacity(&self, traffic_demand_pct: f64) -> CellCapacity {
        match self {
            Technology::Gsm => {
                let channels = ((traffic_demand_pct / 10.0).round() as u32).clamp(1, GSM_MAX_CHANNELS);
                CellCapacity {
                    channels_per_cell: channels,
                    capacity_per_cell: f64::from(channels) * GSM_CHANNEL_LOAD_FACTOR,
                }
            }
            Technology::Umts => units_capacity((traffic_demand_pct * 1.5).floor().min(UMTS_MAX_CAPACITY)),
            Technology::Lte => units_capacity((traffic_demand_pct * 2.0).floor().min(LTE_MAX_CAPACITY)),
        }
    }

    fn cluster_size(&self, qos_pct: f64) -> u32 {
        match self {
            Technology::Gsm if qos_pct > GSM_HIGH_QOS_THRESHOLD_PCT => 7,
            Technology::Gsm => 4,
            Technology::Umts | Technology::Lte => 1,
        }
    }

    fn bills_per_channel(&self) -> bool {
        matches!(self, Technology::Gsm)
    }
}

fn units_capacity(capacity: f64) -> CellCapacity {
    let capacity = capacity.max(0.0);
    CellCapacity {
        channels_per_cell: capacity as u32,
        capacity_per_cell: capacity,
    }
}

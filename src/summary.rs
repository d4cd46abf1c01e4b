use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::data::{
    domain::{Price, Volume},
    window::Extremum,
};

/// Session-level statistics for one instrument on one trading day.
///
/// Prices and times that come from a window which turned out empty are `None`
/// (e.g. no pre-market trading, or the high printed on the last market bar).
/// Volumes are sums and are always defined; an empty window contributes zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub date: NaiveDate,
    pub ticker: String,

    // === Pre-market ===
    /// Highest pre-market high (earliest bar on ties).
    pub pmhigh: Option<Price>,
    pub pmhigh_time: Option<NaiveTime>,
    /// Lowest pre-market low strictly after the pre-market high (latest bar on ties).
    pub pmlow: Option<Price>,
    pub pmlow_time: Option<NaiveTime>,
    pub pmvol: Volume,

    // === Regular market ===
    /// Open of the first bar at or after the market open.
    pub open: Option<Price>,
    /// Highest market high (earliest bar on ties).
    pub high: Option<Price>,
    pub high_time: Option<NaiveTime>,
    /// Lowest market low (latest bar on ties).
    pub low: Option<Price>,
    pub low_time: Option<NaiveTime>,
    /// Lowest market low strictly after the session high (latest bar on ties).
    pub lowph: Option<Price>,
    pub lowph_time: Option<NaiveTime>,
    /// Close of the last bar at or before the market close.
    pub close: Option<Price>,
    /// Pre-market plus market volume.
    pub volume: Volume,
}

impl SessionSummary {
    pub fn pm_high(&self) -> Option<Extremum> {
        zip_extremum(self.pmhigh, self.pmhigh_time)
    }

    pub fn pm_low(&self) -> Option<Extremum> {
        zip_extremum(self.pmlow, self.pmlow_time)
    }

    pub fn session_high(&self) -> Option<Extremum> {
        zip_extremum(self.high, self.high_time)
    }

    pub fn session_low(&self) -> Option<Extremum> {
        zip_extremum(self.low, self.low_time)
    }

    pub fn low_post_high(&self) -> Option<Extremum> {
        zip_extremum(self.lowph, self.lowph_time)
    }

    /// Volume traded during regular hours only.
    pub fn market_volume(&self) -> Volume {
        self.volume - self.pmvol
    }
}

fn zip_extremum(price: Option<Price>, time: Option<NaiveTime>) -> Option<Extremum> {
    price.zip(time).map(|(price, time)| Extremum { price, time })
}

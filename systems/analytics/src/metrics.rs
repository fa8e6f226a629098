use crate::Tally;

const BASIS_POINTS: u64 = 10_000;

/// Share of placed mice that reached a rocket, in basis points.
///
/// Returns `None` before any mouse has been placed.
#[must_use]
pub fn rescue_rate_bps(tally: &Tally) -> Option<u32> {
    ratio_bps(tally.mice_rescued, tally.mice_added)
}

/// Share of cat hits on arrows that finished an arrow off, in basis points.
///
/// Every destroyed arrow took two hits, so a level where cats only ever graze
/// arrows once scores zero and one where every arrow is worn out scores 5000.
#[must_use]
pub fn arrow_destruction_rate_bps(tally: &Tally) -> Option<u32> {
    ratio_bps(tally.arrows_destroyed, tally.arrows_worn)
}

fn ratio_bps(numerator: u32, denominator: u32) -> Option<u32> {
    if denominator == 0 {
        return None;
    }
    let scaled = u64::from(numerator) * BASIS_POINTS / u64::from(denominator);
    u32::try_from(scaled).ok()
}

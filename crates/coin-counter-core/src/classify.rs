//! Size-bucket classification of measured coins.
//!
//! Bucket boundaries are derived from the coins in a single image: the radius
//! of the smallest-area coin anchors the "small" bucket and the radius of the
//! largest-area coin anchors the "large" bucket. The same physical coin can
//! therefore land in different buckets across photos. Use with care when
//! images differ in scale or coin mix.

use serde::{Deserialize, Serialize};

use crate::CoinRecord;

/// Denomination size classes, smallest first.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Denomination {
    Small,
    Medium,
    Large,
}

impl Denomination {
    pub const ALL: [Denomination; 3] = [Self::Small, Self::Medium, Self::Large];

    pub fn label(self) -> &'static str {
        match self {
            Self::Small => "Small",
            Self::Medium => "Medium",
            Self::Large => "Large",
        }
    }
}

/// Offsets (pixels) added to the extreme radii to form bucket thresholds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BucketOffsets {
    /// A coin is small if `radius <= smallest_radius + small_offset`.
    pub small_offset: f64,
    /// Otherwise large if `radius >= largest_radius - large_offset`.
    pub large_offset: f64,
}

impl Default for BucketOffsets {
    fn default() -> Self {
        Self {
            small_offset: 7.0,
            large_offset: 6.0,
        }
    }
}

/// Smallest and largest coin by area.
#[derive(Clone, Copy, Debug)]
pub struct Extremes<'a> {
    pub smallest: &'a CoinRecord,
    pub largest: &'a CoinRecord,
}

/// Find the smallest- and largest-area coins.
///
/// On equal areas the coin seen first keeps its place.
pub fn find_extremes(records: &[CoinRecord]) -> Option<Extremes<'_>> {
    let (first, rest) = records.split_first()?;
    let init = Extremes {
        smallest: first,
        largest: first,
    };
    Some(rest.iter().fold(init, |acc, r| Extremes {
        smallest: if r.area < acc.smallest.area {
            r
        } else {
            acc.smallest
        },
        largest: if r.area > acc.largest.area {
            r
        } else {
            acc.largest
        },
    }))
}

/// Radius thresholds that were applied to one image.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BucketThresholds {
    pub small_max_radius: f64,
    pub large_min_radius: f64,
}

/// Coin ids grouped by denomination. Ids refer to `CoinRecord::id`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub small: Vec<u32>,
    pub medium: Vec<u32>,
    pub large: Vec<u32>,
    /// `None` when there were no coins to classify.
    pub thresholds: Option<BucketThresholds>,
}

impl Classification {
    pub fn ids(&self, denom: Denomination) -> &[u32] {
        match denom {
            Denomination::Small => &self.small,
            Denomination::Medium => &self.medium,
            Denomination::Large => &self.large,
        }
    }

    pub fn count(&self, denom: Denomination) -> usize {
        self.ids(denom).len()
    }

    pub fn total(&self) -> usize {
        self.small.len() + self.medium.len() + self.large.len()
    }

    pub fn denomination_of(&self, id: u32) -> Option<Denomination> {
        Denomination::ALL
            .into_iter()
            .find(|&d| self.ids(d).contains(&id))
    }

    fn push(&mut self, denom: Denomination, id: u32) {
        match denom {
            Denomination::Small => self.small.push(id),
            Denomination::Medium => self.medium.push(id),
            Denomination::Large => self.large.push(id),
        }
    }
}

pub fn bucket_for(radius: f64, thresholds: &BucketThresholds) -> Denomination {
    if radius <= thresholds.small_max_radius {
        Denomination::Small
    } else if radius >= thresholds.large_min_radius {
        Denomination::Large
    } else {
        Denomination::Medium
    }
}

/// Assign every coin to exactly one denomination bucket.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(level = "debug", skip(records, offsets), fields(n = records.len()))
)]
pub fn classify(records: &[CoinRecord], offsets: &BucketOffsets) -> Classification {
    let mut out = Classification::default();
    let Some(extremes) = find_extremes(records) else {
        return out;
    };

    let thresholds = BucketThresholds {
        small_max_radius: extremes.smallest.raw_radius + offsets.small_offset,
        large_min_radius: extremes.largest.raw_radius - offsets.large_offset,
    };
    if thresholds.small_max_radius >= thresholds.large_min_radius {
        log::debug!(
            "bucket thresholds overlap (small <= {:.1}, large >= {:.1}); small takes precedence",
            thresholds.small_max_radius,
            thresholds.large_min_radius
        );
    }

    for r in records {
        out.push(bucket_for(r.raw_radius, &thresholds), r.id);
    }
    out.thresholds = Some(thresholds);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{measure, DetectedCircle, MeasureUnits};

    fn records(radii: &[f32]) -> Vec<CoinRecord> {
        let circles: Vec<_> = radii
            .iter()
            .enumerate()
            .map(|(i, &r)| DetectedCircle::new(100.0 * i as f32, 50.0, r))
            .collect();
        measure(&circles, &MeasureUnits::Pixels).unwrap()
    }

    #[test]
    fn three_coin_scenario() {
        let recs = records(&[60.0, 90.0, 140.0]);
        let ext = find_extremes(&recs).unwrap();
        assert_eq!(ext.smallest.id, 1);
        assert_eq!(ext.largest.id, 3);

        let cls = classify(&recs, &BucketOffsets::default());
        assert_eq!(cls.small, vec![1]);
        assert_eq!(cls.medium, vec![2]);
        assert_eq!(cls.large, vec![3]);
        let t = cls.thresholds.unwrap();
        assert_eq!(t.small_max_radius, 67.0);
        assert_eq!(t.large_min_radius, 134.0);
    }

    #[test]
    fn detection_order_does_not_change_buckets() {
        let recs = records(&[140.0, 60.0, 90.0]);
        let cls = classify(&recs, &BucketOffsets::default());
        assert_eq!(cls.small, vec![2]);
        assert_eq!(cls.medium, vec![3]);
        assert_eq!(cls.large, vec![1]);
    }

    #[test]
    fn first_occurrence_wins_ties() {
        let recs = records(&[70.0, 50.0, 90.0, 50.0, 90.0]);
        let ext = find_extremes(&recs).unwrap();
        assert_eq!(ext.smallest.id, 2);
        assert_eq!(ext.largest.id, 3);
    }

    #[test]
    fn empty_input_has_no_extremes_and_empty_buckets() {
        assert!(find_extremes(&[]).is_none());
        let cls = classify(&[], &BucketOffsets::default());
        assert_eq!(cls.total(), 0);
        assert!(cls.thresholds.is_none());
    }

    #[test]
    fn single_coin_is_both_extremes_and_small() {
        let recs = records(&[75.0]);
        let ext = find_extremes(&recs).unwrap();
        assert_eq!(ext.smallest.id, ext.largest.id);
        let cls = classify(&recs, &BucketOffsets::default());
        assert_eq!(cls.small, vec![1]);
        assert!(cls.medium.is_empty() && cls.large.is_empty());
    }

    #[test]
    fn adjacent_extremes_prefer_small() {
        // 64 <= 60 + 7 and 64 >= 66 - 6: both hold, small is checked first.
        let recs = records(&[60.0, 64.0, 66.0]);
        let cls = classify(&recs, &BucketOffsets::default());
        assert_eq!(cls.small, vec![1, 2]);
        assert_eq!(cls.large, vec![3]);
    }

    #[test]
    fn buckets_partition_every_record() {
        let radii: Vec<f32> = (0..40).map(|k| 55.0 + ((k * 37) % 97) as f32).collect();
        let recs = records(&radii);
        let cls = classify(&recs, &BucketOffsets::default());
        assert_eq!(cls.total(), recs.len());
        for r in &recs {
            let hits = Denomination::ALL
                .iter()
                .filter(|&&d| cls.ids(d).contains(&r.id))
                .count();
            assert_eq!(hits, 1, "coin {} in {hits} buckets", r.id);
        }
        for id in &cls.small {
            assert!(!cls.large.contains(id));
        }
    }

    #[test]
    fn custom_offsets_move_boundaries() {
        let recs = records(&[60.0, 80.0, 100.0]);
        let offsets = BucketOffsets {
            small_offset: 25.0,
            large_offset: 0.0,
        };
        let cls = classify(&recs, &offsets);
        assert_eq!(cls.small, vec![1, 2]);
        assert_eq!(cls.large, vec![3]);
        assert_eq!(cls.denomination_of(2), Some(Denomination::Small));
        assert_eq!(cls.denomination_of(9), None);
    }
}

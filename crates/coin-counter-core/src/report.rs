//! Report model and plain-text rendering.

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::{
    find_extremes, total_value, Classification, CoinError, CoinRecord, Denomination,
    Denominations, MeasureUnits, Value,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CoinRow {
    pub id: u32,
    pub center: [f32; 2],
    pub radius_px: f64,
    pub area: f64,
    pub perimeter: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExtremeCoin {
    pub id: u32,
    pub area: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BucketSummary {
    pub denomination: Denomination,
    /// Value of one coin in this bucket, in subunits.
    pub value: u32,
    pub ids: Vec<u32>,
    pub count: usize,
}

/// Everything printed for one image.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CoinReport {
    pub count: usize,
    pub units: MeasureUnits,
    pub coins: Vec<CoinRow>,
    #[serde(default)]
    pub smallest: Option<ExtremeCoin>,
    #[serde(default)]
    pub largest: Option<ExtremeCoin>,
    pub buckets: Vec<BucketSummary>,
    pub total: Value,
}

impl CoinReport {
    pub fn build(
        records: &[CoinRecord],
        classification: &Classification,
        denominations: &Denominations,
        units: &MeasureUnits,
    ) -> Result<Self, CoinError> {
        let total = total_value(classification, denominations)?;
        let extremes = find_extremes(records);
        let to_extreme = |r: &CoinRecord| ExtremeCoin {
            id: r.id,
            area: r.area,
        };

        let coins = records
            .iter()
            .map(|r| CoinRow {
                id: r.id,
                center: [r.center.x, r.center.y],
                radius_px: r.raw_radius,
                area: r.area,
                perimeter: r.perimeter,
            })
            .collect();

        let buckets = if records.is_empty() {
            Vec::new()
        } else {
            Denomination::ALL
                .into_iter()
                .map(|d| BucketSummary {
                    denomination: d,
                    value: denominations.value_of(d),
                    ids: classification.ids(d).to_vec(),
                    count: classification.count(d),
                })
                .collect()
        };

        Ok(Self {
            count: records.len(),
            units: units.clone(),
            coins,
            smallest: extremes.map(|e| to_extreme(e.smallest)),
            largest: extremes.map(|e| to_extreme(e.largest)),
            buckets,
            total,
        })
    }

    pub fn render_text<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let area_unit = self.units.area_label();
        let len_unit = self.units.length_label();

        writeln!(out, "I have found {} coins!", self.count)?;
        writeln!(out)?;

        for c in &self.coins {
            writeln!(out, "Coin {}", c.id)?;
            writeln!(out, "\tArea: {:.2} {}", c.area, area_unit)?;
            writeln!(out, "\tPerimeter: {:.2} {}", c.perimeter, len_unit)?;
            writeln!(out)?;
        }

        if let (Some(s), Some(l)) = (self.smallest, self.largest) {
            writeln!(
                out,
                "Smallest coin:\n\tCoin {}\n\tArea: {:.2} {}",
                s.id, s.area, area_unit
            )?;
            writeln!(
                out,
                "Largest coin:\n\tCoin {}\n\tArea: {:.2} {}",
                l.id, l.area, area_unit
            )?;
            writeln!(out)?;
        }

        for b in &self.buckets {
            let ids: Vec<String> = b.ids.iter().map(u32::to_string).collect();
            writeln!(
                out,
                "{} coins ({}): [{}] -> {}",
                b.denomination.label(),
                b.value,
                ids.join(", "),
                b.count
            )?;
        }

        writeln!(out, "Total value: {}", self.total)
    }

    pub fn to_text(&self) -> String {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.render_text(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{classify, measure, BucketOffsets, DetectedCircle};

    fn report_for(radii: &[f32], units: MeasureUnits) -> CoinReport {
        let circles: Vec<_> = radii
            .iter()
            .enumerate()
            .map(|(i, &r)| DetectedCircle::new(200.0 * i as f32 + 150.0, 150.0, r))
            .collect();
        let records = measure(&circles, &units).unwrap();
        let cls = classify(&records, &BucketOffsets::default());
        CoinReport::build(&records, &cls, &Denominations::default(), &units).unwrap()
    }

    #[test]
    fn renders_three_coin_scenario() {
        let report = report_for(&[60.0, 90.0, 140.0], MeasureUnits::Pixels);
        let expected = "\
I have found 3 coins!

Coin 1
\tArea: 11309.73 pixels
\tPerimeter: 376.99 pixels

Coin 2
\tArea: 25446.90 pixels
\tPerimeter: 565.49 pixels

Coin 3
\tArea: 61575.22 pixels
\tPerimeter: 879.65 pixels

Smallest coin:
\tCoin 1
\tArea: 11309.73 pixels
Largest coin:
\tCoin 3
\tArea: 61575.22 pixels

Small coins (5): [1] -> 1
Medium coins (10): [2] -> 1
Large coins (25): [3] -> 1
Total value: R$0.40
";
        assert_eq!(report.to_text(), expected);
    }

    #[test]
    fn empty_report_degrades_gracefully() {
        let report = report_for(&[], MeasureUnits::Pixels);
        assert_eq!(report.count, 0);
        assert!(report.smallest.is_none() && report.largest.is_none());
        assert!(report.buckets.is_empty());
        assert_eq!(
            report.to_text(),
            "I have found 0 coins!\n\nTotal value: R$0.00\n"
        );
    }

    #[test]
    fn single_coin_is_smallest_and_largest() {
        let report = report_for(&[80.0], MeasureUnits::Pixels);
        assert_eq!(report.smallest.unwrap().id, 1);
        assert_eq!(report.largest.unwrap().id, 1);
        assert_eq!(report.total.to_string(), "R$0.05");
    }

    #[test]
    fn calibrated_units_change_labels() {
        let report = report_for(&[100.0], MeasureUnits::calibrated_mm(10.0));
        let text = report.to_text();
        assert!(text.contains("\tArea: 314.16 mm²"), "{text}");
        assert!(text.contains("\tPerimeter: 62.83 mm"), "{text}");
    }

    #[test]
    fn report_serializes_to_json() {
        let report = report_for(&[60.0, 90.0, 140.0], MeasureUnits::Pixels);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["count"], 3);
        assert_eq!(json["total"]["subunits"], 40);
        assert_eq!(json["buckets"][2]["denomination"], "large");
        assert_eq!(json["units"]["mode"], "pixels");
    }
}

use crate::quake::scale::{ColorScale, Rgb};

/// One legend row: a swatch colour and its range label
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LegendEntry {
    pub color: Rgb,
    pub label: String,
}

/// Build legend rows from ascending breakpoints.
///
/// Each row samples `color_fn(grade + offset)`. Labels read `from–to`,
/// except the last which is open-ended (`from+`).
pub fn build_legend<F>(grades: &[f64], offset: f64, color_fn: F) -> Vec<LegendEntry>
where
    F: Fn(f64) -> Rgb,
{
    grades
        .iter()
        .enumerate()
        .map(|(i, &from)| {
            let label = match grades.get(i + 1) {
                Some(to) => format!("{from}\u{2013}{to}"),
                None => format!("{from}+"),
            };
            LegendEntry {
                color: color_fn(from + offset),
                label,
            }
        })
        .collect()
}

impl ColorScale {
    /// Legend rows for this scale, sampled through [`ColorScale::color_for`]
    pub fn legend(&self) -> Vec<LegendEntry> {
        let grades: Vec<f64> = self.grades().collect();
        build_legend(&grades, self.legend_offset, |v| self.color_for(Some(v)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quake::scale::{color_for, Basis};

    #[test]
    fn test_depth_legend() {
        let legend = Basis::Depth.scale().legend();
        assert_eq!(legend.len(), 6);
        assert_eq!(legend[0].label, "-10\u{2013}10");
        assert_eq!(legend[2].label, "30\u{2013}70");
        assert_eq!(legend[5].label, "300+");

        let colors: Vec<String> = legend.iter().map(|e| e.color.hex()).collect();
        assert_eq!(
            colors,
            ["#fff7ec", "#fee8c8", "#fdbb84", "#fc8d59", "#e34a33", "#b30000"]
        );
    }

    #[test]
    fn test_magnitude_legend() {
        let legend = Basis::Magnitude.scale().legend();
        let labels: Vec<&str> = legend.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(
            labels,
            ["0\u{2013}2", "2\u{2013}4", "4\u{2013}5", "5\u{2013}6", "6\u{2013}8", "8+"]
        );
        assert_eq!(legend[4].color.hex(), "#bd0026");
    }

    #[test]
    fn test_legend_matches_markers() {
        for basis in [Basis::Depth, Basis::Magnitude] {
            let scale = basis.scale();
            let grades: Vec<f64> = scale.grades().collect();
            let legend = scale.legend();
            for (i, entry) in legend.iter().enumerate() {
                assert_eq!(entry.color, color_for(Some(grades[i] + scale.legend_offset), basis));

                // Values strictly inside the band share its swatch
                let upper = grades.get(i + 1).copied().unwrap_or(grades[i] + 10.0);
                let inside = (grades[i] + upper) / 2.0;
                assert_eq!(entry.color, color_for(Some(inside), basis));
            }
        }
    }

    #[test]
    fn test_custom_grades() {
        let legend = build_legend(&[1.5, 2.5], 0.0, |_| Rgb::from_hex(0x123456));
        assert_eq!(legend.len(), 2);
        assert_eq!(legend[0].label, "1.5\u{2013}2.5");
        assert_eq!(legend[1].label, "2.5+");
        assert_eq!(legend[1].color.hex(), "#123456");
    }

    #[test]
    fn test_empty_grades() {
        assert!(build_legend(&[], 1.0, |_| Rgb::from_hex(0)).is_empty());
    }
}
